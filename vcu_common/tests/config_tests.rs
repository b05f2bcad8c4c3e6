//! Configuration file tests.
//!
//! Loads the shipped `config/vcu.toml` and checks validation limits.

use std::path::PathBuf;
use std::time::Duration;
use vcu_common::config::{ConfigError, LogLevel, VcuConfig};
use vcu_common::consts::{DEFAULT_SEND_TIMEOUT_MS, DEFAULT_TIMER_TICK_US, MAX_SEND_TIMEOUT_MS};

fn shipped_config() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../config/vcu.toml")
}

#[test]
fn test_shipped_config_matches_defaults() {
    let config = VcuConfig::load_validated(&shipped_config()).unwrap();
    assert_eq!(config.shared.log_level, LogLevel::Info);
    assert_eq!(config.link.send_timeout_ms, DEFAULT_SEND_TIMEOUT_MS);
    assert_eq!(config.timers.tick_us, DEFAULT_TIMER_TICK_US);
    assert_eq!(config.timers.tick(), Duration::from_micros(625));
}

#[test]
fn test_send_timeout_upper_bound() {
    let at_limit = format!("[link]\nsend_timeout_ms = {}\n", MAX_SEND_TIMEOUT_MS);
    assert!(VcuConfig::from_toml(&at_limit).is_ok());

    let over = format!("[link]\nsend_timeout_ms = {}\n", MAX_SEND_TIMEOUT_MS + 1);
    assert!(matches!(
        VcuConfig::from_toml(&over),
        Err(ConfigError::ValidationError(_))
    ));
}

#[test]
fn test_zero_send_timeout_is_allowed() {
    let config = VcuConfig::from_toml("[link]\nsend_timeout_ms = 0\n").unwrap();
    assert_eq!(config.link.send_timeout(), Duration::ZERO);
}

#[test]
fn test_unknown_section_rejected() {
    assert!(matches!(
        VcuConfig::from_toml("[uart]\nbaud = 115200\n"),
        Err(ConfigError::ParseError(_))
    ));
}

#[test]
fn test_bad_log_level_rejected() {
    assert!(matches!(
        VcuConfig::from_toml("[shared]\nlog_level = \"loud\"\n"),
        Err(ConfigError::ParseError(_))
    ));
}
