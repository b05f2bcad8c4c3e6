//! VCU Common Library
//!
//! This crate provides shared constants, frame types, configuration loading
//! and the hardware boundary traits for all VCU workspace crates.
//!
//! # Module Structure
//!
//! - [`consts`] - System-wide limits and defaults
//! - [`frame`] - Fixed-size request/response frames exchanged with the controller
//! - [`hal`] - Serial transport and hardware timer traits
//! - [`config`] - Configuration loading traits and types
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```toml
//! [dependencies]
//! vcu_common = { path = "../vcu_common" }
//! ```
//!
//! Then import:
//! ```rust
//! use vcu_common::prelude::*;
//! ```

pub mod config;
pub mod consts;
pub mod frame;
pub mod hal;
pub mod prelude;
