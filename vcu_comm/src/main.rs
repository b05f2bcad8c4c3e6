//! # VCU Link Bench Binary
//!
//! Runs the controller link on a development host and answers every request
//! with an echo response, so the external controller's framing and timing
//! can be checked on the bench without the vehicle control logic.
//!
//! # Usage
//!
//! ```bash
//! # Against a real serial device (line settings via stty beforehand)
//! vcu_link --device /dev/ttyUSB0
//!
//! # Against the built-in simulated controller
//! vcu_link --simulate -v
//!
//! # With a configuration file and JSON logs
//! vcu_link --config /etc/vcu/vcu.toml --device /dev/ttyS1 --json
//! ```

#![deny(warnings)]

use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;
use vcu_comm::CommLink;
use vcu_comm::transport::IoTransport;
use vcu_common::config::{ConfigError, LogLevel, VcuConfig};
use vcu_common::consts::{DEFAULT_CONFIG_PATH, REP_SIZE, REQ_SIZE};
use vcu_common::frame::{RequestFrame, ResponseFrame};
use vcu_hal::drivers::simulation::{SimulatedController, SimulatedSerial};

/// Idle poll interval of the responder loop.
const POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Request period of the simulated controller.
const SIM_REQUEST_PERIOD: Duration = Duration::from_millis(100);

/// VCU link bench - echo responder for the controller link
#[derive(Parser, Debug)]
#[command(name = "vcu_link")]
#[command(author = "RTS007")]
#[command(version)]
#[command(about = "Runs the VCU controller link and echoes every request")]
#[command(long_about = None)]
struct Args {
    /// Path to vcu.toml. Falls back to /etc/vcu/vcu.toml if present, then defaults.
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Serial device connected to the external controller
    #[arg(short, long, value_name = "PATH", conflicts_with = "simulate")]
    device: Option<PathBuf>,

    /// Use the built-in simulated controller instead of a device
    #[arg(short = 's', long)]
    simulate: bool,

    /// Seconds between link statistics reports
    #[arg(long, default_value_t = 5)]
    stats_interval: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = run() {
        error!("VCU link startup failed: {}", e);
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Logging first: a bad config file must still be reported.
    let config = load_config(&args);
    setup_tracing(&args, startup_log_level(&args, &config));
    let config = config?;

    info!(
        "VCU link v{} starting ({})",
        env!("CARGO_PKG_VERSION"),
        config.shared.service_name
    );
    if detect_rt_mode() {
        info!("Running in real-time mode");
    } else {
        info!("Running in standard (non-RT) mode");
    }

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || {
            info!("Received shutdown signal");
            running.store(false, Ordering::SeqCst);
        })?;
    }

    let stats_interval = Duration::from_secs(args.stats_interval.max(1));

    if args.simulate {
        info!("Simulation mode enabled");
        let (serial, controller) = SimulatedSerial::pair();
        let (link, _pumps) = CommLink::start(serial, &config.link)?;
        let controller_running = Arc::clone(&running);
        let controller_thread = thread::Builder::new()
            .name("sim-controller".to_string())
            .spawn(move || run_simulated_controller(controller, controller_running))?;

        serve(&link, &running, stats_interval);

        if controller_thread.join().is_err() {
            warn!("Simulated controller panicked");
        }
    } else {
        let device = args
            .device
            .as_ref()
            .ok_or("either --device or --simulate is required")?;
        info!("Opening serial device {}", device.display());
        let transport = IoTransport::open(device)?;
        let (link, pumps) = CommLink::start(transport, &config.link)?;

        serve(&link, &running, stats_interval);

        if pumps.receive.is_finished() {
            warn!("Receive pump had already stopped: serial device closed");
        }
    }

    info!("VCU link shutdown complete");
    Ok(())
}

/// Explicit `--config`, else the system file if present, else defaults.
fn load_config(args: &Args) -> Result<VcuConfig, ConfigError> {
    if let Some(path) = &args.config {
        return VcuConfig::load_validated(path);
    }
    let default_path = Path::new(DEFAULT_CONFIG_PATH);
    if default_path.exists() {
        VcuConfig::load_validated(default_path)
    } else {
        Ok(VcuConfig::default())
    }
}

/// Log level for the subscriber: `-v` wins, then the config file, then the
/// default when the config could not be loaded.
fn startup_log_level(args: &Args, config: &Result<VcuConfig, ConfigError>) -> LogLevel {
    if args.verbose {
        return LogLevel::Debug;
    }
    config
        .as_ref()
        .map_or(LogLevel::default(), |c| c.shared.log_level)
}

/// Echo responder: answers each request until shutdown is requested.
fn serve(link: &CommLink, running: &AtomicBool, stats_interval: Duration) {
    let mut last_report = Instant::now();

    while running.load(Ordering::SeqCst) {
        match link.try_next_request() {
            Some(request) => {
                debug!(
                    "Request {:02x?} ({} more pending)",
                    request.as_bytes(),
                    link.pending_request_count()
                );
                // Rejections are counted and logged by the link; drop and go on.
                let _ = link.send_response(echo_response(&request));
            }
            None => thread::sleep(POLL_INTERVAL),
        }

        if last_report.elapsed() >= stats_interval {
            last_report = Instant::now();
            let stats = link.stats();
            info!(
                rx = stats.frames_received,
                tx = stats.frames_sent,
                dropped = stats.requests_dropped,
                rx_errors = stats.rx_errors,
                tx_errors = stats.tx_errors,
                rejected = stats.responses_rejected,
                "Link statistics"
            );
        }
    }
}

/// Response carrying the request bytes back, truncated or zero-padded to
/// the response width.
fn echo_response(request: &RequestFrame) -> ResponseFrame {
    let mut response = ResponseFrame::zeroed();
    let n = REQ_SIZE.min(REP_SIZE);
    response.as_mut_bytes()[..n].copy_from_slice(&request.as_bytes()[..n]);
    response
}

/// Plays the external controller: sends a numbered request every period
/// and checks the echo.
fn run_simulated_controller(controller: SimulatedController, running: Arc<AtomicBool>) {
    let mut seq: u8 = 0;
    while running.load(Ordering::SeqCst) {
        let request = RequestFrame::new(sim_request_bytes(seq));
        if let Err(e) = controller.send_frame(&request) {
            warn!("Simulated controller send failed: {}", e);
            break;
        }
        match controller.recv_frame::<REP_SIZE>(SIM_REQUEST_PERIOD * 5) {
            Some(reply) if reply == echo_response(&request) => {
                debug!("Simulated controller got echo #{}", seq);
            }
            Some(reply) => warn!(
                "Simulated controller got {:02x?}, expected echo of {:02x?}",
                reply.as_bytes(),
                request.as_bytes()
            ),
            None => warn!("Simulated controller: no reply to request #{}", seq),
        }
        seq = seq.wrapping_add(1);
        thread::sleep(SIM_REQUEST_PERIOD);
    }
    // Dropping the controller hangs up the link and stops the pumps.
}

fn sim_request_bytes(seq: u8) -> [u8; REQ_SIZE] {
    let mut bytes = [0xA5u8; REQ_SIZE];
    bytes[0] = seq;
    bytes
}

/// Setup tracing subscriber. `RUST_LOG` overrides `level` when set.
fn setup_tracing(args: &Args, level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_thread_names(true)
            .init();
    }
}

/// Detect if running in real-time mode by checking scheduler policy.
fn detect_rt_mode() -> bool {
    #[cfg(target_os = "linux")]
    {
        use libc::{SCHED_FIFO, SCHED_RR, sched_getscheduler};
        unsafe {
            let policy = sched_getscheduler(0);
            policy == SCHED_FIFO || policy == SCHED_RR
        }
    }
    #[cfg(not(target_os = "linux"))]
    {
        false
    }
}
