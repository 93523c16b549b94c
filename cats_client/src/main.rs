//! # CATS Monitor
//!
//! Operator loop for a sample changer controller: connects, polls at the
//! configured interval, reconnects when the link drops and logs telemetry
//! changes together with safety and recovery transitions.
//!
//! # Usage
//!
//! ```bash
//! # Monitor with the installed configuration
//! cats_monitor
//!
//! # Override host and model, verbose logging
//! cats_monitor -c config/monitor.toml --host 10.0.0.7 --model isara2 -v
//!
//! # Single poll, snapshot printed as JSON
//! cats_monitor --once
//!
//! # Start the failed-get recovery automatically when it is detected
//! cats_monitor --auto-recover
//! ```

use cats_client::{CatsClient, StartOutcome};
use cats_common::config::{ConfigLoader, LogLevel};
use cats_common::robot::config::MonitorConfig;
use cats_common::robot::consts::DEFAULT_CONFIG_PATH;
use cats_common::robot::error::ClientError;
use cats_common::robot::model::Model;
use cats_common::robot::status::StatusSnapshot;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{Level, debug, error, info, warn};
use tracing_subscriber::EnvFilter;

/// CATS Monitor - sample changer telemetry and safety monitor
#[derive(Parser, Debug)]
#[command(name = "cats_monitor")]
#[command(version)]
#[command(about = "Telemetry, path safety and recovery monitor for CATS/ISARA sample changers")]
#[command(long_about = None)]
struct Args {
    /// Path to the monitor configuration file.
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Controller host, overrides the configuration.
    #[arg(long)]
    host: Option<String>,

    /// Controller model (cats, isara, isara2), overrides the configuration.
    #[arg(long)]
    model: Option<Model>,

    /// Start the failed-get recovery as soon as it is detected.
    #[arg(long)]
    auto_recover: bool,

    /// Poll once, print the snapshot as JSON and exit.
    #[arg(long)]
    once: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json: bool,
}

fn main() {
    if let Err(e) = run() {
        error!("cats_monitor failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            setup_tracing(&args, LogLevel::default());
            return Err(e.into());
        }
    };
    setup_tracing(&args, config.shared.log_level);

    info!(
        "{} v{} starting ({} at {}:{}/{})",
        config.shared.service_name,
        env!("CARGO_PKG_VERSION"),
        config.robot.model,
        config.robot.host,
        config.robot.operate_port,
        config.robot.monitor_port
    );

    let client = CatsClient::new(config.robot);

    if args.once {
        client.connect()?;
        let snapshot = client.poll()?;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        client.disconnect();
        return Ok(());
    }

    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        info!("Received shutdown signal");
        flag.store(false, Ordering::SeqCst);
    })?;

    if let Err(e) = client.connect() {
        warn!("Initial connection failed: {}", e);
    }

    let result = monitor_loop(&client, &running, args.auto_recover);
    client.disconnect();
    info!("cats_monitor stopped");
    result
}

fn load_config(args: &Args) -> Result<MonitorConfig, Box<dyn std::error::Error>> {
    let mut config = MonitorConfig::load(&args.config)?;
    if let Some(host) = &args.host {
        config.robot.host.clone_from(host);
    }
    if let Some(model) = args.model {
        config.robot.model = model;
    }
    config.validate()?;
    Ok(config)
}

/// Poll until `running` drops. Fails when reconnection gives up.
fn monitor_loop(
    client: &CatsClient,
    running: &AtomicBool,
    auto_recover: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let interval = client.config().update_interval();
    let mut previous = StatusSnapshot::default();
    let mut was_safe = true;
    let mut was_needed = false;
    let mut was_failed = false;

    while running.load(Ordering::SeqCst) {
        if !client.is_connected() {
            match client.reconnect() {
                Ok(true) => info!("Connected to controller"),
                Ok(false) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        match client.poll() {
            Ok(snapshot) => {
                for (name, value) in snapshot.changes_since(&previous) {
                    debug!("{} = {}", name, value);
                }
                previous = snapshot;

                let safe = client.is_safe();
                if safe != was_safe {
                    let info = client.path_info();
                    info!(
                        "Path '{}' {} (ri1={}, ri2={})",
                        info.pathname,
                        if safe { "clear of diffractometer" } else { "entering diffractometer" },
                        info.ri1_count,
                        info.ri2_count
                    );
                    was_safe = safe;
                }

                let needed = client.is_recovery_needed();
                if needed && !was_needed {
                    warn!("Failed get detected");
                    if auto_recover && client.start_recovery() == StartOutcome::Started {
                        info!("Recovery started");
                    }
                } else if !needed && was_needed {
                    info!("Recovery no longer needed");
                }
                was_needed = needed;

                let failed = client.recovery_failed();
                if failed && !was_failed {
                    error!(
                        "Recovery stopped: {}",
                        client.recovery_error().unwrap_or_default()
                    );
                }
                was_failed = failed;
            }
            Err(ClientError::PollInProgress) => {}
            Err(e) => warn!("Poll failed: {}", e),
        }

        std::thread::sleep(interval);
    }
    Ok(())
}

/// Setup tracing subscriber based on CLI arguments.
fn setup_tracing(args: &Args, log_level: LogLevel) {
    let level = if args.verbose {
        Level::DEBUG
    } else {
        log_level.into()
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}
