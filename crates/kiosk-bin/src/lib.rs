//! Entry point library for the kiosk display process: CLI parsing, logging
//! setup, and the top-level run loop wiring the receiver thread to the
//! render tick driver (§5).

mod runtime;
mod scheduler;

pub use runtime::Runtime;
pub use scheduler::{ManualScheduler, RealTimeScheduler, Scheduler};

use anyhow::{Context, Result};
use clap::Parser;
use core_config::Config;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug, Default)]
#[command(name = "kiosk", version, about = "Audio-production console kiosk display")]
pub struct Args {
    /// Optional configuration file path (overrides discovery of `kiosk.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Optional `host:port` override for the UDP listen address.
    #[arg(long = "bind")]
    pub bind: Option<String>,
    /// Stop after this many render ticks instead of running forever.
    /// Mainly useful for smoke-testing and the headless demo.
    #[arg(long = "max-ticks")]
    pub max_ticks: Option<usize>,
}

/// Mirrors the teacher binary's `configure_logging`: a non-blocking file
/// appender plus env-filter, installed once per process. Returns the guard
/// that must stay alive for the duration of the process (dropping it stops
/// the background flush thread).
pub fn configure_logging(log_dir: &Path) -> Result<Option<WorkerGuard>> {
    let log_path = log_dir.join("kiosk.log");
    if log_path.exists() {
        let _ = std::fs::remove_file(&log_path);
    }
    let file_appender = tracing_appender::rolling::never(log_dir, "kiosk.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    match tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(writer)
        .try_init()
    {
        Ok(()) => Ok(Some(guard)),
        Err(_already_set) => Ok(None),
    }
}

pub fn install_panic_hook() {
    static HOOK: Once = Once::new();
    HOOK.call_once(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            tracing::error!(target: "runtime.panic", ?info, "panic");
            default_panic(info);
        }));
    });
}

pub fn resolve_bind_addr(args: &Args, config: &Config) -> Result<SocketAddr> {
    let raw = args.bind.clone().unwrap_or_else(|| config.net().bind.clone());
    raw.parse()
        .with_context(|| format!("parsing bind address {raw:?}"))
}

/// Runs the receiver thread and render-tick loop until `args.max_ticks` is
/// reached (or forever, if `None`). This is the body of `main`, pulled out
/// so integration tests can drive it with a bounded tick count.
pub fn run(args: Args) -> Result<()> {
    let config = core_config::load_from(args.config.clone()).context("loading configuration")?;
    let bind_addr = resolve_bind_addr(&args, &config)?;

    let (producer, consumer) = core_queue::unbounded();
    let receiver = core_net::Receiver::spawn(bind_addr, config.net().recv_buffer, producer)
        .context("starting UDP receiver")?;
    info!(target: "runtime", %bind_addr, "receiver listening");

    let mut runtime = Runtime::new(&config, consumer);
    let mut scheduler = RealTimeScheduler::new(Duration::from_millis(config.tick().period_ms));

    let mut ticks_run = 0usize;
    loop {
        scheduler.wait_for_tick();
        let report = runtime.tick();
        if report.deferred > 0 {
            tracing::trace!(target: "coalesce", deferred = report.deferred, "backlog carried into next tick");
        }
        ticks_run += 1;
        if args.max_ticks.is_some_and(|max| ticks_run >= max) {
            break;
        }
    }

    receiver.shutdown();
    info!(target: "runtime", ticks_run, "shutdown");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_such_config() -> Config {
        core_config::load_from(Some(PathBuf::from("__no_such_kiosk_toml__"))).unwrap()
    }

    #[test]
    fn resolve_bind_addr_prefers_cli_override() {
        let config = no_such_config();
        let args = Args { bind: Some("127.0.0.1:9999".into()), ..Default::default() };
        let addr = resolve_bind_addr(&args, &config).unwrap();
        assert_eq!(addr.port(), 9999);
    }

    #[test]
    fn resolve_bind_addr_falls_back_to_config_default() {
        let config = no_such_config();
        let args = Args::default();
        let addr = resolve_bind_addr(&args, &config).unwrap();
        assert_eq!(addr.port(), 9001);
    }

    #[test]
    fn resolve_bind_addr_rejects_malformed_override() {
        let config = no_such_config();
        let args = Args { bind: Some("not-an-address".into()), ..Default::default() };
        assert!(resolve_bind_addr(&args, &config).is_err());
    }
}
