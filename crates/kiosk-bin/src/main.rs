//! Kiosk entrypoint.
use anyhow::Result;
use clap::Parser;
use kiosk_bin::{Args, configure_logging, install_panic_hook, run};
use std::path::Path;
use tracing::info;

fn main() -> Result<()> {
    let args = Args::parse();
    let _log_guard = configure_logging(Path::new("."))?;
    install_panic_hook();

    info!(target: "runtime", "startup");
    run(args)
}
