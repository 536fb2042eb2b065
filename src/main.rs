use anyhow::{Context, Result};
use config::EdgeConfConfig;
use std::sync::atomic::Ordering::Relaxed;

mod cli;
mod config;
mod control_plane;
mod errors;
mod file_utils;
mod logging;
mod runner;

#[cfg(test)]
mod tests;

fn main() -> Result<()> {
    logging::init().context("initializing logging")?;

    let config = EdgeConfConfig::new().context("parsing configuration")?;

    main_internal(&config)
}

fn main_internal(config: &EdgeConfConfig) -> Result<()> {
    if config.dry_run {
        file_utils::DRY_RUN.store(true, Relaxed);
    }

    let runner = runner::new_runner(&config.mode, &config.manifests_dir).context("building control plane runner")?;

    let run_result = runner.run().context("adjusting control plane static pods");

    logging::generate_summary(config, run_result.as_ref().ok()).context("generating summary")?;

    run_result.map(|_| ())
}
