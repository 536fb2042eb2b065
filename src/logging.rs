use crate::{config::EdgeConfConfig, runner::RunOutcome};
use anyhow::{bail, Context, Result};
use lazy_static::lazy_static;
use log::{Level, LevelFilter, Metadata, Record};
use std::sync::{Arc, Mutex};

struct EdgeConfLogger;

static LOGGER: EdgeConfLogger = EdgeConfLogger;

pub(crate) fn init() -> Result<()> {
    match log::set_logger(&LOGGER) {
        Ok(_) => log::set_max_level(LevelFilter::Info),
        Err(_) => bail!("logger initialization failed"),
    };

    Ok(())
}

lazy_static! {
    pub(crate) static ref LOG_RECORDS: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
}

impl log::Log for EdgeConfLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= Level::Info
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let log_string = format!(
                "{} - {} - {}:{}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            );

            {
                let mut log_records = match LOG_RECORDS.lock() {
                    Ok(log_records) => log_records,
                    Err(err) => {
                        println!("Failed to lock log records: {}", err);
                        return;
                    }
                };
                log_records.push(log_string.clone());
            }

            println!("{}", log_string);
        }
    }

    fn flush(&self) {}
}

#[derive(serde::Serialize)]
struct Summary<'a> {
    config: &'a EdgeConfConfig,
    outcome: Option<&'a RunOutcome>,
    logs: Vec<String>,
}

/// Writes a YAML summary of the run (effective config, which manifests were
/// rewritten, collected logs) to the configured summary file, if any.
pub(crate) fn generate_summary(config: &EdgeConfConfig, outcome: Option<&RunOutcome>) -> Result<()> {
    let Some(summary_file) = config.summary_file.clone() else {
        return Ok(());
    };

    let logs = match LOG_RECORDS.lock() {
        Ok(logs) => logs.clone(),
        Err(err) => {
            vec![format!("Failed to lock log records: {}", err)]
        }
    };

    let summary = Summary { config, outcome, logs };

    let summary_file = summary_file.0.create().context("opening summary file for writing")?;
    serde_yaml::to_writer(summary_file, &summary).context("serializing run summary into summary file")?;

    Ok(())
}
