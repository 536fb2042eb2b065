use crate::cli::Cli;
use anyhow::{ensure, Context, Result};
use clap::Parser;
use clio::ClioPath;
use serde_json::Value;
use std::{ops::Deref, path::Path};

#[derive(Clone, Debug)]
pub(crate) struct ConfigPath(pub(crate) ClioPath);

impl std::fmt::Display for ConfigPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.to_string_lossy().fmt(f)
    }
}

impl Deref for ConfigPath {
    type Target = Path;

    fn deref(&self) -> &Self::Target {
        self.0.path()
    }
}

impl From<ClioPath> for ConfigPath {
    fn from(clio_path: ClioPath) -> Self {
        Self(clio_path)
    }
}

impl serde::Serialize for ConfigPath {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.0.to_string_lossy().as_ref())
    }
}

/// All parsed CLI arguments, coalesced into a single struct for convenience
#[derive(serde::Serialize)]
pub(crate) struct EdgeConfConfig {
    pub(crate) mode: String,
    pub(crate) manifests_dir: ConfigPath,
    pub(crate) dry_run: bool,
    pub(crate) summary_file: Option<ConfigPath>,
}

impl EdgeConfConfig {
    pub(crate) fn parse_from_config_file(config_bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_yaml::from_slice(config_bytes)?;

        let mut value = value.as_object().context("config file must be a YAML object")?.clone();

        let mode = match value.remove("mode") {
            Some(value) => value.as_str().context("mode must be a string")?.to_string(),
            None => "pod".to_string(),
        };

        let manifests_dir = {
            let value = value.remove("manifests_dir").context("manifests_dir must be set")?;
            let clio_path = ClioPath::new(value.as_str().context("manifests_dir must be a string")?)
                .context(format!("manifests_dir {}", value.as_str().unwrap()))?;

            ensure!(clio_path.try_exists()?, format!("manifests_dir must exist: {}", clio_path));
            ensure!(clio_path.is_dir(), format!("manifests_dir must be a directory: {}", clio_path));

            ConfigPath::from(clio_path)
        };

        let dry_run = value
            .remove("dry_run")
            .unwrap_or(Value::Bool(false))
            .as_bool()
            .context("dry_run must be a boolean")?;

        let summary_file = match value.remove("summary_file") {
            Some(value) => Some(ConfigPath::from(
                ClioPath::new(value.as_str().context("summary_file must be a string")?)
                    .context(format!("summary_file {}", value.as_str().unwrap()))?,
            )),
            None => None,
        };

        ensure!(
            value.is_empty(),
            "unknown keys {:?} in config file",
            value.keys().map(|key| key.to_string()).collect::<Vec<String>>().join(", ")
        );

        Ok(Self {
            mode,
            manifests_dir,
            dry_run,
            summary_file,
        })
    }

    pub(crate) fn parse_from_cli(cli: Cli) -> Result<Self> {
        Ok(Self {
            mode: cli.mode,
            manifests_dir: ConfigPath::from(cli.manifests_dir),
            dry_run: cli.dry_run,
            summary_file: cli.summary_file.map(ConfigPath::from),
        })
    }

    pub(crate) fn new() -> Result<EdgeConfConfig> {
        Ok(match std::env::var("EDGECONF_CONFIG") {
            Ok(var) => {
                let num_args = std::env::args().len();

                ensure!(
                    num_args == 1,
                    "EDGECONF_CONFIG is set, but there are {num_args} CLI arguments. EDGECONF_CONFIG is meant to be used with no arguments."
                );

                EdgeConfConfig::parse_from_config_file(&std::fs::read(&var).context(format!("reading EDGECONF_CONFIG file {}", var))?)
                    .context(format!("parsing EDGECONF_CONFIG file {}", var))?
            }
            Err(_) => EdgeConfConfig::parse_from_cli(Cli::parse()).context("CLI parsing")?,
        })
    }
}
