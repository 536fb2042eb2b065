use crate::{control_plane::StaticPodRunner, errors::EdgeConfError};
use anyhow::Result;
use std::{path::Path, str::FromStr};
use strum_macros::{Display, EnumString};

/// How the control plane components are run on the node being adjusted. Only
/// static pods are currently implemented
#[derive(Copy, Clone, Debug, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub(crate) enum RunMode {
    Pod,
}

/// Which manifests a run actually rewrote. Manifests that were already in the
/// desired state are left untouched on disk
#[derive(Copy, Clone, Debug, Default, PartialEq, serde::Serialize)]
pub(crate) struct RunOutcome {
    pub(crate) kube_apiserver_updated: bool,
    pub(crate) kube_controller_manager_updated: bool,
}

pub(crate) trait Runner {
    fn run(&self) -> Result<RunOutcome>;
}

pub(crate) fn new_runner(mode: &str, manifests_dir: &Path) -> Result<Box<dyn Runner>> {
    match RunMode::from_str(mode) {
        Ok(RunMode::Pod) => Ok(Box::new(StaticPodRunner::new(manifests_dir)?)),
        Err(_) => Err(EdgeConfError::UnsupportedMode(mode.to_string()).into()),
    }
}
