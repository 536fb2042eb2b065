use anyhow::{Context, Result};
use serde_json::Value;
use std::{
    fs,
    path::Path,
    sync::atomic::{AtomicBool, Ordering::Relaxed},
};

pub(crate) static DRY_RUN: AtomicBool = AtomicBool::new(false);

pub(crate) fn exists(path: &Path) -> bool {
    path.is_file()
}

pub(crate) fn read_file_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).context(format!("failed to read file {}", path.display()))
}

pub(crate) fn load_yaml(path: &Path) -> Result<Value> {
    serde_yaml::from_str(read_file_to_string(path)?.as_str()).context("failed to parse yaml")
}

/// Serializes the resource back to its file, unless this is a dry run. The
/// file is overwritten in place; the kubelet picks up rewritten static pod
/// manifests on its own.
pub(crate) fn commit_yaml(resource: &Value, path: &Path) -> Result<()> {
    if DRY_RUN.load(Relaxed) {
        return Ok(());
    }

    fs::write(path, serde_yaml::to_string(resource).context("serializing yaml")?).context(format!("writing {}", path.display()))
}
