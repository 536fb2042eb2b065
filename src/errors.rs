use std::path::PathBuf;
use thiserror::Error;

/// Failure modes of a manifest adjustment run. Every variant is fatal for the
/// run, nothing is retried, and manifests already written earlier in the same
/// run stay written.
#[derive(Debug, Error)]
pub(crate) enum EdgeConfError {
    #[error("{0} mode is not supported, only static pod mode is implemented")]
    UnsupportedMode(String),

    #[error("manifest file {} does not exist", .0.display())]
    ManifestNotFound(PathBuf),

    #[error("loading manifest file {}", .0.display())]
    ManifestLoad(PathBuf),

    #[error("manifest file {} is not a static pod", .0.display())]
    ManifestType(PathBuf),

    #[error("writing manifest file {}", .0.display())]
    ManifestWrite(PathBuf),
}
