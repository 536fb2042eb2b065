use clap::Parser;
use clio::ClioPath;

/// A program to adjust the kubernetes control plane static pod manifests of a
/// cluster whose edge nodes are reachable only by hostname through the tunnel
/// server
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// How the control plane components are run on this node. Only "pod"
    /// (static pods) is currently implemented
    #[clap(long, default_value = "pod")]
    pub(crate) mode: String,

    /// Directory holding the control plane static pod manifests, such as
    /// /etc/kubernetes/manifests
    #[clap(long, value_parser = clap::value_parser!(ClioPath).exists().is_dir())]
    pub(crate) manifests_dir: ClioPath,

    /// Don't actually commit anything to disk. Useful for validating that the
    /// manifests can be adjusted error-free
    #[clap(long, default_value_t = false)]
    pub(crate) dry_run: bool,

    /// Generate a summary
    #[clap(long, value_parser = clap::value_parser!(ClioPath))]
    pub(crate) summary_file: Option<ClioPath>,
}
