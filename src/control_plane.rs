use crate::{
    errors::EdgeConfError,
    file_utils,
    runner::{RunOutcome, Runner},
};
use anyhow::{anyhow, Context, Result};
use fn_error_context::context;
use itertools::Itertools;
use serde_json::Value;
use std::path::{Path, PathBuf};

pub(crate) const KUBE_APISERVER_MANIFEST: &str = "kube-apiserver.yaml";
pub(crate) const KUBE_CONTROLLER_MANAGER_MANIFEST: &str = "kube-controller-manager.yaml";

const PREFERRED_ADDRESS_TYPES_FLAG: &str = "kubelet-preferred-address-types=";
const CONTROLLERS_FLAG: &str = "--controllers=";
const DISABLED_NODE_LIFECYCLE: &str = "-nodelifecycle,";
const DNS_CLUSTER_FIRST_WITH_HOST_NET: &str = "ClusterFirstWithHostNet";

/// Adjusts the kube-apiserver and kube-controller-manager static pods in
/// place so the control plane keeps working when some worker nodes are edge
/// nodes, reachable by hostname through the tunnel server rather than by a
/// direct address. Each manifest is rewritten only when a transformation
/// actually changed it, so re-running against already adjusted manifests
/// leaves them byte-for-byte untouched.
pub(crate) struct StaticPodRunner {
    kube_apiserver_path: PathBuf,
    kube_controller_manager_path: PathBuf,
}

impl StaticPodRunner {
    pub(crate) fn new(manifests_dir: &Path) -> Result<Self> {
        let kube_apiserver_path = manifests_dir.join(KUBE_APISERVER_MANIFEST);
        let kube_controller_manager_path = manifests_dir.join(KUBE_CONTROLLER_MANAGER_MANIFEST);

        for path in [&kube_apiserver_path, &kube_controller_manager_path] {
            if !file_utils::exists(path) {
                return Err(EdgeConfError::ManifestNotFound(path.clone()).into());
            }
        }

        Ok(Self {
            kube_apiserver_path,
            kube_controller_manager_path,
        })
    }
}

impl Runner for StaticPodRunner {
    fn run(&self) -> Result<RunOutcome> {
        let mut kube_apiserver_pod = load_static_pod(&self.kube_apiserver_path)?;
        let kube_apiserver_updated = patch_kube_apiserver_pod(&mut kube_apiserver_pod)?;

        let mut kube_controller_manager_pod = load_static_pod(&self.kube_controller_manager_path)?;
        let kube_controller_manager_updated = patch_kube_controller_manager_pod(&mut kube_controller_manager_pod)?;

        let outcome = RunOutcome {
            kube_apiserver_updated,
            kube_controller_manager_updated,
        };

        // The two write-backs are independent units of work. A failure
        // writing one manifest must not prevent attempting the other
        let mut write_errors = Vec::new();

        if outcome.kube_apiserver_updated {
            log::info!("updating {}", self.kube_apiserver_path.display());
            if let Err(err) = file_utils::commit_yaml(&kube_apiserver_pod, &self.kube_apiserver_path)
                .with_context(|| EdgeConfError::ManifestWrite(self.kube_apiserver_path.clone()))
            {
                write_errors.push(err);
            }
        } else {
            log::info!("{} already adjusted, leaving untouched", self.kube_apiserver_path.display());
        }

        if outcome.kube_controller_manager_updated {
            log::info!("updating {}", self.kube_controller_manager_path.display());
            if let Err(err) = file_utils::commit_yaml(&kube_controller_manager_pod, &self.kube_controller_manager_path)
                .with_context(|| EdgeConfError::ManifestWrite(self.kube_controller_manager_path.clone()))
            {
                write_errors.push(err);
            }
        } else {
            log::info!(
                "{} already adjusted, leaving untouched",
                self.kube_controller_manager_path.display()
            );
        }

        if !write_errors.is_empty() {
            return Err(anyhow!(write_errors.iter().map(|err| format!("{err:#}")).join("; ")));
        }

        Ok(outcome)
    }
}

fn load_static_pod(path: &Path) -> Result<Value> {
    let pod = file_utils::load_yaml(path).with_context(|| EdgeConfError::ManifestLoad(path.to_path_buf()))?;

    match pod.get("kind").and_then(Value::as_str) {
        Some("Pod") => Ok(pod),
        _ => Err(EdgeConfError::ManifestType(path.to_path_buf()).into()),
    }
}

/// Removes the --kubelet-preferred-address-types flag so the apiserver
/// addresses nodes by hostname unconditionally. Edge node hostnames resolve,
/// through cluster DNS, to the tunnel server's internal service rather than
/// to an address the apiserver can't reach.
#[context("patching kube-apiserver pod")]
fn patch_kube_apiserver_pod(pod: &mut Value) -> Result<bool> {
    let command_updated = patch_container_commands(pod, strip_preferred_address_types)?;

    // With hostNetwork the apiserver would otherwise fall back to the host
    // resolver, which knows nothing about the tunnel service's cluster name
    let dns_updated = set_dns_policy_cluster_first_with_host_net(pod)?;

    Ok(command_updated || dns_updated)
}

/// Disables the built-in nodelifecycle controller. The edge-aware controller
/// takes over node health and eviction decisions, so the stock controller
/// doesn't evict workloads from edge nodes during transient tunnel outages.
#[context("patching kube-controller-manager pod")]
fn patch_kube_controller_manager_pod(pod: &mut Value) -> Result<bool> {
    patch_container_commands(pod, disable_node_lifecycle_controller)
}

/// Applies the command transformation to every container in the pod,
/// reporting whether any container's command actually changed.
fn patch_container_commands(pod: &mut Value, transform: fn(Vec<String>) -> (Vec<String>, bool)) -> Result<bool> {
    let containers = pod
        .pointer_mut("/spec/containers")
        .context("no /spec/containers")?
        .as_array_mut()
        .context("/spec/containers not an array")?;

    let mut updated = false;
    for container in containers.iter_mut() {
        let Some(command) = container.get_mut("command") else {
            continue;
        };

        let args = command
            .as_array()
            .context("container command not an array")?
            .iter()
            .map(|arg| Ok(arg.as_str().context("container command argument not a string")?.to_string()))
            .collect::<Result<Vec<_>>>()?;

        let (args, changed) = transform(args);
        if changed {
            *command = Value::Array(args.into_iter().map(Value::String).collect());
            updated = true;
        }
    }

    Ok(updated)
}

/// Drops the first argument carrying --kubelet-preferred-address-types.
/// Exactly one matching argument is expected per container; the first match
/// is acted upon and later duplicates, if any, are deliberately ignored.
fn strip_preferred_address_types(command: Vec<String>) -> (Vec<String>, bool) {
    match command.iter().position(|arg| arg.contains(PREFERRED_ADDRESS_TYPES_FLAG)) {
        Some(index) => {
            let mut command = command;
            command.remove(index);
            (command, true)
        }
        None => (command, false),
    }
}

/// Inserts -nodelifecycle, right after the = of the first --controllers=
/// argument, unless the token is already present. Exactly one matching
/// argument is expected per container; the first match is acted upon and
/// later duplicates, if any, are deliberately ignored.
fn disable_node_lifecycle_controller(mut command: Vec<String>) -> (Vec<String>, bool) {
    let Some(index) = command.iter().position(|arg| arg.contains(CONTROLLERS_FLAG)) else {
        return (command, false);
    };

    let arg = &command[index];
    if arg.contains(DISABLED_NODE_LIFECYCLE) {
        return (command, false);
    }

    let Some(insert_point) = arg.find('=').map(|eq| eq + 1) else {
        return (command, false);
    };

    let patched = format!("{}{}{}", &arg[..insert_point], DISABLED_NODE_LIFECYCLE, &arg[insert_point..]);
    command[index] = patched;

    (command, true)
}

fn set_dns_policy_cluster_first_with_host_net(pod: &mut Value) -> Result<bool> {
    let spec = pod
        .pointer_mut("/spec")
        .context("no /spec")?
        .as_object_mut()
        .context("/spec not an object")?;

    if spec.get("dnsPolicy").and_then(Value::as_str) == Some(DNS_CLUSTER_FIRST_WITH_HOST_NET) {
        return Ok(false);
    }

    spec.insert(
        "dnsPolicy".to_string(),
        Value::String(DNS_CLUSTER_FIRST_WITH_HOST_NET.to_string()),
    );

    Ok(true)
}
