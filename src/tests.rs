use super::*;
use crate::config::ConfigPath;
use anyhow::Context;
use clio::ClioPath;
use serde_json::Value;
use serial_test::serial;

#[test]
#[serial]
fn test_main_internal() -> Result<()> {
    let tmp_dir = tempfile::tempdir()?;
    control_plane::tests::write_manifests(tmp_dir.path())?;

    let summary_path = tmp_dir.path().join("summary.yaml");
    let config = EdgeConfConfig {
        mode: "pod".to_string(),
        manifests_dir: ConfigPath(ClioPath::new(tmp_dir.path().to_str().context("non-unicode tempdir path")?)?),
        dry_run: false,
        summary_file: Some(ConfigPath(ClioPath::new(
            summary_path.to_str().context("non-unicode summary path")?,
        )?)),
    };

    main_internal(&config)?;

    let kube_apiserver_pod = file_utils::load_yaml(&tmp_dir.path().join(control_plane::KUBE_APISERVER_MANIFEST))?;
    assert_eq!(
        kube_apiserver_pod.pointer("/spec/dnsPolicy").and_then(Value::as_str),
        Some("ClusterFirstWithHostNet")
    );

    let summary = file_utils::load_yaml(&summary_path)?;
    assert_eq!(
        summary.pointer("/outcome/kube_apiserver_updated").and_then(Value::as_bool),
        Some(true)
    );
    assert_eq!(
        summary
            .pointer("/outcome/kube_controller_manager_updated")
            .and_then(Value::as_bool),
        Some(true)
    );
    assert_eq!(summary.pointer("/config/mode").and_then(Value::as_str), Some("pod"));

    Ok(())
}

#[test]
#[serial]
fn test_main_internal_unsupported_mode() -> Result<()> {
    let tmp_dir = tempfile::tempdir()?;
    control_plane::tests::write_manifests(tmp_dir.path())?;

    let config = EdgeConfConfig {
        mode: "systemd".to_string(),
        manifests_dir: ConfigPath(ClioPath::new(tmp_dir.path().to_str().context("non-unicode tempdir path")?)?),
        dry_run: false,
        summary_file: None,
    };

    let err = match main_internal(&config) {
        Ok(_) => anyhow::bail!("systemd mode should not be supported"),
        Err(err) => err,
    };

    assert!(format!("{err:#}").contains("systemd mode is not supported"));

    Ok(())
}
