//! Loading of chassis and pipeline configuration from disk.
//!
//! The chassis config is YAML:
//!
//! ```yaml
//! nodes:
//!   - id: 1
//!     name: dp0
//! singleton_ports:
//!   - id: 1
//!     name: eth0
//!     node: 1
//!     admin_state: enabled
//! ```
//!
//! A pipeline is a binary-encoded P4Info plus the compiled pipeline object.

use crate::chassis::ChassisConfig;
use crate::error::{HalError, HalResult};
use p4rt_proto::{ForwardingPipelineConfig, P4Info};
use prost::Message;
use std::fs;
use std::path::Path;
use tracing::debug;

fn read(path: &Path, what: &str) -> HalResult<Vec<u8>> {
    fs::read(path).map_err(|e| {
        HalError::invalid_param(format!(
            "failed to read {} {}: {}",
            what,
            path.display(),
            e
        ))
    })
}

/// Parses a chassis config. Validation happens when it is pushed.
pub fn load_chassis_config(path: impl AsRef<Path>) -> HalResult<ChassisConfig> {
    let path = path.as_ref();
    let content = read(path, "chassis config")?;
    let config: ChassisConfig = serde_yaml::from_slice(&content).map_err(|e| {
        HalError::invalid_param(format!(
            "failed to parse chassis config {}: {}",
            path.display(),
            e
        ))
    })?;
    debug!(
        path = %path.display(),
        nodes = config.nodes.len(),
        ports = config.singleton_ports.len(),
        "Loaded chassis config"
    );
    Ok(config)
}

/// Builds a forwarding pipeline config from a P4Info file and a pipeline
/// object file.
pub fn load_pipeline_config(
    p4info_path: impl AsRef<Path>,
    object_path: impl AsRef<Path>,
) -> HalResult<ForwardingPipelineConfig> {
    let p4info_path = p4info_path.as_ref();
    let p4info = P4Info::decode(read(p4info_path, "P4Info")?.as_slice()).map_err(|e| {
        HalError::invalid_param(format!(
            "failed to decode P4Info {}: {}",
            p4info_path.display(),
            e
        ))
    })?;
    let p4_device_config = read(object_path.as_ref(), "pipeline object")?;

    Ok(ForwardingPipelineConfig {
        p4info: Some(p4info),
        p4_device_config,
        cookie: None,
    })
}
