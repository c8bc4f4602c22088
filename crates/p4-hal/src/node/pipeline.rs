//! Node: one pipeline's lifecycle and its serialized entry points.

use super::types::{Lifecycle, NodeStats};
use crate::audit::{AuditCategory, AuditOutcome, AuditRecord};
use crate::audit_log;
use crate::chassis::ChassisState;
use crate::error::{HalError, HalResult};
use crate::schema::PipelineSchema;
use p4rt_proto::ForwardingPipelineConfig;
use parking_lot::{Mutex, RwLock};
use pipeline_runtime::PipelineRuntime;
use std::sync::Arc;
use tracing::{debug, info, instrument};

pub(super) struct NodeState {
    pub(super) config: Option<ForwardingPipelineConfig>,
    pub(super) schema: Option<Arc<PipelineSchema>>,
    pub(super) lifecycle: Lifecycle,
}

impl NodeState {
    /// Schema of the committed pipeline.
    pub(super) fn loaded_schema(&self, node_id: u64) -> HalResult<&PipelineSchema> {
        match (&self.schema, self.lifecycle) {
            (Some(schema), Lifecycle::PipelineLoaded) => Ok(schema),
            _ => Err(HalError::not_initialized(format!(
                "no pipeline committed on node {}",
                node_id
            ))),
        }
    }
}

/// Owns one pipeline on the runtime.
///
/// Writes and pipeline pushes take the node lock exclusively; reads share it.
pub struct Node {
    pub(super) node_id: u64,
    pub(super) runtime: Arc<dyn PipelineRuntime>,
    pub(super) state: RwLock<NodeState>,
    pub(super) stats: Mutex<NodeStats>,
}

impl Node {
    /// Creates a node bound to pipeline `node_id` on `runtime`.
    pub fn new(node_id: u64, runtime: Arc<dyn PipelineRuntime>) -> Self {
        Self {
            node_id,
            runtime,
            state: RwLock::new(NodeState {
                config: None,
                schema: None,
                lifecycle: Lifecycle::Uninitialized,
            }),
            stats: Mutex::new(NodeStats::default()),
        }
    }

    pub fn node_id(&self) -> u64 {
        self.node_id
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.state.read().lifecycle
    }

    pub fn schema(&self) -> Option<Arc<PipelineSchema>> {
        self.state.read().schema.clone()
    }

    pub fn stats(&self) -> NodeStats {
        self.stats.lock().clone()
    }

    /// Checks that a config carries a P4Info and a pipeline image and that
    /// the P4Info derives a valid schema.
    pub fn verify_forwarding_pipeline_config(
        &self,
        config: &ForwardingPipelineConfig,
    ) -> HalResult<PipelineSchema> {
        if config.p4info.is_none() {
            return Err(HalError::invalid_param(
                "forwarding pipeline config has no P4Info",
            ));
        }
        if config.p4_device_config.is_empty() {
            return Err(HalError::invalid_param(
                "forwarding pipeline config has an empty device config",
            ));
        }
        PipelineSchema::from_config(config)
    }

    /// Saves `config`, then commits it: loads the pipeline and attaches the
    /// node's ports from `chassis`.
    #[instrument(skip_all, fields(node_id = self.node_id))]
    pub fn push_forwarding_pipeline_config(
        &self,
        config: &ForwardingPipelineConfig,
        chassis: &ChassisState,
    ) -> HalResult<()> {
        let mut state = self.state.write();
        self.save_locked(&mut state, config)?;
        self.commit_locked(&mut state, chassis)
    }

    /// Stores `config` for a later commit and derives its schema.
    ///
    /// The raw config is stored even when its P4Info fails validation; the
    /// error is returned and the previous schema stays in place. A commit
    /// issued after such a failed save loads the rejected image under the
    /// previously accepted schema.
    #[instrument(skip_all, fields(node_id = self.node_id))]
    pub fn save_forwarding_pipeline_config(
        &self,
        config: &ForwardingPipelineConfig,
    ) -> HalResult<()> {
        let mut state = self.state.write();
        self.save_locked(&mut state, config)
    }

    #[instrument(skip_all, fields(node_id = self.node_id))]
    pub fn commit_forwarding_pipeline_config(&self, chassis: &ChassisState) -> HalResult<()> {
        let mut state = self.state.write();
        self.commit_locked(&mut state, chassis)
    }

    /// Stores the raw config, then swaps in its schema if it validates.
    /// On validation failure the previous schema stays in place.
    fn save_locked(
        &self,
        state: &mut NodeState,
        config: &ForwardingPipelineConfig,
    ) -> HalResult<()> {
        state.config = Some(config.clone());

        let schema = match self.verify_forwarding_pipeline_config(config) {
            Ok(schema) => schema,
            Err(e) => {
                audit_log!(AuditRecord::new(
                    AuditCategory::PipelineChange,
                    "Node",
                    "save_pipeline_config"
                )
                .with_object_id(self.node_id.to_string())
                .with_object_type("node")
                .with_error(e.to_string()));
                return Err(e);
            }
        };
        state.schema = Some(Arc::new(schema));
        debug!("Saved forwarding pipeline config");
        Ok(())
    }

    fn commit_locked(&self, state: &mut NodeState, chassis: &ChassisState) -> HalResult<()> {
        let config = state.config.as_ref().ok_or_else(|| {
            HalError::not_initialized(format!("no pipeline config saved on node {}", self.node_id))
        })?;
        if state.schema.is_none() {
            return Err(HalError::not_initialized(format!(
                "no valid pipeline schema on node {}",
                self.node_id
            )));
        }

        let reloaded = self.runtime.pipeline_exists(self.node_id);
        if reloaded {
            info!("Pipeline already loaded, re-pushing pipelines is not supported");
        } else if let Err(e) = self
            .runtime
            .load_pipeline(self.node_id, &config.p4_device_config)
        {
            audit_log!(AuditRecord::new(
                AuditCategory::PipelineChange,
                "Node",
                "load_pipeline"
            )
            .with_object_id(self.node_id.to_string())
            .with_object_type("node")
            .with_error(e.to_string()));
            return Err(e.into());
        } else {
            info!(
                bytes = config.p4_device_config.len(),
                "Loaded pipeline"
            );
        }
        state.lifecycle = Lifecycle::PipelineLoaded;

        let mut attached = Vec::new();
        for binding in chassis.ports(self.node_id) {
            match self.runtime.add_port(self.node_id, &binding.name) {
                Ok(ifindex) => {
                    debug!(port = %binding.name, port_id = binding.port_id, ifindex, "Attached port");
                    attached.push(binding.name.clone());
                }
                Err(e) => {
                    audit_log!(AuditRecord::new(
                        AuditCategory::PortChange,
                        "Node",
                        "add_port"
                    )
                    .with_object_id(binding.name.clone())
                    .with_object_type("port")
                    .with_error(e.to_string()));
                    return Err(e.into());
                }
            }
        }

        self.stats.lock().commits += 1;
        audit_log!(AuditRecord::new(
            AuditCategory::PipelineChange,
            "Node",
            "commit_pipeline_config"
        )
        .with_outcome(AuditOutcome::Success)
        .with_object_id(self.node_id.to_string())
        .with_object_type("node")
        .with_details(serde_json::json!({
            "reloaded": reloaded,
            "ports": attached,
        })));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chassis::{ChassisConfig, NodeConfig, SingletonPort};
    use crate::error::ErrorCode;
    use p4rt_proto::p4info::{Preamble, Table};
    use p4rt_proto::P4Info;
    use pipeline_runtime::SimRuntime;

    fn config() -> ForwardingPipelineConfig {
        ForwardingPipelineConfig {
            p4info: Some(P4Info {
                tables: vec![Table {
                    preamble: Some(Preamble::new(1, "ingress.t")),
                    ..Default::default()
                }],
                ..Default::default()
            }),
            p4_device_config: b"\x7fELF".to_vec(),
            cookie: None,
        }
    }

    fn chassis() -> ChassisState {
        let mut state = ChassisState::new();
        state
            .replace(&ChassisConfig {
                nodes: vec![NodeConfig {
                    id: 1,
                    name: "n1".to_string(),
                }],
                singleton_ports: vec![SingletonPort {
                    id: 1,
                    name: "eth0".to_string(),
                    node: 1,
                    admin_state: Default::default(),
                }],
            })
            .unwrap();
        state
    }

    fn node(dir: &tempfile::TempDir) -> (Node, Arc<SimRuntime>) {
        let runtime = Arc::new(SimRuntime::new(dir.path().join("bpf.o")));
        (Node::new(1, runtime.clone()), runtime)
    }

    #[test]
    fn test_new_node_is_uninitialized() {
        let dir = tempfile::tempdir().unwrap();
        let (node, _) = node(&dir);
        assert_eq!(node.lifecycle(), Lifecycle::Uninitialized);
        assert!(node.schema().is_none());
    }

    #[test]
    fn test_push_loads_pipeline_and_attaches_ports() {
        let dir = tempfile::tempdir().unwrap();
        let (node, runtime) = node(&dir);

        node.push_forwarding_pipeline_config(&config(), &chassis())
            .unwrap();

        assert_eq!(node.lifecycle(), Lifecycle::PipelineLoaded);
        assert!(runtime.pipeline_exists(1));
        assert_eq!(runtime.attached_ports(1), vec!["eth0"]);
        assert_eq!(node.stats().commits, 1);
    }

    #[test]
    fn test_repush_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let (node, _) = node(&dir);

        node.push_forwarding_pipeline_config(&config(), &chassis())
            .unwrap();
        node.push_forwarding_pipeline_config(&config(), &chassis())
            .unwrap();
        assert_eq!(node.stats().commits, 2);
    }

    #[test]
    fn test_verify_requires_p4info_and_image() {
        let dir = tempfile::tempdir().unwrap();
        let (node, _) = node(&dir);

        let mut no_info = config();
        no_info.p4info = None;
        assert_eq!(
            node.verify_forwarding_pipeline_config(&no_info)
                .unwrap_err()
                .code(),
            ErrorCode::InvalidParam
        );

        let mut no_image = config();
        no_image.p4_device_config.clear();
        assert_eq!(
            node.verify_forwarding_pipeline_config(&no_image)
                .unwrap_err()
                .code(),
            ErrorCode::InvalidParam
        );

        assert!(node.verify_forwarding_pipeline_config(&config()).is_ok());
    }

    #[test]
    fn test_invalid_config_keeps_previous_schema() {
        let dir = tempfile::tempdir().unwrap();
        let (node, _) = node(&dir);
        node.push_forwarding_pipeline_config(&config(), &chassis())
            .unwrap();

        let mut bad = config();
        if let Some(info) = bad.p4info.as_mut() {
            info.tables.push(info.tables[0].clone());
        }
        let err = node
            .push_forwarding_pipeline_config(&bad, &chassis())
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::InvalidP4Info);
        assert!(node.schema().unwrap().table(1).is_ok());
        assert_eq!(node.lifecycle(), Lifecycle::PipelineLoaded);
    }

    #[test]
    fn test_commit_after_failed_save_uses_previous_schema() {
        let dir = tempfile::tempdir().unwrap();
        let (node, runtime) = node(&dir);
        node.save_forwarding_pipeline_config(&config()).unwrap();

        let mut bad = config();
        if let Some(info) = bad.p4info.as_mut() {
            info.tables.push(info.tables[0].clone());
        }
        let err = node.save_forwarding_pipeline_config(&bad).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidP4Info);

        node.commit_forwarding_pipeline_config(&chassis()).unwrap();
        assert!(runtime.pipeline_exists(1));
        assert_eq!(node.schema().unwrap().tables().count(), 1);
    }

    #[test]
    fn test_commit_without_saved_config() {
        let dir = tempfile::tempdir().unwrap();
        let (node, _) = node(&dir);
        let err = node
            .commit_forwarding_pipeline_config(&chassis())
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::NotInitialized);
    }

    #[test]
    fn test_save_then_commit() {
        let dir = tempfile::tempdir().unwrap();
        let (node, runtime) = node(&dir);

        node.save_forwarding_pipeline_config(&config()).unwrap();
        assert_eq!(node.lifecycle(), Lifecycle::Uninitialized);
        assert!(!runtime.pipeline_exists(1));

        node.commit_forwarding_pipeline_config(&chassis()).unwrap();
        assert_eq!(node.lifecycle(), Lifecycle::PipelineLoaded);
    }
}
