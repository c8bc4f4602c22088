//! Switch facade routing requests to nodes.

use super::interface::{SwitchEvent, SwitchInterface};
use crate::audit::{AuditCategory, AuditOutcome, AuditRecord};
use crate::audit_log;
use crate::chassis::{ChassisConfig, ChassisState};
use crate::error::{HalError, HalResult};
use crate::node::{BatchResult, Node};
use crate::writer::Writer;
use p4rt_proto::p4runtime::{StreamMessageRequest, StreamMessageResponse};
use p4rt_proto::{ForwardingPipelineConfig, ReadRequest, ReadResponse, WriteRequest};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// A switch made of one or more pipeline nodes sharing a chassis config.
///
/// Chassis pushes take the chassis lock exclusively. Pipeline pushes hold it
/// shared while the node replays its ports, so a chassis push never races a
/// commit. Reads and writes only take their node's lock.
pub struct P4Switch {
    chassis: RwLock<ChassisState>,
    nodes: HashMap<u64, Arc<Node>>,
}

impl P4Switch {
    pub fn new<I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = Node>,
    {
        let nodes = nodes
            .into_iter()
            .map(|node| (node.node_id(), Arc::new(node)))
            .collect();
        Self {
            chassis: RwLock::new(ChassisState::new()),
            nodes,
        }
    }

    /// Looks up the node serving `node_id`.
    pub fn node(&self, node_id: u64) -> HalResult<&Arc<Node>> {
        self.nodes
            .get(&node_id)
            .ok_or_else(|| HalError::not_found(format!("node {}", node_id)))
    }

    /// Ids of the managed nodes, sorted.
    pub fn node_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.nodes.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Number of port bindings in the current chassis config.
    pub fn port_count(&self) -> usize {
        self.chassis.read().port_count()
    }
}

impl SwitchInterface for P4Switch {
    #[instrument(skip_all, fields(nodes = config.nodes.len(), ports = config.singleton_ports.len()))]
    fn push_chassis_config(&self, config: &ChassisConfig) -> HalResult<()> {
        let mut chassis = self.chassis.write();
        if let Err(e) = chassis.replace(config) {
            audit_log!(AuditRecord::new(
                AuditCategory::ConfigurationChange,
                "P4Switch",
                "push_chassis_config"
            )
            .with_error(e.to_string()));
            return Err(e);
        }

        for node in &config.nodes {
            if !self.nodes.contains_key(&node.id) {
                warn!(node_id = node.id, "Chassis config names a node this switch does not manage");
            }
        }
        audit_log!(AuditRecord::new(
            AuditCategory::ConfigurationChange,
            "P4Switch",
            "push_chassis_config"
        )
        .with_outcome(AuditOutcome::Success)
        .with_details(serde_json::json!({
            "nodes": config.nodes.len(),
            "ports": config.singleton_ports.len(),
        })));
        Ok(())
    }

    fn verify_chassis_config(&self, config: &ChassisConfig) -> HalResult<()> {
        ChassisState::verify(config)
    }

    fn push_forwarding_pipeline_config(
        &self,
        node_id: u64,
        config: &ForwardingPipelineConfig,
    ) -> HalResult<()> {
        let node = self.node(node_id)?;
        let chassis = self.chassis.read();
        node.push_forwarding_pipeline_config(config, &chassis)
    }

    fn save_forwarding_pipeline_config(
        &self,
        node_id: u64,
        config: &ForwardingPipelineConfig,
    ) -> HalResult<()> {
        self.node(node_id)?.save_forwarding_pipeline_config(config)
    }

    fn commit_forwarding_pipeline_config(&self, node_id: u64) -> HalResult<()> {
        let node = self.node(node_id)?;
        let chassis = self.chassis.read();
        node.commit_forwarding_pipeline_config(&chassis)
    }

    fn verify_forwarding_pipeline_config(
        &self,
        node_id: u64,
        config: &ForwardingPipelineConfig,
    ) -> HalResult<()> {
        self.node(node_id)?
            .verify_forwarding_pipeline_config(config)
            .map(|_| ())
    }

    fn shutdown(&self) -> HalResult<()> {
        info!("Switch shutdown");
        Ok(())
    }

    fn freeze(&self) -> HalResult<()> {
        Ok(())
    }

    fn unfreeze(&self) -> HalResult<()> {
        Ok(())
    }

    fn write_forwarding_entries(&self, req: &WriteRequest) -> BatchResult {
        match self.node(req.device_id) {
            Ok(node) => node.write_forwarding_entries(req),
            Err(e) => BatchResult::rejected(e),
        }
    }

    fn read_forwarding_entries(
        &self,
        req: &ReadRequest,
        writer: &mut dyn Writer<ReadResponse>,
    ) -> BatchResult {
        match self.node(req.device_id) {
            Ok(node) => node.read_forwarding_entries(req, writer),
            Err(e) => BatchResult::rejected(e),
        }
    }

    fn register_stream_message_response_writer(
        &self,
        _node_id: u64,
        _writer: Box<dyn Writer<StreamMessageResponse>>,
    ) -> HalResult<()> {
        Err(HalError::unimplemented("stream message response writers"))
    }

    fn unregister_stream_message_response_writer(&self, _node_id: u64) -> HalResult<()> {
        Err(HalError::unimplemented("stream message response writers"))
    }

    fn handle_stream_message_request(
        &self,
        _node_id: u64,
        _req: &StreamMessageRequest,
    ) -> HalResult<()> {
        Err(HalError::unimplemented("stream message requests"))
    }

    fn register_event_notify_writer(
        &self,
        _writer: Box<dyn Writer<SwitchEvent>>,
    ) -> HalResult<()> {
        Err(HalError::unimplemented("event notify writers"))
    }

    fn unregister_event_notify_writer(&self) -> HalResult<()> {
        Err(HalError::unimplemented("event notify writers"))
    }

    fn verify_state(&self) -> Vec<String> {
        Vec::new()
    }
}
