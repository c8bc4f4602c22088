//! The switch contract exposed to P4Runtime front ends.

use crate::chassis::ChassisConfig;
use crate::error::HalResult;
use crate::node::BatchResult;
use crate::writer::Writer;
use p4rt_proto::p4runtime::{StreamMessageRequest, StreamMessageResponse};
use p4rt_proto::{ForwardingPipelineConfig, ReadRequest, ReadResponse, WriteRequest};

/// Asynchronous notification about switch state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchEvent {
    PortOperStateChanged { node_id: u64, port_id: u32, up: bool },
}

/// Operations a P4Runtime server drives on a switch.
///
/// Node ids name the pipeline each call targets; a node the switch does not
/// manage is reported as `ERR_NOT_FOUND`.
pub trait SwitchInterface: Send + Sync {
    fn push_chassis_config(&self, config: &ChassisConfig) -> HalResult<()>;

    fn verify_chassis_config(&self, config: &ChassisConfig) -> HalResult<()>;

    /// Saves and commits a pipeline on one node.
    fn push_forwarding_pipeline_config(
        &self,
        node_id: u64,
        config: &ForwardingPipelineConfig,
    ) -> HalResult<()>;

    fn save_forwarding_pipeline_config(
        &self,
        node_id: u64,
        config: &ForwardingPipelineConfig,
    ) -> HalResult<()>;

    fn commit_forwarding_pipeline_config(&self, node_id: u64) -> HalResult<()>;

    fn verify_forwarding_pipeline_config(
        &self,
        node_id: u64,
        config: &ForwardingPipelineConfig,
    ) -> HalResult<()>;

    fn shutdown(&self) -> HalResult<()>;

    fn freeze(&self) -> HalResult<()>;

    fn unfreeze(&self) -> HalResult<()>;

    /// Routes a write batch to the node named by its device id.
    fn write_forwarding_entries(&self, req: &WriteRequest) -> BatchResult;

    /// Routes a read batch to the node named by its device id.
    fn read_forwarding_entries(
        &self,
        req: &ReadRequest,
        writer: &mut dyn Writer<ReadResponse>,
    ) -> BatchResult;

    fn register_stream_message_response_writer(
        &self,
        node_id: u64,
        writer: Box<dyn Writer<StreamMessageResponse>>,
    ) -> HalResult<()>;

    fn unregister_stream_message_response_writer(&self, node_id: u64) -> HalResult<()>;

    fn handle_stream_message_request(
        &self,
        node_id: u64,
        req: &StreamMessageRequest,
    ) -> HalResult<()>;

    fn register_event_notify_writer(&self, writer: Box<dyn Writer<SwitchEvent>>)
        -> HalResult<()>;

    fn unregister_event_notify_writer(&self) -> HalResult<()>;

    /// Inconsistencies between the HAL and the runtime, one per entry.
    fn verify_state(&self) -> Vec<String>;
}
