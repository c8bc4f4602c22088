//! P4 hardware abstraction layer.
//!
//! Adapts P4Runtime requests to a match-action [`PipelineRuntime`]: table
//! entries and counter reads are encoded into the runtime's raw key, action
//! and counter formats, write and read batches are orchestrated per node, and
//! port bindings from the chassis config are replayed whenever a pipeline is
//! committed.
//!
//! # Architecture
//!
//! ```text
//! P4Runtime client
//!        │
//!        ▼
//!   [P4Switch] ──chassis──> [ChassisState]
//!        │ routes by device id
//!        ▼
//!     [Node] ──> codec (entries, counters) ──> [PipelineRuntime]
//!        │                                          ▲
//!        └── schema (from P4Info) ──────────────────┘
//! ```
//!
//! # Key Components
//!
//! - [`switch::P4Switch`]: the [`switch::SwitchInterface`] facade
//! - [`node::Node`]: pipeline lifecycle and batch orchestration
//! - [`codec`]: match key, action and counter encoding
//! - [`schema::PipelineSchema`]: validated view of a P4Info
//! - [`chassis::ChassisState`]: port bindings per node
//!
//! [`PipelineRuntime`]: pipeline_runtime::PipelineRuntime

pub mod audit;
pub mod chassis;
pub mod codec;
pub mod config;
pub mod error;
pub mod node;
pub mod schema;
pub mod sim;
pub mod switch;
pub mod writer;

pub use chassis::{ChassisConfig, ChassisState};
pub use error::{ErrorCode, HalError, HalResult};
pub use node::{BatchResult, Lifecycle, Node};
pub use schema::PipelineSchema;
pub use switch::{P4Switch, SwitchEvent, SwitchInterface};
pub use writer::{Writer, WriterClosed};
