//! Match-action pipeline runtime interface.
//!
//! This crate defines the capability surface the P4 HAL drives: loading a
//! compiled pipeline image, attaching ports, and creating, mutating and
//! iterating raw table entries and indirect counters.
//!
//! # Architecture
//!
//! - [`api`]: the [`PipelineRuntime`] trait
//! - [`context`]: scoped table/counter handles released on drop
//! - [`types`]: raw match keys, actions, entries and counter values
//! - [`error`]: errno-style status codes and the runtime error type
//! - [`staging`]: on-disk staging of pipeline images
//! - [`sim`]: an in-memory runtime
//!
//! # Example
//!
//! ```ignore
//! use pipeline_runtime::{PipelineRuntime, RawMatchKey, RuntimeResult, TableContext};
//!
//! fn lookup(rt: &dyn PipelineRuntime) -> RuntimeResult<()> {
//!     let ctx = TableContext::open(rt, 1, "ingress_routing")?;
//!     let entry = ctx.get(&[RawMatchKey::lpm(vec![0, 0, 0, 10], 8)])?;
//!     println!("action {:?}", entry.action);
//!     Ok(())
//! } // context freed here
//! ```

pub mod api;
pub mod context;
pub mod error;
pub mod sim;
pub mod staging;
pub mod types;

pub use api::PipelineRuntime;
pub use context::{CounterContext, TableContext};
pub use error::{RuntimeError, RuntimeResult, RuntimeStatus, RuntimeStatusExt};
pub use sim::SimRuntime;
pub use staging::StagedObject;
pub use types::{
    CounterHandle, CounterType, MatchKind, PipelineId, RawAction, RawCounterEntry,
    RawCounterValue, RawMatchKey, RawTableEntry, TableHandle,
};
