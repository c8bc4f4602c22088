//! Per-pipeline node: lifecycle, write and read orchestration.
//!
//! A [`Node`] owns one pipeline on the runtime. Pipeline commits and write
//! batches take its lock exclusively; read batches share it.

mod pipeline;
mod read;
mod types;
mod write;

pub use pipeline::Node;
pub use types::{BatchResult, Lifecycle, NodeStats};
