//! Chassis configuration and the per-node port bindings derived from it.

mod state;
mod types;

pub use state::ChassisState;
pub use types::{AdminState, ChassisConfig, NodeConfig, PortBinding, SingletonPort};
