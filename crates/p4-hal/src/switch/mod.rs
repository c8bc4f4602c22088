//! Switch facade: the fixed switch contract and its node-routing
//! implementation.

mod interface;
mod p4_switch;

pub use interface::{SwitchEvent, SwitchInterface};
pub use p4_switch::P4Switch;
