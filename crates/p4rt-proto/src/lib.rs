//! P4Runtime message definitions.
//!
//! A hand-maintained subset of the P4Runtime v1 API (`p4.v1`) and the P4Info
//! pipeline description (`p4.config.v1`), derived with `prost` so they
//! encode to the same wire format as the upstream protobuf definitions.

pub mod p4info;
pub mod p4runtime;

pub use p4info::P4Info;
pub use p4runtime::{
    CounterData, CounterEntry, Entity, FieldMatch, ForwardingPipelineConfig, ReadRequest,
    ReadResponse, TableAction, TableEntry, Update, WriteRequest,
};
