//! Translation between P4Runtime entities and raw runtime data.
//!
//! Everything here is pure: no runtime calls are made. Callers pass
//! closures where a runtime lookup (action name or id) is needed.

mod bytes;
mod counter;
mod entry;

pub use bytes::{from_runtime, to_runtime};
pub use counter::{
    check_counter_kind, counter_entry, counter_index, counter_key, decode_counter_value,
};
pub use entry::{decode_table_entry, encode_action, encode_match_keys};
