//! Raw entry and counter types exchanged with the runtime.
//!
//! All byte buffers here are in the runtime's native byte order.

/// Identifies one loaded pipeline. Stable for the lifetime of a node.
pub type PipelineId = u64;

/// Handle to an open table context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableHandle(pub u64);

/// Handle to an open counter context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CounterHandle(pub u64);

/// Match kind of a raw key as understood by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchKind {
    Exact,
    Lpm,
    Ternary,
    Range,
}

/// One per-field match key.
///
/// `field` is the position of the matched field among the table's key
/// fields, so an entry may leave fields out without shifting the rest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawMatchKey {
    pub field: usize,
    pub kind: MatchKind,
    pub data: Vec<u8>,
    /// Only meaningful for ternary keys.
    pub mask: Vec<u8>,
    /// Only meaningful for LPM keys.
    pub prefix_len: u32,
}

impl RawMatchKey {
    pub fn exact(data: Vec<u8>) -> Self {
        Self {
            field: 0,
            kind: MatchKind::Exact,
            data,
            mask: Vec::new(),
            prefix_len: 0,
        }
    }

    pub fn ternary(data: Vec<u8>, mask: Vec<u8>) -> Self {
        Self {
            field: 0,
            kind: MatchKind::Ternary,
            data,
            mask,
            prefix_len: 0,
        }
    }

    pub fn lpm(data: Vec<u8>, prefix_len: u32) -> Self {
        Self {
            field: 0,
            kind: MatchKind::Lpm,
            data,
            mask: Vec::new(),
            prefix_len,
        }
    }

    /// Binds the key to the table field at `field`.
    pub fn at(mut self, field: usize) -> Self {
        self.field = field;
        self
    }
}

/// Action bound to a raw entry. `action_id` is the runtime's id, not the
/// P4Info id.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawAction {
    pub action_id: u32,
    pub params: Vec<Vec<u8>>,
}

impl RawAction {
    pub fn new(action_id: u32) -> Self {
        Self {
            action_id,
            params: Vec::new(),
        }
    }

    pub fn param(mut self, value: Vec<u8>) -> Self {
        self.params.push(value);
        self
    }
}

/// A raw table entry: match keys in table declaration order, an optional
/// action, and a priority (zero when unused).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawTableEntry {
    pub keys: Vec<RawMatchKey>,
    pub action: Option<RawAction>,
    pub priority: u32,
}

impl RawTableEntry {
    pub fn with_keys(keys: Vec<RawMatchKey>) -> Self {
        Self {
            keys,
            ..Default::default()
        }
    }
}

/// Kind of values an indirect counter maintains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CounterType {
    Bytes,
    Packets,
    BytesAndPackets,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RawCounterValue {
    pub bytes: u64,
    pub packets: u64,
}

impl RawCounterValue {
    pub fn new(bytes: u64, packets: u64) -> Self {
        Self { bytes, packets }
    }
}

/// A counter cell yielded while iterating a counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawCounterEntry {
    pub key: Vec<u8>,
    pub value: RawCounterValue,
}
