//! Schema types derived from a P4Info description.

use p4rt_proto::p4info::counter_spec::Unit as CounterUnit;
use p4rt_proto::p4info::match_field::MatchType;

/// Number of whole bytes needed to hold `bitwidth` bits.
pub fn byte_width(bitwidth: u32) -> usize {
    (bitwidth as usize).div_ceil(8)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchFieldSchema {
    pub id: u32,
    pub name: String,
    /// `Unspecified` when P4Info names an architecture-specific match type.
    pub match_type: MatchType,
    pub bitwidth: u32,
}

impl MatchFieldSchema {
    pub fn byte_width(&self) -> usize {
        byte_width(self.bitwidth)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    pub id: u32,
    pub name: String,
    /// Name the pipeline runtime knows this table by.
    pub runtime_name: String,
    /// Match fields in declaration order.
    pub match_fields: Vec<MatchFieldSchema>,
    /// Permitted action ids in declaration order.
    pub action_ids: Vec<u32>,
    pub size: i64,
}

impl TableSchema {
    pub fn field(&self, field_id: u32) -> Option<&MatchFieldSchema> {
        self.match_fields.iter().find(|f| f.id == field_id)
    }

    pub fn permits_action(&self, action_id: u32) -> bool {
        self.action_ids.contains(&action_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionParamSchema {
    pub id: u32,
    pub name: String,
    pub bitwidth: u32,
}

impl ActionParamSchema {
    pub fn byte_width(&self) -> usize {
        byte_width(self.bitwidth)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionSchema {
    pub id: u32,
    pub name: String,
    pub runtime_name: String,
    /// Parameters in declaration order.
    pub params: Vec<ActionParamSchema>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterSchema {
    pub id: u32,
    pub name: String,
    pub runtime_name: String,
    pub unit: CounterUnit,
    pub size: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_byte_width_rounds_up() {
        assert_eq!(byte_width(1), 1);
        assert_eq!(byte_width(8), 1);
        assert_eq!(byte_width(9), 2);
        assert_eq!(byte_width(12), 2);
        assert_eq!(byte_width(48), 6);
        assert_eq!(byte_width(128), 16);
    }

    #[test]
    fn test_table_field_lookup() {
        let table = TableSchema {
            id: 1,
            name: "ingress.fwd".to_string(),
            runtime_name: "ingress_fwd".to_string(),
            match_fields: vec![MatchFieldSchema {
                id: 3,
                name: "dst".to_string(),
                match_type: MatchType::Exact,
                bitwidth: 48,
            }],
            action_ids: vec![10, 11],
            size: 1024,
        };

        assert_eq!(table.field(3).map(|f| f.byte_width()), Some(6));
        assert!(table.field(1).is_none());
        assert!(table.permits_action(11));
        assert!(!table.permits_action(12));
    }
}
