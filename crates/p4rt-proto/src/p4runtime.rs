//! Messages from `p4/v1/p4runtime.proto`.
//!
//! Only the messages the HAL consumes are defined here. Field tags follow the
//! upstream definitions so the types interoperate with any P4Runtime peer.

use crate::p4info::P4Info;

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Uint128 {
    #[prost(uint64, tag = "1")]
    pub high: u64,
    #[prost(uint64, tag = "2")]
    pub low: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WriteRequest {
    #[prost(uint64, tag = "1")]
    pub device_id: u64,
    #[prost(message, optional, tag = "3")]
    pub election_id: ::core::option::Option<Uint128>,
    #[prost(message, repeated, tag = "4")]
    pub updates: ::prost::alloc::vec::Vec<Update>,
    #[prost(enumeration = "write_request::Atomicity", tag = "5")]
    pub atomicity: i32,
    #[prost(string, tag = "6")]
    pub role: ::prost::alloc::string::String,
}

pub mod write_request {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Atomicity {
        ContinueOnError = 0,
        RollbackOnError = 1,
        DataplaneAtomic = 2,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct WriteResponse {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadRequest {
    #[prost(uint64, tag = "1")]
    pub device_id: u64,
    #[prost(message, repeated, tag = "2")]
    pub entities: ::prost::alloc::vec::Vec<Entity>,
    #[prost(string, tag = "3")]
    pub role: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReadResponse {
    #[prost(message, repeated, tag = "1")]
    pub entities: ::prost::alloc::vec::Vec<Entity>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Update {
    #[prost(enumeration = "update::Type", tag = "1")]
    pub r#type: i32,
    #[prost(message, optional, tag = "2")]
    pub entity: ::core::option::Option<Entity>,
}

pub mod update {
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
    #[repr(i32)]
    pub enum Type {
        Unspecified = 0,
        Insert = 1,
        Modify = 2,
        Delete = 3,
    }
}

impl Update {
    pub fn new(kind: update::Type, entity: impl Into<Entity>) -> Self {
        Self {
            r#type: kind as i32,
            entity: Some(entity.into()),
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Entity {
    #[prost(oneof = "entity::Entity", tags = "1, 2, 5, 7, 8, 11")]
    pub entity: ::core::option::Option<entity::Entity>,
}

pub mod entity {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Entity {
        #[prost(message, tag = "1")]
        ExternEntry(super::ExternEntry),
        #[prost(message, tag = "2")]
        TableEntry(super::TableEntry),
        #[prost(message, tag = "5")]
        MeterEntry(super::MeterEntry),
        #[prost(message, tag = "7")]
        CounterEntry(super::CounterEntry),
        #[prost(message, tag = "8")]
        DirectCounterEntry(super::DirectCounterEntry),
        #[prost(message, tag = "11")]
        RegisterEntry(super::RegisterEntry),
    }
}

impl From<TableEntry> for Entity {
    fn from(entry: TableEntry) -> Self {
        Self {
            entity: Some(entity::Entity::TableEntry(entry)),
        }
    }
}

impl From<CounterEntry> for Entity {
    fn from(entry: CounterEntry) -> Self {
        Self {
            entity: Some(entity::Entity::CounterEntry(entry)),
        }
    }
}

impl From<MeterEntry> for Entity {
    fn from(entry: MeterEntry) -> Self {
        Self {
            entity: Some(entity::Entity::MeterEntry(entry)),
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ExternEntry {
    #[prost(uint32, tag = "1")]
    pub extern_type_id: u32,
    #[prost(uint32, tag = "2")]
    pub extern_id: u32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TableEntry {
    #[prost(uint32, tag = "1")]
    pub table_id: u32,
    #[prost(message, repeated, tag = "2")]
    pub r#match: ::prost::alloc::vec::Vec<FieldMatch>,
    #[prost(message, optional, tag = "3")]
    pub action: ::core::option::Option<TableAction>,
    #[prost(int32, tag = "4")]
    pub priority: i32,
    #[prost(bool, tag = "8")]
    pub is_default_action: bool,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct FieldMatch {
    #[prost(uint32, tag = "1")]
    pub field_id: u32,
    #[prost(oneof = "field_match::FieldMatchType", tags = "2, 3, 4, 6, 7")]
    pub field_match_type: ::core::option::Option<field_match::FieldMatchType>,
}

pub mod field_match {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Exact {
        #[prost(bytes = "vec", tag = "1")]
        pub value: ::prost::alloc::vec::Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Ternary {
        #[prost(bytes = "vec", tag = "1")]
        pub value: ::prost::alloc::vec::Vec<u8>,
        #[prost(bytes = "vec", tag = "2")]
        pub mask: ::prost::alloc::vec::Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Lpm {
        #[prost(bytes = "vec", tag = "1")]
        pub value: ::prost::alloc::vec::Vec<u8>,
        #[prost(int32, tag = "2")]
        pub prefix_len: i32,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Range {
        #[prost(bytes = "vec", tag = "1")]
        pub low: ::prost::alloc::vec::Vec<u8>,
        #[prost(bytes = "vec", tag = "2")]
        pub high: ::prost::alloc::vec::Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Optional {
        #[prost(bytes = "vec", tag = "1")]
        pub value: ::prost::alloc::vec::Vec<u8>,
    }

    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum FieldMatchType {
        #[prost(message, tag = "2")]
        Exact(Exact),
        #[prost(message, tag = "3")]
        Ternary(Ternary),
        #[prost(message, tag = "4")]
        Lpm(Lpm),
        #[prost(message, tag = "6")]
        Range(Range),
        #[prost(message, tag = "7")]
        Optional(Optional),
    }
}

impl FieldMatch {
    pub fn exact(field_id: u32, value: impl Into<Vec<u8>>) -> Self {
        Self {
            field_id,
            field_match_type: Some(field_match::FieldMatchType::Exact(field_match::Exact {
                value: value.into(),
            })),
        }
    }

    pub fn ternary(field_id: u32, value: impl Into<Vec<u8>>, mask: impl Into<Vec<u8>>) -> Self {
        Self {
            field_id,
            field_match_type: Some(field_match::FieldMatchType::Ternary(
                field_match::Ternary {
                    value: value.into(),
                    mask: mask.into(),
                },
            )),
        }
    }

    pub fn lpm(field_id: u32, value: impl Into<Vec<u8>>, prefix_len: i32) -> Self {
        Self {
            field_id,
            field_match_type: Some(field_match::FieldMatchType::Lpm(field_match::Lpm {
                value: value.into(),
                prefix_len,
            })),
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TableAction {
    #[prost(oneof = "table_action::Type", tags = "1, 2, 3")]
    pub r#type: ::core::option::Option<table_action::Type>,
}

pub mod table_action {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Type {
        #[prost(message, tag = "1")]
        Action(super::Action),
        #[prost(uint32, tag = "2")]
        ActionProfileMemberId(u32),
        #[prost(uint32, tag = "3")]
        ActionProfileGroupId(u32),
    }
}

impl From<Action> for TableAction {
    fn from(action: Action) -> Self {
        Self {
            r#type: Some(table_action::Type::Action(action)),
        }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Action {
    #[prost(uint32, tag = "1")]
    pub action_id: u32,
    #[prost(message, repeated, tag = "4")]
    pub params: ::prost::alloc::vec::Vec<action::Param>,
}

pub mod action {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Param {
        #[prost(uint32, tag = "2")]
        pub param_id: u32,
        #[prost(bytes = "vec", tag = "3")]
        pub value: ::prost::alloc::vec::Vec<u8>,
    }
}

impl Action {
    /// Builds an action whose params are numbered from 1 in the given order.
    pub fn with_params<I, V>(action_id: u32, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Vec<u8>>,
    {
        let params = values
            .into_iter()
            .zip(1u32..)
            .map(|(value, param_id)| action::Param {
                param_id,
                value: value.into(),
            })
            .collect();
        Self { action_id, params }
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Index {
    #[prost(int64, tag = "1")]
    pub index: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CounterData {
    #[prost(int64, tag = "1")]
    pub byte_count: i64,
    #[prost(int64, tag = "2")]
    pub packet_count: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CounterEntry {
    #[prost(uint32, tag = "1")]
    pub counter_id: u32,
    #[prost(message, optional, tag = "2")]
    pub index: ::core::option::Option<Index>,
    #[prost(message, optional, tag = "3")]
    pub data: ::core::option::Option<CounterData>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DirectCounterEntry {
    #[prost(message, optional, tag = "1")]
    pub table_entry: ::core::option::Option<TableEntry>,
    #[prost(message, optional, tag = "2")]
    pub data: ::core::option::Option<CounterData>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MeterEntry {
    #[prost(uint32, tag = "1")]
    pub meter_id: u32,
    #[prost(message, optional, tag = "2")]
    pub index: ::core::option::Option<Index>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RegisterEntry {
    #[prost(uint32, tag = "1")]
    pub register_id: u32,
    #[prost(message, optional, tag = "2")]
    pub index: ::core::option::Option<Index>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ForwardingPipelineConfig {
    #[prost(message, optional, tag = "1")]
    pub p4info: ::core::option::Option<P4Info>,
    #[prost(bytes = "vec", tag = "2")]
    pub p4_device_config: ::prost::alloc::vec::Vec<u8>,
    #[prost(message, optional, tag = "3")]
    pub cookie: ::core::option::Option<forwarding_pipeline_config::Cookie>,
}

pub mod forwarding_pipeline_config {
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct Cookie {
        #[prost(uint64, tag = "1")]
        pub cookie: u64,
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PacketOut {
    #[prost(bytes = "vec", tag = "1")]
    pub payload: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PacketIn {
    #[prost(bytes = "vec", tag = "1")]
    pub payload: ::prost::alloc::vec::Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamMessageRequest {
    #[prost(oneof = "stream_message_request::Update", tags = "2")]
    pub update: ::core::option::Option<stream_message_request::Update>,
}

pub mod stream_message_request {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Update {
        #[prost(message, tag = "2")]
        Packet(super::PacketOut),
    }
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct StreamMessageResponse {
    #[prost(oneof = "stream_message_response::Update", tags = "2")]
    pub update: ::core::option::Option<stream_message_response::Update>,
}

pub mod stream_message_response {
    #[derive(Clone, PartialEq, ::prost::Oneof)]
    pub enum Update {
        #[prost(message, tag = "2")]
        Packet(super::PacketIn),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use prost::Message;

    #[test]
    fn test_field_match_exact_wire_bytes() {
        let m = FieldMatch::exact(1, vec![0x0a]);
        assert_eq!(m.encode_to_vec(), vec![0x08, 0x01, 0x12, 0x03, 0x0a, 0x01, 0x0a]);
    }

    #[test]
    fn test_write_request_decode() {
        let entry = TableEntry {
            table_id: 7,
            r#match: vec![FieldMatch::lpm(2, vec![10, 0, 0, 0], 8)],
            action: Some(Action::with_params(3, [vec![1u8], vec![2u8]]).into()),
            ..Default::default()
        };
        let req = WriteRequest {
            device_id: 1,
            updates: vec![Update::new(update::Type::Insert, entry.clone())],
            ..Default::default()
        };

        let decoded = WriteRequest::decode(req.encode_to_vec().as_slice()).unwrap();
        assert_eq!(decoded.device_id, 1);
        assert_eq!(
            update::Type::try_from(decoded.updates[0].r#type).unwrap(),
            update::Type::Insert
        );
        assert_eq!(
            decoded.updates[0].entity,
            Some(Entity {
                entity: Some(entity::Entity::TableEntry(entry))
            })
        );
        assert_eq!(
            write_request::Atomicity::try_from(decoded.atomicity).unwrap(),
            write_request::Atomicity::ContinueOnError
        );
    }

    #[test]
    fn test_action_with_params_numbers_from_one() {
        let action = Action::with_params(9, [vec![1u8], vec![2u8], vec![3u8]]);
        let ids: Vec<u32> = action.params.iter().map(|p| p.param_id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_counter_entry_index_is_optional() {
        let entry = CounterEntry {
            counter_id: 4,
            ..Default::default()
        };
        let decoded = CounterEntry::decode(entry.encode_to_vec().as_slice()).unwrap();
        assert!(decoded.index.is_none());
    }
}
