//! Table entry encoding and read-back.

use super::bytes::{from_runtime, to_runtime};
use crate::error::{HalError, HalResult};
use crate::schema::{byte_width, ActionIndex, MatchFieldSchema, PipelineSchema, TableSchema};
use p4rt_proto::p4info::match_field::MatchType;
use p4rt_proto::p4runtime::field_match::FieldMatchType;
use p4rt_proto::p4runtime::{action, table_action, Action};
use p4rt_proto::{FieldMatch, TableEntry};
use pipeline_runtime::{MatchKind, RawAction, RawMatchKey, RawTableEntry};
use tracing::warn;

fn check_kind(field: &MatchFieldSchema, requested: MatchType) -> HalResult<()> {
    if field.match_type != MatchType::Unspecified && field.match_type != requested {
        return Err(HalError::invalid_param(format!(
            "field '{}' is {:?} but the request supplies a {:?} match",
            field.name, field.match_type, requested
        )));
    }
    Ok(())
}

fn encode_field(m: &FieldMatch, field: &MatchFieldSchema) -> HalResult<RawMatchKey> {
    let width = field.byte_width();
    match &m.field_match_type {
        Some(FieldMatchType::Exact(exact)) => {
            check_kind(field, MatchType::Exact)?;
            Ok(RawMatchKey::exact(to_runtime(&exact.value, width, &field.name)?))
        }
        Some(FieldMatchType::Ternary(ternary)) => {
            check_kind(field, MatchType::Ternary)?;
            if ternary.mask.is_empty() {
                return Err(HalError::invalid_param(format!(
                    "ternary field '{}' has no mask",
                    field.name
                )));
            }
            Ok(RawMatchKey::ternary(
                to_runtime(&ternary.value, width, &field.name)?,
                to_runtime(&ternary.mask, width, &field.name)?,
            ))
        }
        Some(FieldMatchType::Lpm(lpm)) => {
            check_kind(field, MatchType::Lpm)?;
            let prefix_len = u32::try_from(lpm.prefix_len)
                .ok()
                .filter(|len| *len <= field.bitwidth)
                .ok_or_else(|| {
                    HalError::invalid_param(format!(
                        "prefix length {} out of range for '{}' ({} bits)",
                        lpm.prefix_len, field.name, field.bitwidth
                    ))
                })?;
            Ok(RawMatchKey::lpm(
                to_runtime(&lpm.value, width, &field.name)?,
                prefix_len,
            ))
        }
        Some(FieldMatchType::Range(_)) | Some(FieldMatchType::Optional(_)) | None => {
            Err(HalError::invalid_param(format!(
                "unsupported match kind for field '{}'",
                field.name
            )))
        }
    }
}

/// Builds the raw match keys of `entry` in the table's field order.
///
/// Schema fields the request leaves out are skipped; each key records the
/// position of its field so read-back stays aligned. When
/// `insert_or_modify` is set the priority is checked against the presence of
/// a ternary key and attached to the raw entry; lookups and deletes carry no
/// priority.
pub fn encode_match_keys(
    entry: &TableEntry,
    table: &TableSchema,
    insert_or_modify: bool,
) -> HalResult<RawTableEntry> {
    let mut keys = Vec::with_capacity(table.match_fields.len());
    let mut has_ternary = false;

    for (position, field) in table.match_fields.iter().enumerate() {
        let Some(m) = entry.r#match.iter().find(|m| m.field_id == field.id) else {
            continue;
        };
        let key = encode_field(m, field)?.at(position);
        has_ternary |= key.kind == MatchKind::Ternary;
        keys.push(key);
    }

    for m in &entry.r#match {
        if table.field(m.field_id).is_none() {
            warn!(
                table = %table.name,
                field_id = m.field_id,
                "Ignoring match on a field the table does not declare"
            );
        }
    }

    let mut raw = RawTableEntry::with_keys(keys);
    if insert_or_modify {
        raw.priority = match (has_ternary, entry.priority) {
            (false, 0) => 0,
            (true, p) if p > 0 => p.unsigned_abs(),
            (true, p) => {
                return Err(HalError::invalid_param(format!(
                    "entry with a ternary match needs a positive priority, got {}",
                    p
                )))
            }
            (false, p) => {
                return Err(HalError::invalid_param(format!(
                    "priority {} set on an entry without a ternary match",
                    p
                )))
            }
        };
    }
    Ok(raw)
}

/// Encodes the direct action of an insert or modify request.
///
/// `resolve` maps the action's runtime name to the runtime's action id.
pub fn encode_action<F>(
    entry: &TableEntry,
    table: &TableSchema,
    schema: &PipelineSchema,
    resolve: F,
) -> HalResult<RawAction>
where
    F: FnOnce(&str) -> HalResult<u32>,
{
    let action = match entry.action.as_ref().and_then(|a| a.r#type.as_ref()) {
        Some(table_action::Type::Action(action)) => action,
        Some(_) => {
            return Err(HalError::invalid_param(
                "action profile members and groups are not supported",
            ))
        }
        None => return Err(HalError::invalid_param("table entry carries no action")),
    };

    if !table.permits_action(action.action_id) {
        return Err(HalError::invalid_param(format!(
            "action {} is not permitted in table '{}'",
            action.action_id, table.name
        )));
    }
    let action_schema = schema.action(action.action_id)?;

    let mut raw = RawAction::new(resolve(&action_schema.runtime_name)?);
    for param in &action_schema.params {
        let value = action
            .params
            .iter()
            .find(|p| p.param_id == param.id)
            .ok_or_else(|| {
                HalError::invalid_param(format!(
                    "action '{}' is missing param '{}'",
                    action_schema.name, param.name
                ))
            })?;
        raw.params
            .push(to_runtime(&value.value, param.byte_width(), &param.name)?);
    }
    Ok(raw)
}

fn unsupported_kind(key: &RawMatchKey, table: &TableSchema) -> HalError {
    HalError::invalid_param(format!(
        "unsupported match kind {:?} read back from '{}'",
        key.kind, table.name
    ))
}

/// Schema field a raw key belongs to. Positions must be strictly increasing
/// and the key's kind must match the field's declared kind.
fn aligned_field<'t>(
    key: &RawMatchKey,
    table: &'t TableSchema,
    next_position: usize,
) -> HalResult<&'t MatchFieldSchema> {
    let field = table
        .match_fields
        .get(key.field)
        .filter(|_| key.field >= next_position)
        .ok_or_else(|| {
            HalError::invalid_p4info(format!(
                "runtime key at position {} does not fit the fields of '{}'",
                key.field, table.name
            ))
        })?;

    let declared = match key.kind {
        MatchKind::Exact => MatchType::Exact,
        MatchKind::Ternary => MatchType::Ternary,
        MatchKind::Lpm => MatchType::Lpm,
        MatchKind::Range => return Err(unsupported_kind(key, table)),
    };
    if field.match_type != MatchType::Unspecified && field.match_type != declared {
        return Err(HalError::invalid_p4info(format!(
            "runtime key of field '{}' is {:?}, P4Info declares {:?}",
            field.name, key.kind, field.match_type
        )));
    }
    Ok(field)
}

/// Rebuilds a table entry from the runtime's view of it.
///
/// Each raw key is paired with the table field at its recorded position and
/// must agree with that field's match kind. `resolve_name` maps
/// the runtime action id to its runtime name, which must appear in
/// `actions`.
pub fn decode_table_entry<F>(
    raw: &RawTableEntry,
    table: &TableSchema,
    actions: &ActionIndex,
    resolve_name: F,
) -> HalResult<TableEntry>
where
    F: FnOnce(u32) -> HalResult<String>,
{
    if raw.keys.len() > table.match_fields.len() {
        return Err(HalError::invalid_p4info(format!(
            "runtime entry of '{}' has {} keys, table declares {}",
            table.name,
            raw.keys.len(),
            table.match_fields.len()
        )));
    }

    let mut entry = TableEntry {
        table_id: table.id,
        ..Default::default()
    };
    let mut has_ternary = false;
    let mut next_position = 0;

    for key in &raw.keys {
        let field = aligned_field(key, table, next_position)?;
        next_position = key.field + 1;

        let width = field.byte_width();
        let m = match key.kind {
            MatchKind::Exact => FieldMatch::exact(field.id, from_runtime(&key.data, width)),
            MatchKind::Ternary => {
                has_ternary = true;
                FieldMatch::ternary(
                    field.id,
                    from_runtime(&key.data, width),
                    from_runtime(&key.mask, width),
                )
            }
            MatchKind::Lpm => {
                let prefix_len = i32::try_from(key.prefix_len).map_err(|_| {
                    HalError::internal(format!("prefix length {} overflows", key.prefix_len))
                })?;
                FieldMatch::lpm(field.id, from_runtime(&key.data, width), prefix_len)
            }
            MatchKind::Range => return Err(unsupported_kind(key, table)),
        };
        entry.r#match.push(m);
    }

    if has_ternary {
        entry.priority = i32::try_from(raw.priority)
            .map_err(|_| HalError::internal(format!("priority {} overflows", raw.priority)))?;
    }

    if let Some(raw_action) = &raw.action {
        let name = resolve_name(raw_action.action_id)?;
        let info = actions.get(&name).ok_or_else(|| {
            HalError::invalid_p4info(format!(
                "runtime action '{}' of table '{}' is not in the P4Info",
                name, table.name
            ))
        })?;
        if raw_action.params.len() != info.param_bitwidths.len() {
            return Err(HalError::invalid_p4info(format!(
                "action '{}' has {} params in the runtime, {} in the P4Info",
                name,
                raw_action.params.len(),
                info.param_bitwidths.len()
            )));
        }

        let params = raw_action
            .params
            .iter()
            .zip(&info.param_bitwidths)
            .zip(1u32..)
            .map(|((value, bitwidth), param_id)| action::Param {
                param_id,
                value: from_runtime(value, byte_width(*bitwidth)),
            })
            .collect();
        entry.action = Some(
            Action {
                action_id: info.action_id,
                params,
            }
            .into(),
        );
    }

    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use p4rt_proto::p4info::{self, action as info_action, ActionRef, MatchField, Preamble, Table};
    use p4rt_proto::P4Info;
    use pretty_assertions::assert_eq;

    const TABLE: u32 = 100;
    const FORWARD: u32 = 200;
    const NO_ACTION: u32 = 201;
    const DROP: u32 = 202;

    fn schema() -> PipelineSchema {
        let info = P4Info {
            tables: vec![Table {
                preamble: Some(Preamble::new(TABLE, "ingress.acl")),
                match_fields: vec![
                    MatchField::new(1, "hdr.ethernet.dst_addr", 48, MatchType::Exact),
                    MatchField::new(2, "hdr.ethernet.ether_type", 16, MatchType::Ternary),
                    MatchField::new(3, "hdr.ipv4.dst_addr", 32, MatchType::Lpm),
                ],
                action_refs: vec![ActionRef::new(FORWARD), ActionRef::new(NO_ACTION)],
                ..Default::default()
            }],
            actions: vec![
                p4info::Action {
                    preamble: Some(Preamble::new(FORWARD, "ingress.forward")),
                    params: vec![
                        info_action::Param::new(1, "port", 9),
                        info_action::Param::new(2, "smac", 48),
                    ],
                },
                p4info::Action {
                    preamble: Some(Preamble::new(NO_ACTION, "NoAction")),
                    params: vec![],
                },
                p4info::Action {
                    preamble: Some(Preamble::new(DROP, "ingress.drop")),
                    params: vec![],
                },
            ],
            ..Default::default()
        };
        PipelineSchema::from_p4info(&info).unwrap()
    }

    fn full_entry() -> TableEntry {
        TableEntry {
            table_id: TABLE,
            r#match: vec![
                FieldMatch::exact(1, vec![0x00, 0x11, 0x22, 0x33, 0x44, 0x55]),
                FieldMatch::ternary(2, vec![0x08, 0x00], vec![0xff, 0xff]),
                FieldMatch::lpm(3, vec![10, 0, 0, 0], 8),
            ],
            action: Some(
                Action::with_params(
                    FORWARD,
                    [vec![0x01, 0x05], vec![0xaa, 0xbb, 0xcc, 0xdd, 0xee, 0xff]],
                )
                .into(),
            ),
            priority: 10,
            ..Default::default()
        }
    }

    fn resolve_forward(name: &str) -> HalResult<u32> {
        assert_eq!(name, "ingress_forward");
        Ok(1)
    }

    #[test]
    fn test_match_keys_follow_schema_order() {
        let schema = schema();
        let table = schema.table(TABLE).unwrap();
        let mut entry = full_entry();
        entry.r#match.reverse();

        let raw = encode_match_keys(&entry, table, true).unwrap();
        let kinds: Vec<MatchKind> = raw.keys.iter().map(|k| k.kind).collect();
        assert_eq!(kinds, vec![MatchKind::Exact, MatchKind::Ternary, MatchKind::Lpm]);
        assert_eq!(raw.keys, encode_match_keys(&full_entry(), table, true).unwrap().keys);
    }

    #[test]
    fn test_match_values_are_byte_reversed() {
        let schema = schema();
        let raw = encode_match_keys(&full_entry(), schema.table(TABLE).unwrap(), true).unwrap();

        assert_eq!(raw.keys[0].data, vec![0x55, 0x44, 0x33, 0x22, 0x11, 0x00]);
        assert_eq!(raw.keys[1].data, vec![0x00, 0x08]);
        assert_eq!(raw.keys[1].mask, vec![0xff, 0xff]);
        assert_eq!(raw.keys[2].data, vec![0, 0, 0, 10]);
        assert_eq!(raw.keys[2].prefix_len, 8);
        assert_eq!(raw.priority, 10);
    }

    #[test]
    fn test_omitted_fields_are_skipped() {
        let schema = schema();
        let entry = TableEntry {
            table_id: TABLE,
            r#match: vec![FieldMatch::lpm(3, vec![10, 0, 0, 0], 8)],
            ..Default::default()
        };

        let raw = encode_match_keys(&entry, schema.table(TABLE).unwrap(), true).unwrap();
        assert_eq!(raw.keys.len(), 1);
        assert_eq!(raw.keys[0].field, 2);
        assert_eq!(raw.priority, 0);
    }

    #[test]
    fn test_partial_match_round_trip_keeps_field_ids() {
        let schema = schema();
        let table = schema.table(TABLE).unwrap();
        let entry = TableEntry {
            table_id: TABLE,
            r#match: vec![FieldMatch::lpm(3, vec![10, 0, 0, 0], 8)],
            action: Some(Action::with_params(NO_ACTION, Vec::<Vec<u8>>::new()).into()),
            ..Default::default()
        };

        let mut raw = encode_match_keys(&entry, table, true).unwrap();
        raw.action = Some(encode_action(&entry, table, &schema, |_| Ok(2)).unwrap());

        let index = ActionIndex::for_table(table, &schema).unwrap();
        let decoded =
            decode_table_entry(&raw, table, &index, |_| Ok("_NoAction".to_string())).unwrap();
        assert_eq!(decoded, entry);
    }

    #[test]
    fn test_decode_kind_disagreeing_with_field_is_invalid_p4info() {
        let schema = schema();
        let table = schema.table(TABLE).unwrap();
        let raw = RawTableEntry::with_keys(vec![RawMatchKey::lpm(vec![0; 6], 8)]);

        let err = decode_table_entry(&raw, table, &ActionIndex::default(), |_| {
            Ok(String::new())
        })
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidP4Info);
    }

    #[test]
    fn test_decode_misplaced_key_is_invalid_p4info() {
        let schema = schema();
        let table = schema.table(TABLE).unwrap();
        for keys in [
            vec![RawMatchKey::exact(vec![0; 6]).at(3)],
            vec![
                RawMatchKey::lpm(vec![0; 4], 8).at(2),
                RawMatchKey::exact(vec![0; 6]),
            ],
        ] {
            let err = decode_table_entry(
                &RawTableEntry::with_keys(keys),
                table,
                &ActionIndex::default(),
                |_| Ok(String::new()),
            )
            .unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidP4Info);
        }
    }

    #[test]
    fn test_ternary_without_priority_rejected() {
        let schema = schema();
        let table = schema.table(TABLE).unwrap();
        for priority in [0, -3] {
            let mut entry = full_entry();
            entry.priority = priority;
            let err = encode_match_keys(&entry, table, true).unwrap_err();
            assert_eq!(err.code(), ErrorCode::InvalidParam);
        }
    }

    #[test]
    fn test_priority_without_ternary_rejected() {
        let schema = schema();
        let mut entry = full_entry();
        entry.r#match.retain(|m| m.field_id != 2);

        let err = encode_match_keys(&entry, schema.table(TABLE).unwrap(), true).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParam);
    }

    #[test]
    fn test_lookup_skips_priority_check() {
        let schema = schema();
        let mut entry = full_entry();
        entry.priority = 0;

        let raw = encode_match_keys(&entry, schema.table(TABLE).unwrap(), false).unwrap();
        assert_eq!(raw.priority, 0);
        assert_eq!(raw.keys.len(), 3);

        entry.priority = 7;
        let raw = encode_match_keys(&entry, schema.table(TABLE).unwrap(), false).unwrap();
        assert_eq!(raw.priority, 0);
    }

    #[test]
    fn test_unsupported_match_kind_rejected() {
        let schema = schema();
        let mut entry = full_entry();
        entry.r#match[2] = FieldMatch {
            field_id: 3,
            field_match_type: Some(FieldMatchType::Range(
                p4rt_proto::p4runtime::field_match::Range {
                    low: vec![0; 4],
                    high: vec![0xff; 4],
                },
            )),
        };

        let err = encode_match_keys(&entry, schema.table(TABLE).unwrap(), true).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParam);
    }

    #[test]
    fn test_ternary_without_mask_rejected() {
        let schema = schema();
        let mut entry = full_entry();
        entry.r#match[1] = FieldMatch::ternary(2, vec![0x08, 0x00], Vec::new());
        assert!(encode_match_keys(&entry, schema.table(TABLE).unwrap(), true).is_err());
    }

    #[test]
    fn test_match_kind_must_agree_with_schema() {
        let schema = schema();
        let mut entry = full_entry();
        entry.r#match[0] = FieldMatch::lpm(1, vec![0; 6], 24);
        let err = encode_match_keys(&entry, schema.table(TABLE).unwrap(), true).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParam);
    }

    #[test]
    fn test_prefix_length_out_of_range_rejected() {
        let schema = schema();
        let mut entry = full_entry();
        entry.r#match[2] = FieldMatch::lpm(3, vec![10, 0, 0, 0], 33);
        assert!(encode_match_keys(&entry, schema.table(TABLE).unwrap(), true).is_err());
    }

    #[test]
    fn test_encode_action_params_in_schema_order() {
        let schema = schema();
        let mut entry = full_entry();
        if let Some(table_action::Type::Action(a)) =
            entry.action.as_mut().and_then(|a| a.r#type.as_mut())
        {
            a.params.reverse();
        }

        let raw = encode_action(&entry, schema.table(TABLE).unwrap(), &schema, resolve_forward)
            .unwrap();
        assert_eq!(raw.action_id, 1);
        assert_eq!(
            raw.params,
            vec![vec![0x05, 0x01], vec![0xff, 0xee, 0xdd, 0xcc, 0xbb, 0xaa]]
        );
    }

    #[test]
    fn test_missing_action_param_rejected() {
        let schema = schema();
        let mut entry = full_entry();
        entry.action = Some(Action::with_params(FORWARD, [vec![0x01, 0x05]]).into());

        let err = encode_action(&entry, schema.table(TABLE).unwrap(), &schema, resolve_forward)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParam);
    }

    #[test]
    fn test_action_not_permitted_rejected() {
        let schema = schema();
        let mut entry = full_entry();
        entry.action = Some(Action::with_params(DROP, Vec::<Vec<u8>>::new()).into());

        let err = encode_action(&entry, schema.table(TABLE).unwrap(), &schema, |_| Ok(1))
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParam);
    }

    #[test]
    fn test_no_action_uses_reserved_runtime_name() {
        let schema = schema();
        let mut entry = full_entry();
        entry.action = Some(Action::with_params(NO_ACTION, Vec::<Vec<u8>>::new()).into());

        let raw = encode_action(&entry, schema.table(TABLE).unwrap(), &schema, |name| {
            assert_eq!(name, "_NoAction");
            Ok(2)
        })
        .unwrap();
        assert_eq!(raw, RawAction::new(2));
    }

    #[test]
    fn test_missing_action_rejected() {
        let schema = schema();
        let mut entry = full_entry();
        entry.action = None;
        assert!(encode_action(&entry, schema.table(TABLE).unwrap(), &schema, |_| Ok(1)).is_err());
    }

    #[test]
    fn test_entry_round_trip() {
        let schema = schema();
        let table = schema.table(TABLE).unwrap();
        let entry = full_entry();

        let mut raw = encode_match_keys(&entry, table, true).unwrap();
        raw.action = Some(encode_action(&entry, table, &schema, resolve_forward).unwrap());

        let index = ActionIndex::for_table(table, &schema).unwrap();
        let decoded = decode_table_entry(&raw, table, &index, |id| {
            assert_eq!(id, 1);
            Ok("ingress_forward".to_string())
        })
        .unwrap();

        assert_eq!(decoded, entry);
    }

    #[test]
    fn test_round_trip_without_ternary_leaves_priority_unset() {
        let schema = schema();
        let table = schema.table(TABLE).unwrap();
        let mut entry = full_entry();
        entry.r#match = vec![
            FieldMatch::exact(1, vec![1, 2, 3, 4, 5, 6]),
        ];
        entry.priority = 0;
        entry.action = Some(Action::with_params(NO_ACTION, Vec::<Vec<u8>>::new()).into());

        let mut raw = encode_match_keys(&entry, table, true).unwrap();
        raw.action = Some(RawAction::new(2));
        raw.priority = 99;

        let index = ActionIndex::for_table(table, &schema).unwrap();
        let decoded =
            decode_table_entry(&raw, table, &index, |_| Ok("_NoAction".to_string())).unwrap();
        assert_eq!(decoded, entry);
    }

    #[test]
    fn test_decode_truncates_to_bitwidth() {
        let schema = schema();
        let table = schema.table(TABLE).unwrap();
        let raw = RawTableEntry {
            keys: vec![RawMatchKey::exact(vec![6, 5, 4, 3, 2, 1, 0xee, 0xee])],
            action: None,
            priority: 0,
        };

        let decoded = decode_table_entry(&raw, table, &ActionIndex::default(), |_| {
            Err(HalError::internal("no action expected"))
        })
        .unwrap();
        assert_eq!(decoded.r#match, vec![FieldMatch::exact(1, vec![1, 2, 3, 4, 5, 6])]);
    }

    #[test]
    fn test_decode_unknown_action_is_invalid_p4info() {
        let schema = schema();
        let table = schema.table(TABLE).unwrap();
        let raw = RawTableEntry {
            keys: vec![RawMatchKey::exact(vec![0; 6])],
            action: Some(RawAction::new(3)),
            priority: 0,
        };

        let index = ActionIndex::for_table(table, &schema).unwrap();
        let err =
            decode_table_entry(&raw, table, &index, |_| Ok("egress_rewrite".to_string()))
                .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidP4Info);
    }

    #[test]
    fn test_decode_range_key_rejected() {
        let schema = schema();
        let table = schema.table(TABLE).unwrap();
        let raw = RawTableEntry {
            keys: vec![RawMatchKey {
                field: 0,
                kind: MatchKind::Range,
                data: vec![0; 6],
                mask: vec![0; 6],
                prefix_len: 0,
            }],
            action: None,
            priority: 0,
        };

        let err = decode_table_entry(&raw, table, &ActionIndex::default(), |_| {
            Ok(String::new())
        })
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParam);
    }

    #[test]
    fn test_decode_extra_keys_is_invalid_p4info() {
        let schema = schema();
        let table = schema.table(TABLE).unwrap();
        let raw = RawTableEntry::with_keys(vec![RawMatchKey::exact(vec![0; 6]); 4]);

        let err = decode_table_entry(&raw, table, &ActionIndex::default(), |_| {
            Ok(String::new())
        })
        .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidP4Info);
    }
}
