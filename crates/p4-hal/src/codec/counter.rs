//! Indirect counter keys and values.

use crate::error::{HalError, HalResult};
use crate::schema::CounterSchema;
use p4rt_proto::p4info::counter_spec::Unit as CounterUnit;
use p4rt_proto::p4runtime::Index;
use p4rt_proto::{CounterData, CounterEntry};
use pipeline_runtime::{CounterType, RawCounterValue};

/// Runtime key of the counter cell at `index`.
pub fn counter_key(index: u32) -> Vec<u8> {
    index.to_le_bytes().to_vec()
}

/// Validates a requested counter index against the counter's size.
pub fn counter_index(counter: &CounterSchema, index: i64) -> HalResult<u32> {
    let in_range = index >= 0 && (counter.size == 0 || index < counter.size);
    match u32::try_from(index) {
        Ok(index) if in_range => Ok(index),
        _ => Err(HalError::invalid_param(format!(
            "index {} out of range for counter '{}' (size {})",
            index, counter.name, counter.size
        ))),
    }
}

/// Checks that the runtime's counter kind matches the P4Info unit.
pub fn check_counter_kind(counter: &CounterSchema, kind: CounterType) -> HalResult<()> {
    let expected = match counter.unit {
        CounterUnit::Bytes => CounterType::Bytes,
        CounterUnit::Packets => CounterType::Packets,
        CounterUnit::Both => CounterType::BytesAndPackets,
        CounterUnit::Unspecified => return Ok(()),
    };
    if kind != CounterType::Unknown && kind != expected {
        return Err(HalError::invalid_p4info(format!(
            "counter '{}' is {:?} in the runtime but {:?} in the P4Info",
            counter.name, kind, counter.unit
        )));
    }
    Ok(())
}

fn count(value: u64, what: &str) -> HalResult<i64> {
    i64::try_from(value).map_err(|_| HalError::internal(format!("{} count {} overflows", what, value)))
}

/// Populates only the fields the counter kind maintains.
pub fn decode_counter_value(kind: CounterType, value: RawCounterValue) -> HalResult<CounterData> {
    let mut data = CounterData::default();
    match kind {
        CounterType::Bytes => data.byte_count = count(value.bytes, "byte")?,
        CounterType::Packets => data.packet_count = count(value.packets, "packet")?,
        CounterType::BytesAndPackets => {
            data.byte_count = count(value.bytes, "byte")?;
            data.packet_count = count(value.packets, "packet")?;
        }
        CounterType::Unknown => {
            return Err(HalError::invalid_param("counter has an unknown type"));
        }
    }
    Ok(data)
}

pub fn counter_entry(counter_id: u32, index: i64, data: CounterData) -> CounterEntry {
    CounterEntry {
        counter_id,
        index: Some(Index { index }),
        data: Some(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use pretty_assertions::assert_eq;

    fn counter(unit: CounterUnit, size: i64) -> CounterSchema {
        CounterSchema {
            id: 300,
            name: "ingress.port_counter".to_string(),
            runtime_name: "ingress_port_counter".to_string(),
            unit,
            size,
        }
    }

    #[test]
    fn test_counter_key_is_native_u32() {
        assert_eq!(counter_key(5), vec![5, 0, 0, 0]);
        assert_eq!(counter_key(0x0102), vec![0x02, 0x01, 0, 0]);
    }

    #[test]
    fn test_counter_index_range() {
        let c = counter(CounterUnit::Both, 8);
        assert_eq!(counter_index(&c, 5).unwrap(), 5);
        assert_eq!(counter_index(&c, -1).unwrap_err().code(), ErrorCode::InvalidParam);
        assert_eq!(counter_index(&c, 8).unwrap_err().code(), ErrorCode::InvalidParam);

        let unsized_counter = counter(CounterUnit::Both, 0);
        assert_eq!(counter_index(&unsized_counter, 1000).unwrap(), 1000);
        assert!(counter_index(&unsized_counter, i64::from(u32::MAX) + 1).is_err());
    }

    #[test]
    fn test_decode_populates_fields_by_kind() {
        let value = RawCounterValue::new(1500, 3);

        let bytes = decode_counter_value(CounterType::Bytes, value).unwrap();
        assert_eq!((bytes.byte_count, bytes.packet_count), (1500, 0));

        let packets = decode_counter_value(CounterType::Packets, value).unwrap();
        assert_eq!((packets.byte_count, packets.packet_count), (0, 3));

        let both = decode_counter_value(CounterType::BytesAndPackets, value).unwrap();
        assert_eq!((both.byte_count, both.packet_count), (1500, 3));
    }

    #[test]
    fn test_decode_unknown_kind_is_invalid_param() {
        let err = decode_counter_value(CounterType::Unknown, RawCounterValue::default())
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidParam);
    }

    #[test]
    fn test_counter_kind_cross_check() {
        assert!(check_counter_kind(&counter(CounterUnit::Both, 1), CounterType::BytesAndPackets).is_ok());
        assert!(check_counter_kind(&counter(CounterUnit::Unspecified, 1), CounterType::Bytes).is_ok());
        assert!(check_counter_kind(&counter(CounterUnit::Bytes, 1), CounterType::Unknown).is_ok());

        let err = check_counter_kind(&counter(CounterUnit::Packets, 1), CounterType::Bytes)
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidP4Info);
    }
}
