//! Provisioning of the in-memory runtime from a pipeline schema.
//!
//! A real runtime learns its tables and counters from the compiled pipeline
//! image. [`SimRuntime`] cannot parse images, so the HAL declares the objects
//! a schema describes before the pipeline is committed.

use crate::schema::PipelineSchema;
use p4rt_proto::p4info::counter_spec::Unit as CounterUnit;
use pipeline_runtime::{CounterType, PipelineId, SimRuntime};
use tracing::debug;

fn counter_type(unit: CounterUnit) -> CounterType {
    match unit {
        CounterUnit::Bytes => CounterType::Bytes,
        CounterUnit::Packets => CounterType::Packets,
        CounterUnit::Both | CounterUnit::Unspecified => CounterType::BytesAndPackets,
    }
}

/// Declares every table and counter of `schema` on `runtime` under the
/// runtime's names. Table actions keep the schema's declaration order.
pub fn provision(runtime: &SimRuntime, pipeline: PipelineId, schema: &PipelineSchema) {
    for table in schema.tables() {
        let actions: Vec<String> = table
            .action_ids
            .iter()
            .filter_map(|id| schema.action(*id).ok())
            .map(|action| action.runtime_name.clone())
            .collect();
        debug!(table = %table.runtime_name, actions = actions.len(), "Declaring table");
        runtime.declare_table(pipeline, &table.runtime_name, actions);
    }

    for counter in schema.counters() {
        let size = usize::try_from(counter.size).unwrap_or(0);
        debug!(counter = %counter.runtime_name, size, "Declaring counter");
        runtime.declare_counter(
            pipeline,
            &counter.runtime_name,
            counter_type(counter.unit),
            size,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use p4rt_proto::p4info::{self, counter_spec, ActionRef, CounterSpec, Preamble};
    use p4rt_proto::P4Info;
    use pipeline_runtime::{CounterContext, PipelineRuntime, TableContext};

    #[test]
    fn test_provision_declares_runtime_objects() {
        let schema = PipelineSchema::from_p4info(&P4Info {
            tables: vec![p4info::Table {
                preamble: Some(Preamble::new(1, "ingress.fwd")),
                action_refs: vec![ActionRef::new(2), ActionRef::new(3)],
                ..Default::default()
            }],
            actions: vec![
                p4info::Action {
                    preamble: Some(Preamble::new(2, "ingress.drop")),
                    params: Vec::new(),
                },
                p4info::Action {
                    preamble: Some(Preamble::new(3, "NoAction")),
                    params: Vec::new(),
                },
            ],
            counters: vec![p4info::Counter {
                preamble: Some(Preamble::new(4, "ingress.bytes")),
                spec: Some(CounterSpec {
                    unit: counter_spec::Unit::Bytes as i32,
                }),
                size: 8,
            }],
            ..Default::default()
        })
        .unwrap();

        let runtime = SimRuntime::new("/tmp/unused.o");
        provision(&runtime, 1, &schema);
        runtime.mark_loaded(1);

        let table = TableContext::open(&runtime, 1, "ingress_fwd").unwrap();
        assert_eq!(table.action_id("ingress_drop").unwrap(), 1);
        assert_eq!(table.action_id("_NoAction").unwrap(), 2);

        let counter = CounterContext::open(&runtime, 1, "ingress_bytes").unwrap();
        assert_eq!(counter.kind(), CounterType::Bytes);
        assert_eq!(counter.entries().count(), 8);
        assert!(runtime.pipeline_exists(1));
    }
}
