//! Read batch orchestration.

use super::pipeline::Node;
use super::types::{entity_name, BatchResult};
use crate::codec;
use crate::error::{HalError, HalResult};
use crate::schema::{ActionIndex, PipelineSchema};
use crate::writer::Writer;
use p4rt_proto::p4runtime::entity;
use p4rt_proto::{CounterEntry, Entity, ReadRequest, ReadResponse, TableEntry};
use pipeline_runtime::{CounterContext, RawTableEntry, RuntimeError, TableContext};
use tracing::{debug, instrument, warn};

/// Maps a failed single-key lookup: a missing key is `ERR_NOT_FOUND`, any
/// other runtime failure is internal.
fn lookup_error(err: RuntimeError, what: String) -> HalError {
    if err.is_no_entry() {
        HalError::not_found(what)
    } else {
        HalError::internal(format!("{}: {}", what, err))
    }
}

fn emit(writer: &mut dyn Writer<ReadResponse>, entity: Entity) -> HalResult<()> {
    writer
        .write(ReadResponse {
            entities: vec![entity],
        })
        .map_err(|e| HalError::internal(format!("failed to write read response: {}", e)))
}

impl Node {
    /// Serves every entity of a read batch, streaming results to `writer`.
    ///
    /// Reads share the node lock, so concurrent reads proceed together but
    /// never overlap a write or a pipeline commit.
    #[instrument(skip_all, fields(node_id = self.node_id, entities = req.entities.len()))]
    pub fn read_forwarding_entries(
        &self,
        req: &ReadRequest,
        writer: &mut dyn Writer<ReadResponse>,
    ) -> BatchResult {
        let state = self.state.read();

        if req.device_id != self.node_id {
            return BatchResult::rejected(HalError::invalid_param(format!(
                "read for device {} sent to node {}",
                req.device_id, self.node_id
            )));
        }
        let schema = match state.loaded_schema(self.node_id) {
            Ok(schema) => schema,
            Err(e) => return BatchResult::rejected(e),
        };

        let mut emitted = 0u64;
        let details: Vec<HalResult<()>> = req
            .entities
            .iter()
            .map(|entity| {
                let result = match entity.entity.as_ref() {
                    Some(entity::Entity::TableEntry(entry)) => {
                        self.read_table_entries(schema, entry, writer)
                    }
                    Some(entity::Entity::CounterEntry(entry)) => {
                        self.read_counter_entries(schema, entry, writer)
                    }
                    Some(other) => Err(HalError::unimplemented(format!(
                        "reading {} entities",
                        entity_name(other)
                    ))),
                    None => Err(HalError::invalid_param("read request carries an empty entity")),
                };
                result.map(|count| emitted += count)
            })
            .collect();

        for (index, detail) in details.iter().enumerate() {
            if let Err(e) = detail {
                warn!(index, code = %e.code(), "Read failed: {}", e);
            }
        }

        let mut stats = self.stats.lock();
        stats.read_batches += 1;
        stats.entities_read += emitted;
        BatchResult::from_details(details)
    }

    fn read_table_entries(
        &self,
        schema: &PipelineSchema,
        entry: &TableEntry,
        writer: &mut dyn Writer<ReadResponse>,
    ) -> HalResult<u64> {
        if entry.table_id == 0 {
            return Err(HalError::oper_not_supported(
                "reading entries of all tables",
            ));
        }
        let table = schema.table(entry.table_id)?;
        let actions = ActionIndex::for_table(table, schema)?;
        let ctx = TableContext::open(self.runtime.as_ref(), self.node_id, &table.runtime_name)?;

        let decode = |raw: &RawTableEntry| {
            codec::decode_table_entry(raw, table, &actions, |id| {
                ctx.action_name(id).map_err(HalError::from)
            })
        };

        if entry.r#match.is_empty() {
            let mut count = 0;
            for raw in ctx.entries() {
                let decoded = decode(&raw?)?;
                emit(writer, decoded.into())?;
                count += 1;
            }
            debug!(table = %table.name, count, "Read all table entries");
            return Ok(count);
        }

        let lookup = codec::encode_match_keys(entry, table, false)?;
        let raw = ctx.get(&lookup.keys).map_err(|e| {
            lookup_error(e, format!("entry of table '{}'", table.name))
        })?;
        emit(writer, decode(&raw)?.into())?;
        Ok(1)
    }

    fn read_counter_entries(
        &self,
        schema: &PipelineSchema,
        entry: &CounterEntry,
        writer: &mut dyn Writer<ReadResponse>,
    ) -> HalResult<u64> {
        if entry.counter_id == 0 {
            return Err(HalError::invalid_param(
                "reading all counters is not supported",
            ));
        }
        let counter = schema.counter(entry.counter_id)?;
        let ctx = CounterContext::open(self.runtime.as_ref(), self.node_id, &counter.runtime_name)?;
        let kind = ctx.kind();
        codec::check_counter_kind(counter, kind)?;

        if let Some(index) = &entry.index {
            let cell = codec::counter_index(counter, index.index)?;
            let value = ctx.get(&codec::counter_key(cell)).map_err(|e| {
                lookup_error(e, format!("cell {} of counter '{}'", cell, counter.name))
            })?;
            let data = codec::decode_counter_value(kind, value)?;
            emit(writer, codec::counter_entry(counter.id, index.index, data).into())?;
            return Ok(1);
        }

        // Cells are numbered in iteration order; the runtime's own key is not read back.
        let mut count = 0;
        for (index, raw) in (0i64..).zip(ctx.entries()) {
            let data = codec::decode_counter_value(kind, raw?.value)?;
            emit(writer, codec::counter_entry(counter.id, index, data).into())?;
            count += 1;
        }
        debug!(counter = %counter.name, count, "Read all counter cells");
        Ok(count)
    }
}
