//! Write batch orchestration.

use super::pipeline::Node;
use super::types::{entity_name, BatchResult};
use crate::audit::{AuditCategory, AuditRecord};
use crate::audit_log;
use crate::codec;
use crate::error::{HalError, HalResult};
use crate::schema::PipelineSchema;
use p4rt_proto::p4runtime::update::Type as UpdateType;
use p4rt_proto::p4runtime::write_request::Atomicity;
use p4rt_proto::p4runtime::entity;
use p4rt_proto::{TableEntry, Update, WriteRequest};
use pipeline_runtime::TableContext;
use tracing::{instrument, warn};

impl Node {
    /// Applies every update of a continue-on-error batch.
    ///
    /// Each update is attempted regardless of earlier failures and gets its
    /// own result. The batch fails with `ERR_AT_LEAST_ONE_OPER_FAILED` if
    /// any update failed.
    #[instrument(skip_all, fields(node_id = self.node_id, updates = req.updates.len()))]
    pub fn write_forwarding_entries(&self, req: &WriteRequest) -> BatchResult {
        let state = self.state.write();

        if req.device_id != self.node_id {
            return BatchResult::rejected(HalError::invalid_param(format!(
                "write for device {} sent to node {}",
                req.device_id, self.node_id
            )));
        }
        match Atomicity::try_from(req.atomicity) {
            Ok(Atomicity::ContinueOnError) => {}
            _ => {
                let err = HalError::oper_not_supported(format!(
                    "atomicity {} is not supported",
                    req.atomicity
                ));
                audit_log!(AuditRecord::new(AuditCategory::EntryWrite, "Node", "write")
                    .with_object_id(self.node_id.to_string())
                    .with_object_type("node")
                    .with_error(err.to_string()));
                return BatchResult::rejected(err);
            }
        }
        let schema = match state.loaded_schema(self.node_id) {
            Ok(schema) => schema,
            Err(e) => return BatchResult::rejected(e),
        };

        let details: Vec<HalResult<()>> = req
            .updates
            .iter()
            .map(|update| self.write_update(schema, update))
            .collect();

        for (index, detail) in details.iter().enumerate() {
            if let Err(e) = detail {
                warn!(index, code = %e.code(), "Update failed: {}", e);
            }
        }

        let result = BatchResult::from_details(details);
        let mut stats = self.stats.lock();
        stats.write_batches += 1;
        stats.entries_written += (result.details.len() - result.failed_count()) as u64;
        stats.write_failures += result.failed_count() as u64;
        result
    }

    fn write_update(&self, schema: &PipelineSchema, update: &Update) -> HalResult<()> {
        let kind = UpdateType::try_from(update.r#type).unwrap_or(UpdateType::Unspecified);
        if kind == UpdateType::Unspecified {
            return Err(HalError::invalid_param(format!(
                "unspecified update type {}",
                update.r#type
            )));
        }

        match update.entity.as_ref().and_then(|e| e.entity.as_ref()) {
            Some(entity::Entity::TableEntry(entry)) => self.write_table_entry(schema, kind, entry),
            Some(other) => Err(HalError::unimplemented(format!(
                "writing {} entities",
                entity_name(other)
            ))),
            None => Err(HalError::invalid_param("update carries no entity")),
        }
    }

    fn write_table_entry(
        &self,
        schema: &PipelineSchema,
        kind: UpdateType,
        entry: &TableEntry,
    ) -> HalResult<()> {
        if entry.is_default_action {
            return Err(HalError::unimplemented("modifying the default action"));
        }
        let table = schema.table(entry.table_id)?;
        let ctx = TableContext::open(self.runtime.as_ref(), self.node_id, &table.runtime_name)?;

        let insert_or_modify = matches!(kind, UpdateType::Insert | UpdateType::Modify);
        let mut raw = codec::encode_match_keys(entry, table, insert_or_modify)?;
        if insert_or_modify {
            let action = codec::encode_action(entry, table, schema, |name| {
                ctx.action_id(name).map_err(HalError::from)
            })?;
            raw.action = Some(action);
        }

        match kind {
            UpdateType::Insert => ctx.add(&raw)?,
            UpdateType::Modify => ctx.update(&raw)?,
            UpdateType::Delete => ctx.delete(&raw)?,
            UpdateType::Unspecified => {
                return Err(HalError::invalid_param("unspecified update type"))
            }
        }
        Ok(())
    }
}
