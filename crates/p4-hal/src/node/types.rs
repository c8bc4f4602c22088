//! Node lifecycle and batch result types.

use crate::error::{HalError, HalResult};
use p4rt_proto::p4runtime::entity::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Uninitialized,
    PipelineLoaded,
}

/// Outcome of a write or read batch.
///
/// `details` holds one result per element, in request order. A batch that is
/// rejected before dispatch has no details.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchResult {
    pub overall: HalResult<()>,
    pub details: Vec<HalResult<()>>,
}

impl BatchResult {
    pub fn from_details(details: Vec<HalResult<()>>) -> Self {
        let overall = if details.iter().any(Result::is_err) {
            Err(HalError::AtLeastOneOperFailed)
        } else {
            Ok(())
        };
        Self { overall, details }
    }

    pub fn rejected(error: HalError) -> Self {
        Self {
            overall: Err(error),
            details: Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.overall.is_ok()
    }

    pub fn failed_count(&self) -> usize {
        self.details.iter().filter(|d| d.is_err()).count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeStats {
    pub commits: u64,
    pub write_batches: u64,
    pub entries_written: u64,
    pub write_failures: u64,
    pub read_batches: u64,
    pub entities_read: u64,
}

/// Name of an entity kind, for error messages.
pub(crate) fn entity_name(entity: &Entity) -> &'static str {
    match entity {
        Entity::ExternEntry(_) => "extern",
        Entity::TableEntry(_) => "table",
        Entity::MeterEntry(_) => "meter",
        Entity::CounterEntry(_) => "counter",
        Entity::DirectCounterEntry(_) => "direct counter",
        Entity::RegisterEntry(_) => "register",
    }
}
