//! The runtime capability surface.

use crate::error::RuntimeResult;
use crate::staging::StagedObject;
use crate::types::{
    CounterHandle, CounterType, PipelineId, RawCounterEntry, RawCounterValue, RawMatchKey,
    RawTableEntry, TableHandle,
};
use std::path::Path;

/// Byte-level API of a match-action pipeline runtime.
///
/// Every call is synchronous. Handles returned by the `*_context_init` calls
/// must be released with the matching `*_context_free`; the
/// [`TableContext`](crate::TableContext) and
/// [`CounterContext`](crate::CounterContext) guards do that on drop.
pub trait PipelineRuntime: Send + Sync {
    /// Returns true if a pipeline with this id is already loaded.
    fn pipeline_exists(&self, pipeline: PipelineId) -> bool;

    /// Location where pipeline images are staged before loading.
    fn staging_path(&self) -> &Path;

    /// Loads a pipeline object that already sits on disk.
    fn load_pipeline_object(&self, pipeline: PipelineId, path: &Path) -> RuntimeResult<()>;

    /// Loads a pipeline image held in memory.
    ///
    /// The runtime can only load from a file, so the image is written to
    /// [`staging_path`](Self::staging_path) first. The staged file is removed
    /// whether or not the load succeeds.
    fn load_pipeline(&self, pipeline: PipelineId, image: &[u8]) -> RuntimeResult<()> {
        let staged = StagedObject::write(self.staging_path(), image)?;
        self.load_pipeline_object(pipeline, staged.path())
    }

    /// Attaches a port to the pipeline and returns its interface index.
    fn add_port(&self, pipeline: PipelineId, name: &str) -> RuntimeResult<u32>;

    fn del_port(&self, pipeline: PipelineId, name: &str) -> RuntimeResult<()>;

    fn table_context_init(&self, pipeline: PipelineId, table: &str) -> RuntimeResult<TableHandle>;

    fn table_context_free(&self, handle: TableHandle);

    /// Resolves a runtime action name to the runtime's action id.
    fn table_action_id(&self, handle: TableHandle, action: &str) -> RuntimeResult<u32>;

    /// Resolves a runtime action id back to its name.
    fn table_action_name(&self, handle: TableHandle, action_id: u32) -> RuntimeResult<String>;

    fn table_add(&self, handle: TableHandle, entry: &RawTableEntry) -> RuntimeResult<()>;

    fn table_update(&self, handle: TableHandle, entry: &RawTableEntry) -> RuntimeResult<()>;

    /// Deletes the entry whose keys match `entry.keys`.
    fn table_delete(&self, handle: TableHandle, entry: &RawTableEntry) -> RuntimeResult<()>;

    fn table_get(&self, handle: TableHandle, keys: &[RawMatchKey]) -> RuntimeResult<RawTableEntry>;

    /// Advances the context's iteration cursor. `Ok(None)` marks the end.
    fn table_get_next(&self, handle: TableHandle) -> RuntimeResult<Option<RawTableEntry>>;

    fn counter_context_init(
        &self,
        pipeline: PipelineId,
        counter: &str,
    ) -> RuntimeResult<CounterHandle>;

    fn counter_context_free(&self, handle: CounterHandle);

    fn counter_type(&self, handle: CounterHandle) -> CounterType;

    fn counter_get(&self, handle: CounterHandle, key: &[u8]) -> RuntimeResult<RawCounterValue>;

    /// Advances the context's iteration cursor. `Ok(None)` marks the end.
    fn counter_get_next(&self, handle: CounterHandle) -> RuntimeResult<Option<RawCounterEntry>>;
}
