//! Scoped table and counter contexts.
//!
//! Each guard owns one runtime handle and frees it when dropped, so every
//! exit path of the calling operation releases the runtime's resources.

use crate::api::PipelineRuntime;
use crate::error::RuntimeResult;
use crate::types::{
    CounterHandle, CounterType, PipelineId, RawCounterEntry, RawCounterValue, RawMatchKey,
    RawTableEntry, TableHandle,
};

pub struct TableContext<'r> {
    runtime: &'r dyn PipelineRuntime,
    handle: TableHandle,
    name: String,
}

impl<'r> TableContext<'r> {
    pub fn open(
        runtime: &'r dyn PipelineRuntime,
        pipeline: PipelineId,
        name: &str,
    ) -> RuntimeResult<Self> {
        let handle = runtime.table_context_init(pipeline, name)?;
        Ok(Self {
            runtime,
            handle,
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handle(&self) -> TableHandle {
        self.handle
    }

    pub fn action_id(&self, action: &str) -> RuntimeResult<u32> {
        self.runtime.table_action_id(self.handle, action)
    }

    pub fn action_name(&self, action_id: u32) -> RuntimeResult<String> {
        self.runtime.table_action_name(self.handle, action_id)
    }

    pub fn add(&self, entry: &RawTableEntry) -> RuntimeResult<()> {
        self.runtime.table_add(self.handle, entry)
    }

    pub fn update(&self, entry: &RawTableEntry) -> RuntimeResult<()> {
        self.runtime.table_update(self.handle, entry)
    }

    pub fn delete(&self, entry: &RawTableEntry) -> RuntimeResult<()> {
        self.runtime.table_delete(self.handle, entry)
    }

    pub fn get(&self, keys: &[RawMatchKey]) -> RuntimeResult<RawTableEntry> {
        self.runtime.table_get(self.handle, keys)
    }

    /// Iterates every entry in the table in runtime order.
    pub fn entries(&self) -> TableEntries<'_, 'r> {
        TableEntries {
            ctx: self,
            done: false,
        }
    }
}

impl Drop for TableContext<'_> {
    fn drop(&mut self) {
        self.runtime.table_context_free(self.handle);
    }
}

pub struct TableEntries<'a, 'r> {
    ctx: &'a TableContext<'r>,
    done: bool,
}

impl Iterator for TableEntries<'_, '_> {
    type Item = RuntimeResult<RawTableEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.ctx.runtime.table_get_next(self.ctx.handle) {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

pub struct CounterContext<'r> {
    runtime: &'r dyn PipelineRuntime,
    handle: CounterHandle,
    name: String,
}

impl<'r> CounterContext<'r> {
    pub fn open(
        runtime: &'r dyn PipelineRuntime,
        pipeline: PipelineId,
        name: &str,
    ) -> RuntimeResult<Self> {
        let handle = runtime.counter_context_init(pipeline, name)?;
        Ok(Self {
            runtime,
            handle,
            name: name.to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> CounterType {
        self.runtime.counter_type(self.handle)
    }

    pub fn get(&self, key: &[u8]) -> RuntimeResult<RawCounterValue> {
        self.runtime.counter_get(self.handle, key)
    }

    pub fn entries(&self) -> CounterEntries<'_, 'r> {
        CounterEntries {
            ctx: self,
            done: false,
        }
    }
}

impl Drop for CounterContext<'_> {
    fn drop(&mut self) {
        self.runtime.counter_context_free(self.handle);
    }
}

pub struct CounterEntries<'a, 'r> {
    ctx: &'a CounterContext<'r>,
    done: bool,
}

impl Iterator for CounterEntries<'_, '_> {
    type Item = RuntimeResult<RawCounterEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.ctx.runtime.counter_get_next(self.ctx.handle) {
            Ok(Some(entry)) => Some(Ok(entry)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
