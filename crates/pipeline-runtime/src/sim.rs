//! In-memory pipeline runtime.
//!
//! `SimRuntime` keeps pipelines, ports, tables and counters in process memory
//! and follows the runtime's errno conventions (`EEXIST` on duplicate insert,
//! `ENOENT` on lookups of missing objects). Tables and counters must be
//! declared before contexts can be opened on them.

use crate::api::PipelineRuntime;
use crate::error::{RuntimeError, RuntimeResult};
use crate::types::{
    CounterHandle, CounterType, PipelineId, RawCounterEntry, RawCounterValue, RawMatchKey,
    RawTableEntry, TableHandle,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// First interface index handed out to attached ports.
const FIRST_IFINDEX: u32 = 1;

#[derive(Debug, Default)]
struct SimTable {
    /// Runtime action names; the runtime id of an action is its position + 1.
    actions: Vec<String>,
    entries: Vec<RawTableEntry>,
}

impl SimTable {
    fn position(&self, keys: &[RawMatchKey]) -> Option<usize> {
        self.entries.iter().position(|e| e.keys == keys)
    }

    /// An entry written to the table must carry one of its declared actions.
    fn check_action(&self, entry: &RawTableEntry, call: &str) -> RuntimeResult<()> {
        let known = entry
            .action
            .as_ref()
            .is_some_and(|a| a.action_id >= 1 && (a.action_id as usize) <= self.actions.len());
        if known {
            Ok(())
        } else {
            Err(RuntimeError::invalid_argument(call))
        }
    }
}

#[derive(Debug)]
struct SimCounter {
    kind: CounterType,
    values: Vec<RawCounterValue>,
}

#[derive(Debug)]
struct Cursor {
    pipeline: PipelineId,
    name: String,
    next: usize,
}

#[derive(Debug, Default)]
struct SimState {
    pipelines: HashMap<PipelineId, usize>,
    ports: HashMap<(PipelineId, String), u32>,
    next_ifindex: u32,
    tables: HashMap<(PipelineId, String), SimTable>,
    counters: HashMap<(PipelineId, String), SimCounter>,
    table_cursors: HashMap<u64, Cursor>,
    counter_cursors: HashMap<u64, Cursor>,
    next_handle: u64,
}

impl SimState {
    fn alloc_handle(&mut self) -> u64 {
        self.next_handle += 1;
        self.next_handle
    }

    fn table(&mut self, handle: TableHandle, call: &str) -> RuntimeResult<&mut SimTable> {
        let cursor = self
            .table_cursors
            .get(&handle.0)
            .ok_or_else(|| RuntimeError::invalid_argument(call))?;
        let key = (cursor.pipeline, cursor.name.clone());
        self.tables
            .get_mut(&key)
            .ok_or_else(|| RuntimeError::no_entry(call))
    }

    fn counter(&self, handle: CounterHandle, call: &str) -> RuntimeResult<&SimCounter> {
        let cursor = self
            .counter_cursors
            .get(&handle.0)
            .ok_or_else(|| RuntimeError::invalid_argument(call))?;
        self.counters
            .get(&(cursor.pipeline, cursor.name.clone()))
            .ok_or_else(|| RuntimeError::no_entry(call))
    }
}

pub struct SimRuntime {
    staging_path: PathBuf,
    state: Mutex<SimState>,
}

impl SimRuntime {
    pub fn new(staging_path: impl Into<PathBuf>) -> Self {
        Self {
            staging_path: staging_path.into(),
            state: Mutex::new(SimState {
                next_ifindex: FIRST_IFINDEX,
                ..Default::default()
            }),
        }
    }

    /// Declares a table with the given runtime action names.
    pub fn declare_table<I, S>(&self, pipeline: PipelineId, name: &str, actions: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let table = SimTable {
            actions: actions.into_iter().map(Into::into).collect(),
            entries: Vec::new(),
        };
        self.state
            .lock()
            .tables
            .insert((pipeline, name.to_string()), table);
    }

    /// Declares an indirect counter with `size` zeroed cells.
    pub fn declare_counter(&self, pipeline: PipelineId, name: &str, kind: CounterType, size: usize) {
        let counter = SimCounter {
            kind,
            values: vec![RawCounterValue::default(); size],
        };
        self.state
            .lock()
            .counters
            .insert((pipeline, name.to_string()), counter);
    }

    /// Overwrites one counter cell, as traffic through the dataplane would.
    pub fn set_counter(
        &self,
        pipeline: PipelineId,
        name: &str,
        index: usize,
        value: RawCounterValue,
    ) -> RuntimeResult<()> {
        let mut state = self.state.lock();
        let counter = state
            .counters
            .get_mut(&(pipeline, name.to_string()))
            .ok_or_else(|| RuntimeError::no_entry("set_counter"))?;
        let cell = counter
            .values
            .get_mut(index)
            .ok_or_else(|| RuntimeError::no_entry("set_counter"))?;
        *cell = value;
        Ok(())
    }

    /// Marks a pipeline as loaded without going through an image.
    pub fn mark_loaded(&self, pipeline: PipelineId) {
        self.state.lock().pipelines.entry(pipeline).or_insert(0);
    }

    /// Names of the ports attached to a pipeline, sorted.
    pub fn attached_ports(&self, pipeline: PipelineId) -> Vec<String> {
        let state = self.state.lock();
        let mut ports: Vec<String> = state
            .ports
            .keys()
            .filter(|(p, _)| *p == pipeline)
            .map(|(_, name)| name.clone())
            .collect();
        ports.sort();
        ports
    }

    pub fn table_entries(&self, pipeline: PipelineId, name: &str) -> Vec<RawTableEntry> {
        self.state
            .lock()
            .tables
            .get(&(pipeline, name.to_string()))
            .map(|t| t.entries.clone())
            .unwrap_or_default()
    }

    /// Number of table and counter contexts currently open.
    pub fn open_contexts(&self) -> usize {
        let state = self.state.lock();
        state.table_cursors.len() + state.counter_cursors.len()
    }
}

impl PipelineRuntime for SimRuntime {
    fn pipeline_exists(&self, pipeline: PipelineId) -> bool {
        self.state.lock().pipelines.contains_key(&pipeline)
    }

    fn staging_path(&self) -> &Path {
        &self.staging_path
    }

    fn load_pipeline_object(&self, pipeline: PipelineId, path: &Path) -> RuntimeResult<()> {
        let image = fs::read(path).map_err(|_| RuntimeError::no_entry("load_pipeline_object"))?;
        if image.is_empty() {
            return Err(RuntimeError::invalid_argument("load_pipeline_object"));
        }

        let mut state = self.state.lock();
        if state.pipelines.contains_key(&pipeline) {
            return Err(RuntimeError::exists("load_pipeline_object"));
        }
        state.pipelines.insert(pipeline, image.len());
        info!(pipeline, bytes = image.len(), "Loaded pipeline object");
        Ok(())
    }

    fn add_port(&self, pipeline: PipelineId, name: &str) -> RuntimeResult<u32> {
        let mut state = self.state.lock();
        if !state.pipelines.contains_key(&pipeline) {
            return Err(RuntimeError::no_entry("add_port"));
        }
        let key = (pipeline, name.to_string());
        if let Some(ifindex) = state.ports.get(&key) {
            return Ok(*ifindex);
        }
        let ifindex = state.next_ifindex;
        state.next_ifindex += 1;
        state.ports.insert(key, ifindex);
        debug!(pipeline, port = name, ifindex, "Attached port");
        Ok(ifindex)
    }

    fn del_port(&self, pipeline: PipelineId, name: &str) -> RuntimeResult<()> {
        self.state
            .lock()
            .ports
            .remove(&(pipeline, name.to_string()))
            .map(|_| ())
            .ok_or_else(|| RuntimeError::no_entry("del_port"))
    }

    fn table_context_init(&self, pipeline: PipelineId, table: &str) -> RuntimeResult<TableHandle> {
        let mut state = self.state.lock();
        if !state.pipelines.contains_key(&pipeline)
            || !state.tables.contains_key(&(pipeline, table.to_string()))
        {
            return Err(RuntimeError::no_entry("table_context_init"));
        }
        let handle = state.alloc_handle();
        state.table_cursors.insert(
            handle,
            Cursor {
                pipeline,
                name: table.to_string(),
                next: 0,
            },
        );
        Ok(TableHandle(handle))
    }

    fn table_context_free(&self, handle: TableHandle) {
        self.state.lock().table_cursors.remove(&handle.0);
    }

    fn table_action_id(&self, handle: TableHandle, action: &str) -> RuntimeResult<u32> {
        let mut state = self.state.lock();
        let table = state.table(handle, "table_action_id")?;
        table
            .actions
            .iter()
            .position(|a| a == action)
            .and_then(|pos| u32::try_from(pos + 1).ok())
            .ok_or_else(|| RuntimeError::no_entry("table_action_id"))
    }

    fn table_action_name(&self, handle: TableHandle, action_id: u32) -> RuntimeResult<String> {
        let mut state = self.state.lock();
        let table = state.table(handle, "table_action_name")?;
        usize::try_from(action_id)
            .ok()
            .and_then(|id| id.checked_sub(1))
            .and_then(|pos| table.actions.get(pos))
            .cloned()
            .ok_or_else(|| RuntimeError::no_entry("table_action_name"))
    }

    fn table_add(&self, handle: TableHandle, entry: &RawTableEntry) -> RuntimeResult<()> {
        let mut state = self.state.lock();
        let table = state.table(handle, "table_add")?;
        table.check_action(entry, "table_add")?;
        if table.position(&entry.keys).is_some() {
            return Err(RuntimeError::exists("table_add"));
        }
        table.entries.push(entry.clone());
        Ok(())
    }

    fn table_update(&self, handle: TableHandle, entry: &RawTableEntry) -> RuntimeResult<()> {
        let mut state = self.state.lock();
        let table = state.table(handle, "table_update")?;
        table.check_action(entry, "table_update")?;
        let pos = table
            .position(&entry.keys)
            .ok_or_else(|| RuntimeError::no_entry("table_update"))?;
        table.entries[pos] = entry.clone();
        Ok(())
    }

    fn table_delete(&self, handle: TableHandle, entry: &RawTableEntry) -> RuntimeResult<()> {
        let mut state = self.state.lock();
        let table = state.table(handle, "table_delete")?;
        let pos = table
            .position(&entry.keys)
            .ok_or_else(|| RuntimeError::no_entry("table_delete"))?;
        table.entries.remove(pos);
        Ok(())
    }

    fn table_get(&self, handle: TableHandle, keys: &[RawMatchKey]) -> RuntimeResult<RawTableEntry> {
        let mut state = self.state.lock();
        let table = state.table(handle, "table_get")?;
        table
            .position(keys)
            .map(|pos| table.entries[pos].clone())
            .ok_or_else(|| RuntimeError::no_entry("table_get"))
    }

    fn table_get_next(&self, handle: TableHandle) -> RuntimeResult<Option<RawTableEntry>> {
        let mut state = self.state.lock();
        let (key, next) = {
            let cursor = state
                .table_cursors
                .get(&handle.0)
                .ok_or_else(|| RuntimeError::invalid_argument("table_get_next"))?;
            ((cursor.pipeline, cursor.name.clone()), cursor.next)
        };
        let entry = state
            .tables
            .get(&key)
            .and_then(|t| t.entries.get(next))
            .cloned();
        if entry.is_some() {
            if let Some(cursor) = state.table_cursors.get_mut(&handle.0) {
                cursor.next += 1;
            }
        }
        Ok(entry)
    }

    fn counter_context_init(
        &self,
        pipeline: PipelineId,
        counter: &str,
    ) -> RuntimeResult<CounterHandle> {
        let mut state = self.state.lock();
        if !state.pipelines.contains_key(&pipeline)
            || !state.counters.contains_key(&(pipeline, counter.to_string()))
        {
            return Err(RuntimeError::no_entry("counter_context_init"));
        }
        let handle = state.alloc_handle();
        state.counter_cursors.insert(
            handle,
            Cursor {
                pipeline,
                name: counter.to_string(),
                next: 0,
            },
        );
        Ok(CounterHandle(handle))
    }

    fn counter_context_free(&self, handle: CounterHandle) {
        self.state.lock().counter_cursors.remove(&handle.0);
    }

    fn counter_type(&self, handle: CounterHandle) -> CounterType {
        self.state
            .lock()
            .counter(handle, "counter_type")
            .map(|c| c.kind)
            .unwrap_or(CounterType::Unknown)
    }

    fn counter_get(&self, handle: CounterHandle, key: &[u8]) -> RuntimeResult<RawCounterValue> {
        let index: [u8; 4] = key
            .try_into()
            .map_err(|_| RuntimeError::invalid_argument("counter_get"))?;
        let index = u32::from_le_bytes(index) as usize;

        let state = self.state.lock();
        let counter = state.counter(handle, "counter_get")?;
        counter
            .values
            .get(index)
            .copied()
            .ok_or_else(|| RuntimeError::no_entry("counter_get"))
    }

    fn counter_get_next(&self, handle: CounterHandle) -> RuntimeResult<Option<RawCounterEntry>> {
        let mut state = self.state.lock();
        let next = state
            .counter_cursors
            .get(&handle.0)
            .map(|c| c.next)
            .ok_or_else(|| RuntimeError::invalid_argument("counter_get_next"))?;
        let value = state
            .counter(handle, "counter_get_next")?
            .values
            .get(next)
            .copied();
        let Some(value) = value else {
            return Ok(None);
        };
        if let Some(cursor) = state.counter_cursors.get_mut(&handle.0) {
            cursor.next += 1;
        }
        let key = u32::try_from(next)
            .map_err(|_| RuntimeError::invalid_argument("counter_get_next"))?
            .to_le_bytes()
            .to_vec();
        Ok(Some(RawCounterEntry { key, value }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CounterContext, TableContext};
    use crate::types::RawAction;
    use pretty_assertions::assert_eq;

    fn loaded() -> SimRuntime {
        let rt = SimRuntime::new("/tmp/unused.o");
        rt.declare_table(1, "ingress_acl", ["ingress_drop", "_NoAction"]);
        rt.declare_counter(1, "ingress_pkts", CounterType::BytesAndPackets, 8);
        rt.mark_loaded(1);
        rt
    }

    fn entry(key: u8, action_id: u32) -> RawTableEntry {
        RawTableEntry {
            keys: vec![RawMatchKey::exact(vec![key])],
            action: Some(RawAction::new(action_id)),
            priority: 0,
        }
    }

    #[test]
    fn test_load_pipeline_stages_and_cleans_up() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("bpf.o");
        let rt = SimRuntime::new(&staging);

        rt.load_pipeline(7, b"\x7fELF").unwrap();

        assert!(rt.pipeline_exists(7));
        assert!(!staging.exists());
    }

    #[test]
    fn test_failed_load_still_removes_staged_file() {
        let dir = tempfile::tempdir().unwrap();
        let staging = dir.path().join("bpf.o");
        let rt = SimRuntime::new(&staging);

        let err = rt.load_pipeline(7, b"").unwrap_err();

        assert_eq!(err.runtime_status(), Some(crate::RuntimeStatus::InvalidArgument));
        assert!(!staging.exists());
        assert!(!rt.pipeline_exists(7));
    }

    #[test]
    fn test_reloading_existing_pipeline_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let rt = SimRuntime::new(dir.path().join("bpf.o"));
        rt.load_pipeline(1, b"img").unwrap();

        let err = rt.load_pipeline(1, b"img").unwrap_err();
        assert_eq!(err.runtime_status(), Some(crate::RuntimeStatus::Exists));
    }

    #[test]
    fn test_add_port_requires_pipeline() {
        let rt = SimRuntime::new("/tmp/unused.o");
        assert!(rt.add_port(1, "eth0").unwrap_err().is_no_entry());
    }

    #[test]
    fn test_add_port_is_idempotent() {
        let rt = loaded();
        let first = rt.add_port(1, "eth0").unwrap();
        let again = rt.add_port(1, "eth0").unwrap();
        let other = rt.add_port(1, "eth1").unwrap();

        assert_eq!(first, again);
        assert_ne!(first, other);
        assert_eq!(rt.attached_ports(1), vec!["eth0", "eth1"]);

        rt.del_port(1, "eth0").unwrap();
        assert_eq!(rt.attached_ports(1), vec!["eth1"]);
    }

    #[test]
    fn test_table_insert_modify_delete() {
        let rt = loaded();
        let ctx = TableContext::open(&rt, 1, "ingress_acl").unwrap();

        ctx.add(&entry(1, 1)).unwrap();
        assert_eq!(
            ctx.add(&entry(1, 1)).unwrap_err().runtime_status(),
            Some(crate::RuntimeStatus::Exists)
        );

        ctx.update(&entry(1, 2)).unwrap();
        assert_eq!(ctx.get(&entry(1, 0).keys).unwrap().action, Some(RawAction::new(2)));

        ctx.delete(&entry(1, 0)).unwrap();
        assert!(ctx.delete(&entry(1, 0)).unwrap_err().is_no_entry());
        assert!(ctx.update(&entry(1, 1)).unwrap_err().is_no_entry());
    }

    #[test]
    fn test_table_add_rejects_unknown_action() {
        let rt = loaded();
        let ctx = TableContext::open(&rt, 1, "ingress_acl").unwrap();
        assert_eq!(
            ctx.add(&entry(1, 9)).unwrap_err().runtime_status(),
            Some(crate::RuntimeStatus::InvalidArgument)
        );
    }

    #[test]
    fn test_table_update_rejects_unknown_action() {
        let rt = loaded();
        let ctx = TableContext::open(&rt, 1, "ingress_acl").unwrap();
        ctx.add(&entry(1, 1)).unwrap();

        for action_id in [0, 3] {
            assert_eq!(
                ctx.update(&entry(1, action_id)).unwrap_err().runtime_status(),
                Some(crate::RuntimeStatus::InvalidArgument)
            );
        }
        assert_eq!(ctx.get(&entry(1, 0).keys).unwrap().action, Some(RawAction::new(1)));
    }

    #[test]
    fn test_action_name_and_id_resolution() {
        let rt = loaded();
        let ctx = TableContext::open(&rt, 1, "ingress_acl").unwrap();

        assert_eq!(ctx.action_id("_NoAction").unwrap(), 2);
        assert_eq!(ctx.action_name(1).unwrap(), "ingress_drop");
        assert!(ctx.action_name(0).is_err());
        assert!(ctx.action_id("NoAction").is_err());
    }

    #[test]
    fn test_counter_get_by_index() {
        let rt = loaded();
        rt.set_counter(1, "ingress_pkts", 5, RawCounterValue::new(640, 10))
            .unwrap();
        let ctx = CounterContext::open(&rt, 1, "ingress_pkts").unwrap();

        assert_eq!(ctx.kind(), CounterType::BytesAndPackets);
        assert_eq!(ctx.get(&5u32.to_le_bytes()).unwrap(), RawCounterValue::new(640, 10));
        assert!(ctx.get(&8u32.to_le_bytes()).unwrap_err().is_no_entry());
        assert!(ctx.get(&[1, 2]).is_err());
    }

    #[test]
    fn test_counter_iteration_yields_every_cell() {
        let rt = loaded();
        rt.set_counter(1, "ingress_pkts", 2, RawCounterValue::new(1, 1))
            .unwrap();
        let ctx = CounterContext::open(&rt, 1, "ingress_pkts").unwrap();

        let cells: Vec<RawCounterEntry> = ctx.entries().map(|c| c.unwrap()).collect();
        assert_eq!(cells.len(), 8);
        assert_eq!(cells[2].key, 2u32.to_le_bytes().to_vec());
        assert_eq!(cells[2].value, RawCounterValue::new(1, 1));
    }

    #[test]
    fn test_counter_type_of_closed_handle_is_unknown() {
        let rt = loaded();
        let handle = rt.counter_context_init(1, "ingress_pkts").unwrap();
        rt.counter_context_free(handle);
        assert_eq!(rt.counter_type(handle), CounterType::Unknown);
    }
}
