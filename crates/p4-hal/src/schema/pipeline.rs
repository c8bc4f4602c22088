//! Pipeline schema derivation and validation.

use super::types::{
    ActionParamSchema, ActionSchema, CounterSchema, MatchFieldSchema, TableSchema,
};
use super::{runtime_action_name, runtime_name};
use crate::error::{HalError, HalResult};
use itertools::Itertools;
use p4rt_proto::p4info::counter_spec::Unit as CounterUnit;
use p4rt_proto::p4info::match_field::{Match, MatchType};
use p4rt_proto::p4info::{self, Preamble};
use p4rt_proto::{ForwardingPipelineConfig, P4Info};
use std::collections::HashMap;
use tracing::debug;

/// Tables, actions and counters of one pipeline, keyed by P4Info id.
///
/// Immutable once built; a node swaps the whole schema when a new pipeline
/// config is accepted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineSchema {
    tables: HashMap<u32, TableSchema>,
    actions: HashMap<u32, ActionSchema>,
    counters: HashMap<u32, CounterSchema>,
}

fn preamble<'a>(preamble: Option<&'a Preamble>, kind: &str) -> HalResult<&'a Preamble> {
    let preamble =
        preamble.ok_or_else(|| HalError::invalid_p4info(format!("{} without preamble", kind)))?;
    if preamble.id == 0 {
        return Err(HalError::invalid_p4info(format!(
            "{} '{}' has id 0",
            kind, preamble.name
        )));
    }
    if preamble.name.is_empty() {
        return Err(HalError::invalid_p4info(format!(
            "{} {} has an empty name",
            kind, preamble.id
        )));
    }
    Ok(preamble)
}

fn bitwidth(value: i32, what: &str) -> HalResult<u32> {
    match u32::try_from(value) {
        Ok(bw) if bw > 0 => Ok(bw),
        _ => Err(HalError::invalid_p4info(format!(
            "{} has invalid bitwidth {}",
            what, value
        ))),
    }
}

fn ensure_unique<I>(ids: I, what: &str) -> HalResult<()>
where
    I: IntoIterator<Item = u32>,
{
    match ids.into_iter().duplicates().next() {
        Some(id) => Err(HalError::invalid_p4info(format!("duplicate {} id {}", what, id))),
        None => Ok(()),
    }
}

fn ensure_unique_names<'a, I>(names: I, what: &str) -> HalResult<()>
where
    I: IntoIterator<Item = &'a str>,
{
    match names.into_iter().duplicates().next() {
        Some(name) => Err(HalError::invalid_p4info(format!(
            "duplicate {} name '{}'",
            what, name
        ))),
        None => Ok(()),
    }
}

fn action_schema(action: &p4info::Action) -> HalResult<ActionSchema> {
    let pre = preamble(action.preamble.as_ref(), "action")?;
    ensure_unique(action.params.iter().map(|p| p.id), "action param")?;

    let params = action
        .params
        .iter()
        .map(|p| {
            Ok(ActionParamSchema {
                id: p.id,
                name: p.name.clone(),
                bitwidth: bitwidth(p.bitwidth, &format!("param '{}' of '{}'", p.name, pre.name))?,
            })
        })
        .collect::<HalResult<Vec<_>>>()?;

    Ok(ActionSchema {
        id: pre.id,
        name: pre.name.clone(),
        runtime_name: runtime_action_name(&pre.name),
        params,
    })
}

fn table_schema(
    table: &p4info::Table,
    actions: &HashMap<u32, ActionSchema>,
) -> HalResult<TableSchema> {
    let pre = preamble(table.preamble.as_ref(), "table")?;
    ensure_unique(table.match_fields.iter().map(|f| f.id), "match field")?;

    let match_fields = table
        .match_fields
        .iter()
        .map(|f| {
            let match_type = match &f.r#match {
                Some(Match::MatchType(t)) => MatchType::try_from(*t).unwrap_or(MatchType::Unspecified),
                Some(Match::OtherMatchType(_)) | None => MatchType::Unspecified,
            };
            Ok(MatchFieldSchema {
                id: f.id,
                name: f.name.clone(),
                match_type,
                bitwidth: bitwidth(f.bitwidth, &format!("field '{}' of '{}'", f.name, pre.name))?,
            })
        })
        .collect::<HalResult<Vec<_>>>()?;

    let action_ids: Vec<u32> = table.action_refs.iter().map(|r| r.id).collect();
    if let Some(missing) = action_ids.iter().find(|id| !actions.contains_key(id)) {
        return Err(HalError::invalid_p4info(format!(
            "table '{}' references unknown action {}",
            pre.name, missing
        )));
    }

    Ok(TableSchema {
        id: pre.id,
        name: pre.name.clone(),
        runtime_name: runtime_name(&pre.name),
        match_fields,
        action_ids,
        size: table.size,
    })
}

fn counter_schema(counter: &p4info::Counter) -> HalResult<CounterSchema> {
    let pre = preamble(counter.preamble.as_ref(), "counter")?;
    let unit = counter
        .spec
        .as_ref()
        .and_then(|s| CounterUnit::try_from(s.unit).ok())
        .unwrap_or(CounterUnit::Unspecified);
    if counter.size < 0 {
        return Err(HalError::invalid_p4info(format!(
            "counter '{}' has negative size",
            pre.name
        )));
    }

    Ok(CounterSchema {
        id: pre.id,
        name: pre.name.clone(),
        runtime_name: runtime_name(&pre.name),
        unit,
        size: counter.size,
    })
}

impl PipelineSchema {
    /// Derives and validates a schema from a P4Info description.
    pub fn from_p4info(p4info: &P4Info) -> HalResult<Self> {
        let actions = p4info
            .actions
            .iter()
            .map(action_schema)
            .collect::<HalResult<Vec<_>>>()?;
        ensure_unique(actions.iter().map(|a| a.id), "action")?;
        ensure_unique_names(actions.iter().map(|a| a.name.as_str()), "action")?;
        let actions: HashMap<u32, ActionSchema> = actions.into_iter().map(|a| (a.id, a)).collect();

        let tables = p4info
            .tables
            .iter()
            .map(|t| table_schema(t, &actions))
            .collect::<HalResult<Vec<_>>>()?;
        ensure_unique(tables.iter().map(|t| t.id), "table")?;
        ensure_unique_names(tables.iter().map(|t| t.runtime_name.as_str()), "table")?;

        let counters = p4info
            .counters
            .iter()
            .map(counter_schema)
            .collect::<HalResult<Vec<_>>>()?;
        ensure_unique(counters.iter().map(|c| c.id), "counter")?;

        debug!(
            tables = tables.len(),
            actions = actions.len(),
            counters = counters.len(),
            "Derived pipeline schema"
        );

        Ok(Self {
            tables: tables.into_iter().map(|t| (t.id, t)).collect(),
            actions,
            counters: counters.into_iter().map(|c| (c.id, c)).collect(),
        })
    }

    /// Derives the schema of a forwarding pipeline config, which must carry
    /// a P4Info.
    pub fn from_config(config: &ForwardingPipelineConfig) -> HalResult<Self> {
        let p4info = config
            .p4info
            .as_ref()
            .ok_or_else(|| HalError::invalid_param("forwarding pipeline config has no P4Info"))?;
        Self::from_p4info(p4info)
    }

    pub fn table(&self, table_id: u32) -> HalResult<&TableSchema> {
        self.tables
            .get(&table_id)
            .ok_or_else(|| HalError::invalid_param(format!("unknown table id {}", table_id)))
    }

    pub fn action(&self, action_id: u32) -> HalResult<&ActionSchema> {
        self.actions
            .get(&action_id)
            .ok_or_else(|| HalError::invalid_param(format!("unknown action id {}", action_id)))
    }

    pub fn counter(&self, counter_id: u32) -> HalResult<&CounterSchema> {
        self.counters
            .get(&counter_id)
            .ok_or_else(|| HalError::invalid_param(format!("unknown counter id {}", counter_id)))
    }

    /// Tables sorted by id.
    pub fn tables(&self) -> impl Iterator<Item = &TableSchema> {
        self.tables.values().sorted_by_key(|t| t.id)
    }

    /// Counters sorted by id.
    pub fn counters(&self) -> impl Iterator<Item = &CounterSchema> {
        self.counters.values().sorted_by_key(|c| c.id)
    }
}

/// Action data used to rebuild an action from a raw entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInfo {
    pub action_id: u32,
    pub param_bitwidths: Vec<u32>,
}

/// Runtime action name to action data, for the actions one table permits.
///
/// Built once per read request.
#[derive(Debug, Clone, Default)]
pub struct ActionIndex {
    by_name: HashMap<String, ActionInfo>,
}

impl ActionIndex {
    pub fn for_table(table: &TableSchema, schema: &PipelineSchema) -> HalResult<Self> {
        let mut by_name = HashMap::with_capacity(table.action_ids.len());
        for id in &table.action_ids {
            let action = schema.action(*id)?;
            by_name.insert(
                action.runtime_name.clone(),
                ActionInfo {
                    action_id: action.id,
                    param_bitwidths: action.params.iter().map(|p| p.bitwidth).collect(),
                },
            );
        }
        Ok(Self { by_name })
    }

    pub fn get(&self, runtime_name: &str) -> Option<&ActionInfo> {
        self.by_name.get(runtime_name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
