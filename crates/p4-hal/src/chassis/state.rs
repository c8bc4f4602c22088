//! Port bindings per node.

use super::types::{ChassisConfig, PortBinding};
use crate::error::{HalError, HalResult};
use std::collections::{BTreeMap, HashMap, HashSet};
use tracing::info;

/// `(node id, port id) -> PortBinding`, replaced wholesale on every push.
///
/// Pushing issues no runtime calls; bindings take effect when a node commits
/// its pipeline.
#[derive(Debug, Clone, Default)]
pub struct ChassisState {
    ports: HashMap<u64, BTreeMap<u32, PortBinding>>,
}

impl ChassisState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a chassis config without applying it.
    pub fn verify(config: &ChassisConfig) -> HalResult<()> {
        let nodes: HashSet<u64> = config.nodes.iter().map(|n| n.id).collect();
        if nodes.len() != config.nodes.len() {
            return Err(HalError::invalid_param("duplicate node id in chassis config"));
        }

        let mut ids = HashSet::new();
        let mut names = HashSet::new();
        for port in &config.singleton_ports {
            if !nodes.contains(&port.node) {
                return Err(HalError::invalid_param(format!(
                    "port {} references undeclared node {}",
                    port.id, port.node
                )));
            }
            if port.id == 0 {
                return Err(HalError::invalid_param(format!(
                    "port '{}' has id 0",
                    port.name
                )));
            }
            if port.name.is_empty() {
                return Err(HalError::invalid_param(format!("port {} has no name", port.id)));
            }
            if !ids.insert((port.node, port.id)) {
                return Err(HalError::invalid_param(format!(
                    "duplicate port id {} on node {}",
                    port.id, port.node
                )));
            }
            if !names.insert((port.node, port.name.as_str())) {
                return Err(HalError::invalid_param(format!(
                    "duplicate port name '{}' on node {}",
                    port.name, port.node
                )));
            }
        }
        Ok(())
    }

    /// Replaces every binding with those described by `config`.
    pub fn replace(&mut self, config: &ChassisConfig) -> HalResult<()> {
        Self::verify(config)?;

        let mut ports: HashMap<u64, BTreeMap<u32, PortBinding>> = HashMap::new();
        for port in &config.singleton_ports {
            ports
                .entry(port.node)
                .or_default()
                .insert(port.id, PortBinding::from(port));
        }
        self.ports = ports;

        info!(
            nodes = config.nodes.len(),
            ports = config.singleton_ports.len(),
            "Replaced chassis port bindings"
        );
        Ok(())
    }

    /// Bindings of one node, ordered by port id.
    pub fn ports(&self, node_id: u64) -> impl Iterator<Item = &PortBinding> {
        self.ports.get(&node_id).into_iter().flat_map(|p| p.values())
    }

    pub fn port(&self, node_id: u64, port_id: u32) -> Option<&PortBinding> {
        self.ports.get(&node_id).and_then(|p| p.get(&port_id))
    }

    pub fn port_count(&self) -> usize {
        self.ports.values().map(BTreeMap::len).sum()
    }
}
