//! Chassis configuration types.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminState {
    #[default]
    Enabled,
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeConfig {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SingletonPort {
    pub id: u32,
    pub name: String,
    pub node: u64,
    #[serde(default)]
    pub admin_state: AdminState,
}

/// Declarative chassis description pushed by the controller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChassisConfig {
    #[serde(default)]
    pub nodes: Vec<NodeConfig>,
    #[serde(default)]
    pub singleton_ports: Vec<SingletonPort>,
}

impl ChassisConfig {
    /// A chassis with one node and no ports.
    pub fn single_node(node_id: u64) -> Self {
        Self {
            nodes: vec![NodeConfig {
                id: node_id,
                name: format!("node{}", node_id),
            }],
            singleton_ports: Vec::new(),
        }
    }
}

/// One port bound to a node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortBinding {
    pub port_id: u32,
    pub name: String,
    pub admin_state: AdminState,
}

impl From<&SingletonPort> for PortBinding {
    fn from(port: &SingletonPort) -> Self {
        Self {
            port_id: port.id,
            name: port.name.clone(),
            admin_state: port.admin_state,
        }
    }
}
