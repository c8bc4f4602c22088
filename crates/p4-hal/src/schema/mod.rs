//! Pipeline schema: the read-only view of a P4Info used to interpret raw
//! table and counter data.

mod pipeline;
mod types;

pub use pipeline::{ActionIndex, ActionInfo, PipelineSchema};
pub use types::{
    byte_width, ActionParamSchema, ActionSchema, CounterSchema, MatchFieldSchema, TableSchema,
};

/// Action name the runtime reserves for the no-op action.
pub const RUNTIME_NO_ACTION: &str = "_NoAction";

/// Converts a P4 object name to the runtime's naming convention.
pub fn runtime_name(p4_name: &str) -> String {
    p4_name.replace('.', "_")
}

/// Like [`runtime_name`], with `NoAction` mapped to the reserved runtime name.
pub fn runtime_action_name(p4_name: &str) -> String {
    if p4_name == "NoAction" {
        RUNTIME_NO_ACTION.to_string()
    } else {
        runtime_name(p4_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_name() {
        assert_eq!(runtime_name("ingress.tbl_fwd"), "ingress_tbl_fwd");
        assert_eq!(runtime_name("plain"), "plain");
    }

    #[test]
    fn test_runtime_action_name() {
        assert_eq!(runtime_action_name("NoAction"), "_NoAction");
        assert_eq!(runtime_action_name("ingress.drop"), "ingress_drop");
    }
}
