//! Management operations synthesized by the reader.

use crate::constants::{ADD, OP, OP_ADDR};
use crate::error::{Error, Result};

use super::{ModelNode, PathAddress};

/// A management operation: a name, a target address and parameter slots.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    name: String,
    address: PathAddress,
    parameters: ModelNode,
}

impl Operation {
    /// Creates an `add` operation for `address` with no parameters.
    pub fn add(address: PathAddress) -> Self {
        Operation {
            name: ADD.to_string(),
            address,
            parameters: ModelNode::object(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn address(&self) -> &PathAddress {
        &self.address
    }

    pub fn set_address(&mut self, address: PathAddress) {
        self.address = address;
    }

    /// Parameter slots, always an object node.
    pub fn parameters(&self) -> &ModelNode {
        &self.parameters
    }

    pub fn parameters_mut(&mut self) -> &mut ModelNode {
        &mut self.parameters
    }

    /// Returns the parameter slot `key`, if set.
    pub fn parameter(&self, key: &str) -> Option<&ModelNode> {
        self.parameters.get(key)
    }

    /// Converts to the dynamically typed operation shape:
    /// `{operation-name, address, <slots>...}`.
    pub fn to_model_node(&self) -> ModelNode {
        let mut node = ModelNode::object();
        node.set(OP, ModelNode::from(self.name.as_str()));
        node.set(OP_ADDR, self.address.to_model_node());
        if let ModelNode::Object(slots) = &self.parameters {
            for (key, value) in slots {
                node.set(key, value.clone());
            }
        }
        node
    }

    /// Parses the shape produced by [`Operation::to_model_node`].
    pub fn from_model_node(node: &ModelNode) -> Result<Self> {
        let map = node
            .as_object()
            .ok_or_else(|| Error::Model(format!("operation must be an object, got {node}")))?;
        let name = node
            .require(OP)?
            .as_str()
            .ok_or_else(|| Error::Model(format!("'{OP}' must be a string")))?
            .to_string();
        let address = PathAddress::from_model_node(node.get(OP_ADDR).unwrap_or(&ModelNode::Undefined))?;
        let mut parameters = ModelNode::object();
        for (key, value) in map {
            if key != OP && key != OP_ADDR {
                parameters.set(key, value.clone());
            }
        }
        Ok(Operation {
            name,
            address,
            parameters,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_model_node_shape() {
        let mut op = Operation::add(PathAddress::root().append("subsystem", "elytron"));
        op.parameters_mut().set("debug", true.into());
        let node = op.to_model_node();
        assert_eq!(node.get(OP).and_then(ModelNode::as_str), Some("add"));
        assert!(node.get(OP_ADDR).and_then(ModelNode::as_list).is_some());
        assert_eq!(node.get("debug"), Some(&ModelNode::Boolean(true)));
        let keys: Vec<&str> = node.keys().collect();
        assert_eq!(keys, vec![OP, OP_ADDR, "debug"]);
    }

    #[test]
    fn test_from_model_node_inverts_to_model_node() {
        let mut op = Operation::add(
            PathAddress::root()
                .append("subsystem", "elytron")
                .append("kerberos-security-factory", "k1"),
        );
        op.parameters_mut().set("principal", "HTTP/host@R".into());
        let parsed = Operation::from_model_node(&op.to_model_node()).unwrap();
        assert_eq!(parsed, op);
    }

    #[test]
    fn test_from_model_node_requires_name() {
        let node = ModelNode::object();
        assert!(Operation::from_model_node(&node).is_err());
    }
}
