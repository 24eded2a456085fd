//! Conversion between model nodes and JSON.
//!
//! Expressions are wrapped as `{"EXPRESSION_VALUE": "${...}"}`; every other
//! node maps onto the obvious JSON value.

use serde_json::{Map, Value};

use crate::constants::EXPRESSION_VALUE;
use crate::error::{Error, Result};

use super::ModelNode;

impl From<&ModelNode> for Value {
    fn from(node: &ModelNode) -> Self {
        match node {
            ModelNode::Undefined => Value::Null,
            ModelNode::Boolean(b) => Value::Bool(*b),
            ModelNode::Int(i) => Value::from(*i),
            ModelNode::String(s) => Value::String(s.clone()),
            ModelNode::Expression(s) => {
                let mut map = Map::new();
                map.insert(EXPRESSION_VALUE.to_string(), Value::String(s.clone()));
                Value::Object(map)
            }
            ModelNode::List(items) => Value::Array(items.iter().map(Value::from).collect()),
            ModelNode::Object(map) => Value::Object(
                map.iter()
                    .map(|(key, value)| (key.clone(), Value::from(value)))
                    .collect(),
            ),
        }
    }
}

impl TryFrom<&Value> for ModelNode {
    type Error = Error;

    fn try_from(value: &Value) -> Result<Self> {
        Ok(match value {
            Value::Null => ModelNode::Undefined,
            Value::Bool(b) => ModelNode::Boolean(*b),
            Value::Number(n) => {
                let int = n
                    .as_i64()
                    .and_then(|i| i32::try_from(i).ok())
                    .ok_or_else(|| Error::Model(format!("number {n} is not a 32-bit integer")))?;
                ModelNode::Int(int)
            }
            Value::String(s) => ModelNode::String(s.clone()),
            Value::Array(items) => ModelNode::List(
                items
                    .iter()
                    .map(ModelNode::try_from)
                    .collect::<Result<Vec<_>>>()?,
            ),
            Value::Object(map) => {
                if map.len() == 1 {
                    if let Some(Value::String(expr)) = map.get(EXPRESSION_VALUE) {
                        return Ok(ModelNode::Expression(expr.clone()));
                    }
                }
                let mut node = ModelNode::object();
                for (key, child) in map {
                    node.set(key, ModelNode::try_from(child)?);
                }
                node
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Operation, PathAddress};
    use serde_json::json;

    #[test]
    fn test_expression_marker() {
        let node = ModelNode::Expression("${kt.path}".to_string());
        let value = Value::from(&node);
        assert_eq!(value, json!({"EXPRESSION_VALUE": "${kt.path}"}));
        assert_eq!(ModelNode::try_from(&value).unwrap(), node);
    }

    #[test]
    fn test_nested_object() {
        let value = json!({
            "kerberos-security-factory": {
                "k1": {"principal": "HTTP/host@R", "server": false, "request-lifetime": 30,
                       "mechanism-oids": ["1.2.840.113554.1.2.2"]}
            }
        });
        let node = ModelNode::try_from(&value).unwrap();
        let k1 = node
            .get("kerberos-security-factory")
            .and_then(|f| f.get("k1"))
            .unwrap();
        assert_eq!(k1.get("server"), Some(&ModelNode::Boolean(false)));
        assert_eq!(k1.get("request-lifetime"), Some(&ModelNode::Int(30)));
        assert_eq!(Value::from(&node), value);
    }

    #[test]
    fn test_object_order_preserved() {
        let value: Value = serde_json::from_str(r#"{"zeta": {"path": "/z"}, "alpha": {"path": "/a"}}"#).unwrap();
        let node = ModelNode::try_from(&value).unwrap();
        assert_eq!(node.keys().collect::<Vec<_>>(), vec!["zeta", "alpha"]);
        assert_eq!(
            serde_json::to_string(&Value::from(&node)).unwrap(),
            r#"{"zeta":{"path":"/z"},"alpha":{"path":"/a"}}"#
        );
    }

    #[test]
    fn test_operation_name_serialized_first() {
        let op = Operation::add(PathAddress::root().append("subsystem", "elytron"));
        let text = serde_json::to_string(&Value::from(&op.to_model_node())).unwrap();
        assert!(text.starts_with(r#"{"operation-name":"add","address":"#), "{text}");
    }

    #[test]
    fn test_rejects_out_of_range_number() {
        assert!(ModelNode::try_from(&json!(1u64 << 40)).is_err());
        assert!(ModelNode::try_from(&json!(1.5)).is_err());
    }
}
