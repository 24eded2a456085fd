//! Dynamically typed management model node.

use std::fmt;

use indexmap::IndexMap;

use crate::error::{Error, Result};

/// A value in the management model tree.
///
/// Objects keep their keys in insertion order, so iterating a subtree yields
/// resources in the order they were added.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ModelNode {
    /// No value.
    #[default]
    Undefined,
    /// Boolean value.
    Boolean(bool),
    /// 32-bit signed integer.
    Int(i32),
    /// String value.
    String(String),
    /// Unresolved `${...}` expression.
    Expression(String),
    /// Ordered list of values.
    List(Vec<ModelNode>),
    /// Keyed children in insertion order.
    Object(IndexMap<String, ModelNode>),
}

impl ModelNode {
    /// Creates an empty object node.
    pub fn object() -> Self {
        ModelNode::Object(IndexMap::new())
    }

    /// Returns true unless this node is `Undefined`.
    pub fn is_defined(&self) -> bool {
        !matches!(self, ModelNode::Undefined)
    }

    /// Returns the child under `key`, if this is an object holding it.
    pub fn get(&self, key: &str) -> Option<&ModelNode> {
        match self {
            ModelNode::Object(map) => map.get(key),
            _ => None,
        }
    }

    /// Returns the child under `key`, creating it (and converting an
    /// undefined node into an object) when absent.
    ///
    /// Panics if the node is defined but not an object.
    pub fn get_mut(&mut self, key: &str) -> &mut ModelNode {
        if !self.is_defined() {
            *self = ModelNode::object();
        }
        match self {
            ModelNode::Object(map) => map.entry(key.to_string()).or_default(),
            other => panic!("get_mut({key}) on non-object node {other}"),
        }
    }

    /// Returns true if `key` is present and defined.
    pub fn has_defined(&self, key: &str) -> bool {
        self.get(key).is_some_and(ModelNode::is_defined)
    }

    /// Returns the defined child under `key` or fails.
    pub fn require(&self, key: &str) -> Result<&ModelNode> {
        self.get(key)
            .filter(|n| n.is_defined())
            .ok_or_else(|| Error::Model(format!("required key '{key}' is not defined")))
    }

    /// Returns the keys of an object node, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        let map = match self {
            ModelNode::Object(map) => Some(map),
            _ => None,
        };
        map.into_iter().flat_map(|m| m.keys().map(String::as_str))
    }

    /// Sets `key` to `value` on an object node, converting an undefined node
    /// into an object first.
    pub fn set(&mut self, key: &str, value: ModelNode) {
        *self.get_mut(key) = value;
    }

    /// Appends `value` to a list node, converting an undefined node into a
    /// list first.
    ///
    /// Panics if the node is defined but not a list.
    pub fn add(&mut self, value: ModelNode) {
        if !self.is_defined() {
            *self = ModelNode::List(Vec::new());
        }
        match self {
            ModelNode::List(items) => items.push(value),
            other => panic!("add() on non-list node {other}"),
        }
    }

    /// Returns the string content of a string or expression node.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ModelNode::String(s) | ModelNode::Expression(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean value, if this is a boolean node.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ModelNode::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the integer value, if this is an int node.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            ModelNode::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Returns the elements of a list node.
    pub fn as_list(&self) -> Option<&[ModelNode]> {
        match self {
            ModelNode::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the entries of an object node.
    pub fn as_object(&self) -> Option<&IndexMap<String, ModelNode>> {
        match self {
            ModelNode::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Returns the text of a scalar node as written to an XML attribute.
    pub fn as_attribute_text(&self) -> Option<String> {
        match self {
            ModelNode::Boolean(b) => Some(b.to_string()),
            ModelNode::Int(i) => Some(i.to_string()),
            ModelNode::String(s) | ModelNode::Expression(s) => Some(s.clone()),
            ModelNode::Undefined | ModelNode::List(_) | ModelNode::Object(_) => None,
        }
    }
}

impl From<&str> for ModelNode {
    fn from(s: &str) -> Self {
        ModelNode::String(s.to_string())
    }
}

impl From<String> for ModelNode {
    fn from(s: String) -> Self {
        ModelNode::String(s)
    }
}

impl From<bool> for ModelNode {
    fn from(b: bool) -> Self {
        ModelNode::Boolean(b)
    }
}

impl From<i32> for ModelNode {
    fn from(i: i32) -> Self {
        ModelNode::Int(i)
    }
}

impl fmt::Display for ModelNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelNode::Undefined => write!(f, "undefined"),
            ModelNode::Boolean(b) => write!(f, "{b}"),
            ModelNode::Int(i) => write!(f, "{i}"),
            ModelNode::String(s) => write!(f, "\"{s}\""),
            ModelNode::Expression(s) => write!(f, "expression \"{s}\""),
            ModelNode::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            ModelNode::Object(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "\"{key}\" => {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}
