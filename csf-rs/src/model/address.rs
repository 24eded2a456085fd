//! Resource addresses.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

use super::ModelNode;

/// One `(type, name)` segment of an address.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathElement {
    /// Resource type, e.g. `kerberos-security-factory`.
    pub key: String,
    /// Resource name.
    pub value: String,
}

impl PathElement {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        PathElement {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Ordered sequence of path elements locating a resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PathAddress(Vec<PathElement>);

impl PathAddress {
    /// The empty (root) address.
    pub fn root() -> Self {
        PathAddress(Vec::new())
    }

    /// Returns a copy of this address extended by one segment.
    pub fn append(&self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut elements = self.0.clone();
        elements.push(PathElement::new(key, value));
        PathAddress(elements)
    }

    /// Returns the last segment.
    pub fn last(&self) -> Option<&PathElement> {
        self.0.last()
    }

    /// Returns the address without its last segment.
    pub fn parent(&self) -> PathAddress {
        let mut elements = self.0.clone();
        elements.pop();
        PathAddress(elements)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.0
    }

    /// Returns true if `self` is a strict extension of `other`.
    pub fn is_child_of(&self, other: &PathAddress) -> bool {
        self.0.len() == other.0.len() + 1 && self.0.starts_with(&other.0)
    }

    /// Converts to the model form: a list of single-key objects.
    pub fn to_model_node(&self) -> ModelNode {
        let mut list = ModelNode::List(Vec::new());
        for element in &self.0 {
            let mut segment = ModelNode::object();
            segment.set(&element.key, ModelNode::from(element.value.as_str()));
            list.add(segment);
        }
        list
    }

    /// Parses the model form produced by [`PathAddress::to_model_node`].
    pub fn from_model_node(node: &ModelNode) -> Result<Self, Error> {
        let items = match node {
            ModelNode::Undefined => return Ok(PathAddress::root()),
            ModelNode::List(items) => items,
            other => return Err(Error::Model(format!("address must be a list, got {other}"))),
        };
        let mut elements = Vec::with_capacity(items.len());
        for item in items {
            let entry = item
                .as_object()
                .filter(|map| map.len() == 1)
                .and_then(|map| map.iter().next())
                .ok_or_else(|| Error::Model(format!("invalid address segment {item}")))?;
            let value = entry
                .1
                .as_str()
                .ok_or_else(|| Error::Model(format!("invalid address segment {item}")))?;
            elements.push(PathElement::new(entry.0.as_str(), value));
        }
        Ok(PathAddress(elements))
    }
}

impl FromIterator<PathElement> for PathAddress {
    fn from_iter<T: IntoIterator<Item = PathElement>>(iter: T) -> Self {
        PathAddress(iter.into_iter().collect())
    }
}

impl fmt::Display for PathAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "/");
        }
        for element in &self.0 {
            write!(f, "/{}={}", element.key, element.value)?;
        }
        Ok(())
    }
}

/// Accepts `/type=name/type=name` or `type=name,type=name`.
impl FromStr for PathAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed == "/" {
            return Ok(PathAddress::root());
        }
        trimmed
            .split(['/', ','])
            .filter(|segment| !segment.is_empty())
            .map(|segment| match segment.split_once('=') {
                Some((key, value)) if !key.is_empty() && !value.is_empty() => {
                    Ok(PathElement::new(key, value))
                }
                _ => Err(Error::Model(format!("invalid address segment '{segment}'"))),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_leaves_parent_untouched() {
        let parent = PathAddress::root().append("subsystem", "elytron");
        let child = parent.append("kerberos-security-factory", "k1");
        assert_eq!(parent.len(), 1);
        assert_eq!(child.len(), 2);
        assert!(child.is_child_of(&parent));
        assert_eq!(child.parent(), parent);
    }

    #[test]
    fn test_display() {
        let address = PathAddress::root()
            .append("subsystem", "elytron")
            .append("kerberos-security-factory", "k1");
        assert_eq!(
            address.to_string(),
            "/subsystem=elytron/kerberos-security-factory=k1"
        );
        assert_eq!(PathAddress::root().to_string(), "/");
    }

    #[test]
    fn test_parse_both_forms() {
        let slash: PathAddress = "/subsystem=elytron/kerberos-security-factory=k1".parse().unwrap();
        let comma: PathAddress = "subsystem=elytron,kerberos-security-factory=k1".parse().unwrap();
        assert_eq!(slash, comma);
        assert_eq!(slash.last().map(|e| e.value.as_str()), Some("k1"));
    }

    #[test]
    fn test_parse_rejects_bare_segment() {
        assert!("subsystem".parse::<PathAddress>().is_err());
        assert!("subsystem=".parse::<PathAddress>().is_err());
    }

    #[test]
    fn test_model_node_conversion() {
        let address = PathAddress::root().append("subsystem", "elytron");
        let node = address.to_model_node();
        assert_eq!(node.to_string(), "[{\"subsystem\" => \"elytron\"}]");
        assert_eq!(PathAddress::from_model_node(&node).unwrap(), address);
    }
}
