//! Attribute descriptors.
//!
//! Each [`AttributeDefinition`] knows how to parse the textual form of one
//! attribute into a model slot, how to check a model value, and how to write
//! the slot back out as an XML attribute.

mod marshaller;

pub use marshaller::AttributeMarshaller;

use std::io::Write;

use tracing::trace;

use crate::error::{Error, Result};
use crate::model::{ModelNode, PathAddress};
use crate::xml::{XmlStreamReader, XmlStreamWriter};

/// Declared type of an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeType {
    String,
    Boolean,
    Int,
    /// List of strings; whitespace separated on the wire.
    StringList,
}

/// Default value of an optional attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultValue {
    Boolean(bool),
    Int(i32),
    String(&'static str),
}

impl DefaultValue {
    pub fn to_model_node(self) -> ModelNode {
        match self {
            DefaultValue::Boolean(b) => ModelNode::Boolean(b),
            DefaultValue::Int(i) => ModelNode::Int(i),
            DefaultValue::String(s) => ModelNode::from(s),
        }
    }
}

/// Immutable description of one attribute.
#[derive(Debug, Clone, Copy)]
pub struct AttributeDefinition {
    name: &'static str,
    kind: AttributeType,
    required: bool,
    default: Option<DefaultValue>,
    min: Option<i64>,
    allow_expression: bool,
    marshaller: AttributeMarshaller,
}

impl AttributeDefinition {
    /// An optional attribute without default, constraints or expressions.
    pub const fn new(name: &'static str, kind: AttributeType) -> Self {
        let marshaller = match kind {
            AttributeType::StringList => AttributeMarshaller::StringList,
            _ => AttributeMarshaller::Simple,
        };
        AttributeDefinition {
            name,
            kind,
            required: false,
            default: None,
            min: None,
            allow_expression: false,
            marshaller,
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Minimum length for strings, minimum value for ints, minimum size for lists.
    pub const fn with_min(mut self, min: i64) -> Self {
        self.min = Some(min);
        self
    }

    /// Accepts `${...}` expressions in place of a typed value.
    pub const fn allowing_expressions(mut self) -> Self {
        self.allow_expression = true;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn kind(&self) -> AttributeType {
        self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn min(&self) -> Option<i64> {
        self.min
    }

    pub fn default_value(&self) -> Option<ModelNode> {
        self.default.map(DefaultValue::to_model_node)
    }

    pub fn attribute_marshaller(&self) -> AttributeMarshaller {
        self.marshaller
    }

    /// Parses a single scalar and sets it as this attribute's slot of `operation`.
    ///
    /// For list attributes the text is split on whitespace and the whole
    /// list is replaced.
    pub fn parse_and_set_parameter(
        &self,
        text: &str,
        operation: &mut ModelNode,
        reader: &XmlStreamReader<'_>,
    ) -> Result<()> {
        let value = match self.kind {
            AttributeType::StringList => {
                let mut list = ModelNode::List(Vec::new());
                for token in text.split_whitespace() {
                    list.add(self.parse_element(token));
                }
                list
            }
            _ => self.parse(text, reader)?,
        };
        trace!(attribute = self.name, %value, "parsed attribute");
        operation.set(self.name, value);
        Ok(())
    }

    /// Appends one element to this attribute's list slot of `operation`.
    pub fn parse_and_add_parameter_element(
        &self,
        text: &str,
        operation: &mut ModelNode,
        reader: &XmlStreamReader<'_>,
    ) -> Result<()> {
        let slot = operation.get_mut(self.name);
        if slot.is_defined() && slot.as_list().is_none() {
            return Err(reader.invalid_value(self.name, text, "slot is not a list"));
        }
        let value = self.parse_element(text);
        trace!(attribute = self.name, %value, "parsed list element");
        operation.get_mut(self.name).add(value);
        Ok(())
    }

    /// Writes this attribute of `model` unless it is absent or, with
    /// `marshall_default` false, equal to the default.
    pub fn marshall_as_attribute<W: Write>(
        &self,
        model: &ModelNode,
        marshall_default: bool,
        writer: &mut XmlStreamWriter<W>,
    ) -> Result<()> {
        self.marshaller
            .marshall_as_attribute(self, model, marshall_default, writer)
    }

    /// Returns true if the slot of `model` should be written.
    pub fn is_marshallable(&self, model: &ModelNode, marshall_default: bool) -> bool {
        match model.get(self.name) {
            Some(value) if value.is_defined() => marshall_default || !self.is_default(value),
            _ => false,
        }
    }

    /// Returns the value of this attribute in `model`, or its default.
    pub fn resolve(&self, model: &ModelNode) -> Option<ModelNode> {
        model
            .get(self.name)
            .filter(|v| v.is_defined())
            .cloned()
            .or_else(|| self.default_value())
    }

    /// Checks the slot of a resource model: presence when required, type,
    /// and the `min` constraint.
    pub fn validate(&self, address: &PathAddress, model: &ModelNode) -> Result<()> {
        let failure = |reason: String| Error::Validation {
            address: address.to_string(),
            attribute: self.name.to_string(),
            reason,
        };
        match model.get(self.name).filter(|v| v.is_defined()) {
            None if self.required => Err(failure("required attribute is not defined".to_string())),
            None => Ok(()),
            Some(value) => self.check(value).map_err(failure),
        }
    }

    fn is_default(&self, value: &ModelNode) -> bool {
        self.default_value().is_some_and(|default| &default == value)
    }

    fn parse(&self, text: &str, reader: &XmlStreamReader<'_>) -> Result<ModelNode> {
        if self.allow_expression && is_expression(text) {
            return Ok(ModelNode::Expression(text.to_string()));
        }
        let value = match self.kind {
            AttributeType::String | AttributeType::StringList => ModelNode::from(text),
            AttributeType::Boolean => {
                if text.eq_ignore_ascii_case("true") {
                    ModelNode::Boolean(true)
                } else if text.eq_ignore_ascii_case("false") {
                    ModelNode::Boolean(false)
                } else {
                    return Err(reader.invalid_value(self.name, text, "expected 'true' or 'false'"));
                }
            }
            AttributeType::Int => text
                .parse::<i32>()
                .map(ModelNode::Int)
                .map_err(|e| reader.invalid_value(self.name, text, e.to_string()))?,
        };
        self.check_scalar(&value)
            .map_err(|reason| reader.invalid_value(self.name, text, reason))?;
        Ok(value)
    }

    fn parse_element(&self, text: &str) -> ModelNode {
        if self.allow_expression && is_expression(text) {
            ModelNode::Expression(text.to_string())
        } else {
            ModelNode::from(text)
        }
    }

    fn check(&self, value: &ModelNode) -> std::result::Result<(), String> {
        if let ModelNode::Expression(_) = value {
            return if self.allow_expression {
                Ok(())
            } else {
                Err("expressions are not allowed".to_string())
            };
        }
        match (self.kind, value) {
            (AttributeType::StringList, ModelNode::List(items)) => {
                if let Some(min) = self.min {
                    if (items.len() as i64) < min {
                        return Err(format!("list must have at least {min} element(s)"));
                    }
                }
                items.iter().try_for_each(|item| match item {
                    ModelNode::String(_) => Ok(()),
                    ModelNode::Expression(_) if self.allow_expression => Ok(()),
                    other => Err(format!("list element {other} is not a string")),
                })
            }
            (AttributeType::StringList, other) => Err(format!("expected list, got {other}")),
            _ => self.check_scalar(value),
        }
    }

    fn check_scalar(&self, value: &ModelNode) -> std::result::Result<(), String> {
        match (self.kind, value) {
            (AttributeType::String, ModelNode::String(s))
            | (AttributeType::StringList, ModelNode::String(s)) => match self.min {
                Some(min) if (s.chars().count() as i64) < min => {
                    Err(format!("must be at least {min} character(s) long"))
                }
                _ => Ok(()),
            },
            (AttributeType::Boolean, ModelNode::Boolean(_)) => Ok(()),
            (AttributeType::Int, ModelNode::Int(i)) => match self.min {
                Some(min) if i64::from(*i) < min => Err(format!("must be at least {min}")),
                _ => Ok(()),
            },
            (kind, other) => Err(format!("expected {kind:?}, got {other}")),
        }
    }
}

fn is_expression(text: &str) -> bool {
    text.find("${")
        .is_some_and(|start| text[start + 2..].contains('}'))
}
