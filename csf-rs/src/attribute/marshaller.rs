//! Writing attribute slots as XML attributes.

use std::io::Write;

use tracing::trace;

use crate::error::{Error, Result};
use crate::model::ModelNode;
use crate::xml::XmlStreamWriter;

use super::AttributeDefinition;

/// How a slot is rendered into a single XML attribute value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeMarshaller {
    /// Scalar slot written as its text form.
    Simple,
    /// List slot written as its elements joined by a single space.
    StringList,
}

impl AttributeMarshaller {
    /// Writes `attribute`'s slot of `model`, or nothing when the slot is
    /// absent or (with `marshall_default` false) equal to the default.
    pub fn marshall_as_attribute<W: Write>(
        &self,
        attribute: &AttributeDefinition,
        model: &ModelNode,
        marshall_default: bool,
        writer: &mut XmlStreamWriter<W>,
    ) -> Result<()> {
        if !attribute.is_marshallable(model, marshall_default) {
            return Ok(());
        }
        let Some(value) = model.get(attribute.name()) else {
            return Ok(());
        };
        let text = match self {
            AttributeMarshaller::Simple => value.as_attribute_text(),
            AttributeMarshaller::StringList => match value {
                ModelNode::List(items) => {
                    let tokens: Option<Vec<String>> =
                        items.iter().map(ModelNode::as_attribute_text).collect();
                    tokens.map(|t| t.join(" "))
                }
                other => other.as_attribute_text(),
            },
        }
        .ok_or_else(|| {
            Error::Model(format!(
                "cannot write {value} as attribute '{}'",
                attribute.name()
            ))
        })?;
        trace!(attribute = attribute.name(), value = %text, "writing attribute");
        writer.write_attribute(attribute.name(), &text)
    }
}
