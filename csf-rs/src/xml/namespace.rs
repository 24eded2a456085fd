//! Namespace checks for parsed elements.

use crate::error::Result;

use super::XmlStreamReader;

/// Asserts that the element a reader is positioned on belongs to the
/// namespace currently being parsed.
pub trait NamespaceVerifier {
    fn verify_namespace(&self, reader: &XmlStreamReader<'_>) -> Result<()>;
}

/// The namespace of the subsystem being parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsystemNamespace {
    uri: Option<String>,
}

impl SubsystemNamespace {
    pub fn new(uri: impl Into<String>) -> Self {
        SubsystemNamespace {
            uri: Some(uri.into()),
        }
    }

    /// Elements are expected to carry no namespace at all.
    pub fn none() -> Self {
        SubsystemNamespace { uri: None }
    }

    /// Adopts the namespace of the element `reader` is positioned on.
    pub fn of_current(reader: &XmlStreamReader<'_>) -> Self {
        SubsystemNamespace {
            uri: reader.namespace_uri().map(str::to_string),
        }
    }

    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }
}

impl NamespaceVerifier for SubsystemNamespace {
    fn verify_namespace(&self, reader: &XmlStreamReader<'_>) -> Result<()> {
        if reader.namespace_uri() == self.uri() {
            Ok(())
        } else {
            Err(reader.unexpected_element())
        }
    }
}

impl<F> NamespaceVerifier for F
where
    F: Fn(&XmlStreamReader<'_>) -> Result<()>,
{
    fn verify_namespace(&self, reader: &XmlStreamReader<'_>) -> Result<()> {
        self(reader)
    }
}

/// Accepts elements in any namespace.
pub fn any_namespace(_reader: &XmlStreamReader<'_>) -> Result<()> {
    Ok(())
}
