//! `<credential-security-factories>` container codec.
//!
//! Reading turns each child element into an add operation appended to the
//! caller's list. Writing emits the container only when at least one factory
//! exists in the subsystem model.

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::constants::CREDENTIAL_SECURITY_FACTORIES;
use crate::error::Result;
use crate::factory::{ContainerStart, FactoryVariant};
use crate::model::{ModelNode, Operation, PathAddress};
use crate::xml::{
    write_to_string, NamespaceVerifier, SubsystemNamespace, TagKind, XmlStreamReader,
    XmlStreamWriter, XmlWriterOptions,
};

/// Reads and writes the credential security factories of one subsystem.
///
/// The verifier decides which namespace child elements must be in.
pub struct CredentialSecurityFactoryParser<V: NamespaceVerifier> {
    verifier: V,
}

impl<V: NamespaceVerifier> CredentialSecurityFactoryParser<V> {
    pub fn new(verifier: V) -> Self {
        CredentialSecurityFactoryParser { verifier }
    }

    /// Reads the container element the reader is positioned on.
    ///
    /// One add operation per child is appended to `operations`, addressed
    /// under `parent`. On return the reader is on the container's end tag.
    /// Operations appended before a failure are left in place.
    pub fn read_credential_security_factories(
        &self,
        parent: &PathAddress,
        reader: &mut XmlStreamReader<'_>,
        operations: &mut Vec<Operation>,
    ) -> Result<()> {
        reader.require_no_attributes()?;
        while reader.has_next() && reader.next_tag()? != TagKind::End {
            self.verifier.verify_namespace(reader)?;
            match FactoryVariant::from_local_name(reader.local_name()) {
                Some(variant) => variant.read(parent, reader, operations)?,
                None => return Err(reader.unexpected_element()),
            }
        }
        debug!(parent = %parent, count = operations.len(), "read {CREDENTIAL_SECURITY_FACTORIES}");
        Ok(())
    }

    /// Writes the container and its children from a subsystem model.
    ///
    /// Nothing is written when the model holds no factory.
    pub fn write_credential_security_factories<W: Write>(
        &self,
        subsystem: &ModelNode,
        writer: &mut XmlStreamWriter<W>,
    ) -> Result<()> {
        let mut container = ContainerStart::default();
        for variant in FactoryVariant::ALL {
            variant.write(subsystem, &mut container, writer)?;
        }
        if container.is_started() {
            writer.write_end_element()?;
        }
        Ok(())
    }

    /// Parses a document whose root is the container element.
    pub fn parse_str(&self, xml: &str, parent: &PathAddress) -> Result<Vec<Operation>> {
        let mut reader = XmlStreamReader::new(xml);
        reader.next_tag()?;
        if reader.local_name() != CREDENTIAL_SECURITY_FACTORIES {
            return Err(reader.unexpected_element());
        }
        self.verifier.verify_namespace(&reader)?;
        let mut operations = Vec::new();
        self.read_credential_security_factories(parent, &mut reader, &mut operations)?;
        Ok(operations)
    }

    pub fn parse_file<P: AsRef<Path>>(&self, path: P, parent: &PathAddress) -> Result<Vec<Operation>> {
        let xml = fs::read_to_string(path)?;
        self.parse_str(&xml, parent)
    }

    /// Writes the container for `subsystem` into a string.
    pub fn write_to_string(&self, subsystem: &ModelNode, options: XmlWriterOptions) -> Result<String> {
        write_to_string(options, |writer| {
            self.write_credential_security_factories(subsystem, writer)
        })
    }
}

/// Parses a container document, requiring children to share the
/// container's namespace.
pub fn parse_str(xml: &str, parent: &PathAddress) -> Result<Vec<Operation>> {
    let mut reader = XmlStreamReader::new(xml);
    reader.next_tag()?;
    let parser = CredentialSecurityFactoryParser::new(SubsystemNamespace::of_current(&reader));
    if reader.local_name() != CREDENTIAL_SECURITY_FACTORIES {
        return Err(reader.unexpected_element());
    }
    let mut operations = Vec::new();
    parser.read_credential_security_factories(parent, &mut reader, &mut operations)?;
    Ok(operations)
}

/// Parses a container file, see [`parse_str`].
pub fn parse_file<P: AsRef<Path>>(path: P, parent: &PathAddress) -> Result<Vec<Operation>> {
    let xml = fs::read_to_string(path)?;
    parse_str(&xml, parent)
}
