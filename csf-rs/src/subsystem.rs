//! The `<subsystem>` element hosting the credential security factories.
//!
//! Reading a subsystem document yields the add operation for the subsystem
//! itself followed by one add per factory. Writing declares the subsystem
//! namespace as the default namespace of the root element.

use std::fs;
use std::io::Write;
use std::path::Path;

use tracing::debug;

use crate::constants::{CREDENTIAL_SECURITY_FACTORIES, ELYTRON, SUBSYSTEM};
use crate::error::Result;
use crate::model::{ModelNode, Operation, PathAddress};
use crate::parser::CredentialSecurityFactoryParser;
use crate::xml::{
    write_to_string, NamespaceVerifier, SubsystemNamespace, TagKind, XmlStreamReader,
    XmlStreamWriter, XmlWriterOptions,
};

/// Default namespace of the subsystem element.
pub const DEFAULT_NAMESPACE: &str = "urn:wildfly:elytron:1.0";

/// Reads and writes complete subsystem documents.
#[derive(Debug, Clone)]
pub struct SubsystemParser {
    namespace: SubsystemNamespace,
    address: PathAddress,
}

impl Default for SubsystemParser {
    fn default() -> Self {
        SubsystemParser::new(SubsystemNamespace::new(DEFAULT_NAMESPACE))
    }
}

impl SubsystemParser {
    /// Creates a parser for `namespace`, addressing the subsystem as
    /// `/subsystem=elytron`.
    pub fn new(namespace: SubsystemNamespace) -> Self {
        SubsystemParser {
            namespace,
            address: PathAddress::root().append(SUBSYSTEM, ELYTRON),
        }
    }

    /// Places the subsystem at `address` instead.
    pub fn with_address(mut self, address: PathAddress) -> Self {
        self.address = address;
        self
    }

    pub fn namespace(&self) -> &SubsystemNamespace {
        &self.namespace
    }

    pub fn address(&self) -> &PathAddress {
        &self.address
    }

    /// Parses a subsystem document into add operations.
    pub fn parse_str(&self, xml: &str) -> Result<Vec<Operation>> {
        let mut reader = XmlStreamReader::new(xml);
        reader.next_tag()?;
        if reader.local_name() != SUBSYSTEM {
            return Err(reader.unexpected_element());
        }
        self.namespace.verify_namespace(&reader)?;
        reader.require_no_attributes()?;

        let factories = CredentialSecurityFactoryParser::new(self.namespace.clone());
        let mut operations = vec![Operation::add(self.address.clone())];
        while reader.has_next() && reader.next_tag()? != TagKind::End {
            self.namespace.verify_namespace(&reader)?;
            if reader.local_name() != CREDENTIAL_SECURITY_FACTORIES {
                return Err(reader.unexpected_element());
            }
            factories.read_credential_security_factories(&self.address, &mut reader, &mut operations)?;
        }
        debug!(address = %self.address, operations = operations.len(), "parsed subsystem");
        Ok(operations)
    }

    pub fn parse_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<Operation>> {
        let xml = fs::read_to_string(path)?;
        self.parse_str(&xml)
    }

    /// Writes the subsystem element for the subtree `subsystem`.
    pub fn write<W: Write>(&self, subsystem: &ModelNode, writer: &mut XmlStreamWriter<W>) -> Result<()> {
        writer.write_start_element(SUBSYSTEM)?;
        if let Some(uri) = self.namespace.uri() {
            writer.write_default_namespace(uri)?;
        }
        CredentialSecurityFactoryParser::new(self.namespace.clone())
            .write_credential_security_factories(subsystem, writer)?;
        writer.write_end_element()
    }

    pub fn write_to_string(&self, subsystem: &ModelNode, options: XmlWriterOptions) -> Result<String> {
        write_to_string(options, |writer| self.write(subsystem, writer))
    }
}
