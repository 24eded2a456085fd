//! Credential security factory resources.
//!
//! Each factory variant owns the codec for its element and the validation of
//! its resource model. [`FactoryVariant`] is the closed set of variants the
//! container element dispatches on.

pub mod kerberos;

pub use kerberos::{KerberosAttribute, KerberosSecurityFactory};

use std::collections::HashSet;
use std::io::Write;

use tracing::debug;

use crate::attribute::AttributeDefinition;
use crate::constants::{CREDENTIAL_SECURITY_FACTORIES, KERBEROS_SECURITY_FACTORY};
use crate::error::{Error, Result};
use crate::model::{ModelNode, Operation, PathAddress};
use crate::xml::{XmlStreamReader, XmlStreamWriter};

/// Child element kinds of `<credential-security-factories>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FactoryVariant {
    Kerberos,
}

impl FactoryVariant {
    /// Every variant, in the order they are written.
    pub const ALL: [FactoryVariant; 1] = [FactoryVariant::Kerberos];

    /// The element local name, which is also the resource type.
    pub fn element_name(self) -> &'static str {
        match self {
            FactoryVariant::Kerberos => KERBEROS_SECURITY_FACTORY,
        }
    }

    pub fn from_local_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|v| v.element_name() == name)
    }

    pub fn from_resource_type(resource_type: &str) -> Option<Self> {
        Self::from_local_name(resource_type)
    }

    /// The attribute descriptors of the variant's resource.
    pub fn attributes(self) -> &'static [&'static AttributeDefinition] {
        match self {
            FactoryVariant::Kerberos => &kerberos::ATTRIBUTES,
        }
    }

    /// Reads the element the reader is positioned on into an add operation.
    pub fn read(
        self,
        parent: &PathAddress,
        reader: &mut XmlStreamReader<'_>,
        operations: &mut Vec<Operation>,
    ) -> Result<()> {
        match self {
            FactoryVariant::Kerberos => {
                kerberos::read_kerberos_security_factory(parent, reader, operations)
            }
        }
    }

    /// Writes every resource of this variant found in `subsystem`.
    pub fn write<W: Write>(
        self,
        subsystem: &ModelNode,
        container: &mut ContainerStart,
        writer: &mut XmlStreamWriter<W>,
    ) -> Result<()> {
        match self {
            FactoryVariant::Kerberos => {
                kerberos::write_kerberos_security_factories(subsystem, container, writer)
            }
        }
    }

    /// Checks the parameters of an add operation targeting `address`.
    pub fn validate(self, address: &PathAddress, parameters: &ModelNode) -> Result<()> {
        let attributes = self.attributes();
        let known: HashSet<&str> = attributes.iter().map(|a| a.name()).collect();
        if let Some(unknown) = parameters.keys().find(|k| !known.contains(k)) {
            return Err(Error::Validation {
                address: address.to_string(),
                attribute: unknown.to_string(),
                reason: format!("not an attribute of {}", self.element_name()),
            });
        }
        for attribute in attributes {
            attribute.validate(address, parameters)?;
        }
        Ok(())
    }
}

/// Opens `<credential-security-factories>` on first use, at most once.
#[derive(Debug, Default)]
pub struct ContainerStart {
    started: bool,
}

impl ContainerStart {
    pub fn start<W: Write>(&mut self, writer: &mut XmlStreamWriter<W>) -> Result<()> {
        if !self.started {
            writer.write_start_element(CREDENTIAL_SECURITY_FACTORIES)?;
            self.started = true;
            debug!("opened {CREDENTIAL_SECURITY_FACTORIES}");
        }
        Ok(())
    }

    pub fn is_started(&self) -> bool {
        self.started
    }
}
