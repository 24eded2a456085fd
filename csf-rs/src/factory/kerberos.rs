//! Kerberos credential security factory.
//!
//! Reads one `<kerberos-security-factory/>` element into an add operation and
//! writes one element per named factory of a subsystem subtree.

use std::io::Write;

use bitflags::bitflags;
use tracing::debug;

use crate::attribute::{AttributeDefinition, AttributeType, DefaultValue};
use crate::constants::{self, INDEFINITE_LIFETIME, KERBEROS_SECURITY_FACTORY};
use crate::error::{Error, Result};
use crate::model::{ModelNode, Operation, PathAddress};
use crate::xml::{XmlStreamReader, XmlStreamWriter};

use super::ContainerStart;

pub static PRINCIPAL: AttributeDefinition =
    AttributeDefinition::new(constants::PRINCIPAL, AttributeType::String)
        .required()
        .with_min(1)
        .allowing_expressions();

pub static PATH: AttributeDefinition =
    AttributeDefinition::new(constants::PATH, AttributeType::String)
        .required()
        .with_min(1)
        .allowing_expressions();

pub static RELATIVE_TO: AttributeDefinition =
    AttributeDefinition::new(constants::RELATIVE_TO, AttributeType::String).with_min(1);

pub static SERVER: AttributeDefinition =
    AttributeDefinition::new(constants::SERVER, AttributeType::Boolean)
        .with_default(DefaultValue::Boolean(true))
        .allowing_expressions();

pub static MINIMUM_REMAINING_LIFETIME: AttributeDefinition =
    AttributeDefinition::new(constants::MINIMUM_REMAINING_LIFETIME, AttributeType::Int)
        .with_default(DefaultValue::Int(0))
        .with_min(0)
        .allowing_expressions();

pub static REQUEST_LIFETIME: AttributeDefinition =
    AttributeDefinition::new(constants::REQUEST_LIFETIME, AttributeType::Int)
        .with_default(DefaultValue::Int(INDEFINITE_LIFETIME))
        .with_min(0)
        .allowing_expressions();

pub static DEBUG: AttributeDefinition =
    AttributeDefinition::new(constants::DEBUG, AttributeType::Boolean)
        .with_default(DefaultValue::Boolean(false))
        .allowing_expressions();

pub static MECHANISM_OIDS: AttributeDefinition =
    AttributeDefinition::new(constants::MECHANISM_OIDS, AttributeType::StringList)
        .required()
        .with_min(1)
        .allowing_expressions();

/// Resource attributes, in emission order.
pub static ATTRIBUTES: [&AttributeDefinition; 8] = [
    &PRINCIPAL,
    &PATH,
    &RELATIVE_TO,
    &MINIMUM_REMAINING_LIFETIME,
    &REQUEST_LIFETIME,
    &SERVER,
    &DEBUG,
    &MECHANISM_OIDS,
];

/// Attributes accepted on `<kerberos-security-factory/>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KerberosAttribute {
    Name,
    Principal,
    Path,
    RelativeTo,
    Server,
    MinimumRemainingLifetime,
    RequestLifetime,
    Debug,
    MechanismOids,
}

bitflags! {
    /// Set of [`KerberosAttribute`]s, used to track required attributes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct AttributeSet: u16 {
        const NAME = 1;
        const PRINCIPAL = 1 << 1;
        const PATH = 1 << 2;
        const RELATIVE_TO = 1 << 3;
        const SERVER = 1 << 4;
        const MINIMUM_REMAINING_LIFETIME = 1 << 5;
        const REQUEST_LIFETIME = 1 << 6;
        const DEBUG = 1 << 7;
        const MECHANISM_OIDS = 1 << 8;
        const REQUIRED = Self::NAME.bits()
            | Self::PRINCIPAL.bits()
            | Self::PATH.bits()
            | Self::MECHANISM_OIDS.bits();
    }
}

impl KerberosAttribute {
    /// Declaration order, used for diagnostics.
    pub const ALL: [KerberosAttribute; 9] = [
        KerberosAttribute::Name,
        KerberosAttribute::Principal,
        KerberosAttribute::Path,
        KerberosAttribute::RelativeTo,
        KerberosAttribute::Server,
        KerberosAttribute::MinimumRemainingLifetime,
        KerberosAttribute::RequestLifetime,
        KerberosAttribute::Debug,
        KerberosAttribute::MechanismOids,
    ];

    pub fn from_local_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.local_name() == name)
    }

    pub fn local_name(self) -> &'static str {
        match self {
            KerberosAttribute::Name => constants::NAME,
            KerberosAttribute::Principal => constants::PRINCIPAL,
            KerberosAttribute::Path => constants::PATH,
            KerberosAttribute::RelativeTo => constants::RELATIVE_TO,
            KerberosAttribute::Server => constants::SERVER,
            KerberosAttribute::MinimumRemainingLifetime => constants::MINIMUM_REMAINING_LIFETIME,
            KerberosAttribute::RequestLifetime => constants::REQUEST_LIFETIME,
            KerberosAttribute::Debug => constants::DEBUG,
            KerberosAttribute::MechanismOids => constants::MECHANISM_OIDS,
        }
    }

    /// The descriptor for this attribute; `name` is an address segment, not a slot.
    pub fn definition(self) -> Option<&'static AttributeDefinition> {
        match self {
            KerberosAttribute::Name => None,
            KerberosAttribute::Principal => Some(&PRINCIPAL),
            KerberosAttribute::Path => Some(&PATH),
            KerberosAttribute::RelativeTo => Some(&RELATIVE_TO),
            KerberosAttribute::Server => Some(&SERVER),
            KerberosAttribute::MinimumRemainingLifetime => Some(&MINIMUM_REMAINING_LIFETIME),
            KerberosAttribute::RequestLifetime => Some(&REQUEST_LIFETIME),
            KerberosAttribute::Debug => Some(&DEBUG),
            KerberosAttribute::MechanismOids => Some(&MECHANISM_OIDS),
        }
    }

    pub fn flag(self) -> AttributeSet {
        match self {
            KerberosAttribute::Name => AttributeSet::NAME,
            KerberosAttribute::Principal => AttributeSet::PRINCIPAL,
            KerberosAttribute::Path => AttributeSet::PATH,
            KerberosAttribute::RelativeTo => AttributeSet::RELATIVE_TO,
            KerberosAttribute::Server => AttributeSet::SERVER,
            KerberosAttribute::MinimumRemainingLifetime => AttributeSet::MINIMUM_REMAINING_LIFETIME,
            KerberosAttribute::RequestLifetime => AttributeSet::REQUEST_LIFETIME,
            KerberosAttribute::Debug => AttributeSet::DEBUG,
            KerberosAttribute::MechanismOids => AttributeSet::MECHANISM_OIDS,
        }
    }
}

impl AttributeSet {
    /// Local names of the members, in declaration order.
    pub fn local_names(self) -> Vec<&'static str> {
        KerberosAttribute::ALL
            .into_iter()
            .filter(|a| self.contains(a.flag()))
            .map(KerberosAttribute::local_name)
            .collect()
    }
}

/// Reads the element the reader is positioned on and appends its add
/// operation to `operations`. Leaves the reader on the element's end tag.
pub fn read_kerberos_security_factory(
    parent: &PathAddress,
    reader: &mut XmlStreamReader<'_>,
    operations: &mut Vec<Operation>,
) -> Result<()> {
    let mut add = Operation::add(parent.clone());
    let mut required = AttributeSet::REQUIRED;
    let mut name = None;

    for index in 0..reader.attribute_count() {
        if !reader.is_no_namespace_attribute(index) {
            return Err(reader.unexpected_attribute(index));
        }
        let Some(attribute) = KerberosAttribute::from_local_name(&reader.attributes()[index].local_name)
        else {
            return Err(reader.unexpected_attribute(index));
        };
        required.remove(attribute.flag());

        let value = reader.attributes()[index].value.as_str();
        match attribute {
            KerberosAttribute::Name => name = Some(value.to_string()),
            KerberosAttribute::MechanismOids => {
                for oid in reader.list_attribute_value(index) {
                    MECHANISM_OIDS.parse_and_add_parameter_element(oid, add.parameters_mut(), reader)?;
                }
            }
            other => {
                if let Some(definition) = other.definition() {
                    definition.parse_and_set_parameter(value, add.parameters_mut(), reader)?;
                }
            }
        }
    }

    if !required.is_empty() {
        return Err(reader.missing_required(required.local_names()));
    }
    let Some(name) = name else {
        return Err(reader.missing_required([constants::NAME]));
    };

    add.set_address(parent.append(KERBEROS_SECURITY_FACTORY, name));

    reader.require_no_content()?;

    debug!(address = %add.address(), "read {KERBEROS_SECURITY_FACTORY}");
    operations.push(add);
    Ok(())
}

/// Writes one element per factory of `subsystem`, opening the container on
/// first use. Factories are emitted in the subtree's key order.
pub fn write_kerberos_security_factories<W: Write>(
    subsystem: &ModelNode,
    container: &mut ContainerStart,
    writer: &mut XmlStreamWriter<W>,
) -> Result<()> {
    if !subsystem.has_defined(KERBEROS_SECURITY_FACTORY) {
        return Ok(());
    }
    container.start(writer)?;

    let factories = subsystem.require(KERBEROS_SECURITY_FACTORY)?;
    for name in factories.keys() {
        writer.write_start_element(KERBEROS_SECURITY_FACTORY)?;
        writer.write_attribute(constants::NAME, name)?;
        let factory = factories.require(name)?;
        PRINCIPAL.marshall_as_attribute(factory, false, writer)?;
        PATH.marshall_as_attribute(factory, false, writer)?;
        RELATIVE_TO.marshall_as_attribute(factory, false, writer)?;
        MINIMUM_REMAINING_LIFETIME.marshall_as_attribute(factory, false, writer)?;
        REQUEST_LIFETIME.marshall_as_attribute(factory, false, writer)?;
        SERVER.marshall_as_attribute(factory, false, writer)?;
        DEBUG.marshall_as_attribute(factory, false, writer)?;
        MECHANISM_OIDS
            .attribute_marshaller()
            .marshall_as_attribute(&MECHANISM_OIDS, factory, false, writer)?;
        writer.write_end_element()?;
        debug!(name, "wrote {KERBEROS_SECURITY_FACTORY}");
    }
    Ok(())
}

/// A Kerberos factory with every default applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KerberosSecurityFactory {
    pub name: String,
    pub principal: String,
    pub path: String,
    pub relative_to: Option<String>,
    pub server: bool,
    pub minimum_remaining_lifetime: i32,
    pub request_lifetime: i32,
    pub debug: bool,
    pub mechanism_oids: Vec<String>,
}

impl KerberosSecurityFactory {
    /// Resolves the model of the factory at `address`.
    ///
    /// Expressions cannot be resolved here and are reported as validation
    /// failures.
    pub fn from_model(address: &PathAddress, model: &ModelNode) -> Result<Self> {
        for attribute in ATTRIBUTES {
            attribute.validate(address, model)?;
        }
        let name = address
            .last()
            .map(|e| e.value.clone())
            .ok_or_else(|| Error::Model("factory address is empty".to_string()))?;
        let resolved = Resolver { address, model };

        Ok(KerberosSecurityFactory {
            name,
            principal: resolved.string(&PRINCIPAL)?.unwrap_or_default(),
            path: resolved.string(&PATH)?.unwrap_or_default(),
            relative_to: resolved.string(&RELATIVE_TO)?,
            server: resolved.boolean(&SERVER)?,
            minimum_remaining_lifetime: resolved.int(&MINIMUM_REMAINING_LIFETIME)?,
            request_lifetime: resolved.int(&REQUEST_LIFETIME)?,
            debug: resolved.boolean(&DEBUG)?,
            mechanism_oids: resolved.strings(&MECHANISM_OIDS)?,
        })
    }

    /// Resolves every Kerberos factory under the subsystem at `subsystem_address`.
    pub fn all(subsystem_address: &PathAddress, subsystem: &ModelNode) -> Result<Vec<Self>> {
        let Some(factories) = subsystem.get(KERBEROS_SECURITY_FACTORY) else {
            return Ok(Vec::new());
        };
        factories
            .keys()
            .map(|name| {
                let address = subsystem_address.append(KERBEROS_SECURITY_FACTORY, name);
                Self::from_model(&address, factories.require(name)?)
            })
            .collect()
    }
}

struct Resolver<'a> {
    address: &'a PathAddress,
    model: &'a ModelNode,
}

impl Resolver<'_> {
    fn value(&self, attribute: &AttributeDefinition) -> Result<Option<ModelNode>> {
        match attribute.resolve(self.model) {
            Some(ModelNode::Expression(expr)) => Err(self.unresolved(attribute, &expr)),
            other => Ok(other),
        }
    }

    fn unresolved(&self, attribute: &AttributeDefinition, expr: &str) -> Error {
        Error::Validation {
            address: self.address.to_string(),
            attribute: attribute.name().to_string(),
            reason: format!("expression '{expr}' cannot be resolved"),
        }
    }

    fn string(&self, attribute: &AttributeDefinition) -> Result<Option<String>> {
        Ok(self.value(attribute)?.and_then(|v| v.as_str().map(str::to_string)))
    }

    fn boolean(&self, attribute: &AttributeDefinition) -> Result<bool> {
        Ok(self
            .value(attribute)?
            .and_then(|v| v.as_bool())
            .unwrap_or_default())
    }

    fn int(&self, attribute: &AttributeDefinition) -> Result<i32> {
        Ok(self
            .value(attribute)?
            .and_then(|v| v.as_int())
            .unwrap_or_default())
    }

    fn strings(&self, attribute: &AttributeDefinition) -> Result<Vec<String>> {
        let Some(list) = self.value(attribute)? else {
            return Ok(Vec::new());
        };
        let mut out = Vec::new();
        for item in list.as_list().unwrap_or_default() {
            match item {
                ModelNode::Expression(expr) => return Err(self.unresolved(attribute, expr)),
                other => out.extend(other.as_str().map(str::to_string)),
            }
        }
        Ok(out)
    }
}
