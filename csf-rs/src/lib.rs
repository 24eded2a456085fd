//! Elytron credential security factories
//!
//! This library reads and writes the `<credential-security-factories>`
//! section of the Elytron subsystem configuration.
//!
//! # Overview
//!
//! Reading turns XML into a list of management `add` operations, one per
//! configured factory, each addressed under the subsystem. Applying those
//! operations to a [`SubsystemModel`] builds the subsystem subtree, and
//! writing turns that subtree back into XML. Attributes equal to their
//! default are left out on output, so a read followed by a write yields a
//! minimal document.
//!
//! # Factories
//!
//! - `kerberos-security-factory`: obtains a GSS-API credential from a
//!   keytab for a principal and a set of mechanism OIDs.
//!
//! # Example
//!
//! ```
//! use elytron_csf::{SubsystemModel, SubsystemParser, XmlWriterOptions};
//!
//! let xml = r#"<subsystem xmlns="urn:wildfly:elytron:1.0">
//!     <credential-security-factories>
//!         <kerberos-security-factory name="k1" principal="HTTP/host@REALM"
//!             path="/etc/krb5.keytab" mechanism-oids="1.2.840.113554.1.2.2"/>
//!     </credential-security-factories>
//! </subsystem>"#;
//!
//! let parser = SubsystemParser::default();
//! let operations = parser.parse_str(xml)?;
//! let mut model = SubsystemModel::new(parser.address().clone());
//! model.apply_all(&operations)?;
//! let output = parser.write_to_string(model.node(), XmlWriterOptions::default())?;
//! assert!(output.contains(r#"name="k1""#));
//! # Ok::<(), elytron_csf::Error>(())
//! ```

pub mod attribute;
pub mod constants;
pub mod error;
pub mod factory;
pub mod model;
pub mod parser;
pub mod subsystem;
pub mod xml;

// Re-export commonly used types
pub use attribute::{AttributeDefinition, AttributeMarshaller, AttributeType, DefaultValue};
pub use error::{Error, Location, Result};
pub use factory::{FactoryVariant, KerberosAttribute, KerberosSecurityFactory};
pub use model::{ModelNode, Operation, PathAddress, PathElement, SubsystemModel};
pub use parser::{parse_file, parse_str, CredentialSecurityFactoryParser};
pub use subsystem::{SubsystemParser, DEFAULT_NAMESPACE};
pub use xml::{
    any_namespace, NamespaceVerifier, SubsystemNamespace, XmlStreamReader, XmlStreamWriter,
    XmlWriterOptions,
};
