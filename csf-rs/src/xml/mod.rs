//! XML stream reading and writing.
//!
//! The reader and writer expose the element-at-a-time view the codecs work
//! with; quick-xml does the tokenizing and escaping underneath.

mod namespace;
mod reader;
mod writer;

pub use namespace::{any_namespace, NamespaceVerifier, SubsystemNamespace};
pub use reader::{TagKind, XmlAttribute, XmlStreamReader};
pub use writer::{write_to_string, XmlStreamWriter, XmlWriterOptions};
