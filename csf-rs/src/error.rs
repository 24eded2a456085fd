//! Error types for credential security factory parsing and marshalling.

use std::fmt;

use thiserror::Error;

/// Result type alias for codec operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Position in the source document, reported with every stream-parsing failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    /// One-based line number.
    pub line: usize,
    /// One-based column, counted in characters.
    pub column: usize,
    /// Zero-based byte offset into the document.
    pub offset: usize,
}

impl Location {
    /// Computes the location of `offset` within `source`.
    pub fn at(source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let consumed = source.get(..offset).unwrap_or(source);
        let line = consumed.matches('\n').count() + 1;
        let line_start = consumed.rfind('\n').map(|i| i + 1).unwrap_or(0);
        let column = consumed[line_start..].chars().count() + 1;
        Location {
            line,
            column,
            offset,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}]", self.line, self.column)
    }
}

/// Errors that can occur while reading or writing factory configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// An element that is not allowed at this position.
    #[error("ParseError at {location}: unexpected element '{name}' encountered")]
    UnexpectedElement { name: String, location: Location },

    /// A namespaced, unknown or forbidden attribute.
    #[error("ParseError at {location}: unexpected attribute '{name}' encountered")]
    UnexpectedAttribute { name: String, location: Location },

    /// One or more required attributes were absent.
    #[error("ParseError at {location}: missing required attribute(s): {}", .attributes.join(", "))]
    MissingRequired {
        attributes: Vec<String>,
        location: Location,
    },

    /// Text or child elements inside an element that must be empty.
    #[error("ParseError at {location}: unexpected content in element '{element}'")]
    UnexpectedContent { element: String, location: Location },

    /// An attribute value that does not parse to its declared type.
    #[error("ParseError at {location}: invalid value '{value}' for attribute '{attribute}': {reason}")]
    InvalidValue {
        attribute: String,
        value: String,
        reason: String,
        location: Location,
    },

    /// The document ended inside an open element.
    #[error("ParseError at {location}: unexpected end of document")]
    UnexpectedEof { location: Location },

    /// Low-level XML syntax error.
    #[error("ParseError at {location}: {message}")]
    Parse { message: String, location: Location },

    /// An add operation targeted a resource that already exists.
    #[error("Duplicate resource {0}")]
    DuplicateResource(String),

    /// A model value rejected by an attribute validator.
    #[error("Validation failed for '{attribute}' at {address}: {reason}")]
    Validation {
        address: String,
        attribute: String,
        reason: String,
    },

    /// A model node with an unexpected shape.
    #[error("Model error: {0}")]
    Model(String),

    /// Writer calls out of order, e.g. an attribute after element content.
    #[error("Writer state error: {0}")]
    WriterState(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// XML error from quick-xml.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),
}

impl Error {
    /// Returns the source location for stream-parsing failures.
    pub fn location(&self) -> Option<Location> {
        match self {
            Error::UnexpectedElement { location, .. }
            | Error::UnexpectedAttribute { location, .. }
            | Error::MissingRequired { location, .. }
            | Error::UnexpectedContent { location, .. }
            | Error::InvalidValue { location, .. }
            | Error::UnexpectedEof { location }
            | Error::Parse { location, .. } => Some(*location),
            _ => None,
        }
    }
}
