//! Pull-style XML stream reader.
//!
//! Wraps quick-xml's namespace-aware reader and exposes the element the
//! reader is positioned on: its resolved namespace, local name and
//! attributes. Namespace declarations are not reported as attributes.

use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use crate::error::{Error, Location, Result};

/// Kind of tag the reader is positioned on after [`XmlStreamReader::next_tag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagKind {
    /// A start tag (also reported for self-closing elements).
    Start,
    /// An end tag (synthesized for self-closing elements).
    End,
}

/// One attribute of the current start tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlAttribute {
    /// Resolved namespace URI, `None` for unprefixed attributes.
    pub namespace: Option<String>,
    pub local_name: String,
    /// Value with entity and character references expanded.
    pub value: String,
}

#[derive(Debug, Clone, Default)]
struct Tag {
    namespace: Option<String>,
    local_name: String,
    attributes: Vec<XmlAttribute>,
    offset: usize,
}

enum Token {
    Start(Tag),
    End(Tag),
    Text(String, usize),
    Eof(usize),
}

/// XML stream reader positioned on one tag at a time.
pub struct XmlStreamReader<'a> {
    source: &'a str,
    inner: NsReader<&'a [u8]>,
    current: Tag,
    kind: Option<TagKind>,
    pending_end: Option<Tag>,
    open: Vec<String>,
    finished: bool,
}

impl<'a> XmlStreamReader<'a> {
    /// Creates a reader over a complete document or fragment.
    pub fn new(source: &'a str) -> Self {
        XmlStreamReader {
            source,
            inner: NsReader::from_str(source),
            current: Tag::default(),
            kind: None,
            pending_end: None,
            open: Vec::new(),
            finished: false,
        }
    }

    /// Returns false once the end of the document has been reached.
    pub fn has_next(&self) -> bool {
        !self.finished
    }

    /// Advances to the next start or end tag, skipping whitespace,
    /// comments, processing instructions and the XML declaration.
    ///
    /// Non-whitespace text is an error, as is reaching the end of input.
    pub fn next_tag(&mut self) -> Result<TagKind> {
        loop {
            match self.read_token()? {
                Token::Start(tag) => return Ok(self.position_on(tag, TagKind::Start)),
                Token::End(tag) => return Ok(self.position_on(tag, TagKind::End)),
                Token::Text(text, _) if text.trim().is_empty() => continue,
                Token::Text(_, offset) => {
                    return Err(Error::UnexpectedContent {
                        element: self.open.last().cloned().unwrap_or_default(),
                        location: self.locate(offset),
                    })
                }
                Token::Eof(offset) => {
                    return Err(Error::UnexpectedEof {
                        location: self.locate(offset),
                    })
                }
            }
        }
    }

    /// Returns the kind of tag the reader is positioned on.
    pub fn tag_kind(&self) -> Option<TagKind> {
        self.kind
    }

    /// Local name of the current element.
    pub fn local_name(&self) -> &str {
        &self.current.local_name
    }

    /// Resolved namespace URI of the current element.
    pub fn namespace_uri(&self) -> Option<&str> {
        self.current.namespace.as_deref()
    }

    /// Location of the current tag.
    pub fn location(&self) -> Location {
        self.locate(self.current.offset)
    }

    /// Attributes of the current start tag, in source order.
    pub fn attributes(&self) -> &[XmlAttribute] {
        &self.current.attributes
    }

    pub fn attribute_count(&self) -> usize {
        self.current.attributes.len()
    }

    /// Returns true if attribute `index` has no namespace.
    pub fn is_no_namespace_attribute(&self, index: usize) -> bool {
        self.current
            .attributes
            .get(index)
            .is_some_and(|a| a.namespace.is_none())
    }

    /// Splits the value of attribute `index` on whitespace.
    pub fn list_attribute_value(&self, index: usize) -> Vec<&str> {
        self.current
            .attributes
            .get(index)
            .map(|a| a.value.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Fails if the current start tag carries any attribute.
    pub fn require_no_attributes(&self) -> Result<()> {
        if self.attribute_count() > 0 {
            return Err(self.unexpected_attribute(0));
        }
        Ok(())
    }

    /// Consumes the content of the current element, which must be empty
    /// apart from whitespace, leaving the reader on its end tag.
    pub fn require_no_content(&mut self) -> Result<()> {
        let element = self.current.local_name.clone();
        loop {
            match self.read_token()? {
                Token::End(tag) => {
                    self.position_on(tag, TagKind::End);
                    return Ok(());
                }
                Token::Text(text, _) if text.trim().is_empty() => continue,
                Token::Text(_, offset) | Token::Start(Tag { offset, .. }) => {
                    return Err(Error::UnexpectedContent {
                        element,
                        location: self.locate(offset),
                    })
                }
                Token::Eof(offset) => {
                    return Err(Error::UnexpectedEof {
                        location: self.locate(offset),
                    })
                }
            }
        }
    }

    /// Builds an unexpected-element error for the current element.
    pub fn unexpected_element(&self) -> Error {
        Error::UnexpectedElement {
            name: self.current.local_name.clone(),
            location: self.location(),
        }
    }

    /// Builds an unexpected-attribute error for attribute `index`.
    pub fn unexpected_attribute(&self, index: usize) -> Error {
        let name = match self.current.attributes.get(index) {
            Some(XmlAttribute {
                namespace: Some(ns),
                local_name,
                ..
            }) => format!("{{{ns}}}{local_name}"),
            Some(attribute) => attribute.local_name.clone(),
            None => String::new(),
        };
        Error::UnexpectedAttribute {
            name,
            location: self.location(),
        }
    }

    /// Builds a missing-required error listing `names`.
    pub fn missing_required<I, S>(&self, names: I) -> Error
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Error::MissingRequired {
            attributes: names.into_iter().map(Into::into).collect(),
            location: self.location(),
        }
    }

    /// Builds an invalid-value error for `attribute`.
    pub fn invalid_value(&self, attribute: &str, value: &str, reason: impl Into<String>) -> Error {
        Error::InvalidValue {
            attribute: attribute.to_string(),
            value: value.to_string(),
            reason: reason.into(),
            location: self.location(),
        }
    }

    fn locate(&self, offset: usize) -> Location {
        Location::at(self.source, offset)
    }

    fn position_on(&mut self, tag: Tag, kind: TagKind) -> TagKind {
        match kind {
            TagKind::Start => self.open.push(tag.local_name.clone()),
            TagKind::End => {
                self.open.pop();
            }
        }
        self.current = tag;
        self.kind = Some(kind);
        kind
    }

    fn read_token(&mut self) -> Result<Token> {
        if let Some(end) = self.pending_end.take() {
            return Ok(Token::End(end));
        }
        loop {
            let offset = to_offset(self.inner.buffer_position());
            let (resolved, event) = match self.inner.read_resolved_event() {
                Ok(pair) => pair,
                Err(e) => return Err(parse_error(self.source, offset, e)),
            };
            let namespace = resolve_namespace(resolved, self.source, offset)?;

            match event {
                Event::Start(e) => return Ok(Token::Start(self.start_tag(&e, namespace, offset)?)),
                Event::Empty(e) => {
                    let tag = self.start_tag(&e, namespace, offset)?;
                    self.pending_end = Some(Tag {
                        namespace: tag.namespace.clone(),
                        local_name: tag.local_name.clone(),
                        attributes: Vec::new(),
                        offset,
                    });
                    return Ok(Token::Start(tag));
                }
                Event::End(e) => {
                    return Ok(Token::End(Tag {
                        namespace,
                        local_name: decode(e.local_name().as_ref(), self.source, offset)?,
                        attributes: Vec::new(),
                        offset,
                    }))
                }
                Event::Text(e) => {
                    let raw = decode(e.as_ref(), self.source, offset)?;
                    let text = unescape(&raw).map_err(|e| parse_error(self.source, offset, e))?;
                    return Ok(Token::Text(text.into_owned(), offset));
                }
                Event::CData(e) => {
                    return Ok(Token::Text(
                        String::from_utf8_lossy(e.as_ref()).into_owned(),
                        offset,
                    ))
                }
                Event::GeneralRef(e) => {
                    let name = decode(e.as_ref(), self.source, offset)?;
                    return Ok(Token::Text(format!("&{name};"), offset));
                }
                Event::Eof => {
                    self.finished = true;
                    return Ok(Token::Eof(offset));
                }
                Event::Comment(_) | Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }
    }

    fn start_tag(&self, e: &BytesStart<'_>, namespace: Option<String>, offset: usize) -> Result<Tag> {
        let local_name = decode(e.local_name().as_ref(), self.source, offset)?;

        let mut attributes = Vec::new();
        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|e| {
                parse_error(self.source, offset, format!("Attribute error: {e}"))
            })?;
            let key = attr.key.as_ref();
            if key == b"xmlns" || key.starts_with(b"xmlns:") {
                continue;
            }
            let (resolved, local) = self.inner.resolve_attribute(attr.key);
            let attribute_namespace = resolve_namespace(resolved, self.source, offset)?;
            let value = attr
                .unescape_value()
                .map_err(|e| parse_error(self.source, offset, e))?
                .into_owned();
            attributes.push(XmlAttribute {
                namespace: attribute_namespace,
                local_name: decode(local.as_ref(), self.source, offset)?,
                value,
            });
        }

        Ok(Tag {
            namespace,
            local_name,
            attributes,
            offset,
        })
    }
}

fn resolve_namespace(
    resolved: ResolveResult<'_>,
    source: &str,
    offset: usize,
) -> Result<Option<String>> {
    match resolved {
        ResolveResult::Bound(ns) => Ok(Some(decode(ns.as_ref(), source, offset)?)),
        ResolveResult::Unbound => Ok(None),
        ResolveResult::Unknown(prefix) => Err(parse_error(
            source,
            offset,
            format!(
                "unbound namespace prefix '{}'",
                String::from_utf8_lossy(&prefix)
            ),
        )),
    }
}

fn decode(bytes: &[u8], source: &str, offset: usize) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|e| parse_error(source, offset, e))
}

fn parse_error(source: &str, offset: usize, message: impl ToString) -> Error {
    Error::Parse {
        message: message.to_string(),
        location: Location::at(source, offset),
    }
}

fn to_offset<T: TryInto<usize>>(position: T) -> usize {
    position.try_into().unwrap_or(usize::MAX)
}
