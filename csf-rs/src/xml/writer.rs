//! XML stream writer.
//!
//! Start tags are held back until the next structural call so attributes can
//! be added after `write_start_element`; an element closed with nothing
//! written inside it is emitted self-closing.

use std::io::Write;

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;

use crate::error::{Error, Result};

/// Options for XML writing.
#[derive(Debug, Clone, Default)]
pub struct XmlWriterOptions {
    /// Spaces per nesting level; `None` writes everything on one line.
    pub indent: Option<usize>,
}

/// Element-by-element XML writer.
pub struct XmlStreamWriter<W: Write> {
    inner: Writer<W>,
    pending: Option<BytesStart<'static>>,
    open: Vec<String>,
}

impl<W: Write> XmlStreamWriter<W> {
    /// Creates a writer without indentation.
    pub fn new(writer: W) -> Self {
        Self::with_options(writer, XmlWriterOptions::default())
    }

    /// Creates a writer with the given options.
    pub fn with_options(writer: W, options: XmlWriterOptions) -> Self {
        let inner = match options.indent {
            Some(width) => Writer::new_with_indent(writer, b' ', width),
            None => Writer::new(writer),
        };
        XmlStreamWriter {
            inner,
            pending: None,
            open: Vec::new(),
        }
    }

    /// Opens an element. Attributes may follow until the next structural call.
    pub fn write_start_element(&mut self, name: &str) -> Result<()> {
        self.flush_pending()?;
        self.pending = Some(BytesStart::new(name.to_string()));
        self.open.push(name.to_string());
        Ok(())
    }

    /// Adds an attribute to the element just opened. The value is escaped.
    pub fn write_attribute(&mut self, name: &str, value: &str) -> Result<()> {
        match self.pending.as_mut() {
            Some(start) => {
                start.push_attribute((name, value));
                Ok(())
            }
            None => Err(Error::WriterState(format!(
                "attribute '{name}' written outside a start tag"
            ))),
        }
    }

    /// Declares `uri` as the default namespace of the element just opened.
    pub fn write_default_namespace(&mut self, uri: &str) -> Result<()> {
        self.write_attribute("xmlns", uri)
    }

    /// Closes the innermost open element.
    pub fn write_end_element(&mut self) -> Result<()> {
        let name = self
            .open
            .pop()
            .ok_or_else(|| Error::WriterState("no open element to close".to_string()))?;
        match self.pending.take() {
            Some(start) => self.inner.write_event(Event::Empty(start))?,
            None => self.inner.write_event(Event::End(BytesEnd::new(name)))?,
        }
        Ok(())
    }

    /// Number of currently open elements.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.flush_pending()?;
        self.inner.get_mut().flush()?;
        Ok(())
    }

    /// Returns the underlying writer; every element must be closed.
    pub fn into_inner(mut self) -> Result<W> {
        if let Some(name) = self.open.last() {
            return Err(Error::WriterState(format!("element '{name}' left open")));
        }
        self.flush()?;
        Ok(self.inner.into_inner())
    }

    fn flush_pending(&mut self) -> Result<()> {
        if let Some(start) = self.pending.take() {
            self.inner.write_event(Event::Start(start))?;
        }
        Ok(())
    }
}

/// Runs `write` against an in-memory writer and returns the output as a string.
pub fn write_to_string<F>(options: XmlWriterOptions, write: F) -> Result<String>
where
    F: FnOnce(&mut XmlStreamWriter<Vec<u8>>) -> Result<()>,
{
    let mut writer = XmlStreamWriter::with_options(Vec::new(), options);
    write(&mut writer)?;
    let bytes = writer.into_inner()?;
    String::from_utf8(bytes).map_err(|e| Error::WriterState(e.to_string()))
}
