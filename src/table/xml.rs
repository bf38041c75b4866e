//! Thin quick-xml wrapper used by the workbook reader.

use quick_xml::Reader;
use quick_xml::escape::resolve_xml_entity;
use quick_xml::events::{BytesRef, BytesStart, Event};
use std::borrow::Cow;
use std::io::BufRead;
use thiserror::Error;

/// Low-level failures while decoding a workbook archive.
#[derive(Error, Debug)]
pub(crate) enum XlsxError {
    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("{0}")]
    Xml(#[from] quick_xml::Error),

    #[error("{0}")]
    XmlEncoding(#[from] quick_xml::encoding::EncodingError),

    #[error("{0}")]
    XmlAttribute(#[from] quick_xml::events::attributes::AttrError),

    #[error("{0}")]
    ParseInt(#[from] std::num::ParseIntError),

    #[error("missing workbook part '{0}'")]
    MissingPart(String),

    #[error("unknown XML entity '&{0};'")]
    UnknownEntity(String),

    #[error("shared string index {0} is out of range")]
    SharedStringIndex(usize),
}

/// XML reader with a reusable event buffer.
pub(crate) struct XmlReader<R: BufRead> {
    reader: Reader<R>,
    buffer: Vec<u8>,
}

impl<R: BufRead> XmlReader<R> {
    pub(crate) fn new(buf_reader: R) -> XmlReader<R> {
        let mut reader = Reader::from_reader(buf_reader);
        let config = reader.config_mut();
        config.check_comments = false;
        config.check_end_names = false;
        config.expand_empty_elements = true;
        config.trim_text(false);

        XmlReader {
            reader,
            buffer: Vec::with_capacity(1024),
        }
    }

    /// Next event, or `None` at end of input.
    pub(crate) fn next(&mut self) -> Result<Option<Event<'_>>, XlsxError> {
        self.buffer.clear();
        match self.reader.read_event_into(&mut self.buffer)? {
            Event::Eof => Ok(None),
            event => Ok(Some(event)),
        }
    }
}

/// Unescaped value of the attribute `name`, if present.
pub(crate) fn attribute<'a>(
    element: &'a BytesStart<'a>,
    name: &str,
) -> Result<Option<Cow<'a, str>>, XlsxError> {
    match element.try_get_attribute(name)? {
        Some(attribute) => Ok(Some(attribute.unescape_value()?)),
        None => Ok(None),
    }
}

/// Append the text an entity or character reference stands for.
pub(crate) fn push_reference(text: &mut String, reference: &BytesRef) -> Result<(), XlsxError> {
    let raw = reference.xml_content()?;
    if let Some(number) = raw.strip_prefix('#') {
        let code = match number.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16)?,
            None => number.parse::<u32>()?,
        };
        if let Some(character) = char::from_u32(code) {
            text.push(character);
        }
    } else if let Some(entity) = resolve_xml_entity(&raw) {
        text.push_str(entity);
    } else {
        return Err(XlsxError::UnknownEntity(raw.to_string()));
    }
    Ok(())
}

/// Loop over the events of an [`XmlReader`], dispatching to the given match arms.
///
/// Unmatched events are ignored; `Eof` ends the loop.
#[macro_export]
macro_rules! match_xml_events {
    ($reader:expr => { $($arms:tt)* }) => {
        while let Some(event) = $reader.next()? {
            match event {
                Event::Eof => break,
                $($arms)*
                _ => (),
            }
        }
    };
}
