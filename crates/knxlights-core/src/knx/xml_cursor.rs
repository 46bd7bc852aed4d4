//! Forward-only cursor over the element events of a project document.
//!
//! The cursor never buffers more than the current element. Parsers descend
//! into the document with [`XmlCursor::read_children`], which turns the flat
//! start/end event feed into recursive-descent callbacks.

use std::fmt;
use std::io::BufRead;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{Location, ParseError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Current {
    Init,
    Start {
        name: String,
        attributes: Vec<(String, String)>,
    },
    End {
        name: String,
    },
    Eof,
}

pub struct XmlCursor<R: BufRead> {
    reader: Reader<R>,
    document: String,
    buf: Vec<u8>,
    current: Current,
    /// Depth of the current element, the root element is 1.
    depth: usize,
    /// End event synthesized for an empty element.
    pending_end: Option<String>,
    /// Nesting of `read_children` calls, only used for trace indentation.
    trace_level: usize,
}

impl<R: BufRead> XmlCursor<R> {
    pub fn new(reader: R, document: impl Into<String>) -> Self {
        Self {
            reader: Reader::from_reader(reader),
            document: document.into(),
            buf: Vec::new(),
            current: Current::Init,
            depth: 0,
            pending_end: None,
            trace_level: 0,
        }
    }

    pub fn location(&self) -> Location {
        location_of(&self.reader, &self.document)
    }

    /// Moves to the next start or end event, skipping text and markup.
    pub fn advance(&mut self) -> Result<(), ParseError> {
        if matches!(self.current, Current::End { .. }) {
            self.depth = self.depth.saturating_sub(1);
        }

        if let Some(name) = self.pending_end.take() {
            self.current = Current::End { name };
            return Ok(());
        }

        loop {
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(error) => {
                    return Err(ParseError::Xml {
                        message: error.to_string(),
                        location: location_of(&self.reader, &self.document),
                    });
                }
            };
            let next = match event {
                Event::Start(element) => Some(start_of(&element)),
                Event::Empty(element) => {
                    let start = start_of(&element);
                    self.pending_end = Some(element_name(&element));
                    Some(start)
                }
                Event::End(element) => Some(Ok(Current::End {
                    name: String::from_utf8_lossy(element.local_name().as_ref()).into_owned(),
                })),
                Event::Eof => Some(Ok(Current::Eof)),
                _ => None,
            };
            let Some(next) = next else {
                continue;
            };
            let next = next.map_err(|message| ParseError::Xml {
                message,
                location: self.location(),
            })?;
            if matches!(next, Current::Start { .. }) {
                self.depth += 1;
            }
            self.current = next;
            return Ok(());
        }
    }

    pub fn is_eof(&self) -> bool {
        matches!(self.current, Current::Eof)
    }

    /// Name of the element whose start event the cursor sits on.
    pub fn start_name(&self) -> Option<&str> {
        match &self.current {
            Current::Start { name, .. } => Some(name),
            _ => None,
        }
    }

    fn is_end_of(&self, name: &str, depth: usize) -> bool {
        matches!(&self.current, Current::End { name: current } if current == name)
            && self.depth == depth
    }

    /// Attribute of the current start element; blank values count as absent.
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.raw_attribute(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string)
    }

    fn raw_attribute(&self, name: &str) -> Option<&str> {
        match &self.current {
            Current::Start { attributes, .. } => attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str()),
            _ => None,
        }
    }

    /// Attribute value kept verbatim (names may carry meaningful spacing).
    pub fn attribute_verbatim(&self, name: &str) -> Option<String> {
        self.raw_attribute(name).map(str::to_string)
    }

    pub fn required_attribute(&self, name: &str) -> Result<String, ParseError> {
        self.attribute(name)
            .ok_or_else(|| ParseError::MissingRequiredAttribute {
                element: self.start_name().unwrap_or("<none>").to_string(),
                attribute: name.to_string(),
                location: self.location(),
            })
    }

    pub fn required_u16_attribute(&self, name: &str) -> Result<u16, ParseError> {
        let value = self.required_attribute(name)?;
        value.parse::<u16>().map_err(|_| ParseError::InvalidAttribute {
            element: self.start_name().unwrap_or("<none>").to_string(),
            attribute: name.to_string(),
            value,
            expected: "u16".to_string(),
            location: self.location(),
        })
    }

    /// Visits the immediate children of the element the cursor sits on.
    ///
    /// `on_child` is called with the cursor on each child's start event. It
    /// may leave the cursor there, in which case the child's subtree is
    /// skipped, or consume the whole child and leave the cursor on the
    /// child's end event. Returns with the cursor on the parent's end event.
    pub fn read_children<F>(&mut self, mut on_child: F) -> Result<(), ParseError>
    where
        F: FnMut(&mut Self, &str) -> Result<(), ParseError>,
    {
        self.trace_level += 1;
        let result = self.read_children_inner(&mut on_child);
        self.trace_level -= 1;
        result
    }

    fn read_children_inner<F>(&mut self, on_child: &mut F) -> Result<(), ParseError>
    where
        F: FnMut(&mut Self, &str) -> Result<(), ParseError>,
    {
        let mut level: usize = 0;
        loop {
            match &self.current {
                Current::Start { name, .. } => {
                    if level == 1 {
                        let name = name.clone();
                        let depth = self.depth;
                        self.trace(format_args!("<{}> ({})", name, level));
                        on_child(self, &name)?;
                        if self.is_end_of(&name, depth) {
                            self.trace(format_args!("</{}> consumed by handler", name));
                            self.advance()?;
                            continue;
                        }
                    }
                    level += 1;
                    self.advance()?;
                }
                Current::End { name } => {
                    if level == 0 {
                        return Err(ParseError::UnbalancedElements {
                            location: self.location(),
                        });
                    }
                    level -= 1;
                    if level == 0 {
                        self.trace(format_args!("done </{}>", name));
                        return Ok(());
                    }
                    self.advance()?;
                }
                Current::Eof => {
                    return Err(ParseError::UnexpectedEnd {
                        location: self.location(),
                    });
                }
                Current::Init => self.advance()?,
            }
        }
    }

    fn trace(&self, message: fmt::Arguments<'_>) {
        if log::log_enabled!(log::Level::Trace) {
            let indent = "  ".repeat(self.trace_level.saturating_sub(1));
            log::trace!("{}{}", indent, message);
        }
    }
}

fn location_of<R>(reader: &Reader<R>, document: &str) -> Location {
    Location {
        document: document.to_string(),
        position: reader.buffer_position() as u64,
    }
}

fn element_name(element: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(element.local_name().as_ref()).into_owned()
}

fn start_of(element: &BytesStart<'_>) -> Result<Current, String> {
    let mut attributes = Vec::new();
    for attribute in element.attributes() {
        let attribute = attribute.map_err(|error| error.to_string())?;
        let key = String::from_utf8_lossy(attribute.key.local_name().as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|error| error.to_string())?
            .into_owned();
        attributes.push((key, value));
    }
    Ok(Current::Start {
        name: element_name(element),
        attributes,
    })
}
