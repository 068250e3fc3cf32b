//! Fragment parser with 1-based line tracking.
//!
//! Parses a markup fragment into a [`Node`] tree. The input is wrapped in a
//! synthetic root element so that bare fragments (text, multiple top-level
//! elements, comments) parse as a document fragment.

use std::borrow::Cow;

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::{Comment, CommentId, Element, Node, Text};
use crate::error::MarkupError;

/// Synthetic root element name. Contains no newline, so source line numbers
/// inside the wrapper match the unwrapped input.
const WRAPPER: &str = "split-html-fragment";

/// Parse a markup fragment into a [`Node::Fragment`] tree.
///
/// Every node records the 1-based line of its first byte in `input`.
/// Adjacent text runs and decoded entity references are merged into single
/// text nodes.
///
/// # Errors
///
/// Returns an error if the fragment is not well-formed markup.
pub fn parse_fragment(input: &str) -> Result<Node, MarkupError> {
    let wrapped = format!("<{WRAPPER}>{input}</{WRAPPER}>");
    let mut reader = Reader::from_str(&wrapped);
    reader.config_mut().trim_text(false);

    // Consume the wrapper's opening tag.
    loop {
        match reader.read_event()? {
            Event::Start(_) => break,
            Event::Eof => return Ok(Node::Fragment { children: Vec::new() }),
            _ => {}
        }
    }

    let mut parser = FragmentParser {
        lines: LineIndex::new(&wrapped),
        next_id: 1,
    };
    let children = parser.parse_nodes(&mut reader)?;
    Ok(Node::Fragment { children })
}

struct FragmentParser {
    lines: LineIndex,
    next_id: u32,
}

impl FragmentParser {
    /// Parse sibling nodes until the enclosing element closes.
    fn parse_nodes(&mut self, reader: &mut Reader<&[u8]>) -> Result<Vec<Node>, MarkupError> {
        let mut nodes = Vec::new();

        loop {
            let offset = usize::try_from(reader.buffer_position()).unwrap_or(usize::MAX);
            let line = self.lines.line_at(offset);

            match reader.read_event()? {
                Event::Start(e) => {
                    let name = decode_bytes(reader, e.name().as_ref());
                    let attrs = decode_attrs(reader, &e);
                    let children = self.parse_nodes(reader)?;
                    nodes.push(Node::Element(Element {
                        name,
                        attrs,
                        children,
                        line,
                    }));
                }
                Event::Empty(e) => {
                    nodes.push(Node::Element(Element {
                        name: decode_bytes(reader, e.name().as_ref()),
                        attrs: decode_attrs(reader, &e),
                        children: Vec::new(),
                        line,
                    }));
                }
                Event::Text(e) => {
                    let text = reader.decoder().decode(&e)?.into_owned();
                    push_text(&mut nodes, &text, line);
                }
                Event::GeneralRef(e) => {
                    let entity = reader.decoder().decode(&e)?.into_owned();
                    push_text(&mut nodes, &decode_entity(&entity), line);
                }
                Event::CData(e) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    push_text(&mut nodes, &text, line);
                }
                Event::Comment(e) => {
                    let text = reader.decoder().decode(&e)?.into_owned();
                    nodes.push(Node::Comment(Comment {
                        text,
                        line,
                        id: self.fresh_id(),
                    }));
                }
                Event::End(_) | Event::Eof => return Ok(nodes),
                Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            }
        }
    }

    fn fresh_id(&mut self) -> CommentId {
        let id = CommentId(self.next_id);
        self.next_id += 1;
        id
    }
}

/// Append text, merging into a trailing text node so that a run interleaved
/// with entity references stays a single node.
fn push_text(nodes: &mut Vec<Node>, text: &str, line: usize) {
    if let Some(Node::Text(last)) = nodes.last_mut() {
        last.content.push_str(text);
    } else {
        nodes.push(Node::Text(Text {
            content: text.to_owned(),
            line,
        }));
    }
}

/// Decode a named or numeric entity reference to its character value.
///
/// Unknown entities are preserved literally.
fn decode_entity(name: &str) -> String {
    let raw = format!("&{name};");
    html_escape::decode_html_entities(&raw).into_owned()
}

fn decode_bytes<R>(reader: &Reader<R>, bytes: &[u8]) -> String {
    reader.decoder().decode(bytes).map_or_else(
        |_| String::from_utf8_lossy(bytes).into_owned(),
        Cow::into_owned,
    )
}

fn decode_attrs<R>(reader: &Reader<R>, e: &BytesStart) -> Vec<(String, String)> {
    let mut attrs = Vec::new();
    for attr in e.attributes().flatten() {
        let key = decode_bytes(reader, attr.key.as_ref());
        let value = attr.unescape_value().map_or_else(
            |_| String::from_utf8_lossy(&attr.value).into_owned(),
            Cow::into_owned,
        );
        attrs.push((key, value));
    }
    attrs
}

/// Byte-offset to 1-based line lookup.
struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    fn new(source: &str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self { starts }
    }

    fn line_at(&self, offset: usize) -> usize {
        self.starts.partition_point(|&start| start <= offset)
    }
}
