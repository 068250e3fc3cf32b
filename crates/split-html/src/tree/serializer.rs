//! Fragment serializer.
//!
//! Renders a [`Node`] tree back to markup text. Output is stable: parsing
//! the serialized text and serializing again produces identical output,
//! which keeps retained directive blocks fixed points across repeated runs.

use super::Node;

/// Serialize a tree to markup text.
///
/// Fragments render their children only; childless elements are written
/// self-closing. Comment text is emitted verbatim.
#[must_use]
pub fn serialize(node: &Node) -> String {
    let mut out = String::with_capacity(256);
    serialize_node(node, &mut out);
    out
}

fn serialize_node(node: &Node, out: &mut String) {
    match node {
        Node::Fragment { children } => {
            for child in children {
                serialize_node(child, out);
            }
        }
        Node::Element(element) => {
            out.push('<');
            out.push_str(&element.name);
            for (key, value) in &element.attrs {
                out.push(' ');
                out.push_str(key);
                out.push_str("=\"");
                out.push_str(&html_escape::encode_double_quoted_attribute(value));
                out.push('"');
            }

            if element.children.is_empty() {
                out.push_str(" />");
            } else {
                out.push('>');
                for child in &element.children {
                    serialize_node(child, out);
                }
                out.push_str("</");
                out.push_str(&element.name);
                out.push('>');
            }
        }
        Node::Text(text) => {
            out.push_str(&html_escape::encode_text(&text.content));
        }
        Node::Comment(comment) => {
            out.push_str("<!--");
            out.push_str(&comment.text);
            out.push_str("-->");
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::super::parse_fragment;
    use super::*;

    fn round_trip(input: &str) -> String {
        serialize(&parse_fragment(input).unwrap())
    }

    #[test]
    fn serializes_elements_and_text() {
        assert_eq!(round_trip("<p>Hello</p>"), "<p>Hello</p>");
    }

    #[test]
    fn serializes_comments_verbatim() {
        assert_eq!(
            round_trip("<!-- start platform: xbox -->"),
            "<!-- start platform: xbox -->"
        );
    }

    #[test]
    fn escapes_text_content() {
        assert_eq!(round_trip("<p>a &amp; b</p>"), "<p>a &amp; b</p>");
    }

    #[test]
    fn escapes_attribute_values() {
        let out = round_trip(r#"<a title="a &quot;b&quot;" />"#);
        assert_eq!(out, r#"<a title="a &quot;b&quot;" />"#);
    }

    #[test]
    fn self_closing_elements() {
        assert_eq!(round_trip("<br />"), "<br />");
    }

    #[test]
    fn preserves_whitespace_between_nodes() {
        assert_eq!(round_trip("<p>a</p>\n<p>b</p>"), "<p>a</p>\n<p>b</p>");
    }

    #[test]
    fn serialization_is_stable() {
        let once = round_trip("<div class=\"x\">a<br/>b &lt; c</div>");
        let twice = serialize(&parse_fragment(&once).unwrap());
        assert_eq!(once, twice);
    }
}
