//! Markup fragment tree with per-node source lines.
//!
//! The tree is produced by [`parse_fragment`], mutated in place by the
//! stripper, and rendered back to text with [`serialize`]. Children ordering
//! is significant; comments are first-class nodes because directives live in
//! them.

mod parser;
mod serializer;

pub use parser::parse_fragment;
pub use serializer::serialize;

/// Identity of a comment node within one parsed tree.
///
/// Two END comments can have identical text, so the claimed-END registry is
/// keyed by identity rather than structure. Synthetic snip markers all share
/// [`CommentId::SYNTHETIC`]; they are never registered as claimed ENDs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct CommentId(pub(crate) u32);

impl CommentId {
    pub(crate) const SYNTHETIC: Self = Self(0);
}

/// A node in a parsed markup fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Root of a parsed fragment. Holds children only.
    Fragment {
        /// Top-level nodes of the fragment.
        children: Vec<Node>,
    },
    /// An element with ordered attributes and children.
    Element(Element),
    /// Raw character data.
    Text(Text),
    /// A comment; may carry a directive.
    Comment(Comment),
}

/// An element node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Tag name as written in the source.
    pub name: String,
    /// Attributes in source order.
    pub attrs: Vec<(String, String)>,
    /// Child nodes in source order.
    pub children: Vec<Node>,
    /// 1-based source line of the opening tag.
    pub line: usize,
}

/// A text node. Adjacent text runs (including decoded entity references)
/// are merged into a single node at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    /// Decoded character content.
    pub content: String,
    /// 1-based source line where the run begins.
    pub line: usize,
}

/// A comment node. The text is the content between `<!--` and `-->`,
/// preserved verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    /// Comment text, untrimmed.
    pub text: String,
    /// 1-based source line; 0 for synthetic markers inserted by the
    /// stripper, which have no source position.
    pub line: usize,
    pub(crate) id: CommentId,
}

impl Node {
    /// Children of this node, if it can have any.
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Fragment { children } => Some(children),
            Node::Element(element) => Some(&element.children),
            Node::Text(_) | Node::Comment(_) => None,
        }
    }

    /// Mutable children list, if this node can have children.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Fragment { children } => Some(children),
            Node::Element(element) => Some(&mut element.children),
            Node::Text(_) | Node::Comment(_) => None,
        }
    }

    /// 1-based source line of this node.
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Node::Fragment { .. } => 1,
            Node::Element(element) => element.line,
            Node::Text(text) => text.line,
            Node::Comment(comment) => comment.line,
        }
    }

    /// The comment payload, when this node is a comment.
    #[must_use]
    pub fn as_comment(&self) -> Option<&Comment> {
        match self {
            Node::Comment(comment) => Some(comment),
            _ => None,
        }
    }

    /// Whether this node carries visible content.
    ///
    /// Elements are always concrete; text is concrete unless it is
    /// whitespace-only (indentation between tags). Comments are meta.
    #[must_use]
    pub fn is_concrete(&self) -> bool {
        match self {
            Node::Element(_) => true,
            Node::Text(text) => !text.content.trim().is_empty(),
            Node::Fragment { .. } | Node::Comment(_) => false,
        }
    }
}
