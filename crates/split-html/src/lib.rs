//! Conditional pruning of markup fragments via comment directives.
//!
//! A single shared source document can carry platform- or variant-specific
//! fragments guarded by directive comments. Running the splitter with a
//! target key/value context removes the fragments that do not apply,
//! leaving a snip marker in their place:
//!
//! - `<!-- platform: xbox -->` guards exactly the next concrete node;
//! - `<!-- start platform: xbox -->` / `<!-- end platform: xbox -->` guard
//!   the span of siblings between them;
//! - `not-` negates the comparison: `<!-- platform: not-xbox -->`.
//!
//! Directives support only equality (and negated equality) against a single
//! name; this is not a templating language.
//!
//! # Example
//!
//! ```
//! use split_html::{MatchContext, run};
//!
//! let source = "<!-- start platform: xbox --><p>Xbox only</p><!-- end platform: xbox -->";
//!
//! let retained = run(source, &MatchContext::new("platform", "xbox")).unwrap();
//! assert!(retained.contains("Xbox only"));
//!
//! let snipped = run(source, &MatchContext::new("platform", "ps4")).unwrap();
//! assert!(snipped.contains("<!-- 1 node snipped by split-html -->"));
//! ```

mod directive;
mod error;
mod strip;
mod tree;

pub use directive::{Directive, DirectiveKind, MatchContext};
pub use error::{DirectiveError, DirectiveErrorKind, MarkupError, SplitError};
pub use strip::Splitter;
pub use tree::{Comment, Element, Node, Text, parse_fragment, serialize};

/// Split `source` against one target context.
///
/// Convenience for [`Splitter::new`] + [`Splitter::run`]; build a
/// [`Splitter`] directly to reuse the compiled context across documents.
///
/// # Errors
///
/// Fails on malformed markup or malformed directive structure.
pub fn run(source: &str, context: &MatchContext) -> Result<String, SplitError> {
    Splitter::new(context.clone())?.run(source)
}
