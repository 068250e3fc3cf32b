//! Directive recognition in comment text.
//!
//! A directive comment has the shape: optional filler, an optional kind word
//! (`start`, `end`, or nothing for a conditional), the target key, a colon,
//! an optional `not-` marker, and the comparison name:
//!
//! ```text
//! <!-- platform: xbox -->
//! <!-- start platform: not-xbox -->
//! <!-- end platform: not-xbox -->
//! ```
//!
//! Comments whose key token differs from the configured target key are not
//! directives for the current run and pass through untouched, which lets
//! directive families for several keys coexist in one document.

use regex::Regex;

use crate::tree::Comment;

/// Directive kind token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    /// Opens a block; paired with a matching [`DirectiveKind::End`].
    Start,
    /// Closes a block opened by a matching [`DirectiveKind::Start`].
    End,
    /// Guards exactly the next concrete sibling. Default when the kind
    /// token is absent.
    If,
}

/// A structured directive parsed from a comment.
///
/// Ephemeral: recomputed from the comment text on each visit, never stored
/// on the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Recognized kind, or `None` when the comment matched the target key
    /// but carried an unrecognized kind token (malformed at strip time).
    pub kind: Option<DirectiveKind>,
    /// True for the `not-` form.
    pub negated: bool,
    /// The compared value, trimmed.
    pub name: String,
}

/// Target key/value pair a run evaluates directives against.
///
/// Only one pair is evaluated per run; multi-key documents are resolved by
/// running the transform once per key.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MatchContext {
    /// Key a comment must name to be treated as a directive.
    pub target_key: String,
    /// Value directive names are compared against.
    pub target_value: String,
}

impl MatchContext {
    /// Create a context for one target key/value pair.
    #[must_use]
    pub fn new(target_key: impl Into<String>, target_value: impl Into<String>) -> Self {
        Self {
            target_key: target_key.into(),
            target_value: target_value.into(),
        }
    }

    /// Whether a directive holds under this context.
    #[must_use]
    pub fn matches(&self, directive: &Directive) -> bool {
        (directive.name == self.target_value) != directive.negated
    }
}

/// Compiled directive recognizer for one target key.
///
/// The pattern is built once per run from the escaped key, not per node.
#[derive(Debug)]
pub(crate) struct DirectiveMatcher {
    pattern: Regex,
}

impl DirectiveMatcher {
    pub(crate) fn new(target_key: &str) -> Result<Self, regex::Error> {
        let pattern = Regex::new(&format!(
            r"^\W*(.*?\W)?{}:\W*(not-)?(.*?)\W*$",
            regex::escape(target_key)
        ))?;
        Ok(Self { pattern })
    }

    /// Parse a comment as a directive for this run's key.
    pub(crate) fn parse(&self, comment: &Comment) -> Option<Directive> {
        self.parse_text(&comment.text)
    }

    fn parse_text(&self, text: &str) -> Option<Directive> {
        let caps = self.pattern.captures(text)?;

        let kind = match caps.get(1).map(|m| m.as_str().trim()) {
            None => Some(DirectiveKind::If),
            Some("start") => Some(DirectiveKind::Start),
            Some("end") => Some(DirectiveKind::End),
            Some("if") => Some(DirectiveKind::If),
            Some(_) => None,
        };

        Some(Directive {
            kind,
            negated: caps.get(2).is_some(),
            name: caps.get(3).map_or_else(String::new, |m| m.as_str().to_owned()),
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn matcher(key: &str) -> DirectiveMatcher {
        DirectiveMatcher::new(key).unwrap()
    }

    #[test]
    fn bare_key_defaults_to_if() {
        let directive = matcher("platform").parse_text(" platform: xbox ").unwrap();
        assert_eq!(
            directive,
            Directive {
                kind: Some(DirectiveKind::If),
                negated: false,
                name: "xbox".to_owned(),
            }
        );
    }

    #[test]
    fn recognizes_start_and_end() {
        let m = matcher("platform");

        let start = m.parse_text(" start platform: xbox ").unwrap();
        assert_eq!(start.kind, Some(DirectiveKind::Start));

        let end = m.parse_text(" end platform: xbox ").unwrap();
        assert_eq!(end.kind, Some(DirectiveKind::End));
    }

    #[test]
    fn recognizes_negation() {
        let directive = matcher("platform")
            .parse_text(" start platform: not-xbox ")
            .unwrap();
        assert!(directive.negated);
        assert_eq!(directive.name, "xbox");
    }

    #[test]
    fn explicit_if_kind() {
        let directive = matcher("platform").parse_text(" if platform: xbox ").unwrap();
        assert_eq!(directive.kind, Some(DirectiveKind::If));
    }

    #[test]
    fn unrecognized_kind_token() {
        let directive = matcher("platform")
            .parse_text(" banana platform: xbox ")
            .unwrap();
        assert_eq!(directive.kind, None);
    }

    #[test]
    fn other_key_is_not_a_directive() {
        assert_eq!(matcher("platform").parse_text(" locale: en "), None);
    }

    #[test]
    fn ordinary_comments_are_not_directives() {
        let m = matcher("platform");
        assert_eq!(m.parse_text(" just a note "), None);
        assert_eq!(m.parse_text(" 2 nodes snipped by split-html "), None);
    }

    #[test]
    fn no_surrounding_whitespace_required() {
        let directive = matcher("platform").parse_text("platform: xbox").unwrap();
        assert_eq!(directive.kind, Some(DirectiveKind::If));
        assert_eq!(directive.name, "xbox");

        let start = matcher("platform").parse_text("start platform: xbox").unwrap();
        assert_eq!(start.kind, Some(DirectiveKind::Start));
    }

    #[test]
    fn target_key_is_matched_literally() {
        let m = matcher("a.b");
        assert!(m.parse_text(" a.b: on ").is_some());
        // "." must not act as a regex wildcard
        assert_eq!(m.parse_text(" aXb: on "), None);
    }

    #[test]
    fn context_matching() {
        let ctx = MatchContext::new("platform", "xbox");

        let plain = Directive {
            kind: Some(DirectiveKind::If),
            negated: false,
            name: "xbox".to_owned(),
        };
        assert!(ctx.matches(&plain));

        let other = Directive {
            name: "ps4".to_owned(),
            ..plain.clone()
        };
        assert!(!ctx.matches(&other));

        let negated = Directive {
            negated: true,
            ..plain
        };
        assert!(!ctx.matches(&negated));

        let negated_other = Directive {
            kind: Some(DirectiveKind::If),
            negated: true,
            name: "ps4".to_owned(),
        };
        assert!(ctx.matches(&negated_other));
    }
}
