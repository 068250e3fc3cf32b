//! Error types for fragment splitting.

use std::fmt;

/// Reason a directive run failed. All kinds are fatal to the current run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum DirectiveErrorKind {
    /// A START directive with no matching END before siblings ran out.
    #[error("Cannot find END of directive block")]
    UnterminatedBlock,

    /// An END directive never claimed by a preceding START scan.
    #[error("Found an END directive block without a start")]
    OrphanEnd,

    /// An IF directive with no concrete sibling after it.
    #[error("Dangling split block, expected another node after this line!")]
    DanglingConditional,

    /// A comment matched the target key but its kind token is unrecognized.
    /// Carries the trimmed comment text.
    #[error("Found a malformed directive block \"{0}\"")]
    MalformedDirective(String),
}

/// A positioned directive failure.
///
/// Renders as `INPUT:<line>  <reason> (split-html-loader)` until a filename
/// is attached via [`DirectiveError::with_file`], after which it renders as
/// `<file>:<line>: <reason> (split-html-loader)` with a trailing newline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectiveError {
    /// What went wrong.
    pub kind: DirectiveErrorKind,
    /// 1-based input line of the offending comment.
    pub line: usize,
    file: Option<String>,
}

impl DirectiveError {
    pub(crate) fn new(kind: DirectiveErrorKind, line: usize) -> Self {
        Self {
            kind,
            line,
            file: None,
        }
    }

    /// Attach the resource path the input came from. Used by adapter layers;
    /// the core never resolves paths itself.
    #[must_use]
    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// The attached resource path, if any.
    #[must_use]
    pub fn file(&self) -> Option<&str> {
        self.file.as_deref()
    }
}

impl fmt::Display for DirectiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => writeln!(f, "{file}:{}: {} (split-html-loader)", self.line, self.kind),
            None => write!(f, "INPUT:{}  {} (split-html-loader)", self.line, self.kind),
        }
    }
}

impl std::error::Error for DirectiveError {}

/// Error while parsing raw markup into a tree.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum MarkupError {
    /// Markup parsing error.
    #[error("markup parse error")]
    Parse(#[from] quick_xml::Error),

    /// Encoding error while decoding parser events.
    #[error("encoding error")]
    Encoding(#[from] quick_xml::encoding::EncodingError),
}

/// Any failure of a full splitting run.
#[derive(Debug, thiserror::Error)]
pub enum SplitError {
    /// Input was not well-formed markup.
    #[error(transparent)]
    Markup(#[from] MarkupError),

    /// Malformed directive structure.
    #[error(transparent)]
    Directive(#[from] DirectiveError),

    /// The target key produced an unusable match pattern.
    #[error("invalid target key pattern")]
    Pattern(#[from] regex::Error),
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn renders_input_position() {
        let err = DirectiveError::new(DirectiveErrorKind::UnterminatedBlock, 3);
        assert_eq!(
            err.to_string(),
            "INPUT:3  Cannot find END of directive block (split-html-loader)"
        );
    }

    #[test]
    fn renders_attached_filename() {
        let err = DirectiveError::new(DirectiveErrorKind::DanglingConditional, 1)
            .with_file("./foo/bar.html");
        assert_eq!(
            err.to_string(),
            "./foo/bar.html:1: Dangling split block, expected another node after this \
             line! (split-html-loader)\n"
        );
    }

    #[test]
    fn quotes_malformed_comment_text() {
        let err = DirectiveError::new(
            DirectiveErrorKind::MalformedDirective("banana platform: xbox".to_owned()),
            2,
        );
        assert_eq!(
            err.to_string(),
            "INPUT:2  Found a malformed directive block \"banana platform: xbox\" (split-html-loader)"
        );
    }
}
