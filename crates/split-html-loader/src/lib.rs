//! Build-tool adapter for `split-html`.
//!
//! Decodes loader options from a query string (the form build-tool
//! integrations pass configuration in), runs the splitter, and decorates
//! directive errors with the resource path relative to the enclosing
//! package root:
//!
//! ```
//! let out = split_html_loader::transform(
//!     "<!-- platform: xbox --><p>x</p>",
//!     "target=platform&value=xbox",
//! )
//! .unwrap();
//! assert_eq!(out, "<!-- platform: xbox --><p>x</p>");
//! ```

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;
use split_html::{MatchContext, SplitError};

/// Adapter failure: bad options, or a failed splitting run.
#[derive(Debug, thiserror::Error)]
pub enum LoaderError {
    /// The query string did not decode to `target=<key>&value=<name>`.
    #[error(
        "split-html-loader is unable to parse the provided query string, \
         expected `target=<key>&value=<name>`"
    )]
    InvalidOptions,

    /// The splitting run itself failed.
    #[error(transparent)]
    Split(#[from] SplitError),
}

/// Decoded loader options.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Options {
    /// Target key directives are recognized by.
    pub target: String,
    /// Value directive names are compared against.
    pub value: String,
}

impl Options {
    /// Decode options from a query string such as `target=platform&value=xbox`.
    ///
    /// A leading `?` is tolerated, `+` decodes to a space, and percent
    /// escapes are resolved. Unknown keys are ignored.
    pub fn from_query(raw: &str) -> Result<Self, LoaderError> {
        let raw = raw.strip_prefix('?').unwrap_or(raw);

        let mut target = None;
        let mut value = None;
        for pair in raw.split('&').filter(|pair| !pair.is_empty()) {
            let (key, val) = pair.split_once('=').ok_or(LoaderError::InvalidOptions)?;
            match decode_component(key)?.as_str() {
                "target" => target = Some(decode_component(val)?),
                "value" => value = Some(decode_component(val)?),
                _ => {}
            }
        }

        match (target, value) {
            (Some(target), Some(value)) => Ok(Self { target, value }),
            _ => Err(LoaderError::InvalidOptions),
        }
    }

    fn context(&self) -> MatchContext {
        MatchContext::new(&self.target, &self.value)
    }
}

fn decode_component(component: &str) -> Result<String, LoaderError> {
    let component = component.replace('+', " ");
    percent_decode_str(&component)
        .decode_utf8()
        .map(Cow::into_owned)
        .map_err(|_| LoaderError::InvalidOptions)
}

/// Decode `raw_options` and split `source` against them.
///
/// # Errors
///
/// Fails when the options do not decode or the splitting run fails;
/// directive errors keep their `INPUT:<line>` position.
pub fn transform(source: &str, raw_options: &str) -> Result<String, LoaderError> {
    let options = Options::from_query(raw_options)?;
    tracing::debug!(target = %options.target, value = %options.value, "transforming source");
    Ok(split_html::run(source, &options.context())?)
}

/// Like [`transform`], but directive errors are decorated with `resource`
/// rendered relative to the nearest enclosing package root.
///
/// # Errors
///
/// Same as [`transform`].
pub fn transform_resource(
    source: &str,
    raw_options: &str,
    resource: &Path,
) -> Result<String, LoaderError> {
    let options = Options::from_query(raw_options)?;
    split_html::run(source, &options.context())
        .map_err(|err| attach_resource(err, resource).into())
}

fn attach_resource(err: SplitError, resource: &Path) -> SplitError {
    match err {
        SplitError::Directive(directive) => {
            SplitError::Directive(directive.with_file(display_path(resource)))
        }
        other => other,
    }
}

/// Render a resource path relative to its package root, `./`-prefixed.
fn display_path(resource: &Path) -> String {
    let relative = resource
        .parent()
        .map(find_pkg_root)
        .and_then(|root| resource.strip_prefix(root).ok())
        .unwrap_or(resource);
    format!("./{}", relative.display())
}

/// Nearest ancestor directory containing a `Cargo.toml`, defaulting to the
/// filesystem root.
fn find_pkg_root(dir: &Path) -> PathBuf {
    dir.ancestors()
        .find(|candidate| candidate.join("Cargo.toml").is_file())
        .map_or_else(|| PathBuf::from("/"), Path::to_path_buf)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn decodes_plain_options() {
        let options = Options::from_query("target=platform&value=xbox").unwrap();
        assert_eq!(
            options,
            Options {
                target: "platform".to_owned(),
                value: "xbox".to_owned(),
            }
        );
    }

    #[test]
    fn decodes_escapes_and_leading_question_mark() {
        let options = Options::from_query("?target=my+key&value=a%20b").unwrap();
        assert_eq!(options.target, "my key");
        assert_eq!(options.value, "a b");
    }

    #[test]
    fn ignores_unknown_keys() {
        let options = Options::from_query("target=platform&debug=1&value=xbox").unwrap();
        assert_eq!(options.target, "platform");
    }

    #[test]
    fn rejects_incomplete_options() {
        assert!(matches!(
            Options::from_query("target=platform"),
            Err(LoaderError::InvalidOptions)
        ));
        assert!(matches!(
            Options::from_query("garbage"),
            Err(LoaderError::InvalidOptions)
        ));
    }

    #[test]
    fn transforms_with_decoded_options() {
        let out = transform(
            "<!-- platform: xbox --><p>x</p>",
            "target=platform&value=ps4",
        )
        .unwrap();
        assert_eq!(
            out,
            "<!-- platform: xbox --><!-- 1 node snipped by split-html -->"
        );
    }

    #[test]
    fn attaches_resource_path_relative_to_package_root() {
        let pkg = tempfile::tempdir().unwrap();
        std::fs::write(pkg.path().join("Cargo.toml"), "[package]\n").unwrap();
        let resource = pkg.path().join("foo").join("bar.html");

        let err = transform_resource("<!-- a: b -->", "target=a&value=b", &resource).unwrap_err();
        assert_eq!(
            err.to_string(),
            "./foo/bar.html:1: Dangling split block, expected another node after this \
             line! (split-html-loader)\n"
        );
    }

    #[test]
    fn falls_back_to_full_path_without_a_package_root() {
        let dir = tempfile::tempdir().unwrap();
        let resource = dir.path().join("page.html");

        let err = transform_resource("<!-- a: b -->", "target=a&value=b", &resource).unwrap_err();
        let rendered = err.to_string();
        assert!(rendered.starts_with("./"));
        assert!(rendered.contains("page.html:1: Dangling split block"));
    }

    #[test]
    fn successful_transform_needs_no_decoration() {
        let out = transform_resource(
            "<!-- a: b --><p>x</p>",
            "target=a&value=b",
            Path::new("/nowhere/page.html"),
        )
        .unwrap();
        assert_eq!(out, "<!-- a: b --><p>x</p>");
    }
}
