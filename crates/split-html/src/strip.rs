//! Recursive tree stripping.
//!
//! Walks a fragment depth-first, resolves directive comments against the
//! run's [`MatchContext`], and rewrites children lists in place. Removed
//! spans are always replaced by a single snip marker comment recording how
//! many nodes were elided, so downstream diffing can see that elision
//! occurred.

use std::collections::HashSet;

use crate::directive::{Directive, DirectiveKind, DirectiveMatcher, MatchContext};
use crate::error::{DirectiveError, DirectiveErrorKind, SplitError};
use crate::tree::{self, Comment, CommentId, Node};

/// Directive-splitting processor for one target context.
///
/// Reusable across documents; each [`Splitter::run`] operates on an
/// independently owned tree, so separate instances (or separate calls) need
/// no coordination.
pub struct Splitter {
    matcher: DirectiveMatcher,
    context: MatchContext,
}

impl Splitter {
    /// Build a splitter for one target key/value pair. The match pattern is
    /// compiled here, once per context.
    pub fn new(context: MatchContext) -> Result<Self, SplitError> {
        let matcher = DirectiveMatcher::new(&context.target_key)?;
        Ok(Self { matcher, context })
    }

    /// Parse `source`, strip it against this context, and serialize the
    /// result.
    ///
    /// # Errors
    ///
    /// Fails on malformed markup or malformed directive structure; no
    /// partial output is produced.
    pub fn run(&self, source: &str) -> Result<String, SplitError> {
        tracing::debug!(
            target_key = %self.context.target_key,
            target_value = %self.context.target_value,
            "splitting fragment"
        );
        let mut tree = tree::parse_fragment(source)?;
        self.strip(&mut tree)?;
        Ok(tree::serialize(&tree))
    }

    /// Strip a parsed tree in place.
    pub fn strip(&self, node: &mut Node) -> Result<(), DirectiveError> {
        let Some(children) = node.children_mut() else {
            return Ok(());
        };

        // END comments already paired by a START scan at this level.
        let mut claimed_ends: HashSet<CommentId> = HashSet::new();

        let mut i = 0;
        while i < children.len() {
            let Some(directive) = children[i]
                .as_comment()
                .and_then(|comment| self.matcher.parse(comment))
            else {
                // Directive resolution never crosses into sibling subtrees;
                // nested trees are stripped by the recursive call.
                self.strip(&mut children[i])?;
                i += 1;
                continue;
            };

            let line = children[i].line();
            let matches = self.context.matches(&directive);

            match directive.kind {
                Some(DirectiveKind::Start) => {
                    let end = find_block_end(i + 1, &directive, children, &self.matcher)
                        .ok_or_else(|| {
                            DirectiveError::new(DirectiveErrorKind::UnterminatedBlock, line)
                        })?;
                    if let Some(end_comment) = children[end].as_comment() {
                        claimed_ends.insert(end_comment.id);
                    }

                    // Keep START and END, snip everything between. An empty
                    // block has nothing to mark, so no splice.
                    let removed = end - i - 1;
                    if !matches && removed > 0 {
                        tracing::trace!(line, name = %directive.name, removed, "snipping block");
                        splice(children, i, end, removed);
                    }
                }
                Some(DirectiveKind::If) => {
                    let subject = find_next_concrete(i + 1, children).ok_or_else(|| {
                        DirectiveError::new(DirectiveErrorKind::DanglingConditional, line)
                    })?;

                    if !matches {
                        // Remove the guarded node and any meta nodes before it.
                        let removed = subject - i;
                        tracing::trace!(line, name = %directive.name, removed, "snipping node");
                        splice(children, i, subject + 1, removed);
                    }
                }
                Some(DirectiveKind::End) => {
                    let claimed = children[i]
                        .as_comment()
                        .is_some_and(|comment| claimed_ends.contains(&comment.id));
                    if !claimed {
                        return Err(DirectiveError::new(DirectiveErrorKind::OrphanEnd, line));
                    }
                    // Retained as a marker of block extent; no mutation.
                }
                None => {
                    let text = children[i]
                        .as_comment()
                        .map_or_else(String::new, |comment| comment.text.trim().to_owned());
                    return Err(DirectiveError::new(
                        DirectiveErrorKind::MalformedDirective(text),
                        line,
                    ));
                }
            }

            i += 1;
        }

        Ok(())
    }
}

/// Find the END paired with `start`, scanning siblings from `after`.
///
/// Only an `end` directive with identical negation and name terminates the
/// scan; nested blocks of other names are skipped intact and resolved
/// independently in the same top-level pass.
fn find_block_end(
    after: usize,
    start: &Directive,
    siblings: &[Node],
    matcher: &DirectiveMatcher,
) -> Option<usize> {
    (after..siblings.len()).find(|&i| {
        siblings[i]
            .as_comment()
            .and_then(|comment| matcher.parse(comment))
            .is_some_and(|d| {
                d.kind == Some(DirectiveKind::End)
                    && d.negated == start.negated
                    && d.name == start.name
            })
    })
}

/// Find the next concrete sibling from `after`, skipping meta nodes.
fn find_next_concrete(after: usize, siblings: &[Node]) -> Option<usize> {
    (after..siblings.len()).find(|&i| siblings[i].is_concrete())
}

/// Rewrite `children` to `[..=keep] + snip(removed) + [resume..]`.
///
/// The prefix is preserved, so the caller's index stays valid and the scan
/// never revisits removed nodes.
fn splice(children: &mut Vec<Node>, keep: usize, resume: usize, removed: usize) {
    let tail = children.split_off(resume);
    children.truncate(keep + 1);
    children.push(snip_marker(removed));
    children.extend(tail);
}

/// Synthetic comment recording how many nodes were elided.
fn snip_marker(count: usize) -> Node {
    let noun = if count > 1 { "nodes" } else { "node" };
    Node::Comment(Comment {
        text: format!(" {count} {noun} snipped by split-html "),
        line: 0,
        id: CommentId::SYNTHETIC,
    })
}
