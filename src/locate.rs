//! The string locator: find the element addressed by a piece of text.
//!
//! Because a node's aggregated text includes all descendant text, any
//! ancestor of a matching element also matches; a naive first-match search
//! would stop at the document root. The search below defers its decision:
//! a match only overwrites a shared candidate slot, and a node is finalized
//! as *the* match for the current occurrence only when none of its
//! descendants overwrote the slot with a deeper match. Finalized matches are
//! what occurrence counting sees, so a parent and child containing the same
//! text count once.

use std::fmt;

use dom_query::NodeRef;
use regex::Regex;

use crate::error::{Error, Result};
use crate::identity::Identity;

/// What the locator searches for.
#[derive(Debug, Clone)]
pub enum Target {
    /// Exact substring containment against a node's aggregated text.
    Substring(String),
    /// Regular-expression search against a node's aggregated text.
    Pattern(Regex),
}

impl Target {
    /// A substring target.
    pub fn substring(text: impl Into<String>) -> Self {
        Self::Substring(text.into())
    }

    /// A regex target, compiled from `pattern`.
    pub fn pattern(pattern: &str) -> Result<Self> {
        Ok(Self::Pattern(Regex::new(pattern)?))
    }

    /// Whether `text` satisfies this target.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        match self {
            Self::Substring(needle) => text.contains(needle.as_str()),
            Self::Pattern(pattern) => pattern.is_match(text),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Substring(needle) => f.write_str(needle),
            Self::Pattern(pattern) => f.write_str(pattern.as_str()),
        }
    }
}

/// Find the identity of the `occurrence`-th element matching `target`.
///
/// The result is the most deeply nested element whose own aggregated text
/// still matches; occurrences are counted over such finalized matches only,
/// in document order of finalization. `occurrence` below 1 is treated as 1.
/// To address an ancestor of the match instead, follow up with
/// [`Identity::climb`].
///
/// Fails with [`Error::StringNotFound`] when fewer than `occurrence`
/// matches exist.
pub fn locate(root: &NodeRef, target: &Target, occurrence: usize) -> Result<Identity> {
    let occurrence = occurrence.max(1);
    let mut search = Search {
        target,
        remaining: occurrence,
        candidate: None,
        matched_level: None,
        done: false,
    };
    let mut path = Vec::new();
    search.visit(root, &mut path, 0);

    search.candidate.ok_or_else(|| Error::StringNotFound {
        target: target.to_string(),
        occurrence,
    })
}

/// Traversal state for one `locate` call.
///
/// One instance per call; the candidate slot, decision level and
/// early-termination flag are shared across the whole recursion, not
/// per-branch. `done` is checked after every recursive return so the
/// traversal stops without unwinding machinery once the requested
/// occurrence is frozen.
struct Search<'t> {
    target: &'t Target,
    remaining: usize,
    candidate: Option<Identity>,
    matched_level: Option<usize>,
    done: bool,
}

impl Search<'_> {
    fn visit(&mut self, node: &NodeRef, path: &mut Vec<usize>, level: usize) {
        let mut rank = 0;
        for child in node.children() {
            if !child.is_element() {
                continue;
            }
            rank += 1;
            path.push(rank);
            if self.target.matches(&child.text()) {
                self.candidate = Some(Identity::new(path.clone()));
                self.matched_level = Some(level + 1);
            }
            self.visit(&child, path, level + 1);
            path.pop();
            if self.done {
                return;
            }
        }

        // No descendant overwrote the slot: the recorded match at this level
        // is the deepest one and finalizes an occurrence.
        if self.matched_level == Some(level) {
            self.remaining -= 1;
            if self.remaining == 0 {
                self.done = true;
            } else {
                self.candidate = None;
            }
            self.matched_level = None;
        }
    }
}
