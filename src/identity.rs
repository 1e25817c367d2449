//! Positional addresses for indexed tree nodes.
//!
//! An [`Identity`] is the address of one element node: the ordered sequence of
//! 1-based sibling ranks (counting element children only) on the path from the
//! indexed root down to the node. Identities are comparable by prefix, so the
//! ancestor/descendant relation is exactly the prefix relation.

use std::fmt;

use crate::error::{Error, Result};

/// Positional address of a tree node.
///
/// Produced by the indexer and the string locator; immutable afterward. The
/// empty identity addresses the indexed root itself and only appears as the
/// result of merging identities that diverge at the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identity(Vec<usize>);

impl Identity {
    /// Create an identity from sibling ranks, root-first.
    #[must_use]
    pub fn new(ranks: Vec<usize>) -> Self {
        Self(ranks)
    }

    /// The sibling ranks, root-first.
    #[must_use]
    pub fn ranks(&self) -> &[usize] {
        &self.0
    }

    /// Tree depth of the addressed node relative to the indexed root.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.0.len()
    }

    /// Whether this is the empty identity (the indexed root).
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    /// The identity truncated to `depth` leading ranks.
    #[must_use]
    pub fn prefix(&self, depth: usize) -> Self {
        Self(self.0[..depth.min(self.0.len())].to_vec())
    }

    /// Address an ancestor by dropping `levels` trailing ranks.
    ///
    /// Climbing by 0 returns the identity unchanged. Climbing by the full
    /// depth or more would truncate past the root and fails with
    /// [`Error::ClimbOutOfRange`].
    pub fn climb(&self, levels: usize) -> Result<Self> {
        if levels == 0 {
            return Ok(self.clone());
        }
        if levels >= self.0.len() {
            return Err(Error::ClimbOutOfRange {
                depth: self.0.len(),
                climb: levels,
            });
        }
        Ok(Self(self.0[..self.0.len() - levels].to_vec()))
    }

    /// Longest common address prefix of two identities.
    ///
    /// May be empty when the identities diverge at the root.
    #[must_use]
    pub fn common_prefix(&self, other: &Self) -> Self {
        let shared = self
            .0
            .iter()
            .zip(&other.0)
            .take_while(|(a, b)| a == b)
            .map(|(a, _)| *a)
            .collect();
        Self(shared)
    }

    /// Whether this identity addresses an ancestor of `other` (strict).
    #[must_use]
    pub fn is_ancestor_of(&self, other: &Self) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }
}

impl From<Vec<usize>> for Identity {
    fn from(ranks: Vec<usize>) -> Self {
        Self(ranks)
    }
}

impl From<&[usize]> for Identity {
    fn from(ranks: &[usize]) -> Self {
        Self(ranks.to_vec())
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, rank) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ",")?;
            }
            write!(f, "{rank}")?;
        }
        write!(f, ")")
    }
}

/// Fold a newly located identity into the running shared-parent identity.
///
/// With no existing parent the new identity becomes the parent; otherwise the
/// result is the longest common prefix of the two. Folding a sequence of
/// identities this way is order-independent in its final value.
#[must_use]
pub fn merge(existing: Option<&Identity>, added: &Identity) -> Identity {
    match existing {
        None => added.clone(),
        Some(parent) => parent.common_prefix(added),
    }
}
