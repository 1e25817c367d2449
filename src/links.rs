//! Hyperlink fallback: find a link near a located element.
//!
//! A located identity does not always sit on (or contain) an anchor. This
//! fallback resolves the identity to its selector, selects against the live
//! document, and widens by climbing one ancestor at a time when the selector
//! matches nothing, down to a floor of half the identity's depth.

use dom_query::{NodeRef, Selection};
use url::Url;

use crate::error::Result;
use crate::identity::Identity;
use crate::index::TreeIndex;

/// Find an href value near the element addressed by `identity`.
///
/// Resolves the identity against `index` and selects within `scope`. When a
/// selector matches, the first descendant of the first hit carrying an
/// `href` attribute supplies the result; a hit without any such descendant
/// ends the search with `None` without widening further. Only a selector
/// matching nothing at all triggers the climb, one trailing rank per retry,
/// stopping once the floor (`depth.div_ceil(2)`) is reached.
///
/// Fails only when a climbed identity cannot be resolved, which means
/// `identity` did not originate from `index`.
pub fn find_link(scope: &Selection, identity: &Identity, index: &TreeIndex) -> Result<Option<String>> {
    if identity.is_root() {
        return Ok(None);
    }
    let floor = identity.depth().div_ceil(2);
    let mut current = identity.clone();

    loop {
        let selector = index.resolve(&current)?;
        let hits = scope.select(&selector);
        if let Some(node) = hits.nodes().first() {
            return Ok(descendant_href(node));
        }
        if current.depth() <= floor {
            return Ok(None);
        }
        current = current.climb(1)?;
    }
}

/// First `href` value among an element's descendants, document order.
fn descendant_href(node: &NodeRef) -> Option<String> {
    for descendant in node.descendants() {
        if descendant.id == node.id || !descendant.is_element() {
            continue;
        }
        if let Some(href) = descendant.attr("href") {
            return Some(href.to_string());
        }
    }
    None
}

/// Resolve a possibly-relative href against a base URL.
///
/// An href that does not join cleanly (already absolute with an unknown
/// scheme, or malformed) is returned unchanged.
#[must_use]
pub fn absolutize(base: &Url, href: &str) -> String {
    match base.join(href) {
        Ok(absolute) => absolute.to_string(),
        Err(_) => href.to_string(),
    }
}
