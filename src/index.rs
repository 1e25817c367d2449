//! Positional tree index: node descriptors, the indexer, and path resolution.
//!
//! The index is built once per reference document by a single depth-first
//! walk over the element tree. Every element gets an [`Identity`] (its
//! sibling-rank address) mapped to a descriptor string, the single selector
//! hop `tag[.class...][#id]` derived from the node itself. Resolving an
//! identity back to a full selector concatenates the descriptors of every
//! prefix along its path.

use std::collections::HashMap;

use dom_query::NodeRef;

use crate::error::{Error, Result};
use crate::identity::Identity;

/// Derive the selector hop for a single element node.
///
/// Classes keep their original attribute order; an id is appended last,
/// independent of class presence.
#[must_use]
pub fn node_descriptor(node: &NodeRef) -> String {
    let mut descriptor = node
        .node_name()
        .map(|name| name.to_string())
        .unwrap_or_default();
    if let Some(class) = node.attr("class") {
        for token in class.split_whitespace() {
            descriptor.push('.');
            descriptor.push_str(token);
        }
    }
    if let Some(id) = node.attr("id") {
        descriptor.push('#');
        descriptor.push_str(&id);
    }
    descriptor
}

/// Identity-to-descriptor map over one reference document.
///
/// Built once at document-load time, read-only afterward; safe to share
/// across any number of concurrent lookups.
#[derive(Debug, Default)]
pub struct TreeIndex {
    nodes: HashMap<Identity, String>,
}

impl TreeIndex {
    /// Index every element below `root`, depth-first, pre-order.
    ///
    /// Text-only children are skipped for addressing (they consume no
    /// sibling rank). An element without element children still gets an
    /// entry; an empty tree yields an empty index.
    #[must_use]
    pub fn build(root: &NodeRef) -> Self {
        let mut nodes = HashMap::new();
        let mut path = Vec::new();
        walk(root, &mut path, &mut nodes);
        Self { nodes }
    }

    /// The descriptor recorded for `identity`, if it is indexed.
    #[must_use]
    pub fn descriptor(&self, identity: &Identity) -> Option<&str> {
        self.nodes.get(identity).map(String::as_str)
    }

    /// Resolve an identity to a full descendant-combinator selector.
    ///
    /// Looks up every non-empty prefix of the identity and space-joins the
    /// descriptors. A prefix absent from the index means the identity did
    /// not originate here and fails with [`Error::UnindexedIdentity`]. The
    /// empty identity resolves to the empty selector.
    pub fn resolve(&self, identity: &Identity) -> Result<String> {
        let mut selector = String::new();
        for depth in 1..=identity.depth() {
            let hop = self
                .nodes
                .get(&identity.prefix(depth))
                .ok_or_else(|| Error::UnindexedIdentity {
                    identity: identity.clone(),
                })?;
            if !selector.is_empty() {
                selector.push(' ');
            }
            selector.push_str(hop);
        }
        Ok(selector)
    }

    /// Number of indexed elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the index contains no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

fn walk(node: &NodeRef, path: &mut Vec<usize>, nodes: &mut HashMap<Identity, String>) {
    let mut rank = 0;
    for child in node.children() {
        if !child.is_element() {
            continue;
        }
        rank += 1;
        path.push(rank);
        nodes.insert(Identity::new(path.clone()), node_descriptor(&child));
        walk(&child, path, nodes);
        path.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;

    fn index_of(html: &str) -> TreeIndex {
        let doc = dom::parse(html);
        let scope = dom::body(&doc);
        scope
            .nodes()
            .first()
            .map_or_else(TreeIndex::default, TreeIndex::build)
    }

    #[test]
    fn test_descriptor_tag_only() {
        let doc = dom::parse("<div>text</div>");
        let node = doc.select("div").nodes().first().copied().unwrap();
        assert_eq!(node_descriptor(&node), "div");
    }

    #[test]
    fn test_descriptor_classes_keep_attribute_order() {
        let doc = dom::parse(r#"<div class="quote highlight">text</div>"#);
        let node = doc.select("div").nodes().first().copied().unwrap();
        assert_eq!(node_descriptor(&node), "div.quote.highlight");
    }

    #[test]
    fn test_descriptor_id_appends_after_classes() {
        let doc = dom::parse(r#"<span class="text" id="first">x</span>"#);
        let node = doc.select("span").nodes().first().copied().unwrap();
        assert_eq!(node_descriptor(&node), "span.text#first");

        let doc = dom::parse(r#"<span id="bare">x</span>"#);
        let node = doc.select("span").nodes().first().copied().unwrap();
        assert_eq!(node_descriptor(&node), "span#bare");
    }

    #[test]
    fn test_build_assigns_sibling_ranks_per_parent() {
        let index = index_of(
            r#"<html><body>
                <div class="quote"><span>one</span></div>
                <div class="quote"><span>two</span></div>
            </body></html>"#,
        );

        assert_eq!(index.len(), 4);
        assert_eq!(index.descriptor(&Identity::new(vec![1])), Some("div.quote"));
        assert_eq!(index.descriptor(&Identity::new(vec![2])), Some("div.quote"));
        // Ranks restart at 1 under each parent
        assert_eq!(index.descriptor(&Identity::new(vec![1, 1])), Some("span"));
        assert_eq!(index.descriptor(&Identity::new(vec![2, 1])), Some("span"));
    }

    #[test]
    fn test_build_skips_text_nodes_for_addressing() {
        let index = index_of("<html><body>leading text<p>para</p>more text<em>em</em></body></html>");

        // Text nodes consume no rank: p is (1), em is (2)
        assert_eq!(index.descriptor(&Identity::new(vec![1])), Some("p"));
        assert_eq!(index.descriptor(&Identity::new(vec![2])), Some("em"));
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_empty_tree_yields_empty_index() {
        let index = index_of("<html><body></body></html>");
        assert!(index.is_empty());
    }

    #[test]
    fn test_resolve_joins_prefix_descriptors() {
        let index = index_of(
            r#"<html><body><div class="outer"><ul id="list"><li class="item">x</li></ul></div></body></html>"#,
        );

        let selector = index.resolve(&Identity::new(vec![1, 1, 1])).unwrap();
        assert_eq!(selector, "div.outer ul#list li.item");
    }

    #[test]
    fn test_resolve_empty_identity_is_empty_selector() {
        let index = index_of("<html><body><p>x</p></body></html>");
        assert_eq!(index.resolve(&Identity::new(vec![])).unwrap(), "");
    }

    #[test]
    fn test_resolve_foreign_identity_fails() {
        let index = index_of("<html><body><p>x</p></body></html>");
        let foreign = Identity::new(vec![4, 2]);

        assert!(matches!(
            index.resolve(&foreign),
            Err(Error::UnindexedIdentity { .. })
        ));
    }
}
