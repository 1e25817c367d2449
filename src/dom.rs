//! DOM access helpers.
//!
//! Thin layer over the `dom_query` crate: parsing and the scoping rule shared
//! by discovery and replay. The engine never parses markup itself beyond what
//! `dom_query` provides.

// Re-export core types for external use
pub use dom_query::{Document, NodeRef, Selection};

// Re-export StrTendril for external use
pub use tendril::StrTendril;

/// Parse an HTML string into a document.
#[inline]
#[must_use]
pub fn parse(html: &str) -> Document {
    Document::from(html)
}

/// The scope all discovery and replay runs against: the `body` element when
/// the document has one, the whole document otherwise.
#[must_use]
pub fn body(doc: &Document) -> Selection {
    let body = doc.select("body");
    if body.exists() {
        body
    } else {
        doc.select("html")
    }
}

/// Aggregated text content of a selection (own text plus all descendants).
///
/// Returns `StrTendril` for zero-copy passing. Use `.to_string()` only when
/// you need owned storage.
#[inline]
#[must_use]
pub fn text_content(sel: &Selection) -> StrTendril {
    sel.text()
}
