//! # rs-textpath
//!
//! Selector discovery for web scraping: locate elements inside a parsed HTML
//! document by the text they contain, turn each located position into a
//! reusable CSS selector, and replay the assembled rule against other,
//! structurally-similar pages.
//!
//! The engine indexes the reference document once, addressing every element
//! by its positional identity (sibling ranks from the root). A field
//! registration searches the tree for the most deeply nested element whose
//! text still contains the example string, and successive registrations
//! narrow a running shared parent - the repeating element a rule iterates
//! during extraction.
//!
//! ## Quick Start
//!
//! ```rust
//! use rs_textpath::{Extractor, FieldSpec, Pipeline, Rules};
//!
//! let reference = r#"<html><body>
//!   <div class="product"><span class="name">Espresso machine</span>
//!     <span class="price">$120</span></div>
//!   <div class="product"><span class="name">Burr grinder</span>
//!     <span class="price">$45</span></div>
//! </body></html>"#;
//!
//! let mut rules = Rules::from_html(reference);
//! rules.add_field_with("name", "Espresso machine", &FieldSpec {
//!     processor: Some(Pipeline::Text.into()),
//!     ..FieldSpec::default()
//! })?;
//! rules.add_field_with("price", "$120", &FieldSpec {
//!     processor: Some(Pipeline::Text.into()),
//!     ..FieldSpec::default()
//! })?;
//!
//! // Both fields live under the repeating product container.
//! assert_eq!(rules.parent_selector()?, "div.product");
//!
//! // Replay the rule: one record per product, on this or any
//! // structurally-similar page.
//! let extractor = Extractor::from_rules(&rules)?;
//! let records = extractor.extract_html(reference)?;
//! assert_eq!(records.len(), 2);
//! # Ok::<(), rs_textpath::Error>(())
//! ```
//!
//! ## Scope
//!
//! The engine does not fetch documents, keeps no state across documents
//! (the index lives exactly as long as its [`Rules`]), and matches text
//! exactly (substring or regex) - no fuzzy matching.

mod error;

/// DOM access helpers over `dom_query`.
pub mod dom;

/// Charset detection and transcoding for local HTML files.
pub mod encoding;

/// Positional addresses of indexed tree nodes.
pub mod identity;

/// Node descriptors, the tree indexer and path resolution.
pub mod index;

/// The text-driven string locator.
pub mod locate;

/// Hyperlink fallback near located elements.
pub mod links;

/// Post-processing pipelines for extracted fields.
pub mod pipeline;

/// Rule assembly and replay.
pub mod rules;

// Public API - re-exports
pub use error::{Error, Result};
pub use identity::{merge, Identity};
pub use index::{node_descriptor, TreeIndex};
pub use links::find_link;
pub use locate::{locate, Target};
pub use pipeline::{FieldValue, Pipeline, PipelineFn, Processor};
pub use rules::{ExtractRule, Extractor, FieldRule, FieldSpec, Record, Rules};
