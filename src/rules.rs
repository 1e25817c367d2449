//! Rule assembly and replay.
//!
//! [`Rules`] owns a reference document and its positional index; each field
//! registration locates an element by example text and folds its identity
//! into a running shared parent. [`Rules::compile`] turns the registrations
//! into an [`ExtractRule`] - a portable parent selector plus parent-relative
//! field selectors - and [`Extractor`] replays that rule against other,
//! structurally-similar pages.

use std::collections::HashMap;
use std::path::Path;

use dom_query::{Document, Selection};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use url::Url;

use crate::dom;
use crate::encoding;
use crate::error::{Error, Result};
use crate::identity::{self, Identity};
use crate::index::TreeIndex;
use crate::links;
use crate::locate::{locate, Target};
use crate::pipeline::{self, FieldValue, Pipeline, PipelineFn, Processor};

/// Per-registration options for [`Rules::add_field_with`].
///
/// Plain public fields; use struct-update syntax over `Default` to set the
/// ones you need.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// Treat the target as a regular expression instead of a substring.
    pub regex: bool,
    /// Climb this many ancestor levels from the located element.
    pub climb: usize,
    /// Locate the nth occurrence of the target (1-based; below 1 is
    /// treated as 1).
    pub occurrence: usize,
    /// Post-processor applied to the field's elements during replay.
    pub processor: Option<Processor>,
}

impl Default for FieldSpec {
    fn default() -> Self {
        Self {
            regex: false,
            climb: 0,
            occurrence: 1,
            processor: None,
        }
    }
}

struct Field {
    name: String,
    identity: Identity,
    processor: Option<Processor>,
}

/// Builds extraction rules against a reference document.
///
/// The positional index is built once at construction and never mutated;
/// registrations only read it.
pub struct Rules {
    reference: Document,
    index: TreeIndex,
    fields: Vec<Field>,
    parent: Option<Identity>,
}

impl Rules {
    /// Build rules against an HTML string.
    #[must_use]
    pub fn from_html(html: &str) -> Self {
        Self::from_document(Document::from(html))
    }

    /// Build rules against an already-parsed document.
    #[must_use]
    pub fn from_document(reference: Document) -> Self {
        let index = {
            let scope = dom::body(&reference);
            scope
                .nodes()
                .first()
                .map_or_else(TreeIndex::default, TreeIndex::build)
        };
        Self {
            reference,
            index,
            fields: Vec::new(),
            parent: None,
        }
    }

    /// Build rules against a local HTML file, transcoding to UTF-8 from the
    /// charset the file declares.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let html = encoding::transcode_to_utf8(&bytes);
        Ok(Self::from_html(&html))
    }

    /// Register a field located by example text, with default options.
    pub fn add_field(&mut self, name: impl Into<String>, target: &str) -> Result<()> {
        self.add_field_with(name, target, &FieldSpec::default())
    }

    /// Register a field located by example text.
    ///
    /// Locates the requested occurrence of `target` in the reference
    /// document, climbs the requested number of ancestor levels, folds the
    /// resulting identity into the running shared parent and appends the
    /// field in insertion order (which is also the output column order).
    pub fn add_field_with(
        &mut self,
        name: impl Into<String>,
        target: &str,
        spec: &FieldSpec,
    ) -> Result<()> {
        let needle = if spec.regex {
            Target::pattern(target)?
        } else {
            Target::substring(target)
        };

        let identity = {
            let scope = dom::body(&self.reference);
            match scope.nodes().first() {
                Some(root) => locate(root, &needle, spec.occurrence)?,
                None => {
                    return Err(Error::StringNotFound {
                        target: needle.to_string(),
                        occurrence: spec.occurrence.max(1),
                    })
                }
            }
        };
        let identity = identity.climb(spec.climb)?;

        self.parent = Some(identity::merge(self.parent.as_ref(), &identity));
        self.fields.push(Field {
            name: name.into(),
            identity,
            processor: spec.processor,
        });
        Ok(())
    }

    /// The running shared-parent identity over all registrations so far.
    #[must_use]
    pub fn parent_identity(&self) -> Option<&Identity> {
        self.parent.as_ref()
    }

    /// Selector of the lowest element containing every registered field.
    ///
    /// Empty before any registration, and when registered fields diverge at
    /// the root.
    pub fn parent_selector(&self) -> Result<String> {
        match &self.parent {
            Some(parent) => self.index.resolve(parent),
            None => Ok(String::new()),
        }
    }

    /// The located identity of a registered field.
    #[must_use]
    pub fn field_identity(&self, name: &str) -> Option<&Identity> {
        self.fields
            .iter()
            .find(|field| field.name == name)
            .map(|field| &field.identity)
    }

    /// The positional index of the reference document.
    #[must_use]
    pub fn index(&self) -> &TreeIndex {
        &self.index
    }

    /// The parsed reference document.
    #[must_use]
    pub fn reference(&self) -> &Document {
        &self.reference
    }

    /// Run the hyperlink fallback for a registered field against the
    /// reference document. `Ok(None)` for an unknown field name.
    pub fn find_link_near(&self, name: &str) -> Result<Option<String>> {
        let Some(field) = self.fields.iter().find(|field| field.name == name) else {
            return Ok(None);
        };
        let scope = dom::body(&self.reference);
        links::find_link(&scope, &field.identity, &self.index)
    }

    /// Compile the registrations into a portable extraction rule.
    ///
    /// Field selectors are relative to the parent selector; the field whose
    /// identity *is* the shared parent gets the empty selector, meaning the
    /// parent element itself.
    pub fn compile(&self) -> Result<ExtractRule> {
        let parent = self.parent_selector()?;
        let mut fields = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            let full = self.index.resolve(&field.identity)?;
            let selector = if parent.is_empty() {
                full
            } else {
                match full.strip_prefix(parent.as_str()) {
                    Some(rest) => rest.trim_start().to_string(),
                    None => full,
                }
            };
            let builtin = match field.processor {
                Some(Processor::Builtin(pipeline)) => Some(pipeline),
                Some(Processor::Custom(_)) | None => None,
            };
            fields.push(FieldRule {
                name: field.name.clone(),
                selector,
                pipeline: builtin,
            });
        }
        Ok(ExtractRule { parent, fields })
    }
}

/// One field of a portable extraction rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldRule {
    /// Field name, also the output column name.
    pub name: String,
    /// Selector relative to the rule's parent selector; empty selects the
    /// parent element itself.
    pub selector: String,
    /// Built-in post-processor, if any. Custom processors are reattached on
    /// the extractor by name.
    pub pipeline: Option<Pipeline>,
}

/// A portable extraction rule: parent selector plus ordered field rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractRule {
    /// Selector of the repeating parent element; empty means the whole
    /// body scope is the single parent.
    pub parent: String,
    /// Field rules in registration order.
    pub fields: Vec<FieldRule>,
}

impl ExtractRule {
    /// Serialize the rule as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize a rule from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// One extracted item: field values in registration order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>,
}

impl Record {
    /// The value of a field by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    /// All field name/value pairs, in registration order.
    #[must_use]
    pub fn fields(&self) -> &[(String, FieldValue)] {
        &self.fields
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (name, value) in &self.fields {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Replays an [`ExtractRule`] against documents.
pub struct Extractor {
    rule: ExtractRule,
    custom: HashMap<String, PipelineFn>,
    base_url: Option<Url>,
}

impl Extractor {
    /// An extractor for a compiled or deserialized rule.
    #[must_use]
    pub fn new(rule: ExtractRule) -> Self {
        Self {
            rule,
            custom: HashMap::new(),
            base_url: None,
        }
    }

    /// Compile `rules` and carry over any custom processors registered on
    /// its fields.
    pub fn from_rules(rules: &Rules) -> Result<Self> {
        let mut extractor = Self::new(rules.compile()?);
        for field in &rules.fields {
            if let Some(Processor::Custom(function)) = field.processor {
                extractor.custom.insert(field.name.clone(), function);
            }
        }
        Ok(extractor)
    }

    /// Attach a custom processor to a field by name, overriding any
    /// built-in pipeline the rule names for it.
    #[must_use]
    pub fn with_processor(mut self, field: impl Into<String>, processor: PipelineFn) -> Self {
        self.custom.insert(field.into(), processor);
        self
    }

    /// Resolve relative hrefs produced by the link pipeline against `base`.
    #[must_use]
    pub fn with_base_url(mut self, base: Url) -> Self {
        self.base_url = Some(base);
        self
    }

    /// The rule this extractor replays.
    #[must_use]
    pub fn rule(&self) -> &ExtractRule {
        &self.rule
    }

    /// The parent elements the rule matches on `page`, in document order.
    ///
    /// Fails with [`Error::NoParentMatch`] when the page has none.
    pub fn parents<'a>(&self, page: &'a Document) -> Result<Vec<Selection<'a>>> {
        let scope = dom::body(page);
        let parents: Vec<Selection> = if self.rule.parent.is_empty() {
            vec![scope]
        } else {
            scope
                .select(&self.rule.parent)
                .nodes()
                .iter()
                .map(|node| Selection::from(*node))
                .collect()
        };
        if parents.is_empty() {
            return Err(Error::NoParentMatch);
        }
        Ok(parents)
    }

    /// Extract one record per parent element matched on `page`.
    pub fn extract(&self, page: &Document) -> Result<Vec<Record>> {
        let parents = self.parents(page)?;
        let mut records = Vec::with_capacity(parents.len());
        for parent in &parents {
            let mut fields = Vec::with_capacity(self.rule.fields.len());
            for field in &self.rule.fields {
                let elements = if field.selector.is_empty() {
                    parent.clone()
                } else {
                    parent.select(&field.selector)
                };
                let value = self.field_value(field, &elements);
                fields.push((field.name.clone(), value));
            }
            records.push(Record { fields });
        }
        Ok(records)
    }

    /// Parse an HTML string and extract from it.
    pub fn extract_html(&self, html: &str) -> Result<Vec<Record>> {
        self.extract(&Document::from(html))
    }

    /// Load a local HTML file (charset-aware) and extract from it.
    pub fn extract_file(&self, path: impl AsRef<Path>) -> Result<Vec<Record>> {
        let bytes = std::fs::read(path)?;
        let html = encoding::transcode_to_utf8(&bytes);
        self.extract_html(&html)
    }

    fn field_value(&self, field: &FieldRule, elements: &Selection) -> FieldValue {
        let value = if let Some(custom) = self.custom.get(&field.name) {
            custom(elements)
        } else {
            match field.pipeline {
                Some(pipeline) => pipeline::apply(pipeline, elements),
                None => FieldValue::Elements(
                    elements
                        .nodes()
                        .iter()
                        .map(|node| Selection::from(*node).html().to_string())
                        .collect(),
                ),
            }
        };
        match (&self.base_url, value) {
            (Some(base), FieldValue::Link(href)) => {
                FieldValue::Link(links::absolutize(base, &href))
            }
            (_, value) => value,
        }
    }
}
