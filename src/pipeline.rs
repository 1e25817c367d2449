//! Post-processors applied to a field's selected elements during replay.
//!
//! Built-ins form a closed enum so rules stay portable; callers needing
//! anything else plug a function with the fixed
//! selected-elements-to-value signature into the extractor instead.

use dom_query::Selection;
use serde::{Deserialize, Serialize};

/// A caller-supplied post-processor over a field's selected elements.
pub type PipelineFn = fn(&Selection) -> FieldValue;

/// The built-in post-processors.
///
/// Serialized under the lowercase names `"text"`, `"tags"` and `"link"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Pipeline {
    /// Join the trimmed text of every selected element with single spaces.
    Text,
    /// The trimmed text of each selected element, as a list.
    Tags,
    /// The `href` of the first selected element that carries one.
    Link,
}

/// What a field registration may attach: a built-in pipeline or a custom
/// function.
#[derive(Debug, Clone, Copy)]
pub enum Processor {
    /// One of the built-in post-processors.
    Builtin(Pipeline),
    /// A caller-supplied function; not serializable, reattached by name when
    /// a rule is loaded from JSON.
    Custom(PipelineFn),
}

impl From<Pipeline> for Processor {
    fn from(pipeline: Pipeline) -> Self {
        Self::Builtin(pipeline)
    }
}

/// One field's extracted value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// The pipeline produced nothing (no elements, or no link present).
    None,
    /// Joined text from the text pipeline, or a custom processor's string.
    Text(String),
    /// Per-element text list from the tags pipeline.
    Tags(Vec<String>),
    /// An href value from the link pipeline.
    Link(String),
    /// Outer HTML of each selected element, for fields without a pipeline.
    Elements(Vec<String>),
}

impl FieldValue {
    /// Whether the pipeline produced nothing.
    #[must_use]
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// Run a built-in pipeline over the selected elements.
#[must_use]
pub fn apply(pipeline: Pipeline, elements: &Selection) -> FieldValue {
    match pipeline {
        Pipeline::Text => text(elements).map_or(FieldValue::None, FieldValue::Text),
        Pipeline::Tags => FieldValue::Tags(tags(elements)),
        Pipeline::Link => link(elements).map_or(FieldValue::None, FieldValue::Link),
    }
}

/// Trimmed text of every element, space-joined; `None` when nothing matched.
#[must_use]
pub fn text(elements: &Selection) -> Option<String> {
    let mut joined: Option<String> = None;
    for node in elements.nodes() {
        let content = node.text();
        let trimmed = content.trim();
        match joined.as_mut() {
            Some(acc) => {
                acc.push(' ');
                acc.push_str(trimmed);
            }
            None => joined = Some(trimmed.to_string()),
        }
    }
    joined
}

/// Trimmed text of each element as a list.
#[must_use]
pub fn tags(elements: &Selection) -> Vec<String> {
    elements
        .nodes()
        .iter()
        .map(|node| node.text().trim().to_string())
        .collect()
}

/// The `href` of the first selected element that carries one itself.
#[must_use]
pub fn link(elements: &Selection) -> Option<String> {
    elements
        .nodes()
        .iter()
        .find_map(|node| node.attr("href").map(|href| href.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom;

    #[test]
    fn test_text_joins_trimmed_elements() {
        let doc = dom::parse("<ul><li> first </li><li>second</li></ul>");
        let items = doc.select("li");

        assert_eq!(text(&items), Some("first second".to_string()));
        assert_eq!(
            apply(Pipeline::Text, &items),
            FieldValue::Text("first second".to_string())
        );
    }

    #[test]
    fn test_text_of_empty_selection_is_none() {
        let doc = dom::parse("<div>x</div>");
        let missing = doc.select("li");

        assert_eq!(text(&missing), None);
        assert!(apply(Pipeline::Text, &missing).is_none());
    }

    #[test]
    fn test_tags_lists_each_element() {
        let doc = dom::parse(r#"<div><a class="tag">rust</a><a class="tag">html</a></div>"#);
        let anchors = doc.select("a.tag");

        assert_eq!(tags(&anchors), vec!["rust".to_string(), "html".to_string()]);
    }

    #[test]
    fn test_link_takes_first_own_href() {
        let doc = dom::parse(
            r#"<div><span class="x">no href</span><a class="x" href="/one">1</a><a class="x" href="/two">2</a></div>"#,
        );
        let elements = doc.select(".x");

        assert_eq!(link(&elements), Some("/one".to_string()));
        assert_eq!(
            apply(Pipeline::Link, &elements),
            FieldValue::Link("/one".to_string())
        );
    }

    #[test]
    fn test_link_ignores_descendant_hrefs() {
        // Unlike the link fallback, the pipeline only looks at the selected
        // elements themselves.
        let doc = dom::parse(r#"<div class="wrap"><a href="/inner">x</a></div>"#);
        let wrap = doc.select("div.wrap");

        assert_eq!(link(&wrap), None);
        assert!(apply(Pipeline::Link, &wrap).is_none());
    }

    #[test]
    fn test_pipeline_serde_names_are_lowercase() {
        assert_eq!(serde_json::to_string(&Pipeline::Text).unwrap(), r#""text""#);
        assert_eq!(serde_json::to_string(&Pipeline::Tags).unwrap(), r#""tags""#);
        assert_eq!(serde_json::to_string(&Pipeline::Link).unwrap(), r#""link""#);
        let parsed: Pipeline = serde_json::from_str(r#""tags""#).unwrap();
        assert_eq!(parsed, Pipeline::Tags);
    }

    #[test]
    fn test_custom_processor_signature() {
        fn shout(elements: &Selection) -> FieldValue {
            FieldValue::Text(elements.text().trim().to_uppercase())
        }
        let processor = Processor::Custom(shout);
        let doc = dom::parse("<p>quiet</p>");

        match processor {
            Processor::Custom(f) => assert_eq!(
                f(&doc.select("p")),
                FieldValue::Text("QUIET".to_string())
            ),
            Processor::Builtin(_) => panic!("expected custom"),
        }
    }

    #[test]
    fn test_field_value_serializes_untagged() {
        assert_eq!(serde_json::to_string(&FieldValue::None).unwrap(), "null");
        assert_eq!(
            serde_json::to_string(&FieldValue::Text("x".into())).unwrap(),
            r#""x""#
        );
        assert_eq!(
            serde_json::to_string(&FieldValue::Tags(vec!["a".into()])).unwrap(),
            r#"["a"]"#
        );
    }
}
