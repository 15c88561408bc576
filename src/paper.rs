use serde_json::Value;

/// Placeholder used for a missing or falsy `title`.
pub const TITLE_PLACEHOLDER: &str = "Untitled Research Paper";
/// Placeholder used for a missing or falsy `abstract`.
pub const ABSTRACT_PLACEHOLDER: &str = "No abstract provided.";
/// Placeholder used for a missing or falsy `introduction`.
pub const INTRODUCTION_PLACEHOLDER: &str = "No introduction provided.";
/// Placeholder used for a missing or falsy `data`.
pub const DATA_PLACEHOLDER: &str = "No data provided.";
/// Placeholder used for a missing or falsy `analysis`.
pub const ANALYSIS_PLACEHOLDER: &str = "No analysis provided.";
/// Generic placeholder for any other absent/falsy value.
pub const CONTENT_PLACEHOLDER: &str = "No content provided.";

/// A section value classified once at normalization time.
///
/// Rendering and export dispatch on this closed set instead of inspecting raw
/// JSON shapes at use sites.
#[derive(Clone, Debug, PartialEq)]
pub enum SectionContent {
    /// Absent or falsy source value (`null`, `""`, `false`, `0`).
    Empty,
    /// Plain or markdown text.
    Text(String),
    /// Ordered sequence; items are classified recursively.
    List(Vec<SectionContent>),
    /// Arbitrary structured (non-sequence) object.
    Structured(serde_json::Map<String, Value>),
}

impl SectionContent {
    /// Classifies a freshly parsed JSON value.
    ///
    /// Truthy scalars become `Text`, arrays recurse, objects stay structured.
    pub fn classify(value: Value) -> Self {
        match value {
            Value::Null | Value::Bool(false) => Self::Empty,
            Value::Bool(true) => Self::Text("true".to_string()),
            Value::String(s) if s.is_empty() => Self::Empty,
            Value::String(s) => Self::Text(s),
            Value::Number(n) if n.as_f64() == Some(0.0) => Self::Empty,
            Value::Number(n) => Self::Text(n.to_string()),
            Value::Array(items) => Self::List(items.into_iter().map(Self::classify).collect()),
            Value::Object(map) => Self::Structured(map),
        }
    }

    /// Converts back to a JSON value, for generic stringification.
    ///
    /// `Empty` maps to `null`; the original falsy scalar is not recoverable.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Empty => Value::Null,
            Self::Text(s) => Value::String(s.clone()),
            Self::List(items) => Value::Array(items.iter().map(Self::to_value).collect()),
            Self::Structured(map) => Value::Object(map.clone()),
        }
    }

    /// Returns the text content when this section classified as plain text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Normalized generation result.
///
/// Created exactly once per successful submission from the terminal `final`
/// payload and immutable afterwards; it is the sole value driving rendering
/// and export.
#[derive(Clone, Debug, PartialEq)]
pub struct ResearchPaper {
    /// Paper title, `Untitled Research Paper` when missing.
    pub title: SectionContent,
    /// Abstract section.
    pub abstract_text: SectionContent,
    /// Introduction section.
    pub introduction: SectionContent,
    /// Data section.
    pub data: SectionContent,
    /// Analysis section.
    pub analysis: SectionContent,
    /// References; empty unless the source field was literally an array.
    pub references: Vec<SectionContent>,
    /// Fields outside the known schema, preserved in payload key order.
    pub extra: Vec<(String, SectionContent)>,
}

impl ResearchPaper {
    /// Maps an arbitrary-shaped `final` payload onto the fixed schema.
    ///
    /// Known fields present and truthy are kept (classified); otherwise they
    /// become their placeholder. Unknown fields pass through unchanged. This
    /// never fails: a non-object payload degrades to all placeholders.
    pub fn normalize(payload: Value) -> Self {
        let mut map = match payload {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };

        // shift_remove, not remove: with `preserve_order` a plain remove is a
        // swap-remove and would scramble the passthrough key order.
        let references = match map.shift_remove("references") {
            Some(Value::Array(items)) => {
                items.into_iter().map(SectionContent::classify).collect()
            }
            _ => Vec::new(),
        };

        let mut known = |key: &str, placeholder: &str| match map.shift_remove(key) {
            Some(value) => match SectionContent::classify(value) {
                SectionContent::Empty => SectionContent::Text(placeholder.to_string()),
                content => content,
            },
            None => SectionContent::Text(placeholder.to_string()),
        };

        let title = known("title", TITLE_PLACEHOLDER);
        let abstract_text = known("abstract", ABSTRACT_PLACEHOLDER);
        let introduction = known("introduction", INTRODUCTION_PLACEHOLDER);
        let data = known("data", DATA_PLACEHOLDER);
        let analysis = known("analysis", ANALYSIS_PLACEHOLDER);

        let extra = map
            .into_iter()
            .map(|(key, value)| (key, SectionContent::classify(value)))
            .collect();

        Self {
            title,
            abstract_text,
            introduction,
            data,
            analysis,
            references,
            extra,
        }
    }

    /// Returns the title as plain text when it classified as text.
    pub fn title_text(&self) -> Option<&str> {
        self.title.as_text()
    }
}

/// Display label for a passthrough field: first character upper-cased.
pub fn label_for(key: &str) -> String {
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalize_fills_placeholders_for_missing_and_falsy_fields() {
        let paper = ResearchPaper::normalize(json!({
            "title": "GDP Study",
            "abstract": "",
            "references": ["a", "b"],
        }));
        assert_eq!(paper.title, SectionContent::Text("GDP Study".into()));
        assert_eq!(
            paper.abstract_text,
            SectionContent::Text(ABSTRACT_PLACEHOLDER.into())
        );
        assert_eq!(
            paper.introduction,
            SectionContent::Text(INTRODUCTION_PLACEHOLDER.into())
        );
        assert_eq!(paper.data, SectionContent::Text(DATA_PLACEHOLDER.into()));
        assert_eq!(
            paper.analysis,
            SectionContent::Text(ANALYSIS_PLACEHOLDER.into())
        );
        assert_eq!(
            paper.references,
            vec![
                SectionContent::Text("a".into()),
                SectionContent::Text("b".into())
            ]
        );
        assert!(paper.extra.is_empty());
    }

    #[test]
    fn normalize_turns_non_array_references_into_empty_list() {
        let paper = ResearchPaper::normalize(json!({"references": "not-a-list"}));
        assert!(paper.references.is_empty());
    }

    #[test]
    fn normalize_preserves_unknown_fields_in_payload_order() {
        let paper = ResearchPaper::normalize(json!({
            "title": "T",
            "methodology": "Survey",
            "appendix": {"tables": 3},
        }));
        let keys: Vec<&str> = paper.extra.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["methodology", "appendix"]);
        assert_eq!(
            paper.extra[0].1,
            SectionContent::Text("Survey".into())
        );
        assert!(matches!(paper.extra[1].1, SectionContent::Structured(_)));
    }

    #[test]
    fn extras_keep_payload_order_after_known_fields_are_removed() {
        // A swap-remove of "title" would move the trailing key into its slot
        // and flip the order of the remaining passthrough fields.
        let paper = ResearchPaper::normalize(json!({
            "title": "T",
            "zeta": "last letter",
            "alpha": "first letter",
        }));
        let keys: Vec<&str> = paper.extra.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }

    #[test]
    fn normalize_keeps_structured_known_fields() {
        let paper = ResearchPaper::normalize(json!({
            "data": {"gdp": [1, 2, 3]},
            "analysis": ["point one", "point two"],
        }));
        assert!(matches!(paper.data, SectionContent::Structured(_)));
        assert!(matches!(&paper.analysis, SectionContent::List(items) if items.len() == 2));
    }

    #[test]
    fn normalize_degrades_non_object_payload_to_placeholders() {
        let paper = ResearchPaper::normalize(json!("just a string"));
        assert_eq!(paper.title_text(), Some(TITLE_PLACEHOLDER));
        assert!(paper.references.is_empty());
        assert!(paper.extra.is_empty());
    }

    #[test]
    fn classify_treats_falsy_scalars_as_empty() {
        for value in [json!(null), json!(""), json!(false), json!(0), json!(0.0)] {
            assert_eq!(SectionContent::classify(value), SectionContent::Empty);
        }
        assert_eq!(
            SectionContent::classify(json!(5)),
            SectionContent::Text("5".into())
        );
        assert_eq!(
            SectionContent::classify(json!(true)),
            SectionContent::Text("true".into())
        );
    }

    #[test]
    fn label_for_capitalizes_first_character() {
        assert_eq!(label_for("methodology"), "Methodology");
        assert_eq!(label_for("x"), "X");
        assert_eq!(label_for(""), "");
    }
}
