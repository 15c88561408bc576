//! Exporters for a normalized paper: paginated PDF and flat text.
//!
//! Both walk the same field order: the five known sections, passthrough
//! fields in key order, then references last when non-empty.

mod pdf;
mod text;

pub use pdf::export_pdf;
pub use text::{export_text, render_text};

use crate::markdown;
use crate::paper::{CONTENT_PLACEHOLDER, ResearchPaper, SectionContent, label_for};

/// Errors raised while producing an export file.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Filesystem write failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// PDF document assembly failed.
    #[error("pdf rendering failed: {0}")]
    Pdf(String),
}

/// Fallback file stem when the title did not classify as text.
pub(crate) const FALLBACK_FILE_STEM: &str = "research_paper";

/// Known sections in their fixed export order, then passthrough fields in
/// payload key order. References are appended separately because they carry
/// their own non-empty gate.
pub(crate) fn ordered_sections(paper: &ResearchPaper) -> Vec<(String, SectionContent)> {
    let mut sections = vec![
        ("Title".to_string(), paper.title.clone()),
        ("Abstract".to_string(), paper.abstract_text.clone()),
        ("Introduction".to_string(), paper.introduction.clone()),
        ("Data".to_string(), paper.data.clone()),
        ("Analysis".to_string(), paper.analysis.clone()),
    ];
    for (key, content) in &paper.extra {
        sections.push((label_for(key), content.clone()));
    }
    sections
}

/// Formats one section value as flat text.
///
/// Strings go through the markup collaborator, sequences become numbered
/// lines, objects become 2-space-indented JSON.
pub(crate) fn format_section(content: &SectionContent) -> String {
    match content {
        SectionContent::Empty => CONTENT_PLACEHOLDER.to_string(),
        SectionContent::Text(text) => markdown::to_plain_text(text),
        SectionContent::List(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}. {}", i + 1, list_item_text(item)))
            .collect::<Vec<_>>()
            .join("\n"),
        SectionContent::Structured(map) => {
            serde_json::to_string_pretty(&serde_json::Value::Object(map.clone()))
                .unwrap_or_default()
        }
    }
}

fn list_item_text(item: &SectionContent) -> String {
    match item {
        SectionContent::Text(text) => text.clone(),
        other => serde_json::to_string(&other.to_value()).unwrap_or_default(),
    }
}

/// File name for an export: the title when it is plain text, else the fixed
/// fallback stem. Path separators are replaced so the name stays a single
/// path component.
pub(crate) fn export_file_name(paper: &ResearchPaper, extension: &str) -> String {
    let stem = paper
        .title_text()
        .filter(|t| !t.trim().is_empty())
        .map(|t| t.replace(['/', '\\'], "_"))
        .unwrap_or_else(|| FALLBACK_FILE_STEM.to_string());
    format!("{stem}.{extension}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paper_with_extras() -> ResearchPaper {
        ResearchPaper::normalize(json!({
            "title": "GDP Study",
            "abstract": "A short abstract",
            "introduction": "Intro",
            "data": "Numbers",
            "analysis": "Findings",
            "methodology": "Survey",
            "appendix": {"tables": 3},
            "references": ["a", "b"],
        }))
    }

    #[test]
    fn sections_keep_known_order_then_extras_in_key_order() {
        let labels: Vec<String> = ordered_sections(&paper_with_extras())
            .into_iter()
            .map(|(label, _)| label)
            .collect();
        assert_eq!(
            labels,
            vec![
                "Title",
                "Abstract",
                "Introduction",
                "Data",
                "Analysis",
                "Methodology",
                "Appendix",
            ]
        );
    }

    #[test]
    fn format_section_numbers_sequence_items() {
        let content = SectionContent::classify(json!(["a", {"k": 1}]));
        assert_eq!(format_section(&content), "1. a\n2. {\"k\":1}");
    }

    #[test]
    fn format_section_pretty_prints_objects() {
        let content = SectionContent::classify(json!({"tables": 3}));
        assert_eq!(format_section(&content), "{\n  \"tables\": 3\n}");
    }

    #[test]
    fn format_section_uses_placeholder_for_empty() {
        assert_eq!(format_section(&SectionContent::Empty), CONTENT_PLACEHOLDER);
    }

    #[test]
    fn file_name_uses_title_or_fallback() {
        assert_eq!(export_file_name(&paper_with_extras(), "pdf"), "GDP Study.pdf");
        let untitled = ResearchPaper::normalize(json!({"title": {"odd": true}}));
        assert_eq!(export_file_name(&untitled, "txt"), "research_paper.txt");
    }
}
