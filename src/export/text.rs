use std::path::{Path, PathBuf};

use tracing::debug;

use crate::paper::{ResearchPaper, SectionContent};

use super::{ExportError, export_file_name, format_section, ordered_sections};

const TEXT_HEADER: &str = "Research Paper Outline";

/// Renders the flat text document for a normalized paper.
///
/// Layout: a fixed header, then `"Label:\n<content>\n\n"` blocks in export
/// order, then references last when non-empty.
pub fn render_text(paper: &ResearchPaper) -> String {
    let mut out = String::from(TEXT_HEADER);
    out.push_str("\n\n");
    for (label, content) in ordered_sections(paper) {
        out.push_str(&label);
        out.push_str(":\n");
        out.push_str(&format_section(&content));
        out.push_str("\n\n");
    }
    if !paper.references.is_empty() {
        out.push_str("References:\n");
        out.push_str(&format_section(&SectionContent::List(
            paper.references.clone(),
        )));
        out.push('\n');
    }
    out
}

/// Writes the flat text export as `<title>.txt` under `dir`.
pub fn export_text(paper: &ResearchPaper, dir: &Path) -> Result<PathBuf, ExportError> {
    let path = dir.join(export_file_name(paper, "txt"));
    std::fs::write(&path, render_text(paper))?;
    debug!(path = %path.display(), "wrote text export");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_export_matches_expected_layout_for_gdp_example() {
        let paper = ResearchPaper::normalize(json!({
            "title": "GDP Study",
            "abstract": "",
            "references": ["a", "b"],
        }));
        let text = render_text(&paper);
        assert!(text.starts_with("Research Paper Outline\n\nTitle:\nGDP Study\n\n"));
        assert!(text.contains("Abstract:\nNo abstract provided.\n\n"));
        assert!(text.contains("Introduction:\nNo introduction provided.\n\n"));
        assert!(text.contains("Data:\nNo data provided.\n\n"));
        assert!(text.contains("Analysis:\nNo analysis provided.\n\n"));
        assert!(text.ends_with("References:\n1. a\n2. b\n"));
    }

    #[test]
    fn references_block_is_omitted_when_empty() {
        let paper = ResearchPaper::normalize(json!({"title": "T"}));
        let text = render_text(&paper);
        assert!(!text.contains("References:"));
    }

    #[test]
    fn extras_appear_between_known_fields_and_references() {
        let paper = ResearchPaper::normalize(json!({
            "title": "T",
            "methodology": "Survey",
            "references": ["r"],
        }));
        let text = render_text(&paper);
        let analysis = text.find("Analysis:").expect("analysis block");
        let methodology = text.find("Methodology:\nSurvey\n").expect("extra block");
        let references = text.find("References:").expect("references block");
        assert!(analysis < methodology && methodology < references);
    }

    #[test]
    fn export_text_writes_file_named_after_title() {
        let dir = tempfile::tempdir().expect("tempdir");
        let paper = ResearchPaper::normalize(json!({"title": "GDP Study"}));
        let path = export_text(&paper, dir.path()).expect("export");
        assert_eq!(path.file_name().and_then(|n| n.to_str()), Some("GDP Study.txt"));
        let written = std::fs::read_to_string(&path).expect("read back");
        assert!(written.starts_with("Research Paper Outline"));
    }
}
