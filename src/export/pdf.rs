use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference, PdfLayerReference};
use tracing::debug;

use crate::paper::{ResearchPaper, SectionContent};

use super::{ExportError, export_file_name, format_section, ordered_sections};

// A4 portrait geometry in millimetres, matching the layout the service's web
// client used: 15mm margins, 7mm baselines, page break past 260mm.
const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const LEFT_MARGIN: f32 = 15.0;
const FIRST_BASELINE: f32 = 20.0;
const LINE_HEIGHT: f32 = 7.0;
const PAGE_BREAK_Y: f32 = 260.0;
const SECTION_GAP: f32 = 5.0;
const HEADING_PT: f32 = 14.0;
const BODY_PT: f32 = 12.0;
const WRAP_COLUMNS: usize = 90;
const LAYER_NAME: &str = "Layer 1";

struct PageCursor<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    y: f32,
}

impl PageCursor<'_> {
    fn line(&mut self, text: &str, size: f32, font: &IndirectFontRef) {
        if self.y > PAGE_BREAK_Y {
            let (page, layer) = self
                .doc
                .add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
            self.layer = self.doc.get_page(page).get_layer(layer);
            self.y = FIRST_BASELINE;
        }
        self.layer.use_text(
            text,
            size,
            Mm(LEFT_MARGIN),
            Mm(PAGE_HEIGHT - self.y),
            font,
        );
        self.y += LINE_HEIGHT;
    }
}

/// Writes the paginated PDF export as `<title>.pdf` under `dir`.
///
/// Sections follow the shared export order; each is a bold heading followed
/// by wrapped body lines, breaking to a new page past the height threshold.
pub fn export_pdf(paper: &ResearchPaper, dir: &Path) -> Result<PathBuf, ExportError> {
    let doc_title = paper.title_text().unwrap_or(super::FALLBACK_FILE_STEM);
    let (doc, page, layer) =
        PdfDocument::new(doc_title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), LAYER_NAME);
    let body_font = doc
        .add_builtin_font(BuiltinFont::Helvetica)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    let heading_font = doc
        .add_builtin_font(BuiltinFont::HelveticaBold)
        .map_err(|e| ExportError::Pdf(e.to_string()))?;

    let mut cursor = PageCursor {
        doc: &doc,
        layer: doc.get_page(page).get_layer(layer),
        y: FIRST_BASELINE,
    };

    for (label, content) in ordered_sections(paper) {
        add_section(&mut cursor, &heading_font, &body_font, &label, &content);
    }
    if !paper.references.is_empty() {
        add_section(
            &mut cursor,
            &heading_font,
            &body_font,
            "References",
            &SectionContent::List(paper.references.clone()),
        );
    }

    let path = dir.join(export_file_name(paper, "pdf"));
    let file = File::create(&path)?;
    doc.save(&mut BufWriter::new(file))
        .map_err(|e| ExportError::Pdf(e.to_string()))?;
    debug!(path = %path.display(), "wrote pdf export");
    Ok(path)
}

fn add_section(
    cursor: &mut PageCursor<'_>,
    heading_font: &IndirectFontRef,
    body_font: &IndirectFontRef,
    label: &str,
    content: &SectionContent,
) {
    cursor.line(label, HEADING_PT, heading_font);
    for raw_line in format_section(content).lines() {
        for line in wrap_line(raw_line, WRAP_COLUMNS) {
            cursor.line(&line, BODY_PT, body_font);
        }
    }
    cursor.y += SECTION_GAP;
}

/// Greedy word wrap at a fixed column width; words longer than the width are
/// hard-split.
fn wrap_line(line: &str, columns: usize) -> Vec<String> {
    if line.chars().count() <= columns {
        return vec![line.to_string()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;
    for word in line.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > columns {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if word_len > columns {
            let mut chars = word.chars().peekable();
            while chars.peek().is_some() {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let piece: String = chars.by_ref().take(columns).collect();
                current_len = piece.chars().count();
                current = piece;
            }
            continue;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    if !current.is_empty() {
        lines.push(current);
    }
    if lines.is_empty() {
        lines.push(String::new());
    }
    lines
}
