use serde_json::Value;

use crate::markdown;
use crate::paper::{CONTENT_PLACEHOLDER, SectionContent};

/// Display representation of one section value.
///
/// Produced by a pure function over `SectionContent`; recursion is bounded by
/// the JSON nesting of the source payload.
#[derive(Clone, Debug, PartialEq)]
pub enum DisplayNode {
    /// A run of plain text (markup already expanded).
    Paragraph(String),
    /// An ordered list; items are rendered recursively.
    OrderedList(Vec<DisplayNode>),
    /// A pretty-printed structured block.
    Structured(String),
}

/// Renders one classified section value to its display tree.
pub fn render_section(content: &SectionContent) -> DisplayNode {
    match content {
        SectionContent::Empty => DisplayNode::Paragraph(CONTENT_PLACEHOLDER.to_string()),
        SectionContent::Text(text) => DisplayNode::Paragraph(markdown::to_plain_text(text)),
        SectionContent::List(items) => {
            DisplayNode::OrderedList(items.iter().map(render_section).collect())
        }
        SectionContent::Structured(map) => DisplayNode::Structured(
            serde_json::to_string_pretty(&Value::Object(map.clone())).unwrap_or_default(),
        ),
    }
}

/// Flattens a display tree into indented terminal text.
pub fn write_display(node: &DisplayNode, out: &mut String, depth: usize) {
    let indent = "  ".repeat(depth);
    match node {
        DisplayNode::Paragraph(text) | DisplayNode::Structured(text) => {
            for line in text.lines() {
                out.push_str(&indent);
                out.push_str(line);
                out.push('\n');
            }
            if text.is_empty() {
                out.push('\n');
            }
        }
        DisplayNode::OrderedList(items) => {
            for (i, item) in items.iter().enumerate() {
                match item {
                    DisplayNode::Paragraph(text) if !text.contains('\n') => {
                        out.push_str(&indent);
                        out.push_str(&format!("{}. {}\n", i + 1, text));
                    }
                    nested => {
                        out.push_str(&indent);
                        out.push_str(&format!("{}.\n", i + 1));
                        write_display(nested, out, depth + 1);
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_renders_placeholder_paragraph() {
        assert_eq!(
            render_section(&SectionContent::Empty),
            DisplayNode::Paragraph(CONTENT_PLACEHOLDER.into())
        );
    }

    #[test]
    fn text_is_expanded_from_markup() {
        assert_eq!(
            render_section(&SectionContent::Text("**GDP** Study".into())),
            DisplayNode::Paragraph("GDP Study".into())
        );
    }

    #[test]
    fn lists_render_recursively() {
        let content = SectionContent::classify(json!(["a", ["b", "c"]]));
        let node = render_section(&content);
        assert_eq!(
            node,
            DisplayNode::OrderedList(vec![
                DisplayNode::Paragraph("a".into()),
                DisplayNode::OrderedList(vec![
                    DisplayNode::Paragraph("b".into()),
                    DisplayNode::Paragraph("c".into()),
                ]),
            ])
        );
    }

    #[test]
    fn objects_render_as_pretty_printed_blocks() {
        let content = SectionContent::classify(json!({"gdp": 1}));
        match render_section(&content) {
            DisplayNode::Structured(text) => {
                assert!(text.contains("\"gdp\": 1"));
            }
            other => panic!("expected structured block, got {other:?}"),
        }
    }

    #[test]
    fn write_display_numbers_list_items() {
        let node = render_section(&SectionContent::classify(json!(["a", "b"])));
        let mut out = String::new();
        write_display(&node, &mut out, 0);
        assert_eq!(out, "1. a\n2. b\n");
    }
}
