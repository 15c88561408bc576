use pulldown_cmark::{Event, Parser, Tag, TagEnd};

/// Expands lightweight markup to plain text.
///
/// Block boundaries become newlines and list items are prefixed with a dash;
/// inline styling markers are dropped. The result carries no trailing
/// newlines so callers control block separation.
pub fn to_plain_text(markdown: &str) -> String {
    let mut out = String::new();
    for event in Parser::new(markdown) {
        match event {
            Event::Text(text) => out.push_str(&text),
            Event::Code(code) => out.push_str(&code),
            Event::SoftBreak => out.push(' '),
            Event::HardBreak => out.push('\n'),
            Event::Start(Tag::Item) => out.push_str("- "),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::BlockQuote,
            ) => out.push('\n'),
            _ => {}
        }
    }
    while out.ends_with('\n') {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_inline_styling() {
        assert_eq!(to_plain_text("**bold** and _em_"), "bold and em");
    }

    #[test]
    fn headings_and_paragraphs_become_lines() {
        assert_eq!(to_plain_text("# Title\n\nBody text."), "Title\nBody text.");
    }

    #[test]
    fn list_items_keep_one_line_each() {
        assert_eq!(to_plain_text("- first\n- second"), "- first\n- second");
    }

    #[test]
    fn plain_text_passes_through() {
        assert_eq!(to_plain_text("GDP Study"), "GDP Study");
    }

    #[test]
    fn inline_code_keeps_content() {
        assert_eq!(to_plain_text("use `serde` here"), "use serde here");
    }
}
