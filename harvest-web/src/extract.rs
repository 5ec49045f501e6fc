//! Markup stripping: HTML in, whitespace-normalized plain text out.

use scraper::{Html, Node};

/// Elements whose text never reaches the output. The parser keeps the
/// contents of `noscript`, `iframe`, `noembed` and `noframes` as raw text, so
/// their markup would otherwise leak through verbatim.
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "iframe", "noembed", "noframes"];

/// Plain text of `html` without `<script>`/`<style>` content or the raw
/// markup of fallback containers such as `<noscript>`.
///
/// Text nodes are joined with a space; the result is split into lines and
/// into phrases at double spaces, every phrase is trimmed, empty ones are
/// dropped and the rest joined with single spaces.
///
/// ```
/// let html = "<html><head><style>a{}</style></head><body>Hello <b>World</b></body></html>";
/// assert_eq!(harvest_web::extract::extract_text(html), "Hello World");
/// ```
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut raw = String::with_capacity(html.len() / 2);
    let mut first = true;
    for node in document.tree.root().descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| SKIPPED_ELEMENTS.contains(&e.name()))
        });
        if hidden {
            continue;
        }
        if !first {
            raw.push(' ');
        }
        raw.push_str(text);
        first = false;
    }

    normalize_whitespace(&raw)
}

fn is_line_break(c: char) -> bool {
    matches!(
        c,
        '\n' | '\r' | '\u{0b}' | '\u{0c}' | '\u{1c}' | '\u{1d}' | '\u{1e}' | '\u{85}' | '\u{2028}'
            | '\u{2029}'
    )
}

fn normalize_whitespace(text: &str) -> String {
    text.split(is_line_break)
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn style_content_is_removed() {
        let html = "<html><head><style>a{}</style></head><body>Hello <b>World</b></body></html>";
        let text = extract_text(html);
        assert!(text.contains("Hello World"));
        assert!(!text.contains("a{}"));
    }

    #[test]
    fn script_content_is_removed_everywhere() {
        let html = r#"<html><body>
            <script>var tracking = "x";</script>
            <p>Story</p>
            <div><script type="application/ld+json">{"@type":"NewsArticle"}</script>body</div>
        </body></html>"#;
        let text = extract_text(html);
        assert_eq!(text, "Story body");
    }

    #[test]
    fn noscript_tracking_pixel_is_dropped() {
        let html = r#"<html><body><p>Story</p><noscript><img height="1" width="1" src="https://www.facebook.com/tr?id=1"/></noscript></body></html>"#;
        assert_eq!(extract_text(html), "Story");
    }

    #[test]
    fn iframe_fallback_markup_is_dropped() {
        assert_eq!(extract_text("<body><iframe><b>x</b></iframe>Tail</body>"), "Tail");
        assert_eq!(
            extract_text("<body>Lead<noembed><i>old</i></noembed></body>"),
            "Lead"
        );
    }

    #[test]
    fn blank_lines_and_indentation_collapse() {
        let html = "<body>\n\n   <h1>Title</h1>\n\n\t<p>First   paragraph</p>\r\n<p>Second</p></body>";
        assert_eq!(extract_text(html), "Title First paragraph Second");
    }

    #[test]
    fn single_inner_spaces_are_kept() {
        let html = "<p>Rust 1.85 ships today</p>";
        assert_eq!(extract_text(html), "Rust 1.85 ships today");
    }

    #[test]
    fn title_and_entities_are_text() {
        let html = "<html><head><title>Q&amp;A</title></head><body>caf&eacute;</body></html>";
        assert_eq!(extract_text(html), "Q&A café");
    }

    #[test]
    fn comments_are_not_text() {
        let html = "<body><!-- hidden -->Visible</body>";
        assert_eq!(extract_text(html), "Visible");
    }

    #[test]
    fn empty_input_gives_empty_output() {
        assert_eq!(extract_text(""), "");
        assert_eq!(extract_text("<script>only()</script>"), "");
    }
}
