//! Plain-text fallback derivation for HTML email bodies.

use std::sync::OnceLock;

use regex::Regex;

/// Upper bound on the derived plain-text body, in characters.
const MAX_TEXT_LEN: usize = 2000;

static STYLE_RE: OnceLock<Regex> = OnceLock::new();
static TAG_RE: OnceLock<Regex> = OnceLock::new();
static WHITESPACE_RE: OnceLock<Regex> = OnceLock::new();

fn style_re() -> &'static Regex {
    STYLE_RE.get_or_init(|| {
        Regex::new(r"(?is)<style\b[^>]*>.*?</style>").expect("style regex is valid")
    })
}

fn tag_re() -> &'static Regex {
    TAG_RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("tag regex is valid"))
}

fn whitespace_re() -> &'static Regex {
    WHITESPACE_RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex is valid"))
}

/// Derive the plain-text alternative for an HTML body.
///
/// `<style>` blocks are dropped entirely (their content is not prose), all
/// remaining tags are stripped, the four basic entities are decoded, runs of
/// whitespace collapse to single spaces, and the result is trimmed and
/// capped at 2000 characters.
pub fn html_to_text(html: &str) -> String {
    let without_styles = style_re().replace_all(html, " ");
    let without_tags = tag_re().replace_all(&without_styles, " ");

    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">");

    let collapsed = whitespace_re().replace_all(&decoded, " ");
    collapsed.trim().chars().take(MAX_TEXT_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drops_style_blocks_and_tags() {
        let text = html_to_text("<style>body{color:red}</style><p>Hi</p>");
        assert!(text.contains("Hi"));
        assert!(!text.contains("color:red"));
        assert_eq!(text, "Hi");
    }

    #[test]
    fn decodes_basic_entities() {
        assert_eq!(
            html_to_text("<p>Fish&nbsp;&amp;&nbsp;Chips &lt;fresh&gt;</p>"),
            "Fish & Chips <fresh>"
        );
    }

    #[test]
    fn collapses_whitespace_across_tags() {
        assert_eq!(
            html_to_text("<div>\n  <p>One</p>\n  <p>Two</p>\n</div>"),
            "One Two"
        );
    }

    #[test]
    fn caps_output_at_two_thousand_characters() {
        let html = format!("<p>{}</p>", "a".repeat(5000));
        assert_eq!(html_to_text(&html).chars().count(), 2000);
    }

    #[test]
    fn style_matching_is_case_insensitive_and_spans_lines() {
        let text = html_to_text("<STYLE type=\"text/css\">h1 {\n font-size: 2em;\n}</STYLE><h1>Big</h1>");
        assert_eq!(text, "Big");
    }
}
