//! Flatten markdown descriptions to plain text.
//!
//! Asset descriptions are authored as markdown. Node boxes only have room
//! for one line of plain text, so markup is stripped rather than rendered.

use once_cell::sync::Lazy;
use regex::Regex;

static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*(```|~~~).*$\n?").unwrap());
static IMAGE: Lazy<Regex> = Lazy::new(|| Regex::new(r"!\[([^\]]*)\]\([^)]*\)").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").unwrap());
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]{0,3}#{1,6}[ \t]+").unwrap());
static BLOCKQUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^[ \t]*>[ \t]?").unwrap());
static LIST_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^[ \t]*(?:[-*+]|\d+\.)[ \t]+").unwrap());
static STRONG_STAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*\*([^*]+)\*\*").unwrap());
static STRONG_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b__([^_]+)__\b").unwrap());
static EM_STAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\*([^*\s][^*]*)\*").unwrap());
static EM_UNDERSCORE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b_([^_]+)_\b").unwrap());
static STRIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"~~([^~]+)~~").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]*)`").unwrap());
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[A-Za-z][^>]*>").unwrap());

/// Strip markdown markup, keeping the readable text and line structure.
pub fn markdown_to_plaintext(markdown: &str) -> String {
    let text = CODE_FENCE.replace_all(markdown, "");
    let text = IMAGE.replace_all(&text, "$1");
    let text = LINK.replace_all(&text, "$1");
    let text = HEADING.replace_all(&text, "");
    let text = BLOCKQUOTE.replace_all(&text, "");
    let text = LIST_MARKER.replace_all(&text, "");
    let text = STRONG_STAR.replace_all(&text, "$1");
    let text = STRONG_UNDERSCORE.replace_all(&text, "$1");
    let text = EM_STAR.replace_all(&text, "$1");
    let text = EM_UNDERSCORE.replace_all(&text, "$1");
    let text = STRIKE.replace_all(&text, "$1");
    let text = INLINE_CODE.replace_all(&text, "$1");
    let text = HTML_TAG.replace_all(&text, "");

    text.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim_start_matches('\n')
        .to_string()
}

/// Plaintext of the first line of a markdown document.
///
/// Anything after the first newline is dropped.
pub fn first_line_plaintext(markdown: &str) -> String {
    let plain = markdown_to_plaintext(markdown);
    plain.split('\n').next().unwrap_or_default().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_inline_markup() {
        assert_eq!(
            markdown_to_plaintext("Daily **orders** from [the warehouse](https://x.io) in `raw`"),
            "Daily orders from the warehouse in raw"
        );
        assert_eq!(markdown_to_plaintext("*one* and _two_ ~~three~~"), "one and two three");
    }

    #[test]
    fn test_keeps_identifier_underscores() {
        assert_eq!(
            markdown_to_plaintext("Joins raw_orders with dim_customer_v2"),
            "Joins raw_orders with dim_customer_v2"
        );
    }

    #[test]
    fn test_strips_block_markup() {
        let md = "# Orders\n\n> cleaned\n- one\n- two\n";
        assert_eq!(markdown_to_plaintext(md), "Orders\n\ncleaned\none\ntwo");
    }

    #[test]
    fn test_first_line_only() {
        assert_eq!(
            first_line_plaintext("## Cleaned orders\nDeduplicated by id."),
            "Cleaned orders"
        );
        assert_eq!(first_line_plaintext("single"), "single");
        assert_eq!(first_line_plaintext(""), "");
    }

    #[test]
    fn test_html_and_images() {
        assert_eq!(
            markdown_to_plaintext("<b>Bold</b> ![diagram](d.png)"),
            "Bold diagram"
        );
    }
}
