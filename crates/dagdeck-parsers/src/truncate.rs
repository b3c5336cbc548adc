//! Label truncation.

use unicode_width::UnicodeWidthChar;

/// Glyph inserted where text was elided.
pub const ELLIPSIS: char = '…';

/// Truncate `text` to at most `max_len` characters by eliding the middle.
///
/// Asset names tend to carry their meaning at both ends (a namespace prefix
/// and a metric suffix), so the prefix and suffix are kept and the center is
/// replaced with a single ellipsis. The result is exactly `max_len`
/// characters when truncation happens.
pub fn with_middle_truncation(text: &str, max_len: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_len {
        return text.to_string();
    }
    if max_len == 0 {
        return String::new();
    }

    let overflow = chars.len() - max_len;
    let start = max_len.saturating_sub(2) / 2;
    let resume = start + overflow + 1;

    let mut out: String = chars[..start].iter().collect();
    out.push(ELLIPSIS);
    out.extend(&chars[resume..]);
    out
}

/// Truncate `text` to fit in `max_width` terminal cells, ending with an
/// ellipsis. A wide character that would straddle the limit is dropped, so
/// the result can be one cell narrower than `max_width`.
pub fn truncate_end(text: &str, max_width: usize) -> String {
    if crate::display_width(text) <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let budget = max_width - 1;
    let mut used = 0;
    let mut out = String::new();
    for ch in text.chars() {
        let width = ch.width().unwrap_or(0);
        if used + width > budget {
            break;
        }
        used += width;
        out.push(ch);
    }
    out.push(ELLIPSIS);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_untouched() {
        assert_eq!(with_middle_truncation("raw_orders", 50), "raw_orders");
        let exact = "x".repeat(50);
        assert_eq!(with_middle_truncation(&exact, 50), exact);
    }

    #[test]
    fn test_middle_truncation_keeps_both_ends() {
        let name = "a > b > very_long_metric_name_exceeding_fifty_characters_total";
        let truncated = with_middle_truncation(name, 50);

        assert_eq!(truncated.chars().count(), 50);
        assert!(truncated.starts_with("a > b > very_long_metric"));
        assert!(truncated.ends_with("_fifty_characters_total"));

        let pos = truncated.chars().position(|c| c == ELLIPSIS).unwrap();
        assert_eq!(pos, 24);
    }

    #[test]
    fn test_middle_truncation_bounds_for_many_lengths() {
        for len in 51..200 {
            let text: String = (0..len).map(|i| (b'a' + (i % 26) as u8) as char).collect();
            let truncated = with_middle_truncation(&text, 50);
            assert_eq!(truncated.chars().count(), 50, "len {len}");

            let (prefix, suffix) = truncated.split_once(ELLIPSIS).unwrap();
            assert!(!prefix.is_empty());
            assert!(!suffix.is_empty());
            assert!(text.starts_with(prefix));
            assert!(text.ends_with(suffix));
        }
    }

    #[test]
    fn test_middle_truncation_small_limits() {
        assert_eq!(with_middle_truncation("abcdef", 0), "");
        assert_eq!(with_middle_truncation("abcdef", 1), "…");
        assert_eq!(with_middle_truncation("abcdef", 4), "a…ef");
    }

    #[test]
    fn test_truncate_end() {
        assert_eq!(truncate_end("hello", 10), "hello");
        assert_eq!(truncate_end("hello world", 6), "hello…");
        assert_eq!(truncate_end("hello", 0), "");
    }

    #[test]
    fn test_truncate_end_counts_cells() {
        assert_eq!(truncate_end("注文", 4), "注文");
        assert_eq!(truncate_end("注文データ", 5), "注文…");
        // The third wide character would end past the limit
        assert_eq!(truncate_end("注文データ", 6), "注文…");
        assert_eq!(truncate_end("注文データ", 4), "注…");
        assert_eq!(crate::display_width(&truncate_end("注文データ", 4)), 3);
    }
}
