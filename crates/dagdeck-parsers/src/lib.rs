//! Shared text helpers for dagdeck views.
//!
//! Label truncation, markdown flattening and timestamp formatting live here
//! so that the graph layout and the node renderer agree on every string
//! they measure.

pub mod markdown;
pub mod time;
pub mod truncate;

pub use markdown::{first_line_plaintext, markdown_to_plaintext};
pub use time::{datetime_from_unix, format_countdown, format_elapsed, format_timestamp};
pub use truncate::{truncate_end, with_middle_truncation, ELLIPSIS};

use unicode_width::UnicodeWidthStr;

/// Count characters, not bytes. Name lengths and the label cap use this.
pub fn char_len(s: &str) -> usize {
    s.chars().count()
}

/// Terminal cells taken by `s`. Wide characters take two.
pub fn display_width(s: &str) -> usize {
    s.width()
}
