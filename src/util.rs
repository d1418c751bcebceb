//! Shared display helpers

use unicode_width::UnicodeWidthChar;

/// Clip a string to at most `max_chars` characters, appending an ellipsis
/// when anything was cut. Character-based, so multi-byte input is safe.
pub fn clip(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

/// Clip a string to at most `max_width` terminal columns, accounting for
/// wide characters (CJK, emoji). Used when fitting text into fixed-width
/// list rows where char counts would overflow the cell.
pub fn clip_width(s: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if width + w > max_width.saturating_sub(1) {
            out.push('…');
            return out;
        }
        width += w;
        out.push(ch);
    }
    out
}

/// Collapse newlines and repeated whitespace into single spaces so
/// multi-line dream text fits on one list row.
pub fn one_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clip_leaves_short_strings_alone() {
        assert_eq!(clip("hello", 10), "hello");
        assert_eq!(clip("", 5), "");
    }

    #[test]
    fn clip_adds_ellipsis() {
        assert_eq!(clip("hello world", 6), "hello…");
    }

    #[test]
    fn clip_counts_chars_not_bytes() {
        assert_eq!(clip("日本語テスト", 4), "日本語…");
    }

    #[test]
    fn clip_width_respects_wide_chars() {
        // Each CJK char is two columns wide
        let clipped = clip_width("日本語", 5);
        assert_eq!(clipped, "日本…");
    }

    #[test]
    fn one_line_flattens_whitespace() {
        assert_eq!(one_line("a dream\n  of   flying"), "a dream of flying");
    }
}
