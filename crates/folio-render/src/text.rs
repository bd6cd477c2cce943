#![forbid(unsafe_code)]

//! Grapheme-aware width measurement, truncation, and word wrapping.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Terminal columns occupied by `text`.
pub fn display_width(text: &str) -> usize {
    text.graphemes(true).map(grapheme_width).sum()
}

fn grapheme_width(g: &str) -> usize {
    if g.chars().all(char::is_control) {
        return 0;
    }
    UnicodeWidthStr::width(g).max(1)
}

/// Cut `text` to at most `max` columns, ending with `…` when shortened.
pub fn truncate_to_width(text: &str, max: usize) -> String {
    if display_width(text) <= max {
        return text.to_string();
    }
    if max == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for g in text.graphemes(true) {
        let w = grapheme_width(g);
        if used + w > max - 1 {
            break;
        }
        out.push_str(g);
        used += w;
    }
    out.push('…');
    out
}

/// Greedy word wrap to `width` columns.
///
/// Paragraph breaks (`\n`) are preserved. Words longer than a line are split
/// at grapheme boundaries. A zero width yields no lines.
pub fn wrap(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return Vec::new();
    }
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_width = 0;
        for word in paragraph.split_whitespace() {
            let word_width = display_width(word);
            let gap = usize::from(!line.is_empty());
            if line_width + gap + word_width <= width {
                if gap == 1 {
                    line.push(' ');
                }
                line.push_str(word);
                line_width += gap + word_width;
                continue;
            }
            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
                line_width = 0;
            }
            if word_width <= width {
                line.push_str(word);
                line_width = word_width;
                continue;
            }
            for g in word.graphemes(true) {
                let w = grapheme_width(g);
                if line_width + w > width && !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                    line_width = 0;
                }
                line.push_str(g);
                line_width += w;
            }
        }
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn widths() {
        assert_eq!(display_width("abc"), 3);
        assert_eq!(display_width("界面"), 4);
        assert_eq!(display_width(""), 0);
    }

    #[test]
    fn truncation_adds_ellipsis() {
        assert_eq!(truncate_to_width("Creative Developer", 8), "Creativ…");
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abc", 0), "");
    }

    #[test]
    fn wraps_on_word_boundaries() {
        let lines = wrap("Building digital experiences that inspire", 16);
        assert_eq!(lines, vec!["Building digital", "experiences that", "inspire"]);
    }

    #[test]
    fn keeps_paragraph_breaks() {
        let lines = wrap("one\n\ntwo", 10);
        assert_eq!(lines, vec!["one", "", "two"]);
    }

    #[test]
    fn splits_overlong_words() {
        assert_eq!(wrap("abcdefgh", 3), vec!["abc", "def", "gh"]);
    }

    proptest! {
        #[test]
        fn wrapped_lines_fit(text in "[a-z ]{0,80}", width in 1usize..30) {
            for line in wrap(&text, width) {
                prop_assert!(display_width(&line) <= width);
            }
        }
    }
}
