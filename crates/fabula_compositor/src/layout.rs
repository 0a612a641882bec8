//! Text layout: word wrapping and adaptive font-size selection.

/// Font size candidates tried from largest to smallest, in points.
pub const FONT_SIZE_CANDIDATES: [f32; 4] = [18.0, 16.0, 14.0, 12.0];

/// Fixed gap added to the font size to get the line height, in points.
pub const LINE_GAP: f32 = 4.0;

/// Maximum number of lines in the overlay band.
pub const MAX_OVERLAY_LINES: usize = 7;

/// Width measurement for a run of text at a given font size.
///
/// The layout algorithm is pure over this trait; production uses a real
/// font, tests a fixed-width fake.
pub trait TextMeasurer {
    /// Advance width of `text` rendered at `size` points.
    fn text_width(&self, text: &str, size: f32) -> f32;
}

/// Result of fitting a text block into the overlay band.
#[derive(Debug, Clone, PartialEq)]
pub struct TextFit {
    /// Selected font size in points
    pub size: f32,
    /// Wrapped lines at that size
    pub lines: Vec<String>,
    /// True when even the smallest candidate exceeded the constraints
    pub overflow: bool,
}

/// Greedy word-atomic wrap: words are never split, and a word wider than
/// the whole line gets a line of its own.
pub fn wrap_words(
    text: &str,
    max_width: f32,
    size: f32,
    measurer: &dyn TextMeasurer,
) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };

        if measurer.text_width(&candidate, size) < max_width {
            current = candidate;
        } else {
            if !current.is_empty() {
                lines.push(current);
            }
            current = word.to_string();
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Pick the largest candidate size whose wrapped text fits the band.
///
/// A candidate fits when it needs at most `max_lines` lines and the total
/// height (`lines * (size + LINE_GAP)`) stays within `max_height`. When no
/// candidate fits, the smallest one is used anyway and `overflow` is set;
/// text may clip but assembly never fails over layout.
pub fn fit_text(
    text: &str,
    max_width: f32,
    max_height: f32,
    max_lines: usize,
    measurer: &dyn TextMeasurer,
) -> TextFit {
    for size in FONT_SIZE_CANDIDATES {
        let lines = wrap_words(text, max_width, size, measurer);
        let total_height = lines.len() as f32 * (size + LINE_GAP);

        if lines.len() <= max_lines && total_height <= max_height {
            return TextFit {
                size,
                lines,
                overflow: false,
            };
        }
    }

    let size = FONT_SIZE_CANDIDATES[FONT_SIZE_CANDIDATES.len() - 1];
    let lines = wrap_words(text, max_width, size, measurer);
    TextFit {
        size,
        lines,
        overflow: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fake measurer: every character is `size * 0.6` wide.
    struct FixedWidth;

    impl TextMeasurer for FixedWidth {
        fn text_width(&self, text: &str, size: f32) -> f32 {
            text.chars().count() as f32 * size * 0.6
        }
    }

    #[test]
    fn short_text_takes_largest_size() {
        let fit = fit_text("The fox ran.", 400.0, 100.0, 7, &FixedWidth);
        assert_eq!(fit.size, 18.0);
        assert_eq!(fit.lines, vec!["The fox ran."]);
        assert!(!fit.overflow);
    }

    #[test]
    fn wrap_is_word_atomic() {
        // At size 10 each char is 6pt wide; "aaaa bbbb" is 54pt.
        let lines = wrap_words("aaaa bbbb cccc", 55.0, 10.0, &FixedWidth);
        assert_eq!(lines, vec!["aaaa bbbb", "cccc"]);
    }

    #[test]
    fn word_wider_than_line_gets_its_own_line() {
        let lines = wrap_words("hi extraordinarily no", 60.0, 10.0, &FixedWidth);
        assert_eq!(lines, vec!["hi", "extraordinarily", "no"]);
    }

    #[test]
    fn whitespace_only_text_yields_no_lines() {
        assert!(wrap_words("   \n\t ", 100.0, 12.0, &FixedWidth).is_empty());
        let fit = fit_text("", 100.0, 100.0, 7, &FixedWidth);
        assert!(fit.lines.is_empty());
        assert!(!fit.overflow);
    }

    #[test]
    fn long_text_steps_down_the_candidates() {
        // Three words per line at most, sized so 18pt needs too many lines.
        let text = "word ".repeat(30);
        let width = 3.0 * 5.0 * 12.0 * 0.6 + 1.0; // three words fit at 12pt

        let fit = fit_text(&text, width, 1000.0, 10, &FixedWidth);
        assert!(fit.size < 18.0);
        assert!(!fit.overflow);
        for line in &fit.lines {
            assert!(FixedWidth.text_width(line, fit.size) < width);
        }
    }

    #[test]
    fn impossible_text_falls_back_to_smallest_with_overflow() {
        let text = "word ".repeat(200);
        let fit = fit_text(&text, 100.0, 50.0, 7, &FixedWidth);
        assert_eq!(fit.size, 12.0);
        assert!(fit.overflow);
        assert!(!fit.lines.is_empty());
    }

    #[test]
    fn wrapping_already_wrapped_lines_is_stable() {
        let text = "the quick brown fox jumps over the lazy dog again and again";
        let lines = wrap_words(text, 80.0, 12.0, &FixedWidth);
        for line in &lines {
            assert_eq!(wrap_words(line, 80.0, 12.0, &FixedWidth), vec![line.clone()]);
        }
    }
}
