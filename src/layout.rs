//! Greedy character-wise text wrapping with category-boundary break points.

/// Width and height in pixels of measured or laid-out text.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Measures the pixel extents of a string in the label font.
///
/// Implemented by the raster backend; the layout engine itself never touches
/// a font. Measurement is unscaled: the font-scale multiplier is applied by
/// the caller through the width budget, not here.
pub trait FontMetrics {
    fn measure(&mut self, text: &str) -> Size;
}

/// Ordered wrapped lines plus their bounding size.
///
/// Width is the widest measured line, height the sum of line heights.
/// Ephemeral: recomputed during image generation, never stored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct WrappedLayout {
    pub lines: Vec<String>,
    pub size: Size,
}

impl WrappedLayout {
    fn add_line(&mut self, line: String, metrics: &mut impl FontMetrics) {
        let size = metrics.measure(&line);
        self.size.width = self.size.width.max(size.width);
        self.size.height += size.height;
        self.lines.push(line);
    }
}

/// Default fraction of the width budget a carried-over fragment may occupy
/// for a category-boundary break to be preferred over a literal one.
pub const BREAK_THRESHOLD: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CharCategory {
    Whitespace,
    Digit,
    Letter,
    Other,
}

impl CharCategory {
    fn of(c: char) -> Self {
        if c.is_whitespace() {
            CharCategory::Whitespace
        } else if c.is_numeric() {
            CharCategory::Digit
        } else if c.is_alphabetic() {
            CharCategory::Letter
        } else {
            CharCategory::Other
        }
    }
}

/// Byte index of the last adjacent-category change in `line`, if any.
///
/// Never returns index 0, so breaking at the returned index always leaves a
/// non-empty head.
fn last_category_change(line: &str) -> Option<usize> {
    let mut later: Option<(usize, CharCategory)> = None;
    for (idx, c) in line.char_indices().rev() {
        let category = CharCategory::of(c);
        if let Some((later_idx, later_category)) = later {
            if later_category != category {
                return Some(later_idx);
            }
        }
        later = Some((idx, category));
    }
    None
}

/// Wraps `text` to fit `max_line_width` using [`BREAK_THRESHOLD`].
pub fn wrap(text: &str, max_line_width: f32, metrics: &mut impl FontMetrics) -> WrappedLayout {
    wrap_with_threshold(text, max_line_width, BREAK_THRESHOLD, metrics)
}

/// Wraps `text` by greedy accumulation, re-measuring the whole line after
/// each character.
///
/// When the accumulated line overflows, the break is moved back to the last
/// category boundary (whitespace/digit/letter/other) if the carried-over
/// fragment would measure under `threshold * max_line_width`; otherwise the
/// line breaks at the overflow point. A single character wider than the
/// budget still becomes its own line. Pure and restartable.
///
/// Re-measuring the full line per character is quadratic in line length;
/// labels are short, so simplicity wins over throughput here.
pub fn wrap_with_threshold(
    text: &str,
    max_line_width: f32,
    threshold: f32,
    metrics: &mut impl FontMetrics,
) -> WrappedLayout {
    let mut layout = WrappedLayout::default();
    if text.is_empty() {
        return layout;
    }

    let mut current = String::new();
    for c in text.chars() {
        let mut test = current.clone();
        test.push(c);

        if metrics.measure(&test).width > max_line_width && !current.is_empty() {
            if let Some(break_idx) = last_category_change(&current) {
                let mut carried = current[break_idx..].to_owned();
                carried.push(c);
                if metrics.measure(&carried).width < threshold * max_line_width {
                    let head = current[..break_idx].to_owned();
                    layout.add_line(head, metrics);
                    current = carried;
                    continue;
                }
            }

            // No suitable boundary: break at the overflow point.
            layout.add_line(std::mem::take(&mut current), metrics);
            current.push(c);
        } else {
            current = test;
        }
    }

    if !current.is_empty() {
        layout.add_line(current, metrics);
    }

    layout
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixed-advance metrics: every char 10 px wide, lines 20 px tall.
    struct Mono;

    impl FontMetrics for Mono {
        fn measure(&mut self, text: &str) -> Size {
            Size::new(text.chars().count() as f32 * 10.0, 20.0)
        }
    }

    #[test]
    fn test_fitting_text_stays_on_one_line() {
        let layout = wrap("Seeds", 70.0, &mut Mono);
        assert_eq!(layout.lines, ["Seeds"]);
        assert_eq!(layout.size, Size::new(50.0, 20.0));
    }

    #[test]
    fn test_empty_text_yields_no_lines() {
        let layout = wrap("", 70.0, &mut Mono);
        assert!(layout.lines.is_empty());
        assert_eq!(layout.size, Size::ZERO);
    }

    #[test]
    fn test_every_line_fits_or_is_a_single_char() {
        for text in ["Iron Ore x99", "aaaaaaaaaaaaaaaa", "a b c d e f g h"] {
            let layout = wrap(text, 40.0, &mut Mono);
            for line in &layout.lines {
                let width = Mono.measure(line).width;
                assert!(
                    width <= 40.0 || line.chars().count() == 1,
                    "line {line:?} measures {width} in {text:?}"
                );
                assert!(!line.is_empty());
            }
        }
    }

    #[test]
    fn test_single_overwide_char_becomes_its_own_line() {
        struct Wide;
        impl FontMetrics for Wide {
            fn measure(&mut self, text: &str) -> Size {
                Size::new(text.chars().count() as f32 * 100.0, 20.0)
            }
        }
        let layout = wrap("ab", 70.0, &mut Wide);
        assert_eq!(layout.lines, ["a", "b"]);
    }

    #[test]
    fn test_break_prefers_category_boundary() {
        // Overflow lands mid-"Ore"; the whitespace boundary before "Or" is
        // close enough (30 < 0.5 * 70) to carry the whole word over.
        let layout = wrap("Iron Ore x99", 70.0, &mut Mono);
        assert_eq!(layout.lines, ["Iron ", "Ore x99"]);
        assert_eq!(layout.size, Size::new(70.0, 40.0));
    }

    #[test]
    fn test_break_between_letters_and_digits() {
        // A tighter budget overflows inside the digit run; the letter->digit
        // boundary carries "99" onto its own line.
        let layout = wrap("Iron Ore x99", 60.0, &mut Mono);
        assert_eq!(layout.lines, ["Iron ", "Ore x", "99"]);
    }

    #[test]
    fn test_literal_break_when_no_boundary_exists() {
        let layout = wrap("abcdef123456", 60.0, &mut Mono);
        assert_eq!(layout.lines[0], "abcdef");
    }

    #[test]
    fn test_literal_break_when_fragment_exceeds_threshold() {
        // The digit run is 40 px, over 0.5 * 50, so the boundary is rejected.
        let layout = wrap("ab12345678", 50.0, &mut Mono);
        assert_eq!(layout.lines[0], "ab123");
        assert_eq!(layout.lines[1].chars().next(), Some('4'));
    }

    #[test]
    fn test_wrap_is_restartable() {
        let first = wrap("Iron Ore x99", 60.0, &mut Mono);
        let second = wrap("Iron Ore x99", 60.0, &mut Mono);
        assert_eq!(first, second);
    }
}
