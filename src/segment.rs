//! Line-to-word segmentation.
//!
//! The recognition engine reports one quadrilateral per text line. Word
//! geometry is recovered by walking the line's top and bottom edges with a
//! fixed per-character step: every character of the transcription, spaces
//! included, is assumed to occupy the same fraction of the edge. That is
//! exact for monospaced text and an approximation for proportional fonts,
//! which is accepted; no glyph measurement is attempted.

use crate::model::{DetectionLine, ExportRecord, Point, Quad, WordSpan};

/// Split one detected line into word spans.
///
/// Tokens are the whitespace-separated parts of the line text. Each token
/// gets the slice of the line starting at the current cursor and extending
/// by its own character count; the cursors then advance by the token length
/// plus one character for the separating space. Runs of several spaces are
/// not renormalized, so later tokens drift towards the line start.
///
/// # Example
///
/// ```
/// use wordocr::model::{DetectionLine, Quad};
/// use wordocr::segment::segment_line;
///
/// let line = DetectionLine::new(Quad::from_rect(0.0, 0.0, 100.0, 10.0), "ab cd");
/// let words = segment_line(&line);
///
/// assert_eq!(words.len(), 2);
/// assert_eq!(words[0].quad.top_right.x, 40.0);
/// assert_eq!(words[1].quad.top_left.x, 60.0);
/// ```
pub fn segment_line(line: &DetectionLine) -> Vec<WordSpan> {
    let tokens: Vec<&str> = line.text.split_whitespace().collect();
    if tokens.is_empty() {
        return Vec::new();
    }

    // Pitch is measured over the unsplit text, separators included.
    let char_count = line.text.chars().count() as f64;
    let top_step = line.quad.top_edge() / char_count;
    let bottom_step = line.quad.bottom_edge() / char_count;

    log::trace!(
        "segmenting {:?}: {} tokens, top step ({:.3}, {:.3})",
        line.text,
        tokens.len(),
        top_step.x,
        top_step.y
    );

    tokens
        .into_iter()
        .scan(
            (line.quad.top_left, line.quad.bottom_left),
            |cursor, token| {
                let (top, bottom) = *cursor;
                let width = token.chars().count() as f64;

                let quad = word_quad(top, bottom, top_step * width, bottom_step * width);
                *cursor = (
                    top + top_step * (width + 1.0),
                    bottom + bottom_step * (width + 1.0),
                );

                Some(WordSpan::new(token, quad))
            },
        )
        .collect()
}

fn word_quad(top: Point, bottom: Point, top_extent: Point, bottom_extent: Point) -> Quad {
    Quad::new(top, top + top_extent, bottom + bottom_extent, bottom)
}

/// Segment every line of a page, keeping line order then token order.
pub fn segment_lines<'a, I>(lines: I) -> ExportRecord
where
    I: IntoIterator<Item = &'a DetectionLine>,
{
    lines.into_iter().flat_map(segment_line).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn rect_line(text: &str) -> DetectionLine {
        DetectionLine::new(Quad::from_rect(0.0, 0.0, 100.0, 10.0), text)
    }

    #[test]
    fn test_two_words_positions() {
        let words = segment_line(&rect_line("ab cd"));
        assert_eq!(words.len(), 2);

        assert_eq!(words[0].text, "ab");
        assert!((words[0].quad.top_left.x - 0.0).abs() < EPS);
        assert!((words[0].quad.top_right.x - 40.0).abs() < EPS);
        assert!((words[0].quad.bottom_right.x - 40.0).abs() < EPS);
        assert!((words[0].quad.bottom_right.y - 10.0).abs() < EPS);

        assert_eq!(words[1].text, "cd");
        assert!((words[1].quad.top_left.x - 60.0).abs() < EPS);
        assert!((words[1].quad.top_right.x - 100.0).abs() < EPS);
        assert!((words[1].quad.bottom_left.x - 60.0).abs() < EPS);
    }

    #[test]
    fn test_single_token_spans_line() {
        let words = segment_line(&rect_line("hello"));
        assert_eq!(words.len(), 1);
        assert!(words[0].quad.approx_eq(&Quad::from_rect(0.0, 0.0, 100.0, 10.0), EPS));
    }

    #[test]
    fn test_trailing_space_leaves_gap() {
        // 4 characters, token of 3: the word stops one pitch short.
        let words = segment_line(&rect_line("abc "));
        assert_eq!(words.len(), 1);
        assert!((words[0].quad.top_right.x - 75.0).abs() < EPS);
    }

    #[test]
    fn test_blank_lines_yield_nothing() {
        assert!(segment_line(&rect_line("")).is_empty());
        assert!(segment_line(&rect_line("   ")).is_empty());
        assert!(segment_line(&rect_line("\t\n")).is_empty());
    }

    #[test]
    fn test_repeated_whitespace_drifts() {
        // "a  b" has 4 chars (pitch 25) but the cursor only skips one space,
        // so "b" starts at 50 instead of its true position 75.
        let words = segment_line(&rect_line("a  b"));
        assert_eq!(words.len(), 2);
        assert!((words[1].quad.top_left.x - 50.0).abs() < EPS);
        assert!((words[1].quad.top_right.x - 75.0).abs() < EPS);
    }

    #[test]
    fn test_skewed_line_follows_both_edges() {
        // Top edge rises by 10 over the line, bottom edge is twice as long.
        let quad = Quad::new(
            Point::new(0.0, 10.0),
            Point::new(40.0, 0.0),
            Point::new(80.0, 20.0),
            Point::new(0.0, 30.0),
        );
        let words = segment_line(&DetectionLine::new(quad, "ab cd"));

        assert!(words[0].quad.top_right.approx_eq(&Point::new(16.0, 6.0), EPS));
        assert!(words[0].quad.bottom_right.approx_eq(&Point::new(32.0, 26.0), EPS));
        assert!(words[1].quad.top_left.approx_eq(&Point::new(24.0, 4.0), EPS));
        assert!(words[1].quad.bottom_left.approx_eq(&Point::new(48.0, 24.0), EPS));
        assert!(words[1].quad.top_right.approx_eq(&Point::new(40.0, 0.0), EPS));
        assert!(words[1].quad.bottom_right.approx_eq(&Point::new(80.0, 20.0), EPS));
    }

    #[test]
    fn test_counts_characters_not_bytes() {
        // 5 characters, 9 bytes.
        let words = segment_line(&rect_line("éé üü"));
        assert!((words[0].quad.top_right.x - 40.0).abs() < EPS);
        assert!((words[1].quad.top_left.x - 60.0).abs() < EPS);
    }

    #[test]
    fn test_word_quads_do_not_alias_cursor() {
        let words = segment_line(&rect_line("a b c d"));
        let lefts: Vec<f64> = words.iter().map(|w| w.quad.top_left.x).collect();
        for pair in lefts.windows(2) {
            assert!(pair[1] > pair[0]);
        }
    }

    #[test]
    fn test_segment_lines_keeps_order() {
        let lines = vec![
            rect_line("one two"),
            rect_line("  "),
            DetectionLine::new(Quad::from_rect(0.0, 20.0, 50.0, 10.0), "three"),
        ];
        let record = segment_lines(&lines);
        let texts: Vec<&str> = record.iter().map(|w| w.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
        assert!((record.words[2].quad.top_left.y - 20.0).abs() < EPS);
    }
}
