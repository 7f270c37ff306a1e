//! Line extraction from layout-engine records.
//!
//! The external layout engine supplies per-page groups of line records, each
//! carrying its spans (text plus font size) and the line's top-Y coordinate.
//! This module normalizes those records into uniform [`TextLine`] values, one
//! per non-blank visual line, in page-ascending, in-page reading order.

use serde::{Deserialize, Serialize};

use crate::utils::safe_float_cmp;

/// A single span within a raw line, as produced by the layout engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawSpan {
    /// Span text, possibly blank
    pub text: String,
    /// Font size of the span in points
    pub font_size: f32,
}

impl RawSpan {
    /// Create a span record.
    pub fn new(text: impl Into<String>, font_size: f32) -> Self {
        Self {
            text: text.into(),
            font_size,
        }
    }
}

/// A raw visual line: its spans and its top-Y coordinate within the page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLine {
    /// Spans composing the line, in visual order
    pub spans: Vec<RawSpan>,
    /// Top coordinate of the line within its page
    pub y: f32,
}

impl RawLine {
    /// Create a line record from spans.
    pub fn new(spans: Vec<RawSpan>, y: f32) -> Self {
        Self { spans, y }
    }

    /// Convenience constructor for a line rendered in a single span.
    pub fn solid(text: impl Into<String>, font_size: f32, y: f32) -> Self {
        Self {
            spans: vec![RawSpan::new(text, font_size)],
            y,
        }
    }
}

/// An ordered group of raw lines belonging to one page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawPage {
    /// Lines in reading order
    pub lines: Vec<RawLine>,
}

impl RawPage {
    /// Create a page from its lines.
    pub fn new(lines: Vec<RawLine>) -> Self {
        Self { lines }
    }
}

/// A normalized text line with derived typographic features.
///
/// `font_size` is the maximum of the span sizes composing the line, so a
/// partially bold or larger run dominates level assignment. The derived
/// fields are computed once at construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLine {
    /// Whitespace-joined, trimmed text of the line (never empty)
    pub text: String,
    /// Maximum span font size in points
    pub font_size: f32,
    /// Top coordinate within the page
    pub y: f32,
    /// 1-based page number
    pub page: u32,
    /// Number of whitespace-separated words
    pub word_count: usize,
    /// Fraction of alphabetic characters that are uppercase
    pub cap_ratio: f32,
    /// True when the final character is one of `.` `:` `;`
    pub ends_with_punct: bool,
}

impl TextLine {
    /// Build a line and compute its derived features.
    pub fn new(text: impl Into<String>, font_size: f32, y: f32, page: u32) -> Self {
        let text = text.into();
        let word_count = text.split_whitespace().count();
        let cap_ratio = cap_ratio(&text);
        let ends_with_punct = matches!(text.chars().last(), Some('.' | ':' | ';'));
        Self {
            text,
            font_size,
            y,
            page,
            word_count,
            cap_ratio,
            ends_with_punct,
        }
    }
}

/// Fraction of alphabetic characters that are uppercase; 0.0 when the text
/// has no alphabetic characters.
fn cap_ratio(text: &str) -> f32 {
    let mut alphabetic = 0usize;
    let mut uppercase = 0usize;
    for c in text.chars().filter(|c| c.is_alphabetic()) {
        alphabetic += 1;
        if c.is_uppercase() {
            uppercase += 1;
        }
    }
    if alphabetic == 0 {
        0.0
    } else {
        uppercase as f32 / alphabetic as f32
    }
}

/// Normalize raw pages into [`TextLine`] records.
///
/// Blank lines (no non-blank span text) are dropped. Page numbers are
/// assigned from the input order, starting at 1. An empty result is valid:
/// a zero-line document is handled downstream as a sentinel outline, not as
/// an error.
pub fn extract_lines(pages: &[RawPage]) -> Vec<TextLine> {
    let mut lines = Vec::new();

    for (page_idx, page) in pages.iter().enumerate() {
        let page_num = page_idx as u32 + 1;
        for raw in &page.lines {
            let text = raw
                .spans
                .iter()
                .map(|s| s.text.trim())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if text.is_empty() {
                continue;
            }

            let font_size = raw
                .spans
                .iter()
                .map(|s| s.font_size)
                .max_by(|a, b| safe_float_cmp(*a, *b))
                .unwrap_or(0.0);

            lines.push(TextLine::new(text, font_size, raw.y, page_num));
        }
    }

    log::debug!("extracted {} line(s) from {} page(s)", lines.len(), pages.len());
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_lines_dropped() {
        let pages = vec![RawPage::new(vec![
            RawLine::new(vec![RawSpan::new("   ", 12.0), RawSpan::new("", 12.0)], 10.0),
            RawLine::solid("Real text", 12.0, 30.0),
        ])];

        let lines = extract_lines(&pages);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].text, "Real text");
    }

    #[test]
    fn test_max_span_size_wins() {
        // A bold run inside the line carries a larger size
        let pages = vec![RawPage::new(vec![RawLine::new(
            vec![RawSpan::new("Chapter", 18.0), RawSpan::new("One", 14.0)],
            10.0,
        )])];

        let lines = extract_lines(&pages);
        assert_eq!(lines[0].text, "Chapter One");
        assert!((lines[0].font_size - 18.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_span_text_joined_and_trimmed() {
        let pages = vec![RawPage::new(vec![RawLine::new(
            vec![
                RawSpan::new("  Hello ", 10.0),
                RawSpan::new(" ", 10.0),
                RawSpan::new("world  ", 10.0),
            ],
            0.0,
        )])];

        let lines = extract_lines(&pages);
        assert_eq!(lines[0].text, "Hello world");
    }

    #[test]
    fn test_page_numbers_ascend_from_one() {
        let pages = vec![
            RawPage::new(vec![RawLine::solid("first", 10.0, 0.0)]),
            RawPage::default(),
            RawPage::new(vec![RawLine::solid("third", 10.0, 0.0)]),
        ];

        let lines = extract_lines(&pages);
        assert_eq!(lines[0].page, 1);
        assert_eq!(lines[1].page, 3);
    }

    #[test]
    fn test_empty_document_yields_no_lines() {
        assert!(extract_lines(&[]).is_empty());
        assert!(extract_lines(&[RawPage::default()]).is_empty());
    }

    #[test]
    fn test_derived_word_count() {
        let line = TextLine::new("Three word line", 10.0, 0.0, 1);
        assert_eq!(line.word_count, 3);
    }

    #[test]
    fn test_derived_cap_ratio() {
        let line = TextLine::new("ABc", 10.0, 0.0, 1);
        assert!((line.cap_ratio - 2.0 / 3.0).abs() < 1e-6);

        // Digits and punctuation do not count as alphabetic
        let digits = TextLine::new("1234!", 10.0, 0.0, 1);
        assert_eq!(digits.cap_ratio, 0.0);
    }

    #[test]
    fn test_derived_terminal_punctuation() {
        assert!(TextLine::new("A sentence.", 10.0, 0.0, 1).ends_with_punct);
        assert!(TextLine::new("A label:", 10.0, 0.0, 1).ends_with_punct);
        assert!(TextLine::new("clause;", 10.0, 0.0, 1).ends_with_punct);
        assert!(!TextLine::new("A heading", 10.0, 0.0, 1).ends_with_punct);
        assert!(!TextLine::new("Why not?", 10.0, 0.0, 1).ends_with_punct);
    }
}
