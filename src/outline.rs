//! Title selection and outline assembly.
//!
//! Merges classified heading lines and the selected title into the final
//! outline structure. The typographic and semantic pipelines select titles
//! differently and order their outlines differently; both variants live
//! here so the assembly rules sit side by side.

use serde::{Deserialize, Serialize};

use crate::config::ExtractionConfig;
use crate::extract::TextLine;
use crate::layout::heading_detector::HeadingLevel;
use crate::utils::safe_float_cmp;

/// Sentinel title for documents with no qualifying candidate.
pub const UNKNOWN_TITLE: &str = "Unknown Title";

/// One outline entry: a leveled heading with its page reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlineEntry {
    /// Heading level
    pub level: HeadingLevel,
    /// Heading text
    pub text: String,
    /// 1-based page number
    pub page: u32,
}

/// The outline result: a title plus ordered heading entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentOutline {
    /// Document title, or the sentinel when nothing qualifies
    pub title: String,
    /// Ordered heading entries, excluding the title line
    pub outline: Vec<OutlineEntry>,
}

impl DocumentOutline {
    /// The sentinel result for a document with no usable content.
    pub fn unknown() -> Self {
        Self {
            title: UNKNOWN_TITLE.to_string(),
            outline: Vec::new(),
        }
    }
}

/// Index of the title line in the typographic pipeline: the first page-one
/// line classified H1, in document order.
pub fn select_title_plain(
    lines: &[TextLine],
    levels: &[Option<HeadingLevel>],
) -> Option<usize> {
    lines
        .iter()
        .zip(levels.iter())
        .position(|(line, level)| line.page == 1 && *level == Some(HeadingLevel::H1))
}

/// Assemble the typographic-pipeline outline: entries in document
/// appearance order, minus the title line.
pub fn assemble_plain(lines: &[TextLine], levels: &[Option<HeadingLevel>]) -> DocumentOutline {
    let title_idx = select_title_plain(lines, levels);
    let title = match title_idx {
        Some(i) => lines[i].text.clone(),
        None => UNKNOWN_TITLE.to_string(),
    };

    let outline = lines
        .iter()
        .zip(levels.iter())
        .enumerate()
        .filter_map(|(i, (line, level))| {
            let level = (*level)?;
            if Some(i) == title_idx {
                return None;
            }
            Some(OutlineEntry {
                level,
                text: line.text.clone(),
                page: line.page,
            })
        })
        .collect();

    DocumentOutline { title, outline }
}

/// Index of the title line in the semantic pipeline: among page-one lines
/// above the Y limit, the first whose font size sits within tolerance of
/// that region's maximum and whose word count is small.
pub fn select_title_semantic(lines: &[TextLine], config: &ExtractionConfig) -> Option<usize> {
    let top: Vec<usize> = (0..lines.len())
        .filter(|&i| lines[i].page == 1 && lines[i].y < config.title_y_limit)
        .collect();

    let max_font = top
        .iter()
        .map(|&i| lines[i].font_size)
        .max_by(|a, b| safe_float_cmp(*a, *b))?;

    top.into_iter().find(|&i| {
        (lines[i].font_size - max_font).abs() < config.heading_font_tolerance
            && lines[i].word_count <= config.heading_max_words
    })
}

/// Assemble the semantic-pipeline outline.
///
/// Entries whose text equals the title are dropped to avoid duplication.
/// Ordering is `(page ascending, text lexicographic ascending)`, a
/// deterministic tie-break that does not follow visual order.
pub fn assemble_semantic(
    lines: &[TextLine],
    levels: &[Option<HeadingLevel>],
    config: &ExtractionConfig,
) -> DocumentOutline {
    let title = match select_title_semantic(lines, config) {
        Some(i) => lines[i].text.clone(),
        None => UNKNOWN_TITLE.to_string(),
    };

    let mut outline: Vec<OutlineEntry> = lines
        .iter()
        .zip(levels.iter())
        .filter_map(|(line, level)| {
            let level = (*level)?;
            if line.text == title {
                return None;
            }
            Some(OutlineEntry {
                level,
                text: line.text.clone(),
                page: line.page,
            })
        })
        .collect();
    outline.sort_by(|a, b| (a.page, &a.text).cmp(&(b.page, &b.text)));

    DocumentOutline { title, outline }
}
