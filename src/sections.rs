//! Page-scoped section segmentation.
//!
//! Partitions each page's lines into contiguous sections anchored by
//! heading-like lines: lines whose font size sits within one point of the
//! page maximum and whose word count stays small. Sections never span
//! pages. A page with no heading-like line contributes no sections; that
//! page is invisible to relevance ranking, a known boundary of the
//! heuristic rather than something to patch over.

use serde::{Deserialize, Serialize};

use crate::config::ExtractionConfig;
use crate::extract::TextLine;
use crate::utils::safe_float_cmp;

/// A page-scoped block of text anchored by one heading line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    /// Caller-supplied document identifier
    pub document: String,
    /// 1-based page number
    pub page: u32,
    /// Text of the anchoring heading line
    pub title: String,
    /// Space-joined text from the heading up to the next heading or the
    /// page boundary
    pub text: String,
}

/// Segment a document's lines into sections, page by page.
///
/// `lines` must be in page-ascending, in-page reading order, as produced by
/// [`crate::extract::extract_lines`].
pub fn segment_document(
    document: &str,
    lines: &[TextLine],
    config: &ExtractionConfig,
) -> Vec<Section> {
    let mut sections = Vec::new();

    let mut start = 0usize;
    while start < lines.len() {
        let page = lines[start].page;
        let mut end = start;
        while end < lines.len() && lines[end].page == page {
            end += 1;
        }
        segment_page(document, &lines[start..end], config, &mut sections);
        start = end;
    }

    log::debug!("segmented {:?} into {} section(s)", document, sections.len());
    sections
}

/// Segment one page's lines, appending to `sections`.
fn segment_page(
    document: &str,
    page_lines: &[TextLine],
    config: &ExtractionConfig,
    sections: &mut Vec<Section>,
) {
    let max_font = page_lines
        .iter()
        .map(|l| l.font_size)
        .max_by(|a, b| safe_float_cmp(*a, *b));
    let max_font = match max_font {
        Some(m) => m,
        None => return,
    };

    let mut anchors: Vec<usize> = page_lines
        .iter()
        .enumerate()
        .filter(|(_, l)| {
            l.font_size >= max_font - config.heading_font_tolerance
                && l.word_count <= config.heading_max_words
        })
        .map(|(i, _)| i)
        .collect();
    if anchors.is_empty() {
        return;
    }
    // Sentinel end index closes the final section at the page boundary
    anchors.push(page_lines.len());

    for pair in anchors.windows(2) {
        let (i, j) = (pair[0], pair[1]);
        let text = page_lines[i..j]
            .iter()
            .map(|l| l.text.as_str())
            .collect::<Vec<_>>()
            .join(" ");
        sections.push(Section {
            document: document.to_string(),
            page: page_lines[i].page,
            title: page_lines[i].text.clone(),
            text,
        });
    }
}
