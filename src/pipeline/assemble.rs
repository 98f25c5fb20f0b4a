//! Document assembly: fold ordered page outcomes into the final
//! plain-text, markdown, and layout-JSON representations.
//!
//! Assembly is pure — no I/O, no engine calls — which is why most of this
//! crate's behavioural tests live here. Failed pages are never dropped:
//! they keep their page position and render as an inline marker naming the
//! page and the short failure cause, so a reader of the output can always
//! tell a blank page from a lost one.

use crate::output::{LayoutArtifact, LayoutPage, PageOutcome};

/// Assemble the plain-text document.
///
/// Each page renders as a `===== Page N =====` delimiter line followed by
/// its text (or a failure marker). Blocks are joined with a single newline,
/// trailing whitespace is stripped, and one final newline is appended.
pub(crate) fn build_text(outcomes: &[PageOutcome]) -> String {
    let mut blocks = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        let body = match &outcome.error {
            Some(e) => failure_marker(outcome.page, e.cause()),
            None => outcome.text.clone(),
        };
        blocks.push(format!("===== Page {} =====\n{}", outcome.page, body));
    }
    let mut doc = blocks.join("\n").trim_end().to_string();
    doc.push('\n');
    doc
}

/// Assemble the markdown document.
///
/// One `## Page N` section per page. An empty page body renders as
/// `_No text recognized._`; a failed page renders its marker italicised.
/// Sections are joined with a blank line and the document ends in a
/// newline.
pub(crate) fn build_markdown(outcomes: &[PageOutcome]) -> String {
    let mut blocks = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        let body = match &outcome.error {
            Some(e) => format!("_{}_", failure_marker(outcome.page, e.cause())),
            None if outcome.text.trim().is_empty() => "_No text recognized._".to_string(),
            None => outcome.text.clone(),
        };
        blocks.push(format!("## Page {}\n\n{}", outcome.page, body));
    }
    let mut doc = blocks.join("\n\n").trim_end().to_string();
    doc.push('\n');
    doc
}

/// Assemble the layout artifact from the successful outcomes only.
///
/// Page indices are 0-based in the artifact, matching the on-disk format
/// consumers already parse.
pub(crate) fn build_layout(
    outcomes: &[PageOutcome],
    file: &str,
    dpi: u32,
    lang: &str,
) -> LayoutArtifact {
    let pages = outcomes
        .iter()
        .filter(|o| o.succeeded())
        .map(|o| LayoutPage {
            index: o.page - 1,
            width: o.width,
            height: o.height,
            lines: o.lines.clone(),
        })
        .collect();
    LayoutArtifact {
        file: file.to_string(),
        dpi,
        lang: lang.to_string(),
        pages,
    }
}

fn failure_marker(page: usize, cause: &str) -> String {
    format!("[OCR failed for page {page}: {cause}]")
}
