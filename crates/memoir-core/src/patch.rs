//! Selection patching: relocate a previously selected passage and replace it.
//!
//! Selections are captured from a live view that can lag behind edits (an
//! AI rewrite may land between "user selects text" and "replacement
//! arrives"), so the selected text is located with a three-tier fallback
//! rather than trusted by offset.
//!
//! # Algorithm
//!
//! 1. **Exact**: if the advisory offsets still delimit the selection text,
//!    that occurrence is used; otherwise the first literal occurrence.
//! 2. **Normalized**: whitespace runs are collapsed in both texts; on a hit,
//!    the trimmed selection is rebuilt as a regex (tokens escaped, joined by
//!    `\s+`) and its first match in the original document is replaced.
//! 3. **Boundary**: the first and last [`BOUNDARY_CHARS`] chars of the
//!    trimmed selection anchor the span, so edits inside a long selection
//!    are tolerated.
//!
//! If every tier misses, [`PatchError::NotFound`] is returned. A patch is
//! never partially applied and the input document is never modified.
//!
//! # Example
//!
//! ```rust
//! use memoir_core::{apply, Selection};
//!
//! let doc = "제1장: 시작\n\n어릴 때 나는 작은 마을에 살았다.";
//! let sel = Selection::with_offsets("작은 마을에 살았다", 20, 30);
//! let out = apply(doc, &sel, "작은 바닷가 마을에서 자랐다").unwrap();
//! assert_eq!(out, "제1장: 시작\n\n어릴 때 나는 작은 바닷가 마을에서 자랐다.");
//! ```

use std::ops::Range;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::models::{Patch, Selection};

/// Number of chars used as head/tail anchors by the boundary tier.
pub const BOUNDARY_CHARS: usize = 50;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    /// No tier could locate the selection. Recoverable: ask the user to
    /// reselect.
    #[error("selection could not be located, please reselect")]
    NotFound,
    /// Empty selection or replacement, rejected before any search.
    #[error("invalid patch input: {field} is empty")]
    Malformed { field: &'static str },
}

/// Which fallback tier located the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Exact,
    Normalized,
    Boundary,
}

/// A successfully patched document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Patched {
    pub document: String,
    pub tier: MatchTier,
    /// Char range of the input document that was replaced, in the same
    /// units as [`Selection`] offsets.
    pub replaced: Range<usize>,
}

/// Replace `selection` in `document` with `replacement`.
///
/// Convenience wrapper over [`apply_patch`] returning only the new document.
pub fn apply(document: &str, selection: &Selection, replacement: &str) -> Result<String, PatchError> {
    let patch = Patch {
        selection: selection.clone(),
        replacement: replacement.to_string(),
    };
    apply_patch(document, &patch).map(|p| p.document)
}

/// Locate the patch's selection in `document` and build the patched text.
pub fn apply_patch(document: &str, patch: &Patch) -> Result<Patched, PatchError> {
    let text = patch.selection.text.as_str();
    if text.trim().is_empty() {
        return Err(PatchError::Malformed { field: "selection" });
    }
    if patch.replacement.trim().is_empty() {
        return Err(PatchError::Malformed {
            field: "replacement",
        });
    }

    let located = locate_exact(document, &patch.selection)
        .map(|r| (MatchTier::Exact, r))
        .or_else(|| locate_normalized(document, text).map(|r| (MatchTier::Normalized, r)))
        .or_else(|| locate_boundary(document, text).map(|r| (MatchTier::Boundary, r)));

    let Some((tier, replaced)) = located else {
        debug!(
            selection_chars = text.chars().count(),
            document_chars = document.chars().count(),
            "selection not found by any tier"
        );
        return Err(PatchError::NotFound);
    };

    let mut out =
        String::with_capacity(document.len() - replaced.len() + patch.replacement.len());
    out.push_str(&document[..replaced.start]);
    out.push_str(&patch.replacement);
    out.push_str(&document[replaced.end..]);

    let start = document[..replaced.start].chars().count();
    let end = start + document[replaced.clone()].chars().count();
    debug!(?tier, start, end, "selection patched");

    Ok(Patched {
        document: out,
        tier,
        replaced: start..end,
    })
}

fn locate_exact(document: &str, selection: &Selection) -> Option<Range<usize>> {
    if let Some(range) = hinted_range(document, selection) {
        return Some(range);
    }
    let text = &selection.text;
    document.find(text.as_str()).map(|start| start..start + text.len())
}

/// The byte range named by the selection's offsets, if it still holds the
/// selected text.
fn hinted_range(document: &str, selection: &Selection) -> Option<Range<usize>> {
    if selection.approx_end <= selection.approx_start {
        return None;
    }
    let start = char_to_byte(document, selection.approx_start)?;
    let end = char_to_byte(document, selection.approx_end)?;
    (document[start..end] == selection.text).then_some(start..end)
}

fn locate_normalized(document: &str, text: &str) -> Option<Range<usize>> {
    let needle = collapse_whitespace(text.trim());
    if !collapse_whitespace(document).contains(&needle) {
        return None;
    }

    let pattern = text
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+");
    let re = Regex::new(&pattern).ok()?;
    re.find(document).map(|m| m.range())
}

fn locate_boundary(document: &str, text: &str) -> Option<Range<usize>> {
    let trimmed = text.trim();
    let head = prefix_chars(trimmed, BOUNDARY_CHARS);
    let start = document.find(head)?;
    let head_end = start + head.len();

    let end = if trimmed.chars().count() > BOUNDARY_CHARS {
        let tail = suffix_chars(trimmed, BOUNDARY_CHARS);
        head_end + document[head_end..].find(tail)? + tail.len()
    } else {
        char_to_byte(&document[start..], text.chars().count())
            .map(|offset| start + offset)
            .unwrap_or(document.len())
    };

    (end > start).then_some(start..end)
}

/// Collapse every whitespace run to a single space.
fn collapse_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Byte index of the `n`th char; `n == char count` maps to the end.
pub(crate) fn char_to_byte(s: &str, n: usize) -> Option<usize> {
    s.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(s.len()))
        .nth(n)
}

fn prefix_chars(s: &str, n: usize) -> &str {
    &s[..char_to_byte(s, n).unwrap_or(s.len())]
}

fn suffix_chars(s: &str, n: usize) -> &str {
    let skip = s.chars().count().saturating_sub(n);
    &s[char_to_byte(s, skip).unwrap_or(0)..]
}
