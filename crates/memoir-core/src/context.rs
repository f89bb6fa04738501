//! Context windows around a selection, used when building edit and
//! expansion-question prompts.

use serde::Serialize;

/// Default number of chars taken on each side of the selection.
pub const DEFAULT_CONTEXT_RADIUS: usize = 500;

/// Text immediately surrounding a selection, trimmed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContextWindow {
    pub before: String,
    pub after: String,
}

impl ContextWindow {
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }
}

/// Extract up to `radius` chars before and after the first occurrence of
/// `selected` in `document`.
///
/// Returns an empty window when either input is empty or the selection is
/// not present. Never reads past the document bounds.
///
/// ```rust
/// use memoir_core::context::extract_context;
///
/// let ctx = extract_context("one two three four five", "three", 5);
/// assert_eq!(ctx.before, "two");
/// assert_eq!(ctx.after, "four");
/// ```
pub fn extract_context(document: &str, selected: &str, radius: usize) -> ContextWindow {
    if document.is_empty() || selected.is_empty() {
        return ContextWindow::default();
    }
    let Some(start) = document.find(selected) else {
        return ContextWindow::default();
    };
    let end = start + selected.len();

    let before_start = document[..start]
        .char_indices()
        .rev()
        .take(radius)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(start);
    let after_end = document[end..]
        .char_indices()
        .nth(radius)
        .map(|(i, _)| end + i)
        .unwrap_or(document.len());

    ContextWindow {
        before: document[before_start..start].trim().to_string(),
        after: document[end..after_end].trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_clamped_at_bounds() {
        let ctx = extract_context("abc TARGET xyz", "TARGET", 500);
        assert_eq!(ctx.before, "abc");
        assert_eq!(ctx.after, "xyz");
    }

    #[test]
    fn test_context_respects_radius_in_chars() {
        let doc = "가나다라마바사 선택 아자차카타파하";
        let ctx = extract_context(doc, "선택", 3);
        assert_eq!(ctx.before, "바사");
        assert_eq!(ctx.after, "아자");
    }

    #[test]
    fn test_context_missing_selection_is_empty() {
        let ctx = extract_context("some document", "absent", 200);
        assert!(ctx.is_empty());
    }

    #[test]
    fn test_context_empty_inputs() {
        assert!(extract_context("", "x", 10).is_empty());
        assert!(extract_context("doc", "", 10).is_empty());
    }

    #[test]
    fn test_context_zero_radius() {
        let ctx = extract_context("before mid after", "mid", 0);
        assert!(ctx.is_empty());
    }
}
