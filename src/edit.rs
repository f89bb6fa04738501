//! Manuscript editing commands: `memoir patch`, `memoir context`, and
//! `memoir intent`.
//!
//! Patches are applied through a [`ManuscriptStore`], so a batch of patches
//! always operates on the document produced by the previous one.

use anyhow::{bail, Context, Result};
use memoir_core::context::extract_context;
use memoir_core::{EditIntent, ManuscriptStore, Patch, Selection};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::{Config, MAX_CONTEXT_RADIUS, MIN_CONTEXT_RADIUS};

pub fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

/// Where the patches for `memoir patch` come from.
pub enum PatchSource {
    Single {
        selection: String,
        replacement: String,
        start: Option<usize>,
        end: Option<usize>,
        request: Option<String>,
    },
    /// JSON array of `{ "selection": {...}, "replacement": "..." }`.
    File(PathBuf),
}

impl PatchSource {
    fn load(self) -> Result<(Vec<Patch>, Option<String>)> {
        match self {
            PatchSource::Single {
                selection,
                replacement,
                start,
                end,
                request,
            } => {
                let selection = match (start, end) {
                    (Some(s), Some(e)) => Selection::with_offsets(selection, s, e),
                    (None, None) => Selection::new(selection),
                    _ => bail!("--start and --end must be given together"),
                };
                Ok((
                    vec![Patch {
                        selection,
                        replacement,
                    }],
                    request,
                ))
            }
            PatchSource::File(path) => {
                let raw = read_text(&path)?;
                let patches: Vec<Patch> = serde_json::from_str(&raw)
                    .with_context(|| format!("Failed to parse patches in {}", path.display()))?;
                Ok((patches, None))
            }
        }
    }
}

/// Apply one or more patches and return the final document.
///
/// Stops at the first patch that fails; nothing is written in that case.
pub fn patch_document(
    config: &Config,
    document: String,
    patches: &[Patch],
    request: Option<&str>,
) -> Result<ManuscriptStore> {
    if patches.is_empty() {
        bail!("no patches to apply");
    }
    let mut store = ManuscriptStore::with_capacity(document, config.history.max_entries);
    for (i, patch) in patches.iter().enumerate() {
        let patched = store
            .apply_edit(patch, request)
            .with_context(|| format!("patch {} of {}", i + 1, patches.len()))?;
        info!(
            patch = i + 1,
            tier = ?patched.tier,
            start = patched.replaced.start,
            end = patched.replaced.end,
            "patch applied"
        );
    }
    Ok(store)
}

/// One line per applied patch: tier and the span that was actually replaced.
pub fn patch_summary(store: &ManuscriptStore) -> Vec<String> {
    store
        .entries()
        .iter()
        .filter_map(|entry| entry.detail.as_ref())
        .map(|d| {
            format!(
                "patched ({:?}): {} chars replaced at {}..{}",
                d.tier,
                d.replaced.len(),
                d.replaced.start,
                d.replaced.end
            )
        })
        .collect()
}

pub fn run_patch(
    config: &Config,
    document: &Path,
    source: PatchSource,
    output: Option<&Path>,
) -> Result<()> {
    let text = read_text(document)?;
    let (patches, request) = source.load()?;
    let store = patch_document(config, text, &patches, request.as_deref())?;

    for line in patch_summary(&store) {
        eprintln!("{}", line);
    }

    match output {
        Some(path) => {
            std::fs::write(path, store.current())
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("wrote {}", path.display());
        }
        None => print!("{}", store.current()),
    }
    Ok(())
}

#[derive(Serialize)]
struct ContextReport<'a> {
    selection: &'a str,
    radius: usize,
    found: bool,
    before: String,
    after: String,
}

pub fn run_context(
    config: &Config,
    document: &Path,
    selection: &str,
    radius: Option<usize>,
) -> Result<()> {
    let radius = radius.unwrap_or(config.context.radius);
    if !(MIN_CONTEXT_RADIUS..=MAX_CONTEXT_RADIUS).contains(&radius) {
        bail!(
            "--radius must be in [{}, {}]",
            MIN_CONTEXT_RADIUS,
            MAX_CONTEXT_RADIUS
        );
    }
    let text = read_text(document)?;
    let window = extract_context(&text, selection, radius);

    let report = ContextReport {
        selection,
        radius,
        found: !selection.is_empty() && text.contains(selection),
        before: window.before,
        after: window.after,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub fn run_intent(request: &str) -> Result<()> {
    println!("{}", EditIntent::classify(request).as_str());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use memoir_core::MatchTier;

    fn patch(text: &str, replacement: &str) -> Patch {
        Patch {
            selection: Selection::new(text),
            replacement: replacement.to_string(),
        }
    }

    #[test]
    fn test_patch_batch_applies_in_order() {
        let store = patch_document(
            &Config::minimal(),
            "봄에 이사를 했다. 여름에는 바다에 갔다.".to_string(),
            &[patch("봄에", "1982년 봄에"), patch("1982년 봄에 이사를", "1982년 봄에 서울로 이사를")],
            None,
        )
        .unwrap();
        assert_eq!(store.current(), "1982년 봄에 서울로 이사를 했다. 여름에는 바다에 갔다.");
        assert_eq!(store.entries().len(), 3);
    }

    #[test]
    fn test_patch_batch_reports_failing_patch() {
        let err = patch_document(
            &Config::minimal(),
            "hello world".to_string(),
            &[patch("hello", "hi"), patch("missing", "x")],
            None,
        )
        .unwrap_err();
        assert!(format!("{:#}", err).contains("patch 2 of 2"));
        assert!(format!("{:#}", err).contains("please reselect"));
    }

    #[test]
    fn test_single_source_requires_both_offsets() {
        let source = PatchSource::Single {
            selection: "a".into(),
            replacement: "b".into(),
            start: Some(1),
            end: None,
            request: None,
        };
        assert!(source.load().is_err());
    }

    #[test]
    fn test_summary_counts_replaced_span() {
        let head = "그해 여름 우리는 바닷가 작은 마을로 이사를 했고 아버지는 그곳에서 배를 타기 시작하셨다.";
        let tail = "저녁이면 온 가족이 마루에 앉아 파도 소리를 들으며 하루 이야기를 나누곤 했다.";
        let document = format!("서문. {head} 어머니는 읍내 시장에서 생선을 파셨다. {tail} 끝.");
        let selection = format!("{head} 어머니는 장터에서 생선을 파셨다. {tail}");

        let store = patch_document(&Config::minimal(), document.clone(), &[patch(&selection, "요약")], None)
            .unwrap();
        let detail = store.entries()[1].detail.as_ref().unwrap();
        assert_eq!(detail.tier, MatchTier::Boundary);

        let replaced_chars = document.chars().count() - "서문.  끝.".chars().count();
        assert_ne!(replaced_chars, selection.chars().count());
        assert_eq!(
            patch_summary(&store),
            vec![format!(
                "patched (Boundary): {} chars replaced at 4..{}",
                replaced_chars,
                4 + replaced_chars
            )]
        );
    }

    #[test]
    fn test_context_radius_flag_is_range_checked() {
        let err = run_context(&Config::minimal(), Path::new("unused.txt"), "x", Some(1000)).unwrap_err();
        assert!(err.to_string().contains("--radius"));
        let err = run_context(&Config::minimal(), Path::new("unused.txt"), "x", Some(10)).unwrap_err();
        assert!(err.to_string().contains("--radius"));
    }

    #[test]
    fn test_whitespace_tolerant_batch() {
        let store = patch_document(
            &Config::minimal(),
            "그날   아침\n비가 왔다.".to_string(),
            &[patch("그날 아침 비가", "그날 새벽 비가")],
            Some("수정"),
        )
        .unwrap();
        assert_eq!(store.current(), "그날 새벽 비가 왔다.");
        let detail = store.entries()[1].detail.as_ref().unwrap();
        assert_eq!(detail.tier, MatchTier::Normalized);
    }
}
