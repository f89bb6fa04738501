//! Chapter structure of a generated manuscript.
//!
//! Manuscripts are plain text where each chapter starts with a heading line
//! such as `제3장: 첫 직장` or `Chapter 3: First Job`. Text before the first
//! heading is a preamble and belongs to no chapter.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Lines this long or longer are prose, even if they start like a heading.
pub const MAX_HEADING_CHARS: usize = 200;

static HEADING_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^(?:제\s*(\d+)\s*장|(?i:chapter)\s*(\d+))[:.]?\s*(.*)$").expect("heading regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub number: u32,
    pub title: String,
    pub body: String,
    /// Char offset of the heading line within the source document.
    #[serde(default)]
    pub offset: usize,
}

fn heading(line: &str) -> Option<(u32, String)> {
    let line = line.trim();
    if line.chars().count() >= MAX_HEADING_CHARS {
        return None;
    }
    let caps = HEADING_RE.captures(line)?;
    let number = caps.get(1).or_else(|| caps.get(2))?.as_str().parse().ok()?;
    let title = caps.get(3).map_or("", |m| m.as_str()).trim().to_string();
    Some((number, title))
}

/// Split a manuscript into chapters at heading lines.
pub fn parse_chapters(document: &str) -> Vec<Chapter> {
    let mut chapters: Vec<Chapter> = Vec::new();
    let mut body: Vec<&str> = Vec::new();
    let mut offset = 0;

    for line in document.split('\n') {
        if let Some((number, title)) = heading(line) {
            if let Some(last) = chapters.last_mut() {
                last.body = body.join("\n").trim().to_string();
            }
            body.clear();
            chapters.push(Chapter {
                number,
                title,
                body: String::new(),
                offset,
            });
        } else if !chapters.is_empty() {
            body.push(line);
        }
        offset += line.chars().count() + 1;
    }
    if let Some(last) = chapters.last_mut() {
        last.body = body.join("\n").trim().to_string();
    }
    chapters
}

/// Render chapters as `제N장: Title` blocks separated by blank lines.
pub fn compose(chapters: &[Chapter]) -> String {
    chapters
        .iter()
        .map(|c| format!("제{}장: {}\n\n{}", c.number, c.title, c.body))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The chapter containing char offset `offset`, if any.
pub fn chapter_at(chapters: &[Chapter], offset: usize) -> Option<&Chapter> {
    chapters.iter().rev().find(|c| c.offset <= offset)
}
