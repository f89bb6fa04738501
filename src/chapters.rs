use anyhow::{bail, Result};
use memoir_core::manuscript::{chapter_at, parse_chapters};
use std::path::Path;

use crate::edit::read_text;

pub fn run_chapters(document: &Path, at: Option<usize>) -> Result<()> {
    let text = read_text(document)?;
    let chapters = parse_chapters(&text);

    if let Some(offset) = at {
        match chapter_at(&chapters, offset) {
            Some(c) => println!("{} {}", c.number, c.title),
            None => bail!("offset {} is not inside any chapter", offset),
        }
        return Ok(());
    }

    if chapters.is_empty() {
        println!("No chapters.");
        return Ok(());
    }

    println!("{:<8} {:<10} TITLE", "CHAPTER", "CHARS");
    for c in &chapters {
        println!("{:<8} {:<10} {}", c.number, c.body.chars().count(), c.title);
    }
    Ok(())
}
