//! Input adapters: plain text and labelled CSV to `Document`.

use anyhow::{Context, Result};
use denoiser_core::Document;
use std::collections::BTreeSet;
use std::path::Path;

/// Load a newline-separated accepted-word list.
pub fn read_word_list(path: &Path) -> Result<BTreeSet<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading word list {}", path.display()))?;
    Ok(content
        .lines()
        .map(|line| line.trim_end_matches(['\r', '\n']).to_string())
        .filter(|line| !line.is_empty())
        .collect())
}

fn doc_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Plain text: blank lines separate paragraphs.
pub fn read_txt(path: &Path) -> Result<Document> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;

    let mut paragraphs: Vec<Vec<String>> = Vec::new();
    let mut paragraph: Vec<String> = Vec::new();

    for raw in content.lines() {
        let line = raw.trim_matches([' ', '\t', '\r']);
        if line.is_empty() {
            if !paragraph.is_empty() {
                paragraphs.push(std::mem::take(&mut paragraph));
            }
            continue;
        }
        paragraph.push(line.to_string());
    }
    if !paragraph.is_empty() {
        paragraphs.push(paragraph);
    }

    Ok(Document::from_paragraphs(doc_name(path), paragraphs))
}

/// Two-column CSV: line text and expected label. Rows of any other width
/// act as paragraph breaks, as do empty lines.
pub fn read_csv(path: &Path) -> Result<Document> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("reading {}", path.display()))?;

    let mut paragraphs: Vec<Vec<(String, Option<i32>)>> = Vec::new();
    let mut paragraph: Vec<(String, Option<i32>)> = Vec::new();

    for record in reader.records() {
        let record = record.with_context(|| format!("parsing {}", path.display()))?;
        if record.len() != 2 {
            if !paragraph.is_empty() {
                paragraphs.push(std::mem::take(&mut paragraph));
            }
            continue;
        }

        let line = record[0].trim_matches([' ', '\t', '\r']).to_string();
        if line.is_empty() {
            if !paragraph.is_empty() {
                paragraphs.push(std::mem::take(&mut paragraph));
            }
            continue;
        }

        let label = record[1].trim().parse::<i32>().ok();
        paragraph.push((line, label));
    }
    if !paragraph.is_empty() {
        paragraphs.push(paragraph);
    }

    Ok(Document::from_labelled_paragraphs(doc_name(path), paragraphs))
}
