//! Classified-output writer: one file per grade bucket.

use anyhow::{Context, Result};
use denoiser_core::Document;
use std::path::Path;
use tracing::info;

/// Write `<name>.clean.txt`, `<name>.garbage.txt` and
/// `<name>.unclassified.txt` into the output directory.
pub fn write_sections(document: &Document, out_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let sections = [
        ("clean", document.clean_lines()),
        ("garbage", document.garbage_lines()),
        ("unclassified", document.unclassified_lines()),
    ];

    for (bucket, lines) in sections {
        let path = out_dir.join(format!("{}.{bucket}.txt", document.name));
        let mut content = lines.join("\n");
        if !content.is_empty() {
            content.push('\n');
        }
        std::fs::write(&path, content)
            .with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), lines = lines.len(), "section written");
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buckets_land_in_separate_files() {
        let mut doc = denoiser_core::Document::from_paragraphs(
            "sample",
            vec![vec!["keep me".to_string(), "drop me".to_string()]],
        );
        {
            let mut lines = doc.lines_mut();
            lines.next().unwrap().set_clean();
            lines.next().unwrap().set_garbage();
        }

        let dir = tempfile::tempdir().unwrap();
        write_sections(&doc, dir.path()).unwrap();

        let clean = std::fs::read_to_string(dir.path().join("sample.clean.txt")).unwrap();
        let garbage =
            std::fs::read_to_string(dir.path().join("sample.garbage.txt")).unwrap();
        assert!(clean.starts_with("keep me"));
        assert!(garbage.starts_with("drop me"));
    }
}
