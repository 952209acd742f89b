//! Document model: ordered paragraphs of lines plus aggregate statistics.

use crate::line::{Line, CLEAN_GRADE, GARBAGE_GRADE};
use crate::stats::Statistics;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

pub const DOC_STAT_KEYS: [&str; 7] = [
    "line_nb",
    "line_avg_length",
    "line_total_length",
    "word_avg_length",
    "word_total_length",
    "word_avg_nb",
    "word_total_nb",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub lines: Vec<Line>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Caller-supplied identifier, used for logging only.
    pub name: String,
    pub paragraphs: Vec<Paragraph>,
    stats: Statistics,
    /// sha-256 of the raw input, hex-encoded. Guards repeated ingestion.
    checksum: String,
}

/// Classification quality against the expected labels, where garbage
/// detection is the positive class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub classified: usize,
    pub unclassified: usize,
    pub unrated: usize,
    pub true_positive: usize,
    pub false_positive: usize,
    pub true_negative: usize,
    pub false_negative: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl Document {
    /// Build a document from unlabelled paragraphs of raw line strings.
    pub fn from_paragraphs(name: impl Into<String>, paragraphs: Vec<Vec<String>>) -> Self {
        let labelled = paragraphs
            .into_iter()
            .map(|lines| lines.into_iter().map(|text| (text, None)).collect())
            .collect();
        Self::from_labelled_paragraphs(name, labelled)
    }

    /// Build a document from paragraphs with optional expected labels.
    pub fn from_labelled_paragraphs(
        name: impl Into<String>,
        paragraphs: Vec<Vec<(String, Option<i32>)>>,
    ) -> Self {
        let mut hasher = Sha256::new();
        let mut built: Vec<Paragraph> = Vec::new();

        for raw_lines in &paragraphs {
            let mut lines = Vec::new();
            for (text, expected) in raw_lines {
                if text.is_empty() {
                    continue;
                }
                hasher.update(text.as_bytes());
                hasher.update(b"\n");
                lines.push(Line::with_expected(text, *expected));
            }
            hasher.update(b"\n");
            if !lines.is_empty() {
                built.push(Paragraph { lines });
            }
        }

        let stats = aggregate_stats(&built);

        Self {
            name: name.into(),
            paragraphs: built,
            stats,
            checksum: format!("{:x}", hasher.finalize()),
        }
    }

    pub fn stats(&self) -> &Statistics {
        &self.stats
    }

    pub fn checksum(&self) -> &str {
        &self.checksum
    }

    pub fn lines(&self) -> impl Iterator<Item = &Line> {
        self.paragraphs.iter().flat_map(|p| p.lines.iter())
    }

    pub fn lines_mut(&mut self) -> impl Iterator<Item = &mut Line> {
        self.paragraphs.iter_mut().flat_map(|p| p.lines.iter_mut())
    }

    /// Corrected surfaces of clean lines, paragraph breaks kept as empty
    /// entries.
    pub fn clean_lines(&self) -> Vec<String> {
        self.select_lines(|line| line.grade() == CLEAN_GRADE, Line::clean_line)
    }

    /// Original surfaces of garbage lines.
    pub fn garbage_lines(&self) -> Vec<String> {
        self.select_lines(|line| line.grade() == GARBAGE_GRADE, Line::orig_line)
    }

    /// Original surfaces of lines the pipeline could not classify.
    pub fn unclassified_lines(&self) -> Vec<String> {
        self.select_lines(Line::is_undetermined, Line::orig_line)
    }

    fn select_lines(
        &self,
        keep: impl Fn(&Line) -> bool,
        render: impl Fn(&Line) -> String,
    ) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for paragraph in &self.paragraphs {
            for line in &paragraph.lines {
                if keep(line) {
                    out.push(render(line));
                }
            }
            if matches!(out.last(), Some(last) if !last.is_empty()) {
                out.push(String::new());
            }
        }
        out
    }

    /// Compare assigned grades against expected labels.
    pub fn score_report(&self) -> ScoreReport {
        let mut report = ScoreReport::default();

        for line in self.lines() {
            if line.is_undetermined() {
                report.unclassified += 1;
                continue;
            }
            let expected = match line.expected {
                Some(label) if label >= 0 => label,
                _ => {
                    report.unrated += 1;
                    continue;
                }
            };
            report.classified += 1;

            if line.grade() == GARBAGE_GRADE {
                if expected == 1 {
                    report.false_positive += 1;
                } else {
                    report.true_positive += 1;
                }
            } else if expected == 1 {
                report.true_negative += 1;
            } else {
                report.false_negative += 1;
            }
        }

        let positives = report.true_positive + report.false_positive;
        if positives != 0 {
            report.precision = report.true_positive as f64 / positives as f64;
        }
        let relevant = report.true_positive + report.false_negative;
        if relevant != 0 {
            report.recall = report.true_positive as f64 / relevant as f64;
        }
        if report.precision + report.recall != 0.0 {
            report.f1 =
                2.0 * report.precision * report.recall / (report.precision + report.recall);
        }

        report
    }
}

fn aggregate_stats(paragraphs: &[Paragraph]) -> Statistics {
    let mut stats = Statistics::new(&DOC_STAT_KEYS);

    let mut line_nb = 0.0;
    let mut line_total = 0.0;
    let mut word_nb = 0.0;
    let mut word_total = 0.0;

    for paragraph in paragraphs {
        for line in &paragraph.lines {
            line_nb += 1.0;
            line_total += line.char_len() as f64;
            word_nb += line.tokens.len() as f64;
            word_total += line
                .tokens
                .iter()
                .map(|t| t.original.chars().count() as f64)
                .sum::<f64>();
        }
    }

    stats.set("line_nb", line_nb).expect("declared key");
    stats.set("line_total_length", line_total).expect("declared key");
    stats.set("word_total_nb", word_nb).expect("declared key");
    stats.set("word_total_length", word_total).expect("declared key");
    if line_nb > 0.0 {
        stats
            .set("line_avg_length", line_total / line_nb)
            .expect("declared key");
        stats
            .set("word_avg_nb", word_nb / line_nb)
            .expect("declared key");
    }
    if word_nb > 0.0 {
        stats
            .set("word_avg_length", word_total / word_nb)
            .expect("declared key");
    }

    stats
}
