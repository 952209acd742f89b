//! Rule-based line classification.
//!
//! Indicators are a closed variant set: a statistics predicate over the
//! line's cleaned character profile, or an anchored pattern over the cleaned
//! surface. Two bundles vote — strong indicators detect garbage, clean
//! indicators detect good lines — and a smoothing pass drags the grades of
//! lines adjacent to garbage downward.

use crate::document::Document;
use crate::line::{Line, CLEAN_GRADE, GARBAGE_GRADE};
use crate::stats::Statistics;
use regex::Regex;

/// Statistics-based predicates.
#[derive(Debug, Clone)]
pub enum StatsRule {
    /// Special characters dominate the cleaned surface.
    SpecialRatio { threshold: f64 },
    /// The line is long enough and one letter case dominates it.
    LetterDominance {
        min_length_ratio: f64,
        threshold: f64,
    },
}

#[derive(Debug, Clone)]
pub enum Indicator {
    Stats(StatsRule),
    Pattern(Regex),
}

impl Indicator {
    pub fn matches(&self, line: &Line, doc_stats: &Statistics) -> bool {
        match self {
            Indicator::Stats(rule) => rule.matches(line, doc_stats),
            Indicator::Pattern(pattern) => pattern.is_match(&line.clean_line()),
        }
    }
}

impl StatsRule {
    fn matches(&self, line: &Line, doc_stats: &Statistics) -> bool {
        let clean = line.clean_stats();
        let lw = clean.get("lw_char").unwrap_or(0.0);
        let up = clean.get("up_char").unwrap_or(0.0);
        let nb = clean.get("nb_char").unwrap_or(0.0);
        let sp = clean.get("sp_char").unwrap_or(0.0);
        let total = lw + up + nb + sp;

        match self {
            StatsRule::SpecialRatio { threshold } => {
                total > 0.0 && sp / total > *threshold
            }
            StatsRule::LetterDominance {
                min_length_ratio,
                threshold,
            } => {
                let length = line.clean_line().chars().count() as f64;
                let avg = doc_stats.get("line_avg_length").unwrap_or(0.0);
                if length < min_length_ratio * avg || total == 0.0 {
                    return false;
                }
                lw / total > *threshold || up / total > *threshold
            }
        }
    }
}

/// Ordered list of indicators sharing a purpose.
#[derive(Debug, Clone)]
pub struct IndicatorBundle {
    pub indicators: Vec<Indicator>,
}

impl IndicatorBundle {
    /// Garbage detectors.
    pub fn strong() -> Self {
        Self {
            indicators: vec![
                Indicator::Stats(StatsRule::SpecialRatio { threshold: 0.6 }),
                Indicator::Pattern(
                    Regex::new(r"^[0-9efEaAoOsSt.,= \-]+$").expect("valid pattern"),
                ),
            ],
        }
    }

    /// Clean-line detectors.
    pub fn clean() -> Self {
        Self {
            indicators: vec![
                Indicator::Stats(StatsRule::LetterDominance {
                    min_length_ratio: 0.5,
                    threshold: 0.6,
                }),
                Indicator::Pattern(Regex::new(r"^[A-Z][a-z ]+$").expect("valid pattern")),
            ],
        }
    }

    /// Fraction of indicators matching the line, in `[0, 1]`.
    pub fn match_rate(&self, line: &Line, doc_stats: &Statistics) -> f64 {
        if self.indicators.is_empty() {
            return 0.0;
        }
        let matching = self
            .indicators
            .iter()
            .filter(|i| i.matches(line, doc_stats))
            .count();
        matching as f64 / self.indicators.len() as f64
    }

    pub fn matches(&self, line: &Line, doc_stats: &Statistics) -> bool {
        self.match_rate(line, doc_stats) > 0.0
    }
}

/// The rule-based grading stage.
#[derive(Debug, Clone)]
pub struct IndicatorModel {
    strong: IndicatorBundle,
    clean: IndicatorBundle,
}

impl Default for IndicatorModel {
    fn default() -> Self {
        Self::new()
    }
}

impl IndicatorModel {
    pub fn new() -> Self {
        Self {
            strong: IndicatorBundle::strong(),
            clean: IndicatorBundle::clean(),
        }
    }

    /// Grade the document: strong matches become garbage, clean matches
    /// become clean, then garbage adjacency is smoothed downward.
    pub fn correct(&self, document: &mut Document) {
        let doc_stats = document.stats().clone();

        for line in document.lines_mut() {
            if line.grade() != GARBAGE_GRADE && self.strong.matches(line, &doc_stats) {
                line.set_garbage();
            }
        }

        for line in document.lines_mut() {
            if line.grade() != GARBAGE_GRADE && self.clean.matches(line, &doc_stats) {
                line.set_clean();
            }
        }

        smooth_grades(document);
    }
}

/// Drag the neighbourhood of garbage lines down one grade. A clean line is
/// immune; grades never leave `0..=5` and never increase here.
fn smooth_grades(document: &mut Document) {
    let mut lines: Vec<&mut Line> = document.lines_mut().collect();

    for i in 1..lines.len() {
        if lines[i - 1].grade() == GARBAGE_GRADE && lines[i].grade() != CLEAN_GRADE {
            lines[i].decrease_grade();
        }
        if lines[i].grade() == GARBAGE_GRADE && lines[i - 1].grade() != CLEAN_GRADE {
            lines[i - 1].decrease_grade();
        }
    }
}
