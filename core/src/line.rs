//! One line of text: tokens, position template, grade and character stats.

use crate::stats::Statistics;
use crate::tokenizer::{clean_head_tail, tokenize};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Candidate spellings with their scores.
pub type CorrectionMap = BTreeMap<String, f64>;

/// Character-class counters kept per line.
pub const LINE_STAT_KEYS: [&str; 4] = ["lw_char", "up_char", "nb_char", "sp_char"];

/// Cleanliness grades: 0 = garbage, 5 = clean, the rest undetermined.
pub const GARBAGE_GRADE: u8 = 0;
pub const CLEAN_GRADE: u8 = 5;
const INITIAL_GRADE: u8 = 3;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    /// Surface form as tokenized from the input.
    pub original: String,
    /// Alphabetic core, `None` when the token holds no letter.
    pub cleaned: Option<String>,
    /// Proposed spellings; `None` means no correction attempted or needed.
    pub corrections: Option<CorrectionMap>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub tokens: Vec<Token>,
    /// Original surface with each token replaced by a `%i` placeholder.
    pos_template: String,
    /// Expected label (0 = garbage, 1 = clean) for training and evaluation.
    pub expected: Option<i32>,
    grade: u8,
    orig_stats: Statistics,
}

impl Line {
    pub fn new(text: &str) -> Self {
        Self::with_expected(text, None)
    }

    pub fn with_expected(text: &str, expected: Option<i32>) -> Self {
        let tokens: Vec<Token> = tokenize(text)
            .into_iter()
            .map(|original| {
                let cleaned = clean_head_tail(&original);
                Token {
                    original,
                    cleaned,
                    corrections: None,
                }
            })
            .collect();

        let mut pos_template = text.to_string();
        for (index, token) in tokens.iter().enumerate() {
            pos_template = pos_template.replacen(&token.original, &format!("%{index}"), 1);
        }

        let grade = if tokens.iter().all(|t| t.cleaned.is_none()) {
            GARBAGE_GRADE
        } else {
            INITIAL_GRADE
        };

        Self {
            tokens,
            pos_template,
            expected,
            grade,
            orig_stats: char_profile(text),
        }
    }

    pub fn grade(&self) -> u8 {
        self.grade
    }

    pub fn set_garbage(&mut self) {
        self.grade = GARBAGE_GRADE;
    }

    pub fn set_clean(&mut self) {
        self.grade = CLEAN_GRADE;
    }

    pub fn set_grade(&mut self, grade: u8) {
        self.grade = grade.min(CLEAN_GRADE);
    }

    pub fn raise_grade(&mut self) {
        if self.grade < CLEAN_GRADE {
            self.grade += 1;
        }
    }

    pub fn decrease_grade(&mut self) {
        if self.grade > GARBAGE_GRADE {
            self.grade -= 1;
        }
    }

    /// True when the grade is neither 0 nor 5.
    pub fn is_undetermined(&self) -> bool {
        self.grade % CLEAN_GRADE != 0
    }

    /// Original surface, rebuilt from the position template.
    pub fn orig_line(&self) -> String {
        let mut out = self.pos_template.clone();
        for (index, token) in self.tokens.iter().enumerate().rev() {
            out = out.replacen(&format!("%{index}"), &token.original, 1);
        }
        out
    }

    /// Corrected surface: best correction where one exists, cleaned form
    /// otherwise, original as last resort. Runs of spaces are collapsed.
    pub fn clean_line(&self) -> String {
        let mut out = self.pos_template.clone();
        for (index, token) in self.tokens.iter().enumerate().rev() {
            let replacement = match &token.corrections {
                Some(map) if !map.is_empty() => best_correction(map)
                    .unwrap_or(token.original.as_str()),
                _ => token
                    .cleaned
                    .as_deref()
                    .unwrap_or(token.original.as_str()),
            };
            out = out.replacen(&format!("%{index}"), replacement, 1);
        }
        collapse_spaces(&out)
    }

    pub fn orig_stats(&self) -> &Statistics {
        &self.orig_stats
    }

    /// Character stats of the corrected surface, computed on demand.
    pub fn clean_stats(&self) -> Statistics {
        char_profile(&self.clean_line())
    }

    /// Mean candidate confidence, averaged over all tokens.
    pub fn line_score(&self) -> f64 {
        if self.tokens.is_empty() {
            return 0.0;
        }

        let mut score = 0.0;
        for map in self.tokens.iter().filter_map(|t| t.corrections.as_ref()) {
            if !map.is_empty() {
                score += map.values().sum::<f64>() / map.len() as f64;
            }
        }
        score / self.tokens.len() as f64
    }

    /// Length of the original surface in characters.
    pub fn char_len(&self) -> usize {
        self.orig_line().chars().count()
    }
}

/// Highest-scoring entry; ties go to the lexicographically smallest key.
pub fn best_correction(map: &CorrectionMap) -> Option<&str> {
    let mut best: Option<(&str, f64)> = None;
    for (word, &score) in map {
        match best {
            Some((_, s)) if score <= s => {}
            _ => best = Some((word, score)),
        }
    }
    best.map(|(word, _)| word)
}

/// Count characters by class: lowercase, uppercase, digit, special.
/// Spaces are not counted.
pub fn char_profile(text: &str) -> Statistics {
    let mut stats = Statistics::new(&LINE_STAT_KEYS);
    for c in text.chars() {
        let key = if c.is_ascii_lowercase() {
            "lw_char"
        } else if c.is_ascii_uppercase() {
            "up_char"
        } else if c.is_ascii_digit() {
            "nb_char"
        } else if c == ' ' {
            continue;
        } else {
            "sp_char"
        };
        stats
            .add(key, 1.0)
            .expect("line stat keys are declared above");
    }
    stats
}

fn collapse_spaces(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_space = false;
    for c in text.chars() {
        if c == ' ' {
            if !last_space {
                out.push(c);
            }
            last_space = true;
        } else {
            out.push(c);
            last_space = false;
        }
    }
    out.trim().to_string()
}
