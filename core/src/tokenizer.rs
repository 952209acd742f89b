//! Line tokenization.
//!
//! Input lines are transliterated to ASCII, split on whitespace with
//! leading/trailing punctuation peeled off, and then split again on a fixed
//! separator set with the separators kept as tokens of their own. The
//! `clean_head_tail` pass strips a token down to its alphabetic core.

use regex::Regex;
use std::sync::OnceLock;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Characters that always split a fragment, and survive as tokens.
pub const SEPARATORS: &str = "=+/,.:;!?%<>#()&[]{}";

fn cleaning_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[^a-zA-Z'-]*([a-zA-Z'-](?:.*[a-zA-Z'-])?)[^a-zA-Z'-]*$")
            .expect("valid cleaning pattern")
    })
}

/// Transliterate to ASCII: compatibility decomposition with combining marks
/// discarded, then a lossy romanisation of whatever is still not ASCII.
pub fn transliterate(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.nfkd().filter(|c| !is_combining_mark(*c)) {
        if ch.is_ascii() {
            out.push(ch);
        } else {
            out.push_str(unidecode::unidecode_char(ch));
        }
    }
    out
}

/// Split a line into word and separator tokens. Empty fragments are dropped.
pub fn tokenize(line: &str) -> Vec<String> {
    let ascii = transliterate(line);
    let mut tokens = Vec::new();

    for chunk in ascii.split_whitespace() {
        for piece in peel_edge_punctuation(chunk) {
            split_on_separators(&piece, &mut tokens);
        }
    }

    tokens
}

/// Punctuation glued to the edges of a word becomes a token of its own.
/// Apostrophe and hyphen stay put: they are word characters here.
fn peel_edge_punctuation(chunk: &str) -> Vec<String> {
    let is_edge = |c: char| c.is_ascii_punctuation() && c != '\'' && c != '-';

    let mut head = Vec::new();
    let mut tail = Vec::new();
    let mut core: &str = chunk;

    while let Some(c) = core.chars().next() {
        if is_edge(c) {
            head.push(c.to_string());
            core = &core[c.len_utf8()..];
        } else {
            break;
        }
    }
    while let Some(c) = core.chars().next_back() {
        if is_edge(c) {
            tail.push(c.to_string());
            core = &core[..core.len() - c.len_utf8()];
        } else {
            break;
        }
    }
    tail.reverse();

    let mut out = head;
    if !core.is_empty() {
        out.push(core.to_string());
    }
    out.extend(tail);
    out
}

fn split_on_separators(fragment: &str, out: &mut Vec<String>) {
    let mut word = String::new();
    for c in fragment.chars() {
        if SEPARATORS.contains(c) {
            if !word.is_empty() {
                out.push(std::mem::take(&mut word));
            }
            out.push(c.to_string());
        } else {
            word.push(c);
        }
    }
    if !word.is_empty() {
        out.push(word);
    }
}

/// Strip leading/trailing non-`[a-zA-Z'-]` characters. Returns `None` when
/// nothing alphabetic survives.
pub fn clean_head_tail(word: &str) -> Option<String> {
    let caps = cleaning_pattern().captures(word)?;
    let core = caps.get(1)?.as_str();

    if core.chars().any(|c| c.is_ascii_alphabetic()) {
        Some(core.to_string())
    } else {
        None
    }
}
