//! Deterministic heuristic rubric for generated content.
//!
//! Five criteria, each an integer score in `1..=5`, computed from surface
//! features of the text: sentence length, markdown headers, paragraph
//! breaks, engagement words, length and numeric density.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

pub const CLARITY: &str = "clarity";
pub const STRUCTURE: &str = "structure";
pub const ENGAGEMENT: &str = "engagement";
pub const DEPTH: &str = "depth";
pub const FORMATTING: &str = "formatting";

/// Criterion names in reporting order.
pub const CRITERIA: [&str; 5] = [CLARITY, STRUCTURE, ENGAGEMENT, DEPTH, FORMATTING];

const ENGAGEMENT_WORDS: [&str; 11] = [
    "?",
    "!",
    "imagine",
    "consider",
    "you",
    "we",
    "discover",
    "explore",
    "learn",
    "understand",
    "revolutionize",
];

fn sentence_breaks() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[.!?]+").expect("valid static pattern"))
}

fn digit_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("valid static pattern"))
}

fn blank_line() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("valid static pattern"))
}

fn word_count(content: &str) -> usize {
    content.split_whitespace().count()
}

pub fn clarity(content: &str) -> u8 {
    let words = word_count(content);
    let pieces = sentence_breaks().split(content).count();
    let avg_sentence_len = words as f64 / (pieces + 1) as f64;

    let mut score: i32 = 5;
    if avg_sentence_len > 25.0 {
        score -= 1;
    }
    if avg_sentence_len > 35.0 {
        score -= 1;
    }
    if !content.contains("###") {
        score -= 1;
    }
    if words < 100 {
        score -= 1;
    }
    score.max(1) as u8
}

pub fn structure(content: &str) -> u8 {
    let mut score: i32 = 5;
    if !content.starts_with('*') {
        score -= 1;
    }
    if !content.contains("###") {
        score -= 2;
    }
    if !content.contains("\n\n") {
        score -= 1;
    }
    if content.split("\n\n").count() < 3 {
        score -= 1;
    }
    score.max(1) as u8
}

pub fn engagement(content: &str) -> u8 {
    let lower = content.to_lowercase();
    let hits = ENGAGEMENT_WORDS.iter().filter(|w| lower.contains(*w)).count();
    let score = (1.0 + 0.5 * hits as f64).round_ties_even();
    score.min(5.0) as u8
}

pub fn depth(content: &str) -> u8 {
    let words = word_count(content);
    let mut score: u8 = 1;
    if words > 300 {
        score += 1;
    }
    if words > 600 {
        score += 1;
    }
    if words > 1000 {
        score += 1;
    }
    if digit_runs().find_iter(content).count() > 5 {
        score += 1;
    }
    score.min(5)
}

pub fn formatting(content: &str) -> u8 {
    let mut score: i32 = 5;
    if !content.contains('*') {
        score -= 1;
    }
    if !content.contains("###") {
        score -= 1;
    }
    if !content.contains("\n\n") {
        score -= 1;
    }
    if content.split('\n').count() < 10 {
        score -= 1;
    }
    if !blank_line().is_match(content) {
        score -= 1;
    }
    score.max(1) as u8
}

/// Score `content` on every criterion.
pub fn score_content(content: &str) -> BTreeMap<String, f64> {
    [
        (CLARITY, clarity(content)),
        (STRUCTURE, structure(content)),
        (ENGAGEMENT, engagement(content)),
        (DEPTH, depth(content)),
        (FORMATTING, formatting(content)),
    ]
    .into_iter()
    .map(|(name, score)| (name.to_string(), f64::from(score)))
    .collect()
}
