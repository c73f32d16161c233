//! Per-user statistics over a set of notes.
use std::collections::HashMap;

use serde::Serialize;

use crate::models::note::Note;

pub const TOP_TAGS: usize = 10;
pub const COMMON_WORDS: usize = 20;
pub const MONTHS: usize = 12;

const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will",
    "would", "could", "should", "may", "might", "must", "can", "this", "that", "these", "those",
    "i", "you", "he", "she", "it", "we", "they", "me", "him", "her", "us", "them",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Count {
    pub key: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    pub total_notes: usize,
    pub total_words: usize,
    pub average_note_length: usize,
    pub top_tags: Vec<Count>,
    pub common_words: Vec<Count>,
    pub notes_per_month: Vec<Count>,
}

pub fn summarize(notes: &[Note]) -> AnalyticsSummary {
    AnalyticsSummary {
        total_notes: notes.len(),
        total_words: notes.iter().map(|n| words(&n.content).count()).sum(),
        average_note_length: average_length(notes),
        top_tags: top_tags(notes, TOP_TAGS),
        common_words: common_words(notes, COMMON_WORDS),
        notes_per_month: notes_per_month(notes, MONTHS),
    }
}

/// Runs of ASCII letters, apostrophes and hyphens. A word does not start with
/// either punctuation mark and does not end with a hyphen.
pub fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_ascii_alphabetic() || c == '\'' || c == '-'))
        .map(|w| w.trim_start_matches(['\'', '-']).trim_end_matches('-'))
        .filter(|w| !w.is_empty())
}

pub fn average_length(notes: &[Note]) -> usize {
    if notes.is_empty() {
        return 0;
    }
    let total: usize = notes.iter().map(|n| n.content.chars().count()).sum();
    (total as f64 / notes.len() as f64).round() as usize
}

pub fn top_tags(notes: &[Note], limit: usize) -> Vec<Count> {
    let tags = notes
        .iter()
        .flat_map(|n| n.tags.iter())
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(String::from);
    ranked(tags, limit)
}

pub fn common_words(notes: &[Note], limit: usize) -> Vec<Count> {
    let words = notes
        .iter()
        .flat_map(|n| words(&n.content).map(str::to_lowercase).collect::<Vec<_>>())
        .filter(|w| w.chars().count() > 3 && !STOP_WORDS.contains(&w.as_str()));
    ranked(words, limit)
}

/// Notes created per `YYYY-MM`, newest month first.
pub fn notes_per_month(notes: &[Note], limit: usize) -> Vec<Count> {
    let mut months: HashMap<String, usize> = HashMap::new();
    for note in notes {
        *months
            .entry(note.created_at.format("%Y-%m").to_string())
            .or_default() += 1;
    }

    let mut months: Vec<Count> = months
        .into_iter()
        .map(|(key, count)| Count { key, count })
        .collect();
    months.sort_by(|a, b| b.key.cmp(&a.key));
    months.truncate(limit);
    months
}

// Highest count first, ties alphabetical
fn ranked(items: impl Iterator<Item = String>, limit: usize) -> Vec<Count> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for item in items {
        *counts.entry(item).or_default() += 1;
    }

    let mut counts: Vec<Count> = counts
        .into_iter()
        .map(|(key, count)| Count { key, count })
        .collect();
    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    counts.truncate(limit);
    counts
}
