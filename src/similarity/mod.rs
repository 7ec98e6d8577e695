//! # Header Similarity Module
//!
//! Groups column headers that probably name the same field. Headers are normalized
//! (case, punctuation, common prefixes, whitespace) and then clustered by three
//! detectors, each reported separately:
//!
//! - exact duplicates: identical normalized forms
//! - similar groups: the best of sequence ratio, word overlap, edit distance and
//!   abbreviation scores reaches the threshold
//! - common-word groups: headers sharing a significant word
//!
//! Detectors are greedy: a header is claimed by the first group that accepts it.
//! Headers are visited in input order and words in order of first appearance, so a
//! given input always yields the same groups; reordering the input may change them.
use crate::similarity::distance::edit_similarity;
use crate::similarity::distance::sequence_ratio;
use regex::Regex;
use std::collections::HashMap;
use std::collections::HashSet;
use tracing::trace;

pub mod distance;
pub mod report;
pub mod settings;

pub use report::{DetectionMethod, HeaderGroup, SuggestionReport};
pub use settings::AnalyzerSettings;

/// Detects duplicate and near-duplicate headers.
#[derive(Clone, Debug)]
pub struct HeaderSimilarityAnalyzer {
    settings: AnalyzerSettings,
    punctuation: Regex,
    whitespace: Regex,
}

impl Default for HeaderSimilarityAnalyzer {
    fn default() -> Self {
        HeaderSimilarityAnalyzer::new()
    }
}

impl HeaderSimilarityAnalyzer {
    /// Creates an analyzer with default settings.
    pub fn new() -> Self {
        HeaderSimilarityAnalyzer::with_settings(AnalyzerSettings::default())
    }

    pub fn with_settings(settings: AnalyzerSettings) -> Self {
        HeaderSimilarityAnalyzer {
            settings,
            punctuation: Regex::new(r"[^\w\s]").expect("Hardcode regex pattern"),
            whitespace: Regex::new(r"\s+").expect("Hardcode regex pattern"),
        }
    }

    pub fn settings(&self) -> &AnalyzerSettings {
        &self.settings
    }

    pub fn settings_mut(&mut self) -> &mut AnalyzerSettings {
        &mut self.settings
    }

    /// Sets the grouping threshold, clamped to [0.1, 0.95].
    pub fn set_similarity_threshold(&mut self, threshold: f64) {
        self.settings.set_similarity_threshold(threshold);
    }

    /// Canonicalizes a header for comparison.
    ///
    /// Lowercases, removes punctuation (if enabled), collapses whitespace runs, trims,
    /// then strips configured prefixes until none applies. Prefixes go through the same
    /// case and punctuation pass, so `fld-` matches `Fld-Amount`. The result is a
    /// fixpoint: normalizing it again returns it unchanged.
    pub fn normalize(&self, text: &str) -> String {
        let mut text = self.canonical(text).trim().to_owned();
        if self.settings.remove_common_prefixes {
            let prefixes: Vec<String> = self.settings.common_prefixes.iter()
                .map(|prefix| self.canonical(prefix).trim_start().to_owned())
                .filter(|prefix| !prefix.is_empty())
                .collect();
            while let Some(rest) = prefixes.iter().find_map(|prefix| text.strip_prefix(prefix.as_str())) {
                text = rest.trim_start().to_owned();
            }
        }
        text
    }

    fn canonical(&self, text: &str) -> String {
        let mut text = text.to_lowercase();
        if self.settings.remove_punctuation {
            text = self.punctuation.replace_all(&text, "").into_owned();
        }
        self.whitespace.replace_all(&text, " ").into_owned()
    }

    /// Similarity of two (normalized) strings in [0, 1]: the highest of the enabled scores.
    pub fn similarity(&self, a: &str, b: &str) -> f64 {
        let mut scores = Vec::<f64>::with_capacity(4);

        if self.settings.use_string_similarity {
            scores.push(sequence_ratio(a, b));
        }

        if self.settings.use_word_overlap {
            let words_a: HashSet<&str> = a.split_whitespace().collect();
            let words_b: HashSet<&str> = b.split_whitespace().collect();
            if !words_a.is_empty() && !words_b.is_empty() {
                let shared = words_a.intersection(&words_b).count();
                scores.push(shared as f64 / words_a.len().min(words_b.len()) as f64);
            }
        }

        if self.settings.use_string_similarity {
            if let Some(score) = edit_similarity(a, b) {
                scores.push(score);
            }
        }

        if self.settings.detect_abbreviations {
            let score = self.abbreviation_score(a, b);
            if score > 0.0 {
                scores.push(score);
            }
        }

        scores.into_iter().fold(0.0, f64::max)
    }

    /// Scores whether the shorter string abbreviates the longer one by first letters.
    ///
    /// Only applies when one string is less than half as long as the other and the longer
    /// one has at least two words. Returns 0.95 for an exact first-letter match, 0.8 when
    /// one contains the other (an empty string is contained in anything), the edit similarity when it is at least 0.7, and 0 otherwise.
    pub fn abbreviation_score(&self, a: &str, b: &str) -> f64 {
        let a_length = a.chars().count() as f64;
        let b_length = b.chars().count() as f64;
        let (shorter, longer) = if a_length < b_length * 0.5 {
            (a, b)
        } else if b_length < a_length * 0.5 {
            (b, a)
        } else {
            return 0.0;
        };

        let words: Vec<&str> = longer.split_whitespace().collect();
        if words.len() < 2 {
            return 0.0;
        }
        let first_letters: String = words.iter().filter_map(|word| word.chars().next()).collect();
        if shorter == first_letters {
            0.95
        } else if first_letters.contains(shorter) || shorter.contains(first_letters.as_str()) {
            0.8
        } else {
            edit_similarity(shorter, &first_letters)
                .filter(|score| *score >= 0.7)
                .unwrap_or(0.0)
        }
    }

    /// Groups headers whose normalized forms are identical, keyed by that form.
    /// Groups appear in order of their first member.
    pub fn find_exact_duplicates<S: AsRef<str>>(&self, headers: &[S]) -> Vec<HeaderGroup> {
        let mut groups = Vec::<HeaderGroup>::new();
        let mut index = HashMap::<String, usize>::new();
        for header in present(headers) {
            let normalized = self.normalize(header);
            let position = *index.entry(normalized.to_owned()).or_insert_with(|| {
                groups.push(HeaderGroup::new(DetectionMethod::ExactDuplicate, normalized));
                groups.len() - 1
            });
            groups[position].push(header);
        }
        groups.retain(|group| group.len() > 1);
        trace!(groups = groups.len(), "exact duplicate headers");
        groups
    }

    /// Groups headers whose similarity reaches the threshold.
    ///
    /// Each unclaimed header seeds a group and claims every later or earlier unclaimed
    /// header similar to it. Pairs with identical normalized forms are left to
    /// [`find_exact_duplicates`](Self::find_exact_duplicates). Single-member groups are dropped.
    pub fn find_similar_groups<S: AsRef<str>>(&self, headers: &[S]) -> Vec<HeaderGroup> {
        let normalized: Vec<(&str, String)> = present(headers)
            .map(|header| (header, self.normalize(header)))
            .collect();
        let threshold = self.settings.similarity_threshold();
        let mut processed = HashSet::<&str>::new();
        let mut groups = Vec::<HeaderGroup>::new();

        for (i, (header1, norm1)) in normalized.iter().enumerate() {
            if !processed.insert(*header1) {
                continue;
            }
            let mut group = HeaderGroup::new(DetectionMethod::FuzzySimilar, norm1.as_str());
            group.push(header1);

            for (j, (header2, norm2)) in normalized.iter().enumerate() {
                if i == j || processed.contains(header2) || norm1 == norm2 {
                    continue;
                }
                if self.similarity(norm1, norm2) >= threshold {
                    group.push(header2);
                    processed.insert(*header2);
                }
            }

            if group.len() > 1 {
                groups.push(group);
            }
        }
        trace!(groups = groups.len(), threshold, "similar headers");
        groups
    }

    /// Groups headers sharing a significant word (at least `min_word_length` characters).
    /// A header joins only the first word group that claims it.
    pub fn find_common_word_groups<S: AsRef<str>>(&self, headers: &[S]) -> Vec<HeaderGroup> {
        let mut words = Vec::<(String, Vec<&str>)>::new();
        let mut index = HashMap::<String, usize>::new();
        for header in present(headers) {
            for word in self.normalize(header).split_whitespace() {
                if word.chars().count() < self.settings.min_word_length {
                    continue;
                }
                let position = *index.entry(word.to_owned()).or_insert_with(|| {
                    words.push((word.to_owned(), Vec::new()));
                    words.len() - 1
                });
                let holders = &mut words[position].1;
                if !holders.contains(&header) {
                    holders.push(header);
                }
            }
        }

        let mut processed = HashSet::<&str>::new();
        let mut groups = Vec::<HeaderGroup>::new();
        for (word, holders) in &words {
            if holders.len() < 2 {
                continue;
            }
            let unprocessed: Vec<&str> = holders.iter()
                .copied()
                .filter(|header| !processed.contains(header))
                .collect();
            if unprocessed.len() > 1 {
                let mut group = HeaderGroup::new(DetectionMethod::CommonWord, word.as_str());
                for header in unprocessed {
                    group.push(header);
                    processed.insert(header);
                }
                groups.push(group);
            }
        }
        trace!(groups = groups.len(), "common word headers");
        groups
    }

    /// Runs all three detectors and fills in a suggested canonical name per group:
    /// the first member for exact duplicates, the shortest member for similar groups,
    /// and the shared words for common-word groups.
    pub fn analyze_and_suggest<S: AsRef<str>>(&self, headers: &[S]) -> SuggestionReport {
        let mut report = SuggestionReport {
            exact_duplicates: self.find_exact_duplicates(headers),
            similar_groups: self.find_similar_groups(headers),
            common_word_groups: self.find_common_word_groups(headers),
        };
        for group in &mut report.exact_duplicates {
            group.suggested_name = group.members.first().cloned();
        }
        for group in &mut report.similar_groups {
            group.suggested_name = group.members.iter()
                .min_by_key(|member| member.chars().count())
                .cloned();
        }
        for group in &mut report.common_word_groups {
            let words = self.common_words(&group.members);
            if !words.is_empty() {
                group.suggested_name = Some(words.join(" "));
            }
        }
        report
    }

    /// Normalized words present in every header, ordered by position in the first
    /// header with a non-empty normalized form.
    pub fn common_words<S: AsRef<str>>(&self, headers: &[S]) -> Vec<String> {
        let normalized: Vec<String> = headers.iter()
            .map(|header| self.normalize(header.as_ref()))
            .filter(|header| !header.is_empty())
            .collect();
        let Some((reference, others)) = normalized.split_first() else {
            return Vec::new();
        };
        let others: Vec<HashSet<&str>> = others.iter()
            .map(|header| header.split_whitespace().collect())
            .collect();

        let mut words = Vec::<String>::new();
        for word in reference.split_whitespace() {
            if others.iter().all(|set| set.contains(word)) && !words.iter().any(|seen| seen == word) {
                words.push(word.to_owned());
            }
        }
        words
    }
}

/// Headers that are not blank.
fn present<S: AsRef<str>>(headers: &[S]) -> impl Iterator<Item = &str> {
    headers.iter()
        .map(|header| header.as_ref())
        .filter(|header| !header.trim().is_empty())
}
