/// Tuning knobs for header similarity detection.
#[derive(Clone, Debug, PartialEq)]
pub struct AnalyzerSettings {
    /// Minimum similarity score for two headers to be grouped, kept within [0.1, 0.95]
    similarity_threshold: f64,
    /// Minimum length of a word to count as significant for common-word grouping
    pub min_word_length: usize,
    /// Use sequence-ratio and edit-distance similarity
    pub use_string_similarity: bool,
    /// Use the word overlap coefficient
    pub use_word_overlap: bool,
    /// Score abbreviations built from first letters
    pub detect_abbreviations: bool,
    /// Strip the configured prefixes during normalization
    pub remove_common_prefixes: bool,
    /// Remove every non-word, non-space character during normalization
    pub remove_punctuation: bool,
    /// Prefixes ignored at the start of a header
    pub common_prefixes: Vec<String>,
}

impl AnalyzerSettings {
    pub const MIN_THRESHOLD: f64 = 0.1;
    pub const MAX_THRESHOLD: f64 = 0.95;
    pub const DEFAULT_THRESHOLD: f64 = 0.7;

    pub fn similarity_threshold(&self) -> f64 {
        self.similarity_threshold
    }

    /// Sets the threshold, clamped to [0.1, 0.95]. NaN clamps to the lower bound.
    pub fn set_similarity_threshold(&mut self, threshold: f64) {
        self.similarity_threshold = threshold.max(Self::MIN_THRESHOLD).min(Self::MAX_THRESHOLD);
    }

    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.set_similarity_threshold(threshold);
        self
    }
}

impl Default for AnalyzerSettings {
    fn default() -> Self {
        AnalyzerSettings {
            similarity_threshold: Self::DEFAULT_THRESHOLD,
            min_word_length: 3,
            use_string_similarity: true,
            use_word_overlap: true,
            detect_abbreviations: true,
            remove_common_prefixes: true,
            remove_punctuation: true,
            common_prefixes: ["col_", "column_", "data_", "field_", "value_"]
                .iter()
                .map(|prefix| prefix.to_string())
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_clamped() {
        let mut settings = AnalyzerSettings::default();
        assert_eq!(settings.similarity_threshold(), 0.7);
        settings.set_similarity_threshold(0.0);
        assert_eq!(settings.similarity_threshold(), 0.1);
        settings.set_similarity_threshold(1.0);
        assert_eq!(settings.similarity_threshold(), 0.95);
        settings.set_similarity_threshold(0.5);
        assert_eq!(settings.similarity_threshold(), 0.5);
        settings.set_similarity_threshold(f64::NAN);
        assert_eq!(settings.similarity_threshold(), 0.1);
    }
}
