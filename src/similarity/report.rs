use std::fmt::Display;

/// Which detector produced a header group.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DetectionMethod {
    /// Headers whose normalized forms are identical
    ExactDuplicate,
    /// Headers whose similarity score reaches the threshold
    FuzzySimilar,
    /// Headers sharing a significant word
    CommonWord,
}

impl DetectionMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::ExactDuplicate => "exact_duplicate",
            DetectionMethod::FuzzySimilar => "fuzzy_similar",
            DetectionMethod::CommonWord => "common_word",
        }
    }
}

impl Display for DetectionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A group of at least two distinct original headers judged similar.
#[derive(Clone, Debug, PartialEq)]
pub struct HeaderGroup {
    /// Detector that produced the group
    pub method: DetectionMethod,
    /// Grouping key: the shared normalized name, the normalized seed header,
    /// or the shared word, depending on the method
    pub key: String,
    /// Original header strings, without duplicates, in discovery order
    pub members: Vec<String>,
    /// Canonical name suggested for the merged column, filled by `analyze_and_suggest`
    pub suggested_name: Option<String>,
}

impl HeaderGroup {
    pub(crate) fn new(method: DetectionMethod, key: impl Into<String>) -> Self {
        HeaderGroup {
            method,
            key: key.into(),
            members: Vec::new(),
            suggested_name: None,
        }
    }

    /// Adds a member unless it is already present.
    pub(crate) fn push(&mut self, header: &str) -> bool {
        if self.contains(header) {
            false
        } else {
            self.members.push(header.to_owned());
            true
        }
    }

    pub fn contains(&self, header: &str) -> bool {
        self.members.iter().any(|member| member == header)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Output of a full header analysis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SuggestionReport {
    pub exact_duplicates: Vec<HeaderGroup>,
    pub similar_groups: Vec<HeaderGroup>,
    pub common_word_groups: Vec<HeaderGroup>,
}

impl SuggestionReport {
    /// Returns true if no detector found anything.
    pub fn is_empty(&self) -> bool {
        self.exact_duplicates.is_empty() && self.similar_groups.is_empty() && self.common_word_groups.is_empty()
    }

    /// Every group, exact duplicates first.
    pub fn groups(&self) -> impl Iterator<Item = &HeaderGroup> {
        self.exact_duplicates.iter()
            .chain(self.similar_groups.iter())
            .chain(self.common_word_groups.iter())
    }

    /// Human-readable merge suggestions for review.
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl Display for SuggestionReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut lines = Vec::<String>::new();
        if !self.exact_duplicates.is_empty() {
            lines.push("EXACT DUPLICATES (highest priority to merge):".to_owned());
            for group in &self.exact_duplicates {
                let mut line = format!("  • {}", group.members.join(", "));
                if let Some(name) = &group.suggested_name {
                    line.push_str(&format!(" → suggest merging to '{}'", name));
                }
                lines.push(line);
            }
        }
        if !self.similar_groups.is_empty() {
            lines.push(section(&lines, "SIMILAR HEADERS (possible spelling variations):"));
            push_numbered(&mut lines, &self.similar_groups);
        }
        if !self.common_word_groups.is_empty() {
            lines.push(section(&lines, "HEADERS SHARING COMMON WORDS:"));
            push_numbered(&mut lines, &self.common_word_groups);
        }
        write!(f, "{}", lines.join("\n"))
    }
}

/// Section titles after the first one are separated by a blank line.
fn section(lines: &[String], title: &str) -> String {
    if lines.is_empty() {
        title.to_owned()
    } else {
        format!("\n{}", title)
    }
}

fn push_numbered(lines: &mut Vec<String>, groups: &[HeaderGroup]) {
    for (index, group) in groups.iter().enumerate() {
        lines.push(format!("  • Group {}: {}", index + 1, group.members.join(", ")));
        if let Some(name) = &group.suggested_name {
            lines.push(format!("    → suggest merging to '{}'", name));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group(method: DetectionMethod, members: &[&str], suggested_name: Option<&str>) -> HeaderGroup {
        let mut group = HeaderGroup::new(method, "key");
        for member in members {
            group.push(member);
        }
        group.suggested_name = suggested_name.map(str::to_owned);
        group
    }

    #[test]
    fn group_rejects_duplicate_members() {
        let mut group = HeaderGroup::new(DetectionMethod::CommonWord, "name");
        assert!(group.push("Name"));
        assert!(!group.push("Name"));
        assert!(group.push("name"));
        assert_eq!(group.len(), 2);
    }

    #[test]
    fn report_text() {
        let report = SuggestionReport {
            exact_duplicates: vec![group(DetectionMethod::ExactDuplicate, &["Name", "name"], Some("Name"))],
            similar_groups: vec![group(DetectionMethod::FuzzySimilar, &["Qty", "Qtty"], Some("Qty"))],
            common_word_groups: vec![group(DetectionMethod::CommonWord, &["Order Date", "Ship Date"], None)],
        };
        let expected = [
            "EXACT DUPLICATES (highest priority to merge):",
            "  • Name, name → suggest merging to 'Name'",
            "",
            "SIMILAR HEADERS (possible spelling variations):",
            "  • Group 1: Qty, Qtty",
            "    → suggest merging to 'Qty'",
            "",
            "HEADERS SHARING COMMON WORDS:",
            "  • Group 1: Order Date, Ship Date",
        ].join("\n");
        assert_eq!(report.text(), expected);
        assert_eq!(report.groups().count(), 3);
    }

    #[test]
    fn report_text_without_exact_duplicates() {
        let report = SuggestionReport {
            similar_groups: vec![group(DetectionMethod::FuzzySimilar, &["Qty", "Qtty"], Some("Qty"))],
            ..SuggestionReport::default()
        };
        assert!(report.text().starts_with("SIMILAR HEADERS"));
        assert!(SuggestionReport::default().is_empty());
        assert_eq!(SuggestionReport::default().text(), "");
    }
}
