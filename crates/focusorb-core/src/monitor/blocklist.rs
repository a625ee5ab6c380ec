/// Case-insensitive substring patterns marking distracting activity.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blocklist {
    patterns: Vec<String>,
}

impl Blocklist {
    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn matches(&self, label: &str) -> bool {
        let label = label.to_lowercase();
        self.patterns.iter().any(|p| label.contains(p.as_str()))
    }

    /// Labels matching any pattern, in their original order and casing.
    pub fn flagged(&self, labels: &[String]) -> Vec<String> {
        labels.iter().filter(|l| self.matches(l)).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_case_insensitive_substrings() {
        let list = Blocklist::new(["YouTube.com", "reddit.com", "  "]);
        assert_eq!(list.patterns().len(), 2);
        let labels = vec![
            "Lecture 4 - youtube.com - Firefox".to_string(),
            "Overleaf".to_string(),
            "r/rust - REDDIT.COM".to_string(),
        ];
        assert_eq!(
            list.flagged(&labels),
            vec![
                "Lecture 4 - youtube.com - Firefox".to_string(),
                "r/rust - REDDIT.COM".to_string(),
            ]
        );
    }

    #[test]
    fn a_label_is_flagged_once_even_if_several_patterns_match() {
        let list = Blocklist::new(["x.com", "twitter"]);
        let labels = vec!["twitter / x.com".to_string()];
        assert_eq!(list.flagged(&labels).len(), 1);
    }

    #[test]
    fn empty_blocklist_flags_nothing() {
        let list = Blocklist::default();
        assert!(list.is_empty());
        assert!(list.flagged(&["anything".to_string()]).is_empty());
    }
}
