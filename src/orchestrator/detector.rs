use crate::config::{MatchMode, SimulationConfig};

/// Decides whether a responder message counts as saying the forbidden phrase.
///
/// Stateless; the comparison policy is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerminationDetector {
    phrase: String,
    case_sensitive: bool,
    mode: MatchMode,
}

impl TerminationDetector {
    pub fn new(phrase: impl Into<String>, case_sensitive: bool, mode: MatchMode) -> Self {
        Self {
            phrase: phrase.into(),
            case_sensitive,
            mode,
        }
    }

    /// Case-sensitive whole-message comparison
    pub fn exact(phrase: impl Into<String>) -> Self {
        Self::new(phrase, true, MatchMode::Exact)
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            config.forbidden_phrase.clone(),
            config.case_sensitive,
            config.match_mode,
        )
    }

    pub fn phrase(&self) -> &str {
        &self.phrase
    }

    pub fn matches(&self, text: &str) -> bool {
        if self.case_sensitive {
            self.compare(text, &self.phrase)
        } else {
            self.compare(&text.to_lowercase(), &self.phrase.to_lowercase())
        }
    }

    fn compare(&self, text: &str, phrase: &str) -> bool {
        match self.mode {
            MatchMode::Exact => text == phrase,
            MatchMode::Contains => text.contains(phrase),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match_is_case_sensitive_and_whole_message() {
        let detector = TerminationDetector::exact("I Give Up");

        assert!(detector.matches("I Give Up"));
        assert!(!detector.matches("i give up"));
        assert!(!detector.matches("Well, I Give Up."));
        assert!(!detector.matches("I Give Up "));
        assert!(!detector.matches(""));
    }

    #[test]
    fn test_exact_case_insensitive() {
        let detector = TerminationDetector::new("I Give Up", false, MatchMode::Exact);

        assert!(detector.matches("i give up"));
        assert!(detector.matches("I GIVE UP"));
        assert!(!detector.matches("Well, I Give Up."));
    }

    #[test]
    fn test_contains_mode() {
        let detector = TerminationDetector::new("I Give Up", true, MatchMode::Contains);
        assert!(detector.matches("Well, I Give Up."));
        assert!(!detector.matches("Well, i give up."));

        let detector = TerminationDetector::new("I Give Up", false, MatchMode::Contains);
        assert!(detector.matches("fine... i give up!"));
        assert!(!detector.matches("I will never give up"));
    }

    #[test]
    fn test_from_config_defaults_to_exact() {
        let detector = TerminationDetector::from_config(&SimulationConfig::default());
        assert_eq!(detector, TerminationDetector::exact("I Give Up"));
        assert_eq!(detector.phrase(), "I Give Up");
    }
}
