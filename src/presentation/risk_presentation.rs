// Display helpers for risk assessments
use crate::domain::analysis::RiskLevel;

pub const FALLBACK_COLOR: &str = "#6b7280";

pub fn color_for(level: &RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "#10b981",
        RiskLevel::Moderate => "#f59e0b",
        RiskLevel::High => "#ef4444",
        RiskLevel::Critical => "#dc2626",
        RiskLevel::Unrecognized(_) => FALLBACK_COLOR,
    }
}

/// Split an explanation into one sentence per bullet.
pub fn explanation_bullets(text: &str) -> Vec<String> {
    text.split('.')
        .map(str::trim)
        .filter(|sentence| !sentence.is_empty())
        .map(|sentence| format!("{}.", sentence))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_known_levels_have_distinct_colors() {
        let levels = [
            RiskLevel::Low,
            RiskLevel::Moderate,
            RiskLevel::High,
            RiskLevel::Critical,
        ];
        let colors: HashSet<_> = levels.iter().map(color_for).collect();

        assert_eq!(colors.len(), 4);
        assert!(!colors.contains(FALLBACK_COLOR));
    }

    #[test]
    fn test_unknown_level_falls_back() {
        let level = RiskLevel::from("UNKNOWN".to_string());
        assert_eq!(color_for(&level), FALLBACK_COLOR);
        assert_eq!(color_for(&RiskLevel::from(String::new())), FALLBACK_COLOR);
    }

    #[test]
    fn test_bullets_drop_trailing_fragment() {
        assert_eq!(
            explanation_bullets("A is high. B is low. "),
            vec!["A is high.", "B is low."]
        );
    }

    #[test]
    fn test_bullets_are_idempotent() {
        let once = explanation_bullets("Heart rate is elevated.  SpO2 is low..Fever");
        assert_eq!(once, vec!["Heart rate is elevated.", "SpO2 is low.", "Fever."]);

        let twice: Vec<String> = once.iter().flat_map(|b| explanation_bullets(b)).collect();
        assert_eq!(twice, once);
    }

    #[test]
    fn test_bullets_of_blank_text() {
        assert!(explanation_bullets("").is_empty());
        assert!(explanation_bullets(" . . ").is_empty());
    }
}
