use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use crate::models::{Season, Term};

/// Unit cap used when `finish_fastest` is set and the user cap is lower.
pub const FINISH_FASTEST_UNIT_CAP: f64 = 20.0;

/// Largest accepted `maxTerms`: ten years of quarters.
pub const MAX_PLANNED_TERMS: usize = 40;

/// User constraints for one planning run. Every field has a default so a
/// partial JSON object (or `{}`) is accepted.
///
/// ```json
/// {
///   "startTerm": "Fall 2024",
///   "maxUnitsPerTerm": 15,
///   "minUnitsPerTerm": 12,
///   "maxTerms": 8,
///   "avoidTerms": ["Summer 2024"],
///   "avoidCourses": ["MATH 10H"],
///   "finishFastest": false,
///   "priorityCourses": ["CIS 35A"]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Constraints {
    #[serde(default = "default_start_term")]
    pub start_term: Term,

    #[serde(default = "default_max_units")]
    pub max_units_per_term: f64,

    #[serde(default = "default_min_units")]
    pub min_units_per_term: f64,

    /// Initial length of the term sequence; overflow repair may append more.
    #[serde(default = "default_max_terms")]
    pub max_terms: usize,

    #[serde(default)]
    pub avoid_terms: BTreeSet<Term>,

    /// Soft avoid: honoured only when a non-avoided alternative exists.
    #[serde(default)]
    pub avoid_courses: BTreeSet<String>,

    #[serde(default)]
    pub finish_fastest: bool,

    #[serde(default)]
    pub priority_courses: BTreeSet<String>,

    /// Course sequences that should run in consecutive terms.
    #[serde(default = "default_continuous_sequences")]
    pub continuous_sequences: Vec<Vec<String>>,
}

fn default_start_term() -> Term {
    Term::new(Season::Fall, 2023)
}

fn default_max_units() -> f64 {
    15.0
}

fn default_min_units() -> f64 {
    12.0
}

fn default_max_terms() -> usize {
    1
}

fn default_continuous_sequences() -> Vec<Vec<String>> {
    vec![
        vec!["CHEM 1A".to_string(), "CHEM 1B".to_string(), "CHEM 1C".to_string()],
        vec!["PHYS 4A".to_string(), "PHYS 4B".to_string(), "PHYS 4C".to_string()],
    ]
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            start_term: default_start_term(),
            max_units_per_term: default_max_units(),
            min_units_per_term: default_min_units(),
            max_terms: default_max_terms(),
            avoid_terms: BTreeSet::new(),
            avoid_courses: BTreeSet::new(),
            finish_fastest: false,
            priority_courses: BTreeSet::new(),
            continuous_sequences: default_continuous_sequences(),
        }
    }
}

impl Constraints {
    /// Length of the initial term sequence, kept within `1..=MAX_PLANNED_TERMS`.
    pub fn planned_terms(&self) -> usize {
        self.max_terms.clamp(1, MAX_PLANNED_TERMS)
    }

    /// Unit cap actually enforced by the allocator.
    pub fn effective_max_units(&self) -> f64 {
        if self.finish_fastest {
            self.max_units_per_term.max(FINISH_FASTEST_UNIT_CAP)
        } else {
            self.max_units_per_term
        }
    }

    pub fn is_avoided_term(&self, term: &Term) -> bool {
        self.avoid_terms.contains(term)
    }

    pub fn is_avoided_course(&self, code: &str) -> bool {
        self.avoid_courses.contains(code)
    }

    pub fn is_priority_course(&self, code: &str) -> bool {
        self.priority_courses.contains(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_constraints() {
        let c = Constraints::default();
        assert_eq!(c.start_term.to_string(), "Fall 2023");
        assert_eq!(c.max_units_per_term, 15.0);
        assert_eq!(c.min_units_per_term, 12.0);
        assert_eq!(c.max_terms, 1);
        assert!(c.avoid_terms.is_empty());
        assert!(c.avoid_courses.is_empty());
        assert!(!c.finish_fastest);
        assert_eq!(c.continuous_sequences.len(), 2);
    }

    #[test]
    fn test_partial_json_takes_defaults() {
        let c: Constraints = serde_json::from_str(r#"{"maxTerms": 8, "avoidTerms": ["Summer 2024"]}"#).unwrap();
        assert_eq!(c.max_terms, 8);
        assert_eq!(c.max_units_per_term, 15.0);
        assert!(c.is_avoided_term(&"Summer 2024".parse().unwrap()));
        assert!(!c.is_avoided_term(&"Fall 2024".parse().unwrap()));
    }

    #[test]
    fn test_finish_fastest_raises_cap() {
        let mut c = Constraints { max_units_per_term: 15.0, ..Default::default() };
        assert_eq!(c.effective_max_units(), 15.0);
        c.finish_fastest = true;
        assert_eq!(c.effective_max_units(), FINISH_FASTEST_UNIT_CAP);
        c.max_units_per_term = 24.0;
        assert_eq!(c.effective_max_units(), 24.0);
    }

    #[test]
    fn test_planned_terms_is_clamped() {
        let mut c = Constraints { max_terms: 0, ..Default::default() };
        assert_eq!(c.planned_terms(), 1);
        c.max_terms = 8;
        assert_eq!(c.planned_terms(), 8);
        c.max_terms = usize::MAX;
        assert_eq!(c.planned_terms(), MAX_PLANNED_TERMS);
    }
}
