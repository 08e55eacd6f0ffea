//! Error types

use thiserror::Error;
use crate::models::{Term, TermParseError};

/// Errors raised by the catalog repositories
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid catalog JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("repository lock poisoned")]
    Poisoned,
}

/// Errors raised while building chains or plans
#[derive(Debug, Error)]
pub enum PlannerError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    InvalidTerm(#[from] TermParseError),
}

/// Rejected plan edits. The plan is left untouched whenever one of these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MutationError {
    #[error("term {0} not found in plan")]
    TermNotFound(Term),

    #[error("course {code} not found in {term}")]
    CourseNotFound { code: String, term: Term },

    #[error("cannot move {code}: it is a prerequisite for {} in {term}", .dependents.join(", "))]
    SameTermDependency { code: String, term: Term, dependents: Vec<String> },

    #[error("cannot place {code} in {term}: prerequisite {prerequisite} is scheduled in {prerequisite_term}")]
    PrerequisiteOrder { code: String, term: Term, prerequisite: String, prerequisite_term: Term },

    #[error("cannot place {code} in {term}: dependent {dependent} is scheduled in {dependent_term}")]
    DependentOrder { code: String, term: Term, dependent: String, dependent_term: Term },

    #[error("course {code} is already scheduled in {term}")]
    DuplicateCourse { code: String, term: Term },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mutation_error_messages() {
        let term: Term = "Fall 2024".parse().unwrap();
        let err = MutationError::SameTermDependency {
            code: "MATH 1A".to_string(),
            term,
            dependents: vec!["MATH 1B".to_string(), "PHYS 4A".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "cannot move MATH 1A: it is a prerequisite for MATH 1B, PHYS 4A in Fall 2024"
        );
        assert_eq!(MutationError::TermNotFound(term).to_string(), "term Fall 2024 not found in plan");
    }

    #[test]
    fn test_term_parse_error_converts() {
        let err: PlannerError = "Fall".parse::<Term>().unwrap_err().into();
        assert!(matches!(err, PlannerError::InvalidTerm(_)));
    }
}
