use serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::algorithm::Adjustment;
use crate::models::{Constraints, Plan, Target, MAX_PLANNED_TERMS};

#[derive(Debug, Error)]
pub enum InputError {
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("at least one target (universityId + majorId) is required")]
    MissingTargets,

    #[error("maxTerms must be between 1 and {max}, got {0}", max = MAX_PLANNED_TERMS)]
    MaxTermsOutOfRange(usize),
}

/// Body of `POST /plan`.
///
/// ```json
/// {
///   "targets": [{"universityId": "ucb", "majorId": "ucb_eecs"}],
///   "constraints": {
///     "startTerm": "Fall 2024",
///     "maxUnitsPerTerm": 15,
///     "maxTerms": 8,
///     "avoidTerms": ["Summer 2025"],
///     "priorityCourses": ["CIS 35A"]
///   }
/// }
/// ```
///
/// A single target may also be given inline with `universityId` and `majorId`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
    #[serde(default)]
    pub targets: Vec<Target>,
    #[serde(default)]
    pub university_id: Option<String>,
    #[serde(default)]
    pub major_id: Option<String>,
    #[serde(default)]
    pub constraints: Constraints,
}

impl PlanRequest {
    /// Explicit targets followed by the inline one, duplicates dropped.
    pub fn resolved_targets(&self) -> Result<Vec<Target>, InputError> {
        let mut targets: Vec<Target> = Vec::new();
        let inline = match (&self.university_id, &self.major_id) {
            (Some(u), Some(m)) => Some(Target { university_id: u.clone(), major_id: m.clone() }),
            _ => None,
        };
        for t in self.targets.iter().cloned().chain(inline) {
            if !targets.contains(&t) {
                targets.push(t);
            }
        }
        if targets.is_empty() {
            return Err(InputError::MissingTargets);
        }
        Ok(targets)
    }
}

/// Body of `POST /chains`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainsRequest {
    pub university_id: String,
    pub major_id: String,
}

/// Body of `POST /plan/adjust`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustRequest {
    pub plan: Plan,
    pub adjustments: Vec<Adjustment>,
}

pub fn parse_plan_request(json_str: &str) -> Result<(PlanRequest, Vec<Target>), InputError> {
    let request: PlanRequest = serde_json::from_str(json_str)?;
    let targets = request.resolved_targets()?;
    let max_terms = request.constraints.max_terms;
    if !(1..=MAX_PLANNED_TERMS).contains(&max_terms) {
        return Err(InputError::MaxTermsOutOfRange(max_terms));
    }
    Ok((request, targets))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plan_request_with_constraints() {
        let json_data = r#"
        {
            "targets": [
                {"universityId": "ucb", "majorId": "ucb_eecs"},
                {"universityId": "ucla", "majorId": "ucla_cs"}
            ],
            "constraints": {
                "startTerm": "Winter 2025",
                "maxUnitsPerTerm": 18,
                "avoidTerms": ["Summer 2025"],
                "avoidCourses": ["MATH 10H"],
                "finishFastest": true
            }
        }
        "#;
        let (request, targets) = parse_plan_request(json_data).expect("plan request should parse");
        assert_eq!(targets.len(), 2);
        assert_eq!(request.constraints.start_term.to_string(), "Winter 2025");
        assert_eq!(request.constraints.max_units_per_term, 18.0);
        assert_eq!(request.constraints.min_units_per_term, 12.0);
        assert!(request.constraints.finish_fastest);
        assert!(request.constraints.is_avoided_course("MATH 10H"));
    }

    #[test]
    fn test_inline_target_and_defaults() {
        let (request, targets) = parse_plan_request(r#"{"universityId": "ucb", "majorId": "ucb_eecs"}"#).unwrap();
        assert_eq!(targets, vec![Target { university_id: "ucb".to_string(), major_id: "ucb_eecs".to_string() }]);
        assert_eq!(request.constraints, Constraints::default());
    }

    #[test]
    fn test_rejects_missing_targets_and_bad_terms() {
        assert!(matches!(parse_plan_request("{}"), Err(InputError::MissingTargets)));
        let bad = r#"{"universityId": "ucb", "majorId": "m", "constraints": {"startTerm": "Autumn 2024"}}"#;
        assert!(matches!(parse_plan_request(bad), Err(InputError::Json(_))));
    }

    #[test]
    fn test_rejects_out_of_range_max_terms() {
        let huge = r#"{"universityId": "uni", "majorId": "uni_major", "constraints": {"maxTerms": 18446744073709551615}}"#;
        assert!(matches!(parse_plan_request(huge), Err(InputError::MaxTermsOutOfRange(usize::MAX))));
        let zero = r#"{"universityId": "uni", "majorId": "uni_major", "constraints": {"maxTerms": 0}}"#;
        assert!(matches!(parse_plan_request(zero), Err(InputError::MaxTermsOutOfRange(0))));
        let edge = format!(
            r#"{{"universityId": "uni", "majorId": "uni_major", "constraints": {{"maxTerms": {}}}}}"#,
            MAX_PLANNED_TERMS
        );
        assert!(parse_plan_request(&edge).is_ok());
    }

    #[test]
    fn test_adjust_request_parses_actions() {
        let json_data = r#"
        {
            "plan": {"startTerm": "Fall 2024", "endTerm": "Fall 2024", "totalUnits": 5,
                     "terms": [{"name": "Fall 2024", "units": 5,
                                "courses": [{"code": "MATH 1A", "name": "Calculus", "units": 5}]}]},
            "adjustments": [{"action": "remove", "code": "MATH 1A", "term": "Fall 2024"}]
        }
        "#;
        let req: AdjustRequest = serde_json::from_str(json_data).unwrap();
        assert_eq!(req.plan.terms[0].courses[0].code, "MATH 1A");
        assert!(matches!(req.adjustments[0], Adjustment::Remove { .. }));
    }
}
