// Edits on a finished plan: move, add and remove courses.
//
// Every operation validates first and only then touches the plan, so a
// rejected edit leaves it exactly as it was.

use serde::{Deserialize, Serialize};
use crate::error::MutationError;
use crate::models::{Plan, ScheduledCourse, Term};

/// One edit requested by the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Adjustment {
    Move { code: String, from: Term, to: Term },
    Add { course: ScheduledCourse, term: Term },
    Remove { code: String, term: Term },
}

/// Result of one adjustment in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentOutcome {
    pub index: usize,
    pub applied: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Courses left without a prerequisite after a removal.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub orphaned: Vec<String>,
}

fn term_index(plan: &Plan, term: &Term) -> Result<usize, MutationError> {
    plan.term_index(term).ok_or(MutationError::TermNotFound(*term))
}

/// Check that `course` may sit in term `at` given everything else in the plan.
/// The course itself is ignored wherever it currently is.
fn check_order(plan: &Plan, course: &ScheduledCourse, at: usize) -> Result<(), MutationError> {
    let term = plan.terms[at].name;
    for prerequisite in &course.prerequisites {
        let Some(p_at) = plan.term_of(prerequisite) else { continue };
        let ok = if course.is_co_requisite(prerequisite) { p_at <= at } else { p_at < at };
        if !ok {
            return Err(MutationError::PrerequisiteOrder {
                code: course.code.clone(),
                term,
                prerequisite: prerequisite.clone(),
                prerequisite_term: plan.terms[p_at].name,
            });
        }
    }
    for (d_at, slot) in plan.terms.iter().enumerate() {
        for dependent in slot.courses.iter().filter(|c| c.code != course.code && c.requires(&course.code)) {
            let ok = if dependent.is_co_requisite(&course.code) { d_at >= at } else { d_at > at };
            if !ok {
                return Err(MutationError::DependentOrder {
                    code: course.code.clone(),
                    term,
                    dependent: dependent.code.clone(),
                    dependent_term: slot.name,
                });
            }
        }
    }
    Ok(())
}

/// Move `code` from one term to another.
pub fn move_course(plan: &mut Plan, code: &str, from: &Term, to: &Term) -> Result<(), MutationError> {
    let from_at = term_index(plan, from)?;
    let to_at = term_index(plan, to)?;
    let Some(pos) = plan.terms[from_at].position(code) else {
        return Err(MutationError::CourseNotFound { code: code.to_string(), term: *from });
    };
    if from_at == to_at {
        return Ok(());
    }

    let dependents = plan.terms[from_at].dependents_of(code);
    if !dependents.is_empty() {
        return Err(MutationError::SameTermDependency { code: code.to_string(), term: *from, dependents });
    }
    check_order(plan, &plan.terms[from_at].courses[pos], to_at)?;

    if let Some(course) = plan.terms[from_at].take(code) {
        plan.terms[to_at].push(course);
    }
    sort_by_prerequisites(&mut plan.terms[from_at].courses);
    sort_by_prerequisites(&mut plan.terms[to_at].courses);
    plan.refresh_totals();
    log::debug!("moved {} from {} to {}", code, from, to);
    Ok(())
}

/// Add `course` to `term`.
pub fn add_course(plan: &mut Plan, course: ScheduledCourse, term: &Term) -> Result<(), MutationError> {
    let at = term_index(plan, term)?;
    if let Some(existing) = plan.term_of(&course.code) {
        return Err(MutationError::DuplicateCourse { code: course.code, term: plan.terms[existing].name });
    }
    check_order(plan, &course, at)?;

    log::debug!("added {} to {}", course.code, term);
    plan.terms[at].push(course);
    sort_by_prerequisites(&mut plan.terms[at].courses);
    plan.refresh_totals();
    Ok(())
}

/// Remove `code` from `term`. Returns the scheduled courses that listed it as
/// a prerequisite.
pub fn remove_course(plan: &mut Plan, code: &str, term: &Term) -> Result<Vec<String>, MutationError> {
    let at = term_index(plan, term)?;
    if plan.terms[at].take(code).is_none() {
        return Err(MutationError::CourseNotFound { code: code.to_string(), term: *term });
    }
    plan.refresh_totals();

    let orphaned: Vec<String> = plan
        .terms
        .iter()
        .flat_map(|t| t.courses.iter())
        .filter(|c| c.requires(code))
        .map(|c| c.code.clone())
        .collect();
    if !orphaned.is_empty() {
        log::warn!("removed {} which is a prerequisite of {}", code, orphaned.join(", "));
    }
    Ok(orphaned)
}

/// Apply adjustments in order. A rejected one is reported and skipped.
pub fn apply_adjustments(plan: &mut Plan, adjustments: &[Adjustment]) -> Vec<AdjustmentOutcome> {
    adjustments
        .iter()
        .enumerate()
        .map(|(index, adjustment)| {
            let result = match adjustment {
                Adjustment::Move { code, from, to } => move_course(plan, code, from, to).map(|_| Vec::new()),
                Adjustment::Add { course, term } => add_course(plan, course.clone(), term).map(|_| Vec::new()),
                Adjustment::Remove { code, term } => remove_course(plan, code, term),
            };
            match result {
                Ok(orphaned) => AdjustmentOutcome { index, applied: true, error: None, orphaned },
                Err(e) => {
                    log::info!("adjustment {} rejected: {}", index, e);
                    AdjustmentOutcome { index, applied: false, error: Some(e.to_string()), orphaned: Vec::new() }
                }
            }
        })
        .collect()
}

/// Stable topological order inside one term: a course comes after every
/// prerequisite that shares its term.
pub fn sort_by_prerequisites(courses: &mut Vec<ScheduledCourse>) {
    let mut remaining: Vec<ScheduledCourse> = std::mem::take(courses);
    while !remaining.is_empty() {
        let ready = remaining
            .iter()
            .position(|c| !c.prerequisites.iter().any(|p| p != &c.code && remaining.iter().any(|r| &r.code == p)))
            .unwrap_or(0);
        courses.push(remaining.remove(ready));
    }
}
