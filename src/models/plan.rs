use serde::{Deserialize, Serialize};
use crate::models::{CourseNode, NoEquivalentCourse, Term};

/// Snapshot of a course as placed in a term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduledCourse {
    pub code: String,
    pub name: String,
    pub units: f64,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub co_requisites: Vec<String>,
    #[serde(default)]
    pub alternatives: Vec<String>,
    #[serde(default)]
    pub additional_notes: String,
}

impl ScheduledCourse {
    pub fn is_co_requisite(&self, code: &str) -> bool {
        self.co_requisites.iter().any(|c| c == code)
    }

    pub fn strict_prerequisites(&self) -> impl Iterator<Item = &String> {
        self.prerequisites.iter().filter(|p| !self.is_co_requisite(p))
    }

    pub fn requires(&self, code: &str) -> bool {
        self.prerequisites.iter().any(|p| p == code)
    }
}

impl From<&CourseNode> for ScheduledCourse {
    fn from(node: &CourseNode) -> Self {
        ScheduledCourse {
            code: node.code.clone(),
            name: node.name.clone(),
            units: node.units,
            prerequisites: node.prerequisites.clone(),
            co_requisites: node.co_requisites.clone(),
            alternatives: node.alternatives.clone(),
            additional_notes: node.additional_notes.clone(),
        }
    }
}

/// One academic term of a schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TermSlot {
    pub name: Term,
    pub courses: Vec<ScheduledCourse>,
    pub units: f64,
    #[serde(default)]
    pub is_avoid_term: bool,
}

impl TermSlot {
    pub fn new(name: Term, is_avoid_term: bool) -> Self {
        TermSlot { name, courses: Vec::new(), units: 0.0, is_avoid_term }
    }

    pub fn position(&self, code: &str) -> Option<usize> {
        self.courses.iter().position(|c| c.code == code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.position(code).is_some()
    }

    pub fn push(&mut self, course: ScheduledCourse) {
        self.units += course.units;
        self.courses.push(course);
    }

    pub fn take(&mut self, code: &str) -> Option<ScheduledCourse> {
        let idx = self.position(code)?;
        let course = self.courses.remove(idx);
        self.recompute_units();
        Some(course)
    }

    /// Recompute `units` from the course list (avoids drift from repeated +/-).
    pub fn recompute_units(&mut self) {
        self.units = self.courses.iter().map(|c| c.units).sum();
    }

    /// Courses in this term that list `code` as a prerequisite.
    pub fn dependents_of(&self, code: &str) -> Vec<String> {
        self.courses
            .iter()
            .filter(|c| c.code != code && c.requires(code))
            .map(|c| c.code.clone())
            .collect()
    }
}

/// University/major pair requested by the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
    pub university_id: String,
    pub major_id: String,
}

/// Target with display names, attached to combined plans.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetInfo {
    pub university_id: String,
    pub major_id: String,
    pub university_name: String,
    pub major_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnscheduledReason {
    /// No term in the sequence satisfied ordering, offering and unit limits.
    NoFeasibleTerm,
    /// Larger than the per-term unit cap on its own.
    ExceedsUnitCap,
}

/// Course the allocator could not place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnscheduledCourse {
    pub code: String,
    pub name: String,
    pub units: f64,
    pub reason: UnscheduledReason,
}

/// Final schedule handed to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub start_term: Option<Term>,
    pub end_term: Option<Term>,
    pub total_units: f64,
    pub terms: Vec<TermSlot>,
    #[serde(default)]
    pub no_equivalent_courses: Vec<NoEquivalentCourse>,
    #[serde(default)]
    pub targets: Vec<TargetInfo>,
    #[serde(default)]
    pub unscheduled: Vec<UnscheduledCourse>,
}

impl Plan {
    pub fn term_index(&self, name: &Term) -> Option<usize> {
        self.terms.iter().position(|t| &t.name == name)
    }

    /// Index of the term holding `code`, if scheduled.
    pub fn term_of(&self, code: &str) -> Option<usize> {
        self.terms.iter().position(|t| t.contains(code))
    }

    pub fn scheduled_codes(&self) -> Vec<String> {
        self.terms
            .iter()
            .flat_map(|t| t.courses.iter().map(|c| c.code.clone()))
            .collect()
    }

    /// Recompute per-term units, `total_units` and the start/end terms.
    pub fn refresh_totals(&mut self) {
        for term in self.terms.iter_mut() {
            term.recompute_units();
        }
        self.total_units = self.terms.iter().map(|t| t.units).sum();
        let mut non_empty = self.terms.iter().filter(|t| !t.courses.is_empty());
        let first = non_empty.next().map(|t| t.name);
        let last = non_empty.last().map(|t| t.name).or(first);
        self.start_term = first;
        self.end_term = last;
    }
}
