// Core data structures of the planner.

pub mod constraints;
pub mod plan;
pub mod records;
pub mod term;

pub use constraints::{Constraints, FINISH_FASTEST_UNIT_CAP, MAX_PLANNED_TERMS};
pub use plan::{Plan, ScheduledCourse, Target, TargetInfo, TermSlot, UnscheduledCourse, UnscheduledReason};
pub use records::{Catalog, Equivalency, Major, Requirement, SelectionRule, SourceCourse, TargetCourse, University};
pub use term::{generate_term_sequence, Season, Term, TermParseError};

use serde::{Deserialize, Serialize};

/// One source college course inside a planning run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseNode {
    pub code: String,
    pub name: String,
    pub units: f64,
    /// Prerequisite codes (edges into the graph).
    #[serde(default)]
    pub prerequisites: Vec<String>,
    /// Reverse edges, derived from the working set.
    #[serde(default)]
    pub dependents: Vec<String>,
    /// Mutually substitutable courses; at most one of the group is scheduled.
    #[serde(default)]
    pub alternatives: Vec<String>,
    /// Courses that may share this course's term instead of preceding it.
    #[serde(default)]
    pub co_requisites: Vec<String>,
    /// Empty means offered every term.
    #[serde(default)]
    pub terms_offered: Vec<Season>,
    #[serde(default)]
    pub level: u32,
    #[serde(default)]
    pub additional_notes: String,
}

impl CourseNode {
    pub fn is_offered_in(&self, season: Season) -> bool {
        self.terms_offered.is_empty() || self.terms_offered.contains(&season)
    }

    /// Number of seasons the course runs in (an empty list counts as all four).
    pub fn offered_count(&self) -> usize {
        if self.terms_offered.is_empty() {
            Season::ROTATION.len()
        } else {
            self.terms_offered.len()
        }
    }

    pub fn is_co_requisite(&self, code: &str) -> bool {
        self.co_requisites.iter().any(|c| c == code)
    }

    /// Prerequisites that must be finished in an earlier term.
    pub fn strict_prerequisites(&self) -> impl Iterator<Item = &String> {
        self.prerequisites.iter().filter(|p| !self.is_co_requisite(p))
    }
}

/// Terminal course plus its expanded prerequisite tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chain {
    pub course: CourseNode,
    pub prerequisites: Vec<Chain>,
    pub level: u32,
}

impl Chain {
    /// Number of nodes on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        1 + self.prerequisites.iter().map(Chain::depth).max().unwrap_or(0)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.course.code == code || self.prerequisites.iter().any(|p| p.contains(code))
    }
}

/// Target course that has no articulated equivalent at the source college.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoEquivalentCourse {
    pub target_course_id: String,
    pub code: String,
    pub name: String,
    pub units: f64,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnmappedReason {
    /// No equivalency record for the target course.
    NoEquivalency,
    /// Referenced by a requirement but missing from the target catalog.
    MissingTargetCourse,
    /// Belongs to a different university than the one being planned.
    OtherUniversity,
}

/// Requirement course left out of planning because of a data gap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnmappedCourse {
    pub target_course_id: String,
    pub code: Option<String>,
    pub reason: UnmappedReason,
}

/// Source courses articulated together for one target course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseGroup {
    pub codes: Vec<String>,
    /// Sequential groups run in consecutive terms; the rest share a term.
    pub sequential: bool,
}

/// Output of the chain builder for one (or several merged) majors.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainForest {
    pub chains: Vec<Chain>,
    pub no_equivalent_courses: Vec<NoEquivalentCourse>,
    #[serde(default)]
    pub unmapped: Vec<UnmappedCourse>,
    #[serde(default)]
    pub groups: Vec<CourseGroup>,
}
