// Raw catalog records as stored by the repositories (JSON catalog or SQLite).

use serde::{Deserialize, Serialize};
use crate::models::Season;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct University {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Major {
    pub id: String,
    pub university_id: String,
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionRule {
    #[default]
    All,
    Some,
}

/// A requirement block of a major at the target university. `courses` holds
/// target course ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
    pub id: String,
    pub major_id: String,
    #[serde(default)]
    pub category: String,
    #[serde(default = "default_true")]
    pub required: bool,
    pub courses: Vec<String>,
    #[serde(default)]
    pub selection_rule: SelectionRule,
    #[serde(default)]
    pub selection_count: Option<u32>,
    #[serde(default)]
    pub selection_description: String,
}

fn default_true() -> bool {
    true
}

/// Course at the target (transfer) university.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetCourse {
    pub id: String,
    pub university_id: String,
    pub code: String,
    pub name: String,
    pub units: f64,
}

/// Articulation of one target course into source college courses.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Equivalency {
    pub id: String,
    pub target_course_id: String,
    #[serde(default)]
    pub source_course_ids: Vec<String>,
    /// All mapped source courses are needed together.
    #[serde(default)]
    pub and_relationship: bool,
    /// The AND group is a sequence that should run in consecutive terms.
    #[serde(default)]
    pub is_sequential_pair: bool,
    /// Interchangeable options; each inner list is one option.
    #[serde(default)]
    pub alternative_sets: Vec<Vec<String>>,
    #[serde(default)]
    pub has_no_equivalent: bool,
    #[serde(default)]
    pub no_equivalent_message: Option<String>,
}

/// Course at the source (community) college. Prerequisites and
/// co-requisites are course codes, not ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceCourse {
    pub id: String,
    pub code: String,
    pub name: String,
    pub units: f64,
    #[serde(default)]
    pub prerequisites: Vec<String>,
    #[serde(default)]
    pub co_requisites: Vec<String>,
    #[serde(default)]
    pub terms_offered: Vec<Season>,
    #[serde(default)]
    pub additional_notes: String,
}

/// Whole catalog as serialized in the JSON data file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
    #[serde(default)]
    pub universities: Vec<University>,
    #[serde(default)]
    pub majors: Vec<Major>,
    #[serde(default)]
    pub requirements: Vec<Requirement>,
    #[serde(default)]
    pub target_courses: Vec<TargetCourse>,
    #[serde(default)]
    pub equivalencies: Vec<Equivalency>,
    #[serde(default)]
    pub source_courses: Vec<SourceCourse>,
}
