// Read-only access to the articulation catalog.
//
// The chain builder only needs a handful of query shapes (by major id, by id
// set, by university id and by target-course foreign key). Both backends
// answer them: `InMemoryRepository` (JSON catalog file) and
// `SqliteRepository` (bundled SQLite).

pub mod memory;
pub mod sqlite;

pub use memory::InMemoryRepository;
pub use sqlite::SqliteRepository;

use std::collections::BTreeSet;
use crate::error::RepositoryError;
use crate::models::{Equivalency, Major, Requirement, SourceCourse, TargetCourse, University};

pub trait CourseRepository: Send + Sync {
    /// Requirement blocks of a major.
    fn find_requirements(&self, major_id: &str) -> Result<Vec<Requirement>, RepositoryError>;

    /// Target university courses by id.
    fn find_target_courses(&self, ids: &BTreeSet<String>) -> Result<Vec<TargetCourse>, RepositoryError>;

    /// Equivalency records whose target course is in `target_course_ids`.
    fn find_equivalencies(&self, target_course_ids: &BTreeSet<String>) -> Result<Vec<Equivalency>, RepositoryError>;

    /// Source college courses by id.
    fn find_source_courses(&self, ids: &BTreeSet<String>) -> Result<Vec<SourceCourse>, RepositoryError>;

    /// Every target course offered by a university.
    fn find_courses_by_university(&self, university_id: &str) -> Result<Vec<TargetCourse>, RepositoryError>;

    fn universities(&self) -> Result<Vec<University>, RepositoryError>;

    fn majors(&self, university_id: &str) -> Result<Vec<Major>, RepositoryError>;

    fn find_university(&self, university_id: &str) -> Result<Option<University>, RepositoryError> {
        Ok(self.universities()?.into_iter().find(|u| u.id == university_id))
    }

    fn find_major(&self, university_id: &str, major_id: &str) -> Result<Option<Major>, RepositoryError> {
        Ok(self.majors(university_id)?.into_iter().find(|m| m.id == major_id))
    }
}
