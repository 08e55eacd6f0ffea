use std::collections::BTreeSet;
use std::fs;
use std::path::Path;
use crate::error::RepositoryError;
use crate::models::{Catalog, Equivalency, Major, Requirement, SourceCourse, TargetCourse, University};
use crate::repository::CourseRepository;

/// Catalog held in memory, typically loaded from `data/catalog.json`.
#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    catalog: Catalog,
}

impl InMemoryRepository {
    pub fn new(catalog: Catalog) -> Self {
        InMemoryRepository { catalog }
    }

    pub fn from_json_str(json: &str) -> Result<Self, RepositoryError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        Ok(Self::new(catalog))
    }

    /// Load the catalog from a JSON file on disk.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        let text = fs::read_to_string(path.as_ref())?;
        let repo = Self::from_json_str(&text)?;
        log::info!(
            "catalog loaded from {}: {} universities, {} majors, {} source courses",
            path.as_ref().display(),
            repo.catalog.universities.len(),
            repo.catalog.majors.len(),
            repo.catalog.source_courses.len()
        );
        Ok(repo)
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }
}

impl CourseRepository for InMemoryRepository {
    fn find_requirements(&self, major_id: &str) -> Result<Vec<Requirement>, RepositoryError> {
        Ok(self.catalog.requirements.iter().filter(|r| r.major_id == major_id).cloned().collect())
    }

    fn find_target_courses(&self, ids: &BTreeSet<String>) -> Result<Vec<TargetCourse>, RepositoryError> {
        Ok(self.catalog.target_courses.iter().filter(|c| ids.contains(&c.id)).cloned().collect())
    }

    fn find_equivalencies(&self, target_course_ids: &BTreeSet<String>) -> Result<Vec<Equivalency>, RepositoryError> {
        Ok(self
            .catalog
            .equivalencies
            .iter()
            .filter(|e| target_course_ids.contains(&e.target_course_id))
            .cloned()
            .collect())
    }

    fn find_source_courses(&self, ids: &BTreeSet<String>) -> Result<Vec<SourceCourse>, RepositoryError> {
        Ok(self.catalog.source_courses.iter().filter(|c| ids.contains(&c.id)).cloned().collect())
    }

    fn find_courses_by_university(&self, university_id: &str) -> Result<Vec<TargetCourse>, RepositoryError> {
        Ok(self
            .catalog
            .target_courses
            .iter()
            .filter(|c| c.university_id == university_id)
            .cloned()
            .collect())
    }

    fn universities(&self) -> Result<Vec<University>, RepositoryError> {
        Ok(self.catalog.universities.clone())
    }

    fn majors(&self, university_id: &str) -> Result<Vec<Major>, RepositoryError> {
        Ok(self.catalog.majors.iter().filter(|m| m.university_id == university_id).cloned().collect())
    }
}
