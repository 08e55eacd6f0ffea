#![allow(dead_code)]

use std::path::PathBuf;
use classpath::models::{
    Catalog, Constraints, Equivalency, Major, Plan, Requirement, Season, SourceCourse, TargetCourse, University,
};
use classpath::repository::InMemoryRepository;

pub const UNIVERSITY: &str = "uni";
pub const MAJOR: &str = "uni_major";

pub fn catalog_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data").join("catalog.json")
}

pub fn bundled_repo() -> InMemoryRepository {
    InMemoryRepository::load(catalog_path()).expect("bundled catalog should load")
}

pub fn constraints(start: &str, max_terms: usize) -> Constraints {
    Constraints { start_term: start.parse().unwrap(), max_terms, ..Default::default() }
}

/// Small catalog where every source course articulates one target course of
/// a single major.
pub struct CatalogBuilder {
    catalog: Catalog,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        let mut catalog = Catalog::default();
        catalog.universities.push(University { id: UNIVERSITY.to_string(), name: "Test University".to_string(), url: None });
        catalog.majors.push(Major { id: MAJOR.to_string(), university_id: UNIVERSITY.to_string(), name: "Test Major".to_string() });
        catalog.requirements.push(Requirement {
            id: "req".to_string(),
            major_id: MAJOR.to_string(),
            category: "Core".to_string(),
            required: true,
            courses: Vec::new(),
            selection_rule: Default::default(),
            selection_count: None,
            selection_description: String::new(),
        });
        CatalogBuilder { catalog }
    }

    fn source_id(code: &str) -> String {
        format!("src_{}", code.replace(' ', "_").to_lowercase())
    }

    fn add_source(&mut self, code: &str, units: f64, prereqs: &[&str], seasons: &[Season]) {
        self.catalog.source_courses.push(SourceCourse {
            id: Self::source_id(code),
            code: code.to_string(),
            name: code.to_string(),
            units,
            prerequisites: prereqs.iter().map(|s| s.to_string()).collect(),
            co_requisites: Vec::new(),
            terms_offered: seasons.to_vec(),
            additional_notes: String::new(),
        });
    }

    fn add_target(&mut self, target_id: &str, equivalency: Equivalency) {
        self.catalog.target_courses.push(TargetCourse {
            id: target_id.to_string(),
            university_id: UNIVERSITY.to_string(),
            code: target_id.to_uppercase(),
            name: target_id.to_string(),
            units: 4.0,
        });
        self.catalog.requirements[0].courses.push(target_id.to_string());
        self.catalog.equivalencies.push(equivalency);
    }

    /// Source course mapped one-to-one onto its own target course.
    pub fn course(mut self, code: &str, units: f64, prereqs: &[&str], seasons: &[Season]) -> Self {
        self.add_source(code, units, prereqs, seasons);
        let target_id = format!("t_{}", Self::source_id(code));
        let equivalency = Equivalency {
            id: format!("eq_{}", target_id),
            target_course_id: target_id.clone(),
            source_course_ids: vec![Self::source_id(code)],
            ..Default::default()
        };
        self.add_target(&target_id, equivalency);
        self
    }

    /// Interchangeable source courses satisfying one target course.
    pub fn alternatives(mut self, target_id: &str, options: &[(&str, f64, Vec<Season>)]) -> Self {
        for (code, units, seasons) in options {
            self.add_source(code, *units, &[], seasons);
        }
        let ids: Vec<String> = options.iter().map(|(code, _, _)| Self::source_id(code)).collect();
        let equivalency = Equivalency {
            id: format!("eq_{}", target_id),
            target_course_id: target_id.to_string(),
            source_course_ids: ids.clone(),
            alternative_sets: ids.iter().map(|id| vec![id.clone()]).collect(),
            ..Default::default()
        };
        self.add_target(target_id, equivalency);
        self
    }

    pub fn build(self) -> InMemoryRepository {
        InMemoryRepository::new(self.catalog)
    }
}

/// Ordering, unit cap, avoided terms and uniqueness on a finished plan.
pub fn assert_plan_invariants(plan: &Plan, constraints: &Constraints) {
    let cap = constraints.effective_max_units();
    let mut seen: Vec<&str> = Vec::new();
    for (at, term) in plan.terms.iter().enumerate() {
        assert!(term.units <= cap + 1e-9, "{} has {} units over cap {}", term.name, term.units, cap);
        if !term.courses.is_empty() {
            assert!(!constraints.is_avoided_term(&term.name), "{} is avoided but holds courses", term.name);
        }
        if at > 0 {
            assert!(plan.terms[at - 1].name < term.name, "terms out of order");
        }
        for course in &term.courses {
            assert!(!seen.contains(&course.code.as_str()), "{} scheduled twice", course.code);
            seen.push(&course.code);
            for prereq in &course.prerequisites {
                let Some(p_at) = plan.term_of(prereq) else { continue };
                if course.is_co_requisite(prereq) {
                    assert!(p_at <= at, "{} scheduled before co-requisite {}", course.code, prereq);
                } else {
                    assert!(p_at < at, "{} not after prerequisite {}", course.code, prereq);
                }
            }
        }
    }
}
