// SQLite-backed catalog. List-valued fields are stored as JSON text columns.

use rusqlite::{params, params_from_iter, Connection};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Mutex;
use crate::error::RepositoryError;
use crate::models::{Catalog, Equivalency, Major, Requirement, SelectionRule, SourceCourse, TargetCourse, University};
use crate::repository::CourseRepository;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS universities (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    url TEXT
);
CREATE TABLE IF NOT EXISTS majors (
    id TEXT PRIMARY KEY,
    university_id TEXT NOT NULL,
    name TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS requirements (
    id TEXT PRIMARY KEY,
    major_id TEXT NOT NULL,
    category TEXT NOT NULL,
    required INTEGER NOT NULL,
    courses_json TEXT NOT NULL,
    selection_rule TEXT NOT NULL,
    selection_count INTEGER,
    selection_description TEXT NOT NULL
);
CREATE TABLE IF NOT EXISTS target_courses (
    id TEXT PRIMARY KEY,
    university_id TEXT NOT NULL,
    code TEXT NOT NULL,
    name TEXT NOT NULL,
    units REAL NOT NULL
);
CREATE TABLE IF NOT EXISTS equivalencies (
    id TEXT PRIMARY KEY,
    target_course_id TEXT NOT NULL,
    source_course_ids_json TEXT NOT NULL,
    and_relationship INTEGER NOT NULL,
    is_sequential_pair INTEGER NOT NULL,
    alternative_sets_json TEXT NOT NULL,
    has_no_equivalent INTEGER NOT NULL,
    no_equivalent_message TEXT
);
CREATE TABLE IF NOT EXISTS source_courses (
    id TEXT PRIMARY KEY,
    code TEXT NOT NULL,
    name TEXT NOT NULL,
    units REAL NOT NULL,
    prerequisites_json TEXT NOT NULL,
    co_requisites_json TEXT NOT NULL,
    terms_offered_json TEXT NOT NULL,
    additional_notes TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_requirements_major ON requirements(major_id);
CREATE INDEX IF NOT EXISTS idx_equivalencies_target ON equivalencies(target_course_id);
CREATE INDEX IF NOT EXISTS idx_target_courses_university ON target_courses(university_id);
";

pub struct SqliteRepository {
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SqliteRepository(..)")
    }
}

fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

fn selection_rule_str(rule: SelectionRule) -> &'static str {
    match rule {
        SelectionRule::All => "all",
        SelectionRule::Some => "some",
    }
}

fn parse_selection_rule(s: &str) -> SelectionRule {
    if s.eq_ignore_ascii_case("some") { SelectionRule::Some } else { SelectionRule::All }
}

impl SqliteRepository {
    /// Open (or create) the database file and make sure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RepositoryError> {
        if let Some(dir) = path.as_ref().parent() {
            if !dir.as_os_str().is_empty() && !dir.exists() {
                std::fs::create_dir_all(dir)?;
            }
        }
        let conn = Connection::open(path.as_ref())?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self, RepositoryError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, RepositoryError> {
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteRepository { conn: Mutex::new(conn) })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, RepositoryError> {
        self.conn.lock().map_err(|_| RepositoryError::Poisoned)
    }

    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM source_courses", [], |row| row.get(0))?;
        Ok(count == 0)
    }

    /// Insert (or replace) every record of `catalog` in a single transaction.
    pub fn import_catalog(&self, catalog: &Catalog) -> Result<(), RepositoryError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        for u in &catalog.universities {
            tx.execute(
                "INSERT OR REPLACE INTO universities (id, name, url) VALUES (?1, ?2, ?3)",
                params![u.id, u.name, u.url],
            )?;
        }
        for m in &catalog.majors {
            tx.execute(
                "INSERT OR REPLACE INTO majors (id, university_id, name) VALUES (?1, ?2, ?3)",
                params![m.id, m.university_id, m.name],
            )?;
        }
        for r in &catalog.requirements {
            tx.execute(
                "INSERT OR REPLACE INTO requirements (
                    id, major_id, category, required, courses_json,
                    selection_rule, selection_count, selection_description
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    r.id,
                    r.major_id,
                    r.category,
                    r.required,
                    serde_json::to_string(&r.courses)?,
                    selection_rule_str(r.selection_rule),
                    r.selection_count,
                    r.selection_description,
                ],
            )?;
        }
        for c in &catalog.target_courses {
            tx.execute(
                "INSERT OR REPLACE INTO target_courses (id, university_id, code, name, units) VALUES (?1, ?2, ?3, ?4, ?5)",
                params![c.id, c.university_id, c.code, c.name, c.units],
            )?;
        }
        for e in &catalog.equivalencies {
            tx.execute(
                "INSERT OR REPLACE INTO equivalencies (
                    id, target_course_id, source_course_ids_json, and_relationship,
                    is_sequential_pair, alternative_sets_json, has_no_equivalent, no_equivalent_message
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    e.id,
                    e.target_course_id,
                    serde_json::to_string(&e.source_course_ids)?,
                    e.and_relationship,
                    e.is_sequential_pair,
                    serde_json::to_string(&e.alternative_sets)?,
                    e.has_no_equivalent,
                    e.no_equivalent_message,
                ],
            )?;
        }
        for c in &catalog.source_courses {
            tx.execute(
                "INSERT OR REPLACE INTO source_courses (
                    id, code, name, units, prerequisites_json,
                    co_requisites_json, terms_offered_json, additional_notes
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    c.id,
                    c.code,
                    c.name,
                    c.units,
                    serde_json::to_string(&c.prerequisites)?,
                    serde_json::to_string(&c.co_requisites)?,
                    serde_json::to_string(&c.terms_offered)?,
                    c.additional_notes,
                ],
            )?;
        }

        tx.commit()?;
        log::info!(
            "catalog imported into SQLite: {} requirements, {} equivalencies, {} source courses",
            catalog.requirements.len(),
            catalog.equivalencies.len(),
            catalog.source_courses.len()
        );
        Ok(())
    }

    fn query_target_courses(&self, sql: &str, args: Vec<String>) -> Result<Vec<TargetCourse>, RepositoryError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(sql)?;
        let rows = stmt.query_map(params_from_iter(args.iter()), |row| {
            Ok(TargetCourse {
                id: row.get(0)?,
                university_id: row.get(1)?,
                code: row.get(2)?,
                name: row.get(3)?,
                units: row.get(4)?,
            })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}

impl CourseRepository for SqliteRepository {
    fn find_requirements(&self, major_id: &str) -> Result<Vec<Requirement>, RepositoryError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, major_id, category, required, courses_json, selection_rule, selection_count, selection_description
             FROM requirements WHERE major_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![major_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, Option<u32>>(6)?,
                row.get::<_, String>(7)?,
            ))
        })?;

        let mut out = Vec::new();
        for r in rows {
            let (id, major_id, category, required, courses_json, rule, selection_count, selection_description) = r?;
            out.push(Requirement {
                id,
                major_id,
                category,
                required,
                courses: serde_json::from_str(&courses_json)?,
                selection_rule: parse_selection_rule(&rule),
                selection_count,
                selection_description,
            });
        }
        Ok(out)
    }

    fn find_target_courses(&self, ids: &BTreeSet<String>) -> Result<Vec<TargetCourse>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT id, university_id, code, name, units FROM target_courses WHERE id IN ({}) ORDER BY id",
            placeholders(ids.len())
        );
        self.query_target_courses(&sql, ids.iter().cloned().collect())
    }

    fn find_equivalencies(&self, target_course_ids: &BTreeSet<String>) -> Result<Vec<Equivalency>, RepositoryError> {
        if target_course_ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.lock()?;
        let sql = format!(
            "SELECT id, target_course_id, source_course_ids_json, and_relationship, is_sequential_pair,
                    alternative_sets_json, has_no_equivalent, no_equivalent_message
             FROM equivalencies WHERE target_course_id IN ({}) ORDER BY id",
            placeholders(target_course_ids.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(target_course_ids.iter()), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, bool>(3)?,
                row.get::<_, bool>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, bool>(6)?,
                row.get::<_, Option<String>>(7)?,
            ))
        })?;

        let mut out = Vec::new();
        for r in rows {
            let (id, target_course_id, sources_json, and_relationship, is_sequential_pair, alt_json, has_no_equivalent, no_equivalent_message) = r?;
            out.push(Equivalency {
                id,
                target_course_id,
                source_course_ids: serde_json::from_str(&sources_json)?,
                and_relationship,
                is_sequential_pair,
                alternative_sets: serde_json::from_str(&alt_json)?,
                has_no_equivalent,
                no_equivalent_message,
            });
        }
        Ok(out)
    }

    fn find_source_courses(&self, ids: &BTreeSet<String>) -> Result<Vec<SourceCourse>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let conn = self.lock()?;
        let sql = format!(
            "SELECT id, code, name, units, prerequisites_json, co_requisites_json, terms_offered_json, additional_notes
             FROM source_courses WHERE id IN ({}) ORDER BY id",
            placeholders(ids.len())
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt.query_map(params_from_iter(ids.iter()), |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, f64>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, String>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, String>(7)?,
            ))
        })?;

        let mut out = Vec::new();
        for r in rows {
            let (id, code, name, units, prereq_json, coreq_json, terms_json, additional_notes) = r?;
            out.push(SourceCourse {
                id,
                code,
                name,
                units,
                prerequisites: serde_json::from_str(&prereq_json)?,
                co_requisites: serde_json::from_str(&coreq_json)?,
                terms_offered: serde_json::from_str(&terms_json)?,
                additional_notes,
            });
        }
        Ok(out)
    }

    fn find_courses_by_university(&self, university_id: &str) -> Result<Vec<TargetCourse>, RepositoryError> {
        self.query_target_courses(
            "SELECT id, university_id, code, name, units FROM target_courses WHERE university_id = ?1 ORDER BY id",
            vec![university_id.to_string()],
        )
    }

    fn universities(&self) -> Result<Vec<University>, RepositoryError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, name, url FROM universities ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(University { id: row.get(0)?, name: row.get(1)?, url: row.get(2)? })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }

    fn majors(&self, university_id: &str) -> Result<Vec<Major>, RepositoryError> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT id, university_id, name FROM majors WHERE university_id = ?1 ORDER BY id")?;
        let rows = stmt.query_map(params![university_id], |row| {
            Ok(Major { id: row.get(0)?, university_id: row.get(1)?, name: row.get(2)? })
        })?;
        let mut out = Vec::new();
        for r in rows {
            out.push(r?);
        }
        Ok(out)
    }
}
