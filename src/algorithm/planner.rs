use crate::error::PlannerError;
use crate::models::{Chain, ChainForest, Constraints, Plan, Target, TargetInfo};
use crate::repository::CourseRepository;
use super::allocator::generate_plan;
use super::chains::build_chains;

const UNKNOWN_UNIVERSITY: &str = "Unknown University";
const UNKNOWN_MAJOR: &str = "Unknown Major";

/// Fold `incoming` into `existing` (same course code): keep the deeper
/// level and add the prerequisite sub-chains `existing` lacks.
fn merge_chain(existing: &mut Chain, incoming: &Chain) {
    existing.level = existing.level.max(incoming.level);
    existing.course.level = existing.level;
    for child in &incoming.prerequisites {
        match existing.prerequisites.iter_mut().find(|c| c.course.code == child.course.code) {
            Some(known) => merge_chain(known, child),
            None => existing.prerequisites.push(child.clone()),
        }
    }
}

/// Merge the forests of several majors into one.
pub fn merge_forests(forests: Vec<ChainForest>) -> ChainForest {
    let mut merged = ChainForest::default();
    for forest in forests {
        for chain in forest.chains {
            match merged.chains.iter_mut().find(|c| c.course.code == chain.course.code) {
                Some(existing) => merge_chain(existing, &chain),
                None => merged.chains.push(chain),
            }
        }
        for course in forest.no_equivalent_courses {
            if !merged.no_equivalent_courses.iter().any(|c| c.target_course_id == course.target_course_id) {
                merged.no_equivalent_courses.push(course);
            }
        }
        for gap in forest.unmapped {
            if !merged.unmapped.contains(&gap) {
                merged.unmapped.push(gap);
            }
        }
        for group in forest.groups {
            if !merged.groups.contains(&group) {
                merged.groups.push(group);
            }
        }
    }
    merged
}

/// Display names of a target, with placeholders for unknown ids.
pub fn describe_target(target: &Target, repo: &dyn CourseRepository) -> Result<TargetInfo, PlannerError> {
    let university = repo.find_university(&target.university_id)?;
    let major = repo.find_major(&target.university_id, &target.major_id)?;
    Ok(TargetInfo {
        university_id: target.university_id.clone(),
        major_id: target.major_id.clone(),
        university_name: university.map(|u| u.name).unwrap_or_else(|| UNKNOWN_UNIVERSITY.to_string()),
        major_name: major.map(|m| m.name).unwrap_or_else(|| UNKNOWN_MAJOR.to_string()),
    })
}

/// Chains of every target merged into one forest.
pub fn build_combined_chains(targets: &[Target], repo: &dyn CourseRepository) -> Result<ChainForest, PlannerError> {
    let mut forests = Vec::with_capacity(targets.len());
    for target in targets {
        forests.push(build_chains(&target.university_id, &target.major_id, repo)?);
    }
    Ok(merge_forests(forests))
}

/// One plan covering the requirements of every target.
pub fn generate_combined_plan(
    targets: &[Target],
    constraints: &Constraints,
    repo: &dyn CourseRepository,
) -> Result<Plan, PlannerError> {
    let forest = build_combined_chains(targets, repo)?;
    let mut plan = generate_plan(&forest, constraints);
    plan.targets = targets
        .iter()
        .map(|t| describe_target(t, repo))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(plan)
}
