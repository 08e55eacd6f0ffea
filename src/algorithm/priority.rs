// Ordering heuristics of the allocator.

use crate::models::{Constraints, CourseNode};

const LEVEL_WEIGHT: i64 = 10;
const DEPENDENT_WEIGHT: i64 = 5;
const AVOID_PENALTY: i64 = 15;
const USER_PRIORITY_BONUS: i64 = 20;
const AVOIDED_ALTERNATIVE_PENALTY: f64 = 50.0;

/// Bonus for courses offered in few seasons.
fn scarcity_bonus(node: &CourseNode) -> i64 {
    match node.terms_offered.len() {
        1 => 15,
        2 => 10,
        3 => 5,
        _ => 0,
    }
}

/// `level*10 + dependents*5 + scarcity - avoid + userPriority`.
pub fn course_priority(node: &CourseNode, constraints: &Constraints) -> i64 {
    let mut priority = node.level as i64 * LEVEL_WEIGHT;
    priority += node.dependents.len() as i64 * DEPENDENT_WEIGHT;
    priority += scarcity_bonus(node);
    if constraints.is_avoided_course(&node.code) {
        priority -= AVOID_PENALTY;
    }
    if constraints.is_priority_course(&node.code) {
        priority += USER_PRIORITY_BONUS;
    }
    priority
}

/// Score used to pick one member of an alternative group. Fewer prerequisites,
/// wider offering and lighter load win; avoided courses are pushed down hard.
pub fn alternative_score(node: &CourseNode, constraints: &Constraints) -> f64 {
    let mut score = -2.0 * node.prerequisites.len() as f64;
    score += 3.0 * node.offered_count() as f64;
    score += constraints.effective_max_units() - node.units;
    if constraints.is_avoided_course(&node.code) {
        score -= AVOIDED_ALTERNATIVE_PENALTY;
    }
    score
}

/// Indices of `courses` in processing order: priority descending, then
/// regrouped by ascending level. Both sorts are stable.
pub fn processing_order(courses: &[CourseNode], constraints: &Constraints) -> Vec<usize> {
    let mut order: Vec<usize> = (0..courses.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(course_priority(&courses[i], constraints)));
    order.sort_by_key(|&i| courses[i].level);
    order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Season;

    fn node(code: &str, level: u32, dependents: usize, offered: Vec<Season>) -> CourseNode {
        CourseNode {
            code: code.to_string(),
            name: code.to_string(),
            units: 5.0,
            prerequisites: vec![],
            dependents: (0..dependents).map(|i| format!("D{}", i)).collect(),
            alternatives: vec![],
            co_requisites: vec![],
            terms_offered: offered,
            level,
            additional_notes: String::new(),
        }
    }

    #[test]
    fn test_priority_formula() {
        let mut c = Constraints::default();
        let n = node("CIS 22A", 2, 3, vec![Season::Fall]);
        assert_eq!(course_priority(&n, &c), 20 + 15 + 15);

        c.priority_courses.insert("CIS 22A".to_string());
        assert_eq!(course_priority(&n, &c), 70);

        c.avoid_courses.insert("CIS 22A".to_string());
        assert_eq!(course_priority(&n, &c), 55);

        let everywhere = node("X", 0, 0, vec![]);
        assert_eq!(course_priority(&everywhere, &Constraints::default()), 0);
    }

    #[test]
    fn test_alternative_score_penalises_avoided() {
        let mut c = Constraints::default();
        let a = node("MATH 10", 0, 0, vec![]);
        let b = node("MATH 10H", 0, 0, vec![Season::Fall, Season::Winter]);
        assert!(alternative_score(&a, &c) > alternative_score(&b, &c));
        c.avoid_courses.insert("MATH 10".to_string());
        assert!(alternative_score(&a, &c) < alternative_score(&b, &c));
    }

    #[test]
    fn test_processing_order_groups_by_level() {
        let c = Constraints::default();
        let courses = vec![
            node("HIGH", 2, 0, vec![]),
            node("LOW", 0, 0, vec![]),
            node("SCARCE", 0, 0, vec![Season::Spring]),
            node("MID", 1, 4, vec![]),
        ];
        let order: Vec<&str> = processing_order(&courses, &c).into_iter().map(|i| courses[i].code.as_str()).collect();
        assert_eq!(order, vec!["SCARCE", "LOW", "MID", "HIGH"]);
    }
}
