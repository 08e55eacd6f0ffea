mod common;

use classpath::algorithm::{apply_adjustments, generate_combined_plan, Adjustment};
use classpath::models::{Plan, ScheduledCourse, Target, Term};
use classpath::render::plan_summary;
use common::{assert_plan_invariants, bundled_repo, constraints};

fn term(name: &str) -> Term {
    name.parse().unwrap()
}

fn software_plan() -> Plan {
    let repo = bundled_repo();
    let target = Target { university_id: "sjsu".to_string(), major_id: "sjsu_software_eng".to_string() };
    generate_combined_plan(&[target], &constraints("Fall 2024", 4), &repo).unwrap()
}

fn course_named(plan: &Plan, code: &str) -> ScheduledCourse {
    plan.terms.iter().flat_map(|t| t.courses.iter()).find(|c| c.code == code).cloned().unwrap()
}

#[test]
fn test_generated_plan_layout() {
    let plan = software_plan();
    assert_eq!(plan.terms.len(), 2);
    assert_eq!(plan.terms[0].name, term("Fall 2024"));
    assert_eq!(plan.terms[0].courses.len(), 3);
    assert_eq!(plan.terms[0].units, 14.5);
    assert_eq!(plan.term_of("MATH 1B"), Some(1));
    assert_eq!(plan.total_units, 19.5);
}

#[test]
fn test_batch_of_adjustments() {
    let mut plan = software_plan();
    let math_1a = course_named(&plan, "MATH 1A");

    let adjustments = vec![
        Adjustment::Move { code: "ENGL 1A".to_string(), from: term("Fall 2024"), to: term("Winter 2024") },
        Adjustment::Move { code: "MATH 1A".to_string(), from: term("Fall 2024"), to: term("Winter 2024") },
        Adjustment::Move { code: "CIS 36A".to_string(), from: term("Fall 2024"), to: term("Spring 2024") },
        Adjustment::Remove { code: "MATH 1A".to_string(), term: term("Fall 2024") },
        Adjustment::Add { course: math_1a.clone(), term: term("Fall 2024") },
        Adjustment::Add { course: math_1a, term: term("Winter 2024") },
    ];
    let outcomes = apply_adjustments(&mut plan, &adjustments);
    let applied: Vec<bool> = outcomes.iter().map(|o| o.applied).collect();
    assert_eq!(applied, vec![true, false, false, true, true, false]);

    assert!(outcomes[1].error.as_deref().unwrap().contains("dependent MATH 1B"));
    assert_eq!(outcomes[2].error.as_deref(), Some("term Spring 2024 not found in plan"));
    assert_eq!(outcomes[3].orphaned, vec!["MATH 1B"]);
    assert!(outcomes[5].error.as_deref().unwrap().contains("already scheduled"));

    assert_plan_invariants(&plan, &constraints("Fall 2024", 4));
    assert_eq!(plan.term_of("ENGL 1A"), Some(1));
    assert_eq!(plan.term_of("MATH 1A"), Some(0));
    assert_eq!(plan.terms[0].units, 9.5);
    assert_eq!(plan.terms[1].units, 10.0);
    assert_eq!(plan.total_units, 19.5);
}

#[test]
fn test_plan_survives_json_and_renders() {
    let plan = software_plan();
    let text = serde_json::to_string(&plan).unwrap();
    let back: Plan = serde_json::from_str(&text).unwrap();
    assert_eq!(back, plan);

    let summary = plan_summary(&plan);
    assert!(summary.contains("Software Engineering at San Jose State University"));
    assert!(summary.contains("From Fall 2024 to Winter 2024: 19.5 units"));
    assert!(summary.contains("MATH 1B - Calculus (5 units) [prereqs: MATH 1A]"));
}
