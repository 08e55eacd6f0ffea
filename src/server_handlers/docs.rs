use actix_web::{HttpResponse, Responder};
use serde_json::json;
use crate::algorithm::Adjustment;
use crate::api_json::PlanRequest;
use crate::models::{Constraints, Season, Target, Term};

pub async fn help_handler() -> impl Responder {
    let mut constraints = Constraints::default();
    constraints.max_terms = 6;
    constraints.max_units_per_term = 15.0;
    constraints.priority_courses.insert("MATH 1A".to_string());
    let example = PlanRequest {
        targets: vec![Target { university_id: "ucb".to_string(), major_id: "ucb_eecs".to_string() }],
        university_id: None,
        major_id: None,
        constraints,
    };
    let adjustment_example = vec![
        Adjustment::Move {
            code: "MATH 1B".to_string(),
            from: Term::new(Season::Winter, 2025),
            to: Term::new(Season::Spring, 2025),
        },
    ];

    let help = json!({
        "description": "Transfer course planner. POST /plan builds a term-by-term plan of source college courses that satisfy the requirements of one or more target majors.",
        "endpoints": {
            "GET /universities": "target universities in the catalog",
            "GET /universities/{id}/majors": "majors offered by a university",
            "POST /chains": "prerequisite chains for {universityId, majorId}",
            "POST /plan": "plan for 'targets' (or inline universityId/majorId) under 'constraints'",
            "POST /plan/adjust": "apply move/add/remove edits to a plan: {plan, adjustments}",
            "POST /plan/summary": "plain-text rendering of a plan",
            "GET /history?limit=N": "most recent generated plans"
        },
        "post_example": example,
        "adjust_example": adjustment_example,
        "note": "Terms are written '<Season> <Year>' with seasons Fall, Winter, Spring and Summer. Winter follows Fall within the same year number."
    });

    HttpResponse::Ok().json(help)
}
