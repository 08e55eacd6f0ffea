use actix_web::{web, HttpResponse, Responder};
use log::{error, info, warn};
use serde_json::json;
use std::sync::{Arc, OnceLock};
use std::time::Instant;
use tokio::sync::Semaphore;

use crate::algorithm::{apply_adjustments, build_chains, generate_combined_plan};
use crate::analytics::{log_plan, PlanLogEntry};
use crate::api_json::{parse_plan_request, AdjustRequest, ChainsRequest};
use crate::error::PlannerError;
use crate::models::Plan;
use crate::render::plan_summary;
use crate::server::AppState;

fn planning_semaphore() -> Arc<Semaphore> {
    static GLOBAL_SEM: OnceLock<Arc<Semaphore>> = OnceLock::new();
    GLOBAL_SEM
        .get_or_init(|| {
            let procs = num_cpus::get();
            Arc::new(Semaphore::new(std::cmp::max(1, procs)))
        })
        .clone()
}

/// Runs `job` on the blocking pool, at most one job per CPU at a time.
async fn run_blocking<T, F>(job: F) -> Result<T, HttpResponse>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let permit = match planning_semaphore().acquire_owned().await {
        Ok(p) => p,
        Err(_) => return Err(HttpResponse::InternalServerError().json(json!({"error": "failed to acquire semaphore"}))),
    };

    let handle = tokio::task::spawn_blocking(move || {
        let _permit = permit;
        job()
    });

    handle
        .await
        .map_err(|e| HttpResponse::InternalServerError().json(json!({"error": format!("task join error: {}", e)})))
}

pub(crate) fn planner_error_response(err: &PlannerError) -> HttpResponse {
    match err {
        PlannerError::InvalidTerm(_) => HttpResponse::BadRequest().json(json!({"error": err.to_string()})),
        PlannerError::Repository(_) => {
            error!("planning failed: {}", err);
            HttpResponse::InternalServerError().json(json!({"error": err.to_string()}))
        }
    }
}

fn body_to_string(body: web::Json<serde_json::Value>) -> Result<String, HttpResponse> {
    serde_json::to_string(&body.into_inner())
        .map_err(|e| HttpResponse::BadRequest().json(json!({"error": format!("invalid JSON body: {}", e)})))
}

/// POST /chains
pub async fn chains_handler(state: web::Data<AppState>, body: web::Json<serde_json::Value>) -> impl Responder {
    let request: ChainsRequest = match serde_json::from_value(body.into_inner()) {
        Ok(r) => r,
        Err(e) => return HttpResponse::BadRequest().json(json!({"error": format!("failed to parse input: {}", e)})),
    };

    let repo = state.repo.clone();
    let result = match run_blocking(move || build_chains(&request.university_id, &request.major_id, repo.as_ref())).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    match result {
        Ok(forest) => HttpResponse::Ok().json(forest),
        Err(e) => planner_error_response(&e),
    }
}

/// POST /plan
/// Builds the plan off the async runtime and records it in the history log.
pub async fn plan_handler(state: web::Data<AppState>, body: web::Json<serde_json::Value>) -> impl Responder {
    let json_str = match body_to_string(body) {
        Ok(s) => s,
        Err(resp) => return resp,
    };

    let (request, targets) = match parse_plan_request(&json_str) {
        Ok(p) => p,
        Err(e) => return HttpResponse::BadRequest().json(json!({"error": format!("failed to parse input: {}", e)})),
    };

    let start = Instant::now();
    let repo = state.repo.clone();
    let constraints = request.constraints.clone();
    let plan_targets = targets.clone();
    let result = match run_blocking(move || generate_combined_plan(&plan_targets, &constraints, repo.as_ref())).await {
        Ok(r) => r,
        Err(resp) => return resp,
    };

    let plan = match result {
        Ok(p) => p,
        Err(e) => return planner_error_response(&e),
    };
    let duration_ms = start.elapsed().as_millis() as i64;
    info!(
        "plan for {} target(s): {} terms, {} units, {} unscheduled in {} ms",
        targets.len(),
        plan.terms.len(),
        plan.total_units,
        plan.unscheduled.len(),
        duration_ms
    );

    if let Some(history) = state.history.clone() {
        let targets_json = serde_json::to_string(&targets).unwrap_or_else(|_| "[]".to_string());
        let constraints_json = serde_json::to_string(&request.constraints).unwrap_or_else(|_| "{}".to_string());
        let total_units = plan.total_units;
        let term_count = plan.terms.len();
        let unscheduled_count = plan.unscheduled.len();
        let logged = tokio::task::spawn_blocking(move || {
            let conn = history.lock().map_err(|_| "history lock poisoned".to_string())?;
            let entry = PlanLogEntry {
                targets_json: &targets_json,
                constraints_json: &constraints_json,
                total_units,
                term_count,
                unscheduled_count,
                duration_ms,
            };
            log_plan(&conn, &entry).map_err(|e| e.to_string())
        })
        .await;
        match logged {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => warn!("failed to record plan history: {}", e),
            Err(e) => warn!("history task join error: {}", e),
        }
    }

    HttpResponse::Ok().json(plan)
}

/// POST /plan/adjust
/// Applies each edit in order; rejected edits are reported and skipped.
pub async fn adjust_handler(body: web::Json<serde_json::Value>) -> impl Responder {
    let request: AdjustRequest = match serde_json::from_value(body.into_inner()) {
        Ok(r) => r,
        Err(e) => return HttpResponse::BadRequest().json(json!({"error": format!("failed to parse input: {}", e)})),
    };
    let AdjustRequest { mut plan, adjustments } = request;
    let outcomes = apply_adjustments(&mut plan, &adjustments);
    HttpResponse::Ok().json(json!({"plan": plan, "outcomes": outcomes}))
}

/// POST /plan/summary
pub async fn summary_handler(body: web::Json<serde_json::Value>) -> impl Responder {
    let plan: Plan = match serde_json::from_value(body.into_inner()) {
        Ok(p) => p,
        Err(e) => return HttpResponse::BadRequest().json(json!({"error": format!("failed to parse plan: {}", e)})),
    };
    HttpResponse::Ok().json(json!({"summary": plan_summary(&plan)}))
}
