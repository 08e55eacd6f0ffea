use actix_web::{web, HttpResponse, Responder};
use serde::Deserialize;
use serde_json::json;
use crate::analytics::recent_plans;
use crate::server::AppState;

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 200;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
}

/// GET /history?limit=N
/// Latest generated plans, newest first.
pub async fn history_handler(state: web::Data<AppState>, query: web::Query<HistoryQuery>) -> impl Responder {
    let Some(history) = state.history.clone() else {
        return HttpResponse::NotFound().json(json!({"error": "plan history is disabled"}));
    };
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let rows = tokio::task::spawn_blocking(move || {
        let conn = history.lock().map_err(|_| "history lock poisoned".to_string())?;
        recent_plans(&conn, limit).map_err(|e| e.to_string())
    })
    .await;

    match rows {
        Ok(Ok(records)) => HttpResponse::Ok().json(json!({"count": records.len(), "plans": records})),
        Ok(Err(e)) => HttpResponse::InternalServerError().json(json!({"error": e})),
        Err(e) => HttpResponse::InternalServerError().json(json!({"error": format!("task join error: {}", e)})),
    }
}
