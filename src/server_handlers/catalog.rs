use actix_web::{web, HttpResponse, Responder};
use log::error;
use serde_json::json;
use crate::server::AppState;

/// GET /universities
pub async fn universities_handler(state: web::Data<AppState>) -> impl Responder {
    match state.repo.universities() {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => {
            error!("failed to list universities: {}", e);
            HttpResponse::InternalServerError().json(json!({"error": e.to_string()}))
        }
    }
}

/// GET /universities/{id}/majors
pub async fn majors_handler(state: web::Data<AppState>, path: web::Path<String>) -> impl Responder {
    let university_id = path.into_inner();
    match state.repo.find_university(&university_id) {
        Ok(Some(_)) => {}
        Ok(None) => {
            return HttpResponse::NotFound().json(json!({"error": format!("unknown university '{}'", university_id)}));
        }
        Err(e) => {
            error!("failed to look up university {}: {}", university_id, e);
            return HttpResponse::InternalServerError().json(json!({"error": e.to_string()}));
        }
    }
    match state.repo.majors(&university_id) {
        Ok(list) => HttpResponse::Ok().json(list),
        Err(e) => {
            error!("failed to list majors of {}: {}", university_id, e);
            HttpResponse::InternalServerError().json(json!({"error": e.to_string()}))
        }
    }
}
