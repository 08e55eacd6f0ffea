use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpServer};
use log::{info, warn};
use rusqlite::Connection;
use std::io;
use std::sync::{Arc, Mutex};

use crate::analytics::init_db;
use crate::config::ServerConfig;
use crate::error::RepositoryError;
use crate::repository::{CourseRepository, InMemoryRepository, SqliteRepository};
use crate::server_handlers::{
    adjust_handler, chains_handler, help_handler, history_handler, majors_handler, plan_handler, summary_handler,
    universities_handler,
};

/// Shared by every worker: the catalog and the optional history log.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<dyn CourseRepository>,
    pub history: Option<Arc<Mutex<Connection>>>,
}

impl AppState {
    pub fn new(repo: Arc<dyn CourseRepository>) -> Self {
        AppState { repo, history: None }
    }

    pub fn with_history(mut self, conn: Connection) -> Self {
        self.history = Some(Arc::new(Mutex::new(conn)));
        self
    }
}

/// Registers every route; shared by `run_server` and the HTTP tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/help", web::get().to(help_handler))
        .route("/universities", web::get().to(universities_handler))
        .route("/universities/{id}/majors", web::get().to(majors_handler))
        .route("/chains", web::post().to(chains_handler))
        .route("/plan", web::post().to(plan_handler))
        .route("/plan/adjust", web::post().to(adjust_handler))
        .route("/plan/summary", web::post().to(summary_handler))
        .route("/history", web::get().to(history_handler));
}

/// SQLite catalog when configured (seeded from the JSON catalog on first
/// use), otherwise the JSON catalog held in memory.
pub fn load_repository(config: &ServerConfig) -> Result<Arc<dyn CourseRepository>, RepositoryError> {
    match &config.catalog_db_path {
        Some(db_path) => {
            let repo = SqliteRepository::open(db_path)?;
            if repo.is_empty()? {
                info!("seeding {} from {}", db_path.display(), config.catalog_path.display());
                let seed = InMemoryRepository::load(&config.catalog_path)?;
                repo.import_catalog(seed.catalog())?;
            }
            Ok(Arc::new(repo))
        }
        None => Ok(Arc::new(InMemoryRepository::load(&config.catalog_path)?)),
    }
}

pub async fn run_server(config: ServerConfig) -> io::Result<()> {
    let repo = load_repository(&config).map_err(io::Error::other)?;
    let mut state = AppState::new(repo);
    match init_db(&config.history_db_path) {
        Ok(conn) => state = state.with_history(conn),
        Err(e) => warn!("plan history disabled ({}): {}", config.history_db_path.display(), e),
    }

    info!("listening on http://{}", config.bind);
    let data = web::Data::new(state);
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .app_data(data.clone())
            .configure(configure)
    })
    .bind(config.bind.as_str())?
    .run()
    .await
}
