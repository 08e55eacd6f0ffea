// Transfer course planner.
//
// `algorithm` turns a major's requirements into prerequisite chains and a
// term-by-term plan; `server` exposes it over HTTP.
pub mod algorithm;
pub mod analytics;
pub mod api_json;
pub mod config;
pub mod error;
pub mod models;
pub mod render;
pub mod repository;
pub mod server;
pub mod server_handlers;

pub use algorithm::{build_chains, generate_combined_plan, generate_plan};
pub use config::ServerConfig;
pub use error::{MutationError, PlannerError, RepositoryError};
pub use server::run_server;
