pub mod db;

pub use db::{init_db, log_plan, recent_plans, PlanLogEntry, PlanRecord};
