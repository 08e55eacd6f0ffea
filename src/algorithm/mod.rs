// Planning core: chain building, allocation and plan edits.
mod allocator;
pub mod chains;
pub mod flatten;
pub mod mutate;
pub mod planner;
pub mod priority;
mod repair;

pub use allocator::generate_plan;
pub use chains::{build_chains, DEFAULT_NO_EQUIVALENT_MESSAGE};
pub use flatten::flatten_chains;
pub use mutate::{
    add_course, apply_adjustments, move_course, remove_course, sort_by_prerequisites, Adjustment, AdjustmentOutcome,
};
pub use planner::{build_combined_chains, describe_target, generate_combined_plan, merge_forests};
pub use priority::{alternative_score, course_priority, processing_order};
