pub mod catalog;
pub mod docs;
pub mod history;
pub mod plan;

pub use catalog::*;
pub use docs::*;
pub use history::*;
pub use plan::*;
