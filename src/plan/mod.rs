//! Plan building: resolving candidate files into an ordered work list.

pub mod builder;
pub mod list;
pub mod task;

pub use builder::{PlanBuilder, SkipReason, INTERMEDIATE_FORMAT};
pub use list::OrderedTaskList;
pub use task::ConversionTask;
