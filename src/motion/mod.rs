// Motion synthesis: instant and interpolated coordinated moves

pub mod executor;
pub mod planner;
mod scheduler;

pub use executor::apply_instant;
pub use planner::apply_smooth;
pub use scheduler::{BlockingScheduler, StepScheduler};

#[cfg(test)]
pub(crate) use scheduler::RecordingScheduler;
