//! Background maintenance jobs.

mod purge;
mod scheduler;

pub use purge::register_purge_job;
pub use scheduler::Scheduler;
