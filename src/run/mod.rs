//! Batch orchestration.
//!
//! A fixed pool of workers drains a shared domain queue through an atomic
//! cursor. Each claimed domain is looked up through the rate limiter and
//! the result cache, aggregated, and published into the shared result table.

mod resources;
mod session;
mod task;

pub use resources::{BatchReport, ProgressCallback, ResultTable};
pub use session::LookupSession;
