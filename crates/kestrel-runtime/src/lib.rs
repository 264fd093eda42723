//! Kestrel Runtime
//!
//! Small scheduling primitives on top of tokio. Everything here is driven by
//! `tokio::time`, so tests can run on the paused virtual clock.

mod debounce;
mod task;

pub use debounce::Debouncer;
pub use task::ScheduledTask;
