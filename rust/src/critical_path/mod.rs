//! Critical path analysis.
//!
//! Runs the backward pass over an earliest-time schedule to obtain latest
//! start/finish times and slack, then enumerates every chain of zero-slack
//! activities that determines the makespan.

mod calculation;
mod types;

pub use calculation::CriticalPathExtractor;
pub use types::{time_tolerance, ActivityTiming, CriticalPathResult, Schedule, TIME_EPSILON};
