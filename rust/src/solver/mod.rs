//! Earliest-time schedule computation.
//!
//! Two interchangeable strategies implement [`ScheduleStrategy`]:
//! - [`ForwardPass`]: longest-path sweep over the topological order (default)
//! - [`LinearProgram`]: the same problem posed as an LP, behind the `lp` feature
//!
//! For an acyclic graph with non-negative durations the component-wise minimal
//! start vector is unique, so both strategies yield the same schedule.

mod forward;
#[cfg(feature = "lp")]
mod linear;

use std::str::FromStr;
use thiserror::Error;

use crate::scenario::DurationScenario;

pub use forward::ForwardPass;
#[cfg(feature = "lp")]
pub use linear::{LinearProgram, LP_TOLERANCE};

/// Internal solver failure.
///
/// Inputs reaching a strategy are already validated, so this always
/// indicates a defect rather than bad data.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SolverError {
    #[error("Unexpected solver failure: {0}")]
    Unexpected(String),
}

/// Errors in selecting a strategy.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Unknown schedule strategy: {0}")]
    UnknownStrategy(String),
    #[error("Schedule strategy {0} is not available in this build")]
    StrategyUnavailable(String),
}

/// Earliest start and finish per activity, indexed by activity index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EarliestSchedule {
    pub earliest_start: Vec<f64>,
    pub earliest_finish: Vec<f64>,
}

impl EarliestSchedule {
    pub fn len(&self) -> usize {
        self.earliest_start.len()
    }

    pub fn is_empty(&self) -> bool {
        self.earliest_start.is_empty()
    }
}

/// Computes the minimal feasible earliest-time schedule for a scenario.
pub trait ScheduleStrategy: Send + Sync {
    /// Short name used in logs and configuration.
    fn name(&self) -> &'static str;

    fn solve(&self, scenario: &DurationScenario<'_>) -> Result<EarliestSchedule, SolverError>;
}

/// Selectable strategies.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StrategyKind {
    ForwardPass,
    LinearProgram,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ForwardPass => "forward_pass",
            Self::LinearProgram => "linear_program",
        }
    }

    /// Instantiate the strategy with the given log verbosity.
    pub fn build(self, verbosity: u8) -> Result<Box<dyn ScheduleStrategy>, ConfigError> {
        match self {
            Self::ForwardPass => Ok(Box::new(ForwardPass::new(verbosity))),
            #[cfg(feature = "lp")]
            Self::LinearProgram => Ok(Box::new(LinearProgram::new(verbosity))),
            #[cfg(not(feature = "lp"))]
            Self::LinearProgram => Err(ConfigError::StrategyUnavailable(
                self.as_str().to_string(),
            )),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "forward_pass" => Ok(Self::ForwardPass),
            "linear_program" => Ok(Self::LinearProgram),
            other => Err(ConfigError::UnknownStrategy(other.to_string())),
        }
    }
}
