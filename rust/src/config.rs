//! Configuration types for the scheduling engine.

use pyo3::prelude::*;

use crate::solver::{ConfigError, StrategyKind};

/// Configuration for a scenario run.
#[pyclass]
#[derive(Clone, Debug)]
pub struct RunConfig {
    /// Schedule strategy: "forward_pass" or "linear_program"
    #[pyo3(get, set)]
    pub strategy: String,
    /// Evaluate scenarios on worker threads
    #[pyo3(get, set)]
    pub parallel: bool,
    /// Size of a dedicated worker pool (None = shared global pool)
    #[pyo3(get, set)]
    pub threads: Option<usize>,
    /// Verbosity level: 0=silent, 1=summary, 2=passes, 3=debug
    #[pyo3(get, set)]
    pub verbosity: u8,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::ForwardPass.as_str().to_string(),
            parallel: true,
            threads: None,
            verbosity: 0,
        }
    }
}

impl RunConfig {
    /// Parse the configured strategy name.
    pub fn strategy_kind(&self) -> Result<StrategyKind, ConfigError> {
        self.strategy.parse()
    }
}

#[pymethods]
impl RunConfig {
    #[new]
    #[pyo3(signature = (strategy=None, parallel=None, threads=None, verbosity=None))]
    fn new(
        strategy: Option<String>,
        parallel: Option<bool>,
        threads: Option<usize>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            strategy: strategy.unwrap_or(defaults.strategy),
            parallel: parallel.unwrap_or(defaults.parallel),
            threads: threads.or(defaults.threads),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "RunConfig(strategy={:?}, parallel={}, threads={:?}, verbosity={})",
            self.strategy, self.parallel, self.threads, self.verbosity
        )
    }
}
