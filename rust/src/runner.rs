//! Evaluation of several duration scenarios against one activity graph.

use rayon::prelude::*;
use thiserror::Error;

use crate::config::RunConfig;
use crate::critical_path::{CriticalPathExtractor, CriticalPathResult, Schedule};
use crate::graph::ActivityGraph;
use crate::models::ScenarioDefinition;
use crate::scenario::{DurationScenario, ScenarioError};
use crate::solver::{ConfigError, ScheduleStrategy, SolverError};
use crate::{log_debug, log_summary};

/// Errors in setting up a runner.
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("Failed to build worker pool: {0}")]
    ThreadPool(String),
}

/// Failure of a single scenario. Sibling scenarios are unaffected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScenarioRunError {
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error("Scenario {scenario:?}: {source}")]
    Solver {
        scenario: String,
        #[source]
        source: SolverError,
    },
    #[error("Scenario {0:?} is bound to a different activity graph")]
    GraphMismatch(String),
}

/// Schedule and critical path of one scenario.
#[derive(Clone, Debug)]
pub struct ScenarioOutcome<'g> {
    pub name: String,
    pub schedule: Schedule<'g>,
    pub critical_path: CriticalPathResult,
}

/// Solves scenarios independently and returns results in input order.
pub struct ScenarioRunner {
    config: RunConfig,
    strategy: Box<dyn ScheduleStrategy>,
    extractor: CriticalPathExtractor,
    pool: Option<rayon::ThreadPool>,
}

impl ScenarioRunner {
    /// Build a runner using the strategy named in `config`.
    pub fn new(config: RunConfig) -> Result<Self, RunnerError> {
        let strategy = config.strategy_kind()?.build(config.verbosity)?;
        Self::with_strategy(config, strategy)
    }

    /// Build a runner around a caller-supplied strategy.
    pub fn with_strategy(
        config: RunConfig,
        strategy: Box<dyn ScheduleStrategy>,
    ) -> Result<Self, RunnerError> {
        let pool = match config.threads {
            Some(threads) if config.parallel => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| RunnerError::ThreadPool(e.to_string()))?,
            ),
            _ => None,
        };

        Ok(Self {
            extractor: CriticalPathExtractor::new(config.verbosity),
            config,
            strategy,
            pool,
        })
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Solve every scenario against `graph`.
    ///
    /// The i-th result belongs to the i-th scenario regardless of whether
    /// evaluation ran in parallel.
    pub fn run<'g>(
        &self,
        graph: &'g ActivityGraph,
        scenarios: &[DurationScenario<'g>],
    ) -> Vec<Result<ScenarioOutcome<'g>, ScenarioRunError>> {
        log_summary!(
            self.config.verbosity,
            "Running {} scenarios over {} activities with {}",
            scenarios.len(),
            graph.len(),
            self.strategy.name()
        );
        self.evaluate_all(scenarios, |scenario| self.evaluate(graph, scenario))
    }

    /// Bind and solve raw scenario definitions.
    ///
    /// A definition that fails to bind yields `ScenarioRunError::Scenario`
    /// in its slot; the remaining definitions are still evaluated.
    pub fn run_definitions<'g>(
        &self,
        graph: &'g ActivityGraph,
        definitions: &[ScenarioDefinition],
    ) -> Vec<Result<ScenarioOutcome<'g>, ScenarioRunError>> {
        log_summary!(
            self.config.verbosity,
            "Running {} scenario definitions over {} activities with {}",
            definitions.len(),
            graph.len(),
            self.strategy.name()
        );
        self.evaluate_all(definitions, |definition| {
            let scenario = DurationScenario::bind(
                graph,
                definition.name.as_str(),
                definition.durations.iter().map(|(id, &d)| (id.as_str(), d)),
            )?;
            self.evaluate(graph, &scenario)
        })
    }

    fn evaluate_all<'g, T, F>(
        &self,
        items: &[T],
        evaluate: F,
    ) -> Vec<Result<ScenarioOutcome<'g>, ScenarioRunError>>
    where
        T: Sync,
        F: Fn(&T) -> Result<ScenarioOutcome<'g>, ScenarioRunError> + Sync,
    {
        if !self.config.parallel {
            return items.iter().map(evaluate).collect();
        }
        // Indexed parallel collect keeps input order
        match &self.pool {
            Some(pool) => pool.install(|| items.par_iter().map(&evaluate).collect()),
            None => items.par_iter().map(&evaluate).collect(),
        }
    }

    fn evaluate<'g>(
        &self,
        graph: &'g ActivityGraph,
        scenario: &DurationScenario<'g>,
    ) -> Result<ScenarioOutcome<'g>, ScenarioRunError> {
        let name = scenario.name();
        if !std::ptr::eq(scenario.graph(), graph) {
            return Err(ScenarioRunError::GraphMismatch(name.to_string()));
        }

        let solver_error = |source: SolverError| ScenarioRunError::Solver {
            scenario: name.to_string(),
            source,
        };

        let earliest = self.strategy.solve(scenario).map_err(solver_error)?;
        let (schedule, critical_path) = self
            .extractor
            .extract(scenario, earliest)
            .map_err(solver_error)?;

        log_summary!(
            self.config.verbosity,
            "[{}] makespan={} critical paths={}",
            name,
            critical_path.makespan,
            critical_path.paths.len()
        );
        for path in &critical_path.paths {
            log_debug!(self.config.verbosity, "[{}]   {}", name, path.join(" -> "));
        }

        Ok(ScenarioOutcome {
            name: name.to_string(),
            schedule,
            critical_path,
        })
    }
}
