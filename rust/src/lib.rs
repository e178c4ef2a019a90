//! PERT/CPM scheduling engine.
//!
//! Builds a validated precedence graph once, binds any number of duration
//! scenarios to it, and computes for each scenario the earliest/latest
//! schedule, slack, makespan and every critical path.

// Allow clippy warning triggered by PyO3 macro expansion
#![allow(clippy::useless_conversion)]

use pyo3::prelude::*;

mod config;
pub mod critical_path;
pub mod graph;
pub mod interner;
pub mod logging;
mod models;
pub mod runner;
pub mod sample;
pub mod scenario;
pub mod solver;

pub use config::RunConfig;
pub use critical_path::{ActivityTiming, CriticalPathExtractor, CriticalPathResult, Schedule};
pub use graph::{ActivityGraph, GraphError};
pub use models::{Activity, ActivityReport, ScenarioDefinition, ScenarioReport};
pub use runner::{RunnerError, ScenarioOutcome, ScenarioRunError, ScenarioRunner};
pub use scenario::{DurationScenario, ScenarioError};
#[cfg(feature = "lp")]
pub use solver::LinearProgram;
pub use solver::{
    ConfigError, EarliestSchedule, ForwardPass, ScheduleStrategy, SolverError, StrategyKind,
};

/// Solve several duration scenarios over one set of activities.
///
/// # Arguments
/// * `activities` - Activities with their predecessor IDs
/// * `scenarios` - Named duration maps, one entry per activity
/// * `config` - Run configuration (strategy, parallelism, verbosity)
///
/// # Returns
/// * One ScenarioReport per scenario, in input order. A scenario that fails
///   to bind or solve carries its message in `error`.
///
/// # Raises
/// * ValueError if the activity graph is invalid or the config is rejected
#[pyfunction]
#[pyo3(signature = (activities, scenarios, config=None))]
fn solve_scenarios(
    activities: Vec<Activity>,
    scenarios: Vec<ScenarioDefinition>,
    config: Option<RunConfig>,
) -> PyResult<Vec<ScenarioReport>> {
    let graph = ActivityGraph::build(&activities)
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;

    let runner = ScenarioRunner::new(config.unwrap_or_default())
        .map_err(|e| pyo3::exceptions::PyValueError::new_err(e.to_string()))?;

    let reports = runner
        .run_definitions(&graph, &scenarios)
        .iter()
        .zip(&scenarios)
        .map(|(result, definition)| match result {
            Ok(outcome) => ScenarioReport::from_outcome(outcome),
            Err(e) => ScenarioReport::from_error(&definition.name, e),
        })
        .collect();

    Ok(reports)
}

/// Order activity IDs so that every activity follows its predecessors.
///
/// # Raises
/// * ValueError on duplicate IDs, unknown predecessors or cycles
#[pyfunction]
#[pyo3(name = "topological_order")]
fn py_topological_order(activities: Vec<Activity>) -> PyResult<Vec<String>> {
    match ActivityGraph::build(&activities) {
        Ok(graph) => Ok(graph
            .topological_order()
            .into_iter()
            .map(str::to_string)
            .collect()),
        Err(e) => Err(pyo3::exceptions::PyValueError::new_err(e.to_string())),
    }
}

/// The sample proposal project: its activities and best/expected/worst scenarios.
#[pyfunction]
fn proposal_example() -> (Vec<Activity>, Vec<ScenarioDefinition>) {
    (sample::proposal_activities(), sample::proposal_scenarios())
}

/// The pert.rust Python module.
#[pymodule]
fn rust(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core data types
    m.add_class::<Activity>()?;
    m.add_class::<ScenarioDefinition>()?;
    m.add_class::<ActivityReport>()?;
    m.add_class::<ScenarioReport>()?;

    // Config types
    m.add_class::<RunConfig>()?;

    // Algorithms
    m.add_function(wrap_pyfunction!(solve_scenarios, m)?)?;
    m.add_function(wrap_pyfunction!(py_topological_order, m)?)?;
    m.add_function(wrap_pyfunction!(proposal_example, m)?)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_scenarios_reports() {
        let (activities, scenarios) = proposal_example();
        let config = RunConfig {
            parallel: false,
            ..Default::default()
        };
        let reports = solve_scenarios(activities, scenarios, Some(config)).unwrap();

        assert_eq!(reports.len(), 3);
        assert_eq!(reports[0].name, "best");
        assert_eq!(reports[0].makespan, 86.0);
        assert!(reports[0].error.is_none());
        assert_eq!(reports[0].activities.len(), 15);
        assert_eq!(reports[0].activities[0].activity_id, "DescribeProduct");
        assert_eq!(reports[0].critical_paths.len(), 1);
        assert_eq!(reports[1].makespan, 172.0);
        assert_eq!(reports[2].makespan, 890.0);

        let coding = reports[0]
            .activities
            .iter()
            .find(|a| a.activity_id == "Coding")
            .unwrap();
        assert!(coding.critical);
        assert_eq!((coding.earliest_start, coding.earliest_finish), (24.0, 44.0));
    }

    #[test]
    fn test_solve_scenarios_reports_bad_scenario() {
        let (activities, mut scenarios) = proposal_example();
        scenarios[1].durations.insert("Coding".into(), -4.0);
        let reports = solve_scenarios(activities, scenarios, None).unwrap();

        assert!(reports[0].error.is_none());
        let error = reports[1].error.as_deref().unwrap();
        assert!(error.contains("negative duration"));
        assert!(reports[1].activities.is_empty());
        assert!(reports[2].error.is_none());
    }

    #[test]
    fn test_topological_order_rejects_cycle() {
        let activities = vec![Activity::new("a", ["b"]), Activity::new("b", ["a"])];
        assert!(py_topological_order(activities).is_err());
    }

    #[test]
    fn test_topological_order_of_proposal() {
        let order = py_topological_order(sample::proposal_activities()).unwrap();
        assert_eq!(order.first().map(String::as_str), Some("DescribeProduct"));
        assert_eq!(order.last().map(String::as_str), Some("WriteProposal"));
    }
}
