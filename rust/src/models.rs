//! Core data types exchanged with callers of the engine.

use pyo3::prelude::*;
use std::collections::HashMap;

use crate::critical_path::CriticalPathResult;
use crate::runner::{ScenarioOutcome, ScenarioRunError};

// Note: We use std HashMap here for PyO3 interface compatibility

/// An activity and the activities that must finish before it can start.
#[pyclass]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Activity {
    #[pyo3(get, set)]
    pub id: String,
    #[pyo3(get, set)]
    pub predecessors: Vec<String>,
}

impl Activity {
    pub fn new<S, I, P>(id: S, predecessors: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = P>,
        P: Into<String>,
    {
        Self {
            id: id.into(),
            predecessors: predecessors.into_iter().map(Into::into).collect(),
        }
    }
}

#[pymethods]
impl Activity {
    #[new]
    #[pyo3(signature = (id, predecessors=None))]
    fn py_new(id: String, predecessors: Option<Vec<String>>) -> Self {
        Self {
            id,
            predecessors: predecessors.unwrap_or_default(),
        }
    }

    fn __repr__(&self) -> String {
        format!(
            "Activity(id={:?}, predecessors={:?})",
            self.id, self.predecessors
        )
    }
}

/// Raw scenario input: a name and a duration per activity ID.
#[pyclass]
#[derive(Clone, Debug, Default)]
pub struct ScenarioDefinition {
    #[pyo3(get, set)]
    pub name: String,
    #[pyo3(get, set)]
    pub durations: HashMap<String, f64>,
}

impl ScenarioDefinition {
    pub fn new<S, I, K>(name: S, durations: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        Self {
            name: name.into(),
            durations: durations.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

#[pymethods]
impl ScenarioDefinition {
    #[new]
    fn py_new(name: String, durations: HashMap<String, f64>) -> Self {
        Self { name, durations }
    }

    fn __repr__(&self) -> String {
        format!(
            "ScenarioDefinition(name={:?}, activities={})",
            self.name,
            self.durations.len()
        )
    }
}

/// Timing of one activity within a solved scenario.
#[pyclass]
#[derive(Clone, Debug, PartialEq)]
pub struct ActivityReport {
    #[pyo3(get)]
    pub activity_id: String,
    #[pyo3(get)]
    pub earliest_start: f64,
    #[pyo3(get)]
    pub earliest_finish: f64,
    #[pyo3(get)]
    pub latest_start: f64,
    #[pyo3(get)]
    pub latest_finish: f64,
    #[pyo3(get)]
    pub slack: f64,
    #[pyo3(get)]
    pub critical: bool,
}

#[pymethods]
impl ActivityReport {
    fn __repr__(&self) -> String {
        format!(
            "ActivityReport(activity_id={:?}, start={}, finish={}, slack={}, critical={})",
            self.activity_id, self.earliest_start, self.earliest_finish, self.slack, self.critical
        )
    }
}

/// Result of evaluating one scenario, flattened for reporting.
///
/// When the scenario failed, `error` holds the message and every other
/// collection is empty.
#[pyclass]
#[derive(Clone, Debug, Default)]
pub struct ScenarioReport {
    #[pyo3(get)]
    pub name: String,
    #[pyo3(get)]
    pub makespan: f64,
    #[pyo3(get)]
    pub activities: Vec<ActivityReport>,
    #[pyo3(get)]
    pub critical_paths: Vec<Vec<String>>,
    #[pyo3(get)]
    pub starting_activities: Vec<String>,
    #[pyo3(get)]
    pub finishing_activities: Vec<String>,
    #[pyo3(get)]
    pub total_work: f64,
    #[pyo3(get)]
    pub error: Option<String>,
}

impl ScenarioReport {
    /// Flatten a solved scenario. Activities are listed in topological order.
    pub fn from_outcome(outcome: &ScenarioOutcome<'_>) -> Self {
        let activities = outcome
            .schedule
            .iter()
            .map(|(id, timing)| ActivityReport {
                activity_id: id.to_string(),
                earliest_start: timing.earliest_start,
                earliest_finish: timing.earliest_finish,
                latest_start: timing.latest_start,
                latest_finish: timing.latest_finish,
                slack: timing.slack,
                critical: timing.is_critical(),
            })
            .collect();

        let CriticalPathResult {
            makespan,
            paths,
            starting_activities,
            finishing_activities,
            total_work,
            ..
        } = outcome.critical_path.clone();

        Self {
            name: outcome.name.clone(),
            makespan,
            activities,
            critical_paths: paths,
            starting_activities,
            finishing_activities,
            total_work,
            error: None,
        }
    }

    /// Report for a scenario that could not be evaluated.
    pub fn from_error(name: &str, err: &ScenarioRunError) -> Self {
        Self {
            name: name.to_string(),
            error: Some(err.to_string()),
            ..Default::default()
        }
    }
}

#[pymethods]
impl ScenarioReport {
    fn __repr__(&self) -> String {
        match &self.error {
            Some(err) => format!("ScenarioReport(name={:?}, error={:?})", self.name, err),
            None => format!(
                "ScenarioReport(name={:?}, makespan={}, critical_paths={})",
                self.name,
                self.makespan,
                self.critical_paths.len()
            ),
        }
    }
}
