//! Named duration assumptions bound to an activity graph.

use thiserror::Error;

use crate::graph::ActivityGraph;
use crate::interner::ActivityIdx;

/// Errors detected while binding durations to a graph.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScenarioError {
    #[error("Scenario {scenario:?}: no duration for activity {activity}")]
    MissingDuration { scenario: String, activity: String },
    #[error("Scenario {scenario:?}: duration given for unknown activity {activity}")]
    UnknownActivity { scenario: String, activity: String },
    #[error("Scenario {scenario:?}: duration for activity {activity} given more than once")]
    DuplicateDuration { scenario: String, activity: String },
    #[error("Scenario {scenario:?}: negative duration {duration} for activity {activity}")]
    NegativeDuration {
        scenario: String,
        activity: String,
        duration: f64,
    },
    #[error("Scenario {scenario:?}: non-finite duration for activity {activity}")]
    NonFiniteDuration { scenario: String, activity: String },
    #[error("Scenario {scenario:?}: scale factor must be positive and finite, got {factor}")]
    InvalidScale { scenario: String, factor: f64 },
}

/// A named set of activity durations, validated against one graph.
#[derive(Debug, Clone)]
pub struct DurationScenario<'g> {
    graph: &'g ActivityGraph,
    name: String,
    /// Durations indexed by activity index.
    durations: Vec<f64>,
}

impl<'g> DurationScenario<'g> {
    /// Bind durations to `graph`.
    ///
    /// Entries are validated in ascending ID order so the reported error does
    /// not depend on the iteration order of the input.
    pub fn bind<S, I, K>(graph: &'g ActivityGraph, name: S, durations: I) -> Result<Self, ScenarioError>
    where
        S: Into<String>,
        I: IntoIterator<Item = (K, f64)>,
        K: AsRef<str>,
    {
        let name = name.into();
        let mut entries: Vec<(K, f64)> = durations.into_iter().collect();
        entries.sort_by(|(a, _), (b, _)| a.as_ref().cmp(b.as_ref()));

        let mut values: Vec<Option<f64>> = vec![None; graph.len()];

        for (id, duration) in &entries {
            let id = id.as_ref();
            let Some(idx) = graph.index_of(id) else {
                return Err(ScenarioError::UnknownActivity {
                    scenario: name,
                    activity: id.to_string(),
                });
            };
            let slot = &mut values[idx as usize];
            if slot.is_some() {
                return Err(ScenarioError::DuplicateDuration {
                    scenario: name,
                    activity: id.to_string(),
                });
            }
            if !duration.is_finite() {
                return Err(ScenarioError::NonFiniteDuration {
                    scenario: name,
                    activity: id.to_string(),
                });
            }
            if *duration < 0.0 {
                return Err(ScenarioError::NegativeDuration {
                    scenario: name,
                    activity: id.to_string(),
                    duration: *duration,
                });
            }
            *slot = Some(*duration);
        }

        let mut resolved = Vec::with_capacity(values.len());
        for (idx, value) in values.into_iter().enumerate() {
            match value {
                Some(duration) => resolved.push(duration),
                None => {
                    return Err(ScenarioError::MissingDuration {
                        scenario: name,
                        activity: graph.id_of(idx as ActivityIdx).unwrap_or_default().to_string(),
                    });
                }
            }
        }

        Ok(Self {
            graph,
            name,
            durations: resolved,
        })
    }

    /// A copy of this scenario with every duration multiplied by `factor`.
    pub fn scaled<S: Into<String>>(&self, name: S, factor: f64) -> Result<Self, ScenarioError> {
        let name = name.into();
        if !factor.is_finite() || factor <= 0.0 {
            return Err(ScenarioError::InvalidScale {
                scenario: name,
                factor,
            });
        }
        let durations: Vec<f64> = self.durations.iter().map(|d| d * factor).collect();
        if let Some(idx) = durations.iter().position(|d| !d.is_finite()) {
            return Err(ScenarioError::NonFiniteDuration {
                scenario: name,
                activity: self
                    .graph
                    .id_of(idx as ActivityIdx)
                    .unwrap_or_default()
                    .to_string(),
            });
        }
        Ok(Self {
            graph: self.graph,
            name,
            durations,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn graph(&self) -> &'g ActivityGraph {
        self.graph
    }

    #[inline]
    pub(crate) fn duration(&self, idx: ActivityIdx) -> f64 {
        self.durations[idx as usize]
    }

    pub fn duration_of(&self, id: &str) -> Option<f64> {
        self.graph.index_of(id).map(|idx| self.duration(idx))
    }

    /// Durations indexed by activity index.
    pub fn durations(&self) -> &[f64] {
        &self.durations
    }

    /// Sum of all durations.
    pub fn total_work(&self) -> f64 {
        self.durations.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Activity;

    fn make_graph() -> ActivityGraph {
        ActivityGraph::build(&[
            Activity::new("a", Vec::<String>::new()),
            Activity::new("b", ["a"]),
            Activity::new("c", ["a"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_bind_valid() {
        let graph = make_graph();
        let scenario =
            DurationScenario::bind(&graph, "best", [("c", 1.5), ("a", 2.0), ("b", 0.0)]).unwrap();

        assert_eq!(scenario.name(), "best");
        assert_eq!(scenario.duration_of("a"), Some(2.0));
        assert_eq!(scenario.duration_of("b"), Some(0.0));
        assert_eq!(scenario.duration_of("c"), Some(1.5));
        assert_eq!(scenario.duration_of("zzz"), None);
        assert_eq!(scenario.durations(), &[2.0, 0.0, 1.5]);
        assert!((scenario.total_work() - 3.5).abs() < 1e-9);
    }

    #[test]
    fn test_missing_duration() {
        let graph = make_graph();
        let result = DurationScenario::bind(&graph, "best", [("a", 2.0)]);
        assert_eq!(
            result.unwrap_err(),
            ScenarioError::MissingDuration {
                scenario: "best".into(),
                activity: "b".into(),
            }
        );
    }

    #[test]
    fn test_unknown_activity() {
        let graph = make_graph();
        let result = DurationScenario::bind(
            &graph,
            "best",
            [("a", 2.0), ("b", 1.0), ("c", 1.0), ("extra", 4.0)],
        );
        assert_eq!(
            result.unwrap_err(),
            ScenarioError::UnknownActivity {
                scenario: "best".into(),
                activity: "extra".into(),
            }
        );
    }

    #[test]
    fn test_negative_duration() {
        let graph = make_graph();
        let result = DurationScenario::bind(&graph, "worst", [("a", 2.0), ("b", -1.0), ("c", 1.0)]);
        assert_eq!(
            result.unwrap_err(),
            ScenarioError::NegativeDuration {
                scenario: "worst".into(),
                activity: "b".into(),
                duration: -1.0,
            }
        );
    }

    #[test]
    fn test_non_finite_duration() {
        let graph = make_graph();
        let result =
            DurationScenario::bind(&graph, "worst", [("a", f64::NAN), ("b", 1.0), ("c", 1.0)]);
        assert!(matches!(
            result,
            Err(ScenarioError::NonFiniteDuration { ref activity, .. }) if activity == "a"
        ));
    }

    #[test]
    fn test_duplicate_duration() {
        let graph = make_graph();
        let result = DurationScenario::bind(
            &graph,
            "best",
            vec![("a", 2.0), ("b", 1.0), ("c", 1.0), ("a", 3.0)],
        );
        assert!(matches!(result, Err(ScenarioError::DuplicateDuration { .. })));
    }

    #[test]
    fn test_scaled() {
        let graph = make_graph();
        let scenario = DurationScenario::bind(&graph, "best", [("a", 2.0), ("b", 1.0), ("c", 3.0)])
            .unwrap();
        let tripled = scenario.scaled("tripled", 3.0).unwrap();

        assert_eq!(tripled.name(), "tripled");
        assert_eq!(tripled.durations(), &[6.0, 3.0, 9.0]);
        assert!(std::ptr::eq(tripled.graph(), &graph));

        assert!(matches!(
            scenario.scaled("zero", 0.0),
            Err(ScenarioError::InvalidScale { .. })
        ));
        assert!(matches!(
            scenario.scaled("inf", f64::INFINITY),
            Err(ScenarioError::InvalidScale { .. })
        ));
    }

    #[test]
    fn test_scaled_overflow_rejected() {
        let graph = make_graph();
        let scenario = DurationScenario::bind(&graph, "best", [("a", 0.5), ("b", 10.0), ("c", 3.0)])
            .unwrap();

        let result = scenario.scaled("big", 1e308);
        assert!(matches!(
            result,
            Err(ScenarioError::NonFiniteDuration { ref scenario, ref activity })
                if scenario == "big" && activity == "b"
        ));

        // Large but representable factors still pass
        let scaled = scenario.scaled("large", 1e300).unwrap();
        assert!(scaled.durations().iter().all(|d| d.is_finite()));
    }

    #[test]
    fn test_empty_graph_accepts_empty_scenario() {
        let graph = ActivityGraph::build(&[]).unwrap();
        let scenario = DurationScenario::bind(&graph, "none", Vec::<(String, f64)>::new()).unwrap();
        assert!(scenario.durations().is_empty());
    }
}
