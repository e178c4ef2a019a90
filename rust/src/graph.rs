//! Validated precedence graph of activities.

use rustc_hash::FxHashSet;
use std::cmp::Reverse;
use std::collections::BinaryHeap;
use thiserror::Error;

use crate::interner::{ActivityIdInterner, ActivityIdx};
use crate::models::Activity;

/// Errors detected while building an activity graph.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Duplicate activity: {0}")]
    DuplicateActivity(String),
    #[error("Activity {activity} references unknown predecessor {predecessor}")]
    UnknownPredecessor {
        activity: String,
        predecessor: String,
    },
    #[error("Circular dependency detected among activities: {}", .0.join(", "))]
    CycleDetected(Vec<String>),
}

/// Immutable, acyclic precedence graph.
///
/// Activity indices follow ascending identifier order. Durations live in
/// [`crate::DurationScenario`], so one graph serves any number of scenarios.
#[derive(Debug, Clone)]
pub struct ActivityGraph {
    index: ActivityIdInterner,
    /// Predecessors per activity, ascending by index.
    predecessors: Vec<Vec<ActivityIdx>>,
    /// Successors per activity, ascending by index.
    successors: Vec<Vec<ActivityIdx>>,
    topo_order: Vec<ActivityIdx>,
}

impl ActivityGraph {
    /// Build and validate a graph.
    ///
    /// # Returns
    /// * `Err(GraphError::DuplicateActivity)` for the first repeated ID
    /// * `Err(GraphError::UnknownPredecessor)` for the first dangling reference
    /// * `Err(GraphError::CycleDetected)` listing every activity left on a cycle
    pub fn build(activities: &[Activity]) -> Result<Self, GraphError> {
        let mut seen: FxHashSet<&str> =
            FxHashSet::with_capacity_and_hasher(activities.len(), Default::default());
        for activity in activities {
            if !seen.insert(activity.id.as_str()) {
                return Err(GraphError::DuplicateActivity(activity.id.clone()));
            }
        }

        for activity in activities {
            if let Some(missing) = activity
                .predecessors
                .iter()
                .find(|p| !seen.contains(p.as_str()))
            {
                return Err(GraphError::UnknownPredecessor {
                    activity: activity.id.clone(),
                    predecessor: missing.clone(),
                });
            }
        }

        let index = ActivityIdInterner::from_sorted(activities.iter().map(|a| a.id.clone()));
        let n = index.len();

        let mut predecessors: Vec<Vec<ActivityIdx>> = vec![Vec::new(); n];
        let mut successors: Vec<Vec<ActivityIdx>> = vec![Vec::new(); n];

        for activity in activities {
            let Some(idx) = index.get(&activity.id) else {
                continue;
            };
            for pred in &activity.predecessors {
                if let Some(pred_idx) = index.get(pred) {
                    predecessors[idx as usize].push(pred_idx);
                }
            }
        }

        // Repeated predecessor IDs collapse to a single edge
        for (idx, preds) in predecessors.iter_mut().enumerate() {
            preds.sort_unstable();
            preds.dedup();
            for &pred in preds.iter() {
                successors[pred as usize].push(idx as ActivityIdx);
            }
        }

        let topo_order = topological_sort(&predecessors, &successors)
            .map_err(|stuck| {
                GraphError::CycleDetected(
                    stuck
                        .into_iter()
                        .filter_map(|idx| index.resolve(idx).map(str::to_string))
                        .collect(),
                )
            })?;

        Ok(Self {
            index,
            predecessors,
            successors,
            topo_order,
        })
    }

    /// Activity IDs ordered so every activity follows all of its predecessors.
    ///
    /// Among activities that are ready at the same time, the smaller ID comes first.
    pub fn topological_order(&self) -> Vec<&str> {
        self.topo_order
            .iter()
            .filter_map(|&idx| self.index.resolve(idx))
            .collect()
    }

    /// Same as [`Self::topological_order`], as indices.
    pub fn topological_indices(&self) -> &[ActivityIdx] {
        &self.topo_order
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.get(id).is_some()
    }

    #[inline]
    pub fn index_of(&self, id: &str) -> Option<ActivityIdx> {
        self.index.get(id)
    }

    #[inline]
    pub fn id_of(&self, idx: ActivityIdx) -> Option<&str> {
        self.index.resolve(idx)
    }

    /// All activity IDs in ascending order.
    pub fn ids(&self) -> &[String] {
        self.index.names()
    }

    #[inline]
    pub fn predecessors(&self, idx: ActivityIdx) -> &[ActivityIdx] {
        self.predecessors
            .get(idx as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    #[inline]
    pub fn successors(&self, idx: ActivityIdx) -> &[ActivityIdx] {
        self.successors
            .get(idx as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Activities with no predecessors, ascending by ID.
    pub fn sources(&self) -> Vec<ActivityIdx> {
        (0..self.len() as ActivityIdx)
            .filter(|&idx| self.predecessors(idx).is_empty())
            .collect()
    }

    /// Activities with no successors, ascending by ID.
    pub fn sinks(&self) -> Vec<ActivityIdx> {
        (0..self.len() as ActivityIdx)
            .filter(|&idx| self.successors(idx).is_empty())
            .collect()
    }

    /// Number of distinct precedence edges.
    pub fn edge_count(&self) -> usize {
        self.predecessors.iter().map(Vec::len).sum()
    }

    /// Reconstruct the activity list, ascending by ID.
    pub fn activities(&self) -> Vec<Activity> {
        self.ids()
            .iter()
            .enumerate()
            .map(|(idx, id)| Activity {
                id: id.clone(),
                predecessors: self
                    .predecessors(idx as ActivityIdx)
                    .iter()
                    .filter_map(|&p| self.id_of(p).map(str::to_string))
                    .collect(),
            })
            .collect()
    }
}

/// Kahn's algorithm with a min-heap so ready activities leave in ascending index order.
///
/// On failure returns the indices still carrying in-degree > 0, ascending.
fn topological_sort(
    predecessors: &[Vec<ActivityIdx>],
    successors: &[Vec<ActivityIdx>],
) -> Result<Vec<ActivityIdx>, Vec<ActivityIdx>> {
    let n = predecessors.len();
    let mut in_degree: Vec<usize> = predecessors.iter().map(Vec::len).collect();

    let mut ready: BinaryHeap<Reverse<ActivityIdx>> = in_degree
        .iter()
        .enumerate()
        .filter(|(_, &degree)| degree == 0)
        .map(|(idx, _)| Reverse(idx as ActivityIdx))
        .collect();

    let mut result: Vec<ActivityIdx> = Vec::with_capacity(n);

    while let Some(Reverse(idx)) = ready.pop() {
        result.push(idx);

        for &succ in &successors[idx as usize] {
            let degree = &mut in_degree[succ as usize];
            *degree -= 1;
            if *degree == 0 {
                ready.push(Reverse(succ));
            }
        }
    }

    if result.len() != n {
        let stuck = in_degree
            .iter()
            .enumerate()
            .filter(|(_, &degree)| degree > 0)
            .map(|(idx, _)| idx as ActivityIdx)
            .collect();
        return Err(stuck);
    }

    Ok(result)
}
