//! The 15-activity software proposal project with its three estimates.
//!
//! One precedence structure, three duration scenarios (hours).

use crate::models::{Activity, ScenarioDefinition};

const PRECEDENCES: &[(&str, &[&str])] = &[
    ("DescribeProduct", &[]),
    ("DevelopMarketing", &[]),
    ("DesignBrochure", &["DescribeProduct"]),
    ("RequirementsAnalysis", &["DescribeProduct"]),
    ("SoftwareDesign", &["RequirementsAnalysis"]),
    ("SystemDesign", &["RequirementsAnalysis"]),
    ("Coding", &["SoftwareDesign", "SystemDesign"]),
    ("Documentation", &["Coding"]),
    ("UnitTesting", &["Coding"]),
    ("SystemTesting", &["UnitTesting"]),
    ("PackageDeliverables", &["Documentation", "SystemTesting"]),
    ("SurveyMarket", &["DevelopMarketing", "DesignBrochure"]),
    ("DevelopPricing", &["PackageDeliverables", "SurveyMarket"]),
    ("DevelopImplementation", &["DescribeProduct", "PackageDeliverables"]),
    ("WriteProposal", &["DevelopPricing", "DevelopImplementation"]),
];

/// Durations as (best, expected, worst), in the order of `PRECEDENCES`.
const ESTIMATES: &[(f64, f64, f64)] = &[
    (4.0, 8.0, 12.0),
    // Worst case of 824 is far outside the 6-60 range of the other
    // estimates; kept as supplied.
    (8.0, 16.0, 824.0),
    (6.0, 12.0, 18.0),
    (8.0, 16.0, 24.0),
    (12.0, 24.0, 36.0),
    (10.0, 20.0, 30.0),
    (20.0, 40.0, 60.0),
    (6.0, 12.0, 18.0),
    (10.0, 20.0, 30.0),
    (12.0, 24.0, 36.0),
    (6.0, 12.0, 18.0),
    (10.0, 20.0, 30.0),
    (6.0, 12.0, 18.0),
    (8.0, 16.0, 24.0),
    (6.0, 12.0, 18.0),
];

/// The activities and their predecessors.
pub fn proposal_activities() -> Vec<Activity> {
    PRECEDENCES
        .iter()
        .map(|(id, preds)| Activity::new(*id, preds.iter().copied()))
        .collect()
}

fn scenario(name: &str, pick: fn(&(f64, f64, f64)) -> f64) -> ScenarioDefinition {
    ScenarioDefinition::new(
        name,
        PRECEDENCES
            .iter()
            .zip(ESTIMATES)
            .map(|((id, _), estimate)| (*id, pick(estimate))),
    )
}

pub fn best_case() -> ScenarioDefinition {
    scenario("best", |e| e.0)
}

pub fn expected_case() -> ScenarioDefinition {
    scenario("expected", |e| e.1)
}

pub fn worst_case() -> ScenarioDefinition {
    scenario("worst", |e| e.2)
}

/// Best, expected and worst case, in that order.
pub fn proposal_scenarios() -> Vec<ScenarioDefinition> {
    vec![best_case(), expected_case(), worst_case()]
}
