//! Sequential suite runner
//!
//! Scenarios share the live ledger, so they run strictly in order and the
//! first failure stops the suite.

use std::fmt;
use tracing::{error, info};

use crate::harness::SuiteContext;
use crate::scenarios::{Scenario, ScenarioReport};

/// Progress of a suite run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SuiteState {
    /// Nothing ran yet
    NotStarted,
    /// Scenario at this index is running
    Running(usize),
    /// Every scenario passed
    Passed,
    /// A scenario failed and the rest were skipped
    Failed {
        /// Index of the failed scenario
        index: usize,
        /// Its name
        name: String,
        /// Rendered error
        error: String,
    },
}

impl fmt::Display for SuiteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SuiteState::NotStarted => write!(f, "not started"),
            SuiteState::Running(i) => write!(f, "running #{}", i),
            SuiteState::Passed => write!(f, "passed"),
            SuiteState::Failed { index, name, error } => {
                write!(f, "failed at #{} ({}): {}", index, name, error)
            }
        }
    }
}

/// Result of a suite run
#[derive(Debug, Clone)]
pub struct SuiteReport {
    /// Reports of the scenarios that passed, in order
    pub passed: Vec<ScenarioReport>,
    /// Terminal state
    pub state: SuiteState,
}

impl SuiteReport {
    /// Whether every scenario passed
    pub fn is_success(&self) -> bool {
        self.state == SuiteState::Passed
    }
}

/// Runs scenarios in order, halting at the first failure
pub struct SuiteRunner {
    scenarios: Vec<Scenario>,
    state: SuiteState,
}

impl SuiteRunner {
    /// Runner for the full suite
    pub fn new() -> Self {
        Self::with_scenarios(Scenario::ALL.to_vec())
    }

    /// Runner for a custom list
    pub fn with_scenarios(scenarios: Vec<Scenario>) -> Self {
        Self {
            scenarios,
            state: SuiteState::NotStarted,
        }
    }

    /// Current state
    pub fn state(&self) -> &SuiteState {
        &self.state
    }

    /// Run the suite
    pub async fn run(&mut self, ctx: &SuiteContext) -> SuiteReport {
        self.run_with(ctx, |_| {}).await
    }

    /// Run the suite, calling `on_pass` as each scenario passes
    pub async fn run_with<F>(&mut self, ctx: &SuiteContext, mut on_pass: F) -> SuiteReport
    where
        F: FnMut(&ScenarioReport),
    {
        let scenarios = self.scenarios.clone();
        let mut passed = Vec::with_capacity(scenarios.len());

        for (index, scenario) in scenarios.into_iter().enumerate() {
            self.state = SuiteState::Running(index);
            info!(index, scenario = %scenario, "scenario started");

            match scenario.run(ctx).await {
                Ok(report) => {
                    info!(index, scenario = %scenario, "scenario passed");
                    on_pass(&report);
                    passed.push(report);
                }
                Err(e) => {
                    error!(index, scenario = %scenario, error = %e, "scenario failed");
                    self.state = SuiteState::Failed {
                        index,
                        name: scenario.name().to_string(),
                        error: e.to_string(),
                    };
                    return SuiteReport {
                        passed,
                        state: self.state.clone(),
                    };
                }
            }
        }

        self.state = SuiteState::Passed;
        info!(scenarios = passed.len(), "suite passed");
        SuiteReport {
            passed,
            state: self.state.clone(),
        }
    }
}

impl Default for SuiteRunner {
    fn default() -> Self {
        Self::new()
    }
}
