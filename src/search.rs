//! Random search for busy beaver candidates.
//!
//! Candidates are independent: each one gets its own table and machine, and a candidate that
//! overruns the tape, stalls or exhausts its step budget is counted and skipped.

use crate::generator::TableGenerator;
use crate::machine::Machine;
use crate::table::TransitionTable;
use crate::types::{
    Failure, Outcome, RunConfig, RunResult, TuringMachineError, DEFAULT_CHECK_INTERVAL,
    DEFAULT_STATES, DEFAULT_TAPE_LENGTH,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Parameters of a random search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub nstates: usize,
    pub tape_length: usize,
    /// Number of random tables to try.
    pub candidates: usize,
    pub check_interval: u64,
    /// Steps after which a still-running candidate is abandoned.
    pub max_steps: u64,
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            nstates: DEFAULT_STATES,
            tape_length: DEFAULT_TAPE_LENGTH,
            candidates: 1000,
            check_interval: DEFAULT_CHECK_INTERVAL,
            max_steps: 10_000_000,
            seed: 0,
        }
    }
}

/// The best halting candidate found so far.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Champion {
    /// Index of the candidate in generation order.
    pub candidate: usize,
    pub table: TransitionTable,
    pub result: RunResult,
}

/// Tally of a finished search.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchReport {
    pub halted: usize,
    pub overran: usize,
    pub stalled: usize,
    /// Candidates still running after `max_steps`.
    pub exhausted: usize,
    pub champion: Option<Champion>,
}

impl SearchReport {
    pub fn total(&self) -> usize {
        self.halted + self.overran + self.stalled + self.exhausted
    }

    fn record(&mut self, candidate: usize, table: &TransitionTable, result: Option<RunResult>) {
        let Some(result) = result else {
            self.exhausted += 1;
            return;
        };

        match &result.outcome {
            Outcome::Halted => self.halted += 1,
            Outcome::Failed(Failure::TapeOverrun { .. }) => {
                self.overran += 1;
                return;
            }
            Outcome::Failed(Failure::InsufficientProgress { .. }) => {
                self.stalled += 1;
                return;
            }
        }

        if self
            .champion
            .as_ref()
            .map_or(true, |best| beats(&result, &best.result))
        {
            info!(candidate, steps = result.steps, ones = result.ones, "new champion");
            self.champion = Some(Champion {
                candidate,
                table: table.clone(),
                result,
            });
        }
    }
}

/// More ones wins, fewer steps breaks ties.
fn beats(result: &RunResult, best: &RunResult) -> bool {
    (result.ones, std::cmp::Reverse(result.steps)) > (best.ones, std::cmp::Reverse(best.steps))
}

/// Runs `config.candidates` random tables and reports the best halting one.
///
/// # Returns
///
/// * `Ok(SearchReport)` once every candidate has been tried.
/// * `Err(TuringMachineError::ValidationError)` if the configuration cannot build a machine.
pub fn search(config: &SearchConfig) -> Result<SearchReport, TuringMachineError> {
    let mut generator = TableGenerator::new(config.seed);
    let run_config = RunConfig::default()
        .with_check_interval(config.check_interval)
        .silent(true);
    let mut report = SearchReport::default();

    for candidate in 0..config.candidates {
        let table = generator.generate(config.nstates)?;
        let mut machine = Machine::new(table, config.tape_length)?;

        let result = machine.run_for(&run_config, config.max_steps)?;
        debug!(candidate, ?result, "candidate finished");

        report.record(candidate, machine.table(), result);
    }

    Ok(report)
}
