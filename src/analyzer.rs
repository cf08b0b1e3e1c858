//! This module provides functions for analyzing transition tables as busy beaver candidates.
//! A candidate should have exactly one transition into the halt state, and the state owning
//! it should be reachable from the initial state.
//!
//! The machine never requires these properties. A table without a halt transition simply
//! never halts, and one with several halt transitions may halt earlier than intended.

use crate::table::TransitionTable;
use crate::types::{Symbol, TuringMachineError};
use std::collections::BTreeSet;

/// Represents the problems that can be found while analyzing a transition table.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// No transition leads to the halt state.
    NoHaltTransition,
    /// More than one transition leads to the halt state.
    MultipleHaltTransitions(Vec<(usize, Symbol)>),
    /// The state owning the halt transition cannot be reached from state 0.
    UnreachableHalt(usize),
}

impl From<AnalysisError> for TuringMachineError {
    /// Converts an `AnalysisError` into a `TuringMachineError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        match error {
            AnalysisError::NoHaltTransition => {
                TuringMachineError::ValidationError("No transition leads to halt".to_string())
            }
            AnalysisError::MultipleHaltTransitions(keys) => TuringMachineError::ValidationError(
                format!("Multiple transitions lead to halt: {:?}", keys),
            ),
            AnalysisError::UnreachableHalt(state) => TuringMachineError::ValidationError(format!(
                "Halt transition of state {} is unreachable from state 0",
                state
            )),
        }
    }
}

/// Analyzes a `TransitionTable` for use as a busy beaver candidate.
///
/// # Returns
///
/// * `Ok(())` if the table has a single, reachable halt transition.
/// * `Err(TuringMachineError::ValidationError)` describing the first problem found.
pub fn analyze(table: &TransitionTable) -> Result<(), TuringMachineError> {
    let halts = check_single_halt(table)?;
    check_halt_reachable(table, halts)?;

    Ok(())
}

/// Checks that exactly one transition targets the halt state and returns its source state.
fn check_single_halt(table: &TransitionTable) -> Result<usize, AnalysisError> {
    match table.halt_transitions().as_slice() {
        [] => Err(AnalysisError::NoHaltTransition),
        [(state, _)] => Ok(*state),
        many => Err(AnalysisError::MultipleHaltTransitions(many.to_vec())),
    }
}

/// Checks that `state`, which owns the halt transition, is reachable from state 0.
fn check_halt_reachable(table: &TransitionTable, state: usize) -> Result<(), AnalysisError> {
    if reachable_states(table).contains(&state) {
        Ok(())
    } else {
        Err(AnalysisError::UnreachableHalt(state))
    }
}

/// Returns the states reachable from state 0 by following transitions.
///
/// The graph ignores the tape, so a state listed here may still never be entered on a real
/// run. A state missing from the set is never entered.
pub fn reachable_states(table: &TransitionTable) -> BTreeSet<usize> {
    let mut visited = BTreeSet::new();
    let mut queue = vec![0];

    while let Some(state) = queue.pop() {
        if !visited.insert(state) {
            continue;
        }

        for transition in &table.states()[state] {
            if let Some(next) = transition.next.index() {
                if !visited.contains(&next) {
                    queue.push(next);
                }
            }
        }
    }

    visited
}

/// Returns the states that cannot be reached from state 0, in ascending order.
pub fn unreachable_states(table: &TransitionTable) -> Vec<usize> {
    let reachable = reachable_states(table);
    (0..table.nstates())
        .filter(|state| !reachable.contains(state))
        .collect()
}
