//! This module defines the `TransitionTable`, the immutable mapping from `(state, symbol)`
//! to the `Transition` a machine performs.

use crate::types::{NextState, Symbol, Transition, TuringMachineError};
use serde::{Deserialize, Serialize};

/// The transitions of a single state, indexed by the symbol under the head.
pub type StateTransitions = [Transition; 2];

/// A validated transition table of a binary, single-tape Turing machine.
///
/// State `i` owns the pair `(transition on 0, transition on 1)` at index `i`. The table
/// is validated once when built and never changes afterwards, so lookups need no checks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<StateTransitions>", into = "Vec<StateTransitions>")]
pub struct TransitionTable {
    states: Vec<StateTransitions>,
}

impl TransitionTable {
    /// Creates a table from per-state transition pairs.
    ///
    /// # Returns
    ///
    /// * `Ok(TransitionTable)` if every `next` state is `Halt` or a valid state index.
    /// * `Err(TuringMachineError::InvalidTable)` if the table is empty or a transition
    ///   targets a state that does not exist.
    pub fn new(states: Vec<StateTransitions>) -> Result<Self, TuringMachineError> {
        if states.is_empty() {
            return Err(TuringMachineError::InvalidTable(
                "table must define at least one state".to_string(),
            ));
        }

        let nstates = states.len();
        for (state, transitions) in states.iter().enumerate() {
            for (symbol, transition) in transitions.iter().enumerate() {
                if let NextState::State(next) = transition.next {
                    if next >= nstates {
                        return Err(TuringMachineError::InvalidTable(format!(
                            "state {} on symbol {} targets state {} but the table has {} states",
                            state, symbol, next, nstates
                        )));
                    }
                }
            }
        }

        Ok(Self { states })
    }

    /// Returns the transition for `state` reading `symbol`.
    ///
    /// `state` must be below [`nstates`](Self::nstates). The machine only ever passes the
    /// initial state or a validated `next` state.
    pub fn get(&self, state: usize, symbol: Symbol) -> &Transition {
        &self.states[state][symbol as usize]
    }

    /// Returns the number of (non-halt) states.
    pub fn nstates(&self) -> usize {
        self.states.len()
    }

    /// Returns the per-state transition pairs in state order.
    pub fn states(&self) -> &[StateTransitions] {
        &self.states
    }

    /// Iterates over every transition together with its `(state, symbol)` key.
    pub fn transitions(&self) -> impl Iterator<Item = (usize, Symbol, &Transition)> + '_ {
        self.states.iter().enumerate().flat_map(|(state, pair)| {
            [Symbol::Zero, Symbol::One]
                .into_iter()
                .zip(pair.iter())
                .map(move |(symbol, transition)| (state, symbol, transition))
        })
    }

    /// Returns the `(state, symbol)` keys of all transitions that lead to the halt state.
    pub fn halt_transitions(&self) -> Vec<(usize, Symbol)> {
        self.transitions()
            .filter(|(_, _, transition)| transition.next.is_halt())
            .map(|(state, symbol, _)| (state, symbol))
            .collect()
    }
}

impl TryFrom<Vec<StateTransitions>> for TransitionTable {
    type Error = TuringMachineError;

    fn try_from(states: Vec<StateTransitions>) -> Result<Self, Self::Error> {
        Self::new(states)
    }
}

impl From<TransitionTable> for Vec<StateTransitions> {
    fn from(table: TransitionTable) -> Self {
        table.states
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Direction;

    fn t(write: Symbol, direction: Direction, next: NextState) -> Transition {
        Transition::new(write, direction, next)
    }

    fn two_state_table() -> TransitionTable {
        TransitionTable::new(vec![
            [
                t(Symbol::One, Direction::Right, NextState::State(1)),
                t(Symbol::One, Direction::Left, NextState::State(1)),
            ],
            [
                t(Symbol::One, Direction::Left, NextState::State(0)),
                t(Symbol::One, Direction::Right, NextState::Halt),
            ],
        ])
        .unwrap()
    }

    #[test]
    fn test_get_transition() {
        let table = two_state_table();

        assert_eq!(table.nstates(), 2);
        assert_eq!(table.get(0, Symbol::Zero).next, NextState::State(1));
        assert_eq!(table.get(0, Symbol::One).direction, Direction::Left);
        assert_eq!(table.get(1, Symbol::One).next, NextState::Halt);
    }

    #[test]
    fn test_out_of_range_next_state_rejected() {
        let result = TransitionTable::new(vec![[
            t(Symbol::One, Direction::Right, NextState::State(1)),
            t(Symbol::One, Direction::Right, NextState::Halt),
        ]]);

        match result {
            Err(TuringMachineError::InvalidTable(msg)) => assert!(msg.contains("targets state 1")),
            other => panic!("Expected InvalidTable, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_table_rejected() {
        assert!(matches!(
            TransitionTable::new(Vec::new()),
            Err(TuringMachineError::InvalidTable(_))
        ));
    }

    #[test]
    fn test_halt_transitions() {
        let table = two_state_table();
        assert_eq!(table.halt_transitions(), vec![(1, Symbol::One)]);
        assert_eq!(table.transitions().count(), 4);
    }

    #[test]
    fn test_json_deserialization_is_validated() {
        let table = two_state_table();
        let json = serde_json::to_string(&table).unwrap();
        assert_eq!(serde_json::from_str::<TransitionTable>(&json).unwrap(), table);

        let invalid = r#"[[{"write":1,"direction":"Right","next":5},{"write":1,"direction":"Right","next":-1}]]"#;
        assert!(serde_json::from_str::<TransitionTable>(invalid).is_err());
    }
}
