//! Random generation of busy beaver candidates.
//!
//! The generator owns its RNG, a `ChaCha8Rng` seeded explicitly, so the same seed always
//! yields the same sequence of tables.

use crate::analyzer::reachable_states;
use crate::table::{StateTransitions, TransitionTable};
use crate::types::{Direction, NextState, Symbol, Transition, TuringMachineError};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

/// Generates random transition tables with a single, reachable halt transition.
#[derive(Debug, Clone)]
pub struct TableGenerator {
    rng: ChaCha8Rng,
}

impl TableGenerator {
    /// Creates a generator with a fixed seed.
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Creates a generator seeded from the operating system.
    pub fn from_entropy() -> Self {
        Self {
            rng: ChaCha8Rng::from_entropy(),
        }
    }

    /// Generates a table of `nstates` states.
    ///
    /// Every transition writes a random symbol, moves in a random direction and targets a
    /// random state. One transition of a state reachable from state 0 is then redirected to
    /// halt. The shortest path from state 0 to that state never leaves it, so it stays
    /// reachable.
    pub fn generate(&mut self, nstates: usize) -> Result<TransitionTable, TuringMachineError> {
        if nstates == 0 {
            return Err(TuringMachineError::ValidationError(
                "cannot generate a table with zero states".to_string(),
            ));
        }

        let states: Vec<StateTransitions> = (0..nstates)
            .map(|_| [self.transition(nstates), self.transition(nstates)])
            .collect();
        let candidate = TransitionTable::new(states)?;

        let reachable: Vec<usize> = reachable_states(&candidate).into_iter().collect();
        let state = reachable[self.rng.gen_range(0..reachable.len())];
        let symbol = Symbol::from(self.rng.gen_bool(0.5));

        let mut states: Vec<StateTransitions> = candidate.into();
        states[state][symbol as usize].next = NextState::Halt;

        TransitionTable::new(states)
    }

    fn transition(&mut self, nstates: usize) -> Transition {
        let write = Symbol::from(self.rng.gen_bool(0.5));
        let direction = if self.rng.gen_bool(0.5) {
            Direction::Right
        } else {
            Direction::Left
        };
        let next = NextState::State(self.rng.gen_range(0..nstates));

        Transition::new(write, direction, next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::analyze;

    #[test]
    fn test_generated_tables_are_valid_candidates() {
        let mut generator = TableGenerator::new(7);

        for nstates in 1..=6 {
            for _ in 0..50 {
                let table = generator.generate(nstates).unwrap();
                assert_eq!(table.nstates(), nstates);
                assert_eq!(table.halt_transitions().len(), 1);
                assert!(analyze(&table).is_ok());
            }
        }
    }

    #[test]
    fn test_same_seed_same_tables() {
        let mut first = TableGenerator::new(42);
        let mut second = TableGenerator::new(42);

        for _ in 0..10 {
            assert_eq!(first.generate(4).unwrap(), second.generate(4).unwrap());
        }
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut first = TableGenerator::new(1);
        let mut second = TableGenerator::new(2);

        let a: Vec<_> = (0..10).map(|_| first.generate(5).unwrap()).collect();
        let b: Vec<_> = (0..10).map(|_| second.generate(5).unwrap()).collect();
        assert_ne!(a, b);
    }

    #[test]
    fn test_zero_states_rejected() {
        let mut generator = TableGenerator::new(0);
        assert!(matches!(
            generator.generate(0),
            Err(TuringMachineError::ValidationError(_))
        ));
    }
}
