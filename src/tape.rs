//! This module defines the `Tape`, a fixed-length binary tape stored one bit per cell.
//!
//! The tape of an ideal Turing machine is infinite in both directions. Here it is a finite
//! array whose midpoint is the starting cell, and any access past either end is an error.

use crate::types::{Symbol, TuringMachineError};
use bitvec::prelude::*;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tape {
    cells: BitVec,
}

impl Tape {
    /// Creates a blank tape of `length` cells.
    pub fn new(length: usize) -> Self {
        Self {
            cells: bitvec![0; length],
        }
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Returns the starting head position, `length / 2`.
    pub fn midpoint(&self) -> usize {
        self.cells.len() / 2
    }

    /// Reads the symbol at `position`.
    pub fn read(&self, position: usize) -> Result<Symbol, TuringMachineError> {
        self.cells
            .get(position)
            .map(|bit| Symbol::from(*bit))
            .ok_or_else(|| self.out_of_bounds(position))
    }

    /// Writes `symbol` at `position`.
    pub fn write(&mut self, position: usize, symbol: Symbol) -> Result<(), TuringMachineError> {
        if position >= self.cells.len() {
            return Err(self.out_of_bounds(position));
        }

        self.cells.set(position, symbol.into());
        Ok(())
    }

    /// Counts the 1s on the whole tape.
    pub fn count_ones(&self) -> u64 {
        self.cells.count_ones() as u64
    }

    /// Resets every cell to 0.
    pub fn clear(&mut self) {
        self.cells.fill(false);
    }

    /// Renders the tape as `0`/`1` characters, `columns` cells per line.
    pub fn render(&self, columns: usize) -> String {
        let columns = columns.max(1);
        let mut output = String::with_capacity(self.cells.len() + self.cells.len() / columns + 1);

        for (i, bit) in self.cells.iter().by_vals().enumerate() {
            if i > 0 && i % columns == 0 {
                output.push('\n');
            }
            output.push(if bit { '1' } else { '0' });
        }

        output
    }

    fn out_of_bounds(&self, position: usize) -> TuringMachineError {
        TuringMachineError::OutOfBounds {
            position,
            length: self.cells.len(),
        }
    }
}
