//! This crate provides the core logic for a busy beaver Turing machine simulator.
//! It includes modules for loading and saving transition tables, simulating a binary
//! single-tape machine over a finite tape, analyzing and generating candidate tables,
//! and searching for machines that print the most 1s before halting.

pub mod analyzer;
pub mod encoder;
pub mod generator;
pub mod loader;
pub mod machine;
pub mod parser;
pub mod programs;
pub mod search;
pub mod table;
pub mod tape;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `analyze` function and `AnalysisError` enum from the analyzer module.
pub use analyzer::{analyze, AnalysisError};
/// Re-exports the text rendering functions from the encoder module.
pub use encoder::{encode, render};
/// Re-exports the `TableGenerator` struct from the generator module.
pub use generator::TableGenerator;
/// Re-exports the `TableLoader` struct from the loader module.
pub use loader::TableLoader;
/// Re-exports the `Machine` struct from the machine module.
pub use machine::Machine;
/// Re-exports the `parse` function from the parser module.
pub use parser::parse;
/// Re-exports `Program`, `ProgramManager`, and `PROGRAMS` from the programs module.
pub use programs::{Program, ProgramManager, PROGRAMS};
/// Re-exports the random search entry point and its configuration and report.
pub use search::{search, Champion, SearchConfig, SearchReport};
/// Re-exports the `TransitionTable` struct from the table module.
pub use table::TransitionTable;
/// Re-exports the `Tape` struct from the tape module.
pub use tape::Tape;
/// Re-exports various types related to machine definition and execution from the types module.
pub use types::{
    Direction, Failure, NextState, Outcome, RunConfig, RunResult, Snapshot, Status, StepOutcome,
    Symbol, Transition, TuringMachineError,
};
