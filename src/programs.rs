//! A catalog of the known busy beaver champions, embedded in the table file format.

use crate::parser::parse;
use crate::table::TransitionTable;
use crate::types::TuringMachineError;
use tracing::warn;

/// An embedded champion and the result it is known to produce.
struct Embedded {
    name: &'static str,
    text: &'static str,
    steps: u64,
    ones: u64,
    tape_length: usize,
}

const PROGRAM_TEXTS: [Embedded; 5] = [
    Embedded {
        name: "bb-1",
        text: include_str!("../programs/bb-1.tm"),
        steps: 1,
        ones: 1,
        tape_length: 10,
    },
    Embedded {
        name: "bb-2",
        text: include_str!("../programs/bb-2.tm"),
        steps: 6,
        ones: 4,
        tape_length: 100,
    },
    Embedded {
        name: "bb-3",
        text: include_str!("../programs/bb-3.tm"),
        steps: 14,
        ones: 6,
        tape_length: 100,
    },
    Embedded {
        name: "bb-4",
        text: include_str!("../programs/bb-4.tm"),
        steps: 107,
        ones: 13,
        tape_length: 100,
    },
    Embedded {
        name: "bb-5",
        text: include_str!("../programs/bb-5.tm"),
        steps: 47_176_870,
        ones: 4098,
        tape_length: 30_000,
    },
];

/// A known champion table.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub name: String,
    pub table: TransitionTable,
    /// Steps the machine takes before halting.
    pub steps: u64,
    /// 1s on the tape when it halts.
    pub ones: u64,
    /// A tape length the run fits in.
    pub tape_length: usize,
}

lazy_static::lazy_static! {
    pub static ref PROGRAMS: Vec<Program> = PROGRAM_TEXTS
        .iter()
        .filter_map(|embedded| match parse(embedded.text) {
            Ok(table) => Some(Program {
                name: embedded.name.to_string(),
                table,
                steps: embedded.steps,
                ones: embedded.ones,
                tape_length: embedded.tape_length,
            }),
            Err(e) => {
                warn!(name = embedded.name, error = %e, "failed to parse embedded program");
                None
            }
        })
        .collect();
}

pub struct ProgramManager;

impl ProgramManager {
    /// Returns all embedded programs, ordered by state count.
    pub fn programs() -> &'static [Program] {
        &PROGRAMS
    }

    /// List all program names
    pub fn list_program_names() -> Vec<String> {
        PROGRAMS.iter().map(|program| program.name.clone()).collect()
    }

    /// Get a program by its name
    pub fn get_program_by_name(name: &str) -> Result<Program, TuringMachineError> {
        PROGRAMS
            .iter()
            .find(|program| program.name == name)
            .cloned()
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!("Program '{}' not found", name))
            })
    }

    /// Get the champion with the given number of states
    pub fn get_program_by_states(nstates: usize) -> Result<Program, TuringMachineError> {
        PROGRAMS
            .iter()
            .find(|program| program.table.nstates() == nstates)
            .cloned()
            .ok_or_else(|| {
                TuringMachineError::ValidationError(format!(
                    "No known champion with {} states",
                    nstates
                ))
            })
    }
}
