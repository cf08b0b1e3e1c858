//! This module defines the core data structures and types used throughout the busy beaver
//! simulator, including tape symbols, transitions, execution results, run configuration,
//! and error types.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::Rule;

/// The default number of states of a busy beaver candidate.
pub const DEFAULT_STATES: usize = 5;
/// The default length of the finite tape.
pub const DEFAULT_TAPE_LENGTH: usize = 10000;
/// The default number of steps between two progress checkpoints.
pub const DEFAULT_CHECK_INTERVAL: u64 = 1_000_000;
/// The default number of steps between two progress reports.
pub const DEFAULT_REPORT_INTERVAL: u64 = 1_000_000;
/// The integer used for the halt state in the text and JSON formats.
pub const HALT_CODE: i64 = -1;

/// Maps `(read, write)` to the change in the number of 1s on the tape.
const ONES_DELTA: [[i8; 2]; 2] = [[0, 1], [-1, 0]];

/// A single cell value on the binary tape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Symbol {
    /// The blank symbol.
    #[default]
    Zero,
    One,
}

impl Symbol {
    /// Returns the change in the ones count when `self` is overwritten with `write`.
    pub fn ones_delta(self, write: Symbol) -> i8 {
        ONES_DELTA[self as usize][write as usize]
    }
}

impl From<bool> for Symbol {
    fn from(bit: bool) -> Self {
        if bit {
            Symbol::One
        } else {
            Symbol::Zero
        }
    }
}

impl From<Symbol> for bool {
    fn from(symbol: Symbol) -> Self {
        symbol == Symbol::One
    }
}

impl From<Symbol> for u8 {
    fn from(symbol: Symbol) -> Self {
        symbol as u8
    }
}

impl TryFrom<u8> for Symbol {
    type Error = TuringMachineError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Symbol::try_from(i64::from(value))
    }
}

impl TryFrom<i64> for Symbol {
    type Error = TuringMachineError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Symbol::Zero),
            1 => Ok(Symbol::One),
            other => Err(TuringMachineError::InvalidTable(format!(
                "symbol must be 0 or 1, got {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// Represents the possible directions the head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
}

impl Direction {
    /// Returns the numeric form of the direction, `-1` for left and `1` for right.
    pub fn offset(self) -> i64 {
        match self {
            Direction::Left => -1,
            Direction::Right => 1,
        }
    }

    /// Returns the letter used for the direction in the table file format.
    pub fn letter(self) -> char {
        match self {
            Direction::Left => 'L',
            Direction::Right => 'R',
        }
    }
}

impl TryFrom<i64> for Direction {
    type Error = TuringMachineError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Direction::Left),
            1 => Ok(Direction::Right),
            other => Err(TuringMachineError::InvalidTable(format!(
                "direction must be -1 or 1, got {}",
                other
            ))),
        }
    }
}

/// The state a transition leads to: an ordinary state index or the halt state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "i64", try_from = "i64")]
pub enum NextState {
    State(usize),
    Halt,
}

impl NextState {
    pub fn is_halt(self) -> bool {
        self == NextState::Halt
    }

    /// Returns the state index, or `None` for the halt state.
    pub fn index(self) -> Option<usize> {
        match self {
            NextState::State(index) => Some(index),
            NextState::Halt => None,
        }
    }
}

impl From<NextState> for i64 {
    fn from(next: NextState) -> Self {
        match next {
            NextState::State(index) => index as i64,
            NextState::Halt => HALT_CODE,
        }
    }
}

impl TryFrom<i64> for NextState {
    type Error = TuringMachineError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            HALT_CODE => Ok(NextState::Halt),
            index if index >= 0 => Ok(NextState::State(index as usize)),
            other => Err(TuringMachineError::InvalidTable(format!(
                "next state must be a state index or {}, got {}",
                HALT_CODE, other
            ))),
        }
    }
}

impl fmt::Display for NextState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextState::State(index) => write!(f, "{}", index),
            NextState::Halt => write!(f, "halt"),
        }
    }
}

/// The action taken for one `(state, symbol)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Transition {
    /// The symbol written under the head.
    pub write: Symbol,
    /// The direction the head moves after writing.
    pub direction: Direction,
    /// The state the machine transitions to.
    pub next: NextState,
}

impl Transition {
    pub fn new(write: Symbol, direction: Direction, next: NextState) -> Self {
        Self {
            write,
            direction,
            next,
        }
    }

    /// Builds a transition from the raw `(write, move, next)` integers of the legacy format,
    /// where `move` is `-1`/`1` and `next` is `-1` for halt.
    pub fn from_raw(write: i64, direction: i64, next: i64) -> Result<Self, TuringMachineError> {
        Ok(Self {
            write: Symbol::try_from(write)?,
            direction: Direction::try_from(direction)?,
            next: NextState::try_from(next)?,
        })
    }
}

/// The effect of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepOutcome {
    /// Whether the step moved the machine into the halt state.
    pub halted: bool,
    /// The change in the number of 1s on the tape, one of `-1`, `0`, `1`.
    pub ones_delta: i8,
}

/// The lifecycle status of a machine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Running,
    Halted,
    Failed(Failure),
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Halted,
    Failed(Failure),
}

/// The reason a run ended without halting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum Failure {
    /// The head moved past either end of the finite tape.
    #[error("head ran off the tape at step {step} moving {direction:?} from cell {position}")]
    TapeOverrun {
        step: u64,
        position: usize,
        direction: Direction,
    },
    /// The ones count did not change over a whole check interval.
    #[error("insufficient progress: {ones} ones at both step {from} and step {to}")]
    InsufficientProgress { ones: u64, from: u64, to: u64 },
}

/// The summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub outcome: Outcome,
    /// Total number of steps executed by the machine.
    pub steps: u64,
    /// Number of 1s on the tape when the run ended.
    pub ones: u64,
}

impl RunResult {
    pub fn halted(&self) -> bool {
        self.outcome == Outcome::Halted
    }

    /// Converts a failed run into the corresponding runtime error.
    pub fn into_result(self) -> Result<Self, TuringMachineError> {
        match self.outcome {
            Outcome::Halted => Ok(self),
            Outcome::Failed(failure) => Err(TuringMachineError::Runtime(failure)),
        }
    }
}

/// A read-only diagnostic view of a machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub step: u64,
    pub position: usize,
    pub state: NextState,
    pub symbol: Symbol,
    pub ones: u64,
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "step {} position {} state {} symbol {} ones {}",
            self.step, self.position, self.state, self.symbol, self.ones
        )
    }
}

/// Tunables of the run loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Steps between two progress checkpoints. `0` disables the check.
    pub check_interval: u64,
    /// Steps between two progress reports. `0` disables reporting.
    pub report_interval: u64,
    /// Suppresses progress reports.
    pub silent: bool,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            check_interval: DEFAULT_CHECK_INTERVAL,
            report_interval: DEFAULT_REPORT_INTERVAL,
            silent: false,
        }
    }
}

impl RunConfig {
    pub fn with_check_interval(mut self, check_interval: u64) -> Self {
        self.check_interval = check_interval;
        self
    }

    pub fn with_report_interval(mut self, report_interval: u64) -> Self {
        self.report_interval = report_interval;
        self
    }

    pub fn silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }
}

/// Represents various errors that can occur during busy beaver operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TuringMachineError {
    /// Indicates a transition table that fails structural validation.
    #[error("Invalid transition table: {0}")]
    InvalidTable(String),
    /// Indicates a tape access outside `[0, length)`.
    #[error("Tape position {position} out of bounds (length {length})")]
    OutOfBounds { position: usize, length: usize },
    /// Indicates a failure that ended the machine's run.
    #[error("Runtime error: {0}")]
    Runtime(#[from] Failure),
    /// Indicates an operation invoked while the machine is not running.
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
    /// Indicates a table that is well formed but unsuitable as a busy beaver candidate,
    /// or an invalid machine configuration.
    #[error("Validation error: {0}")]
    ValidationError(String),
    /// Indicates a malformed line in a table file.
    #[error("Table parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates an error related to reading or writing table files.
    #[error("File error: {0}")]
    FileError(String),
}
