//! This module defines the `Machine` struct, which simulates a binary, single-tape Turing
//! machine over a finite tape. It executes single steps, drives bulk runs with a stagnation
//! heuristic, and exposes the diagnostics used while searching for busy beavers.

use crate::table::TransitionTable;
use crate::tape::Tape;
use crate::types::{
    Direction, Failure, NextState, Outcome, RunConfig, RunResult, Snapshot, Status, StepOutcome,
    Symbol, TuringMachineError,
};
use tracing::{debug, info};

/// The ones count captured at the last evaluated progress checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Checkpoint {
    step: u64,
    ones: u64,
}

/// A deterministic Turing machine with a binary alphabet and a finite tape.
///
/// The machine exclusively owns its transition table and tape. It starts in state 0 with the
/// head on the tape midpoint and keeps a running count of the 1s on the tape, updated by
/// every step from the `(read, write)` pair instead of rescanning the tape.
#[derive(Debug, Clone)]
pub struct Machine {
    table: TransitionTable,
    tape: Tape,
    head: usize,
    state: NextState,
    status: Status,
    step_count: u64,
    ones: u64,
    checkpoint: Option<Checkpoint>,
    /// Step count at which a bounded run last returned with the machine still running.
    paused_at: Option<u64>,
}

impl Machine {
    /// Creates a new `Machine` over a blank tape of `tape_length` cells.
    ///
    /// # Returns
    ///
    /// * `Ok(Machine)` ready to run from state 0.
    /// * `Err(TuringMachineError::ValidationError)` if `tape_length` is zero.
    pub fn new(table: TransitionTable, tape_length: usize) -> Result<Self, TuringMachineError> {
        if tape_length == 0 {
            return Err(TuringMachineError::ValidationError(
                "tape length must be at least 1".to_string(),
            ));
        }

        let tape = Tape::new(tape_length);
        Ok(Self {
            table,
            head: tape.midpoint(),
            ones: tape.count_ones(),
            tape,
            state: NextState::State(0),
            status: Status::Running,
            step_count: 0,
            checkpoint: None,
            paused_at: None,
        })
    }

    /// Executes a single transition.
    ///
    /// The symbol under the head is read, the matching transition's symbol is written, and
    /// the head moves. If the head would leave the tape, the write stays on the tape, the
    /// machine fails and `current_state` is left unchanged.
    ///
    /// # Returns
    ///
    /// * `Ok(StepOutcome)` with the change in the ones count and whether the machine halted.
    /// * `Err(TuringMachineError::Runtime(Failure::TapeOverrun))` if the head ran off the tape.
    /// * `Err(TuringMachineError::InvalidOperation)` if the machine is not running.
    pub fn step(&mut self) -> Result<StepOutcome, TuringMachineError> {
        let state = self.running_state()?;

        let read = self.tape.read(self.head)?;
        let transition = *self.table.get(state, read);
        self.tape.write(self.head, transition.write)?;

        let ones_delta = read.ones_delta(transition.write);
        self.ones = self.ones.saturating_add_signed(i64::from(ones_delta));
        self.step_count += 1;

        match self.moved_head(transition.direction) {
            Some(head) => self.head = head,
            None => {
                let failure = Failure::TapeOverrun {
                    step: self.step_count,
                    position: self.head,
                    direction: transition.direction,
                };
                self.status = Status::Failed(failure.clone());
                return Err(failure.into());
            }
        }

        self.state = transition.next;
        if self.state.is_halt() {
            self.status = Status::Halted;
        }

        Ok(StepOutcome {
            halted: self.status == Status::Halted,
            ones_delta,
        })
    }

    /// Runs the machine until it halts or fails.
    ///
    /// Shorthand for [`run_with`](Self::run_with) using the default report interval.
    pub fn run(
        &mut self,
        check_interval: u64,
        silent: bool,
    ) -> Result<RunResult, TuringMachineError> {
        self.run_with(
            &RunConfig::default()
                .with_check_interval(check_interval)
                .silent(silent),
        )
    }

    /// Runs the machine until it halts or fails.
    ///
    /// Every `check_interval` steps the ones count is compared with the count at the previous
    /// checkpoint, and the run fails with `InsufficientProgress` if it did not change. This is a
    /// heuristic: a machine whose count returns to the same value on the checkpoint cadence is
    /// stopped even if it would halt later, and a looping machine whose count differs at each
    /// checkpoint is never caught.
    ///
    /// # Returns
    ///
    /// * `Ok(RunResult)` describing how the run ended, including tape overruns and stagnation.
    /// * `Err(TuringMachineError::InvalidOperation)` if the machine is not running.
    pub fn run_with(&mut self, config: &RunConfig) -> Result<RunResult, TuringMachineError> {
        loop {
            if let Some(result) = self.drive(config, None)? {
                return Ok(result);
            }
        }
    }

    /// Runs the machine for at most `max_steps` steps.
    ///
    /// Returns `Ok(None)` if the machine is still running afterwards. A later call resumes the
    /// run, including its progress checkpoint, unless the machine was stepped manually in
    /// between, in which case the checkpoint restarts from the current step.
    pub fn run_for(
        &mut self,
        config: &RunConfig,
        max_steps: u64,
    ) -> Result<Option<RunResult>, TuringMachineError> {
        self.drive(config, Some(max_steps))
    }

    fn drive(
        &mut self,
        config: &RunConfig,
        max_steps: Option<u64>,
    ) -> Result<Option<RunResult>, TuringMachineError> {
        self.running_state()?;

        let start = self.step_count;
        if self.paused_at != Some(self.step_count) {
            self.checkpoint = Some(Checkpoint {
                step: self.step_count,
                ones: self.ones,
            });
        }

        loop {
            if max_steps.is_some_and(|max| self.step_count - start >= max) {
                self.paused_at = Some(self.step_count);
                return Ok(None);
            }

            match self.step() {
                Ok(outcome) if outcome.halted => return Ok(Some(self.finish(Outcome::Halted))),
                Ok(_) => {}
                Err(TuringMachineError::Runtime(failure)) => {
                    return Ok(Some(self.finish(Outcome::Failed(failure))))
                }
                Err(e) => return Err(e),
            }

            if !config.silent
                && config.report_interval > 0
                && self.step_count % config.report_interval == 0
            {
                let snapshot = self.snapshot();
                info!(
                    step = snapshot.step,
                    position = snapshot.position,
                    state = %snapshot.state,
                    symbol = %snapshot.symbol,
                    ones = snapshot.ones,
                    "progress"
                );
            }

            if let Some(failure) = self.check_progress(config.check_interval) {
                self.status = Status::Failed(failure.clone());
                return Ok(Some(self.finish(Outcome::Failed(failure))));
            }
        }
    }

    /// Compares the ones count with the last checkpoint once `interval` steps have elapsed.
    fn check_progress(&mut self, interval: u64) -> Option<Failure> {
        if interval == 0 {
            return None;
        }

        let checkpoint = self.checkpoint.get_or_insert(Checkpoint {
            step: self.step_count,
            ones: self.ones,
        });
        if self.step_count - checkpoint.step < interval {
            return None;
        }

        if self.ones == checkpoint.ones {
            return Some(Failure::InsufficientProgress {
                ones: self.ones,
                from: checkpoint.step,
                to: self.step_count,
            });
        }

        *checkpoint = Checkpoint {
            step: self.step_count,
            ones: self.ones,
        };
        None
    }

    fn finish(&self, outcome: Outcome) -> RunResult {
        debug!(steps = self.step_count, ones = self.ones, ?outcome, "run finished");

        RunResult {
            outcome,
            steps: self.step_count,
            ones: self.ones,
        }
    }

    fn running_state(&self) -> Result<usize, TuringMachineError> {
        match (&self.status, self.state) {
            (Status::Running, NextState::State(state)) => Ok(state),
            (status, _) => Err(TuringMachineError::InvalidOperation(format!(
                "machine is {:?}, not running",
                status
            ))),
        }
    }

    fn moved_head(&self, direction: Direction) -> Option<usize> {
        match direction {
            Direction::Left => self.head.checked_sub(1),
            Direction::Right => Some(self.head + 1).filter(|&head| head < self.tape.len()),
        }
    }

    /// Counts the 1s on the tape by scanning it.
    pub fn count_ones(&self) -> u64 {
        self.tape.count_ones()
    }

    /// Returns the incrementally maintained number of 1s on the tape.
    pub fn ones(&self) -> u64 {
        self.ones
    }

    /// Returns a read-only view of the step count, head, state, symbol under the head and
    /// ones count.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            step: self.step_count,
            position: self.head,
            state: self.state,
            symbol: self.tape.read(self.head).unwrap_or_default(),
            ones: self.ones,
        }
    }

    /// Restores the blank tape, state 0 and the midpoint head so the table can run again.
    pub fn reset(&mut self) {
        self.tape.clear();
        self.head = self.tape.midpoint();
        self.state = NextState::State(0);
        self.status = Status::Running;
        self.step_count = 0;
        self.ones = self.tape.count_ones();
        self.checkpoint = None;
        self.paused_at = None;
    }

    /// Returns the current state, `NextState::Halt` once the machine halted.
    pub fn state(&self) -> NextState {
        self.state
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == Status::Running
    }

    pub fn is_halted(&self) -> bool {
        self.status == Status::Halted
    }

    /// Returns the head position.
    pub fn head(&self) -> usize {
        self.head
    }

    /// Returns the symbol under the head.
    pub fn symbol(&self) -> Symbol {
        self.snapshot().symbol
    }

    /// Returns the total number of steps executed.
    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn tape(&self) -> &Tape {
        &self.tape
    }

    pub fn table(&self) -> &TransitionTable {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Transition;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing_subscriber::layer::{Context, Layer, SubscriberExt};

    type Raw = (i64, i64, i64);

    fn table(states: &[[Raw; 2]]) -> TransitionTable {
        let states = states
            .iter()
            .map(|[zero, one]| {
                [
                    Transition::from_raw(zero.0, zero.1, zero.2).unwrap(),
                    Transition::from_raw(one.0, one.1, one.2).unwrap(),
                ]
            })
            .collect();
        TransitionTable::new(states).unwrap()
    }

    fn one_step_halter() -> TransitionTable {
        table(&[[(1, 1, -1), (1, 1, -1)]])
    }

    /// Moves right forever, writing 1 then 0.
    fn right_runner() -> TransitionTable {
        table(&[[(1, 1, 1), (1, 1, 1)], [(0, 1, 0), (0, 1, 0)]])
    }

    /// Writes 1 then 0 on the same cell, forever.
    fn oscillator() -> TransitionTable {
        table(&[[(1, 1, 1), (0, 1, 1)], [(0, -1, 0), (0, -1, 0)]])
    }

    /// The four-state busy beaver champion: 13 ones in 107 steps.
    fn bb4() -> TransitionTable {
        table(&[
            [(1, 1, 1), (1, -1, 1)],
            [(1, -1, 0), (0, -1, 2)],
            [(1, 1, -1), (1, -1, 3)],
            [(1, 1, 3), (0, 1, 0)],
        ])
    }

    fn quiet(check_interval: u64) -> RunConfig {
        RunConfig::default()
            .with_check_interval(check_interval)
            .silent(true)
    }

    #[test]
    fn test_machine_creation() {
        let machine = Machine::new(one_step_halter(), 10).unwrap();

        assert_eq!(machine.head(), 5);
        assert_eq!(machine.state(), NextState::State(0));
        assert_eq!(machine.status(), &Status::Running);
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.ones(), 0);
    }

    #[test]
    fn test_zero_length_tape_rejected() {
        assert!(matches!(
            Machine::new(one_step_halter(), 0),
            Err(TuringMachineError::ValidationError(_))
        ));
    }

    #[test]
    fn test_single_step_halt() {
        let mut machine = Machine::new(one_step_halter(), 10).unwrap();

        let outcome = machine.step().unwrap();

        assert_eq!(
            outcome,
            StepOutcome {
                halted: true,
                ones_delta: 1
            }
        );
        assert_eq!(machine.tape().read(5).unwrap(), Symbol::One);
        assert_eq!(machine.head(), 6);
        assert_eq!(machine.state(), NextState::Halt);
        assert!(machine.is_halted());
        assert_eq!(machine.count_ones(), 1);
    }

    #[test]
    fn test_run_single_step_halt() {
        let mut machine = Machine::new(one_step_halter(), 10).unwrap();

        let result = machine.run(1_000_000, true).unwrap();

        assert_eq!(
            result,
            RunResult {
                outcome: Outcome::Halted,
                steps: 1,
                ones: 1
            }
        );
    }

    #[test]
    fn test_step_after_halt_is_invalid() {
        let mut machine = Machine::new(one_step_halter(), 10).unwrap();
        machine.step().unwrap();

        assert!(matches!(
            machine.step(),
            Err(TuringMachineError::InvalidOperation(_))
        ));
        assert!(matches!(
            machine.run(10, true),
            Err(TuringMachineError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_step_tape_overrun() {
        let mut machine = Machine::new(right_runner(), 10).unwrap();

        for _ in 0..4 {
            machine.step().unwrap();
        }
        assert_eq!(machine.head(), 9);

        let failure = Failure::TapeOverrun {
            step: 5,
            position: 9,
            direction: Direction::Right,
        };
        assert_eq!(machine.step(), Err(TuringMachineError::Runtime(failure.clone())));
        assert_eq!(machine.status(), &Status::Failed(failure));
        // The last write is kept but the state does not advance.
        assert_eq!(machine.tape().read(9).unwrap(), Symbol::One);
        assert_eq!(machine.state(), NextState::State(0));
        assert!(matches!(
            machine.step(),
            Err(TuringMachineError::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_run_tape_overrun() {
        let mut machine = Machine::new(right_runner(), 10).unwrap();

        let result = machine.run_with(&quiet(1_000_000)).unwrap();

        assert_eq!(result.steps, 5);
        assert_eq!(result.ones, 3);
        assert!(matches!(
            result.outcome,
            Outcome::Failed(Failure::TapeOverrun { .. })
        ));
    }

    #[test]
    fn test_run_tape_overrun_left() {
        let mut machine = Machine::new(table(&[[(1, -1, 0), (1, -1, 0)]]), 10).unwrap();

        let result = machine.run_with(&quiet(1_000_000)).unwrap();

        assert_eq!(
            result.outcome,
            Outcome::Failed(Failure::TapeOverrun {
                step: 6,
                position: 0,
                direction: Direction::Left
            })
        );
        assert_eq!(result.ones, 6);
    }

    #[test]
    fn test_insufficient_progress() {
        let mut machine = Machine::new(oscillator(), 10).unwrap();

        let result = machine.run_with(&quiet(4)).unwrap();

        assert_eq!(
            result.outcome,
            Outcome::Failed(Failure::InsufficientProgress {
                ones: 0,
                from: 0,
                to: 4
            })
        );
        assert_eq!(result.steps, 4);
        assert!(matches!(machine.status(), Status::Failed(_)));
    }

    #[test]
    fn test_insufficient_progress_at_first_checkpoint() {
        let mut machine = Machine::new(oscillator(), 10).unwrap();

        let result = machine.run_with(&quiet(1000)).unwrap();

        assert_eq!(result.steps, 1000);
        assert!(matches!(
            result.outcome,
            Outcome::Failed(Failure::InsufficientProgress { to: 1000, .. })
        ));
    }

    #[test]
    fn test_progress_check_misses_aligned_oscillation() {
        // Sampling every 2 steps sees the count alternate between 1 and 0.
        let mut machine = Machine::new(oscillator(), 10).unwrap();

        assert_eq!(machine.run_for(&quiet(2), 1000).unwrap(), None);
        assert!(machine.is_running());
        assert_eq!(machine.step_count(), 1000);
    }

    #[test]
    fn test_disabled_progress_check() {
        let mut machine = Machine::new(oscillator(), 10).unwrap();

        assert_eq!(machine.run_for(&quiet(0), 10_000).unwrap(), None);
    }

    #[test]
    fn test_halt_on_checkpoint_boundary() {
        // Halts at step 1 without changing the count, which is also the first checkpoint.
        let mut machine = Machine::new(table(&[[(0, 1, -1), (0, 1, -1)]]), 10).unwrap();

        let result = machine.run_with(&quiet(1)).unwrap();

        assert_eq!(result.outcome, Outcome::Halted);
        assert_eq!(result.steps, 1);
        assert_eq!(result.ones, 0);
    }

    #[test]
    fn test_run_bb4() {
        let mut machine = Machine::new(bb4(), 1000).unwrap();

        let result = machine.run(1_000_000, true).unwrap();

        assert!(result.halted());
        assert_eq!(result.steps, 107);
        assert_eq!(result.ones, 13);
        assert_eq!(machine.count_ones(), 13);
    }

    #[test]
    fn test_manual_steps_match_run() {
        let mut stepped = Machine::new(bb4(), 1000).unwrap();
        let mut ran = stepped.clone();

        let mut ones: i64 = 0;
        while stepped.is_running() {
            ones += i64::from(stepped.step().unwrap().ones_delta);
            assert_eq!(stepped.ones(), stepped.count_ones());
        }
        let result = ran.run(1_000_000, true).unwrap();

        assert_eq!(stepped.tape(), ran.tape());
        assert_eq!(stepped.state(), ran.state());
        assert_eq!(stepped.head(), ran.head());
        assert_eq!(stepped.step_count(), result.steps);
        assert_eq!(ones as u64, result.ones);
    }

    #[test]
    fn test_run_for_resumes() {
        let mut machine = Machine::new(bb4(), 1000).unwrap();
        let config = quiet(1_000_000);

        assert_eq!(machine.run_for(&config, 10).unwrap(), None);
        assert_eq!(machine.step_count(), 10);

        let result = machine.run_with(&config).unwrap();
        assert_eq!(result.steps, 107);
        assert_eq!(result.ones, 13);
    }

    #[test]
    fn test_run_for_keeps_checkpoint_across_calls() {
        // The count at step 4 equals the count at step 0 whichever call reaches it.
        let mut machine = Machine::new(oscillator(), 10).unwrap();

        assert_eq!(machine.run_for(&quiet(4), 3).unwrap(), None);
        let result = machine.run_for(&quiet(4), 10).unwrap().unwrap();

        assert_eq!(
            result.outcome,
            Outcome::Failed(Failure::InsufficientProgress {
                ones: 0,
                from: 0,
                to: 4
            })
        );
    }

    #[test]
    fn test_manual_steps_restart_checkpoint() {
        let mut machine = Machine::new(oscillator(), 10).unwrap();

        assert_eq!(machine.run_for(&quiet(4), 1).unwrap(), None);
        for _ in 0..5 {
            machine.step().unwrap();
        }
        let result = machine.run_for(&quiet(4), 10).unwrap().unwrap();

        assert_eq!(
            result.outcome,
            Outcome::Failed(Failure::InsufficientProgress {
                ones: 1,
                from: 6,
                to: 10
            })
        );
    }

    #[test]
    fn test_reporting_does_not_change_result() {
        let mut machine = Machine::new(bb4(), 1000).unwrap();

        let config = RunConfig::default().with_report_interval(10);
        let result = machine.run_with(&config).unwrap();

        assert_eq!(result.steps, 107);
    }

    /// Counts `info` events, which the run loop only emits for progress snapshots.
    struct ProgressCounter(Arc<AtomicUsize>);

    impl<S: tracing::Subscriber> Layer<S> for ProgressCounter {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
            if *event.metadata().level() == tracing::Level::INFO {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn count_reports(config: &RunConfig) -> usize {
        let count = Arc::new(AtomicUsize::new(0));
        let subscriber = tracing_subscriber::registry().with(ProgressCounter(count.clone()));

        let result = tracing::subscriber::with_default(subscriber, || {
            Machine::new(bb4(), 1000).unwrap().run_with(config).unwrap()
        });
        assert_eq!(result.steps, 107);

        count.load(Ordering::SeqCst)
    }

    #[test]
    fn test_reports_on_interval() {
        let config = RunConfig::default().with_report_interval(10);

        assert_eq!(count_reports(&config), 10);
        assert_eq!(count_reports(&config.clone().with_check_interval(0)), 10);
        assert_eq!(count_reports(&config.clone().with_check_interval(17)), 10);
    }

    #[test]
    fn test_silent_run_does_not_report() {
        let config = RunConfig::default().with_report_interval(10).silent(true);

        assert_eq!(count_reports(&config), 0);
    }

    #[test]
    fn test_disabled_reporting() {
        let config = RunConfig::default().with_report_interval(0);

        assert_eq!(count_reports(&config), 0);
    }

    #[test]
    fn test_snapshot() {
        let mut machine = Machine::new(bb4(), 1000).unwrap();
        machine.step().unwrap();

        let snapshot = machine.snapshot();

        assert_eq!(snapshot.step, 1);
        assert_eq!(snapshot.position, 501);
        assert_eq!(snapshot.state, NextState::State(1));
        assert_eq!(snapshot.symbol, Symbol::Zero);
        assert_eq!(snapshot.ones, machine.count_ones());
        assert_eq!(machine.snapshot(), snapshot);
    }

    #[test]
    fn test_reset() {
        let mut machine = Machine::new(bb4(), 1000).unwrap();
        machine.run(1_000_000, true).unwrap();

        machine.reset();

        assert!(machine.is_running());
        assert_eq!(machine.step_count(), 0);
        assert_eq!(machine.count_ones(), 0);
        assert_eq!(machine.ones(), 0);
        assert_eq!(machine.head(), 500);
        assert_eq!(machine.run(1_000_000, true).unwrap().steps, 107);
    }
}
