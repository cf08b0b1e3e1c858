//! This module renders transition tables as text: the line-per-state file format read back by
//! the parser, and a human-readable listing for diagnostics.

use crate::table::TransitionTable;
use crate::types::Transition;

/// Encodes a table in the file format understood by [`crate::parser::parse`].
///
/// Format: one line per state, in state order, with six tokens
/// `write0 move0 next0 write1 move1 next1`. Moves are written as `L`/`R` and the halt
/// state as `-1`.
pub fn encode(table: &TransitionTable) -> String {
    table
        .states()
        .iter()
        .map(|[zero, one]| format!("{} {}\n", encode_transition(zero), encode_transition(one)))
        .collect()
}

fn encode_transition(transition: &Transition) -> String {
    format!(
        "{} {} {}",
        transition.write,
        transition.direction.letter(),
        i64::from(transition.next)
    )
}

/// Renders a per-state listing of the table.
///
/// Each line shows the state index left-justified in 3 columns, then the transitions for
/// symbols 0 and 1 as `(write move next)` triples of 2-wide integers, e.g.
/// `0  : ( 1  1  1) | ( 1 -1  1)`.
pub fn render(table: &TransitionTable) -> String {
    table
        .states()
        .iter()
        .enumerate()
        .map(|(state, [zero, one])| {
            format!(
                "{:<3}: {} | {}\n",
                state,
                render_transition(zero),
                render_transition(one)
            )
        })
        .collect()
}

fn render_transition(transition: &Transition) -> String {
    format!(
        "({:>2} {:>2} {:>2})",
        u8::from(transition.write),
        transition.direction.offset(),
        i64::from(transition.next)
    )
}
