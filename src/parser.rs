//! This module provides the parser for transition table files, utilizing the `pest` crate.
//! The grammar lives in `grammar.pest`; this module turns the parse tree into a validated
//! `TransitionTable`.

use crate::{
    table::{StateTransitions, TransitionTable},
    types::{Direction, NextState, Transition, TuringMachineError},
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::{Pair, Pairs},
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;

/// Derives a `PestParser` for the transition table grammar defined in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct TableParser;

/// Parses the given input string into a `TransitionTable`.
///
/// Each non-empty line defines the transitions of the next state, as six whitespace
/// separated tokens: `write0 move0 next0 write1 move1 next1`. Blank lines and `#` comments
/// are ignored.
///
/// # Arguments
///
/// * `input` - A string slice containing the table definition.
///
/// # Returns
///
/// * `Ok(TransitionTable)` if the input is successfully parsed and validated.
/// * `Err(TuringMachineError::ParseError)` if a line is malformed, e.g. a missing token or an
///   unknown direction. The error points at the offending line and column.
/// * `Err(TuringMachineError::InvalidTable)` if a value is out of range, e.g. a symbol other
///   than 0/1 or a next state outside the table.
pub fn parse(input: &str) -> Result<TransitionTable, TuringMachineError> {
    let root = TableParser::parse(Rule::table, input)
        .map_err(|e| TuringMachineError::ParseError(Box::new(e)))?
        .next()
        .ok_or_else(|| TuringMachineError::InvalidTable("table is empty".to_string()))?;

    let lines = root
        .into_inner()
        .filter(|pair| pair.as_rule() == Rule::line)
        .map(parse_line)
        .collect::<Result<Vec<_>, _>>()?;

    check_next_states(&lines)?;

    TransitionTable::new(lines.into_iter().map(|(_, states)| states).collect())
}

/// Parses one state's pair of transitions from a `Pair<Rule::line>`, returning them with
/// the 1-based line number they were read from.
fn parse_line(pair: Pair<Rule>) -> Result<(usize, StateTransitions), TuringMachineError> {
    let (line, _) = pair.line_col();
    let span = pair.as_span();
    let mut pairs = pair.into_inner();

    // Rule: line > [transition, transition]
    let zero = parse_transition(next_pair(&mut pairs, span)?, line)?;
    let one = parse_transition(next_pair(&mut pairs, span)?, line)?;

    Ok((line, [zero, one]))
}

/// Parses a single `(write, move, next)` transition from a `Pair<Rule::transition>`.
fn parse_transition(pair: Pair<Rule>, line: usize) -> Result<Transition, TuringMachineError> {
    let span = pair.as_span();
    let mut pairs = pair.into_inner();

    let write = parse_integer(next_pair(&mut pairs, span)?)?;
    let direction = parse_direction(next_pair(&mut pairs, span)?)?;
    let next = parse_integer(next_pair(&mut pairs, span)?)?;

    Transition::from_raw(write, direction.offset(), next).map_err(|e| at_line(e, line))
}

/// Parses a single direction from a `Pair<Rule::direction>`.
///
/// Supports 'L' or '-1' for Left and 'R' or '1' for Right.
fn parse_direction(pair: Pair<Rule>) -> Result<Direction, TuringMachineError> {
    match pair.as_str() {
        "L" | "-1" => Ok(Direction::Left),
        "R" | "1" => Ok(Direction::Right),
        other => Err(parse_error(
            &format!("Unsupported direction: {}", other),
            pair.as_span(),
        )),
    }
}

/// Parses a signed integer token.
fn parse_integer(pair: Pair<Rule>) -> Result<i64, TuringMachineError> {
    pair.as_str().parse::<i64>().map_err(|_| {
        parse_error(
            &format!("Number out of range: {}", pair.as_str()),
            pair.as_span(),
        )
    })
}

/// Checks that every `next` state names one of the parsed lines.
fn check_next_states(lines: &[(usize, StateTransitions)]) -> Result<(), TuringMachineError> {
    let nstates = lines.len();

    for (line, transitions) in lines {
        for transition in transitions {
            if let NextState::State(next) = transition.next {
                if next >= nstates {
                    return Err(TuringMachineError::InvalidTable(format!(
                        "line {}: next state {} is out of range, the table has {} states",
                        line, next, nstates
                    )));
                }
            }
        }
    }

    Ok(())
}

/// Returns the next child pair, or a parse error at `span` if there is none.
fn next_pair<'a>(pairs: &mut Pairs<'a, Rule>, span: Span) -> Result<Pair<'a, Rule>, TuringMachineError> {
    pairs
        .next()
        .ok_or_else(|| parse_error("Unexpected end of transition", span))
}

/// Prefixes an `InvalidTable` error with the line it was found on.
fn at_line(error: TuringMachineError, line: usize) -> TuringMachineError {
    match error {
        TuringMachineError::InvalidTable(msg) => {
            TuringMachineError::InvalidTable(format!("line {}: {}", line, msg))
        }
        other => other,
    }
}

/// Creates a `TuringMachineError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> TuringMachineError {
    TuringMachineError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}
