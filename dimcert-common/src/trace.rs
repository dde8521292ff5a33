//! Counterexample traces and their simulation on a model

use crate::{
    cnf::Formula,
    input::Input,
    literal::{Literal, Variable},
    memory::Array,
    system::TransitionSystem,
};
use std::{fmt, io::Result};

/// A finite sequence of states.
///
/// Each timeframe lists the literals that are true in it. A variable with
/// neither literal listed is unassigned, and satisfies no literal.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Trace {
    pub timeframes: Vec<Vec<Literal>>,
}

impl Trace {
    pub fn len(&self) -> usize {
        self.timeframes.len()
    }
    pub fn is_empty(&self) -> bool {
        self.timeframes.is_empty()
    }
    /// Append a timeframe, failing if it assigns a variable both ways.
    fn push(&mut self, mut literals: Vec<Literal>, line: usize) -> Result<()> {
        literals.sort();
        literals.dedup();
        if literals
            .windows(2)
            .any(|pair| pair[0].variable() == pair[1].variable())
        {
            return Err(Input::error_in_line("conflicting values", line));
        }
        self.timeframes.push(literals);
        Ok(())
    }
}

/// Print in Dimspec trace format.
impl fmt::Display for Trace {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for (index, timeframe) in self.timeframes.iter().enumerate() {
            write!(f, "v{}", index)?;
            for literal in timeframe {
                write!(f, " {}", literal)?;
            }
            writeln!(f, " 0")?;
        }
        Ok(())
    }
}

/// Check that a timeframe index continues the trace.
fn expect_index(trace: &Trace, index: Option<&str>, line: usize) -> Result<()> {
    match index.and_then(Input::parse_signed) {
        Some(index) if index >= 0 && index as usize == trace.len() => Ok(()),
        Some(_) => Err(Input::error_in_line("non-consecutive timeframe", line)),
        None => Err(Input::error_in_line("expected timeframe index", line)),
    }
}

/// Parse a trace of lines `v<k> <literals> 0`; other lines are ignored.
pub fn parse_dimspec_trace(input: &mut Input) -> Result<Trace> {
    let mut trace = Trace::default();
    loop {
        let number = input.line();
        let line = match input.read_line()? {
            Some(line) => line,
            None => break,
        };
        if !line.starts_with('v') {
            continue;
        }
        let mut words = line[1..].split_whitespace();
        expect_index(&trace, words.next(), number)?;
        let mut literals = Vec::new();
        let mut terminated = false;
        for word in &mut words {
            let value = Input::parse_signed(word)
                .ok_or_else(|| Input::error_in_line(Input::NUMBER, number))?;
            if value == 0 {
                terminated = true;
                break;
            }
            literals.push(
                Literal::try_from_i64(value)
                    .ok_or_else(|| Input::error_in_line(Input::OVERFLOW, number))?,
            );
        }
        if !terminated || words.next().is_some() {
            return Err(Input::error_in_line("expected terminating 0", number));
        }
        trace.push(literals, number)?;
    }
    Ok(trace)
}

/// Parse a trace of lines `<k> = <values>`, where the values of variables
/// `1, 2, ...` are given as `0`, `1` or `X` (unassigned).
pub fn parse_cip_trace(input: &mut Input) -> Result<Trace> {
    let mut trace = Trace::default();
    loop {
        let number = input.line();
        let line = match input.read_line()? {
            Some(line) => line,
            None => break,
        };
        if line.trim().is_empty() {
            continue;
        }
        let mut sides = line.splitn(2, '=');
        expect_index(&trace, sides.next().map(str::trim), number)?;
        let values = sides
            .next()
            .ok_or_else(|| Input::error_in_line("expected \"=\"", number))?;
        let mut literals = Vec::new();
        let mut variable = Variable(0);
        for value in values.chars().filter(|c| !c.is_whitespace()) {
            if variable.0 == Literal::MAX_VARIABLE {
                return Err(Input::error_in_line(Input::OVERFLOW, number));
            }
            variable = Variable(variable.0 + 1);
            match value {
                '0' => literals.push(Literal::from_variable(variable, true)),
                '1' => literals.push(Literal::from_variable(variable, false)),
                'X' => (),
                _ => return Err(Input::error_in_line("expected 0, 1 or X", number)),
            }
        }
        trace.push(literals, number)?;
    }
    Ok(trace)
}

/// The outcome of simulating a trace on a model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceVerdict {
    /// The goal holds in the given timeframe.
    GoalReached(usize),
    /// The trace has no timeframes.
    Empty,
    /// The first timeframe is not an initial state.
    InitialViolated,
    /// The universal constraint or the transition relation is violated
    /// starting from the given timeframe.
    ConstraintViolated(usize),
    /// The trace is valid but never reaches the goal.
    GoalNotReached,
}

impl TraceVerdict {
    pub fn exit_code(self) -> i32 {
        match self {
            TraceVerdict::GoalReached(_) => 0,
            TraceVerdict::Empty => 1,
            TraceVerdict::InitialViolated => 2,
            TraceVerdict::ConstraintViolated(_) => 3,
            TraceVerdict::GoalNotReached => 4,
        }
    }
}

impl fmt::Display for TraceVerdict {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            TraceVerdict::GoalReached(timeframe) => {
                write!(f, "goal reached in timeframe {}", timeframe)
            }
            TraceVerdict::Empty => write!(f, "trace has no timeframes"),
            TraceVerdict::InitialViolated => write!(f, "first timeframe is not initial"),
            TraceVerdict::ConstraintViolated(timeframe) => {
                write!(f, "constraints violated in timeframe {}", timeframe)
            }
            TraceVerdict::GoalNotReached => write!(f, "goal not reached"),
        }
    }
}

/// The literal values of one timeframe.
struct Assignment {
    values: Array<Literal, bool>,
}

impl Assignment {
    fn new(literals: &[Literal]) -> Assignment {
        let maxvar = literals
            .iter()
            .map(|literal| literal.variable())
            .max()
            .unwrap_or_default();
        let mut values = Array::new(false, maxvar.array_size_for_literals());
        for &literal in literals {
            values[literal] = true;
        }
        Assignment { values }
    }
    fn holds(&self, literal: Literal) -> bool {
        self.values.get(literal).cloned().unwrap_or(false)
    }
}

/// Evaluate a formula; next-state literals are looked up in `next`.
fn satisfies(formula: &Formula, current: &Assignment, next: Option<&Assignment>) -> bool {
    formula.clauses.iter().all(|clause| {
        clause.iter().any(|&literal| {
            if formula.has_next && formula.is_next(literal) {
                let unshifted = Variable(literal.variable().0 - formula.variables.0);
                next.map_or(false, |next| next.holds(literal.with_variable(unshifted)))
            } else {
                current.holds(literal)
            }
        })
    })
}

/// Simulate the trace on the model and report whether it reaches the goal.
pub fn check_trace(model: &TransitionSystem, trace: &Trace) -> TraceVerdict {
    if trace.is_empty() {
        return TraceVerdict::Empty;
    }
    let frames: Vec<Assignment> = trace
        .timeframes
        .iter()
        .map(|literals| Assignment::new(literals))
        .collect();
    if !satisfies(&model.initial, &frames[0], None) {
        return TraceVerdict::InitialViolated;
    }
    for (index, frame) in frames.iter().enumerate() {
        if !satisfies(&model.universal, frame, None) {
            return TraceVerdict::ConstraintViolated(index);
        }
        if satisfies(&model.goal, frame, None) {
            return TraceVerdict::GoalReached(index);
        }
        if let Some(next) = frames.get(index + 1) {
            if !satisfies(&model.transition, frame, Some(next)) {
                return TraceVerdict::ConstraintViolated(index);
            }
        }
    }
    TraceVerdict::GoalNotReached
}
