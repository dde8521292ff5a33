//! Transition systems: the model and the witness

use crate::{
    cnf::Formula,
    error::{Error, Result},
    input::Input,
    literal::Variable,
};
use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Declares that a witness variable and a model variable denote the same
/// state component.
///
/// The ids are kept as parsed; the re-indexer rejects ids that are not
/// variables of the respective system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correspondence {
    pub witness: i64,
    pub model: i64,
}

impl Correspondence {
    /// Parse `<witness> = <model>`, allowing spaces around each number.
    pub fn parse(text: &str) -> Option<Correspondence> {
        let mut sides = text.splitn(2, '=');
        let witness = Input::parse_signed(sides.next()?)?;
        let model = Input::parse_signed(sides.next()?)?;
        Some(Correspondence { witness, model })
    }
    /// Whether a comment is meant as a correspondence, that is, it starts
    /// with a number followed by `=`.
    pub fn is_intended(text: &str) -> bool {
        let mut sides = text.splitn(2, '=');
        match (sides.next(), sides.next()) {
            (Some(witness), Some(_)) => Input::parse_signed(witness).is_some(),
            _ => false,
        }
    }
}

/// A symbolic transition system.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TransitionSystem {
    /// The initial states
    pub initial: Formula,
    /// Constraints that hold in every timeframe
    pub universal: Formula,
    /// The bad states
    pub goal: Formula,
    /// The transition relation over current and next state
    pub transition: Formula,
    /// The state correspondence, empty if none was given
    pub simulation: Vec<Correspondence>,
}

impl TransitionSystem {
    /// Create a system over `size` state variables without any constraints.
    pub fn new(size: Variable) -> TransitionSystem {
        TransitionSystem {
            initial: Formula::new(size),
            universal: Formula::new(size),
            goal: Formula::new(size),
            transition: Formula::with_next(size),
            simulation: Vec::new(),
        }
    }
    /// The four formulas, labelled for diagnostics.
    pub fn formulas(&self) -> [(&'static str, &Formula); 4] {
        [
            ("initial", &self.initial),
            ("universal", &self.universal),
            ("goal", &self.goal),
            ("transition", &self.transition),
        ]
    }
    pub fn formulas_mut(&mut self) -> [&mut Formula; 4] {
        [
            &mut self.initial,
            &mut self.universal,
            &mut self.goal,
            &mut self.transition,
        ]
    }
    /// The number of current-state variables.
    ///
    /// Fails if the four formulas disagree on it, or if one of them refers to
    /// a variable beyond its declared count.
    pub fn size(&self) -> Result<Variable> {
        let size = self.initial.variables;
        for (name, formula) in self.formulas().iter() {
            if formula.variables != size {
                return Err(Error::SizeMismatch(format!(
                    "initial formula has {} state variables but {} formula has {}",
                    size, name, formula.variables
                )));
            }
            formula.validate(name)?;
        }
        if !self.transition.has_next {
            return Err(Error::SizeMismatch(
                "transition formula does not span two timeframes".into(),
            ));
        }
        Ok(size)
    }
}

/// Print in Dimspec format.
impl fmt::Display for TransitionSystem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for pair in &self.simulation {
            writeln!(f, "c {} = {}", pair.witness, pair.model)?;
        }
        write!(f, "i {}", self.initial)?;
        write!(f, "u {}", self.universal)?;
        write!(f, "g {}", self.goal)?;
        write!(f, "t {}", self.transition)
    }
}
