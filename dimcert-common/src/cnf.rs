//! Propositional formulas in conjunctive normal form

use crate::{
    error::{Error, Result},
    literal::{Literal, Variable},
    memory::Offset,
};
use std::fmt;

/// A conjunction of clauses over a fixed number of variables.
///
/// If `has_next` is set, the formula relates two timeframes: variables
/// `1..=variables` denote the current state and `variables+1..=2*variables`
/// the next state.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Formula {
    /// The number of (current-state) variables
    pub variables: Variable,
    /// The clauses, none of which contains a zero literal
    pub clauses: Vec<Vec<Literal>>,
    /// Whether literals may refer to the next timeframe
    pub has_next: bool,
}

impl Formula {
    /// Create an empty formula over a single timeframe.
    pub fn new(variables: Variable) -> Formula {
        Formula {
            variables,
            clauses: Vec::new(),
            has_next: false,
        }
    }
    /// Create an empty formula relating the current and the next timeframe.
    pub fn with_next(variables: Variable) -> Formula {
        Formula {
            has_next: true,
            ..Formula::new(variables)
        }
    }
    pub fn number_of_clauses(&self) -> usize {
        self.clauses.len()
    }
    /// The highest variable a literal may refer to.
    pub fn span(&self) -> Variable {
        if self.has_next {
            Variable::from_usize(2 * self.variables.as_offset())
        } else {
            self.variables
        }
    }
    /// Returns true if the literal refers to the next timeframe.
    pub fn is_next(&self, literal: Literal) -> bool {
        literal.variable() > self.variables
    }
    pub fn add_clause(&mut self, clause: Vec<Literal>) {
        requires!(clause.iter().all(|&literal| literal.variable() <= self.span()));
        self.clauses.push(clause);
    }
    /// The highest variable that occurs in some clause.
    pub fn max_variable(&self) -> Variable {
        self.literals()
            .map(|literal| literal.variable())
            .max()
            .unwrap_or_default()
    }
    /// Iterate over all literal occurrences.
    pub fn literals(&self) -> impl Iterator<Item = Literal> + '_ {
        self.clauses.iter().flat_map(|clause| clause.iter().cloned())
    }
    /// Check that every literal lies within the span of this formula.
    pub fn validate(&self, name: &str) -> Result<()> {
        let max_variable = self.max_variable();
        if max_variable > self.span() {
            return Err(Error::SizeMismatch(format!(
                "{} formula declares {} variables but refers to variable {}",
                name,
                self.span(),
                max_variable
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "cnf {} {}", self.span(), self.number_of_clauses())?;
        for clause in &self.clauses {
            for literal in clause {
                write!(f, "{} ", literal)?;
            }
            writeln!(f, "0")?;
        }
        Ok(())
    }
}
