//! Variable and literal representations

use crate::memory::Offset;
use static_assertions::const_assert;
use std::{convert::TryFrom, fmt, mem::size_of, ops};

/// A propositional variable, identified by a positive number.
///
/// `Variable(0)` is never used by a formula; tables indexed by variables
/// simply leave slot 0 unused.
#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord, Hash, Default)]
pub struct Variable(pub u32);

impl Variable {
    /// Convert a count or 1-based position.
    /// # Panics
    /// Panics if the value does not fit the literal encoding.
    pub fn from_usize(value: usize) -> Variable {
        requires!(value <= Literal::MAX_VARIABLE as usize);
        Variable(value as u32)
    }
    /// The size of an array that can be indexed by every variable up to this one.
    pub fn array_size_for_variables(self) -> usize {
        self.as_offset() + 1
    }
    /// The size of an array that can be indexed by both literals of every
    /// variable up to this one.
    pub fn array_size_for_literals(self) -> usize {
        2 * (self.as_offset() + 1)
    }
    /// Iterate over the variables `1..=self`.
    pub fn upto(self) -> impl Iterator<Item = Variable> {
        (1..=self.0).map(Variable)
    }
    /// The variable obtained by adding `offset`, e.g. the next-state copy.
    pub fn shifted(self, offset: Variable) -> Variable {
        Variable::from_usize(self.as_offset() + offset.as_offset())
    }
}

impl Offset for Variable {
    fn as_offset(&self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A literal, packed into 32 bits.
///
/// The least significant bit is the sign, the remaining bits encode the
/// variable. This makes literals usable as index into an
/// [Array](../memory/struct.Array.html) sized by
/// [array_size_for_literals](struct.Variable.html#method.array_size_for_literals).
#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, PartialOrd, Ord, Default)]
pub struct Literal {
    encoding: u32,
}

impl Literal {
    /// The largest variable a literal can refer to.
    pub const MAX_VARIABLE: u32 = i32::max_value() as u32;

    /// Construct a new literal from the usual signed representation.
    pub fn new(value: i32) -> Literal {
        requires!(value != 0 && value != i32::min_value());
        Literal {
            encoding: (value.abs() as u32) * 2 + ((value < 0) as u32),
        }
    }
    /// Convert a signed literal of arbitrary width, failing if it is zero or
    /// does not fit.
    pub fn try_from_i64(value: i64) -> Option<Literal> {
        if value == 0 {
            return None;
        }
        i32::try_from(value)
            .ok()
            .filter(|&value| value != i32::min_value())
            .map(Literal::new)
    }
    /// Create the literal of `variable` with the given polarity.
    pub fn from_variable(variable: Variable, negative: bool) -> Literal {
        requires!(variable.0 != 0 && variable.0 <= Literal::MAX_VARIABLE);
        Literal {
            encoding: variable.0 * 2 + (negative as u32),
        }
    }
    /// Return the signed representation.
    pub fn decode(self) -> i32 {
        let magnitude = self.variable().0 as i32;
        if self.is_negative() {
            -magnitude
        } else {
            magnitude
        }
    }
    pub fn variable(self) -> Variable {
        Variable(self.encoding / 2)
    }
    pub fn is_negative(self) -> bool {
        self.encoding & 1 != 0
    }
    /// The literal with the same polarity over another variable.
    pub fn with_variable(self, variable: Variable) -> Literal {
        Literal::from_variable(variable, self.is_negative())
    }
}

impl Offset for Literal {
    fn as_offset(&self) -> usize {
        self.encoding as usize
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.decode())
    }
}

impl ops::Neg for Literal {
    type Output = Literal;
    fn neg(self) -> Literal {
        Literal {
            encoding: self.encoding ^ 1,
        }
    }
}

#[allow(dead_code)]
fn assert_primitive_sizes() {
    const_assert!(size_of::<Literal>() == 4);
    const_assert!(size_of::<Variable>() == 4);
}
