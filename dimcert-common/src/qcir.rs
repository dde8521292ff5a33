//! Quantified circuits (QCIR)
//!
//! Circuits are composed functionally: every operator consumes its left
//! operand and returns it extended by the gates of the right operand and the
//! connecting gate. Variables are never renumbered during composition, so all
//! operands must already use one shared variable numbering
//! (see [reindex](../reindex/index.html)).

use crate::{
    cnf::Formula,
    config,
    literal::{Literal, Variable},
    memory::Offset,
};
use std::{fmt, ops::Range};

/// The quantifier of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    Exists,
    ForAll,
}

/// What a [Reference](struct.Reference.html) points to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferenceKind {
    Variable,
    Gate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateKind {
    And,
    Or,
}

/// A possibly negated reference to a variable or a gate.
///
/// The magnitude of `id` is a 1-based index into the variables or the gates
/// of the circuit, a negative `id` denotes negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub id: isize,
    pub kind: ReferenceKind,
}

impl Reference {
    /// Refer to the variable of a literal, with the literal's polarity.
    pub fn literal(literal: Literal) -> Reference {
        Reference {
            id: literal.decode() as isize,
            kind: ReferenceKind::Variable,
        }
    }
    /// Refer to the gate with the given 1-based index.
    pub fn gate(index: usize) -> Reference {
        requires!(index != 0);
        Reference {
            id: index as isize,
            kind: ReferenceKind::Gate,
        }
    }
    /// The 1-based index of the variable or gate.
    pub fn index(self) -> usize {
        self.id.abs() as usize
    }
    pub fn is_negated(self) -> bool {
        self.id < 0
    }
    pub fn negated(self) -> Reference {
        Reference {
            id: -self.id,
            kind: self.kind,
        }
    }
    /// Add `shift` to the index if this refers to a `kind`, keeping the polarity.
    fn shifted(self, kind: ReferenceKind, shift: usize) -> Reference {
        if self.kind != kind {
            return self;
        }
        let shift = shift as isize;
        Reference {
            id: if self.id < 0 {
                self.id - shift
            } else {
                self.id + shift
            },
            kind: self.kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gate {
    pub kind: GateKind,
    pub inputs: Vec<Reference>,
}

/// A combinational circuit with one quantifier per variable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QCir {
    /// The quantifier of each variable; variable `i` is at offset `i - 1`
    pub vars: Vec<Quantifier>,
    /// The gates; gate `i` is at offset `i - 1` and only refers to earlier gates
    pub gates: Vec<Gate>,
    /// The root of the circuit
    pub output: Reference,
}

/// Convert a CNF into an AND of ORs.
///
/// Gate `i` is the disjunction of clause `i`, the last gate is the conjunction
/// of all clause gates. All variables are existentially quantified.
impl From<&Formula> for QCir {
    fn from(formula: &Formula) -> QCir {
        let mut gates: Vec<Gate> = formula
            .clauses
            .iter()
            .map(|clause| Gate {
                kind: GateKind::Or,
                inputs: clause.iter().cloned().map(Reference::literal).collect(),
            })
            .collect();
        gates.push(Gate {
            kind: GateKind::And,
            inputs: (1..=formula.number_of_clauses()).map(Reference::gate).collect(),
        });
        let circuit = QCir {
            vars: vec![Quantifier::Exists; formula.span().as_offset()],
            output: Reference::gate(gates.len()),
            gates,
        };
        circuit.check_invariants();
        circuit
    }
}

impl QCir {
    pub fn number_of_variables(&self) -> usize {
        self.vars.len()
    }
    pub fn number_of_gates(&self) -> usize {
        self.gates.len()
    }
    /// Evaluate this circuit in the next timeframe.
    ///
    /// Doubles the variables and moves every variable reference to the
    /// second half.
    pub fn next_timeframe(mut self) -> QCir {
        let shift = self.vars.len();
        let current = self.vars.clone();
        self.vars.extend(current);
        for gate in &mut self.gates {
            for input in &mut gate.inputs {
                *input = input.shifted(ReferenceKind::Variable, shift);
            }
        }
        self.output = self.output.shifted(ReferenceKind::Variable, shift);
        self.check_invariants();
        self
    }
    /// Negate the output.
    pub fn negate(mut self) -> QCir {
        self.output = self.output.negated();
        self
    }
    pub fn and(self, other: &QCir) -> QCir {
        self.connect(GateKind::And, false, other)
    }
    pub fn or(self, other: &QCir) -> QCir {
        self.connect(GateKind::Or, false, other)
    }
    /// `self → other`, that is `¬self ∨ other`.
    pub fn imply(self, other: &QCir) -> QCir {
        self.connect(GateKind::Or, true, other)
    }
    /// Merge `other` into this circuit and add a gate over both outputs.
    fn connect(mut self, kind: GateKind, negate_left: bool, other: &QCir) -> QCir {
        let left = if negate_left {
            self.output.negated()
        } else {
            self.output
        };
        let right = self.merge(other);
        self.gates.push(Gate {
            kind,
            inputs: vec![left, right],
        });
        self.output = Reference::gate(self.gates.len());
        self.check_invariants();
        self
    }
    /// Append the gates of `other`, renumbering its gate references.
    ///
    /// Variables missing on this side are copied from `other`. Returns the
    /// output of `other` in the numbering of the extended circuit.
    fn merge(&mut self, other: &QCir) -> Reference {
        if other.vars.len() > self.vars.len() {
            let missing = &other.vars[self.vars.len()..];
            self.vars.extend_from_slice(missing);
        }
        let shift = self.gates.len();
        self.gates.extend(other.gates.iter().map(|gate| Gate {
            kind: gate.kind,
            inputs: gate
                .inputs
                .iter()
                .map(|input| input.shifted(ReferenceKind::Gate, shift))
                .collect(),
        }));
        other.output.shifted(ReferenceKind::Gate, shift)
    }
    /// Set every quantifier to `default`, except for `exists`, which are
    /// existentially quantified.
    ///
    /// Variables in `exists` beyond the variables of this circuit are ignored,
    /// so the same set can be applied to single and double timeframe circuits.
    pub fn quantify(&mut self, default: Quantifier, exists: &[Variable]) {
        for quantifier in &mut self.vars {
            *quantifier = default;
        }
        for &variable in exists {
            requires!(variable != Variable(0));
            if let Some(quantifier) = self.vars.get_mut(variable.as_offset() - 1) {
                *quantifier = Quantifier::Exists;
            }
        }
    }
    /// The maximal runs of equally quantified consecutive variables, as
    /// 1-based ranges.
    pub fn quantifier_blocks(&self) -> Vec<(Quantifier, Range<usize>)> {
        let mut blocks: Vec<(Quantifier, Range<usize>)> = Vec::new();
        for (offset, &quantifier) in self.vars.iter().enumerate() {
            let variable = offset + 1;
            if let Some((last, range)) = blocks.last_mut() {
                if *last == quantifier {
                    range.end = variable + 1;
                    continue;
                }
            }
            blocks.push((quantifier, variable..variable + 1));
        }
        blocks
    }
    /// Compute the value of the output under the given variable assignment.
    pub fn evaluate(&self, value: impl Fn(Variable) -> bool) -> bool {
        let mut gate_values: Vec<bool> = Vec::with_capacity(self.gates.len());
        let lookup = |reference: Reference, gate_values: &[bool]| {
            let positive = match reference.kind {
                ReferenceKind::Variable => value(Variable::from_usize(reference.index())),
                ReferenceKind::Gate => gate_values[reference.index() - 1],
            };
            positive != reference.is_negated()
        };
        for gate in &self.gates {
            let mut inputs = gate
                .inputs
                .iter()
                .map(|&input| lookup(input, &gate_values[..]));
            let result = match gate.kind {
                GateKind::And => inputs.all(|input| input),
                GateKind::Or => inputs.any(|input| input),
            };
            gate_values.push(result);
        }
        lookup(self.output, &gate_values[..])
    }
    /// Check that references only point to existing variables and earlier gates.
    fn check_invariants(&self) {
        if !config::CHECK_CIRCUIT_INVARIANTS {
            return;
        }
        let valid = |reference: &Reference, gates: usize| {
            reference.id != 0
                && match reference.kind {
                    ReferenceKind::Variable => reference.index() <= self.vars.len(),
                    ReferenceKind::Gate => reference.index() <= gates,
                }
        };
        for (offset, gate) in self.gates.iter().enumerate() {
            for input in &gate.inputs {
                invariant!(valid(input, offset), "gate {} has invalid input {:?}", offset + 1, input);
            }
        }
        invariant!(valid(&self.output, self.gates.len()));
    }
}

impl fmt::Display for Quantifier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Quantifier::Exists => "exists",
                Quantifier::ForAll => "forall",
            }
        )
    }
}

impl fmt::Display for GateKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                GateKind::And => "and",
                GateKind::Or => "or",
            }
        )
    }
}

/// Print a reference in the QCIR numbering, where gates follow the variables.
fn write_reference(f: &mut fmt::Formatter, reference: Reference, vars: usize) -> fmt::Result {
    let index = match reference.kind {
        ReferenceKind::Variable => reference.index(),
        ReferenceKind::Gate => vars + reference.index(),
    };
    write!(f, "{}{}", if reference.is_negated() { "-" } else { "" }, index)
}

/// Print in QCIR-G14 format.
impl fmt::Display for QCir {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let vars = self.vars.len();
        writeln!(f, "#QCIR-G14 {}", vars)?;
        for (quantifier, range) in self.quantifier_blocks() {
            write!(f, "{}(", quantifier)?;
            for variable in range.clone() {
                if variable != range.start {
                    write!(f, ", ")?;
                }
                write!(f, "{}", variable)?;
            }
            writeln!(f, ")")?;
        }
        write!(f, "output(")?;
        write_reference(f, self.output, vars)?;
        writeln!(f, ")")?;
        for (offset, gate) in self.gates.iter().enumerate() {
            write!(f, "{} = {}(", vars + offset + 1, gate.kind)?;
            for (i, &input) in gate.inputs.iter().enumerate() {
                if i != 0 {
                    write!(f, ", ")?;
                }
                write_reference(f, input, vars)?;
            }
            writeln!(f, ")")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn formula(variables: u32, clauses: &[&[i32]]) -> Formula {
        let mut formula = Formula::new(Variable(variables));
        for clause in clauses {
            formula.add_clause(clause.iter().cloned().map(Literal::new).collect());
        }
        formula
    }

    /// All assignments to `variables` variables, as bit masks.
    fn assignments(variables: u32) -> impl Iterator<Item = impl Fn(Variable) -> bool> {
        (0..1u32 << variables).map(|mask| move |variable: Variable| mask & (1 << (variable.0 - 1)) != 0)
    }

    fn cnf_value(formula: &Formula, value: &impl Fn(Variable) -> bool) -> bool {
        formula.clauses.iter().all(|clause| {
            clause
                .iter()
                .any(|&literal| value(literal.variable()) != literal.is_negative())
        })
    }

    #[test]
    fn and_of_ors() {
        let cnf = formula(3, &[&[1, -2], &[3], &[-1, 2, -3]]);
        let circuit = QCir::from(&cnf);
        assert_eq!(circuit.vars, vec![Quantifier::Exists; 3]);
        assert_eq!(circuit.number_of_gates(), 4);
        assert_eq!(circuit.output, Reference::gate(4));
        assert_eq!(
            circuit.gates[0].inputs,
            vec![Reference::literal(Literal::new(1)), Reference::literal(Literal::new(-2))]
        );
        assert_eq!(circuit.gates[3].kind, GateKind::And);
        assert_eq!(
            circuit.gates[3].inputs,
            vec![Reference::gate(1), Reference::gate(2), Reference::gate(3)]
        );
        for value in assignments(3) {
            assert_eq!(circuit.evaluate(&value), cnf_value(&cnf, &value));
        }
    }

    #[test]
    fn empty_formula_is_true() {
        let circuit = QCir::from(&Formula::new(Variable(0)));
        assert!(circuit.vars.is_empty());
        assert_eq!(
            circuit.gates,
            vec![Gate {
                kind: GateKind::And,
                inputs: vec![]
            }]
        );
        assert_eq!(circuit.output, Reference::gate(1));
        assert!(circuit.evaluate(|_| false));
        assert_eq!(format!("{}", circuit), "#QCIR-G14 0\noutput(1)\n1 = and()\n");
    }

    #[test]
    fn transition_formulas_span_two_timeframes() {
        let mut transition = Formula::with_next(Variable(2));
        transition.add_clause(vec![Literal::new(-1), Literal::new(4)]);
        assert_eq!(QCir::from(&transition).number_of_variables(), 4);
    }

    #[test]
    fn negate_twice() {
        let circuit = QCir::from(&formula(2, &[&[1, 2]]));
        let negated = circuit.clone().negate();
        assert!(negated.output.is_negated());
        assert_eq!(negated.gates, circuit.gates);
        assert_eq!(negated.negate(), circuit);
    }

    #[test]
    fn merge_is_size_additive() {
        let left = QCir::from(&formula(2, &[&[1, 2], &[-1]]));
        let right = QCir::from(&formula(4, &[&[-4, 3]]));
        let mut merged = left.clone();
        let output = merged.merge(&right);
        assert_eq!(merged.number_of_gates(), left.number_of_gates() + right.number_of_gates());
        assert_eq!(merged.number_of_variables(), 4);
        assert_eq!(output, Reference::gate(5));
        assert_eq!(merged.gates[4].inputs, vec![Reference::gate(4)]);
        // Variable references are untouched.
        assert_eq!(merged.gates[3], right.gates[0]);
    }

    #[test]
    fn operators_match_boolean_semantics() {
        let a = formula(3, &[&[1, 2], &[-3]]);
        let b = formula(3, &[&[-1, 3]]);
        let and = QCir::from(&a).and(&QCir::from(&b));
        let or = QCir::from(&a).or(&QCir::from(&b));
        let imply = QCir::from(&a).imply(&QCir::from(&b));
        let not_a_and_b = QCir::from(&a).negate().and(&QCir::from(&b).negate());
        for value in assignments(3) {
            let (a, b) = (cnf_value(&a, &value), cnf_value(&b, &value));
            assert_eq!(and.evaluate(&value), a && b);
            assert_eq!(or.evaluate(&value), a || b);
            assert_eq!(imply.evaluate(&value), !a || b);
            assert_eq!(not_a_and_b.evaluate(&value), !a && !b);
        }
        assert_eq!(imply.gates.last().unwrap().inputs[0], Reference::gate(3).negated());
    }

    #[test]
    fn next_timeframe_shifts_variables_only() {
        let circuit = QCir::from(&formula(2, &[&[1, -2]])).next_timeframe();
        assert_eq!(circuit.number_of_variables(), 4);
        assert_eq!(
            circuit.gates[0].inputs,
            vec![Reference::literal(Literal::new(3)), Reference::literal(Literal::new(-4))]
        );
        assert_eq!(circuit.gates[1].inputs, vec![Reference::gate(1)]);
        assert_eq!(circuit.output, Reference::gate(2));
        assert!(circuit.evaluate(|variable| variable == Variable(3)));
        assert!(!circuit.evaluate(|variable| variable == Variable(4)));
    }

    #[test]
    fn quantifier_blocks_cover_all_variables() {
        let mut circuit = QCir::from(&formula(5, &[&[1, 5]]));
        circuit.quantify(Quantifier::ForAll, &[Variable(2), Variable(3), Variable(9)]);
        assert_eq!(
            circuit.quantifier_blocks(),
            vec![
                (Quantifier::ForAll, 1..2),
                (Quantifier::Exists, 2..4),
                (Quantifier::ForAll, 4..6),
            ]
        );
        assert_eq!(
            format!("{}", circuit),
            "#QCIR-G14 5
forall(1)
exists(2, 3)
forall(4, 5)
output(7)
6 = or(1, 5)
7 = and(6)
"
        );
    }

    #[test]
    fn negated_gate_output_is_printed_after_the_variables() {
        let circuit = QCir::from(&formula(2, &[&[-1]])).imply(&QCir::from(&formula(2, &[&[2]])));
        assert_eq!(
            format!("{}", circuit.negate()),
            "#QCIR-G14 2
exists(1, 2)
output(-7)
3 = or(-1)
4 = and(3)
5 = or(2)
6 = and(5)
7 = or(-4, 6)
"
        );
    }
}
