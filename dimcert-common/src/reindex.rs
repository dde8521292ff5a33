//! Merge the variable spaces of witness and model
//!
//! Witness and model number their variables independently. Before their
//! formulas can be combined into one query, every literal is rewritten onto a
//! shared numbering with the following layout, where `W` and `M` are the
//! witness and model sizes and `S = W + M - |pairs|`:
//!
//! ```text
//!   1 ..= W          witness state (shared components included)
//!   W+1 ..= S        model-only state, in model order
//!   S+1 ..= 2S       the next-state copy of the above
//! ```
//!
//! A model variable that corresponds to a witness variable takes the
//! witness's slot, in both timeframes.

use crate::{
    cnf::Formula,
    error::{Error, Result},
    literal::{Literal, Variable},
    memory::{Array, Offset},
    system::{Correspondence, TransitionSystem},
};
use std::cmp;

/// The shared numbering computed by [index_consecutively](fn.index_consecutively.html).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedSpace {
    /// The number of current-state variables in the shared numbering
    pub size: Variable,
    /// Maps every witness variable (both timeframes) to its shared variable
    pub witness_map: Array<Variable, Variable>,
    /// Maps every model variable (both timeframes) to its shared variable
    pub model_map: Array<Variable, Variable>,
    /// The current-state shared variables of corresponding state components, ascending
    pub shared: Vec<Variable>,
    /// Whether no correspondence was given and the positional default was used
    pub positional_default: bool,
}

impl SharedSpace {
    /// The corresponding variables in the current timeframe.
    pub fn shared_current(&self) -> &[Variable] {
        &self.shared
    }
    /// The corresponding variables in the next timeframe.
    pub fn shared_next(&self) -> impl Iterator<Item = Variable> + '_ {
        let size = self.size;
        self.shared.iter().map(move |&variable| variable.shifted(size))
    }
    /// The corresponding variables in both timeframes.
    pub fn shared_both(&self) -> Vec<Variable> {
        self.shared
            .iter()
            .cloned()
            .chain(self.shared_next())
            .collect()
    }
}

/// Rewrite witness and model onto one shared variable numbering.
///
/// Every literal in the eight formulas is replaced by the literal of the same
/// polarity over the shared variable, and each formula's variable count is
/// set to the shared size. Returns the numbering, including the set of
/// variables that both systems agree on.
pub fn index_consecutively(
    witness: &mut TransitionSystem,
    model: &mut TransitionSystem,
) -> Result<SharedSpace> {
    let witness_size = witness.size().map_err(|err| err.context("witness"))?;
    let model_size = model.size().map_err(|err| err.context("model"))?;
    let positional_default = witness.simulation.is_empty();
    let pairs: Vec<(Variable, Variable)> = if positional_default {
        let max_shared_size = cmp::min(witness_size, model_size);
        max_shared_size
            .upto()
            .map(|variable| (variable, variable))
            .collect()
    } else {
        resolve_correspondence(&witness.simulation, witness_size, model_size)?
    };
    let size = witness_size.as_offset() + model_size.as_offset() - pairs.len();
    if 2 * size > Literal::MAX_VARIABLE as usize {
        return Err(Error::Malformed(format!(
            "{} witness and {} model variables exceed the maximum variable",
            witness_size, model_size
        )));
    }
    let size = Variable::from_usize(size);

    let mut witness_map = Array::new(Variable(0), timeframes_array_size(witness_size));
    for variable in witness_size.upto() {
        witness_map[variable] = variable;
        witness_map[variable.shifted(witness_size)] = variable.shifted(size);
    }

    let mut partner = Array::new(Variable(0), model_size.array_size_for_variables());
    for &(witness_variable, model_variable) in &pairs {
        partner[model_variable] = witness_variable;
    }
    let mut model_map = Array::new(Variable(0), timeframes_array_size(model_size));
    let mut next_free = witness_size;
    for variable in model_size.upto() {
        let shared = if partner[variable] != Variable(0) {
            partner[variable]
        } else {
            next_free = Variable(next_free.0 + 1);
            next_free
        };
        model_map[variable] = shared;
        model_map[variable.shifted(model_size)] = shared.shifted(size);
    }
    invariant!(next_free == size);

    rewrite(witness, &witness_map, size);
    rewrite(model, &model_map, size);

    let mut shared: Vec<Variable> = pairs
        .iter()
        .map(|&(witness_variable, _)| witness_map[witness_variable])
        .collect();
    shared.sort();
    Ok(SharedSpace {
        size,
        witness_map,
        model_map,
        shared,
        positional_default,
    })
}

/// The size of a table indexed by the variables of both timeframes.
fn timeframes_array_size(size: Variable) -> usize {
    2 * size.as_offset() + 1
}

/// Check the given correspondence and convert it to variable pairs.
///
/// Each variable may occur in at most one pair per side.
fn resolve_correspondence(
    simulation: &[Correspondence],
    witness_size: Variable,
    model_size: Variable,
) -> Result<Vec<(Variable, Variable)>> {
    let mut witness_seen = Array::new(false, witness_size.array_size_for_variables());
    let mut model_seen = Array::new(false, model_size.array_size_for_variables());
    let mut pairs = Vec::with_capacity(simulation.len());
    for pair in simulation {
        let witness_variable = state_variable(pair.witness, witness_size).ok_or_else(|| {
            Error::MappingConflict(format!(
                "pair {} = {} refers to witness variable {}, but the witness has {} variables",
                pair.witness, pair.model, pair.witness, witness_size
            ))
        })?;
        let model_variable = state_variable(pair.model, model_size).ok_or_else(|| {
            Error::MappingConflict(format!(
                "pair {} = {} refers to model variable {}, but the model has {} variables",
                pair.witness, pair.model, pair.model, model_size
            ))
        })?;
        if witness_seen[witness_variable] {
            return Err(Error::MappingConflict(format!(
                "witness variable {} occurs in more than one pair",
                witness_variable
            )));
        }
        if model_seen[model_variable] {
            return Err(Error::MappingConflict(format!(
                "model variable {} occurs in more than one pair",
                model_variable
            )));
        }
        witness_seen[witness_variable] = true;
        model_seen[model_variable] = true;
        pairs.push((witness_variable, model_variable));
    }
    Ok(pairs)
}

/// Interpret a correspondence id as current-state variable of a system with
/// `size` variables.
fn state_variable(id: i64, size: Variable) -> Option<Variable> {
    if id >= 1 && id <= i64::from(size.0) {
        Some(Variable(id as u32))
    } else {
        None
    }
}

fn rewrite(system: &mut TransitionSystem, map: &Array<Variable, Variable>, size: Variable) {
    for formula in system.formulas_mut().iter_mut() {
        rewrite_formula(formula, map, size);
    }
}

fn rewrite_formula(formula: &mut Formula, map: &Array<Variable, Variable>, size: Variable) {
    for clause in formula.clauses.iter_mut() {
        for literal in clause.iter_mut() {
            *literal = literal.with_variable(map[literal.variable()]);
        }
    }
    formula.variables = size;
    invariant!(formula.max_variable() <= formula.span());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clause(literals: &[i32]) -> Vec<Literal> {
        literals.iter().cloned().map(Literal::new).collect()
    }

    fn decoded(formula: &Formula) -> Vec<Vec<i32>> {
        formula
            .clauses
            .iter()
            .map(|clause| clause.iter().map(|literal| literal.decode()).collect())
            .collect()
    }

    fn pair(witness: i64, model: i64) -> Correspondence {
        Correspondence { witness, model }
    }

    #[test]
    fn positional_default_with_extra_witness_variable() {
        let mut model = TransitionSystem::new(Variable(2));
        model.initial.add_clause(clause(&[1, 2]));
        let mut witness = TransitionSystem::new(Variable(3));
        witness.initial.add_clause(clause(&[1, 2]));
        let space = index_consecutively(&mut witness, &mut model).unwrap();
        assert!(space.positional_default);
        assert_eq!(space.size, Variable(3));
        assert_eq!(space.shared_current(), &[Variable(1), Variable(2)]);
        assert_eq!(
            space.shared_next().collect::<Vec<_>>(),
            vec![Variable(4), Variable(5)]
        );
        assert_eq!(decoded(&model.initial), vec![vec![1, 2]]);
        assert_eq!(decoded(&witness.initial), vec![vec![1, 2]]);
        for (_, formula) in witness.formulas().iter().chain(model.formulas().iter()) {
            assert_eq!(formula.variables, Variable(3));
        }
        assert!(model.transition.has_next);
    }

    #[test]
    fn single_explicit_pair() {
        let mut model = TransitionSystem::new(Variable(2));
        model.universal.add_clause(clause(&[-1, 2]));
        let mut witness = TransitionSystem::new(Variable(2));
        witness.universal.add_clause(clause(&[1, -2]));
        witness.simulation.push(pair(1, 1));
        let space = index_consecutively(&mut witness, &mut model).unwrap();
        assert!(!space.positional_default);
        assert_eq!(space.size, Variable(3));
        assert_eq!(space.shared, vec![Variable(1)]);
        assert_eq!(decoded(&witness.universal), vec![vec![1, -2]]);
        assert_eq!(decoded(&model.universal), vec![vec![-1, 3]]);
    }

    #[test]
    fn next_state_literals_use_the_mirrored_block() {
        let mut model = TransitionSystem::new(Variable(1));
        // x' = x
        model.transition.add_clause(clause(&[-1, 2]));
        model.transition.add_clause(clause(&[1, -2]));
        let mut witness = TransitionSystem::new(Variable(2));
        // y1' = y2
        witness.transition.add_clause(clause(&[-2, 3]));
        witness.simulation.push(pair(2, 1));
        let space = index_consecutively(&mut witness, &mut model).unwrap();
        assert_eq!(space.size, Variable(2));
        assert_eq!(space.shared, vec![Variable(2)]);
        assert_eq!(decoded(&model.transition), vec![vec![-2, 4], vec![2, -4]]);
        assert_eq!(decoded(&witness.transition), vec![vec![-2, 3]]);
        assert_eq!(model.transition.span(), Variable(4));
    }

    #[test]
    fn correspondence_symmetry() {
        let mut model = TransitionSystem::new(Variable(4));
        let mut witness = TransitionSystem::new(Variable(3));
        witness.simulation = vec![pair(3, 1), pair(1, 4), pair(2, 2)];
        let space = index_consecutively(&mut witness, &mut model).unwrap();
        assert_eq!(space.size, Variable(4));
        for pair in &witness.simulation {
            let w = Variable(pair.witness as u32);
            let m = Variable(pair.model as u32);
            assert_eq!(space.witness_map[w], space.model_map[m]);
            assert_eq!(
                space.witness_map[w.shifted(Variable(3))],
                space.model_map[m.shifted(Variable(4))]
            );
        }
        // The only model-only variable gets the only free slot.
        assert_eq!(space.model_map[Variable(3)], Variable(4));
        assert_eq!(space.model_map[Variable(7)], Variable(8));
    }

    #[test]
    fn rewriting_preserves_signs_and_bounds() {
        let mut model = TransitionSystem::new(Variable(3));
        model.initial.add_clause(clause(&[-1, 2, -3]));
        model.goal.add_clause(clause(&[3]));
        model.transition.add_clause(clause(&[-6, 4, 1]));
        let mut witness = TransitionSystem::new(Variable(2));
        witness.transition.add_clause(clause(&[-4, -3, 2]));
        witness.simulation.push(pair(2, 3));
        let before_model = model.clone();
        let before_witness = witness.clone();
        let space = index_consecutively(&mut witness, &mut model).unwrap();
        for (before, after) in vec![(before_model, model), (before_witness, witness)] {
            for ((_, old), (_, rewritten)) in before.formulas().iter().zip(after.formulas().iter()) {
                assert_eq!(rewritten.variables, space.size);
                for (old, new) in old.literals().zip(rewritten.literals()) {
                    assert_eq!(old.is_negative(), new.is_negative());
                    assert!(new.variable() <= rewritten.span());
                }
            }
        }
    }

    #[test]
    fn variable_in_two_pairs() {
        let mut model = TransitionSystem::new(Variable(2));
        let mut witness = TransitionSystem::new(Variable(2));
        witness.simulation = vec![pair(1, 1), pair(1, 2)];
        match index_consecutively(&mut witness, &mut model) {
            Err(Error::MappingConflict(why)) => {
                assert_eq!(why, "witness variable 1 occurs in more than one pair")
            }
            other => panic!("unexpected result: {:?}", other),
        }
        witness.simulation = vec![pair(1, 2), pair(2, 2)];
        assert!(matches!(
            index_consecutively(&mut witness, &mut model),
            Err(Error::MappingConflict(_))
        ));
    }

    #[test]
    fn partner_out_of_range() {
        let mut model = TransitionSystem::new(Variable(2));
        let mut witness = TransitionSystem::new(Variable(2));
        for &(w, m) in &[(3, 1), (1, 0), (-1, 1)] {
            witness.simulation = vec![pair(w, m)];
            assert!(matches!(
                index_consecutively(&mut witness, &mut model),
                Err(Error::MappingConflict(_))
            ));
        }
    }

    #[test]
    fn inconsistent_system_size() {
        let mut model = TransitionSystem::new(Variable(2));
        model.goal.clauses.push(clause(&[3]));
        let mut witness = TransitionSystem::new(Variable(2));
        match index_consecutively(&mut witness, &mut model) {
            Err(Error::SizeMismatch(why)) => assert!(why.starts_with("model: goal formula")),
            other => panic!("unexpected result: {:?}", other),
        }
    }
}
