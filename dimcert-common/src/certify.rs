//! The five certification queries
//!
//! Each query is a quantified circuit that is unsatisfiable if and only if
//! the corresponding check succeeds. Together they show that the witness
//! simulates the model (reset, transition, property) and that the witness
//! is inductive (base, step).

use crate::{
    cnf::Formula,
    error::Result,
    literal::Variable,
    parser::open_file_for_writing,
    qcir::{QCir, Quantifier},
    reindex::SharedSpace,
    system::TransitionSystem,
};
use std::{fmt, io::Write};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Query {
    /// Model initial states are witness initial states.
    Reset,
    /// Model transitions are witness transitions.
    Transition,
    /// Model bad states are witness bad states.
    Property,
    /// Witness initial states are not bad.
    Base,
    /// Good witness states only have good successors.
    Step,
}

impl Query {
    /// All queries, in the order of the command line arguments.
    pub const ALL: [Query; 5] = [
        Query::Reset,
        Query::Transition,
        Query::Property,
        Query::Base,
        Query::Step,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Query::Reset => "reset",
            Query::Transition => "transition",
            Query::Property => "property",
            Query::Base => "base",
            Query::Step => "step",
        }
    }
    /// The output file used when none is given.
    pub fn default_filename(self) -> &'static str {
        match self {
            Query::Reset => "reset.cir",
            Query::Transition => "transition.cir",
            Query::Property => "property.cir",
            Query::Base => "base.cir",
            Query::Step => "step.cir",
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How the variables of a query are quantified.
///
/// Every variable gets `default`, except those in `exists`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuantifierRule {
    pub default: Quantifier,
    pub exists: Vec<Variable>,
}

impl QuantifierRule {
    /// The rule of `query` given the correspondence between witness and model.
    ///
    /// In the simulation queries the corresponding state is chosen
    /// existentially and all other state universally. The witness-only
    /// queries are plain satisfiability checks.
    pub fn of(query: Query, space: &SharedSpace) -> QuantifierRule {
        match query {
            Query::Reset | Query::Property => QuantifierRule {
                default: Quantifier::ForAll,
                exists: space.shared_current().to_vec(),
            },
            Query::Transition => QuantifierRule {
                default: Quantifier::ForAll,
                exists: space.shared_both(),
            },
            Query::Base | Query::Step => QuantifierRule {
                default: Quantifier::Exists,
                exists: Vec::new(),
            },
        }
    }
    pub fn apply(&self, circuit: &mut QCir) {
        circuit.quantify(self.default, &self.exists);
    }
}

/// Build the circuit of `query` without quantifiers applied.
///
/// Witness and model must have been re-indexed onto one numbering.
pub fn query_circuit(query: Query, witness: &TransitionSystem, model: &TransitionSystem) -> QCir {
    let circuit = |formula: &Formula| QCir::from(formula);
    match query {
        // ¬((I ∧ U) → (I' ∧ U'))
        Query::Reset => circuit(&model.initial)
            .and(&circuit(&model.universal))
            .imply(&circuit(&witness.initial).and(&circuit(&witness.universal)))
            .negate(),
        // ¬((T ∧ U ∧ next(U) ∧ U') → (T' ∧ next(U')))
        Query::Transition => circuit(&model.transition)
            .and(&circuit(&model.universal))
            .and(
                &circuit(&model.universal)
                    .next_timeframe()
                    .and(&circuit(&witness.universal)),
            )
            .imply(
                &circuit(&witness.transition)
                    .and(&circuit(&witness.universal).next_timeframe()),
            )
            .negate(),
        // ¬((U ∧ U') → (¬G → ¬G'))
        Query::Property => circuit(&model.universal)
            .and(&circuit(&witness.universal))
            .imply(
                &circuit(&model.goal)
                    .negate()
                    .imply(&circuit(&witness.goal).negate()),
            )
            .negate(),
        // ¬((I' ∧ U') → ¬G')
        Query::Base => circuit(&witness.initial)
            .and(&circuit(&witness.universal))
            .imply(&circuit(&witness.goal).negate())
            .negate(),
        // ¬((¬G' ∧ T' ∧ U' ∧ next(U')) → ¬next(G'))
        Query::Step => circuit(&witness.goal)
            .negate()
            .and(&circuit(&witness.transition))
            .and(
                &circuit(&witness.universal)
                    .and(&circuit(&witness.universal).next_timeframe()),
            )
            .imply(&circuit(&witness.goal).next_timeframe().negate())
            .negate(),
    }
}

/// Build `query` and quantify its variables.
pub fn build_query(
    query: Query,
    witness: &TransitionSystem,
    model: &TransitionSystem,
    space: &SharedSpace,
) -> QCir {
    let mut circuit = query_circuit(query, witness, model);
    QuantifierRule::of(query, space).apply(&mut circuit);
    circuit
}

/// Write a query in QCIR format to the given file ("-" for stdout).
pub fn write_query(circuit: &QCir, filename: &str) -> Result<()> {
    let mut file = open_file_for_writing(filename)?;
    write!(file, "{}", circuit)?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        literal::Literal,
        memory::Offset,
        reindex::index_consecutively,
        system::Correspondence,
    };

    fn clause(literals: &[i32]) -> Vec<Literal> {
        literals.iter().cloned().map(Literal::new).collect()
    }

    fn reindexed(
        mut witness: TransitionSystem,
        mut model: TransitionSystem,
    ) -> (TransitionSystem, TransitionSystem, SharedSpace) {
        let space = index_consecutively(&mut witness, &mut model).unwrap();
        (witness, model, space)
    }

    /// Evaluate under every assignment and return true if one satisfies the circuit.
    fn satisfiable(circuit: &QCir) -> bool {
        let variables = circuit.number_of_variables();
        assert!(variables < 16);
        (0..1u32 << variables)
            .any(|mask| circuit.evaluate(|variable| mask & (1 << (variable.0 - 1)) != 0))
    }

    /// One bit that starts at 0 and keeps its value; 1 is bad.
    fn constant() -> TransitionSystem {
        let mut system = TransitionSystem::new(Variable(1));
        system.initial.add_clause(clause(&[-1]));
        system.transition.add_clause(clause(&[-1, 2]));
        system.transition.add_clause(clause(&[1, -2]));
        system.goal.add_clause(clause(&[1]));
        system
    }

    #[test]
    fn reset_query_scenario() {
        let mut model = TransitionSystem::new(Variable(2));
        model.initial.add_clause(clause(&[1, 2]));
        let mut witness = TransitionSystem::new(Variable(3));
        witness.initial.add_clause(clause(&[1, 2]));
        let (witness, model, space) = reindexed(witness, model);
        let reset = build_query(Query::Reset, &witness, &model, &space);
        assert_eq!(
            format!("{}", reset),
            "#QCIR-G14 3
exists(1, 2)
forall(3)
output(-12)
4 = or(1, 2)
5 = and(4)
6 = and()
7 = and(5, 6)
8 = or(1, 2)
9 = and(8)
10 = and()
11 = and(9, 10)
12 = or(-7, 11)
"
        );
        assert!(!satisfiable(&reset));
    }

    #[test]
    fn quantifier_rules() {
        let mut witness = TransitionSystem::new(Variable(2));
        witness.simulation.push(Correspondence {
            witness: 2,
            model: 1,
        });
        let (witness, model, space) = reindexed(witness, TransitionSystem::new(Variable(2)));
        assert_eq!(space.size, Variable(3));
        let quantifiers = |query| build_query(query, &witness, &model, &space).vars;
        use crate::qcir::Quantifier::{Exists as E, ForAll as A};
        assert_eq!(quantifiers(Query::Reset), vec![A, E, A]);
        assert_eq!(quantifiers(Query::Property), vec![A, E, A]);
        assert_eq!(quantifiers(Query::Transition), vec![A, E, A, A, E, A]);
        assert_eq!(quantifiers(Query::Base), vec![E; 3]);
        assert_eq!(quantifiers(Query::Step), vec![E; 6]);
    }

    #[test]
    fn every_variable_is_quantified_once() {
        let mut witness = constant();
        witness.universal.add_clause(clause(&[-1, 1]));
        let (witness, model, space) = reindexed(witness, constant());
        for &query in Query::ALL.iter() {
            let circuit = build_query(query, &witness, &model, &space);
            let mut covered = vec![0; circuit.number_of_variables() + 1];
            for (_, range) in circuit.quantifier_blocks() {
                for variable in range {
                    covered[variable] += 1;
                }
            }
            assert!(covered[1..].iter().all(|&count| count == 1), "{}", query);
        }
    }

    #[test]
    fn identical_systems_certify() {
        let (witness, model, space) = reindexed(constant(), constant());
        assert_eq!(space.size, Variable(1));
        for &query in Query::ALL.iter() {
            let circuit = build_query(query, &witness, &model, &space);
            let timeframes = match query {
                Query::Transition | Query::Step => 2,
                _ => 1,
            };
            assert_eq!(circuit.number_of_variables(), timeframes * space.size.as_offset());
            // All variables are shared, so every query is a plain SAT check.
            assert!(!satisfiable(&circuit), "{} should be unsatisfiable", query);
        }
    }

    #[test]
    fn witness_that_is_not_inductive() {
        // Starts at 0, may go anywhere: the bad state is reachable.
        let mut witness = TransitionSystem::new(Variable(1));
        witness.initial.add_clause(clause(&[-1]));
        witness.goal.add_clause(clause(&[1]));
        let (witness, model, space) = reindexed(witness, constant());
        let base = build_query(Query::Base, &witness, &model, &space);
        let step = build_query(Query::Step, &witness, &model, &space);
        assert!(!satisfiable(&base));
        assert!(satisfiable(&step));
    }

    #[test]
    fn witness_that_does_not_contain_the_initial_states() {
        let mut witness = constant();
        witness.initial = Formula::new(Variable(1));
        witness.initial.add_clause(clause(&[1]));
        let (witness, model, _) = reindexed(witness, constant());
        assert!(satisfiable(&query_circuit(Query::Reset, &witness, &model)));
        assert!(!satisfiable(&query_circuit(Query::Property, &witness, &model)));
    }
}
