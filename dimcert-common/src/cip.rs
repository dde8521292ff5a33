//! CIP parser
//!
//! CIP is a line-oriented format. A `DECL` block lists the state variables,
//! then `INIT`, `TRANS` and `TARGET` blocks list one clause per line, each
//! literal written as `<literal>:<timeframe>`. Blocks end at an empty line.
//! CIP has no invariant constraints, so the universal formula stays empty.

use crate::{
    cnf::Formula,
    input::Input,
    literal::{Literal, Variable},
    system::{Correspondence, TransitionSystem},
};
use std::io::Result;

/// The variable kinds accepted in a `DECL` block.
const KINDS: [&str; 5] = ["AND_VAR", "AUX_VAR", "LATCH_VAR", "INPUT_VAR", "OUTPUT_VAR"];

/// Solver options that carry no meaning for the transition system.
const OPTIONS: [&str; 5] = [
    "OFFSET:",
    "USE_PROPERTY:",
    "SIMPLIFY_INTERPOLANTS:",
    "TIMEOUT:",
    "MAXDEPTH:",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Block {
    Init,
    Trans,
    Target,
}

impl Block {
    fn by_keyword(line: &str) -> Option<Block> {
        if line.starts_with("INIT") {
            Some(Block::Init)
        } else if line.starts_with("TRANS") {
            Some(Block::Trans)
        } else if line.starts_with("TARGET") {
            Some(Block::Target)
        } else {
            None
        }
    }
    fn formula(self, system: &mut TransitionSystem) -> &mut Formula {
        match self {
            Block::Init => &mut system.initial,
            Block::Trans => &mut system.transition,
            Block::Target => &mut system.goal,
        }
    }
}

/// Parse a transition system in CIP format.
pub fn parse_cip(input: &mut Input) -> Result<TransitionSystem> {
    let mut system = TransitionSystem::new(Variable(0));
    let mut simulation = Vec::new();
    let mut declared = false;
    let mut seen = [false; 3];
    while let Some((number, line)) = next_line(input)? {
        if line.is_empty() {
            continue;
        }
        if line.starts_with("DECL") {
            if declared || seen.iter().any(|&seen| seen) {
                return Err(Input::error_in_line("DECL must be the first block", number));
            }
            declared = true;
            system = TransitionSystem::new(parse_declarations(input)?);
        } else if let Some(block) = Block::by_keyword(&line) {
            if seen[block as usize] {
                return Err(Input::error_in_line("duplicate block", number));
            }
            seen[block as usize] = true;
            parse_clauses(input, block.formula(&mut system))?;
        } else if line.starts_with("--") {
            let text = &line[2..];
            if Correspondence::is_intended(text) {
                let pair = Correspondence::parse(text).ok_or_else(|| {
                    Input::error_in_line("unparsable correspondence", number)
                })?;
                simulation.push(pair);
            }
        } else if !OPTIONS.iter().any(|option| line.starts_with(option)) {
            return Err(Input::error_in_line("unknown line", number));
        }
    }
    system.simulation = simulation;
    Ok(system)
}

/// Read the next line without surrounding whitespace, together with its line number.
fn next_line(input: &mut Input) -> Result<Option<(usize, String)>> {
    let number = input.line();
    Ok(input
        .read_line()?
        .map(|line| (number, line.trim().to_string())))
}

/// Parse the body of a `DECL` block and return the number of state variables.
fn parse_declarations(input: &mut Input) -> Result<Variable> {
    let mut size: u32 = 0;
    while let Some((number, line)) = next_line(input)? {
        if line.is_empty() {
            break;
        }
        let mut words = line.split_whitespace();
        let kind = words.next().unwrap_or_default();
        if !KINDS.iter().any(|&known| known == kind) {
            return Err(Input::error_in_line("unknown variable kind", number));
        }
        let index = words.next().and_then(Input::parse_signed);
        if index != Some(i64::from(size) + 1) || words.next().is_some() {
            return Err(Input::error_in_line(
                "expected the next consecutive variable index",
                number,
            ));
        }
        if size == Literal::MAX_VARIABLE / 2 {
            return Err(Input::error_in_line(Input::OVERFLOW, number));
        }
        size += 1;
    }
    Ok(Variable(size))
}

/// Parse clause lines into the formula until the end of the block.
fn parse_clauses(input: &mut Input, formula: &mut Formula) -> Result<()> {
    while let Some((number, line)) = next_line(input)? {
        if line.is_empty() {
            break;
        }
        let clause = parse_clause(&line, formula)
            .map_err(|why| Input::error_in_line(why, number))?;
        formula.add_clause(clause);
    }
    Ok(())
}

/// Parse `( l:t, l:t, ... )`, shifting each literal by `t` timeframes.
fn parse_clause(line: &str, formula: &Formula) -> std::result::Result<Vec<Literal>, &'static str> {
    let size = i64::from(formula.variables.0);
    let inner = line
        .strip_prefix('(')
        .and_then(|line| line.strip_suffix(')'))
        .ok_or("expected parenthesized clause")?;
    let mut clause = Vec::new();
    for item in inner.split(',').map(str::trim).filter(|item| !item.is_empty()) {
        let mut parts = item.splitn(2, ':');
        let (literal, timeframe) = match (parts.next(), parts.next()) {
            (Some(literal), Some(timeframe)) => (
                Input::parse_signed(literal).ok_or(Input::NUMBER)?,
                Input::parse_signed(timeframe).ok_or(Input::NUMBER)?,
            ),
            _ => return Err("expected <literal>:<timeframe>"),
        };
        if literal == 0 || literal.abs() > size {
            return Err("literal exceeds the declared variables");
        }
        match timeframe {
            0 => (),
            1 if formula.has_next => (),
            _ => return Err("invalid timeframe"),
        }
        let shifted = literal + literal.signum() * timeframe * size;
        // At most twice the declared variables, which fits.
        clause.push(Literal::new(shifted as i32));
    }
    Ok(clause)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<TransitionSystem> {
        parse_cip(&mut Input::from_bytes(text.as_bytes()))
    }

    fn decoded(formula: &Formula) -> Vec<Vec<i32>> {
        formula
            .clauses
            .iter()
            .map(|clause| clause.iter().map(|literal| literal.decode()).collect())
            .collect()
    }

    #[test]
    fn complete_system() {
        let system = parse(
            "DECL
LATCH_VAR 1
INPUT_VAR 2

INIT
( -1:0 )

TRANS
( -1:0, 2:1 )
(1:0,-2:1)

TARGET
( 1:0 )

-- 2 = 1
USE_PROPERTY: 0
MAXDEPTH: 20
",
        )
        .unwrap();
        assert_eq!(system.size().unwrap(), Variable(2));
        assert_eq!(decoded(&system.initial), vec![vec![-1]]);
        assert_eq!(decoded(&system.transition), vec![vec![-1, 4], vec![1, -4]]);
        assert_eq!(decoded(&system.goal), vec![vec![1]]);
        assert_eq!(system.universal, Formula::new(Variable(2)));
        assert_eq!(
            system.simulation,
            vec![Correspondence {
                witness: 2,
                model: 1
            }]
        );
    }

    #[test]
    fn blocks_may_end_at_end_of_file() {
        let system = parse("DECL\nAND_VAR 1\n\nTARGET\n( -1:0 )").unwrap();
        assert_eq!(decoded(&system.goal), vec![vec![-1]]);
        assert!(system.initial.clauses.is_empty());
    }

    #[test]
    fn malformed() {
        let error = |text: &str| format!("{}", parse(text).unwrap_err());
        assert_eq!(
            error("DECL\nLATCH_VAR 2\n"),
            "expected the next consecutive variable index in line 2"
        );
        assert_eq!(error("DECL\nREG_VAR 1\n"), "unknown variable kind in line 2");
        assert_eq!(
            error("DECL\nLATCH_VAR 1\n\nINIT\n( 1:1 )\n"),
            "invalid timeframe in line 5"
        );
        assert_eq!(
            error("DECL\nLATCH_VAR 1\n\nTRANS\n( 2:0 )\n"),
            "literal exceeds the declared variables in line 5"
        );
        assert_eq!(
            error("DECL\nLATCH_VAR 1\n\nTRANS\n1:0\n"),
            "expected parenthesized clause in line 5"
        );
        assert_eq!(
            error("DECL\nLATCH_VAR 1\n\nINIT\n( x:0 )\n"),
            "expected number in line 5"
        );
        assert_eq!(
            error("DECL\nLATCH_VAR 1\n\nINIT\n( +1:0 )\n"),
            "expected number in line 5"
        );
        assert_eq!(
            error("DECL\nLATCH_VAR +1\n"),
            "expected the next consecutive variable index in line 2"
        );
        assert_eq!(
            error("INIT\n\nDECL\nLATCH_VAR 1\n"),
            "DECL must be the first block in line 3"
        );
        assert_eq!(error("DECL\n\nTARGET\n\nTARGET\n"), "duplicate block in line 5");
        assert_eq!(error("PROPERTY 1\n"), "unknown line in line 1");
        assert_eq!(error("-- 1 = 2 3\n"), "unparsable correspondence in line 1");
    }
}
