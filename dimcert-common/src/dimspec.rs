//! Dimspec parser
//!
//! A Dimspec file holds four DIMACS formulas, each introduced by a header
//! `i`, `u`, `g` or `t` followed by `cnf <variables> <clauses>`. The
//! transition formula declares twice the number of state variables.
//! Comments of the form `c <witness> = <model>` declare the state
//! correspondence of a witness.

use crate::{
    cnf::Formula,
    input::Input,
    literal::{Literal, Variable},
    system::{Correspondence, TransitionSystem},
};
use std::io::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Initial,
    Universal,
    Goal,
    Transition,
}

impl Section {
    fn by_tag(tag: &[u8]) -> Option<Section> {
        match tag {
            b"i" => Some(Section::Initial),
            b"u" => Some(Section::Universal),
            b"g" => Some(Section::Goal),
            b"t" => Some(Section::Transition),
            _ => None,
        }
    }
    fn formula(self, system: &mut TransitionSystem) -> &mut Formula {
        match self {
            Section::Initial => &mut system.initial,
            Section::Universal => &mut system.universal,
            Section::Goal => &mut system.goal,
            Section::Transition => &mut system.transition,
        }
    }
}

/// The section whose clauses are being parsed.
struct Current {
    section: Section,
    /// The clause count from the header
    declared: u64,
    /// The line of the header
    line: usize,
}

/// Parse a transition system in Dimspec format.
///
/// Sections that are not present are empty formulas over zero variables.
pub fn parse_dimspec(input: &mut Input) -> Result<TransitionSystem> {
    let mut system = TransitionSystem::new(Variable(0));
    let mut seen = [false; 4];
    let mut current: Option<Current> = None;
    loop {
        input.skip_any_whitespace();
        match input.peek() {
            None => break,
            Some(b'c') => parse_comment(input, &mut system.simulation)?,
            Some(c) if Input::is_digit_or_dash(c) => {
                let section = match &current {
                    Some(current) => current.section,
                    None => return Err(input.error("clause before the first section header")),
                };
                parse_clause(input, section.formula(&mut system))?;
            }
            Some(_) => {
                let line = input.line();
                let tag = input.parse_word();
                let section = Section::by_tag(&tag).ok_or_else(|| input.error(Input::SECTION))?;
                if seen[section as usize] {
                    return Err(input.error("duplicate section"));
                }
                seen[section as usize] = true;
                if let Some(previous) = current.take() {
                    finish_section(&mut system, previous)?;
                }
                let (formula, declared) = parse_header(input, section)?;
                *section.formula(&mut system) = formula;
                current = Some(Current {
                    section,
                    declared,
                    line,
                });
            }
        }
    }
    if let Some(previous) = current {
        finish_section(&mut system, previous)?;
    }
    Ok(system)
}

/// Parse a comment starting with "c", which may declare a correspondence.
///
/// Consumes a leading "c" and any characters until (including) the next newline.
fn parse_comment(input: &mut Input, simulation: &mut Vec<Correspondence>) -> Result<()> {
    let line = input.line();
    input.next();
    if let Some(text) = input.read_line()? {
        if Correspondence::is_intended(&text) {
            let pair = Correspondence::parse(&text)
                .ok_or_else(|| Input::error_in_line("unparsable correspondence", line))?;
            simulation.push(pair);
        }
    }
    Ok(())
}

/// Parse `cnf <variables> <clauses>` after a section tag.
fn parse_header(input: &mut Input, section: Section) -> Result<(Formula, u64)> {
    input.skip_some_whitespace()?;
    input.expect(b"cnf", Input::CNF)?;
    input.skip_some_whitespace()?;
    let variables = input.parse_dec64()?;
    input.skip_some_whitespace()?;
    let clauses = input.parse_dec64()?;
    input.skip_some_whitespace()?;
    if variables < 0 || clauses < 0 {
        return Err(input.error("negative count in header"));
    }
    if variables > i64::from(Literal::MAX_VARIABLE) {
        return Err(input.error(Input::OVERFLOW));
    }
    let formula = if section == Section::Transition {
        if variables % 2 != 0 {
            return Err(input.error("odd number of transition variables"));
        }
        Formula::with_next(Variable(variables as u32 / 2))
    } else {
        Formula::new(Variable(variables as u32))
    };
    Ok((formula, clauses as u64))
}

/// Parse a zero-terminated clause into the formula.
fn parse_clause(input: &mut Input, formula: &mut Formula) -> Result<()> {
    let span = i64::from(formula.span().0);
    let mut clause = Vec::new();
    loop {
        let value = input.parse_dec64()?;
        if value == 0 {
            input.skip_some_whitespace()?;
            break;
        }
        if value.abs() > span {
            return Err(input.error("literal exceeds the declared variables"));
        }
        // In span, so it fits.
        clause.push(Literal::new(value as i32));
        input.skip_some_whitespace()?;
        if input.peek().is_none() {
            return Err(input.error(Input::EOF));
        }
    }
    formula.add_clause(clause);
    Ok(())
}

fn finish_section(system: &mut TransitionSystem, current: Current) -> Result<()> {
    let actual = current.section.formula(system).number_of_clauses() as u64;
    if actual != current.declared {
        return Err(Input::error_in_line(
            &format!(
                "section declares {} clauses but has {}",
                current.declared, actual
            ),
            current.line,
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<TransitionSystem> {
        parse_dimspec(&mut Input::from_bytes(text.as_bytes()))
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
            "c generated
c 1 = 2
i cnf 2 1
-1 0
u cnf 2 0
g cnf 2 2
1 0
2
 0
t cnf 4 2
-1 4 0 1 -3 0
",
        )
        .unwrap();
        assert_eq!(
            system.simulation,
            vec![Correspondence {
                witness: 1,
                model: 2
            }]
        );
        assert_eq!(system.size().unwrap(), Variable(2));
        assert_eq!(decoded(&system.initial), vec![vec![-1]]);
        assert!(system.universal.clauses.is_empty());
        assert_eq!(decoded(&system.goal), vec![vec![1], vec![2]]);
        assert_eq!(decoded(&system.transition), vec![vec![-1, 4], vec![1, -3]]);
        assert_eq!(system.transition.span(), Variable(4));
    }

    #[test]
    fn printed_system_parses_back() {
        let text = "c 2 = 1\ni cnf 2 1\n-1 2 0\nu cnf 2 0\ng cnf 2 1\n2 0\nt cnf 4 1\n-3 0\n";
        let system = parse(text).unwrap();
        assert_eq!(format!("{}", system), text);
    }

    #[test]
    fn missing_sections_are_empty() {
        let system = parse("t cnf 0 0\n").unwrap();
        assert_eq!(system, TransitionSystem::new(Variable(0)));
        let system = parse("i cnf 3 0\n").unwrap();
        assert_eq!(system.goal, Formula::new(Variable(0)));
        assert!(system.size().is_err());
    }

    #[test]
    fn malformed() {
        let error = |text: &str| format!("{}", parse(text).unwrap_err());
        assert_eq!(
            error("t cnf 3 0\n"),
            "odd number of transition variables at line 2 column 1"
        );
        assert_eq!(
            error("i cnf 2 1\n1 3 0\n"),
            "literal exceeds the declared variables at line 2 column 4"
        );
        assert_eq!(error("i cnf 2 2\n1 0\n"), "section declares 2 clauses but has 1 in line 1");
        assert_eq!(
            error("i cnf 2 1\n1 0\ng cnf 2 0\n2 0\nt cnf 0 0\n"),
            "section declares 0 clauses but has 1 in line 3"
        );
        assert_eq!(error("c 1 = x\n"), "unparsable correspondence in line 1");
        assert_eq!(error("1 0\n"), "clause before the first section header at line 1 column 1");
        assert_eq!(error("i cnf 2 1\n1 2"), "premature end of file at line 2 column 4");
        assert_eq!(error("x cnf 1 0\n"), "expected section header at line 1 column 2");
        assert_eq!(error("i dnf 1 0\n"), "expected \"cnf\" at line 1 column 3");
        assert_eq!(
            error("i cnf 1 0\ni cnf 1 0\n"),
            "duplicate section at line 2 column 2"
        );
    }
}
