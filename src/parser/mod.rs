//! Free-text LP parsing: normalization and clause extraction.
//!
//! The accepted grammar is a fixed algebraic notation, one clause per line:
//!
//! ```text
//! Maximize: 2x1 + 3x2
//! x1 + x2 <= 10
//! 3x1 - x2 >= 0
//! x1 + 5x2 = 6
//! ```
//!
//! The objective keyword is matched case-insensitively. A term is
//! `[sign][numeral]identifier` where the numeral is an optional non-negative
//! decimal and the identifier starts with a letter followed by letters,
//! digits or underscores. A bare sign resolves to a coefficient of ±1.
//!
//! Objective and constraint extraction run as independent regex passes over
//! the same normalized text; a constraint clause is only recognized outside
//! the span claimed by the objective match.

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

use crate::model::{ConstraintClause, ObjectiveClause, Sense, Symbol, Term};

/// Malformed or absent objective/constraint text.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("input is empty")]
    EmptyInput,
    #[error("objective function not found or incorrectly formatted")]
    NoObjective,
    #[error("no valid constraints found")]
    NoConstraints,
}

/// Canonicalize raw problem text.
///
/// Rewrites the two-character relation tokens `<=` and `>=` to the single
/// canonical symbols and strips spaces and tabs. Line breaks survive: they
/// separate clauses, and removing them would fuse one clause's trailing
/// terms with the next clause's leading terms. Case is preserved for the
/// downstream keyword match.
pub fn normalize(text: &str) -> Result<String, ParseError> {
    if text.trim().is_empty() {
        return Err(ParseError::EmptyInput);
    }
    Ok(text
        .replace("<=", "≤")
        .replace(">=", "≥")
        .replace([' ', '\t'], ""))
}

lazy_static! {
    static ref OBJECTIVE_RE: Regex = Regex::new(
        r"(?i)(maximize|minimize):?([+-]?\d*\.?\d*[A-Za-z]\w*(?:[+-]\d*\.?\d*[A-Za-z]\w*)*)"
    )
    .unwrap();
    static ref CONSTRAINT_RE: Regex = Regex::new(
        r"([+-]?\d*\.?\d*[A-Za-z]\w*(?:[+-]\d*\.?\d*[A-Za-z]\w*)*)([≤≥=])([+-]?\d+\.?\d*)"
    )
    .unwrap();
    static ref TERM_RE: Regex = Regex::new(r"([+-]?\d*\.?\d*)([A-Za-z]\w*)").unwrap();
}

/// Split a term sequence into raw terms. A missing numeral resolves to +1
/// under sign `ε` or `+` and to -1 under sign `-`.
fn parse_terms(sequence: &str) -> Vec<Term> {
    TERM_RE
        .captures_iter(sequence)
        .map(|captures| {
            let numeral = &captures[1];
            let coefficient = match numeral {
                "" | "+" => 1.0,
                "-" => -1.0,
                _ => numeral
                    .parse()
                    .unwrap_or(if numeral.starts_with('-') { -1.0 } else { 1.0 }),
            };
            Term {
                variable: Symbol::from(&captures[2]),
                coefficient,
            }
        })
        .collect()
}

/// Extract the objective clause and every constraint clause from raw text.
///
/// Constraint ids are not assigned here; that happens in
/// [`crate::model::build`], which also folds duplicate variable mentions.
pub fn parse(text: &str) -> Result<(ObjectiveClause, Vec<ConstraintClause>), ParseError> {
    let text = normalize(text)?;

    let captures = OBJECTIVE_RE.captures(&text).ok_or(ParseError::NoObjective)?;
    let objective_span = captures.get(0).unwrap().range();
    let sense = if captures[1].eq_ignore_ascii_case("maximize") {
        Sense::Maximize
    } else {
        Sense::Minimize
    };
    let objective = ObjectiveClause {
        sense,
        terms: parse_terms(&captures[2]),
    };

    let mut constraints = Vec::new();
    for captures in CONSTRAINT_RE.captures_iter(&text) {
        let span = captures.get(0).unwrap().range();
        if span.start < objective_span.end && objective_span.start < span.end {
            // Claimed by the objective match.
            continue;
        }
        let relation = captures[2].chars().next().unwrap();
        let rhs = captures[3].parse().map_err(|_| ParseError::NoConstraints)?;
        constraints.push(ConstraintClause {
            terms: parse_terms(&captures[1]),
            relation,
            rhs,
        });
    }
    if constraints.is_empty() {
        return Err(ParseError::NoConstraints);
    }

    Ok((objective, constraints))
}
