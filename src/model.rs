//! Canonical LP model types and the model builder.
//!
//! This module is the single schema both pipeline stages target: the parser
//! emits the [`Sense`], [`Term`] and clause types defined here, and the solve
//! orchestrator consumes the same [`LPModel`], so the two stages cannot drift
//! apart on field vocabulary.
//!
//! An [`LPModel`] is built once per parse call and never mutated afterwards;
//! changing a bound or coefficient means building a new model.

use std::{collections::HashMap, fmt};

use string_cache::DefaultAtom;
use thiserror::Error;

/// Interned identifier for decision variables and keywords.
pub type Symbol = DefaultAtom;

/// Optimization direction of the objective function.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    Maximize,
    Minimize,
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sense::Maximize => write!(f, "maximize"),
            Sense::Minimize => write!(f, "minimize"),
        }
    }
}

/// Canonical constraint relation. No free-text relation survives into the
/// model: the parser carries the raw relation character and
/// [`build`] converts it, rejecting anything non-canonical.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    /// Less than or equal to (≤)
    LessEqual,
    /// Greater than or equal to (≥)
    GreaterEqual,
    /// Equal to (=)
    Equal,
}

impl Relation {
    /// Convert the single-character token produced by the normalizer.
    pub fn from_token(token: char) -> Option<Self> {
        match token {
            '≤' => Some(Relation::LessEqual),
            '≥' => Some(Relation::GreaterEqual),
            '=' => Some(Relation::Equal),
            _ => None,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::LessEqual => write!(f, "≤"),
            Relation::GreaterEqual => write!(f, "≥"),
            Relation::Equal => write!(f, "="),
        }
    }
}

/// One parsed `coefficient * variable` term.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    pub variable: Symbol,
    pub coefficient: f64,
}

/// Objective clause as extracted from text: sense plus raw term list.
///
/// Repeated mentions of a variable are kept as separate terms here; they
/// accumulate when the clause is folded into a model.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectiveClause {
    pub sense: Sense,
    pub terms: Vec<Term>,
}

/// Constraint clause as extracted from text. The relation is still the raw
/// single-character token at this point.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintClause {
    pub terms: Vec<Term>,
    pub relation: char,
    pub rhs: f64,
}

/// Inclusive variable bounds; `upper` may be `f64::INFINITY`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub lower: f64,
    pub upper: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            lower: 0.0,
            upper: f64::INFINITY,
        }
    }
}

/// Objective function with insertion-ordered coefficients.
///
/// Coefficients use `Vec` storage rather than a `HashMap` so the first-seen
/// text order is preserved for reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct Objective {
    pub sense: Sense,
    pub coefficients: Vec<(Symbol, f64)>,
}

/// A single canonical constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    /// Unique within a model; assigned as `c1, c2, …` in parse order.
    pub id: String,
    pub coefficients: Vec<(Symbol, f64)>,
    pub relation: Relation,
    pub rhs: f64,
}

/// Validated LP model, immutable after [`build`].
///
/// Every variable mentioned by the objective or any constraint appears
/// exactly once in `variables`, in first-seen order; `bounds` is aligned
/// with `variables` index-for-index.
#[derive(Debug, Clone, PartialEq)]
pub struct LPModel {
    pub objective: Objective,
    pub constraints: Vec<Constraint>,
    pub variables: Vec<Symbol>,
    pub bounds: Vec<Bounds>,
}

impl LPModel {
    /// Resolved bounds of a variable, if it belongs to this model.
    pub fn bounds_of(&self, variable: &Symbol) -> Option<Bounds> {
        self.variables
            .iter()
            .position(|v| v == variable)
            .map(|idx| self.bounds[idx])
    }
}

/// Structurally invalid model.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("model has no {0}")]
    EmptyModel(&'static str),
    #[error("constraint {id} uses unknown relation '{token}'")]
    BadRelation { id: String, token: char },
    #[error("constraint {0} has a non-finite right-hand side")]
    NonFiniteRhs(String),
    #[error("variable {0} has lower bound greater than upper bound")]
    BadBounds(Symbol),
}

/// Fold a raw term list into insertion-ordered coefficients. Duplicate
/// mentions of a variable within one clause sum rather than overwrite.
fn accumulate(terms: &[Term]) -> Vec<(Symbol, f64)> {
    let mut coefficients: Vec<(Symbol, f64)> = Vec::new();
    for term in terms {
        match coefficients.iter_mut().find(|(v, _)| *v == term.variable) {
            Some((_, c)) => *c += term.coefficient,
            None => coefficients.push((term.variable.clone(), term.coefficient)),
        }
    }
    coefficients
}

fn note_variables(variables: &mut Vec<Symbol>, coefficients: &[(Symbol, f64)]) {
    for (variable, _) in coefficients {
        if !variables.contains(variable) {
            variables.push(variable.clone());
        }
    }
}

/// Assemble parsed clauses into a validated [`LPModel`].
///
/// Variables are collected in first-seen order across the objective and then
/// each constraint in listed order. Unspecified bounds default to `(0, +∞)`;
/// entries in `bounds_override` take precedence.
pub fn build(
    objective: ObjectiveClause,
    constraints: Vec<ConstraintClause>,
    bounds_override: Option<&HashMap<Symbol, Bounds>>,
) -> Result<LPModel, ValidationError> {
    let objective_coefficients = accumulate(&objective.terms);

    let mut variables = Vec::new();
    note_variables(&mut variables, &objective_coefficients);

    let mut built = Vec::with_capacity(constraints.len());
    for (idx, clause) in constraints.into_iter().enumerate() {
        let id = format!("c{}", idx + 1);
        let relation = Relation::from_token(clause.relation).ok_or(ValidationError::BadRelation {
            id: id.clone(),
            token: clause.relation,
        })?;
        if !clause.rhs.is_finite() {
            return Err(ValidationError::NonFiniteRhs(id));
        }
        let coefficients = accumulate(&clause.terms);
        note_variables(&mut variables, &coefficients);
        built.push(Constraint {
            id,
            coefficients,
            relation,
            rhs: clause.rhs,
        });
    }

    if variables.is_empty() {
        return Err(ValidationError::EmptyModel("variables"));
    }
    if built.is_empty() {
        return Err(ValidationError::EmptyModel("constraints"));
    }

    let mut bounds = Vec::with_capacity(variables.len());
    for variable in &variables {
        let b = bounds_override
            .and_then(|overrides| overrides.get(variable).copied())
            .unwrap_or_default();
        if b.lower.is_finite() && b.upper.is_finite() && b.lower > b.upper {
            return Err(ValidationError::BadBounds(variable.clone()));
        }
        bounds.push(b);
    }

    Ok(LPModel {
        objective: Objective {
            sense: objective.sense,
            coefficients: objective_coefficients,
        },
        constraints: built,
        variables,
        bounds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn term(name: &str, coefficient: f64) -> Term {
        Term {
            variable: Symbol::from(name),
            coefficient,
        }
    }

    fn objective(terms: Vec<Term>) -> ObjectiveClause {
        ObjectiveClause {
            sense: Sense::Maximize,
            terms,
        }
    }

    fn le(terms: Vec<Term>, rhs: f64) -> ConstraintClause {
        ConstraintClause {
            terms,
            relation: '≤',
            rhs,
        }
    }

    #[test]
    fn variables_collected_in_first_seen_order() {
        let model = build(
            objective(vec![term("x2", 1.0), term("x1", 2.0)]),
            vec![le(vec![term("x1", 1.0), term("x3", 1.0)], 4.0)],
            None,
        )
        .unwrap();

        let names: Vec<&str> = model.variables.iter().map(|v| v.as_ref()).collect();
        assert_eq!(names, vec!["x2", "x1", "x3"]);
        assert_eq!(model.bounds.len(), model.variables.len());
        assert_eq!(model.bounds[0], Bounds::default());
    }

    #[test]
    fn constraint_ids_follow_parse_order() {
        let model = build(
            objective(vec![term("x1", 1.0)]),
            vec![
                le(vec![term("x1", 1.0)], 4.0),
                le(vec![term("x1", 2.0)], 8.0),
            ],
            None,
        )
        .unwrap();

        let ids: Vec<&str> = model.constraints.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["c1", "c2"]);
    }

    #[test]
    fn duplicate_mentions_accumulate() {
        let model = build(
            objective(vec![term("x1", 1.0)]),
            vec![le(vec![term("x1", 1.0), term("x1", 1.0)], 4.0)],
            None,
        )
        .unwrap();

        assert_eq!(model.constraints[0].coefficients.len(), 1);
        assert_eq!(model.constraints[0].coefficients[0].1, 2.0);
    }

    #[test]
    fn zero_constraints_is_an_empty_model() {
        let err = build(objective(vec![term("x1", 1.0)]), vec![], None).unwrap_err();
        assert_eq!(err, ValidationError::EmptyModel("constraints"));
    }

    #[test]
    fn zero_variables_is_an_empty_model() {
        let err = build(objective(vec![]), vec![le(vec![], 1.0)], None).unwrap_err();
        assert_eq!(err, ValidationError::EmptyModel("variables"));
    }

    #[test]
    fn free_text_relation_is_rejected() {
        let clause = ConstraintClause {
            terms: vec![term("x1", 1.0)],
            relation: '<',
            rhs: 4.0,
        };
        let err = build(objective(vec![term("x1", 1.0)]), vec![clause], None).unwrap_err();
        assert!(matches!(err, ValidationError::BadRelation { token: '<', .. }));
    }

    #[test]
    fn non_finite_rhs_is_rejected() {
        let clause = ConstraintClause {
            terms: vec![term("x1", 1.0)],
            relation: '≤',
            rhs: f64::NAN,
        };
        let err = build(objective(vec![term("x1", 1.0)]), vec![clause], None).unwrap_err();
        assert_eq!(err, ValidationError::NonFiniteRhs("c1".to_string()));
    }

    #[test]
    fn bounds_override_takes_precedence() {
        let mut overrides = HashMap::new();
        overrides.insert(
            Symbol::from("x1"),
            Bounds {
                lower: 1.0,
                upper: 3.0,
            },
        );
        let model = build(
            objective(vec![term("x1", 1.0), term("x2", 1.0)]),
            vec![le(vec![term("x1", 1.0)], 4.0)],
            Some(&overrides),
        )
        .unwrap();

        assert_eq!(
            model.bounds_of(&Symbol::from("x1")),
            Some(Bounds {
                lower: 1.0,
                upper: 3.0
            })
        );
        assert_eq!(model.bounds_of(&Symbol::from("x2")), Some(Bounds::default()));
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let mut overrides = HashMap::new();
        overrides.insert(
            Symbol::from("x1"),
            Bounds {
                lower: 5.0,
                upper: 2.0,
            },
        );
        let err = build(
            objective(vec![term("x1", 1.0)]),
            vec![le(vec![term("x1", 1.0)], 4.0)],
            Some(&overrides),
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::BadBounds(Symbol::from("x1")));
    }
}
