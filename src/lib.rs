//! Linear programs from plain text.
//!
//! This library turns a free-text LP description (an objective clause plus
//! inequality/equality constraints) into a canonical, typed optimization
//! model, hands that model to a pluggable solver backend, and normalizes the
//! heterogeneous results backends return into one uniform record.
//!
//! # Pipeline
//!
//! ```text
//! raw text → parser::parse → model::build → LPModel → solver::solve → ResultRecord
//! ```
//!
//! # Usage Example
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! use lptext::{model_from_text, solver::SolverBackend};
//!
//! let model = model_from_text("Maximize: x1 + 2x2\nx1 + x2 <= 5\n3x1 + 2x2 <= 12")?;
//!
//! let backend = SolverBackend::from_name("default")?;
//! let mut capability = backend.create();
//! let record = lptext::solver::solve(&model, capability.as_mut());
//! println!("{}: {:?}", record.status, record.objective_value);
//! # Ok(())
//! # }
//! ```
//!
//! # Modules
//!
//! - **[`parser`]**: normalization and clause extraction from raw text
//! - **[`model`]**: the canonical data model and the validating builder
//! - **[`solver`]**: the solver capability abstraction, backend selection,
//!   and the solve orchestrator
//! - **[`export`]**: CSV and report rendering of models and results
//! - **[`cli`]**: the `check` and `solve` command entry points
//!
//! # Error design
//!
//! [`parser::ParseError`] and [`model::ValidationError`] propagate to the
//! caller: they occur before any model exists. Backend selection failures
//! ([`solver::ConfigurationError`]) propagate before the solve protocol
//! begins. Everything a backend raises *during* the protocol is contained by
//! [`solver::solve`] and surfaced inside the [`solver::ResultRecord`].

use clap::Parser;

pub mod cli;
pub mod export;
pub mod model;
pub mod parser;
pub mod solver;

pub use cli::{CheckArgs, SolveArgs, check_main, solve_main};
pub use model::{
    Bounds, Constraint, LPModel, Objective, Relation, Sense, Symbol, Term, ValidationError, build,
};
pub use parser::{ParseError, normalize, parse};
pub use solver::{
    ConfigurationError, ResultRecord, SolveStatus, SolverBackend, SolverCapability, VariableHandle,
    solve,
};

/// Parse problem text and build the canonical model in one step.
pub fn model_from_text(text: &str) -> anyhow::Result<LPModel> {
    let (objective, constraints) = parser::parse(text)?;
    Ok(model::build(objective, constraints, None)?)
}

/// Command-line interface for the lptext tools.
#[derive(Debug, Parser)]
#[clap(
    name = "lptext",
    about = "Parse and solve linear programs written in plain text"
)]
pub enum CLIArguments {
    /// Parse and validate a problem file, printing a model summary.
    Check(CheckArgs),
    /// Parse, build, and solve a problem file with the selected backend.
    Solve(SolveArgs),
}
