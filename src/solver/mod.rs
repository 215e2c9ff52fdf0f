//! Solver capability abstraction and solve orchestration.
//!
//! The orchestrator drives an injected [`SolverCapability`] through a fixed
//! protocol and folds whatever comes back into one uniform [`ResultRecord`].
//! Backends differ in status vocabulary and in what they expose (some report
//! dual and slack values, some do not); the record absorbs those differences
//! instead of leaking them to callers.
//!
//! # Protocol
//!
//! 1. Re-check that the model carries an objective and constraints. The
//!    builder guarantees both, but a model may have been assembled elsewhere.
//! 2. Register every model variable with its resolved bounds, keeping the
//!    backend handles keyed by position.
//! 3. Submit the objective, then each constraint in model order, using the
//!    constraint id as the backend's handle.
//! 4. Run the backend's solve step, timing that single call.
//! 5. Map the native status token to the canonical vocabulary; unknown
//!    tokens degrade to [`SolveStatus::NotSolved`].
//! 6. On an optimal status, read back variable values, then tolerantly probe
//!    dual and slack values per constraint. A backend without either leaves
//!    the corresponding mapping empty.
//!
//! [`solve`] is the single error-containment boundary of the pipeline: any
//! failure the capability raises at any step becomes a record with
//! [`SolveStatus::Error`] rather than a propagated error. Backend *selection*
//! is different: an unknown backend name is a setup mistake and
//! [`SolverBackend::from_name`] fails before any capability method runs.

use std::{fmt, time::Instant};

use anyhow::{Result, anyhow, ensure};
use thiserror::Error;

use crate::model::{LPModel, Relation, Sense, Symbol};

#[cfg(feature = "coin_cbc")]
pub mod coin_cbc;

/// Handle to a decision variable registered with a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VariableHandle(pub usize);

/// Abstract solving capability the orchestrator depends on.
///
/// Implementations are exclusively owned for the duration of one [`solve`]
/// call and retain no obligation to be reusable afterwards.
pub trait SolverCapability {
    fn register_variable(&mut self, name: &str, lower: f64, upper: f64) -> Result<VariableHandle>;

    fn set_objective(&mut self, sense: Sense, terms: &[(VariableHandle, f64)]) -> Result<()>;

    fn add_constraint(
        &mut self,
        id: &str,
        terms: &[(VariableHandle, f64)],
        relation: Relation,
        rhs: f64,
    ) -> Result<()>;

    /// Run the backend's own solve step, returning its native status token.
    fn run(&mut self) -> Result<String>;

    fn value_of(&self, handle: VariableHandle) -> Result<f64>;

    /// Shadow price of a constraint, `None` when the backend has none to
    /// offer.
    fn dual_of(&self, id: &str) -> Option<f64>;

    /// Slack of a constraint at the reported solution, `None` when
    /// unsupported.
    fn slack_of(&self, id: &str) -> Option<f64>;
}

/// Canonical solve status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    /// The backend stopped without proving anything; also the mapping for
    /// status tokens this crate does not recognize.
    NotSolved,
    /// The capability failed somewhere in the protocol; see
    /// [`ResultRecord::message`].
    Error,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolveStatus::Optimal => write!(f, "optimal"),
            SolveStatus::Infeasible => write!(f, "infeasible"),
            SolveStatus::Unbounded => write!(f, "unbounded"),
            SolveStatus::NotSolved => write!(f, "not solved"),
            SolveStatus::Error => write!(f, "error"),
        }
    }
}

/// Uniform record of one solve call. Immutable once produced; it carries no
/// back-reference to the model, callers correlate by holding both.
#[derive(Debug, Clone)]
pub struct ResultRecord {
    pub status: SolveStatus,
    pub objective_value: Option<f64>,
    /// Model variable order.
    pub variable_values: Vec<(Symbol, f64)>,
    /// Model constraint order; empty when the backend offers no duals.
    pub dual_values: Vec<(String, f64)>,
    /// Model constraint order; empty when the backend offers no slacks.
    pub slack_values: Vec<(String, f64)>,
    /// Wall-clock seconds around the backend's solve step only.
    pub solve_time: f64,
    pub message: Option<String>,
}

impl ResultRecord {
    fn empty(status: SolveStatus, solve_time: f64) -> Self {
        Self {
            status,
            objective_value: None,
            variable_values: Vec::new(),
            dual_values: Vec::new(),
            slack_values: Vec::new(),
            solve_time,
            message: None,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            message: Some(message),
            ..Self::empty(SolveStatus::Error, 0.0)
        }
    }
}

/// Unknown or unsupported solver backend name.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("unknown solver backend '{0}' (valid options: default, cbc)")]
    UnknownBackend(String),
    #[error("solver backend requested but the '{0}' feature is not enabled")]
    BackendNotEnabled(&'static str),
}

/// Available solver backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolverBackend {
    #[cfg(feature = "coin_cbc")]
    /// COIN-OR CBC open-source solver
    CoinCbc,
}

impl SolverBackend {
    /// Resolve a backend by name. This runs before any capability method and
    /// its failure propagates instead of being folded into a result record.
    pub fn from_name(name: &str) -> Result<Self, ConfigurationError> {
        match name.to_lowercase().as_str() {
            "default" | "cbc" | "coin_cbc" | "coin-cbc" => {
                #[cfg(feature = "coin_cbc")]
                return Ok(SolverBackend::CoinCbc);
                #[cfg(not(feature = "coin_cbc"))]
                return Err(ConfigurationError::BackendNotEnabled("coin_cbc"));
            }
            _ => Err(ConfigurationError::UnknownBackend(name.to_string())),
        }
    }

    /// Instantiate a fresh capability for one solve call.
    pub fn create(self) -> Box<dyn SolverCapability> {
        match self {
            #[cfg(feature = "coin_cbc")]
            SolverBackend::CoinCbc => Box::new(coin_cbc::CbcCapability::new()),
        }
    }
}

/// Map a backend's native status token onto the canonical vocabulary.
fn map_native_status(token: &str) -> SolveStatus {
    match token.trim().to_lowercase().as_str() {
        "optimal" => SolveStatus::Optimal,
        "infeasible" | "proven infeasible" => SolveStatus::Infeasible,
        "unbounded" | "proven unbounded" => SolveStatus::Unbounded,
        _ => SolveStatus::NotSolved,
    }
}

/// Drive `capability` through the solve protocol for `model`.
///
/// Never fails outward: every error raised by the capability is captured
/// and returned as a record with [`SolveStatus::Error`] and a diagnostic
/// message.
pub fn solve(model: &LPModel, capability: &mut dyn SolverCapability) -> ResultRecord {
    match run_protocol(model, capability) {
        Ok(record) => record,
        Err(cause) => ResultRecord::failed(cause.to_string()),
    }
}

fn run_protocol(model: &LPModel, capability: &mut dyn SolverCapability) -> Result<ResultRecord> {
    ensure!(
        !model.objective.coefficients.is_empty(),
        "model has an empty objective"
    );
    ensure!(!model.constraints.is_empty(), "model has no constraints");

    let mut handles = Vec::with_capacity(model.variables.len());
    for (variable, bounds) in model.variables.iter().zip(&model.bounds) {
        handles.push(capability.register_variable(variable, bounds.lower, bounds.upper)?);
    }
    let handle_of = |variable: &Symbol| -> Result<VariableHandle> {
        model
            .variables
            .iter()
            .position(|v| v == variable)
            .map(|idx| handles[idx])
            .ok_or_else(|| anyhow!("variable {} is not registered", variable))
    };

    let objective_terms = model
        .objective
        .coefficients
        .iter()
        .map(|(variable, coefficient)| Ok((handle_of(variable)?, *coefficient)))
        .collect::<Result<Vec<_>>>()?;
    capability.set_objective(model.objective.sense, &objective_terms)?;

    for constraint in &model.constraints {
        let terms = constraint
            .coefficients
            .iter()
            .map(|(variable, coefficient)| Ok((handle_of(variable)?, *coefficient)))
            .collect::<Result<Vec<_>>>()?;
        capability.add_constraint(&constraint.id, &terms, constraint.relation, constraint.rhs)?;
    }

    // Parse and build time never count towards solve_time.
    let solve_started = Instant::now();
    let native_status = capability.run()?;
    let solve_time = solve_started.elapsed().as_secs_f64();

    let status = map_native_status(&native_status);
    let mut record = ResultRecord::empty(status, solve_time);

    if status == SolveStatus::Optimal {
        let mut variable_values = Vec::with_capacity(model.variables.len());
        for (variable, handle) in model.variables.iter().zip(&handles) {
            variable_values.push((variable.clone(), capability.value_of(*handle)?));
        }

        let value_of = |variable: &Symbol| -> f64 {
            variable_values
                .iter()
                .find(|(v, _)| v == variable)
                .map(|(_, value)| *value)
                .unwrap_or(0.0)
        };
        record.objective_value = Some(
            model
                .objective
                .coefficients
                .iter()
                .map(|(variable, coefficient)| coefficient * value_of(variable))
                .sum(),
        );
        record.variable_values = variable_values;

        for constraint in &model.constraints {
            if let Some(dual) = capability.dual_of(&constraint.id) {
                record.dual_values.push((constraint.id.clone(), dual));
            }
            if let Some(slack) = capability.slack_of(&constraint.id) {
                record.slack_values.push((constraint.id.clone(), slack));
            }
        }
    }

    Ok(record)
}
