//! COIN-OR CBC backend.

use anyhow::{Result, anyhow};
use coin_cbc::{Col, Model, Sense as CbcSense, Solution};
use gag::Gag;

use super::{SolverCapability, VariableHandle};
use crate::model::{Relation, Sense};

/// Round a floating-point number to a number of significant digits.
/// This is a workaround to mask floating point errors in CBC.
fn round_to_sig_digits(value: f64, digits: u32) -> f64 {
    if value == 0.0 {
        return 0.0;
    }

    let magnitude = value.abs().log10().floor() as i32;
    let scale = 10_f64.powi(digits as i32 - magnitude - 1);
    (value * scale).round() / scale
}

struct Row {
    id: String,
    terms: Vec<(usize, f64)>,
    rhs: f64,
}

/// [`SolverCapability`] over a [`coin_cbc::Model`].
///
/// The binding exposes no row duals, so `dual_of` always answers `None`;
/// slacks are recomputed from the stored rows and the solution point.
pub struct CbcCapability {
    model: Model,
    columns: Vec<Col>,
    rows: Vec<Row>,
    solution: Option<Solution>,
}

impl CbcCapability {
    pub fn new() -> Self {
        Self {
            model: Model::default(),
            columns: Vec::new(),
            rows: Vec::new(),
            solution: None,
        }
    }

    fn column(&self, handle: VariableHandle) -> Result<Col> {
        self.columns
            .get(handle.0)
            .copied()
            .ok_or_else(|| anyhow!("unregistered variable handle {}", handle.0))
    }
}

impl Default for CbcCapability {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverCapability for CbcCapability {
    fn register_variable(&mut self, _name: &str, lower: f64, upper: f64) -> Result<VariableHandle> {
        let col = self.model.add_col();
        self.model.set_col_lower(col, lower);
        if upper.is_finite() {
            self.model.set_col_upper(col, upper);
        }
        self.columns.push(col);
        Ok(VariableHandle(self.columns.len() - 1))
    }

    fn set_objective(&mut self, sense: Sense, terms: &[(VariableHandle, f64)]) -> Result<()> {
        for (handle, coefficient) in terms {
            let col = self.column(*handle)?;
            self.model.set_obj_coeff(col, *coefficient);
        }
        self.model.set_obj_sense(match sense {
            Sense::Maximize => CbcSense::Maximize,
            Sense::Minimize => CbcSense::Minimize,
        });
        Ok(())
    }

    fn add_constraint(
        &mut self,
        id: &str,
        terms: &[(VariableHandle, f64)],
        relation: Relation,
        rhs: f64,
    ) -> Result<()> {
        let row = self.model.add_row();
        let mut stored = Vec::with_capacity(terms.len());
        for (handle, coefficient) in terms {
            let col = self.column(*handle)?;
            self.model.set_weight(row, col, *coefficient);
            stored.push((handle.0, *coefficient));
        }
        match relation {
            Relation::LessEqual => self.model.set_row_upper(row, rhs),
            Relation::GreaterEqual => self.model.set_row_lower(row, rhs),
            Relation::Equal => self.model.set_row_equal(row, rhs),
        }
        self.rows.push(Row {
            id: id.to_string(),
            terms: stored,
            rhs,
        });
        Ok(())
    }

    fn run(&mut self) -> Result<String> {
        // CBC prints its banner and iteration log to stdout; keep that out
        // of our reports.
        let _gag = Gag::stdout().ok();
        let solution = self.model.solve();
        let raw = solution.raw();
        let token = if raw.is_proven_optimal() {
            "optimal"
        } else if raw.is_proven_infeasible() {
            "infeasible"
        } else {
            "stopped"
        };
        self.solution = Some(solution);
        Ok(token.to_string())
    }

    fn value_of(&self, handle: VariableHandle) -> Result<f64> {
        let solution = self
            .solution
            .as_ref()
            .ok_or_else(|| anyhow!("no solution available before run"))?;
        let col = self.column(handle)?;
        Ok(round_to_sig_digits(solution.col(col), 8))
    }

    fn dual_of(&self, _id: &str) -> Option<f64> {
        None
    }

    fn slack_of(&self, id: &str) -> Option<f64> {
        let solution = self.solution.as_ref()?;
        let row = self.rows.iter().find(|row| row.id == id)?;
        let lhs: f64 = row
            .terms
            .iter()
            .map(|(idx, coefficient)| coefficient * solution.col(self.columns[*idx]))
            .sum();
        Some(round_to_sig_digits(row.rhs - lhs, 8))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounding_masks_solver_noise() {
        assert_eq!(round_to_sig_digits(0.0, 8), 0.0);
        assert_eq!(round_to_sig_digits(4.999999999, 8), 5.0);
        assert_eq!(round_to_sig_digits(-1.0000000001, 8), -1.0);
    }
}
