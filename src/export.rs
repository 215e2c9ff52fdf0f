//! Model and result reporting: CSV rows and human-readable tables.
//!
//! These writers consume the canonical model and the result record
//! read-only; nothing here feeds back into the pipeline.

use std::io::{self, Write};

use itertools::Itertools;
use ordered_float::OrderedFloat;
use prettytable::{Table, row};

use crate::model::{Constraint, LPModel};
use crate::solver::ResultRecord;

fn lookup(pairs: &[(String, f64)], id: &str) -> Option<f64> {
    pairs
        .iter()
        .find(|(key, _)| key == id)
        .map(|(_, value)| *value)
}

fn fmt_opt(value: Option<f64>) -> String {
    value.map(|v| format!("{:.6}", v)).unwrap_or_default()
}

/// Render a constraint's left-hand side as `2x1 + 3x2 - x3`.
fn lhs_text(constraint: &Constraint) -> String {
    constraint
        .coefficients
        .iter()
        .enumerate()
        .map(|(idx, (variable, coefficient))| {
            let sign = if *coefficient < 0.0 {
                "- "
            } else if idx > 0 {
                "+ "
            } else {
                ""
            };
            let magnitude = coefficient.abs();
            if (magnitude - 1.0).abs() < f64::EPSILON {
                format!("{sign}{variable}")
            } else {
                format!("{sign}{magnitude}{variable}")
            }
        })
        .join(" ")
}

/// Write the solve result as CSV, one row per variable and per constraint.
/// Dual and slack columns are left blank when the backend offered none.
pub fn write_csv(model: &LPModel, record: &ResultRecord, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "kind,name,value,dual,slack")?;
    writeln!(
        out,
        "status,{},{},,",
        record.status,
        fmt_opt(record.objective_value)
    )?;
    for (variable, value) in &record.variable_values {
        writeln!(out, "variable,{},{:.6},,", variable, value)?;
    }
    for constraint in &model.constraints {
        writeln!(
            out,
            "constraint,{},,{},{}",
            constraint.id,
            fmt_opt(lookup(&record.dual_values, &constraint.id)),
            fmt_opt(lookup(&record.slack_values, &constraint.id)),
        )?;
    }
    Ok(())
}

/// Write a human-readable solve report.
pub fn write_report(
    model: &LPModel,
    record: &ResultRecord,
    out: &mut impl Write,
) -> io::Result<()> {
    writeln!(out, "Status: {}", record.status)?;
    if let Some(value) = record.objective_value {
        writeln!(out, "Objective value: {:.6}", value)?;
    }
    if let Some(message) = &record.message {
        writeln!(out, "Message: {}", message)?;
    }
    writeln!(out, "Solve time: {:.6} s", record.solve_time)?;

    if !record.variable_values.is_empty() {
        let mut table = Table::new();
        table.set_titles(row!["Variable", "Value"]);
        for (variable, value) in &record.variable_values {
            table.add_row(row![variable, format!("{:.6}", value)]);
        }
        writeln!(out)?;
        write!(out, "{}", table)?;
    }

    let mut constraints: Vec<&Constraint> = model.constraints.iter().collect();
    // Tightest constraints first when slacks are known.
    constraints.sort_by_key(|constraint| {
        OrderedFloat(
            lookup(&record.slack_values, &constraint.id)
                .map(f64::abs)
                .unwrap_or(f64::INFINITY),
        )
    });
    let mut table = Table::new();
    table.set_titles(row!["Constraint", "Expression", "Dual", "Slack"]);
    for constraint in constraints {
        table.add_row(row![
            constraint.id,
            format!(
                "{} {} {}",
                lhs_text(constraint),
                constraint.relation,
                constraint.rhs
            ),
            fmt_opt(lookup(&record.dual_values, &constraint.id)),
            fmt_opt(lookup(&record.slack_values, &constraint.id)),
        ]);
    }
    writeln!(out)?;
    write!(out, "{}", table)
}

/// Write a summary of a freshly built model: dimensions, variable bounds,
/// and the constraint list.
pub fn write_model_summary(model: &LPModel, out: &mut impl Write) -> io::Result<()> {
    writeln!(
        out,
        "{} objective, {} variables, {} constraints",
        model.objective.sense,
        model.variables.len(),
        model.constraints.len()
    )?;

    let mut table = Table::new();
    table.set_titles(row!["Variable", "Lower", "Upper"]);
    for (variable, bounds) in model.variables.iter().zip(&model.bounds) {
        table.add_row(row![variable, bounds.lower, bounds.upper]);
    }
    writeln!(out)?;
    write!(out, "{}", table)?;

    let mut table = Table::new();
    table.set_titles(row!["Constraint", "Expression"]);
    for constraint in &model.constraints {
        table.add_row(row![
            constraint.id,
            format!(
                "{} {} {}",
                lhs_text(constraint),
                constraint.relation,
                constraint.rhs
            )
        ]);
    }
    writeln!(out)?;
    write!(out, "{}", table)
}
