//! Command-line entry points for the `check` and `solve` commands.

use std::{
    collections::HashMap,
    fs,
    io::{self, BufWriter},
    path::PathBuf,
};

use anyhow::{Context, Result, bail};
use clap::Parser;

use crate::{
    export,
    model::{self, Bounds, Symbol},
    parser,
    solver::{self, SolveStatus, SolverBackend},
};

/// Command-line arguments for the model check command.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Problem text input file
    pub input: PathBuf,
}

/// Parse and validate a problem file, printing a model summary.
///
/// Parse and validation errors propagate; there is no model to report on
/// when the text itself is broken.
pub fn check_main(args: CheckArgs) -> Result<()> {
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let (objective, constraints) = parser::parse(&text)?;
    let model = model::build(objective, constraints, None)?;
    export::write_model_summary(&model, &mut io::stdout().lock())?;
    Ok(())
}

/// Command-line arguments for the solve command.
#[derive(Parser, Debug)]
pub struct SolveArgs {
    /// Problem text input file
    pub input: PathBuf,

    /// Solver backend name
    #[clap(short, long, default_value = "default")]
    pub solver: String,

    /// Variable bound override, formatted NAME:LOWER:UPPER ("inf" allowed)
    #[clap(long)]
    pub bound: Vec<String>,

    /// Output CSV file
    #[clap(long)]
    pub csv: Option<PathBuf>,

    /// Output report file (defaults to stdout)
    #[clap(long)]
    pub rpt: Option<PathBuf>,
}

/// Run the full pipeline: parse, build, solve, report.
///
/// Backend selection failures propagate before the solve protocol starts;
/// solve failures come back inside the result record, are reported, and
/// only then turn into a non-zero exit.
pub fn solve_main(args: SolveArgs) -> Result<()> {
    let text = fs::read_to_string(&args.input)
        .with_context(|| format!("reading {}", args.input.display()))?;
    let (objective, constraints) = parser::parse(&text)?;
    let overrides = parse_bound_overrides(&args.bound)?;
    let model = model::build(objective, constraints, overrides.as_ref())?;

    let backend = SolverBackend::from_name(&args.solver)?;
    let mut capability = backend.create();
    let record = solver::solve(&model, capability.as_mut());

    if let Some(path) = &args.csv {
        let mut out = BufWriter::new(fs::File::create(path)?);
        export::write_csv(&model, &record, &mut out)?;
    }
    match &args.rpt {
        Some(path) => {
            let mut out = BufWriter::new(fs::File::create(path)?);
            export::write_report(&model, &record, &mut out)?;
        }
        None => export::write_report(&model, &record, &mut io::stdout().lock())?,
    }

    if record.status == SolveStatus::Error {
        bail!(
            "solve failed: {}",
            record.message.as_deref().unwrap_or("unknown cause")
        );
    }
    Ok(())
}

fn parse_bound_overrides(specs: &[String]) -> Result<Option<HashMap<Symbol, Bounds>>> {
    if specs.is_empty() {
        return Ok(None);
    }
    let mut overrides = HashMap::new();
    for spec in specs {
        let mut parts = spec.splitn(3, ':');
        let (Some(name), Some(lower), Some(upper)) = (parts.next(), parts.next(), parts.next())
        else {
            bail!("bad bound override '{spec}', expected NAME:LOWER:UPPER");
        };
        let bounds = Bounds {
            lower: lower
                .parse()
                .with_context(|| format!("bad lower bound in '{spec}'"))?,
            upper: upper
                .parse()
                .with_context(|| format!("bad upper bound in '{spec}'"))?,
        };
        overrides.insert(Symbol::from(name), bounds);
    }
    Ok(Some(overrides))
}
