use anyhow::Result;
use clap::Parser;
use lptext::{CLIArguments, check_main, solve_main};

fn main() -> Result<()> {
    let args = CLIArguments::parse();

    match args {
        CLIArguments::Check(args) => check_main(args),
        CLIArguments::Solve(args) => solve_main(args),
    }
}
