mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::solve::SolveArgs;

/// Time-value-of-money solver
#[derive(Parser)]
#[command(
    name = "tvm",
    version,
    about = "Time-value-of-money solver with decimal precision",
    long_about = "Solves loan, investment, and annuity scenarios for whichever variable \
                  is unknown (present value, future value, payment, a specific payment, \
                  number of periods, or interest rate) and builds the matching \
                  period-by-period amortization schedule."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a scenario for its unknown variable and build the schedule
    Solve(SolveArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Solve(args) => commands::solve::run_solve(args),
        Commands::Version => {
            println!("tvm {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
