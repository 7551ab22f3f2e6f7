use clap::Args;
use rust_decimal::Decimal;
use serde_json::{Map, Value};

use tvm_core::{solve_scenario, ScenarioInput};

use crate::input;

/// Arguments for the scenario solver
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct SolveArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Variable to solve for: pv, fv, pmt, specific_pmt, nper, rate
    #[arg(long)]
    pub solve_for: Option<String>,

    /// Sign convention: investment or loan
    #[arg(long)]
    pub scenario: Option<String>,

    /// Rate representation: period_rate, ear, apr
    #[arg(long)]
    pub rate_type: Option<String>,

    /// Compounding periods per year for an apr rate
    #[arg(long)]
    pub compounding_freq: Option<u32>,

    /// Payment mode: no, yes, growing, custom
    #[arg(long)]
    pub has_pmt: Option<String>,

    /// Payment periods per year (defaults to --compounding-freq)
    #[arg(long)]
    pub pmt_freq: Option<u32>,

    /// Payment timing: end or begin
    #[arg(long)]
    pub when: Option<String>,

    /// Present value
    #[arg(long)]
    pub pv: Option<Decimal>,

    /// Future value
    #[arg(long)]
    pub fv: Option<Decimal>,

    /// Regular payment amount
    #[arg(long)]
    pub pmt: Option<Decimal>,

    /// Term of the instrument in years
    #[arg(long)]
    pub term_in_years: Option<Decimal>,

    /// Interest rate as a percentage (5 = 5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// First payment of a growing series
    #[arg(long)]
    pub initial_pmt: Option<Decimal>,

    /// Per-period payment growth as a percentage
    #[arg(long)]
    pub growth_rate: Option<Decimal>,

    /// 1-based period index when solving for a specific payment
    #[arg(long)]
    pub specific_pmt_period: Option<u32>,

    /// Comma-separated payment magnitudes for custom mode
    #[arg(long, value_delimiter = ',')]
    pub custom_payments: Option<Vec<Decimal>>,
}

pub fn run_solve(args: SolveArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let scenario_input: ScenarioInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        serde_json::from_value(data)?
    } else {
        serde_json::from_value(Value::Object(fields_from_flags(&args)?))?
    };

    let result = solve_scenario(&scenario_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Assemble a request object from individual flags. Decimals travel as
/// strings so the core's exact-decimal deserialization sees them verbatim.
fn fields_from_flags(args: &SolveArgs) -> Result<Map<String, Value>, Box<dyn std::error::Error>> {
    let mut fields = Map::new();

    let solve_for = args
        .solve_for
        .clone()
        .ok_or("--solve-for is required (or provide --input)")?;
    fields.insert("solve_for".into(), Value::String(solve_for));

    let strings = [
        ("scenario", &args.scenario),
        ("rate_type", &args.rate_type),
        ("has_pmt", &args.has_pmt),
        ("when", &args.when),
    ];
    for (key, value) in strings {
        if let Some(v) = value {
            fields.insert(key.into(), Value::String(v.clone()));
        }
    }

    let decimals = [
        ("pv", &args.pv),
        ("fv", &args.fv),
        ("pmt", &args.pmt),
        ("term_in_years", &args.term_in_years),
        ("rate", &args.rate),
        ("initial_pmt", &args.initial_pmt),
        ("growth_rate", &args.growth_rate),
    ];
    for (key, value) in decimals {
        if let Some(v) = value {
            fields.insert(key.into(), Value::String(v.to_string()));
        }
    }

    if let Some(v) = args.compounding_freq {
        fields.insert("compounding_freq".into(), Value::from(v));
    }
    if let Some(v) = args.pmt_freq {
        fields.insert("pmt_freq".into(), Value::from(v));
    }
    if let Some(v) = args.specific_pmt_period {
        fields.insert("specific_pmt_period".into(), Value::from(v));
    }
    if let Some(ref payments) = args.custom_payments {
        fields.insert(
            "custom_payments".into(),
            Value::Array(payments.iter().map(|p| Value::String(p.to_string())).collect()),
        );
    }

    Ok(fields)
}
