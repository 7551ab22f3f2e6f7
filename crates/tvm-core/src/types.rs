use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// The single variable a scenario leaves unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SolveFor {
    Pv,
    Fv,
    Pmt,
    SpecificPmt,
    Nper,
    Rate,
}

impl SolveFor {
    pub fn as_str(&self) -> &'static str {
        match self {
            SolveFor::Pv => "pv",
            SolveFor::Fv => "fv",
            SolveFor::Pmt => "pmt",
            SolveFor::SpecificPmt => "specific_pmt",
            SolveFor::Nper => "nper",
            SolveFor::Rate => "rate",
        }
    }
}

/// Governs the sign convention applied to present and future value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    #[default]
    Investment,
    Loan,
}

/// How the caller expressed the interest rate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RateType {
    /// Already a per-payment-period rate.
    #[serde(rename = "period_rate")]
    PeriodRate,
    /// Effective annual rate.
    #[serde(rename = "ear", alias = "effective_annual")]
    Ear,
    /// Nominal annual rate compounded `compounding_freq` times per year.
    #[default]
    #[serde(rename = "apr", alias = "nominal_annual")]
    Apr,
}

/// Regularity of the payment stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMode {
    #[default]
    #[serde(rename = "no")]
    None,
    #[serde(rename = "yes")]
    Fixed,
    #[serde(rename = "growing")]
    Growing,
    #[serde(rename = "custom")]
    Custom,
}

/// Whether a payment lands before or after interest accrues in a period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timing {
    #[default]
    #[serde(rename = "end", alias = "ordinary", alias = "0")]
    End,
    #[serde(rename = "begin", alias = "annuity_due", alias = "1")]
    Begin,
}

impl Timing {
    /// Annuity-due factor: 1 for begin-of-period payments, 0 for end.
    pub fn factor(&self) -> Decimal {
        match self {
            Timing::End => Decimal::ZERO,
            Timing::Begin => Decimal::ONE,
        }
    }
}

/// One scenario as delivered by the adapter. All fields except `solve_for`
/// are optional on the wire and default to zero or the stated enum default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioInput {
    pub solve_for: SolveFor,
    #[serde(default)]
    pub scenario: Scenario,
    #[serde(default)]
    pub rate_type: RateType,
    /// Compounding periods per year for an `apr` rate.
    #[serde(default = "default_compounding_freq")]
    pub compounding_freq: u32,
    #[serde(default)]
    pub has_pmt: PaymentMode,
    /// Payment periods per year. Defaults to `compounding_freq` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pmt_freq: Option<u32>,
    #[serde(default)]
    pub when: Timing,
    #[serde(default)]
    pub pv: Money,
    #[serde(default)]
    pub fv: Money,
    #[serde(default)]
    pub pmt: Money,
    #[serde(default)]
    pub term_in_years: Decimal,
    /// Interest rate as a percentage (5 = 5%).
    #[serde(default)]
    pub rate: Decimal,
    /// First payment of a growing series.
    #[serde(default)]
    pub initial_pmt: Money,
    /// Per-period payment growth as a percentage.
    #[serde(default)]
    pub growth_rate: Decimal,
    /// 1-based period index when solving for a specific payment.
    #[serde(default)]
    pub specific_pmt_period: u32,
    /// Payment magnitudes for custom mode; the sequence length overrides
    /// any period count implied by `term_in_years`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_payments: Vec<Decimal>,
}

fn default_compounding_freq() -> u32 {
    1
}

/// One line of the amortization/accrual schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// 1-based period index.
    pub period: u32,
    pub start_balance: Money,
    pub interest: Money,
    /// Signed: outflows from the holder are negative.
    pub payment: Money,
    pub principal_paid: Money,
    pub end_balance: Money,
}

/// The solved unknown plus the schedule it implies.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolvedScenario {
    pub solved_variable: SolveFor,
    /// For `nper` this is expressed in years, not periods.
    pub solved_value: Decimal,
    pub final_balance: Money,
    pub total_payments: Money,
    pub total_interest: Money,
    pub schedule: Vec<ScheduleRow>,
    pub period_labels: Vec<String>,
}

/// Display unit for one payment period at the given payment frequency.
pub fn period_unit(pmt_freq: u32) -> &'static str {
    match pmt_freq {
        1 => "Year",
        2 => "Semi-Annual Period",
        4 => "Quarter",
        12 => "Month",
        52 => "Week",
        _ => "Period",
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
