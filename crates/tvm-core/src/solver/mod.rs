//! The scenario solver: normalize → convert rate → solve the unknown →
//! replay the schedule. Strictly sequential, no feedback loop; the solved
//! unknown feeds forward into the schedule replay.

pub mod normalize;
pub mod rates;
pub mod schedule;

use std::time::Instant;

use rust_decimal::Decimal;

use crate::annuity;
use crate::error::TvmError;
use crate::types::{
    period_unit, with_metadata, ComputationOutput, PaymentMode, Scenario, ScenarioInput,
    SolveFor, SolvedScenario,
};
use crate::TvmResult;

use normalize::{series_len, NormalizedScenario};

/// Solve a scenario for its single unknown and build the consistent
/// period-by-period schedule. Pure and stateless: same input, same output.
pub fn solve_scenario(input: &ScenarioInput) -> TvmResult<ComputationOutput<SolvedScenario>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let mut state = normalize::normalize(input)?;
    state.per_period_rate = rates::per_period_rate(input, state.pmt_freq, &mut warnings)?;

    let solved = solve_unknown(&mut state)?;

    let (schedule, totals) = schedule::build(&state)?;

    // Display convention: the grown value of an investment and the principal
    // of a loan read as magnitudes, whatever the cashflow sign.
    let mut solved_value = solved;
    match (state.solve_for, state.scenario) {
        (SolveFor::Fv, Scenario::Investment) | (SolveFor::Pv, Scenario::Loan) => {
            solved_value = solved_value.abs();
        }
        _ => {}
    }

    let unit = period_unit(state.pmt_freq);
    let period_labels: Vec<String>;

    if state.solve_for == SolveFor::Nper {
        // Reported in years; schedule rows stay in raw periods.
        period_labels = (1..=series_len(solved))
            .map(|i| format!("{unit} {i}"))
            .collect();
        solved_value /= Decimal::from(state.pmt_freq);
    } else {
        period_labels = (1..=schedule.len()).map(|i| format!("{unit} {i}")).collect();
    }

    let result = SolvedScenario {
        solved_variable: state.solve_for,
        solved_value,
        final_balance: totals.final_balance,
        total_payments: totals.total_payments,
        total_interest: totals.total_interest,
        schedule,
        period_labels,
    };

    let elapsed_us = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Signed-cashflow annuity identity with per-period accrual replay",
        input,
        warnings,
        elapsed_us,
        result,
    ))
}

/// Stage 3: dispatch on `(solve_for, payment_mode)` and fill the unknown
/// back into the state so the schedule replay sees a complete parameter set.
fn solve_unknown(state: &mut NormalizedScenario) -> TvmResult<Decimal> {
    let irregular = matches!(state.payment_mode, PaymentMode::Growing | PaymentMode::Custom);
    let rate = state.per_period_rate;
    let when = state.timing;

    match state.solve_for {
        // Bounds were checked at normalization time.
        SolveFor::SpecificPmt => Ok(state.payments[state.specific_pmt_period as usize - 1]),

        SolveFor::Fv if irregular => {
            let value = annuity::fv_of_series(rate, state.pv, &state.payments);
            state.fv = value;
            Ok(value)
        }

        SolveFor::Pv if irregular => {
            let value = -annuity::npv(rate, &state.payments, state.fv)?;
            state.pv = value;
            Ok(value)
        }

        // Rate and period-count solving over an arbitrary cashflow vector
        // would need root-finding the design deliberately leaves out.
        other if irregular => Err(TvmError::UnsupportedOperation(format!(
            "solving for {} with growing or custom payments is not supported",
            other.as_str()
        ))),

        SolveFor::Pv => {
            let value = annuity::pv(rate, state.nper, state.pmt, state.fv, when)?;
            state.pv = value;
            Ok(value)
        }

        SolveFor::Fv => {
            let value = annuity::fv(rate, state.nper, state.pmt, state.pv, when)?;
            state.fv = value;
            Ok(value)
        }

        SolveFor::Pmt => {
            let value = annuity::pmt(rate, state.nper, state.pv, state.fv, when)?;
            state.pmt = value;
            Ok(value)
        }

        SolveFor::Nper => {
            let value = annuity::nper(rate, state.pmt, state.pv, state.fv, when)?;
            state.nper = value;
            if state.payment_mode == PaymentMode::Fixed {
                // The series could not be built at normalization time.
                state.payments = vec![-state.pmt.abs(); series_len(value)];
            }
            Ok(value)
        }

        SolveFor::Rate => {
            let value = annuity::rate(state.nper, state.pmt, state.pv, state.fv, when)?;
            state.per_period_rate = value;
            Ok(value)
        }
    }
}
