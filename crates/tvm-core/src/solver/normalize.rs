//! Stage 1: coerce a loosely-filled `ScenarioInput` into fully-signed working
//! state and build the signed payment series.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::TvmError;
use crate::types::{Money, PaymentMode, Rate, Scenario, ScenarioInput, SolveFor, Timing};
use crate::TvmResult;

/// Fully-normalized scenario state threaded through the solver stages.
/// The unknown field holds its zero placeholder until the dispatch stage
/// fills it in.
#[derive(Debug, Clone)]
pub struct NormalizedScenario {
    pub solve_for: SolveFor,
    pub scenario: Scenario,
    pub payment_mode: PaymentMode,
    pub timing: Timing,
    pub pmt_freq: u32,
    pub pv: Money,
    pub fv: Money,
    pub pmt: Money,
    /// Period count. Zero placeholder when `solve_for = nper`.
    pub nper: Decimal,
    pub specific_pmt_period: u32,
    /// Signed payment series, outflows negative. Empty for `no` mode and for
    /// a fixed series whose payment or length is still unknown.
    pub payments: Vec<Money>,
    /// Filled by the rate-conversion stage.
    pub per_period_rate: Rate,
}

pub fn normalize(input: &ScenarioInput) -> TvmResult<NormalizedScenario> {
    let pmt_freq = input.pmt_freq.unwrap_or(input.compounding_freq);
    if pmt_freq < 1 {
        return Err(TvmError::InvalidInput {
            field: "pmt_freq".into(),
            reason: "payment frequency must be >= 1".into(),
        });
    }

    // Period count: unknown when solving for it, dictated by the custom
    // series length when one is supplied.
    let mut nper = if input.solve_for == SolveFor::Nper {
        Decimal::ZERO
    } else {
        input.term_in_years * Decimal::from(pmt_freq)
    };
    if input.has_pmt == PaymentMode::Custom {
        nper = Decimal::from(input.custom_payments.len());
    }

    let count = if input.solve_for == SolveFor::Nper {
        0
    } else {
        series_len(nper)
    };

    let payments: Vec<Money> = match input.has_pmt {
        PaymentMode::None => Vec::new(),
        PaymentMode::Fixed => {
            if input.solve_for == SolveFor::Pmt {
                // Payment still unknown; the schedule falls back to the flat
                // solved payment instead of a prebuilt series.
                Vec::new()
            } else {
                vec![-input.pmt.abs(); count]
            }
        }
        PaymentMode::Growing => {
            let growth = input.growth_rate / dec!(100);
            let step = Decimal::ONE + growth;
            let mut current = -input.initial_pmt.abs();
            let mut series = Vec::with_capacity(count);
            for _ in 0..count {
                series.push(current);
                current *= step;
            }
            series
        }
        PaymentMode::Custom => input.custom_payments.iter().map(|p| -p.abs()).collect(),
    };

    if input.solve_for == SolveFor::SpecificPmt
        && (input.specific_pmt_period < 1 || input.specific_pmt_period as usize > payments.len())
    {
        return Err(TvmError::InvalidInput {
            field: "specific_pmt_period".into(),
            reason: format!("must be between 1 and {}", payments.len()),
        });
    }

    // Sign conventions, skipped for whichever of pv/fv is the unknown:
    // investment pays cash out now (pv negative) and returns it later;
    // a loan receives principal now (pv positive) and repays it.
    let mut pv = input.pv;
    if input.solve_for != SolveFor::Pv {
        pv = match input.scenario {
            Scenario::Investment => -pv.abs(),
            Scenario::Loan => pv.abs(),
        };
    }

    let mut fv = input.fv;
    if input.solve_for != SolveFor::Fv {
        fv = match input.scenario {
            Scenario::Investment => fv.abs(),
            Scenario::Loan => -fv.abs(),
        };
    }

    let mut pmt = input.pmt;
    if input.solve_for != SolveFor::Pmt && input.has_pmt == PaymentMode::Fixed && !pmt.is_zero() {
        pmt = -pmt.abs();
    }

    Ok(NormalizedScenario {
        solve_for: input.solve_for,
        scenario: input.scenario,
        payment_mode: input.has_pmt,
        timing: input.when,
        pmt_freq,
        pv,
        fv,
        pmt,
        nper,
        specific_pmt_period: input.specific_pmt_period,
        payments,
        per_period_rate: Decimal::ZERO,
    })
}

/// Round a (possibly fractional) period count to a series length.
pub fn series_len(nper: Decimal) -> usize {
    nper.round().to_i64().map_or(0, |n| n.max(0) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn base_input() -> ScenarioInput {
        serde_json::from_str(r#"{"solve_for": "fv"}"#).unwrap()
    }

    #[test]
    fn test_investment_sign_convention() {
        let mut input = base_input();
        input.pv = dec!(1000);
        input.fv = dec!(500);
        input.solve_for = SolveFor::Pmt;

        let state = normalize(&input).unwrap();
        assert_eq!(state.pv, dec!(-1000));
        assert_eq!(state.fv, dec!(500));
    }

    #[test]
    fn test_loan_sign_convention() {
        let mut input = base_input();
        input.scenario = Scenario::Loan;
        input.pv = dec!(-1000);
        input.fv = dec!(500);
        input.solve_for = SolveFor::Pmt;

        let state = normalize(&input).unwrap();
        assert_eq!(state.pv, dec!(1000));
        assert_eq!(state.fv, dec!(-500));
    }

    #[test]
    fn test_unknown_skips_sign_normalization() {
        let mut input = base_input();
        input.solve_for = SolveFor::Pv;
        input.pv = dec!(123);

        let state = normalize(&input).unwrap();
        assert_eq!(state.pv, dec!(123));
    }

    #[test]
    fn test_fixed_payment_forced_negative() {
        let mut input = base_input();
        input.has_pmt = PaymentMode::Fixed;
        input.pmt = dec!(250);
        input.term_in_years = dec!(2);
        input.pmt_freq = Some(12);

        let state = normalize(&input).unwrap();
        assert_eq!(state.pmt, dec!(-250));
        assert_eq!(state.nper, dec!(24));
        assert_eq!(state.payments.len(), 24);
        assert!(state.payments.iter().all(|p| *p == dec!(-250)));
    }

    #[test]
    fn test_growing_series_geometric() {
        let mut input = base_input();
        input.has_pmt = PaymentMode::Growing;
        input.initial_pmt = dec!(100);
        input.growth_rate = dec!(10);
        input.term_in_years = dec!(3);
        input.pmt_freq = Some(1);

        let state = normalize(&input).unwrap();
        assert_eq!(state.payments, vec![dec!(-100), dec!(-110.0), dec!(-121.000)]);
    }

    #[test]
    fn test_custom_series_overrides_term() {
        let mut input = base_input();
        input.has_pmt = PaymentMode::Custom;
        input.custom_payments = vec![dec!(50), dec!(-60), dec!(70)];
        input.term_in_years = dec!(99);
        input.pmt_freq = Some(12);

        let state = normalize(&input).unwrap();
        assert_eq!(state.nper, dec!(3));
        assert_eq!(state.payments, vec![dec!(-50), dec!(-60), dec!(-70)]);
    }

    #[test]
    fn test_nper_placeholder_when_solving_for_it() {
        let mut input = base_input();
        input.solve_for = SolveFor::Nper;
        input.has_pmt = PaymentMode::Fixed;
        input.pmt = dec!(100);
        input.term_in_years = dec!(5);

        let state = normalize(&input).unwrap();
        assert_eq!(state.nper, Decimal::ZERO);
        assert!(state.payments.is_empty());
    }

    #[test]
    fn test_pmt_freq_defaults_to_compounding_freq() {
        let mut input = base_input();
        input.compounding_freq = 12;
        input.term_in_years = dec!(1);

        let state = normalize(&input).unwrap();
        assert_eq!(state.pmt_freq, 12);
        assert_eq!(state.nper, dec!(12));
    }

    #[test]
    fn test_specific_pmt_period_out_of_range() {
        let mut input = base_input();
        input.solve_for = SolveFor::SpecificPmt;
        input.has_pmt = PaymentMode::Custom;
        input.custom_payments = vec![dec!(10), dec!(20)];
        input.specific_pmt_period = 5;

        let result = normalize(&input);
        assert!(matches!(result, Err(TvmError::InvalidInput { .. })));
    }
}
