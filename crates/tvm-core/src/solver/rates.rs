//! Stage 2: map the caller's rate representation onto a single per-period
//! decimal rate matching the payment frequency.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::TvmError;
use crate::precision;
use crate::types::{Rate, RateType, ScenarioInput};
use crate::TvmResult;

/// Warning attached whenever a conversion has to leave decimal arithmetic.
const FLOAT_BRIDGE_WARNING: &str =
    "rate conversion used a fractional exponent computed in binary floating point; \
     precision beyond ~15 significant digits is not preserved";

pub fn per_period_rate(
    input: &ScenarioInput,
    pmt_freq: u32,
    warnings: &mut Vec<String>,
) -> TvmResult<Rate> {
    let rate_fraction = input.rate / dec!(100);

    match input.rate_type {
        RateType::PeriodRate => Ok(rate_fraction),
        RateType::Ear => {
            warnings.push(FLOAT_BRIDGE_WARNING.to_string());
            effective_to_period(rate_fraction, pmt_freq)
        }
        RateType::Apr => {
            if input.compounding_freq < 1 {
                return Err(TvmError::InvalidInput {
                    field: "compounding_freq".into(),
                    reason: "must be >= 1".into(),
                });
            }

            // Nominal -> effective annual is an integer-exponent compound,
            // exact in decimal.
            let m = Decimal::from(input.compounding_freq);
            let ear = (Decimal::ONE + rate_fraction / m)
                .checked_powd(m)
                .ok_or_else(|| TvmError::NonFiniteResult {
                    context: "nominal-to-effective rate compounding".into(),
                })?
                - Decimal::ONE;

            warnings.push(FLOAT_BRIDGE_WARNING.to_string());
            effective_to_period(ear, pmt_freq)
        }
    }
}

/// (1 + annual)^(1/pmt_freq) - 1, crossing the float boundary for the
/// fractional exponent.
fn effective_to_period(annual: Rate, pmt_freq: u32) -> TvmResult<Rate> {
    let exponent = 1.0 / f64::from(pmt_freq);
    let factor = precision::powf_via_f64(
        Decimal::ONE + annual,
        exponent,
        "effective-annual to per-period rate",
    )?;
    Ok(factor - Decimal::ONE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input_with_rate(rate: Decimal, rate_type: &str, compounding_freq: u32) -> ScenarioInput {
        serde_json::from_value(serde_json::json!({
            "solve_for": "fv",
            "rate": rate.to_string(),
            "rate_type": rate_type,
            "compounding_freq": compounding_freq,
        }))
        .unwrap()
    }

    #[test]
    fn test_period_rate_passthrough() {
        let input = input_with_rate(dec!(5), "period_rate", 1);
        let mut warnings = Vec::new();
        let rate = per_period_rate(&input, 12, &mut warnings).unwrap();
        assert_eq!(rate, dec!(0.05));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_ear_to_monthly() {
        // (1.126825...)^(1/12) - 1 ≈ 0.01 when the EAR came from 1% monthly
        let input = input_with_rate(dec!(12.682503013196972), "ear", 1);
        let mut warnings = Vec::new();
        let rate = per_period_rate(&input, 12, &mut warnings).unwrap();
        assert!((rate - dec!(0.01)).abs() < dec!(0.000000001));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_apr_monthly_compounding_to_monthly_periods() {
        // 12% APR compounded monthly, paid monthly: per-period rate is 1%
        let input = input_with_rate(dec!(12), "apr", 12);
        let mut warnings = Vec::new();
        let rate = per_period_rate(&input, 12, &mut warnings).unwrap();
        assert!((rate - dec!(0.01)).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_apr_annual_compounding_annual_periods() {
        // m = 1 and one payment period per year collapses to the nominal rate
        let input = input_with_rate(dec!(8), "apr", 1);
        let mut warnings = Vec::new();
        let rate = per_period_rate(&input, 1, &mut warnings).unwrap();
        assert!((rate - dec!(0.08)).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_apr_rejects_zero_compounding_freq() {
        let input = input_with_rate(dec!(8), "apr", 0);
        let mut warnings = Vec::new();
        let result = per_period_rate(&input, 1, &mut warnings);
        assert!(matches!(result, Err(TvmError::InvalidInput { .. })));
    }

    #[test]
    fn test_deep_negative_annual_rate_rejected() {
        // EAR below -100% drives a negative base to a fractional power
        let input = input_with_rate(dec!(-150), "ear", 1);
        let mut warnings = Vec::new();
        let result = per_period_rate(&input, 12, &mut warnings);
        assert!(matches!(result, Err(TvmError::NonFiniteResult { .. })));
    }
}
