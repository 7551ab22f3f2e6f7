//! The single decimal/float boundary.
//!
//! Everything in this crate computes in `Decimal`, with two exceptions that
//! have no exact decimal form: fractional-exponent rate conversions and the
//! iterative rate / logarithmic period-count solvers. Those cross into binary
//! floating point here and are re-wrapped as decimals on the way out, with
//! NaN/infinity rejected at the crossing.

use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;

use crate::error::TvmError;
use crate::TvmResult;

pub(crate) fn to_f64(value: Decimal, context: &str) -> TvmResult<f64> {
    value.to_f64().ok_or_else(|| TvmError::NonFiniteResult {
        context: context.into(),
    })
}

pub(crate) fn from_f64(value: f64, context: &str) -> TvmResult<Decimal> {
    if !value.is_finite() {
        return Err(TvmError::NonFiniteResult {
            context: context.into(),
        });
    }
    Decimal::from_f64(value).ok_or_else(|| TvmError::NonFiniteResult {
        context: context.into(),
    })
}

/// `base ^ exponent` computed in floating point and re-wrapped as decimal.
pub(crate) fn powf_via_f64(base: Decimal, exponent: f64, context: &str) -> TvmResult<Decimal> {
    let b = to_f64(base, context)?;
    from_f64(b.powf(exponent), context)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_powf_fractional_exponent() {
        // (1.1025)^(1/2) - 1 = 0.05
        let result = powf_via_f64(dec!(1.1025), 0.5, "test").unwrap();
        assert!((result - dec!(1.05)).abs() < dec!(0.0000000001));
    }

    #[test]
    fn test_powf_negative_base_rejected() {
        // Negative base to a fractional power is NaN in floating point
        let result = powf_via_f64(dec!(-0.5), 0.5, "test");
        assert!(matches!(result, Err(TvmError::NonFiniteResult { .. })));
    }

    #[test]
    fn test_from_f64_rejects_infinity() {
        assert!(from_f64(f64::INFINITY, "test").is_err());
        assert!(from_f64(f64::NAN, "test").is_err());
    }
}
