//! Closed-form and iterative solvers for the fixed-payment annuity identity
//!
//! ```text
//! pv·(1+r)^n + pmt·(1 + r·w)·((1+r)^n − 1)/r + fv = 0
//! ```
//!
//! where `w` is 1 for begin-of-period payments and 0 for end-of-period, plus
//! present/future-value summations over explicit signed cashflow series.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

use crate::error::TvmError;
use crate::precision;
use crate::types::{Money, Rate, Timing};
use crate::TvmResult;

/// Residual tolerance and bracket-width floor for the iterative rate solve.
const RATE_TOLERANCE: f64 = 1e-10;
const MAX_RATE_ITERATIONS: u32 = 100;

/// Candidate per-period rates scanned for a sign change before bisecting.
const RATE_BRACKET_GRID: [f64; 12] = [
    -0.999999, -0.9, -0.5, -0.1, -0.01, 0.0, 0.01, 0.1, 0.5, 1.0, 10.0, 100.0,
];

/// (1+r)^n, rejecting rates at or below -100%.
fn compound_factor(rate: Rate, nper: Decimal) -> TvmResult<Decimal> {
    let base = Decimal::ONE + rate;
    if base <= Decimal::ZERO {
        return Err(TvmError::InvalidInput {
            field: "rate".into(),
            reason: "per-period rate must be greater than -100%".into(),
        });
    }
    base.checked_powd(nper).ok_or_else(|| TvmError::NonFiniteResult {
        context: "compound factor".into(),
    })
}

/// Present value of an explicit payment series plus a terminal value, all
/// discounted at a flat per-period rate. The first payment is discounted one
/// full period; the terminal value is discounted over the whole series length.
pub fn npv(rate: Rate, payments: &[Money], terminal_fv: Money) -> TvmResult<Money> {
    if rate <= Decimal::NEGATIVE_ONE {
        return Err(TvmError::InvalidInput {
            field: "rate".into(),
            reason: "discount rate must be greater than -100%".into(),
        });
    }

    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;
    let mut result = Decimal::ZERO;

    for (t, payment) in payments.iter().enumerate() {
        discount *= one_plus_r;
        if discount.is_zero() {
            return Err(TvmError::DivisionByZero {
                context: format!("NPV discount factor at period {}", t + 1),
            });
        }
        result += payment / discount;
    }

    result += terminal_fv / discount;
    Ok(result)
}

/// Ending balance after replaying an explicit payment series forward from a
/// starting value at a flat per-period rate.
pub fn fv_of_series(rate: Rate, starting_value: Money, payments: &[Money]) -> Money {
    let one_plus_r = Decimal::ONE + rate;
    let mut balance = starting_value;
    for payment in payments {
        balance = balance * one_plus_r + payment;
    }
    balance
}

/// Future Value of a fixed-payment annuity
pub fn fv(rate: Rate, nper: Decimal, pmt: Money, present_value: Money, when: Timing) -> TvmResult<Money> {
    if rate.is_zero() {
        return Ok(-(present_value + pmt * nper));
    }

    let factor = compound_factor(rate, nper)?;
    let annuity_factor = (factor - Decimal::ONE) / rate * (Decimal::ONE + rate * when.factor());

    Ok(-(present_value * factor + pmt * annuity_factor))
}

/// Present Value of a fixed-payment annuity
pub fn pv(rate: Rate, nper: Decimal, pmt: Money, future_value: Money, when: Timing) -> TvmResult<Money> {
    if rate.is_zero() {
        return Ok(-(future_value + pmt * nper));
    }

    let factor = compound_factor(rate, nper)?;
    if factor.is_zero() {
        return Err(TvmError::DivisionByZero {
            context: "PV compound factor".into(),
        });
    }

    let annuity_factor = (factor - Decimal::ONE) / rate * (Decimal::ONE + rate * when.factor());
    Ok(-(future_value + pmt * annuity_factor) / factor)
}

/// Payment (PMT) of a fixed-payment annuity
pub fn pmt(rate: Rate, nper: Decimal, present_value: Money, future_value: Money, when: Timing) -> TvmResult<Money> {
    if nper <= Decimal::ZERO {
        return Err(TvmError::InvalidInput {
            field: "nper".into(),
            reason: "number of periods must be positive".into(),
        });
    }

    if rate.is_zero() {
        return Ok(-(present_value + future_value) / nper);
    }

    let factor = compound_factor(rate, nper)?;
    let annuity_factor = (factor - Decimal::ONE) / rate * (Decimal::ONE + rate * when.factor());

    if annuity_factor.is_zero() {
        return Err(TvmError::DivisionByZero {
            context: "PMT annuity factor".into(),
        });
    }

    Ok(-(present_value * factor + future_value) / annuity_factor)
}

/// Number of periods. Logarithmic closed form when the rate is nonzero,
/// computed across the float boundary; linear when the rate is zero.
pub fn nper(rate: Rate, pmt: Money, present_value: Money, future_value: Money, when: Timing) -> TvmResult<Decimal> {
    if rate.is_zero() {
        if pmt.is_zero() {
            return Err(TvmError::DivisionByZero {
                context: "NPER with zero rate and zero payment".into(),
            });
        }
        return Ok(-(future_value + present_value) / pmt);
    }

    let r = precision::to_f64(rate, "NPER rate")?;
    if 1.0 + r <= 0.0 {
        return Err(TvmError::InvalidInput {
            field: "rate".into(),
            reason: "per-period rate must be greater than -100%".into(),
        });
    }

    let pmt_f = precision::to_f64(pmt, "NPER pmt")?;
    let pv_f = precision::to_f64(present_value, "NPER pv")?;
    let fv_f = precision::to_f64(future_value, "NPER fv")?;
    let w = timing_factor_f64(when);

    if pmt_f == 0.0 && pv_f == 0.0 {
        return Err(TvmError::DivisionByZero {
            context: "NPER with zero payment and zero present value".into(),
        });
    }

    let z = pmt_f * (1.0 + r * w) / r;
    let denominator = pv_f + z;
    if denominator == 0.0 {
        return Err(TvmError::DivisionByZero {
            context: "NPER annuity term".into(),
        });
    }

    let ratio = (-fv_f + z) / denominator;
    if ratio <= 0.0 {
        return Err(TvmError::NonFiniteResult {
            context: "NPER logarithm of a non-positive ratio".into(),
        });
    }

    precision::from_f64(ratio.ln() / (1.0 + r).ln(), "NPER")
}

/// Per-period rate of a fixed-payment annuity by bisection over the annuity
/// residual, computed across the float boundary. Converges when the residual
/// or the bracket width falls below `RATE_TOLERANCE`; gives up after
/// `MAX_RATE_ITERATIONS` halvings or when no sign change brackets a root.
pub fn rate(nper: Decimal, pmt: Money, present_value: Money, future_value: Money, when: Timing) -> TvmResult<Rate> {
    let n = precision::to_f64(nper, "RATE nper")?;
    if n <= 0.0 {
        return Err(TvmError::InvalidInput {
            field: "nper".into(),
            reason: "number of periods must be positive".into(),
        });
    }

    let pmt_f = precision::to_f64(pmt, "RATE pmt")?;
    let pv_f = precision::to_f64(present_value, "RATE pv")?;
    let fv_f = precision::to_f64(future_value, "RATE fv")?;
    let w = timing_factor_f64(when);

    let residual = |r: f64| -> f64 {
        if r.abs() < 1e-14 {
            return pv_f + pmt_f * n + fv_f;
        }
        let factor = (1.0 + r).powf(n);
        pv_f * factor + pmt_f * (1.0 + r * w) * (factor - 1.0) / r + fv_f
    };

    // Scan the grid for a sign change to bracket the root
    let mut bracket = None;
    let mut prev = (RATE_BRACKET_GRID[0], residual(RATE_BRACKET_GRID[0]));
    for &candidate in &RATE_BRACKET_GRID[1..] {
        if prev.1 == 0.0 {
            return precision::from_f64(prev.0, "RATE");
        }
        let value = residual(candidate);
        if prev.1 * value < 0.0 {
            bracket = Some((prev.0, candidate, prev.1));
            break;
        }
        prev = (candidate, value);
    }

    let Some((mut lo, mut hi, mut lo_value)) = bracket else {
        return Err(TvmError::ConvergenceFailure {
            function: "RATE".into(),
            iterations: 0,
            last_delta: precision::from_f64(prev.1, "RATE residual").unwrap_or(Decimal::MAX),
        });
    };

    for _ in 0..MAX_RATE_ITERATIONS {
        let mid = 0.5 * (lo + hi);
        let mid_value = residual(mid);

        if mid_value.abs() < RATE_TOLERANCE || (hi - lo).abs() < RATE_TOLERANCE {
            return precision::from_f64(mid, "RATE");
        }

        if lo_value * mid_value < 0.0 {
            hi = mid;
        } else {
            lo = mid;
            lo_value = mid_value;
        }
    }

    Err(TvmError::ConvergenceFailure {
        function: "RATE".into(),
        iterations: MAX_RATE_ITERATIONS,
        last_delta: precision::from_f64(residual(0.5 * (lo + hi)), "RATE residual")
            .unwrap_or(Decimal::MAX),
    })
}

fn timing_factor_f64(when: Timing) -> f64 {
    match when {
        Timing::End => 0.0,
        Timing::Begin => 1.0,
    }
}
