//! Time-value-of-money solver.
//!
//! Given a loan, investment, or annuity scenario with exactly one unknown
//! among present value, future value, payment, a specific payment, period
//! count, and rate, [`solve_scenario`] computes the unknown and replays it
//! into a period-by-period amortization schedule with summary totals.
//!
//! All arithmetic is `rust_decimal`; the only floating-point crossings are
//! fractional-exponent rate conversions and the iterative rate / logarithmic
//! period-count solvers, isolated behind a single boundary module.

pub mod annuity;
pub mod error;
mod precision;
pub mod solver;
pub mod types;

pub use error::TvmError;
pub use solver::solve_scenario;
pub use types::*;

/// Standard result type for all solver operations
pub type TvmResult<T> = Result<T, TvmError>;
