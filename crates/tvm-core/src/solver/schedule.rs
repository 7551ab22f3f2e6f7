//! Stage 4: replay the fully-determined parameters period by period into an
//! amortization/accrual schedule with running totals.

use rust_decimal::Decimal;

use crate::types::{Money, PaymentMode, ScheduleRow, Timing};
use crate::TvmResult;

use super::normalize::{series_len, NormalizedScenario};

/// Totals accumulated while replaying the schedule.
#[derive(Debug, Clone)]
pub struct ScheduleTotals {
    pub final_balance: Money,
    /// Sum of payment magnitudes (absolute, so a drawdown reads positive).
    pub total_payments: Money,
    pub total_interest: Money,
}

pub fn build(state: &NormalizedScenario) -> TvmResult<(Vec<ScheduleRow>, ScheduleTotals)> {
    let length = if state.nper.is_zero() {
        state.payments.len()
    } else {
        series_len(state.nper)
    };

    let mut balance = state.pv;
    let mut total_interest = Decimal::ZERO;
    let mut total_payments = Decimal::ZERO;
    let mut schedule = Vec::with_capacity(length);

    for i in 0..length {
        let start_balance = balance;
        let payment = state.payments.get(i).copied().unwrap_or(match state.payment_mode {
            PaymentMode::Fixed => state.pmt,
            _ => Decimal::ZERO,
        });

        let (interest, end_balance) = match state.timing {
            Timing::End => {
                let interest = start_balance * state.per_period_rate;
                (interest, start_balance + interest + payment)
            }
            Timing::Begin => {
                let after_payment = start_balance + payment;
                let interest = after_payment * state.per_period_rate;
                (interest, after_payment + interest)
            }
        };

        let principal_paid = -payment - interest;

        total_interest += interest;
        total_payments += -payment;

        schedule.push(ScheduleRow {
            period: (i + 1) as u32,
            start_balance,
            interest,
            payment,
            principal_paid,
            end_balance,
        });

        balance = end_balance;
    }

    Ok((
        schedule,
        ScheduleTotals {
            final_balance: balance,
            total_payments,
            total_interest,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Scenario, SolveFor};
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    fn fixed_state(pv: Money, pmt: Money, rate: Decimal, periods: u32) -> NormalizedScenario {
        NormalizedScenario {
            solve_for: SolveFor::Fv,
            scenario: Scenario::Loan,
            payment_mode: PaymentMode::Fixed,
            timing: Timing::End,
            pmt_freq: 12,
            pv,
            fv: Decimal::ZERO,
            pmt,
            nper: Decimal::from(periods),
            specific_pmt_period: 0,
            payments: vec![pmt; periods as usize],
            per_period_rate: rate,
        }
    }

    #[test]
    fn test_end_timing_accrual() {
        let state = fixed_state(dec!(1000), dec!(-500), dec!(0.10), 2);
        let (schedule, totals) = build(&state).unwrap();

        // Period 1: interest 100, balance 1000 + 100 - 500 = 600
        assert_eq!(schedule[0].interest, dec!(100.0));
        assert_eq!(schedule[0].principal_paid, dec!(400.0));
        assert_eq!(schedule[0].end_balance, dec!(600.0));

        // Period 2: interest 60, balance 600 + 60 - 500 = 160
        assert_eq!(schedule[1].interest, dec!(60.0));
        assert_eq!(schedule[1].end_balance, dec!(160.0));

        assert_eq!(totals.final_balance, dec!(160.0));
        assert_eq!(totals.total_payments, dec!(1000));
        assert_eq!(totals.total_interest, dec!(160.0));
    }

    #[test]
    fn test_begin_timing_applies_payment_first() {
        let state = {
            let mut s = fixed_state(dec!(1000), dec!(-500), dec!(0.10), 1);
            s.timing = Timing::Begin;
            s
        };
        let (schedule, _) = build(&state).unwrap();

        // Payment lands before accrual: interest on 500, not 1000
        assert_eq!(schedule[0].interest, dec!(50.0));
        assert_eq!(schedule[0].end_balance, dec!(550.0));
    }

    #[test]
    fn test_continuity_between_rows() {
        let state = fixed_state(dec!(10000), dec!(-332.14), dec!(0.01), 36);
        let (schedule, _) = build(&state).unwrap();

        for pair in schedule.windows(2) {
            assert_eq!(pair[0].end_balance, pair[1].start_balance);
        }
        assert_eq!(schedule[0].start_balance, dec!(10000));
    }

    #[test]
    fn test_flat_fallback_beyond_series() {
        // Empty series with fixed mode falls back to the flat payment
        let mut state = fixed_state(dec!(1000), dec!(-100), Decimal::ZERO, 3);
        state.payments = Vec::new();
        let (schedule, totals) = build(&state).unwrap();

        assert_eq!(schedule.len(), 3);
        assert!(schedule.iter().all(|row| row.payment == dec!(-100)));
        assert_eq!(totals.final_balance, dec!(700));
    }

    #[test]
    fn test_zero_length_schedule() {
        let mut state = fixed_state(dec!(1000), dec!(-100), dec!(0.05), 0);
        state.payments = Vec::new();
        let (schedule, totals) = build(&state).unwrap();

        assert!(schedule.is_empty());
        assert_eq!(totals.final_balance, dec!(1000));
        assert_eq!(totals.total_interest, Decimal::ZERO);
    }
}
