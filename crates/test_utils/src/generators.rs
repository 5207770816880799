//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data that
//! maintains domain invariants.

use proptest::prelude::*;

use core_kernel::{Money, SessionLabel};
use domain_fees::payment::PaymentMode;
use domain_fees::student::PendingFee;

/// Strategy for generating valid positive amounts in minor units (paise)
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for generating positive Money values
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(Money::from_minor)
}

/// Strategy for generating Money values that may be zero or negative
pub fn money_strategy() -> impl Strategy<Value = Money> {
    (-1_000_000_000i64..1_000_000_000i64).prop_map(Money::from_minor)
}

/// Strategy for generating zero-padded "YYYY-YY" session labels
///
/// The generated labels follow the school's convention, so lexical order is
/// chronological order.
pub fn session_label_strategy() -> impl Strategy<Value = SessionLabel> {
    (2015u32..2030u32).prop_map(|start| {
        SessionLabel::new(format!("{}-{:02}", start, (start + 1) % 100)).unwrap()
    })
}

/// Strategy for generating a payment mode
pub fn payment_mode_strategy() -> impl Strategy<Value = PaymentMode> {
    prop_oneof![
        Just(PaymentMode::Cash),
        Just(PaymentMode::Cheque),
        Just(PaymentMode::Transfer),
        Just(PaymentMode::Card),
    ]
}

/// Strategy for generating a well-formed pending-bucket list: distinct
/// prior years, positive amounts, oldest years not guaranteed first
pub fn pending_buckets_strategy() -> impl Strategy<Value = Vec<PendingFee>> {
    prop::collection::btree_set(2018u32..2025u32, 0..5).prop_flat_map(|years| {
        let years: Vec<u32> = years.into_iter().collect();
        let amounts = prop::collection::vec(100i64..50_000i64, years.len()..=years.len());
        amounts.prop_map(move |amounts| {
            years
                .iter()
                .zip(amounts)
                .map(|(start, amount)| {
                    PendingFee::new(
                        SessionLabel::new(format!("{}-{:02}", start, (start + 1) % 100)).unwrap(),
                        Money::from_major(amount),
                    )
                })
                .collect()
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_fees::allocation::{auto_allocate, OverpaymentPolicy};
    use domain_fees::balance::compute_balance;
    use domain_fees::ledger::apply_payment;
    use domain_fees::payment::Payment;

    use crate::assertions::{assert_balance_identity, assert_ledger_invariants};
    use crate::builders::StudentBuilder;
    use crate::fixtures::{DateFixtures, SessionFixtures, UserFixtures};

    proptest! {
        #[test]
        fn generated_buckets_have_distinct_years(buckets in pending_buckets_strategy()) {
            let mut years: Vec<_> = buckets.iter().map(|b| b.year.clone()).collect();
            let before = years.len();
            years.sort();
            years.dedup();
            prop_assert_eq!(before, years.len());
        }

        #[test]
        fn allocate_then_apply_preserves_ledger_invariants(
            buckets in pending_buckets_strategy(),
            payment_amount in 1i64..100_000i64,
            mode in payment_mode_strategy(),
        ) {
            let active = SessionFixtures::active();
            let mut student = StudentBuilder::new()
                .with_current_year_fees(Money::from_major(22000))
                .build();
            student.previous_pending = buckets;

            let before = compute_balance(&student, &active);
            let allocations = auto_allocate(
                Money::from_major(payment_amount),
                &student.previous_pending,
                &active,
                before.current_due,
                OverpaymentPolicy::Reject,
            );

            if let Ok(allocations) = allocations {
                let payment = Payment::new(
                    DateFixtures::mid_session_payment(),
                    Money::from_major(payment_amount),
                    mode,
                    UserFixtures::accountant(),
                )
                .with_allocations(allocations);

                let updated = apply_payment(student, payment, &active).unwrap();
                assert_ledger_invariants(&updated);

                let after = compute_balance(&updated, &active);
                assert_balance_identity(&after);
                prop_assert_eq!(
                    before.outstanding - after.outstanding,
                    Money::from_major(payment_amount)
                );
            }
        }
    }
}
