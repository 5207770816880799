//! Custom Test Assertions
//!
//! Provides specialized assertion helpers for domain types that give more
//! meaningful error messages than standard assertions.

use rust_decimal::Decimal;

use core_kernel::Money;
use domain_fees::balance::FeeBalance;
use domain_fees::payment::Payment;
use domain_fees::student::Student;

/// Asserts that two Money values are equal within a tolerance
///
/// # Panics
///
/// Panics if the amounts differ by more than `tolerance`
pub fn assert_money_approx_eq(actual: Money, expected: Money, tolerance: Decimal) {
    let diff = (actual - expected).abs();
    assert!(
        diff.amount() <= tolerance,
        "Money amounts differ by more than tolerance: actual={}, expected={}, diff={}, tolerance={}",
        actual,
        expected,
        diff,
        tolerance
    );
}

/// Asserts that a Money value is strictly positive
pub fn assert_money_positive(money: Money) {
    assert!(money.is_positive(), "Expected positive money, got {}", money);
}

/// Asserts that a payment's allocation breakdown sums to its amount
pub fn assert_allocations_balanced(payment: &Payment) {
    let allocated = payment.allocated_total();
    assert!(
        (allocated - payment.amount).is_settled(),
        "Payment {} is not balanced: amount={}, allocated={}",
        payment.receipt_no,
        payment.amount,
        allocated
    );
    assert!(
        payment.applied_to.iter().all(|a| a.amount.is_positive()),
        "Payment {} carries a non-positive allocation slice",
        payment.receipt_no
    );
}

/// Asserts the balance identity: outstanding = prior pending + current due
pub fn assert_balance_identity(balance: &FeeBalance) {
    assert_eq!(
        balance.outstanding,
        balance.prior_pending + balance.current_due,
        "Balance identity violated: {:?}",
        balance
    );
}

/// Asserts the student record's ledger invariants: unique pending years with
/// amounts above the settlement tolerance, and balanced payment history
pub fn assert_ledger_invariants(student: &Student) {
    let mut years = std::collections::BTreeSet::new();
    for pending in &student.previous_pending {
        assert!(
            !pending.amount.is_settled() && !pending.amount.is_negative(),
            "Student {} carries a settled pending bucket for {}",
            student.admission_number,
            pending.year
        );
        assert!(
            years.insert(&pending.year),
            "Student {} carries duplicate pending year {}",
            student.admission_number,
            pending.year
        );
    }

    for payment in &student.payments {
        assert_allocations_balanced(payment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{PaymentBuilder, StudentBuilder};
    use crate::fixtures::{SessionFixtures, StudentFixtures};
    use domain_fees::balance::compute_balance;
    use rust_decimal_macros::dec;

    #[test]
    fn test_approx_eq_within_tolerance() {
        assert_money_approx_eq(
            Money::new(dec!(100.00)),
            Money::new(dec!(100.01)),
            dec!(0.01),
        );
    }

    #[test]
    #[should_panic(expected = "differ by more than tolerance")]
    fn test_approx_eq_beyond_tolerance_panics() {
        assert_money_approx_eq(
            Money::new(dec!(100.00)),
            Money::new(dec!(100.05)),
            dec!(0.01),
        );
    }

    #[test]
    fn test_fixture_students_satisfy_invariants() {
        for student in StudentFixtures::all() {
            assert_ledger_invariants(&student);
            assert_balance_identity(&compute_balance(&student, &SessionFixtures::active()));
        }
    }

    #[test]
    #[should_panic(expected = "not balanced")]
    fn test_unbalanced_payment_detected() {
        let payment = PaymentBuilder::new()
            .of(Money::from_major(1000))
            .applied_to(SessionFixtures::previous(), Money::from_major(400))
            .build();
        assert_allocations_balanced(&payment);
    }

    #[test]
    #[should_panic(expected = "duplicate pending year")]
    fn test_duplicate_pending_detected() {
        let student = StudentBuilder::new()
            .owing(SessionFixtures::previous(), Money::from_major(100))
            .owing(SessionFixtures::previous(), Money::from_major(200))
            .build();
        assert_ledger_invariants(&student);
    }
}
