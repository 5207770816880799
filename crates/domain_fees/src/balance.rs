//! Balance calculation
//!
//! Pure derivation of a student's fee position from the stored record.
//! Callers recompute on every read; nothing here is cached, so a ledger
//! mutation is reflected by simply calling `compute_balance` again.

use serde::{Deserialize, Serialize};

use core_kernel::{Money, SessionLabel};

use crate::student::Student;

/// A student's computed fee position for one academic year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FeeBalance {
    /// Sum of all prior-year pending buckets
    pub prior_pending: Money,
    /// Total allocated to the given year across the payment history
    pub current_paid: Money,
    /// Current-year fee minus what was paid toward it. Negative means the
    /// year is overpaid; the credit is surfaced, never clamped to zero.
    pub current_due: Money,
    /// `prior_pending + current_due`
    pub outstanding: Money,
}

impl FeeBalance {
    /// Returns true if the student owes anything
    pub fn has_dues(&self) -> bool {
        self.outstanding.is_positive()
    }

    /// Returns true if the current year is overpaid
    pub fn has_credit(&self) -> bool {
        self.current_due.is_negative()
    }
}

/// Computes the fee position of `student` for `academic_year`
///
/// Pure function of the record: prior pending is summed from the carry-over
/// buckets, current paid from the allocation slices targeting
/// `academic_year`, and the due from the stored current-year fee snapshot.
pub fn compute_balance(student: &Student, academic_year: &SessionLabel) -> FeeBalance {
    let prior_pending = student.total_previous_pending();

    let current_paid: Money = student
        .payments
        .iter()
        .flat_map(|p| p.applied_to.iter())
        .filter(|a| &a.year == academic_year)
        .map(|a| a.amount)
        .sum();

    let current_due = student.current_year_fees - current_paid;

    FeeBalance {
        prior_pending,
        current_paid,
        current_due,
        outstanding: prior_pending + current_due,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::payment::{Payment, PaymentAllocation, PaymentMode, RecordedBy};
    use chrono::NaiveDate;
    use core_kernel::{AdmissionNumber, UserId};

    fn session(s: &str) -> SessionLabel {
        SessionLabel::new(s).unwrap()
    }

    fn student_with_history() -> Student {
        let paid = Payment::new(
            NaiveDate::from_ymd_opt(2025, 4, 10).unwrap(),
            Money::from_major(10000),
            PaymentMode::Transfer,
            RecordedBy::new(UserId::new(), "Marcus Thorne"),
        )
        .with_allocations(vec![PaymentAllocation::new(
            session("2025-26"),
            Money::from_major(10000),
        )]);

        let mut student = Student::new(
            AdmissionNumber::new("S001").unwrap(),
            "Kavya Menon",
            "Arun Menon",
            "Latha Menon",
            NaiveDate::from_ymd_opt(2015, 5, 20).unwrap(),
        )
        .with_enrollment(session("2025-26"), "5")
        .with_pending(session("2023-24"), Money::from_major(2000))
        .with_pending(session("2024-25"), Money::from_major(1500))
        .with_current_year_fees(Money::from_major(22000));
        student.payments.push(paid);
        student
    }

    #[test]
    fn test_balance_components() {
        let student = student_with_history();
        let balance = compute_balance(&student, &session("2025-26"));

        assert_eq!(balance.prior_pending, Money::from_major(3500));
        assert_eq!(balance.current_paid, Money::from_major(10000));
        assert_eq!(balance.current_due, Money::from_major(12000));
        assert_eq!(balance.outstanding, Money::from_major(15500));
        assert!(balance.has_dues());
        assert!(!balance.has_credit());
    }

    #[test]
    fn test_balance_is_stable_across_reads() {
        let student = student_with_history();
        let first = compute_balance(&student, &session("2025-26"));
        let second = compute_balance(&student, &session("2025-26"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_overpaid_year_shows_credit() {
        let mut student = student_with_history();
        student.current_year_fees = Money::from_major(8000);

        let balance = compute_balance(&student, &session("2025-26"));
        assert_eq!(balance.current_due, Money::from_major(-2000));
        assert!(balance.has_credit());
        // Prior dues still outweigh the credit here
        assert_eq!(balance.outstanding, Money::from_major(1500));
    }

    #[test]
    fn test_allocations_to_other_years_do_not_count_as_current_paid() {
        let student = student_with_history();
        let balance = compute_balance(&student, &session("2024-25"));

        // The only payment targeted 2025-26
        assert_eq!(balance.current_paid, Money::ZERO);
    }
}
