//! Comprehensive tests for domain_fees

use chrono::NaiveDate;
use rust_decimal_macros::dec;

use core_kernel::{AdmissionNumber, Money, SessionLabel, UserId};

use domain_fees::allocation::{auto_allocate, validate_manual, OverpaymentPolicy};
use domain_fees::balance::compute_balance;
use domain_fees::error::FeesError;
use domain_fees::fee_structure::FeeTable;
use domain_fees::ledger::apply_payment;
use domain_fees::payment::{Payment, PaymentAllocation, PaymentMode, RecordedBy};
use domain_fees::student::{PendingFee, Student};
use domain_fees::validation::validate_student;

fn session(s: &str) -> SessionLabel {
    SessionLabel::new(s).unwrap()
}

fn active() -> SessionLabel {
    session("2025-26")
}

fn clerk() -> RecordedBy {
    RecordedBy::new(UserId::new(), "Marcus Thorne")
}

/// A class-5 student with two years of arrears and one prior payment
fn student_with_arrears() -> Student {
    let mut student = Student::new(
        AdmissionNumber::new("S001").unwrap(),
        "Kavya Menon",
        "Arun Menon",
        "Latha Menon",
        NaiveDate::from_ymd_opt(2015, 5, 20).unwrap(),
    )
    .with_enrollment(active(), "5")
    .with_pending(session("2023-24"), Money::from_major(2000))
    .with_pending(session("2024-25"), Money::from_major(1500))
    .with_current_year_fees(Money::from_major(22000));

    student.payments.push(
        Payment::new(
            NaiveDate::from_ymd_opt(2025, 4, 10).unwrap(),
            Money::from_major(10000),
            PaymentMode::Transfer,
            clerk(),
        )
        .with_allocations(vec![PaymentAllocation::new(
            active(),
            Money::from_major(10000),
        )]),
    );
    student
}

// ============================================================================
// Balance Tests
// ============================================================================

mod balance_tests {
    use super::*;

    #[test]
    fn test_outstanding_is_pending_plus_current_due() {
        let student = student_with_arrears();
        let balance = compute_balance(&student, &active());

        assert_eq!(balance.prior_pending, Money::from_major(3500));
        assert_eq!(balance.current_paid, Money::from_major(10000));
        assert_eq!(balance.current_due, Money::from_major(12000));
        assert_eq!(
            balance.outstanding,
            balance.prior_pending + balance.current_due
        );
    }

    #[test]
    fn test_recomputation_is_call_order_independent() {
        let student = student_with_arrears();

        let a = compute_balance(&student, &active());
        let _other_year = compute_balance(&student, &session("2024-25"));
        let b = compute_balance(&student, &active());

        assert_eq!(a, b);
    }

    #[test]
    fn test_negative_due_is_not_clamped() {
        let mut student = student_with_arrears();
        student.current_year_fees = Money::from_major(9000);

        let balance = compute_balance(&student, &active());
        assert_eq!(balance.current_due, Money::from_major(-1000));
        assert!(balance.has_credit());
    }
}

// ============================================================================
// Allocation Tests
// ============================================================================

mod allocation_tests {
    use super::*;

    #[test]
    fn test_part_payment_goes_wholly_to_oldest_bucket() {
        // Pending [2023-24: 2000, 2024-25: 1500]; 1500 goes wholly to the
        // oldest year
        let student = student_with_arrears();
        let allocations = auto_allocate(
            Money::from_major(1500),
            &student.previous_pending,
            &active(),
            Money::from_major(12000),
            OverpaymentPolicy::Reject,
        )
        .unwrap();

        assert_eq!(
            allocations,
            vec![PaymentAllocation::new(
                session("2023-24"),
                Money::from_major(1500)
            )]
        );
    }

    #[test]
    fn test_allocation_never_sums_above_payment() {
        let student = student_with_arrears();
        for amount in [1, 500, 3500, 15500] {
            let allocations = auto_allocate(
                Money::from_major(amount),
                &student.previous_pending,
                &active(),
                Money::from_major(12000),
                OverpaymentPolicy::Reject,
            )
            .unwrap();

            let total: Money = allocations.iter().map(|a| a.amount).sum();
            assert_eq!(total, Money::from_major(amount));
        }
    }

    #[test]
    fn test_manual_split_one_rupee_short_is_rejected() {
        // Payment amount 10000, allocations 4000 + 5999 = 9999 → rejected
        let pending = vec![PendingFee::new(session("2024-25"), Money::from_major(4000))];
        let candidate = vec![
            PaymentAllocation::new(session("2024-25"), Money::from_major(4000)),
            PaymentAllocation::new(active(), Money::from_major(5999)),
        ];

        let result = validate_manual(
            Money::from_major(10000),
            &candidate,
            &pending,
            &active(),
            Money::from_major(22000),
            OverpaymentPolicy::Reject,
        );

        assert!(matches!(
            result,
            Err(FeesError::AllocationSumMismatch { payment, allocated })
                if payment == dec!(10000) && allocated == dec!(9999)
        ));
    }

    #[test]
    fn test_zero_entries_are_stripped_from_output() {
        let student = student_with_arrears();
        let candidate = vec![
            PaymentAllocation::new(session("2023-24"), Money::from_major(2000)),
            PaymentAllocation::new(session("2024-25"), Money::ZERO),
            PaymentAllocation::new(active(), Money::ZERO),
        ];

        let allocations = validate_manual(
            Money::from_major(2000),
            &candidate,
            &student.previous_pending,
            &active(),
            Money::from_major(12000),
            OverpaymentPolicy::Reject,
        )
        .unwrap();

        assert_eq!(allocations.len(), 1);
        assert!(allocations.iter().all(|a| a.amount.is_positive()));
    }
}

// ============================================================================
// Ledger Tests
// ============================================================================

mod ledger_tests {
    use super::*;

    #[test]
    fn test_exact_bucket_payment_removes_bucket() {
        let mut student = student_with_arrears();
        student.previous_pending =
            vec![PendingFee::new(session("2024-25"), Money::from_major(500))];

        let payment = Payment::new(
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            Money::from_major(500),
            PaymentMode::Cash,
            clerk(),
        )
        .with_allocations(vec![PaymentAllocation::new(
            session("2024-25"),
            Money::from_major(500),
        )]);

        let updated = apply_payment(student, payment, &active()).unwrap();
        assert!(updated.previous_pending.is_empty());
    }

    #[test]
    fn test_allocate_apply_recompute_round_trip() {
        // For any valid allocation, applying the payment reduces the
        // outstanding balance by exactly the payment amount
        let student = student_with_arrears();
        let before = compute_balance(&student, &active());

        for amount in [200, 2000, 3500, 9000] {
            let payment_amount = Money::from_major(amount);
            let allocations = auto_allocate(
                payment_amount,
                &student.previous_pending,
                &active(),
                before.current_due,
                OverpaymentPolicy::Reject,
            )
            .unwrap();

            let payment = Payment::new(
                NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                payment_amount,
                PaymentMode::Cheque,
                clerk(),
            )
            .with_allocations(allocations);

            let updated = apply_payment(student.clone(), payment, &active()).unwrap();
            let after = compute_balance(&updated, &active());

            assert_eq!(before.outstanding - after.outstanding, payment_amount);
        }
    }

    #[test]
    fn test_payment_history_is_append_only() {
        let student = student_with_arrears();
        let first_receipt = student.payments[0].receipt_no.clone();

        let payment = Payment::new(
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            Money::from_major(1000),
            PaymentMode::Card,
            clerk(),
        )
        .with_allocations(vec![PaymentAllocation::new(
            session("2023-24"),
            Money::from_major(1000),
        )]);

        let updated = apply_payment(student, payment, &active()).unwrap();

        assert_eq!(updated.payments.len(), 2);
        assert_eq!(updated.payments[0].receipt_no, first_receipt);
    }

    #[test]
    fn test_double_application_is_refused() {
        let student = student_with_arrears();
        let payment = Payment::new(
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
            Money::from_major(1000),
            PaymentMode::Cash,
            clerk(),
        )
        .with_allocations(vec![PaymentAllocation::new(
            session("2023-24"),
            Money::from_major(1000),
        )]);

        let once = apply_payment(student, payment.clone(), &active()).unwrap();
        let balance_after_once = compute_balance(&once, &active());

        let twice = apply_payment(once.clone(), payment, &active());
        assert!(matches!(twice, Err(FeesError::DuplicatePayment(_))));

        // The refused second application left the record unchanged
        assert_eq!(compute_balance(&once, &active()), balance_after_once);
    }
}

// ============================================================================
// Fee Structure Tests
// ============================================================================

mod fee_structure_tests {
    use super::*;

    #[test]
    fn test_standard_table_session_scoping() {
        let table = FeeTable::standard(&active());

        assert_eq!(
            table.fee_for("5", &active()),
            Some(Money::from_major(22000))
        );
        // No fee configured for a session the table has never seen
        assert_eq!(table.fee_for("5", &session("2019-20")), None);
        assert_eq!(table.fee_for("unknown", &active()), None);
    }

    #[test]
    fn test_revising_one_pair_leaves_others_untouched() {
        let mut table = FeeTable::standard(&active());
        table
            .set_fee("5", active(), Money::from_major(23000))
            .unwrap();

        assert_eq!(
            table.fee_for("5", &active()),
            Some(Money::from_major(23000))
        );
        assert_eq!(
            table.fee_for("4", &active()),
            Some(Money::from_major(21000))
        );
        assert_eq!(
            table.fee_for("6", &active()),
            Some(Money::from_major(24000))
        );
    }
}

// ============================================================================
// Validation Tests
// ============================================================================

mod validation_tests {
    use super::*;

    #[test]
    fn test_arrears_student_is_valid() {
        let result = validate_student(&student_with_arrears());
        assert!(result.is_valid, "errors: {:?}", result.errors);
    }

    #[test]
    fn test_settled_pending_bucket_is_invalid() {
        // A bucket within the settlement tolerance should have been pruned
        let mut student = student_with_arrears();
        student.previous_pending.push(PendingFee::new(
            session("2022-23"),
            Money::new(dec!(0.01)),
        ));

        let result = validate_student(&student);
        assert!(!result.is_valid);
    }
}

// ============================================================================
// Serialization Tests
// ============================================================================

mod serialization_tests {
    use super::*;

    #[test]
    fn test_student_round_trips_through_json() {
        let student = student_with_arrears();
        let json = serde_json::to_string(&student).unwrap();
        let back: Student = serde_json::from_str(&json).unwrap();

        assert_eq!(back.admission_number, student.admission_number);
        assert_eq!(back.previous_pending, student.previous_pending);
        assert_eq!(back.payments, student.payments);
        assert_eq!(back.version, student.version);
    }

    #[test]
    fn test_fee_table_round_trips_through_json() {
        let table = FeeTable::standard(&active());
        let json = serde_json::to_string(&table).unwrap();
        let back: FeeTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);
    }

    #[test]
    fn test_legacy_record_without_version_deserializes() {
        // Records written before the version token default to zero
        let json = r#"{
            "admission_number": "S050",
            "student_name": "Meera Das",
            "father_name": "Anil Das",
            "mother_name": "Rina Das",
            "date_of_birth": "2014-03-02",
            "enrollments": [{"session": "2025-26", "class_name": "6"}],
            "previous_pending": [],
            "current_year_fees": 24000,
            "payments": [],
            "notes": null
        }"#;

        let student: Student = serde_json::from_str(json).unwrap();
        assert_eq!(student.version, 0);
        assert_eq!(student.current_year_fees, Money::from_major(24000));
    }
}
