//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the fee
//! system. These fixtures are designed to be consistent and predictable for
//! unit tests.

use chrono::NaiveDate;
use once_cell::sync::Lazy;

use core_kernel::{AdmissionNumber, Money, SessionLabel, UserId};
use domain_fees::fee_structure::FeeTable;
use domain_fees::payment::{Payment, PaymentAllocation, PaymentMode, RecordedBy};
use domain_fees::student::Student;

/// The standard fee table for the active session, built once per test run
static STANDARD_TABLE: Lazy<FeeTable> =
    Lazy::new(|| FeeTable::standard(&SessionFixtures::active()));

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// A typical middle-class annual fee
    pub fn annual_fee() -> Money {
        Money::from_major(22000)
    }

    /// A small carry-over arrear
    pub fn small_arrear() -> Money {
        Money::from_major(1500)
    }

    /// A larger, older arrear
    pub fn old_arrear() -> Money {
        Money::from_major(2000)
    }

    /// A part-payment that does not clear any single bucket
    pub fn part_payment() -> Money {
        Money::from_major(500)
    }

    /// Zero
    pub fn zero() -> Money {
        Money::ZERO
    }
}

/// Fixture for session-label test data
pub struct SessionFixtures;

impl SessionFixtures {
    /// The active academic session
    pub fn active() -> SessionLabel {
        SessionLabel::new("2025-26").unwrap()
    }

    /// The session before the active one
    pub fn previous() -> SessionLabel {
        SessionLabel::new("2024-25").unwrap()
    }

    /// Two sessions back
    pub fn two_back() -> SessionLabel {
        SessionLabel::new("2023-24").unwrap()
    }
}

/// Fixture for date test data
pub struct DateFixtures;

impl DateFixtures {
    /// A date-of-birth for a class-5 student
    pub fn dob_class_five() -> NaiveDate {
        NaiveDate::from_ymd_opt(2015, 5, 20).unwrap()
    }

    /// A payment date early in the active session
    pub fn session_opening_payment() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, 10).unwrap()
    }

    /// A payment date mid-session
    pub fn mid_session_payment() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
    }
}

/// Fixture for the acting user snapshot
pub struct UserFixtures;

impl UserFixtures {
    /// The accountant who records most test payments
    pub fn accountant() -> RecordedBy {
        RecordedBy::new(UserId::new(), "Marcus Thorne")
    }
}

/// Fixture for student records
pub struct StudentFixtures;

impl StudentFixtures {
    /// A class-5 student carrying two years of arrears and one payment
    /// toward the current year
    pub fn with_arrears() -> Student {
        let mut student = Student::new(
            AdmissionNumber::new("S001").unwrap(),
            "Kavya Menon",
            "Arun Menon",
            "Latha Menon",
            DateFixtures::dob_class_five(),
        )
        .with_enrollment(SessionFixtures::active(), "5")
        .with_pending(SessionFixtures::two_back(), MoneyFixtures::old_arrear())
        .with_pending(SessionFixtures::previous(), MoneyFixtures::small_arrear())
        .with_current_year_fees(MoneyFixtures::annual_fee());

        student.payments.push(
            Payment::new(
                DateFixtures::session_opening_payment(),
                Money::from_major(10000),
                PaymentMode::Transfer,
                UserFixtures::accountant(),
            )
            .with_allocations(vec![PaymentAllocation::new(
                SessionFixtures::active(),
                Money::from_major(10000),
            )]),
        );
        student
    }

    /// A class-2 student with no history at all
    pub fn current_only() -> Student {
        Student::new(
            AdmissionNumber::new("S002").unwrap(),
            "Tara Iyer",
            "Sanjay Iyer",
            "Anita Iyer",
            NaiveDate::from_ymd_opt(2018, 2, 15).unwrap(),
        )
        .with_enrollment(SessionFixtures::active(), "2")
        .with_current_year_fees(Money::from_major(19000))
    }

    /// A class-8 student with a single prior-year bucket
    pub fn single_arrear() -> Student {
        Student::new(
            AdmissionNumber::new("S003").unwrap(),
            "Dev Nair",
            "Vikram Nair",
            "Sunita Nair",
            NaiveDate::from_ymd_opt(2012, 11, 30).unwrap(),
        )
        .with_enrollment(SessionFixtures::active(), "8")
        .with_pending(SessionFixtures::previous(), Money::from_major(5000))
        .with_current_year_fees(Money::from_major(28000))
    }

    /// The three standard fixture students
    pub fn all() -> Vec<Student> {
        vec![
            Self::with_arrears(),
            Self::current_only(),
            Self::single_arrear(),
        ]
    }
}

/// Fixture for the class fee table
pub struct FeeFixtures;

impl FeeFixtures {
    /// The standard table for the active session
    pub fn standard_table() -> FeeTable {
        STANDARD_TABLE.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_fees::balance::compute_balance;
    use domain_fees::validation::validate_student;

    #[test]
    fn test_fixture_students_are_valid() {
        for student in StudentFixtures::all() {
            let result = validate_student(&student);
            assert!(
                result.is_valid,
                "{} invalid: {:?}",
                student.admission_number, result.errors
            );
        }
    }

    #[test]
    fn test_arrears_fixture_balance() {
        let balance = compute_balance(&StudentFixtures::with_arrears(), &SessionFixtures::active());
        assert_eq!(balance.prior_pending, Money::from_major(3500));
        assert_eq!(balance.outstanding, Money::from_major(15500));
    }

    #[test]
    fn test_standard_table_matches_fixture_fees() {
        let table = FeeFixtures::standard_table();
        assert_eq!(
            table.fee_for("5", &SessionFixtures::active()),
            Some(MoneyFixtures::annual_fee())
        );
    }
}
