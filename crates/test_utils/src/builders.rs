//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible
//! defaults. These builders allow tests to specify only the relevant fields
//! while using defaults (including faker-generated names) for everything
//! else.

use chrono::NaiveDate;
use fake::faker::name::en::Name;
use fake::Fake;

use core_kernel::{AdmissionNumber, Money, SessionLabel};
use domain_fees::payment::{Payment, PaymentAllocation, PaymentMode, RecordedBy};
use domain_fees::student::{PendingFee, Student};

use crate::fixtures::{DateFixtures, SessionFixtures, UserFixtures};

/// Builder for constructing test student records
pub struct StudentBuilder {
    admission_number: AdmissionNumber,
    student_name: String,
    father_name: String,
    mother_name: String,
    date_of_birth: NaiveDate,
    enrollments: Vec<(SessionLabel, String)>,
    previous_pending: Vec<PendingFee>,
    current_year_fees: Money,
    notes: Option<String>,
}

impl Default for StudentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl StudentBuilder {
    /// Creates a builder with default values: a fresh admission number,
    /// faker names, an active-session class-5 enrollment, and the standard
    /// class-5 fee
    pub fn new() -> Self {
        Self {
            admission_number: AdmissionNumber::new(format!(
                "S{:05}",
                (10_000..100_000).fake::<u32>()
            ))
            .unwrap(),
            student_name: Name().fake(),
            father_name: Name().fake(),
            mother_name: Name().fake(),
            date_of_birth: DateFixtures::dob_class_five(),
            enrollments: vec![(SessionFixtures::active(), "5".to_string())],
            previous_pending: Vec::new(),
            current_year_fees: Money::from_major(22000),
            notes: None,
        }
    }

    /// Sets the admission number
    pub fn with_admission_number(mut self, admission_number: impl Into<String>) -> Self {
        self.admission_number = AdmissionNumber::new(admission_number).unwrap();
        self
    }

    /// Sets the student name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.student_name = name.into();
        self
    }

    /// Sets the date of birth
    pub fn with_date_of_birth(mut self, date_of_birth: NaiveDate) -> Self {
        self.date_of_birth = date_of_birth;
        self
    }

    /// Replaces the enrollment list
    pub fn with_enrollments(mut self, enrollments: Vec<(SessionLabel, String)>) -> Self {
        self.enrollments = enrollments;
        self
    }

    /// Adds an enrollment
    pub fn enrolled_in(mut self, session: SessionLabel, class_name: impl Into<String>) -> Self {
        self.enrollments.push((session, class_name.into()));
        self
    }

    /// Adds a prior-year pending bucket
    pub fn owing(mut self, year: SessionLabel, amount: Money) -> Self {
        self.previous_pending.push(PendingFee::new(year, amount));
        self
    }

    /// Sets the current-year fee snapshot
    pub fn with_current_year_fees(mut self, fees: Money) -> Self {
        self.current_year_fees = fees;
        self
    }

    /// Sets the office notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Builds the student record
    pub fn build(self) -> Student {
        let mut student = Student::new(
            self.admission_number,
            self.student_name,
            self.father_name,
            self.mother_name,
            self.date_of_birth,
        );
        for (session, class_name) in self.enrollments {
            student = student.with_enrollment(session, class_name);
        }
        student.previous_pending = self.previous_pending;
        student.current_year_fees = self.current_year_fees;
        student.notes = self.notes;
        student
    }
}

/// Builder for constructing test payments
pub struct PaymentBuilder {
    date: NaiveDate,
    amount: Money,
    mode: PaymentMode,
    allocations: Vec<PaymentAllocation>,
    recorded_by: RecordedBy,
}

impl Default for PaymentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PaymentBuilder {
    /// Creates a builder for a mid-session cash payment of 1000 with no
    /// allocations yet
    pub fn new() -> Self {
        Self {
            date: DateFixtures::mid_session_payment(),
            amount: Money::from_major(1000),
            mode: PaymentMode::Cash,
            allocations: Vec::new(),
            recorded_by: UserFixtures::accountant(),
        }
    }

    /// Sets the payment date
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Sets the amount
    pub fn of(mut self, amount: Money) -> Self {
        self.amount = amount;
        self
    }

    /// Sets the payment mode
    pub fn via(mut self, mode: PaymentMode) -> Self {
        self.mode = mode;
        self
    }

    /// Adds an allocation slice
    pub fn applied_to(mut self, year: SessionLabel, amount: Money) -> Self {
        self.allocations.push(PaymentAllocation::new(year, amount));
        self
    }

    /// Allocates the whole amount to a single year
    pub fn applied_wholly_to(mut self, year: SessionLabel) -> Self {
        self.allocations = vec![PaymentAllocation::new(year, self.amount)];
        self
    }

    /// Builds the payment
    pub fn build(self) -> Payment {
        Payment::new(self.date, self.amount, self.mode, self.recorded_by)
            .with_allocations(self.allocations)
    }
}
