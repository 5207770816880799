//! Student records
//!
//! The student is the aggregate the ledger operates on: enrollments keyed by
//! session, pending-fee buckets carried over from prior years, the snapshot
//! of the current year's fee, and the append-only payment history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{AdmissionNumber, Money, PaymentId, SessionLabel};

use crate::payment::Payment;

/// One academic session's class placement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enrollment {
    /// Session the student attended, e.g. "2025-26"
    pub session: SessionLabel,
    /// Class for that session, e.g. "5" or "LKG"
    pub class_name: String,
}

impl Enrollment {
    pub fn new(session: SessionLabel, class_name: impl Into<String>) -> Self {
        Self {
            session,
            class_name: class_name.into(),
        }
    }
}

/// An amount still owed from a past academic year
///
/// Buckets only exist while something is owed: an amount at or below the
/// settlement tolerance is pruned by the ledger mutator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingFee {
    /// The year the fee was originally due
    pub year: SessionLabel,
    /// The amount still owed
    pub amount: Money,
}

impl PendingFee {
    pub fn new(year: SessionLabel, amount: Money) -> Self {
        Self { year, amount }
    }
}

/// A student record
///
/// Keyed by the immutable admission number. Everything except `payments` is
/// edited in place (last write wins, guarded by the `version` token);
/// `payments` is append-only and is the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    /// Immutable office-issued key
    pub admission_number: AdmissionNumber,
    pub student_name: String,
    pub father_name: String,
    pub mother_name: String,
    pub date_of_birth: NaiveDate,
    /// One entry per academic session, unique by session label
    pub enrollments: Vec<Enrollment>,
    /// Unpaid carry-over buckets, unique by year, amounts above tolerance
    pub previous_pending: Vec<PendingFee>,
    /// Fee for the active session, snapshotted from the fee table when the
    /// student was enrolled or the fee was last revised; not a live join
    pub current_year_fees: Money,
    /// Append-only payment history, order preserved
    pub payments: Vec<Payment>,
    pub notes: Option<String>,
    /// Concurrency token checked by conditional saves; bumped by the store
    #[serde(default)]
    pub version: u64,
}

impl Student {
    /// Creates a student with no enrollments, pending fees, or payments
    pub fn new(
        admission_number: AdmissionNumber,
        student_name: impl Into<String>,
        father_name: impl Into<String>,
        mother_name: impl Into<String>,
        date_of_birth: NaiveDate,
    ) -> Self {
        Self {
            admission_number,
            student_name: student_name.into(),
            father_name: father_name.into(),
            mother_name: mother_name.into(),
            date_of_birth,
            enrollments: Vec::new(),
            previous_pending: Vec::new(),
            current_year_fees: Money::ZERO,
            payments: Vec::new(),
            notes: None,
            version: 0,
        }
    }

    /// Adds an enrollment record
    pub fn with_enrollment(mut self, session: SessionLabel, class_name: impl Into<String>) -> Self {
        self.enrollments.push(Enrollment::new(session, class_name));
        self
    }

    /// Adds a pending-fee bucket
    pub fn with_pending(mut self, year: SessionLabel, amount: Money) -> Self {
        self.previous_pending.push(PendingFee::new(year, amount));
        self
    }

    /// Sets the current-year fee snapshot
    pub fn with_current_year_fees(mut self, fees: Money) -> Self {
        self.current_year_fees = fees;
        self
    }

    /// Sets free-text office notes
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Returns the enrollment for a session, if any
    pub fn enrollment_for(&self, session: &SessionLabel) -> Option<&Enrollment> {
        self.enrollments.iter().find(|e| &e.session == session)
    }

    /// Returns the class the student attends in a session, if enrolled
    pub fn class_for(&self, session: &SessionLabel) -> Option<&str> {
        self.enrollment_for(session).map(|e| e.class_name.as_str())
    }

    /// Returns true if the student attends `class_name` in `session`
    pub fn is_enrolled_in(&self, session: &SessionLabel, class_name: &str) -> bool {
        self.enrollments
            .iter()
            .any(|e| &e.session == session && e.class_name == class_name)
    }

    /// Returns the pending bucket for a year, if one remains
    pub fn pending_for(&self, year: &SessionLabel) -> Option<&PendingFee> {
        self.previous_pending.iter().find(|p| &p.year == year)
    }

    /// Sum of all prior-year pending amounts
    pub fn total_previous_pending(&self) -> Money {
        self.previous_pending.iter().map(|p| p.amount).sum()
    }

    /// Returns true if a payment with this id is already in the history
    pub fn has_payment(&self, id: PaymentId) -> bool {
        self.payments.iter().any(|p| p.id == id)
    }
}
