//! Fee domain services
//!
//! Application services that orchestrate the engine against the persistence
//! ports: recording payments, registering students, revising class fees, and
//! producing reports. Services hold `Arc<dyn StudentPort>` /
//! `Arc<dyn FeeConfigPort>` handles; persistence is injected, never reached
//! through process-wide state.

use std::sync::Arc;

use chrono::NaiveDate;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{info, warn};

use core_kernel::{AdmissionNumber, CoreError, Money, PortError, SessionLabel};

use crate::allocation::{auto_allocate, validate_manual, OverpaymentPolicy};
use crate::balance::{compute_balance, FeeBalance};
use crate::error::FeesError;
use crate::fee_structure::ClassFeeConfig;
use crate::ledger::apply_payment;
use crate::payment::{Payment, PaymentAllocation, PaymentMode, RecordedBy};
use crate::ports::{FeeConfigPort, StudentPort};
use crate::reports::{
    class_roster, collections_on, outstanding_by_class, payment_history, recent_payments,
    ClassOutstandingSummary, CollectionSummary, PaymentHistoryEntry,
};
use crate::student::{PendingFee, Student};
use crate::validation::validate_student;

/// Default permit count for fee-revision fan-out
const DEFAULT_FANOUT_CONCURRENCY: usize = 8;

// ============================================================================
// Payments
// ============================================================================

/// Request to record one payment against a student
#[derive(Debug, Clone)]
pub struct RecordPaymentRequest {
    pub admission_number: AdmissionNumber,
    /// Date the money was taken
    pub date: NaiveDate,
    pub amount: Money,
    pub mode: PaymentMode,
    /// `None` auto-distributes oldest-first; `Some` is a clerk-entered split
    /// that will be validated
    pub allocations: Option<Vec<PaymentAllocation>>,
    /// Snapshot of the acting user for the receipt
    pub recorded_by: RecordedBy,
}

/// A recorded payment together with the student's new state
#[derive(Debug, Clone)]
pub struct PaymentRecorded {
    /// The stored student record after the ledger mutation
    pub student: Student,
    /// The payment as appended to the history
    pub payment: Payment,
}

/// Service for taking payments
pub struct PaymentService {
    students: Arc<dyn StudentPort>,
    active_session: SessionLabel,
    policy: OverpaymentPolicy,
}

impl PaymentService {
    /// Creates a payment service with the default overpayment policy
    pub fn new(students: Arc<dyn StudentPort>, active_session: SessionLabel) -> Self {
        Self {
            students,
            active_session,
            policy: OverpaymentPolicy::default(),
        }
    }

    /// Overrides the overpayment policy
    pub fn with_policy(mut self, policy: OverpaymentPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Records a payment: allocates, applies the ledger mutation, and saves
    /// the student as one conditional update
    ///
    /// The payment and its ledger effect are committed together: the mutated
    /// record is written by a single `save_student` keyed on the version read
    /// at the start. If a concurrent writer changed the record in between,
    /// the save fails with a conflict and nothing is persisted; the caller
    /// must re-fetch and retry.
    ///
    /// # Errors
    ///
    /// Allocation and ledger failures from the engine; `PortError` wrapped
    /// as `FeesError::Port` for fetch/save failures.
    pub async fn record_payment(
        &self,
        request: RecordPaymentRequest,
    ) -> Result<PaymentRecorded, FeesError> {
        let student = self.students.get_student(&request.admission_number).await?;
        let balance = compute_balance(&student, &self.active_session);

        let allocations = match &request.allocations {
            Some(candidate) => validate_manual(
                request.amount,
                candidate,
                &student.previous_pending,
                &self.active_session,
                balance.current_due,
                self.policy,
            )?,
            None => auto_allocate(
                request.amount,
                &student.previous_pending,
                &self.active_session,
                balance.current_due,
                self.policy,
            )?,
        };

        let payment = Payment::new(request.date, request.amount, request.mode, request.recorded_by)
            .with_allocations(allocations);

        let expected_version = student.version;
        let updated = apply_payment(student, payment.clone(), &self.active_session)?;
        let stored = self.students.save_student(&updated, expected_version).await?;

        info!(
            admission = %stored.admission_number,
            amount = %payment.amount,
            receipt = %payment.receipt_no,
            "payment recorded"
        );

        Ok(PaymentRecorded {
            student: stored,
            payment,
        })
    }

    /// Recomputes a student's balance from the stored record
    pub async fn outstanding(
        &self,
        admission_number: &AdmissionNumber,
    ) -> Result<FeeBalance, FeesError> {
        let student = self.students.get_student(admission_number).await?;
        Ok(compute_balance(&student, &self.active_session))
    }
}

// ============================================================================
// Registration
// ============================================================================

/// Request to register a student, as collected by the office form
///
/// Session labels and the admission number arrive as free text and are
/// parsed here; fully blank enrollment rows and empty pending rows are
/// dropped the way the form drops them.
#[derive(Debug, Clone)]
pub struct RegisterStudentRequest {
    pub admission_number: String,
    pub student_name: String,
    pub father_name: String,
    pub mother_name: String,
    pub date_of_birth: NaiveDate,
    /// `(session label, class name)` rows
    pub enrollments: Vec<(String, String)>,
    /// `(year label, amount)` rows of carry-over dues
    pub previous_pending: Vec<(String, Money)>,
    pub notes: Option<String>,
}

/// Service for maintaining the student registry
pub struct RegistrationService {
    students: Arc<dyn StudentPort>,
    fees: Arc<dyn FeeConfigPort>,
    active_session: SessionLabel,
}

impl RegistrationService {
    pub fn new(
        students: Arc<dyn StudentPort>,
        fees: Arc<dyn FeeConfigPort>,
        active_session: SessionLabel,
    ) -> Self {
        Self {
            students,
            fees,
            active_session,
        }
    }

    /// Registers a new student
    ///
    /// The current-year fee is snapshotted from the fee table for the
    /// active-session enrollment; students without an active enrollment
    /// start at zero.
    ///
    /// # Errors
    ///
    /// - `InvalidStudent` if the record fails registry validation
    /// - `SessionFeeNotFound` if the active-session class has no configured fee
    /// - `Conflict` (wrapped) if the admission number is already registered
    pub async fn register_student(
        &self,
        request: RegisterStudentRequest,
    ) -> Result<Student, FeesError> {
        let admission_number =
            AdmissionNumber::new(request.admission_number).map_err(CoreError::from)?;

        let mut student = Student::new(
            admission_number,
            request.student_name,
            request.father_name,
            request.mother_name,
            request.date_of_birth,
        );

        for (session, class_name) in request.enrollments {
            if session.trim().is_empty() && class_name.trim().is_empty() {
                continue;
            }
            let session = SessionLabel::new(session).map_err(CoreError::from)?;
            student = student.with_enrollment(session, class_name);
        }

        for (year, amount) in request.previous_pending {
            if year.trim().is_empty() || !amount.is_positive() {
                continue;
            }
            let year = SessionLabel::new(year).map_err(CoreError::from)?;
            student.previous_pending.push(PendingFee::new(year, amount));
        }

        if let Some(notes) = request.notes {
            student.notes = Some(notes);
        }

        if let Some(class_name) = student.class_for(&self.active_session) {
            let table = self.fees.get_class_fees().await?;
            let fee = table.fee_for(class_name, &self.active_session).ok_or_else(|| {
                FeesError::SessionFeeNotFound {
                    class_name: class_name.to_string(),
                    session: self.active_session.to_string(),
                }
            })?;
            student.current_year_fees = fee;
        }

        let validation = validate_student(&student);
        if !validation.is_valid {
            return Err(FeesError::InvalidStudent {
                errors: validation.errors,
            });
        }

        self.students.insert_student(&student).await?;

        info!(admission = %student.admission_number, "student registered");
        Ok(student)
    }

    /// Saves edits to an existing student record
    ///
    /// # Errors
    ///
    /// - `InvalidStudent` if the record fails registry validation
    /// - `Conflict` (wrapped) if a concurrent writer changed the record
    pub async fn update_student(&self, student: &Student) -> Result<Student, FeesError> {
        let validation = validate_student(student);
        if !validation.is_valid {
            return Err(FeesError::InvalidStudent {
                errors: validation.errors,
            });
        }
        Ok(self.students.save_student(student, student.version).await?)
    }

    /// Removes a student record
    pub async fn remove_student(
        &self,
        admission_number: &AdmissionNumber,
    ) -> Result<(), FeesError> {
        self.students.delete_student(admission_number).await?;
        Ok(())
    }
}

// ============================================================================
// Fee revision
// ============================================================================

/// One student the fan-out could not update
#[derive(Debug)]
pub struct StudentUpdateFailure {
    pub admission_number: AdmissionNumber,
    pub error: PortError,
}

/// Outcome of a fee revision
///
/// `updated` and `failed` are only populated for active-session revisions;
/// past sessions are historical and never fan out.
#[derive(Debug)]
pub struct FeeRevisionReport {
    pub session: SessionLabel,
    pub new_amount: Money,
    /// The class configuration as persisted after the revision
    pub updated_config: ClassFeeConfig,
    /// Students whose fee snapshot was refreshed, in admission-number order
    pub updated: Vec<AdmissionNumber>,
    /// Per-student failures; the batch itself never aborts on these, and
    /// retrying is the caller's decision
    pub failed: Vec<StudentUpdateFailure>,
}

/// Service for revising class fees and propagating the change
pub struct FeeRevisionService {
    students: Arc<dyn StudentPort>,
    fees: Arc<dyn FeeConfigPort>,
    active_session: SessionLabel,
    max_concurrent_updates: usize,
}

impl FeeRevisionService {
    pub fn new(
        students: Arc<dyn StudentPort>,
        fees: Arc<dyn FeeConfigPort>,
        active_session: SessionLabel,
    ) -> Self {
        Self {
            students,
            fees,
            active_session,
            max_concurrent_updates: DEFAULT_FANOUT_CONCURRENCY,
        }
    }

    /// Overrides the fan-out concurrency bound
    pub fn with_max_concurrent_updates(mut self, max: usize) -> Self {
        self.max_concurrent_updates = max.max(1);
        self
    }

    /// Sets the fee for a class/session pair and propagates it
    ///
    /// The table change is persisted first. When `session` is the active
    /// academic year, every student enrolled in `(session, class_name)` has
    /// their `current_year_fees` snapshot refreshed; students enrolled in
    /// the class for a past session are untouched. The per-student saves run
    /// as a bounded-concurrency batch and individual failures land in the
    /// report instead of aborting it.
    ///
    /// # Errors
    ///
    /// - `NegativeFeeAmount` / `ClassNotFound` from the table update
    /// - `PortError` (wrapped) if loading or saving the table, or listing
    ///   students, fails; these abort before any fan-out
    pub async fn revise_fee(
        &self,
        class_name: &str,
        session: &SessionLabel,
        new_amount: Money,
    ) -> Result<FeeRevisionReport, FeesError> {
        let mut table = self.fees.get_class_fees().await?;
        table.set_fee(class_name, session.clone(), new_amount)?;
        self.fees.save_class_fees(&table).await?;

        let updated_config = table
            .class(class_name)
            .cloned()
            .ok_or_else(|| FeesError::ClassNotFound(class_name.to_string()))?;

        let mut report = FeeRevisionReport {
            session: session.clone(),
            new_amount,
            updated_config,
            updated: Vec::new(),
            failed: Vec::new(),
        };

        if session != &self.active_session {
            // Past-year fees are frozen history; only the table changes
            return Ok(report);
        }

        let affected: Vec<Student> = self
            .students
            .list_students()
            .await?
            .into_iter()
            .filter(|s| s.is_enrolled_in(session, class_name))
            .collect();

        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_updates));
        let mut tasks = JoinSet::new();

        for mut student in affected {
            let semaphore = semaphore.clone();
            let students = self.students.clone();
            tasks.spawn(async move {
                let admission = student.admission_number.clone();
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return (
                            admission,
                            Err(PortError::internal("fan-out semaphore closed")),
                        )
                    }
                };
                let expected_version = student.version;
                student.current_year_fees = new_amount;
                let result = students
                    .save_student(&student, expected_version)
                    .await
                    .map(|_| ());
                (admission, result)
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((admission, Ok(()))) => report.updated.push(admission),
                Ok((admission, Err(error))) => {
                    warn!(admission = %admission, %error, "fee revision failed for student");
                    report.failed.push(StudentUpdateFailure {
                        admission_number: admission,
                        error,
                    });
                }
                Err(join_error) => {
                    warn!(%join_error, "fee revision task did not complete");
                }
            }
        }

        report.updated.sort();
        report
            .failed
            .sort_by(|a, b| a.admission_number.cmp(&b.admission_number));

        info!(
            class = %report.updated_config.class_name,
            session = %report.session,
            amount = %report.new_amount,
            updated = report.updated.len(),
            failed = report.failed.len(),
            "class fee revised"
        );

        Ok(report)
    }
}

// ============================================================================
// Reporting
// ============================================================================

/// Read-side service over the student registry
pub struct ReportingService {
    students: Arc<dyn StudentPort>,
    active_session: SessionLabel,
}

impl ReportingService {
    pub fn new(students: Arc<dyn StudentPort>, active_session: SessionLabel) -> Self {
        Self {
            students,
            active_session,
        }
    }

    /// Outstanding balances grouped by class for the active session
    pub async fn outstanding_by_class(&self) -> Result<Vec<ClassOutstandingSummary>, FeesError> {
        let students = self.students.list_students().await?;
        Ok(outstanding_by_class(&students, &self.active_session))
    }

    /// All payments across the school, newest first
    pub async fn payment_history(&self) -> Result<Vec<PaymentHistoryEntry>, FeesError> {
        let students = self.students.list_students().await?;
        Ok(payment_history(&students))
    }

    /// The most recent `limit` payments
    pub async fn recent_payments(
        &self,
        limit: usize,
    ) -> Result<Vec<PaymentHistoryEntry>, FeesError> {
        let students = self.students.list_students().await?;
        Ok(recent_payments(&students, limit))
    }

    /// Collections taken on a single day
    pub async fn collections_on(&self, date: NaiveDate) -> Result<CollectionSummary, FeesError> {
        let students = self.students.list_students().await?;
        Ok(collections_on(&students, date))
    }

    /// Students attending a class this session, sorted by name
    pub async fn class_roster(&self, class_name: &str) -> Result<Vec<Student>, FeesError> {
        let students = self.students.list_students().await?;
        Ok(class_roster(&students, &self.active_session, class_name)
            .into_iter()
            .cloned()
            .collect())
    }
}
