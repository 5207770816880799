//! Fee Ledger Domain
//!
//! This crate implements the fee ledger for the school system: per-student
//! outstanding balances across academic years, deterministic allocation of
//! incoming payments across those years, and propagation of fee revisions to
//! enrolled students.
//!
//! # Ledger model
//!
//! Each student carries one pending-fee bucket per unpaid prior year plus a
//! derived current-year due:
//!
//! - The balance calculator recomputes all figures from the stored record on
//!   every read; nothing is cached.
//! - The allocation engine splits a payment across buckets oldest-first (or
//!   validates a manually entered split).
//! - The ledger mutator commits a payment and its bucket decrements as one
//!   document update; payment history is append-only.
//! - The fee-revision propagator fans a new class fee out to every student
//!   enrolled in that class for the active session.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_fees::{PaymentService, RecordPaymentRequest};
//!
//! let service = PaymentService::new(students, active_session);
//! let recorded = service.record_payment(request).await?;
//! println!("receipt {}", recorded.payment.receipt_no);
//! ```

pub mod allocation;
pub mod balance;
pub mod error;
pub mod fee_structure;
pub mod ledger;
pub mod payment;
pub mod ports;
pub mod reports;
pub mod services;
pub mod student;
pub mod validation;

pub use allocation::{auto_allocate, validate_manual, OverpaymentPolicy};
pub use balance::{compute_balance, FeeBalance};
pub use error::FeesError;
pub use fee_structure::{ClassFeeConfig, FeeTable};
pub use ledger::apply_payment;
pub use payment::{Payment, PaymentAllocation, PaymentMode, RecordedBy};
pub use ports::{FeeConfigPort, StudentPort};
pub use reports::{
    class_roster, collections_on, outstanding_by_class, payment_history, recent_payments,
    ClassOutstandingSummary, CollectionSummary, PaymentHistoryEntry,
};
pub use services::{
    FeeRevisionReport, FeeRevisionService, PaymentRecorded, PaymentService, RecordPaymentRequest,
    RegisterStudentRequest, RegistrationService, ReportingService, StudentUpdateFailure,
};
pub use student::{Enrollment, PendingFee, Student};
pub use validation::{validate_student, ValidationResult};
