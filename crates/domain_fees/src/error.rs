//! Fee ledger domain errors

use core_kernel::{CoreError, PortError};
use rust_decimal::Decimal;
use thiserror::Error;

/// Errors that can occur in the fee ledger domain
///
/// Every engine function returns either a successful result or one of these;
/// nothing is logged-and-continued inside the allocation engine or the
/// ledger mutator. The sole batch-level exception is fee-revision fan-out,
/// which collects per-student failures into its report.
#[derive(Debug, Error)]
pub enum FeesError {
    /// Manual allocation does not sum to the payment amount
    #[error("Allocation does not sum to payment amount: payment={payment}, allocated={allocated}")]
    AllocationSumMismatch {
        payment: Decimal,
        allocated: Decimal,
    },

    /// Allocation names a year that is neither pending nor the active session
    #[error("Unknown allocation year: {0}")]
    UnknownAllocationYear(String),

    /// Allocation amount is zero or negative after zero-stripping
    #[error("Allocation for {year} must be positive, got {amount}")]
    NonPositiveAllocation {
        year: String,
        amount: Decimal,
    },

    /// The same year appears twice in one allocation list
    #[error("Duplicate allocation year: {0}")]
    DuplicateAllocationYear(String),

    /// The student record carries two pending buckets for one year
    #[error("Duplicate pending year: {0}")]
    DuplicatePendingYear(String),

    /// Payment is larger than everything the student owes
    #[error("Amount exceeds outstanding balance: payment={payment}, outstanding={outstanding}")]
    AmountExceedsOutstanding {
        payment: Decimal,
        outstanding: Decimal,
    },

    /// A prior-year allocation is larger than that year's pending amount
    #[error("Allocation for {year} exceeds the pending amount: allocated={allocated}, pending={pending}")]
    AllocationExceedsBucket {
        year: String,
        allocated: Decimal,
        pending: Decimal,
    },

    /// An active-year allocation is larger than the remaining current due
    #[error("Allocation for the current year exceeds the due: allocated={allocated}, due={due}")]
    AllocationExceedsCurrentDue {
        allocated: Decimal,
        due: Decimal,
    },

    /// The payment id already appears in the student's history
    #[error("Payment {0} has already been applied")]
    DuplicatePayment(String),

    /// Payment amount must be strictly positive
    #[error("Invalid payment amount: {0}")]
    InvalidPaymentAmount(Decimal),

    /// Fee amounts in the class fee table cannot be negative
    #[error("Fee amount cannot be negative: {0}")]
    NegativeFeeAmount(Decimal),

    /// The student record failed validation
    #[error("Invalid student record: {}", .errors.join("; "))]
    InvalidStudent {
        errors: Vec<String>,
    },

    /// The class is not present in the fee table
    #[error("Class not found in fee table: {0}")]
    ClassNotFound(String),

    /// No fee configured for the class/session pair
    #[error("No fee configured for class {class_name} in session {session}")]
    SessionFeeNotFound {
        class_name: String,
        session: String,
    },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Port(#[from] PortError),
}

impl FeesError {
    /// Returns true if this error wraps a persistence conflict the caller
    /// should resolve by re-fetching and retrying
    pub fn is_conflict(&self) -> bool {
        matches!(self, FeesError::Port(e) if e.is_conflict())
    }
}
