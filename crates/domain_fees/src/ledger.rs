//! Ledger mutation
//!
//! Applies a confirmed payment to a student record: appends the payment to
//! the history and decrements the matched pending buckets. The caller
//! persists the returned record as one conditional save, so the payment and
//! its ledger effect commit together or not at all.

use core_kernel::SessionLabel;

use crate::error::FeesError;
use crate::payment::Payment;
use crate::student::Student;

/// Applies `payment` to `student`, returning the updated record
///
/// Validates everything before touching the record, then mutates:
///
/// - the payment is appended to the history (never reordered afterwards);
/// - each allocation naming a pending year is subtracted from that bucket;
///   buckets whose remainder falls within the settlement tolerance are
///   removed;
/// - allocations naming `active_year` leave `previous_pending` untouched;
///   the current-year due is derived, not stored.
///
/// This function is NOT idempotent: applying the same payment twice would
/// double-deduct. Re-application is prevented by the payment id already
/// being present in the history (`DuplicatePayment`).
///
/// # Errors
///
/// - `DuplicatePayment` if the payment id is already in the history
/// - `InvalidPaymentAmount` for a non-positive payment
/// - `AllocationSumMismatch` if the breakdown does not sum to the amount
/// - `UnknownAllocationYear` if a slice names neither a pending year nor
///   the active year
/// - `AllocationExceedsBucket` if a slice is larger than its bucket
pub fn apply_payment(
    mut student: Student,
    payment: Payment,
    active_year: &SessionLabel,
) -> Result<Student, FeesError> {
    if student.has_payment(payment.id) {
        return Err(FeesError::DuplicatePayment(payment.id.to_string()));
    }
    if !payment.amount.is_positive() {
        return Err(FeesError::InvalidPaymentAmount(payment.amount.amount()));
    }

    let allocated = payment.allocated_total();
    if !(allocated - payment.amount).is_settled() {
        return Err(FeesError::AllocationSumMismatch {
            payment: payment.amount.amount(),
            allocated: allocated.amount(),
        });
    }

    // Validate every slice before mutating anything
    for alloc in &payment.applied_to {
        if &alloc.year == active_year {
            continue;
        }
        let bucket = student
            .pending_for(&alloc.year)
            .ok_or_else(|| FeesError::UnknownAllocationYear(alloc.year.to_string()))?;
        if alloc.amount > bucket.amount {
            return Err(FeesError::AllocationExceedsBucket {
                year: alloc.year.to_string(),
                allocated: alloc.amount.amount(),
                pending: bucket.amount.amount(),
            });
        }
    }

    for alloc in &payment.applied_to {
        if &alloc.year == active_year {
            continue;
        }
        if let Some(bucket) = student
            .previous_pending
            .iter_mut()
            .find(|p| p.year == alloc.year)
        {
            bucket.amount -= alloc.amount;
        }
    }

    // Residue within tolerance counts as fully paid
    student.previous_pending.retain(|p| !p.amount.is_settled());

    student.payments.push(payment);
    Ok(student)
}
