//! Payment allocation
//!
//! Splits one incoming payment across a student's year buckets. Two modes:
//! auto-apply walks the buckets oldest-first; manual mode validates a split
//! the clerk entered by hand. Both return a finalized allocation list with
//! zero-amount entries stripped.
//!
//! Bucket order relies on lexical ordering of session labels, which matches
//! chronology for the school's zero-padded "YYYY-YY" labels (see
//! `core_kernel::academic`).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use core_kernel::{Money, SessionLabel};

use crate::error::FeesError;
use crate::payment::PaymentAllocation;
use crate::student::PendingFee;

/// Policy for payment amounts beyond the student's known dues
///
/// The office chooses one policy for the whole installation; it is never
/// inferred per payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OverpaymentPolicy {
    /// Reject any amount exceeding the total outstanding balance
    #[default]
    Reject,
    /// Bank the excess against the current year; the current due goes
    /// negative and is shown as a credit
    CreditCurrentYear,
}

/// Guards shared by both modes: positive payment, well-formed buckets
fn check_inputs(payment_amount: Money, pending: &[PendingFee]) -> Result<(), FeesError> {
    if !payment_amount.is_positive() {
        return Err(FeesError::InvalidPaymentAmount(payment_amount.amount()));
    }
    let mut seen = BTreeSet::new();
    for bucket in pending {
        if !seen.insert(&bucket.year) {
            return Err(FeesError::DuplicatePendingYear(bucket.year.to_string()));
        }
    }
    Ok(())
}

/// Distributes `payment_amount` across the buckets oldest-first
///
/// Each prior-year bucket absorbs `min(remaining, bucket.amount)`; whatever
/// is left goes to the current year up to its due. Any remainder beyond all
/// known dues is handled per `policy`.
///
/// # Errors
///
/// - `InvalidPaymentAmount` for a non-positive payment
/// - `DuplicatePendingYear` if the bucket list violates its uniqueness invariant
/// - `AmountExceedsOutstanding` under `OverpaymentPolicy::Reject`
pub fn auto_allocate(
    payment_amount: Money,
    pending: &[PendingFee],
    active_year: &SessionLabel,
    current_due: Money,
    policy: OverpaymentPolicy,
) -> Result<Vec<PaymentAllocation>, FeesError> {
    check_inputs(payment_amount, pending)?;

    let mut buckets: Vec<&PendingFee> = pending.iter().collect();
    buckets.sort_by(|a, b| a.year.cmp(&b.year));

    let mut remaining = payment_amount;
    let mut allocations = Vec::new();

    for bucket in buckets {
        if remaining.is_zero() {
            break;
        }
        let applied = remaining.min(bucket.amount);
        if applied.is_positive() {
            allocations.push(PaymentAllocation::new(bucket.year.clone(), applied));
            remaining -= applied;
        }
    }

    if remaining.is_positive() {
        let due = current_due.max(Money::ZERO);
        let mut to_current = remaining.min(due);
        remaining -= to_current;

        if remaining.is_positive() {
            match policy {
                OverpaymentPolicy::Reject => {
                    let outstanding: Money =
                        pending.iter().map(|p| p.amount).sum::<Money>() + due;
                    return Err(FeesError::AmountExceedsOutstanding {
                        payment: payment_amount.amount(),
                        outstanding: outstanding.amount(),
                    });
                }
                OverpaymentPolicy::CreditCurrentYear => {
                    to_current += remaining;
                }
            }
        }

        if to_current.is_positive() {
            allocations.push(PaymentAllocation::new(active_year.clone(), to_current));
        }
    }

    Ok(allocations)
}

/// Validates a clerk-entered allocation list
///
/// Zero-amount entries are stripped first (the entry form seeds every bucket
/// with zero). The surviving entries must each name a known pending year or
/// the active year, be positive, not repeat a year, not exceed the named
/// bucket, and sum to the payment amount within the settlement tolerance.
/// An active-year entry above the current due is rejected under
/// `OverpaymentPolicy::Reject` and accepted under `CreditCurrentYear`; a
/// prior-year bucket can never be overpaid, since credit only has meaning
/// against the live year.
pub fn validate_manual(
    payment_amount: Money,
    candidate: &[PaymentAllocation],
    pending: &[PendingFee],
    active_year: &SessionLabel,
    current_due: Money,
    policy: OverpaymentPolicy,
) -> Result<Vec<PaymentAllocation>, FeesError> {
    check_inputs(payment_amount, pending)?;

    let entries: Vec<&PaymentAllocation> = candidate
        .iter()
        .filter(|a| !a.amount.is_zero())
        .collect();

    let mut seen = BTreeSet::new();
    for entry in &entries {
        if !entry.amount.is_positive() {
            return Err(FeesError::NonPositiveAllocation {
                year: entry.year.to_string(),
                amount: entry.amount.amount(),
            });
        }
        if !seen.insert(&entry.year) {
            return Err(FeesError::DuplicateAllocationYear(entry.year.to_string()));
        }

        match pending.iter().find(|p| p.year == entry.year) {
            Some(bucket) => {
                if entry.amount > bucket.amount {
                    return Err(FeesError::AllocationExceedsBucket {
                        year: entry.year.to_string(),
                        allocated: entry.amount.amount(),
                        pending: bucket.amount.amount(),
                    });
                }
            }
            None => {
                if &entry.year != active_year {
                    return Err(FeesError::UnknownAllocationYear(entry.year.to_string()));
                }
                let due = current_due.max(Money::ZERO);
                if policy == OverpaymentPolicy::Reject && entry.amount > due {
                    return Err(FeesError::AllocationExceedsCurrentDue {
                        allocated: entry.amount.amount(),
                        due: due.amount(),
                    });
                }
            }
        }
    }

    let allocated: Money = entries.iter().map(|a| a.amount).sum();
    if !(allocated - payment_amount).is_settled() {
        return Err(FeesError::AllocationSumMismatch {
            payment: payment_amount.amount(),
            allocated: allocated.amount(),
        });
    }

    Ok(entries.into_iter().cloned().collect())
}
