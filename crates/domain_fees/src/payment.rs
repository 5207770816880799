//! Payment records
//!
//! This module holds the payment record appended to a student's history and
//! the allocation breakdown that splits one payment across year buckets.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{Money, PaymentId, ReceiptNumber, SessionLabel, UserId};

/// Payment mode
///
/// The closed set of rails the fee office accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMode {
    Cash,
    Cheque,
    /// Bank or app transfer
    Transfer,
    Card,
}

/// Who recorded the payment
///
/// A denormalized snapshot of the acting user taken at write time, not a
/// foreign key: receipts keep showing the recording clerk's name even after
/// the user account is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedBy {
    pub id: UserId,
    pub name: String,
}

impl RecordedBy {
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

/// One slice of a payment applied to a single year bucket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentAllocation {
    /// The year the slice pays down ("2025-26" for the current year)
    pub year: SessionLabel,
    /// The slice amount, always positive in a persisted allocation
    pub amount: Money,
}

impl PaymentAllocation {
    pub fn new(year: SessionLabel, amount: Money) -> Self {
        Self { year, amount }
    }
}

/// A fee payment
///
/// Once appended to a student's history a payment is never reordered or
/// mutated; `applied_to` must sum exactly to `amount`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    /// Unique identifier; uniqueness is what prevents double application
    pub id: PaymentId,
    /// Date the payment was taken
    pub date: NaiveDate,
    /// Total amount paid
    pub amount: Money,
    /// Payment rail
    pub mode: PaymentMode,
    /// Breakdown across year buckets; positive amounts summing to `amount`
    pub applied_to: Vec<PaymentAllocation>,
    /// Printed on the receipt handed to the guardian
    pub receipt_no: ReceiptNumber,
    /// Snapshot of the acting user
    pub recorded_by: RecordedBy,
}

impl Payment {
    /// Creates a payment with an empty allocation breakdown
    ///
    /// The id is a time-ordered v7 identifier and the receipt number is
    /// derived from it, so both are unique without a central counter.
    pub fn new(date: NaiveDate, amount: Money, mode: PaymentMode, recorded_by: RecordedBy) -> Self {
        let id = PaymentId::new_v7();
        let receipt_no = ReceiptNumber::for_payment(date, &id);
        Self {
            id,
            date,
            amount,
            mode,
            applied_to: Vec::new(),
            receipt_no,
            recorded_by,
        }
    }

    /// Sets the allocation breakdown
    pub fn with_allocations(mut self, allocations: Vec<PaymentAllocation>) -> Self {
        self.applied_to = allocations;
        self
    }

    /// Sum of the allocation slices
    pub fn allocated_total(&self) -> Money {
        self.applied_to.iter().map(|a| a.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recorded_by() -> RecordedBy {
        RecordedBy::new(UserId::new(), "Marcus Thorne")
    }

    #[test]
    fn test_payment_gets_unique_id_and_receipt() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
        let a = Payment::new(date, Money::from_major(10000), PaymentMode::Cash, recorded_by());
        let b = Payment::new(date, Money::from_major(10000), PaymentMode::Cash, recorded_by());

        assert_ne!(a.id, b.id);
        assert_ne!(a.receipt_no, b.receipt_no);
        assert!(a.receipt_no.as_str().starts_with("R20250410-"));
    }

    #[test]
    fn test_allocated_total() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 10).unwrap();
        let payment = Payment::new(date, Money::from_major(3500), PaymentMode::Transfer, recorded_by())
            .with_allocations(vec![
                PaymentAllocation::new(SessionLabel::new("2023-24").unwrap(), Money::from_major(2000)),
                PaymentAllocation::new(SessionLabel::new("2024-25").unwrap(), Money::from_major(1500)),
            ]);

        assert_eq!(payment.allocated_total(), payment.amount);
    }

    #[test]
    fn test_recorded_by_is_a_value_snapshot() {
        let user = UserId::new();
        let by = RecordedBy::new(user, "Lena Petrova");
        let json = serde_json::to_string(&by).unwrap();
        let back: RecordedBy = serde_json::from_str(&json).unwrap();
        assert_eq!(back, by);
    }
}
