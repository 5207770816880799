//! Fee reports
//!
//! Pure report derivations over student lists. The reporting service wraps
//! these with a fetch from the student port; nothing here touches
//! persistence.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use core_kernel::{AdmissionNumber, Money, SessionLabel};

use crate::balance::compute_balance;
use crate::payment::Payment;
use crate::student::Student;

/// Outstanding position of one class for the active session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassOutstandingSummary {
    pub class_name: String,
    /// Students enrolled in the class this session
    pub total_students: usize,
    /// Of those, how many owe anything
    pub students_with_dues: usize,
    /// Sum of outstanding balances of the students with dues
    pub total_outstanding: Money,
}

/// One payment joined with the student it belongs to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentHistoryEntry {
    pub admission_number: AdmissionNumber,
    pub student_name: String,
    pub payment: Payment,
}

/// Collections taken on a single day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSummary {
    pub date: NaiveDate,
    pub total_collected: Money,
    pub payment_count: usize,
}

/// Outstanding balances grouped by class for the active session
///
/// Students without an active-session enrollment are not counted anywhere.
/// Classes are returned in lexical name order.
pub fn outstanding_by_class(
    students: &[Student],
    active_year: &SessionLabel,
) -> Vec<ClassOutstandingSummary> {
    let mut by_class: BTreeMap<String, ClassOutstandingSummary> = BTreeMap::new();

    for student in students {
        let Some(class_name) = student.class_for(active_year) else {
            continue;
        };
        let entry = by_class
            .entry(class_name.to_string())
            .or_insert_with(|| ClassOutstandingSummary {
                class_name: class_name.to_string(),
                total_students: 0,
                students_with_dues: 0,
                total_outstanding: Money::ZERO,
            });
        entry.total_students += 1;

        let balance = compute_balance(student, active_year);
        if balance.has_dues() {
            entry.students_with_dues += 1;
            entry.total_outstanding += balance.outstanding;
        }
    }

    by_class.into_values().collect()
}

/// All payments across all students, newest first
///
/// Ties on the date are broken by receipt number so the listing is stable.
pub fn payment_history(students: &[Student]) -> Vec<PaymentHistoryEntry> {
    let mut entries: Vec<PaymentHistoryEntry> = students
        .iter()
        .flat_map(|student| {
            student.payments.iter().map(|payment| PaymentHistoryEntry {
                admission_number: student.admission_number.clone(),
                student_name: student.student_name.clone(),
                payment: payment.clone(),
            })
        })
        .collect();

    entries.sort_by(|a, b| {
        b.payment
            .date
            .cmp(&a.payment.date)
            .then_with(|| b.payment.receipt_no.as_str().cmp(a.payment.receipt_no.as_str()))
    });
    entries
}

/// The most recent `limit` payments
pub fn recent_payments(students: &[Student], limit: usize) -> Vec<PaymentHistoryEntry> {
    let mut entries = payment_history(students);
    entries.truncate(limit);
    entries
}

/// Total collected on `date` across all students
pub fn collections_on(students: &[Student], date: NaiveDate) -> CollectionSummary {
    let todays: Vec<&Payment> = students
        .iter()
        .flat_map(|s| s.payments.iter())
        .filter(|p| p.date == date)
        .collect();

    CollectionSummary {
        date,
        total_collected: todays.iter().map(|p| p.amount).sum(),
        payment_count: todays.len(),
    }
}

/// Students attending `class_name` in the active session, sorted by name
pub fn class_roster<'a>(
    students: &'a [Student],
    active_year: &SessionLabel,
    class_name: &str,
) -> Vec<&'a Student> {
    let mut roster: Vec<&Student> = students
        .iter()
        .filter(|s| s.is_enrolled_in(active_year, class_name))
        .collect();
    roster.sort_by(|a, b| a.student_name.cmp(&b.student_name));
    roster
}
