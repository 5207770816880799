//! Pre-seeded In-Memory Stores
//!
//! Helpers for standing up the mock persistence adapters with fixture data
//! already loaded, so service tests start from a known school.

use std::sync::Arc;

use domain_fees::ports::mock::{MockFeeStore, MockStudentStore};

use crate::fixtures::{FeeFixtures, StudentFixtures};

/// A student store seeded with the three standard fixture students
pub async fn seeded_student_store() -> Arc<MockStudentStore> {
    Arc::new(MockStudentStore::with_students(StudentFixtures::all()).await)
}

/// A fee store holding the standard table for the active session
pub fn seeded_fee_store() -> Arc<MockFeeStore> {
    Arc::new(MockFeeStore::with_table(FeeFixtures::standard_table()))
}
