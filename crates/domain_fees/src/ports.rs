//! Fee Domain Ports
//!
//! Port interfaces for the persistence the fee domain needs, enabling
//! swappable implementations (a database adapter in an infra crate, or the
//! in-memory mocks here for testing).
//!
//! # Concurrency contract
//!
//! There is one logical writer per student record. `save_student` is a
//! conditional update keyed on the record's version token: the store
//! compares `expected_version` against what it holds and fails with
//! `PortError::Conflict` on a mismatch, so one of two racing writers loses
//! and must re-fetch. The engine never retries on its own.
//!
//! # Usage
//!
//! ```rust,ignore
//! use domain_fees::ports::StudentPort;
//! use std::sync::Arc;
//!
//! pub struct PaymentService {
//!     students: Arc<dyn StudentPort>,
//! }
//! ```

use async_trait::async_trait;

use core_kernel::{AdmissionNumber, DomainPort, PortError};

use crate::fee_structure::FeeTable;
use crate::student::Student;

/// Persistence port for student records
#[async_trait]
pub trait StudentPort: DomainPort {
    /// Retrieves a student by admission number
    ///
    /// # Errors
    ///
    /// `PortError::NotFound` if no student has this admission number
    async fn get_student(&self, admission_number: &AdmissionNumber)
        -> Result<Student, PortError>;

    /// Retrieves all students
    async fn list_students(&self) -> Result<Vec<Student>, PortError>;

    /// Inserts a new student record
    ///
    /// # Errors
    ///
    /// `PortError::Conflict` if the admission number is already taken
    async fn insert_student(&self, student: &Student) -> Result<(), PortError>;

    /// Saves a student record conditionally
    ///
    /// The save succeeds only if the stored record still carries
    /// `expected_version`; the store then bumps the version and returns the
    /// stored record.
    ///
    /// # Errors
    ///
    /// - `PortError::NotFound` if the student does not exist
    /// - `PortError::Conflict` if the stored version differs from
    ///   `expected_version` (a concurrent writer got there first)
    async fn save_student(
        &self,
        student: &Student,
        expected_version: u64,
    ) -> Result<Student, PortError>;

    /// Deletes a student record
    ///
    /// # Errors
    ///
    /// `PortError::NotFound` if the student does not exist
    async fn delete_student(&self, admission_number: &AdmissionNumber) -> Result<(), PortError>;
}

/// Persistence port for the class fee table
#[async_trait]
pub trait FeeConfigPort: DomainPort {
    /// Retrieves the full fee table
    async fn get_class_fees(&self) -> Result<FeeTable, PortError>;

    /// Replaces the stored fee table
    async fn save_class_fees(&self, table: &FeeTable) -> Result<(), PortError>;
}

/// Mock implementations for testing
///
/// These adapters store everything in memory and are useful for unit
/// testing without a database.
#[cfg(any(test, feature = "mock"))]
pub mod mock {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// In-memory mock implementation of StudentPort
    ///
    /// Enforces the version-token contract the same way a conditional
    /// database update would. `fail_saves_for` makes saves for chosen
    /// students fail with `ServiceUnavailable`, for exercising fan-out
    /// failure isolation.
    #[derive(Debug, Default)]
    pub struct MockStudentStore {
        students: Arc<RwLock<HashMap<AdmissionNumber, Student>>>,
        failing_saves: Arc<RwLock<HashSet<AdmissionNumber>>>,
    }

    impl MockStudentStore {
        /// Creates an empty store
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates with students for testing
        pub async fn with_students(students: Vec<Student>) -> Self {
            let store = Self::new();
            {
                let mut map = store.students.write().await;
                for student in students {
                    map.insert(student.admission_number.clone(), student);
                }
            }
            store
        }

        /// Makes future saves for this student fail with `ServiceUnavailable`
        pub async fn fail_saves_for(&self, admission_number: AdmissionNumber) {
            self.failing_saves.write().await.insert(admission_number);
        }
    }

    impl DomainPort for MockStudentStore {}

    #[async_trait]
    impl StudentPort for MockStudentStore {
        async fn get_student(
            &self,
            admission_number: &AdmissionNumber,
        ) -> Result<Student, PortError> {
            self.students
                .read()
                .await
                .get(admission_number)
                .cloned()
                .ok_or_else(|| PortError::not_found("Student", admission_number))
        }

        async fn list_students(&self) -> Result<Vec<Student>, PortError> {
            let mut students: Vec<Student> =
                self.students.read().await.values().cloned().collect();
            students.sort_by(|a, b| a.admission_number.cmp(&b.admission_number));
            Ok(students)
        }

        async fn insert_student(&self, student: &Student) -> Result<(), PortError> {
            let mut students = self.students.write().await;
            if students.contains_key(&student.admission_number) {
                return Err(PortError::conflict(format!(
                    "admission number {} already registered",
                    student.admission_number
                )));
            }
            students.insert(student.admission_number.clone(), student.clone());
            Ok(())
        }

        async fn save_student(
            &self,
            student: &Student,
            expected_version: u64,
        ) -> Result<Student, PortError> {
            if self
                .failing_saves
                .read()
                .await
                .contains(&student.admission_number)
            {
                return Err(PortError::ServiceUnavailable {
                    service: "student-store".to_string(),
                });
            }

            let mut students = self.students.write().await;
            let stored = students
                .get_mut(&student.admission_number)
                .ok_or_else(|| PortError::not_found("Student", &student.admission_number))?;

            if stored.version != expected_version {
                return Err(PortError::conflict(format!(
                    "stale version for {}: expected {}, found {}",
                    student.admission_number, expected_version, stored.version
                )));
            }

            *stored = Student {
                version: expected_version + 1,
                ..student.clone()
            };
            Ok(stored.clone())
        }

        async fn delete_student(
            &self,
            admission_number: &AdmissionNumber,
        ) -> Result<(), PortError> {
            self.students
                .write()
                .await
                .remove(admission_number)
                .map(|_| ())
                .ok_or_else(|| PortError::not_found("Student", admission_number))
        }
    }

    /// In-memory mock implementation of FeeConfigPort
    #[derive(Debug, Default)]
    pub struct MockFeeStore {
        table: Arc<RwLock<FeeTable>>,
    }

    impl MockFeeStore {
        /// Creates a store holding an empty table
        pub fn new() -> Self {
            Self::default()
        }

        /// Creates a store pre-loaded with a table
        pub fn with_table(table: FeeTable) -> Self {
            Self {
                table: Arc::new(RwLock::new(table)),
            }
        }
    }

    impl DomainPort for MockFeeStore {}

    #[async_trait]
    impl FeeConfigPort for MockFeeStore {
        async fn get_class_fees(&self) -> Result<FeeTable, PortError> {
            Ok(self.table.read().await.clone())
        }

        async fn save_class_fees(&self, table: &FeeTable) -> Result<(), PortError> {
            *self.table.write().await = table.clone();
            Ok(())
        }
    }
}
