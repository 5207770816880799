//! Student record validation
//!
//! Rules enforced before a record is inserted or saved:
//!
//! - Student name is required
//! - At least one enrollment, each with a session label and a class
//! - No duplicate session labels across enrollments
//! - Pending buckets are unique by year with amounts above the settlement
//!   tolerance
//! - The current-year fee snapshot is not negative
//! - Date of birth is in the past
//!
//! Missing guardian names are flagged as warnings: old imported records
//! often lack them, and the office fills them in later.

use chrono::Utc;

use crate::student::Student;

/// Result of student record validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    /// Whether the record is valid
    pub is_valid: bool,
    /// List of validation errors
    pub errors: Vec<String>,
    /// List of validation warnings (non-fatal issues)
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Creates a successful validation result
    pub fn ok() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Creates a failed validation result with errors
    pub fn fail(errors: Vec<String>) -> Self {
        Self {
            is_valid: false,
            errors,
            warnings: Vec::new(),
        }
    }

    /// Adds an error to the result
    pub fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
        self.is_valid = false;
    }

    /// Adds a warning to the result
    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Merges another validation result into this one
    pub fn merge(&mut self, other: ValidationResult) {
        if !other.is_valid {
            self.is_valid = false;
        }
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }
}

impl Default for ValidationResult {
    fn default() -> Self {
        Self::ok()
    }
}

/// Validates a student record against the registry rules
pub fn validate_student(student: &Student) -> ValidationResult {
    let mut result = ValidationResult::ok();

    if student.student_name.trim().is_empty() {
        result.add_error("Student name is required");
    }
    if student.father_name.trim().is_empty() {
        result.add_warning("Father's name is missing");
    }
    if student.mother_name.trim().is_empty() {
        result.add_warning("Mother's name is missing");
    }

    if student.date_of_birth > Utc::now().date_naive() {
        result.add_error("Date of birth cannot be in the future");
    }

    if student.enrollments.is_empty() {
        result.add_error("At least one academic session is required");
    }
    let mut sessions = std::collections::BTreeSet::new();
    for enrollment in &student.enrollments {
        if enrollment.class_name.trim().is_empty() {
            result.add_error(format!(
                "Class is required for session {}",
                enrollment.session
            ));
        }
        if !sessions.insert(&enrollment.session) {
            result.add_error(format!("Duplicate session year: {}", enrollment.session));
        }
    }

    let mut pending_years = std::collections::BTreeSet::new();
    for pending in &student.previous_pending {
        if pending.amount.is_settled() || pending.amount.is_negative() {
            result.add_error(format!(
                "Pending amount for {} must be positive, got {}",
                pending.year, pending.amount
            ));
        }
        if !pending_years.insert(&pending.year) {
            result.add_error(format!("Duplicate pending year: {}", pending.year));
        }
    }

    if student.current_year_fees.is_negative() {
        result.add_error("Current year fees cannot be negative");
    }

    result
}
