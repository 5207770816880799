//! Class fee structures
//!
//! Maps each class to its per-session annual fee. The table is the source
//! the office edits; students carry a snapshot of the active-session value
//! in `current_year_fees`, refreshed by the fee-revision propagator.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use core_kernel::{Money, SessionLabel};

use crate::error::FeesError;

/// Per-class fee configuration: session label → annual fee
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassFeeConfig {
    pub class_name: String,
    /// Session label → annual fee for that year. Labels are free text; any
    /// format consistency is an office convention, not enforced here.
    pub fee_structure: BTreeMap<SessionLabel, Money>,
}

impl ClassFeeConfig {
    /// Creates a config with no sessions yet
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            fee_structure: BTreeMap::new(),
        }
    }

    /// Adds a session fee
    pub fn with_fee(mut self, session: SessionLabel, amount: Money) -> Self {
        self.fee_structure.insert(session, amount);
        self
    }

    /// Returns the fee for a session, if configured
    pub fn fee_for(&self, session: &SessionLabel) -> Option<Money> {
        self.fee_structure.get(session).copied()
    }
}

/// The full fee table, one entry per class
///
/// Persisted as a single document; mutated only through administrator
/// actions, whose active-session changes fan out to enrolled students.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeeTable {
    classes: BTreeMap<String, ClassFeeConfig>,
}

impl FeeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a class configuration
    pub fn with_class(mut self, config: ClassFeeConfig) -> Self {
        self.classes.insert(config.class_name.clone(), config);
        self
    }

    /// Returns the configuration for a class
    pub fn class(&self, class_name: &str) -> Option<&ClassFeeConfig> {
        self.classes.get(class_name)
    }

    /// Returns the fee for a class/session pair, if configured
    pub fn fee_for(&self, class_name: &str, session: &SessionLabel) -> Option<Money> {
        self.classes
            .get(class_name)
            .and_then(|c| c.fee_for(session))
    }

    /// Sets the fee for a class/session pair
    ///
    /// # Errors
    ///
    /// - `ClassNotFound` if the class is not in the table
    /// - `NegativeFeeAmount` if the amount is negative
    pub fn set_fee(
        &mut self,
        class_name: &str,
        session: SessionLabel,
        amount: Money,
    ) -> Result<(), FeesError> {
        if amount.is_negative() {
            return Err(FeesError::NegativeFeeAmount(amount.amount()));
        }
        let config = self
            .classes
            .get_mut(class_name)
            .ok_or_else(|| FeesError::ClassNotFound(class_name.to_string()))?;
        config.fee_structure.insert(session, amount);
        Ok(())
    }

    /// Class names in table order
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(|k| k.as_str())
    }

    /// Number of classes in the table
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Returns true if the table has no classes
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// The standard table the school opens a new session with: LKG through
    /// class 10, fees rising with the class
    pub fn standard(session: &SessionLabel) -> Self {
        let scale: [(&str, i64); 12] = [
            ("LKG", 15000),
            ("UKG", 16000),
            ("1", 18000),
            ("2", 19000),
            ("3", 20000),
            ("4", 21000),
            ("5", 22000),
            ("6", 24000),
            ("7", 26000),
            ("8", 28000),
            ("9", 30000),
            ("10", 32000),
        ];

        let mut table = FeeTable::new();
        for (class_name, amount) in scale {
            table = table.with_class(
                ClassFeeConfig::new(class_name)
                    .with_fee(session.clone(), Money::from_major(amount)),
            );
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(s: &str) -> SessionLabel {
        SessionLabel::new(s).unwrap()
    }

    #[test]
    fn test_standard_table_covers_all_classes() {
        let table = FeeTable::standard(&session("2025-26"));

        assert_eq!(table.len(), 12);
        assert_eq!(
            table.fee_for("5", &session("2025-26")),
            Some(Money::from_major(22000))
        );
        assert_eq!(
            table.fee_for("LKG", &session("2025-26")),
            Some(Money::from_major(15000))
        );
        assert_eq!(table.fee_for("5", &session("2024-25")), None);
    }

    #[test]
    fn test_set_fee_updates_one_session_only() {
        let mut table = FeeTable::standard(&session("2025-26"));
        table
            .set_fee("5", session("2026-27"), Money::from_major(23000))
            .unwrap();

        assert_eq!(
            table.fee_for("5", &session("2025-26")),
            Some(Money::from_major(22000))
        );
        assert_eq!(
            table.fee_for("5", &session("2026-27")),
            Some(Money::from_major(23000))
        );
    }

    #[test]
    fn test_set_fee_unknown_class() {
        let mut table = FeeTable::standard(&session("2025-26"));
        let result = table.set_fee("12", session("2025-26"), Money::from_major(35000));
        assert!(matches!(result, Err(FeesError::ClassNotFound(name)) if name == "12"));
    }

    #[test]
    fn test_set_fee_rejects_negative_amount() {
        let mut table = FeeTable::standard(&session("2025-26"));
        let result = table.set_fee("5", session("2025-26"), Money::from_major(-1));
        assert!(matches!(result, Err(FeesError::NegativeFeeAmount(_))));
    }
}
