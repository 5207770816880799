//! Core Kernel - Foundational types and utilities for the fee system
//!
//! This crate provides the fundamental building blocks used across all domain modules:
//! - Money with precise decimal arithmetic
//! - Academic session labels and their ordering contract
//! - Common identifiers and value objects
//! - Port error taxonomy shared by all persistence adapters

pub mod academic;
pub mod error;
pub mod identifiers;
pub mod money;
pub mod ports;

pub use academic::{AcademicError, SessionLabel};
pub use error::CoreError;
pub use identifiers::{AdmissionNumber, IdentifierError, PaymentId, ReceiptNumber, UserId};
pub use money::{Money, MoneyError};
pub use ports::{DomainPort, PortError};
