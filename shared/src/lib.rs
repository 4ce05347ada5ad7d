//! Shared types for the till reconciliation workspace
//!
//! Domain models, error types and static store/method configuration
//! consumed by the report engine and by rendering collaborators.

pub mod config;
pub mod error;
pub mod models;

// Re-exports
pub use config::PaymentKind;
pub use error::ReportError;
pub use serde::{Deserialize, Serialize};
