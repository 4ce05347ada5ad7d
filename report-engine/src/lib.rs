//! Daily till reconciliation engine
//!
//! Takes two independently-reported inputs for one (date, store) pair —
//! raw sales orders and raw register-closing payloads — and produces the
//! full audit report: per-method section breakdowns with tax
//! derivations, normalized counter records, and the system-vs-counted
//! reconciliation with its rounding verdict.
//!
//! The pipeline is pure and synchronous; only the [`service`] layer
//! suspends, while the two upstream fetches run.

pub mod aggregate;
pub mod counters;
pub mod decompose;
pub mod logger;
pub mod money;
pub mod rate;
pub mod reconcile;
pub mod service;
pub mod totals;

pub use service::{DataSource, ReportService, StoreOutcome, build_store_report};
