//! Report error taxonomy
//!
//! One (date, store) pair is a unit of work. Errors here abort only
//! that unit; sibling stores in the same batch keep their results.

use chrono::NaiveDate;

/// Errors that can fail a single (date, store) report
#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    /// No order carries a usable local/foreign pair for either the
    /// point-of-sale or the mobile-transfer amounts. There is no sane
    /// default rate, so the whole report for this store is abandoned.
    #[error("cannot derive exchange rate for {store} on {date}: no order with both local and foreign POS or mobile amounts")]
    RateUndeterminable { date: NaiveDate, store: String },

    /// The upstream source returned an empty order or counter set.
    #[error("no {what} found for {store} on {date}")]
    NoDataForPeriod {
        date: NaiveDate,
        store: String,
        what: &'static str,
    },

    /// Failure reported by the data-fetch collaborator.
    #[error("data source error: {0}")]
    Source(String),
}
