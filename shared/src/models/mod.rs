//! Domain models
//!
//! Raw inputs (orders, counter closings) and the derived report
//! structures that form the contract with the rendering layer.

pub mod counter;
pub mod raw_order;
pub mod report;

pub use counter::{
    BatchEntry, BucketFigures, CounterRecord, CounterTotals, NormalizedCounters, RawBatch,
    RawCounter, TerminalBatches,
};
pub use raw_order::{DocKind, RawOrder};
pub use report::{
    AggregatedMethod, PaymentLine, RateCrossCheck, ReconRow, ReconTotals, ReconciliationResult,
    RegisterRecon, RegisterSection, Section, SectionReport, SectionSums, StoreReport,
};
