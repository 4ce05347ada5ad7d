//! Register-closing (counter) models
//!
//! Raw per-operator closing payloads as fetched from the backend, and
//! the normalized per-operator structure the reconciliation engine
//! consumes. Batch entries are the physical settlement batches printed
//! by each card terminal at closing time; they are the ground truth for
//! counted point-of-sale amounts.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One settlement batch inside the raw per-terminal breakdown
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBatch {
    #[serde(default)]
    pub batch_id: String,
    /// Batch amount, local currency
    #[serde(default)]
    pub amount: f64,
}

/// Raw per-terminal batch breakdown
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TerminalBatches {
    #[serde(default)]
    pub batches: Vec<RawBatch>,
}

/// One raw operator closing payload (read-only external input).
/// Missing numeric fields deserialize to zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawCounter {
    #[serde(default)]
    pub operator_name: String,
    #[serde(default)]
    pub operator_code: String,
    #[serde(default)]
    pub register_id: String,
    #[serde(default)]
    pub terminal: String,
    /// Exchange rate declared at closing; the first operator's rate is
    /// shared across the whole report
    #[serde(default)]
    pub rate: f64,

    // Opening cash floats, subtracted from counted cash downstream
    #[serde(default)]
    pub opening_cash_local: f64,
    #[serde(default)]
    pub opening_cash_foreign: f64,

    // Local-currency cash bucket
    #[serde(default)]
    pub cash_local_system: f64,
    #[serde(default)]
    pub cash_local_system_foreign: f64,
    #[serde(default)]
    pub cash_local_counted: f64,
    #[serde(default)]
    pub cash_local_counted_foreign: f64,

    // Foreign-currency cash bucket
    #[serde(default)]
    pub cash_foreign_system: f64,
    #[serde(default)]
    pub cash_foreign_counted: f64,

    // Point-of-sale bucket
    #[serde(default)]
    pub pos_system_local: f64,
    #[serde(default)]
    pub pos_system_foreign: f64,
    #[serde(default)]
    pub pos_counted_local: f64,
    #[serde(default)]
    pub pos_counted_foreign: f64,

    // Mobile-transfer bucket
    #[serde(default)]
    pub mobile_system_local: f64,
    #[serde(default)]
    pub mobile_system_foreign: f64,
    #[serde(default)]
    pub mobile_counted_local: f64,
    #[serde(default)]
    pub mobile_counted_foreign: f64,

    // Peer-transfer bucket (foreign currency)
    #[serde(default)]
    pub peer_system: f64,
    #[serde(default)]
    pub peer_counted: f64,

    // Operator totals, foreign currency
    #[serde(default)]
    pub total_system_foreign: f64,
    #[serde(default)]
    pub total_counted_foreign: f64,

    #[serde(default)]
    pub closed_by: String,

    /// Per-terminal settlement batches (ordered map keeps the report
    /// deterministic)
    #[serde(default)]
    pub terminal_batches: BTreeMap<String, TerminalBatches>,
}

/// System vs counted figures for one payment-type bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketFigures {
    pub system_local: Decimal,
    pub system_foreign: Decimal,
    pub counted_local: Decimal,
    pub counted_foreign: Decimal,
}

impl BucketFigures {
    /// counted - system, local currency
    pub fn diff_local(&self) -> Decimal {
        self.counted_local - self.system_local
    }

    /// counted - system, foreign currency
    pub fn diff_foreign(&self) -> Decimal {
        self.counted_foreign - self.system_foreign
    }
}

/// One physical settlement batch, normalized
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub terminal: String,
    pub batch_id: String,
    /// Local currency
    pub amount: Decimal,
}

/// Normalized per-operator closing record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterRecord {
    pub operator: String,
    pub operator_code: String,
    pub register_id: String,
    pub terminal: String,
    pub opening_cash_local: Decimal,
    pub opening_cash_foreign: Decimal,
    pub pos: BucketFigures,
    pub mobile: BucketFigures,
    pub cash_foreign: BucketFigures,
    pub cash_local: BucketFigures,
    pub peer: BucketFigures,
    pub total_system_foreign: Decimal,
    pub total_counted_foreign: Decimal,
    /// counted - system, foreign currency
    pub total_diff_foreign: Decimal,
    /// Difference as a percentage of the system total, zero when the
    /// operator reported no system figure
    pub total_diff_pct: Decimal,
    pub closed_by: String,
    pub batches: Vec<BatchEntry>,
}

/// Grand totals across all operators of a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterTotals {
    pub pos: BucketFigures,
    pub mobile: BucketFigures,
    pub cash_foreign: BucketFigures,
    pub cash_local: BucketFigures,
    pub peer: BucketFigures,
    pub system_foreign: Decimal,
    pub counted_foreign: Decimal,
    /// total counted - total system, foreign currency
    pub variance_foreign: Decimal,
}

/// The counter normalizer output: one shared rate, per-operator
/// records, and the grand totals
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedCounters {
    /// First operator's declared rate, or zero when absent
    pub rate: Decimal,
    pub records: Vec<CounterRecord>,
    pub totals: CounterTotals,
}
