//! Derived report structures
//!
//! These are the sole contract the rendering layer may depend on:
//! section breakdowns with merged and per-register views, the rate
//! cross-check, and the full reconciliation result.

use crate::config::PaymentKind;
use crate::models::counter::NormalizedCounters;
use crate::models::raw_order::DocKind;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One atomic payment component of an order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentLine {
    pub order_id: String,
    pub doc: DocKind,
    pub register_id: String,
    /// Fixed label, a title-cased terminal name, or the unnamed fallback
    pub method: String,
    pub local: Decimal,
    pub foreign: Decimal,
    /// True only for methods natively read in the foreign currency
    pub dollar: bool,
}

/// Per-method aggregate with derived tax fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedMethod {
    pub method: String,
    pub local: Decimal,
    pub foreign: Decimal,
    /// Number of contributing payment lines
    pub count: u32,
    pub net_of_tax: Decimal,
    pub consumption_tax: Decimal,
    pub withholding_tax: Decimal,
    pub dollar: bool,
}

/// Rolled-up sums for a section or sub-section
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionSums {
    pub local: Decimal,
    pub foreign: Decimal,
    pub net_of_tax: Decimal,
    pub consumption_tax: Decimal,
    pub withholding_tax: Decimal,
}

/// Per-register sub-section of the cash-basis section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterSection {
    pub register_id: String,
    pub methods: Vec<AggregatedMethod>,
    pub sums: SectionSums,
}

/// One document-classification section.
///
/// `methods` is the merged cross-register view; `registers` is only
/// populated for the cash-basis section. Both views are computed from
/// the same payment lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub methods: Vec<AggregatedMethod>,
    pub sums: SectionSums,
    pub registers: Vec<RegisterSection>,
}

/// Audit-only cross-check: grand local total over the rate compared
/// against the grand foreign total. Never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateCrossCheck {
    pub local_over_rate: Decimal,
    pub foreign_total: Decimal,
    pub diff: Decimal,
}

/// Both sections plus grand totals and the cross-check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionReport {
    pub fav: Section,
    pub nen: Section,
    pub totals: SectionSums,
    pub cross_check: RateCrossCheck,
}

/// One reconciliation row: system vs counted for a method
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconRow {
    pub method: String,
    pub kind: PaymentKind,
    pub system_local: Decimal,
    pub system_foreign: Decimal,
    pub counted_local: Decimal,
    pub counted_foreign: Decimal,
    /// counted - system, foreign currency
    pub diff_foreign: Decimal,
}

/// Rolled-up reconciliation figures
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconTotals {
    pub system_local: Decimal,
    pub system_foreign: Decimal,
    pub counted_local: Decimal,
    pub counted_foreign: Decimal,
    pub diff_foreign: Decimal,
}

/// Per-register reconciliation breakdown (cash-basis only)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterRecon {
    pub register_id: String,
    pub rows: Vec<ReconRow>,
    pub totals: ReconTotals,
}

/// Full output of the reconciliation engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub fav_registers: Vec<RegisterRecon>,
    pub fav_totals: ReconTotals,
    pub nen_rows: Vec<ReconRow>,
    pub nen_totals: ReconTotals,
    pub grand: ReconTotals,
    /// grand counted - grand system, foreign currency
    pub rounding_adjustment: Decimal,
    /// |adjustment| / grand system * 100, zero when system is zero
    pub rounding_pct: Decimal,
    /// Raised when the rounding percentage exceeds 1%. A signal for the
    /// report, never a failure.
    pub warning: bool,
}

/// Complete per-store report: the contract handed to rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreReport {
    pub date: NaiveDate,
    pub store: String,
    pub store_name: String,
    /// Rate derived from the order data
    pub rate: Decimal,
    pub order_count: usize,
    pub sections: SectionReport,
    pub counters: NormalizedCounters,
    pub reconciliation: ReconciliationResult,
}
