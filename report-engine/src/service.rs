//! Per-store report orchestration
//!
//! The data-fetch client lives outside this crate; [`DataSource`] is
//! the seam it plugs into. For each store the two fetches run
//! concurrently, and the pure pipeline starts only once both have
//! returned. One store's failure never aborts its siblings: the batch
//! result carries a per-store outcome in input order.

use async_trait::async_trait;
use chrono::NaiveDate;
use shared::ReportError;
use shared::config;
use shared::models::{RawCounter, RawOrder, StoreReport};

use crate::counters::normalize_counters;
use crate::decompose::decompose;
use crate::rate::derive_rate;
use crate::reconcile::reconcile;
use crate::totals::calculate_sections;

/// Upstream source of raw orders and counter closings
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch_orders(&self, date: NaiveDate, store: &str)
    -> Result<Vec<RawOrder>, ReportError>;

    async fn fetch_counters(
        &self,
        date: NaiveDate,
        store: &str,
    ) -> Result<Vec<RawCounter>, ReportError>;
}

/// One store's result within a batch run
#[derive(Debug)]
pub struct StoreOutcome {
    pub store: String,
    pub outcome: Result<StoreReport, ReportError>,
}

/// Run the full pure pipeline for one (date, store) unit of work.
///
/// Empty inputs fail the unit of work; everything downstream of the
/// rate derivation is total.
pub fn build_store_report(
    date: NaiveDate,
    store: &str,
    orders: &[RawOrder],
    raw_counters: &[RawCounter],
) -> Result<StoreReport, ReportError> {
    if orders.is_empty() {
        return Err(ReportError::NoDataForPeriod {
            date,
            store: store.to_string(),
            what: "orders",
        });
    }
    if raw_counters.is_empty() {
        return Err(ReportError::NoDataForPeriod {
            date,
            store: store.to_string(),
            what: "counters",
        });
    }

    let rate = derive_rate(orders, date, store)?;
    let lines = decompose(orders, rate);
    let sections = calculate_sections(&lines, store, rate);
    let counters = normalize_counters(raw_counters);
    let reconciliation = reconcile(&sections, &counters);

    tracing::info!(
        %date,
        store,
        %rate,
        orders = orders.len(),
        adjustment = %reconciliation.rounding_adjustment,
        "built store report"
    );

    Ok(StoreReport {
        date,
        store: store.to_string(),
        store_name: config::store_name(store),
        rate,
        order_count: orders.len(),
        sections,
        counters,
        reconciliation,
    })
}

/// Report service over a data source
pub struct ReportService<D> {
    source: D,
}

impl<D: DataSource> ReportService<D> {
    pub fn new(source: D) -> Self {
        Self { source }
    }

    /// Build the report for one store, fetching orders and counters
    /// concurrently.
    pub async fn store_report(
        &self,
        date: NaiveDate,
        store: &str,
    ) -> Result<StoreReport, ReportError> {
        let (orders, counters) = tokio::join!(
            self.source.fetch_orders(date, store),
            self.source.fetch_counters(date, store),
        );
        build_store_report(date, store, &orders?, &counters?)
    }

    /// Build reports for a requested store set (the `"all"` sentinel
    /// expands to the directory). Outcomes come back in input store
    /// order; a failed store is reported alongside its siblings'
    /// results.
    pub async fn run(&self, date: NaiveDate, stores: &[String]) -> Vec<StoreOutcome> {
        let mut outcomes = Vec::new();
        for store in config::resolve_stores(stores) {
            let outcome = self.store_report(date, &store).await;
            if let Err(err) = &outcome {
                tracing::warn!(%date, store = %store, %err, "store report failed");
            }
            outcomes.push(StoreOutcome { store, outcome });
        }
        outcomes
    }
}
