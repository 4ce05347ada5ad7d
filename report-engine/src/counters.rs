//! Counter normalization
//!
//! Reshapes raw per-operator closing payloads into uniform records with
//! their settlement batches, and rolls the whole closing up into grand
//! totals. The shared rate is the first operator's declared rate; zero
//! stands in when it is absent and never divides anything.

use rust_decimal::Decimal;
use shared::models::{
    BatchEntry, BucketFigures, CounterRecord, CounterTotals, NormalizedCounters, RawCounter,
};

use crate::money::{dec, round2};

fn bucket(
    system_local: f64,
    system_foreign: f64,
    counted_local: f64,
    counted_foreign: f64,
) -> BucketFigures {
    BucketFigures {
        system_local: round2(dec(system_local)),
        system_foreign: round2(dec(system_foreign)),
        counted_local: round2(dec(counted_local)),
        counted_foreign: round2(dec(counted_foreign)),
    }
}

fn normalize_record(raw: &RawCounter) -> CounterRecord {
    // Flatten the nested per-terminal breakdown, skipping batches with
    // zero or missing amounts
    let mut batches = Vec::new();
    for (terminal, detail) in &raw.terminal_batches {
        for b in &detail.batches {
            if b.amount > 0.0 {
                batches.push(BatchEntry {
                    terminal: terminal.clone(),
                    batch_id: b.batch_id.clone(),
                    amount: round2(dec(b.amount)),
                });
            }
        }
    }

    let total_system_foreign = round2(dec(raw.total_system_foreign));
    let total_counted_foreign = round2(dec(raw.total_counted_foreign));
    let total_diff_foreign = round2(total_counted_foreign - total_system_foreign);
    let total_diff_pct = if total_system_foreign.is_zero() {
        Decimal::ZERO
    } else {
        round2(total_diff_foreign / total_system_foreign * Decimal::ONE_HUNDRED)
    };

    CounterRecord {
        operator: raw.operator_name.clone(),
        operator_code: raw.operator_code.clone(),
        register_id: raw.register_id.clone(),
        terminal: raw.terminal.clone(),
        opening_cash_local: round2(dec(raw.opening_cash_local)),
        opening_cash_foreign: round2(dec(raw.opening_cash_foreign)),
        pos: bucket(
            raw.pos_system_local,
            raw.pos_system_foreign,
            raw.pos_counted_local,
            raw.pos_counted_foreign,
        ),
        mobile: bucket(
            raw.mobile_system_local,
            raw.mobile_system_foreign,
            raw.mobile_counted_local,
            raw.mobile_counted_foreign,
        ),
        cash_foreign: bucket(0.0, raw.cash_foreign_system, 0.0, raw.cash_foreign_counted),
        cash_local: bucket(
            raw.cash_local_system,
            raw.cash_local_system_foreign,
            raw.cash_local_counted,
            raw.cash_local_counted_foreign,
        ),
        peer: bucket(0.0, raw.peer_system, 0.0, raw.peer_counted),
        total_system_foreign,
        total_counted_foreign,
        total_diff_foreign,
        total_diff_pct,
        closed_by: raw.closed_by.clone(),
        batches,
    }
}

fn add_bucket(total: &mut BucketFigures, part: &BucketFigures) {
    total.system_local = round2(total.system_local + part.system_local);
    total.system_foreign = round2(total.system_foreign + part.system_foreign);
    total.counted_local = round2(total.counted_local + part.counted_local);
    total.counted_foreign = round2(total.counted_foreign + part.counted_foreign);
}

fn grand_totals(records: &[CounterRecord]) -> CounterTotals {
    let mut totals = CounterTotals::default();
    for r in records {
        add_bucket(&mut totals.pos, &r.pos);
        add_bucket(&mut totals.mobile, &r.mobile);
        add_bucket(&mut totals.cash_foreign, &r.cash_foreign);
        add_bucket(&mut totals.cash_local, &r.cash_local);
        add_bucket(&mut totals.peer, &r.peer);
        totals.system_foreign = round2(totals.system_foreign + r.total_system_foreign);
        totals.counted_foreign = round2(totals.counted_foreign + r.total_counted_foreign);
    }
    totals.variance_foreign = round2(totals.counted_foreign - totals.system_foreign);
    totals
}

/// Normalize a closing's raw counter payloads
pub fn normalize_counters(raw: &[RawCounter]) -> NormalizedCounters {
    let rate = raw
        .first()
        .map(|c| round2(dec(c.rate)))
        .unwrap_or(Decimal::ZERO);
    if rate.is_zero() {
        tracing::warn!("counter closing carries no declared rate; local-only conversions are zero");
    }

    let records: Vec<CounterRecord> = raw.iter().map(normalize_record).collect();
    let totals = grand_totals(&records);

    NormalizedCounters {
        rate,
        records,
        totals,
    }
}
