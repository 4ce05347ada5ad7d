//! Reconciliation engine
//!
//! Pure function of the section report and the normalized counters.
//! Maps methods to payment-type buckets, allocates counted amounts from
//! the physical batch data, resolves shared-terminal ambiguity, absorbs
//! per-register POS shortfalls into counted local cash, and distributes
//! the residual credit-basis pools proportionally. Numeric edge cases
//! (zero rate, zero system totals, absent buckets) degenerate to zero
//! values; this engine never fails.

use rust_decimal::Decimal;
use shared::PaymentKind;
use shared::config;
use shared::models::{
    NormalizedCounters, ReconRow, ReconTotals, ReconciliationResult, RegisterRecon, SectionReport,
};
use std::collections::BTreeMap;

use crate::money::{ratio, round2};

const ONE_PERCENT: Decimal = Decimal::ONE;

/// Counted cash pools across all counters, net of opening floats
#[derive(Debug, Default)]
struct CountedPools {
    mobile_local: Decimal,
    mobile_foreign: Decimal,
    cash_foreign: Decimal,
    cash_local_local: Decimal,
    cash_local_foreign: Decimal,
    peer_foreign: Decimal,
}

/// System (and, for cash-local, counted) totals per bucket on the
/// cash-basis side, taken from the merged cross-register view
#[derive(Debug, Default)]
struct FavBucketTotals {
    mobile_local: Decimal,
    mobile_foreign: Decimal,
    cash_foreign: Decimal,
    cash_local_counted_local: Decimal,
    cash_local_counted_foreign: Decimal,
    peer_foreign: Decimal,
}

fn fold_row(totals: &mut ReconTotals, row: &ReconRow) {
    totals.system_local = round2(totals.system_local + row.system_local);
    totals.system_foreign = round2(totals.system_foreign + row.system_foreign);
    totals.counted_local = round2(totals.counted_local + row.counted_local);
    totals.counted_foreign = round2(totals.counted_foreign + row.counted_foreign);
    totals.diff_foreign = round2(totals.diff_foreign + row.diff_foreign);
}

fn fold_totals(grand: &mut ReconTotals, part: &ReconTotals) {
    grand.system_local = round2(grand.system_local + part.system_local);
    grand.system_foreign = round2(grand.system_foreign + part.system_foreign);
    grand.counted_local = round2(grand.counted_local + part.counted_local);
    grand.counted_foreign = round2(grand.counted_foreign + part.counted_foreign);
    grand.diff_foreign = round2(grand.diff_foreign + part.diff_foreign);
}

fn counted_pools(counters: &NormalizedCounters, rate: Decimal) -> CountedPools {
    let mut pools = CountedPools::default();
    for r in &counters.records {
        pools.mobile_local = round2(pools.mobile_local + r.mobile.counted_local);
        pools.mobile_foreign = round2(pools.mobile_foreign + r.mobile.counted_foreign);
        // Counted cash is net of the opening float
        pools.cash_foreign = round2(
            pools.cash_foreign + round2(r.cash_foreign.counted_foreign - r.opening_cash_foreign),
        );
        pools.cash_local_local = round2(
            pools.cash_local_local + round2(r.cash_local.counted_local - r.opening_cash_local),
        );
        pools.cash_local_foreign = round2(
            pools.cash_local_foreign
                + round2(r.cash_local.counted_foreign - ratio(r.opening_cash_local, rate)),
        );
        pools.peer_foreign = round2(pools.peer_foreign + r.peer.counted_foreign);
    }
    pools
}

/// Resolve the cash-basis side, register by register.
///
/// Returns the per-register breakdown, the section totals, and the
/// cash-local counted totals (needed for the credit-basis cash pool,
/// since absorbed shortfalls live there).
fn allocate_fav_registers(
    sections: &SectionReport,
    counters: &NormalizedCounters,
    rate: Decimal,
    fav_pos_system: &BTreeMap<String, (Decimal, Decimal)>,
    nen_pos_system: &BTreeMap<String, Decimal>,
) -> (Vec<RegisterRecon>, ReconTotals, Decimal, Decimal) {
    // Physical batch totals per (register, terminal), local currency
    let mut register_batches: BTreeMap<(String, String), Decimal> = BTreeMap::new();
    for r in &counters.records {
        for b in &r.batches {
            let key = (r.register_id.clone(), b.terminal.clone());
            let total = register_batches.entry(key).or_insert(Decimal::ZERO);
            *total = round2(*total + b.amount);
        }
    }

    let mut registers = Vec::new();
    let mut section_totals = ReconTotals::default();
    let mut cash_local_counted_local = Decimal::ZERO;
    let mut cash_local_counted_foreign = Decimal::ZERO;

    for reg in &sections.fav.registers {
        let mut rows: Vec<ReconRow> = Vec::new();
        let mut cash_local_idx: Option<usize> = None;
        let mut pos_system_local = Decimal::ZERO;
        let mut pos_system_foreign = Decimal::ZERO;
        let mut pos_counted_local = Decimal::ZERO;
        let mut pos_counted_foreign = Decimal::ZERO;

        for m in &reg.methods {
            let kind = PaymentKind::classify(&m.method);
            let (counted_local, counted_foreign) = match kind {
                PaymentKind::PointOfSale => {
                    // A terminal also carrying credit-basis traffic is
                    // "shared": its counted figure stays at system and
                    // the credit-basis side absorbs the variance.
                    let fav_foreign = fav_pos_system
                        .get(&m.method)
                        .map(|(_, f)| *f)
                        .unwrap_or(Decimal::ZERO);
                    let nen_foreign = nen_pos_system
                        .get(&m.method)
                        .copied()
                        .unwrap_or(Decimal::ZERO);
                    let combined = round2(fav_foreign + nen_foreign);
                    let shared_terminal = combined > fav_foreign;

                    let allocated = if shared_terminal {
                        (m.local, m.foreign)
                    } else {
                        let batch_local = register_batches
                            .get(&(reg.register_id.clone(), m.method.clone()))
                            .copied()
                            .unwrap_or(Decimal::ZERO);
                        (batch_local, ratio(batch_local, rate))
                    };
                    pos_system_local = round2(pos_system_local + m.local);
                    pos_system_foreign = round2(pos_system_foreign + m.foreign);
                    pos_counted_local = round2(pos_counted_local + allocated.0);
                    pos_counted_foreign = round2(pos_counted_foreign + allocated.1);
                    allocated
                }
                // Non-POS methods report what the system recorded; the
                // cash-local row is adjusted below once the register's
                // POS shortfall is known.
                _ => {
                    if kind == PaymentKind::CashLocal {
                        cash_local_idx = Some(rows.len());
                    }
                    (m.local, m.foreign)
                }
            };

            rows.push(ReconRow {
                method: m.method.clone(),
                kind,
                system_local: m.local,
                system_foreign: m.foreign,
                counted_local,
                counted_foreign,
                diff_foreign: Decimal::ZERO,
            });
        }

        // Physical POS gaps surface as excess local cash at closing
        let shortfall_local = round2(pos_system_local - pos_counted_local).max(Decimal::ZERO);
        let shortfall_foreign = round2(pos_system_foreign - pos_counted_foreign).max(Decimal::ZERO);
        if shortfall_foreign > Decimal::ZERO {
            // Without a cash-local row there is nothing to absorb into;
            // the gap stays visible on the POS rows themselves.
            if let Some(i) = cash_local_idx {
                rows[i].counted_local = round2(rows[i].counted_local + shortfall_local);
                rows[i].counted_foreign = round2(rows[i].counted_foreign + shortfall_foreign);
                tracing::debug!(
                    register = %reg.register_id,
                    %shortfall_foreign,
                    "absorbed POS shortfall into counted local cash"
                );
            }
        }

        let mut totals = ReconTotals::default();
        for row in &mut rows {
            row.diff_foreign = round2(row.counted_foreign - row.system_foreign);
            if row.kind == PaymentKind::CashLocal {
                cash_local_counted_local = round2(cash_local_counted_local + row.counted_local);
                cash_local_counted_foreign =
                    round2(cash_local_counted_foreign + row.counted_foreign);
            }
        }
        for row in &rows {
            fold_row(&mut totals, row);
        }
        fold_totals(&mut section_totals, &totals);

        registers.push(RegisterRecon {
            register_id: reg.register_id.clone(),
            rows,
            totals,
        });
    }

    (
        registers,
        section_totals,
        cash_local_counted_local,
        cash_local_counted_foreign,
    )
}

/// Resolve the credit-basis side, consolidated store-wide.
fn allocate_nen(
    sections: &SectionReport,
    counters: &NormalizedCounters,
    rate: Decimal,
    fav_pos_system: &BTreeMap<String, (Decimal, Decimal)>,
    fav_buckets: &FavBucketTotals,
) -> (Vec<ReconRow>, ReconTotals) {
    // Physical batch totals per terminal, across every register
    let mut all_batches: BTreeMap<String, Decimal> = BTreeMap::new();
    for r in &counters.records {
        for b in &r.batches {
            let total = all_batches.entry(b.terminal.clone()).or_insert(Decimal::ZERO);
            *total = round2(*total + b.amount);
        }
    }

    let pools = counted_pools(counters, rate);
    let mut rows: Vec<ReconRow> = Vec::new();

    // Bucket system totals on the credit-basis side, for the
    // proportional split
    let mut bucket_system: BTreeMap<PaymentKind, (Decimal, Decimal)> = BTreeMap::new();
    for m in &sections.nen.methods {
        let kind = PaymentKind::classify(&m.method);
        if kind != PaymentKind::PointOfSale {
            let entry = bucket_system.entry(kind).or_insert((Decimal::ZERO, Decimal::ZERO));
            entry.0 = round2(entry.0 + m.local);
            entry.1 = round2(entry.1 + m.foreign);
        }
    }

    // Credit-basis pool per bucket: counted-from-counters minus the
    // cash-basis claim on the same funds. Cash-local subtracts the
    // cash-basis *counted* figure, which already includes any absorbed
    // shortfall.
    let pool_of = |kind: PaymentKind| -> (Decimal, Decimal) {
        match kind {
            PaymentKind::MobileTransfer => (
                round2(pools.mobile_local - fav_buckets.mobile_local),
                round2(pools.mobile_foreign - fav_buckets.mobile_foreign),
            ),
            PaymentKind::CashForeign => {
                let foreign = round2(pools.cash_foreign - fav_buckets.cash_foreign);
                (round2(foreign * rate), foreign)
            }
            PaymentKind::CashLocal => (
                round2(pools.cash_local_local - fav_buckets.cash_local_counted_local),
                round2(pools.cash_local_foreign - fav_buckets.cash_local_counted_foreign),
            ),
            PaymentKind::PeerTransfer => {
                let foreign = round2(pools.peer_foreign - fav_buckets.peer_foreign);
                (round2(foreign * rate), foreign)
            }
            PaymentKind::PointOfSale => (Decimal::ZERO, Decimal::ZERO),
        }
    };

    for m in &sections.nen.methods {
        let kind = PaymentKind::classify(&m.method);
        let (counted_local, counted_foreign) = match kind {
            PaymentKind::PointOfSale => {
                // Residual of the terminal's physical batches after the
                // cash-basis settlement claim
                let batch_local = all_batches.get(&m.method).copied().unwrap_or(Decimal::ZERO);
                let (fav_local, fav_foreign) = fav_pos_system
                    .get(&m.method)
                    .copied()
                    .unwrap_or((Decimal::ZERO, Decimal::ZERO));
                (
                    round2(batch_local - fav_local),
                    round2(ratio(batch_local, rate) - fav_foreign),
                )
            }
            _ => {
                let (pool_local, pool_foreign) = pool_of(kind);
                let (sys_local, sys_foreign) = bucket_system
                    .get(&kind)
                    .copied()
                    .unwrap_or((Decimal::ZERO, Decimal::ZERO));
                // Proportional share of the pool; a zero system total
                // degenerates to a zero share.
                let share_local = if sys_local.is_zero() {
                    Decimal::ZERO
                } else {
                    round2(pool_local * m.local / sys_local)
                };
                let share_foreign = if sys_foreign.is_zero() {
                    Decimal::ZERO
                } else {
                    round2(pool_foreign * m.foreign / sys_foreign)
                };
                (share_local, share_foreign)
            }
        };

        rows.push(ReconRow {
            method: m.method.clone(),
            kind,
            system_local: m.local,
            system_foreign: m.foreign,
            counted_local,
            counted_foreign,
            diff_foreign: round2(counted_foreign - m.foreign),
        });
    }

    // A bucket holding counted funds with no credit-basis rows at all
    // still has to surface: synthesize a row so the pool becomes pure
    // difference.
    for kind in [
        PaymentKind::MobileTransfer,
        PaymentKind::CashForeign,
        PaymentKind::CashLocal,
        PaymentKind::PeerTransfer,
    ] {
        if bucket_system.contains_key(&kind) {
            continue;
        }
        let (pool_local, pool_foreign) = pool_of(kind);
        if pool_foreign > Decimal::ZERO {
            rows.push(ReconRow {
                method: kind.label().to_string(),
                kind,
                system_local: Decimal::ZERO,
                system_foreign: Decimal::ZERO,
                counted_local: pool_local,
                counted_foreign: pool_foreign,
                diff_foreign: pool_foreign,
            });
        }
    }

    rows.sort_by(|a, b| {
        config::method_rank(&a.method)
            .cmp(&config::method_rank(&b.method))
            .then_with(|| a.method.cmp(&b.method))
    });

    let mut totals = ReconTotals::default();
    for row in &rows {
        fold_row(&mut totals, row);
    }

    (rows, totals)
}

/// Reconcile system-reported sections against physically-counted
/// closings. Deterministic and total: every numeric edge case
/// degenerates rather than failing.
pub fn reconcile(sections: &SectionReport, counters: &NormalizedCounters) -> ReconciliationResult {
    let rate = counters.rate;

    // Cash-basis POS system per terminal, merged across registers
    let mut fav_pos_system: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();
    let mut fav_buckets = FavBucketTotals::default();
    for m in &sections.fav.methods {
        match PaymentKind::classify(&m.method) {
            PaymentKind::PointOfSale => {
                fav_pos_system.insert(m.method.clone(), (m.local, m.foreign));
            }
            PaymentKind::MobileTransfer => {
                fav_buckets.mobile_local = round2(fav_buckets.mobile_local + m.local);
                fav_buckets.mobile_foreign = round2(fav_buckets.mobile_foreign + m.foreign);
            }
            PaymentKind::CashForeign => {
                fav_buckets.cash_foreign = round2(fav_buckets.cash_foreign + m.foreign);
            }
            PaymentKind::PeerTransfer => {
                fav_buckets.peer_foreign = round2(fav_buckets.peer_foreign + m.foreign);
            }
            PaymentKind::CashLocal => {}
        }
    }

    let mut nen_pos_system: BTreeMap<String, Decimal> = BTreeMap::new();
    for m in &sections.nen.methods {
        if PaymentKind::classify(&m.method) == PaymentKind::PointOfSale {
            nen_pos_system.insert(m.method.clone(), m.foreign);
        }
    }

    let (fav_registers, fav_totals, cash_local_counted_local, cash_local_counted_foreign) =
        allocate_fav_registers(sections, counters, rate, &fav_pos_system, &nen_pos_system);
    fav_buckets.cash_local_counted_local = cash_local_counted_local;
    fav_buckets.cash_local_counted_foreign = cash_local_counted_foreign;

    let (nen_rows, nen_totals) =
        allocate_nen(sections, counters, rate, &fav_pos_system, &fav_buckets);

    let mut grand = ReconTotals::default();
    fold_totals(&mut grand, &fav_totals);
    fold_totals(&mut grand, &nen_totals);

    let rounding_adjustment = round2(grand.counted_foreign - grand.system_foreign);
    let rounding_pct = if grand.system_foreign.is_zero() {
        Decimal::ZERO
    } else {
        round2(rounding_adjustment.abs() / grand.system_foreign * Decimal::ONE_HUNDRED)
    };
    let warning = rounding_pct > ONE_PERCENT;
    if warning {
        tracing::warn!(
            %rounding_adjustment,
            %rounding_pct,
            "reconciliation variance exceeds 1% of system total"
        );
    }

    ReconciliationResult {
        fav_registers,
        fav_totals,
        nen_rows,
        nen_totals,
        grand,
        rounding_adjustment,
        rounding_pct,
        warning,
    }
}
