//! Line aggregation
//!
//! Groups payment lines into per-method totals. Cash-basis lines key on
//! (register, method) because FAV activity is audited till by till;
//! credit-basis lines consolidate store-wide regardless of the register
//! that originated them. Running sums are re-rounded after every
//! increment.

use rust_decimal::Decimal;
use shared::models::{DocKind, PaymentLine};
use std::collections::BTreeMap;

use crate::money::round2;

/// One grouped total, before tax derivation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodGroup {
    pub doc: DocKind,
    /// Empty for consolidated (credit-basis or merged-view) groups
    pub register_id: String,
    pub method: String,
    pub local: Decimal,
    pub foreign: Decimal,
    pub count: u32,
}

fn fold<'a>(
    lines: impl Iterator<Item = &'a PaymentLine>,
    key_fn: impl Fn(&PaymentLine) -> (DocKind, String, String),
) -> Vec<MethodGroup> {
    let mut map: BTreeMap<(DocKind, String, String), MethodGroup> = BTreeMap::new();

    for line in lines {
        let key = key_fn(line);
        let entry = map.entry(key.clone()).or_insert_with(|| MethodGroup {
            doc: key.0,
            register_id: key.1,
            method: key.2,
            local: Decimal::ZERO,
            foreign: Decimal::ZERO,
            count: 0,
        });
        entry.local = round2(entry.local + line.local);
        entry.foreign = round2(entry.foreign + line.foreign);
        entry.count += 1;
    }

    map.into_values().collect()
}

/// Aggregate by the canonical grouping key: register is part of the key
/// only for cash-basis lines.
pub fn aggregate(lines: &[PaymentLine]) -> Vec<MethodGroup> {
    fold(lines.iter(), |l| {
        let register = match l.doc {
            DocKind::Fav => l.register_id.clone(),
            _ => String::new(),
        };
        (l.doc, register, l.method.clone())
    })
}

/// Aggregate one classification's lines by method alone, consolidating
/// across registers. Used for the merged cash-basis view.
pub fn aggregate_by_method(lines: &[PaymentLine], doc: DocKind) -> Vec<MethodGroup> {
    fold(lines.iter().filter(|l| l.doc == doc), |l| {
        (l.doc, String::new(), l.method.clone())
    })
}
