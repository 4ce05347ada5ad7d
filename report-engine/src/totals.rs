//! Tax derivation and section roll-up
//!
//! For each aggregated method: net-of-tax backs the consumption tax out
//! of the local amount (16% inclusive), and the withholding tax applies
//! only to dollar-denominated cash-basis methods at agent-designated
//! stores. Sections carry a merged cross-register view and, for the
//! cash-basis section, a per-register view; both are computed from the
//! same payment lines so they cannot drift.

use rust_decimal::Decimal;
use shared::config;
use shared::models::{
    AggregatedMethod, DocKind, PaymentLine, RateCrossCheck, RegisterSection, Section,
    SectionReport, SectionSums,
};
use std::collections::BTreeMap;

use crate::aggregate::{MethodGroup, aggregate, aggregate_by_method};
use crate::money::{ratio, round2};

/// Consumption tax divisor: local amounts are tax-inclusive at 16%
const TAX_DIVISOR: Decimal = Decimal::from_parts(116, 0, 0, false, 2);
/// Withholding rate on dollar-denominated cash-basis payments (3%)
const WITHHOLDING_RATE: Decimal = Decimal::from_parts(3, 0, 0, false, 2);

fn derive_row(group: &MethodGroup, agent: bool, rate: Decimal) -> AggregatedMethod {
    let dollar = config::is_dollar_method(&group.method);
    let net_of_tax = round2(group.local / TAX_DIVISOR);
    let consumption_tax = round2(group.local - net_of_tax);
    let withholding_tax = if group.doc == DocKind::Fav && dollar && agent {
        round2(group.foreign * WITHHOLDING_RATE * rate)
    } else {
        Decimal::ZERO
    };

    AggregatedMethod {
        method: group.method.clone(),
        local: group.local,
        foreign: group.foreign,
        count: group.count,
        net_of_tax,
        consumption_tax,
        withholding_tax,
        dollar,
    }
}

/// Sort: fixed leading list, then dynamic terminals alphabetically,
/// then the fixed trailing list; ties alphabetical.
fn sort_rows(rows: &mut [AggregatedMethod]) {
    rows.sort_by(|a, b| {
        config::method_rank(&a.method)
            .cmp(&config::method_rank(&b.method))
            .then_with(|| a.method.cmp(&b.method))
    });
}

fn sum_rows(rows: &[AggregatedMethod]) -> SectionSums {
    let mut sums = SectionSums::default();
    for row in rows {
        sums.local = round2(sums.local + row.local);
        sums.foreign = round2(sums.foreign + row.foreign);
        sums.net_of_tax = round2(sums.net_of_tax + row.net_of_tax);
        sums.consumption_tax = round2(sums.consumption_tax + row.consumption_tax);
        sums.withholding_tax = round2(sums.withholding_tax + row.withholding_tax);
    }
    sums
}

fn build_rows(groups: &[MethodGroup], agent: bool, rate: Decimal) -> Vec<AggregatedMethod> {
    let mut rows: Vec<AggregatedMethod> =
        groups.iter().map(|g| derive_row(g, agent, rate)).collect();
    sort_rows(&mut rows);
    rows
}

/// Build both sections, grand totals and the audit cross-check
pub fn calculate_sections(lines: &[PaymentLine], store_code: &str, rate: Decimal) -> SectionReport {
    let agent = config::is_withholding_agent(store_code);

    // Merged views, consolidated across registers
    let fav_rows = build_rows(&aggregate_by_method(lines, DocKind::Fav), agent, rate);
    let nen_rows = build_rows(&aggregate_by_method(lines, DocKind::Nen), agent, rate);

    // Per-register view for the cash-basis section, from the same lines
    let mut by_register: BTreeMap<String, Vec<MethodGroup>> = BTreeMap::new();
    for group in aggregate(lines) {
        if group.doc == DocKind::Fav {
            by_register
                .entry(group.register_id.clone())
                .or_default()
                .push(group);
        }
    }
    let registers: Vec<RegisterSection> = by_register
        .into_iter()
        .map(|(register_id, groups)| {
            let rows = build_rows(&groups, agent, rate);
            let sums = sum_rows(&rows);
            RegisterSection {
                register_id,
                methods: rows,
                sums,
            }
        })
        .collect();

    let fav_sums = sum_rows(&fav_rows);
    let nen_sums = sum_rows(&nen_rows);
    let totals = SectionSums {
        local: round2(fav_sums.local + nen_sums.local),
        foreign: round2(fav_sums.foreign + nen_sums.foreign),
        net_of_tax: round2(fav_sums.net_of_tax + nen_sums.net_of_tax),
        consumption_tax: round2(fav_sums.consumption_tax + nen_sums.consumption_tax),
        withholding_tax: round2(fav_sums.withholding_tax + nen_sums.withholding_tax),
    };

    let local_over_rate = ratio(totals.local, rate);
    let cross_check = RateCrossCheck {
        local_over_rate,
        foreign_total: totals.foreign,
        diff: round2(totals.foreign - local_over_rate),
    };

    SectionReport {
        fav: Section {
            methods: fav_rows,
            sums: fav_sums,
            registers,
        },
        nen: Section {
            methods: nen_rows,
            sums: nen_sums,
            registers: Vec::new(),
        },
        totals,
        cross_check,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::money::dec;

    fn line(
        doc: DocKind,
        register: &str,
        method: &str,
        local: f64,
        foreign: f64,
        dollar: bool,
    ) -> PaymentLine {
        PaymentLine {
            order_id: "O-1".to_string(),
            doc,
            register_id: register.to_string(),
            method: method.to_string(),
            local: dec(local),
            foreign: dec(foreign),
            dollar,
        }
    }

    #[test]
    fn tax_constants_have_the_right_scale() {
        assert_eq!(TAX_DIVISOR, dec(1.16));
        assert_eq!(WITHHOLDING_RATE, dec(0.03));
    }

    #[test]
    fn backs_consumption_tax_out_of_local() {
        // 116 local at a non-agent store: net 100, tax 16, no withholding
        let lines = vec![line(DocKind::Fav, "R1", "Visa", 116.0, 1.0, false)];
        let report = calculate_sections(&lines, "ST28", dec(116.0));

        let row = &report.fav.methods[0];
        assert_eq!(row.net_of_tax, dec(100.0));
        assert_eq!(row.consumption_tax, dec(16.0));
        assert_eq!(row.withholding_tax, Decimal::ZERO);
    }

    #[test]
    fn withholding_only_for_fav_dollar_agent() {
        // 8 foreign at rate 100 for an agent store: 8 * 0.03 * 100 = 24
        let lines = vec![
            line(DocKind::Fav, "R1", config::CASH_USD, 800.0, 8.0, true),
            line(DocKind::Nen, "R1", config::CASH_USD, 800.0, 8.0, true),
            line(DocKind::Fav, "R1", config::CASH_LOCAL, 800.0, 8.0, false),
        ];
        let report = calculate_sections(&lines, "ST01", dec(100.0));

        let fav_usd = report
            .fav
            .methods
            .iter()
            .find(|m| m.method == config::CASH_USD)
            .unwrap();
        assert_eq!(fav_usd.withholding_tax, dec(24.0));

        // Same method under credit-basis: always zero
        assert_eq!(report.nen.methods[0].withholding_tax, Decimal::ZERO);
        // Non-dollar method: always zero
        let fav_local = report
            .fav
            .methods
            .iter()
            .find(|m| m.method == config::CASH_LOCAL)
            .unwrap();
        assert_eq!(fav_local.withholding_tax, Decimal::ZERO);
    }

    #[test]
    fn no_withholding_at_non_agent_store() {
        let lines = vec![line(DocKind::Fav, "R1", config::CASH_USD, 800.0, 8.0, true)];
        let report = calculate_sections(&lines, "ST28", dec(100.0));
        assert_eq!(report.fav.methods[0].withholding_tax, Decimal::ZERO);
    }

    #[test]
    fn section_sort_order() {
        let lines = vec![
            line(DocKind::Fav, "R1", "Visa", 1.0, 0.01, false),
            line(DocKind::Fav, "R1", config::PEER_TRANSFER, 1.0, 0.01, true),
            line(DocKind::Fav, "R1", config::CASH_LOCAL, 1.0, 0.01, false),
            line(DocKind::Fav, "R1", "Amex", 1.0, 0.01, false),
            line(DocKind::Fav, "R1", config::CASH_USD, 1.0, 0.01, true),
        ];
        let report = calculate_sections(&lines, "ST28", dec(100.0));
        let order: Vec<&str> = report
            .fav
            .methods
            .iter()
            .map(|m| m.method.as_str())
            .collect();
        assert_eq!(
            order,
            vec![
                config::CASH_USD,
                config::CASH_LOCAL,
                "Amex",
                "Visa",
                config::PEER_TRANSFER,
            ]
        );
    }

    #[test]
    fn register_views_agree_with_merged_totals() {
        let lines = vec![
            line(DocKind::Fav, "R1", "Visa", 116.0, 1.0, false),
            line(DocKind::Fav, "R2", "Visa", 232.0, 2.0, false),
            line(DocKind::Fav, "R2", config::CASH_LOCAL, 58.0, 0.5, false),
        ];
        let report = calculate_sections(&lines, "ST28", dec(116.0));

        assert_eq!(report.fav.registers.len(), 2);
        let split_local: Decimal = report
            .fav
            .registers
            .iter()
            .map(|r| r.sums.local)
            .fold(Decimal::ZERO, |acc, v| round2(acc + v));
        assert_eq!(split_local, report.fav.sums.local);
    }

    #[test]
    fn cross_check_is_exposed_not_enforced() {
        let lines = vec![line(DocKind::Fav, "R1", "Visa", 116.0, 1.5, false)];
        let report = calculate_sections(&lines, "ST28", dec(116.0));
        assert_eq!(report.cross_check.local_over_rate, dec(1.0));
        assert_eq!(report.cross_check.foreign_total, dec(1.5));
        assert_eq!(report.cross_check.diff, dec(0.5));
    }
}
