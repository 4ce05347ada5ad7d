//! Payment decomposition
//!
//! Turns one raw order into zero or more atomic payment lines, one per
//! non-zero payment component. Cash components are netted against the
//! change given back before the positivity test; a component whose net
//! amount is not positive is omitted entirely. All amounts are rounded
//! at line-creation time.

use rust_decimal::Decimal;
use shared::config;
use shared::models::{DocKind, PaymentLine, RawOrder};

use crate::money::{dec, ratio, round2};

/// Normalize a terminal name to title case ("VISA gold" -> "Visa Gold")
pub fn title_case(input: &str) -> String {
    input
        .to_lowercase()
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decompose orders into payment lines. Voided orders are skipped.
pub fn decompose(orders: &[RawOrder], rate: Decimal) -> Vec<PaymentLine> {
    let mut lines = Vec::new();

    for o in orders {
        if o.doc == DocKind::Voided {
            continue;
        }

        // Point-of-sale card
        if o.pos_local > 0.0 || o.pos_foreign > 0.0 {
            let method = match o.terminal.as_deref() {
                Some(name) if !name.trim().is_empty() => title_case(name),
                _ => config::UNNAMED_TERMINAL.to_string(),
            };
            lines.push(PaymentLine {
                order_id: o.order_id.clone(),
                doc: o.doc,
                register_id: o.register_id.clone(),
                method,
                local: round2(dec(o.pos_local)),
                foreign: round2(dec(o.pos_foreign)),
                dollar: false,
            });
        }

        // Mobile transfer
        if o.mobile_local > 0.0 || o.mobile_foreign > 0.0 {
            lines.push(PaymentLine {
                order_id: o.order_id.clone(),
                doc: o.doc,
                register_id: o.register_id.clone(),
                method: config::MOBILE_TRANSFER.to_string(),
                local: round2(dec(o.mobile_local)),
                foreign: round2(dec(o.mobile_foreign)),
                dollar: false,
            });
        }

        // Foreign cash, net of change
        let cash_net = round2(dec(o.cash_foreign) - dec(o.cash_foreign_change));
        if cash_net > Decimal::ZERO {
            lines.push(PaymentLine {
                order_id: o.order_id.clone(),
                doc: o.doc,
                register_id: o.register_id.clone(),
                method: config::CASH_USD.to_string(),
                local: round2(cash_net * rate),
                foreign: cash_net,
                dollar: true,
            });
        }

        // Local cash, net of change
        let local_net = round2(dec(o.cash_local) - dec(o.cash_local_change));
        if local_net > Decimal::ZERO {
            lines.push(PaymentLine {
                order_id: o.order_id.clone(),
                doc: o.doc,
                register_id: o.register_id.clone(),
                method: config::CASH_LOCAL.to_string(),
                local: local_net,
                foreign: ratio(local_net, rate),
                dollar: false,
            });
        }

        // Peer transfer
        if o.peer_transfer > 0.0 {
            let amount = round2(dec(o.peer_transfer));
            lines.push(PaymentLine {
                order_id: o.order_id.clone(),
                doc: o.doc,
                register_id: o.register_id.clone(),
                method: config::PEER_TRANSFER.to_string(),
                local: round2(amount * rate),
                foreign: amount,
                dollar: true,
            });
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_order(id: &str, doc: DocKind) -> RawOrder {
        RawOrder {
            order_id: id.to_string(),
            doc,
            register_id: "R1".to_string(),
            terminal: None,
            pos_local: 0.0,
            pos_foreign: 0.0,
            mobile_local: 0.0,
            mobile_foreign: 0.0,
            cash_foreign: 0.0,
            cash_foreign_change: 0.0,
            cash_local: 0.0,
            cash_local_change: 0.0,
            peer_transfer: 0.0,
        }
    }

    #[test]
    fn title_cases_terminal_names() {
        assert_eq!(title_case("VISA gold 4412"), "Visa Gold 4412");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn voided_orders_emit_nothing() {
        let mut o = base_order("O-1", DocKind::Voided);
        o.pos_local = 116.0;
        o.pos_foreign = 1.0;
        assert!(decompose(&[o], dec(116.0)).is_empty());
    }

    #[test]
    fn pos_line_uses_terminal_or_unnamed() {
        let mut named = base_order("O-1", DocKind::Fav);
        named.terminal = Some("VISA gold".to_string());
        named.pos_local = 116.0;
        let mut unnamed = base_order("O-2", DocKind::Fav);
        unnamed.pos_foreign = 1.0;

        let lines = decompose(&[named, unnamed], dec(116.0));
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].method, "Visa Gold");
        assert!(!lines[0].dollar);
        assert_eq!(lines[1].method, config::UNNAMED_TERMINAL);
    }

    #[test]
    fn foreign_cash_nets_change_and_converts() {
        // cash 10, change 2, rate 100 -> net 8, local 800
        let mut o = base_order("O-1", DocKind::Fav);
        o.cash_foreign = 10.0;
        o.cash_foreign_change = 2.0;

        let lines = decompose(&[o], dec(100.0));
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].method, config::CASH_USD);
        assert_eq!(lines[0].foreign, dec(8.0));
        assert_eq!(lines[0].local, dec(800.0));
        assert!(lines[0].dollar);
    }

    #[test]
    fn fully_refunded_cash_is_omitted() {
        let mut o = base_order("O-1", DocKind::Fav);
        o.cash_local = 50.0;
        o.cash_local_change = 50.0;
        o.cash_foreign = 3.0;
        o.cash_foreign_change = 4.0;
        assert!(decompose(&[o], dec(100.0)).is_empty());
    }

    #[test]
    fn local_cash_divides_by_rate() {
        let mut o = base_order("O-1", DocKind::Nen);
        o.cash_local = 232.0;

        let lines = decompose(&[o], dec(116.0));
        assert_eq!(lines[0].method, config::CASH_LOCAL);
        assert_eq!(lines[0].local, dec(232.0));
        assert_eq!(lines[0].foreign, dec(2.0));
        assert!(!lines[0].dollar);
    }

    #[test]
    fn peer_transfer_is_dollar_denominated() {
        let mut o = base_order("O-1", DocKind::Fav);
        o.peer_transfer = 5.5;

        let lines = decompose(&[o], dec(100.0));
        assert_eq!(lines[0].method, config::PEER_TRANSFER);
        assert_eq!(lines[0].local, dec(550.0));
        assert_eq!(lines[0].foreign, dec(5.5));
        assert!(lines[0].dollar);
    }

    #[test]
    fn decomposition_is_lossless_per_order() {
        // One order paying with every component; the emitted foreign
        // amounts must sum to the order's net components.
        let mut o = base_order("O-1", DocKind::Fav);
        o.terminal = Some("visa".to_string());
        o.pos_foreign = 1.0;
        o.pos_local = 100.0;
        o.mobile_foreign = 2.0;
        o.mobile_local = 200.0;
        o.cash_foreign = 10.0;
        o.cash_foreign_change = 2.0;
        o.cash_local = 300.0;
        o.peer_transfer = 4.0;

        let lines = decompose(&[o], dec(100.0));
        assert_eq!(lines.len(), 5);
        let total_foreign: Decimal = lines.iter().map(|l| l.foreign).sum();
        // 1 + 2 + 8 + 3 + 4
        assert_eq!(total_foreign, dec(18.0));
    }
}
