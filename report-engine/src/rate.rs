//! Exchange-rate derivation
//!
//! The implied local-per-foreign-unit rate comes from the order data
//! itself: the first order paying by card with both amounts strictly
//! positive, falling back to the first mobile transfer with both
//! amounts positive. No sane default exists, so failure here is fatal
//! for the whole (date, store) report.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shared::ReportError;
use shared::models::RawOrder;

use crate::money::{dec, round2};

/// Derive the exchange rate from a day's orders
pub fn derive_rate(
    orders: &[RawOrder],
    date: NaiveDate,
    store: &str,
) -> Result<Decimal, ReportError> {
    for o in orders {
        if o.pos_foreign > 0.0 && o.pos_local > 0.0 {
            let rate = round2(dec(o.pos_local) / dec(o.pos_foreign));
            tracing::debug!(order_id = %o.order_id, %rate, "derived rate from POS amounts");
            return Ok(rate);
        }
    }
    for o in orders {
        if o.mobile_foreign > 0.0 && o.mobile_local > 0.0 {
            let rate = round2(dec(o.mobile_local) / dec(o.mobile_foreign));
            tracing::debug!(order_id = %o.order_id, %rate, "derived rate from mobile amounts");
            return Ok(rate);
        }
    }
    Err(ReportError::RateUndeterminable {
        date,
        store: store.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::DocKind;

    fn order(pos_local: f64, pos_foreign: f64, mobile_local: f64, mobile_foreign: f64) -> RawOrder {
        RawOrder {
            order_id: "O-1".to_string(),
            doc: DocKind::Fav,
            register_id: "R1".to_string(),
            terminal: None,
            pos_local,
            pos_foreign,
            mobile_local,
            mobile_foreign,
            cash_foreign: 0.0,
            cash_foreign_change: 0.0,
            cash_local: 0.0,
            cash_local_change: 0.0,
            peer_transfer: 0.0,
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn pos_pair_wins_over_mobile() {
        let orders = vec![order(0.0, 0.0, 210.0, 2.0), order(116.0, 1.0, 0.0, 0.0)];
        assert_eq!(derive_rate(&orders, date(), "ST01").unwrap(), dec(116.0));
    }

    #[test]
    fn mobile_pair_is_the_fallback() {
        let orders = vec![order(50.0, 0.0, 0.0, 0.0), order(0.0, 0.0, 210.0, 2.0)];
        assert_eq!(derive_rate(&orders, date(), "ST01").unwrap(), dec(105.0));
    }

    #[test]
    fn no_usable_pair_is_fatal() {
        let orders = vec![order(50.0, 0.0, 0.0, 3.0)];
        let err = derive_rate(&orders, date(), "ST01").unwrap_err();
        assert!(matches!(err, ReportError::RateUndeterminable { .. }));
    }
}
