//! Static store and payment-method configuration
//!
//! Fixed lookups consumed by the tax calculator and the reconciliation
//! engine: the store directory (display name + withholding-agent flag),
//! the canonical method labels, the section sort order and the
//! method-to-bucket classification.

use serde::{Deserialize, Serialize};

/// Canonical label for the mobile-transfer method
pub const MOBILE_TRANSFER: &str = "Mobile Transfer";
/// Canonical label for foreign-denominated cash
pub const CASH_USD: &str = "Cash USD";
/// Canonical label for local-currency cash
pub const CASH_LOCAL: &str = "Cash Local";
/// Canonical label for peer-to-peer transfers
pub const PEER_TRANSFER: &str = "Peer Transfer";
/// Fallback label for POS lines whose terminal name is absent
pub const UNNAMED_TERMINAL: &str = "Unnamed";

/// Fixed leading sort order within a section
pub const METHOD_SORT_ORDER: &[&str] = &[CASH_USD, CASH_LOCAL, MOBILE_TRANSFER];

/// Fixed trailing sort order; dynamic terminal names sort between the
/// two fixed lists, alphabetically
pub const METHOD_SORT_AFTER: &[&str] = &[PEER_TRANSFER, UNNAMED_TERMINAL];

/// Methods whose float value is natively read in the foreign currency
pub const DOLLAR_METHODS: &[&str] = &[CASH_USD, PEER_TRANSFER];

/// Payment-type bucket used by the reconciliation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentKind {
    /// Default bucket: any method not matching a fixed label is a
    /// card terminal
    PointOfSale,
    MobileTransfer,
    CashForeign,
    CashLocal,
    PeerTransfer,
}

impl PaymentKind {
    /// Classify a method label into its bucket
    pub fn classify(method: &str) -> Self {
        match method {
            MOBILE_TRANSFER => Self::MobileTransfer,
            CASH_USD => Self::CashForeign,
            CASH_LOCAL => Self::CashLocal,
            PEER_TRANSFER => Self::PeerTransfer,
            _ => Self::PointOfSale,
        }
    }

    /// Canonical label, used when a row has to be synthesized for a
    /// bucket with counted funds but no system rows
    pub fn label(&self) -> &'static str {
        match self {
            Self::PointOfSale => UNNAMED_TERMINAL,
            Self::MobileTransfer => MOBILE_TRANSFER,
            Self::CashForeign => CASH_USD,
            Self::CashLocal => CASH_LOCAL,
            Self::PeerTransfer => PEER_TRANSFER,
        }
    }
}

/// True if the method's float value is read in the foreign currency
pub fn is_dollar_method(method: &str) -> bool {
    DOLLAR_METHODS.contains(&method)
}

/// Sort rank for a method label: fixed leading list first, dynamic
/// terminals in the middle bucket, fixed trailing list last. Ties are
/// broken alphabetically by the caller.
pub fn method_rank(method: &str) -> usize {
    if let Some(idx) = METHOD_SORT_ORDER.iter().position(|m| *m == method) {
        return idx;
    }
    if let Some(idx) = METHOD_SORT_AFTER.iter().position(|m| *m == method) {
        return 1000 + idx;
    }
    500
}

/// Store directory entry
#[derive(Debug, Clone, Serialize)]
pub struct Store {
    pub code: &'static str,
    pub name: &'static str,
    /// Whether the store is designated as a withholding-tax agent
    pub withholding_agent: bool,
}

/// Static store directory
pub const STORES: &[Store] = &[
    Store {
        code: "ST01",
        name: "ST01 - Harbor Plaza",
        withholding_agent: true,
    },
    Store {
        code: "ST28",
        name: "ST28 - Cedar Park",
        withholding_agent: false,
    },
    Store {
        code: "ST88",
        name: "ST88 - Delivery / Virtual",
        withholding_agent: true,
    },
];

/// Store display name; unknown codes echo the code back
pub fn store_name(code: &str) -> String {
    STORES
        .iter()
        .find(|s| s.code == code)
        .map(|s| s.name.to_string())
        .unwrap_or_else(|| code.to_string())
}

/// Withholding-agent flag; unknown stores default to agent
pub fn is_withholding_agent(code: &str) -> bool {
    STORES
        .iter()
        .find(|s| s.code == code)
        .map(|s| s.withholding_agent)
        .unwrap_or(true)
}

/// Resolve a requested store set. Empty input or the `"all"` sentinel
/// expands to the full directory; explicit codes are uppercased.
pub fn resolve_stores(requested: &[String]) -> Vec<String> {
    if requested.is_empty() || (requested.len() == 1 && requested[0].eq_ignore_ascii_case("all")) {
        return STORES.iter().map(|s| s.code.to_string()).collect();
    }
    requested.iter().map(|s| s.to_uppercase()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_fixed_labels_and_default() {
        assert_eq!(PaymentKind::classify(CASH_USD), PaymentKind::CashForeign);
        assert_eq!(PaymentKind::classify(CASH_LOCAL), PaymentKind::CashLocal);
        assert_eq!(
            PaymentKind::classify(MOBILE_TRANSFER),
            PaymentKind::MobileTransfer
        );
        assert_eq!(
            PaymentKind::classify(PEER_TRANSFER),
            PaymentKind::PeerTransfer
        );
        // Anything else is a card terminal
        assert_eq!(PaymentKind::classify("Visa 4412"), PaymentKind::PointOfSale);
        assert_eq!(
            PaymentKind::classify(UNNAMED_TERMINAL),
            PaymentKind::PointOfSale
        );
    }

    #[test]
    fn method_rank_buckets() {
        assert_eq!(method_rank(CASH_USD), 0);
        assert_eq!(method_rank(MOBILE_TRANSFER), 2);
        assert_eq!(method_rank("Visa 4412"), 500);
        assert_eq!(method_rank(PEER_TRANSFER), 1000);
        assert_eq!(method_rank(UNNAMED_TERMINAL), 1001);
    }

    #[test]
    fn unknown_store_defaults_to_agent() {
        assert!(is_withholding_agent("ST99"));
        assert!(!is_withholding_agent("ST28"));
        assert_eq!(store_name("ST99"), "ST99");
    }

    #[test]
    fn resolve_all_and_explicit() {
        let all = resolve_stores(&["all".to_string()]);
        assert_eq!(all, vec!["ST01", "ST28", "ST88"]);
        assert_eq!(resolve_stores(&[]), all);
        assert_eq!(
            resolve_stores(&["st28".to_string()]),
            vec!["ST28".to_string()]
        );
    }
}
