//! Raw order model
//!
//! One sale transaction as reported by the transactional backend.
//! Missing numeric fields deserialize to zero rather than failing the
//! batch; a malformed record is a degenerate record, not an error.

use serde::{Deserialize, Serialize};

/// Document classification, a closed set
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DocKind {
    /// Cash-basis invoice, tracked per register
    #[serde(rename = "FAV")]
    Fav,
    /// Credit-basis note, consolidated store-wide
    #[serde(rename = "NEN")]
    Nen,
    /// Voided/cancelled document, excluded from every computation
    #[serde(rename = "VOID")]
    Voided,
}

/// One raw sale transaction (read-only external input)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOrder {
    pub order_id: String,
    pub doc: DocKind,
    #[serde(default)]
    pub register_id: String,
    /// Card terminal name as keyed in at the till, if any
    #[serde(default)]
    pub terminal: Option<String>,

    // Point-of-sale card amounts
    #[serde(default)]
    pub pos_local: f64,
    #[serde(default)]
    pub pos_foreign: f64,

    // Mobile transfer amounts
    #[serde(default)]
    pub mobile_local: f64,
    #[serde(default)]
    pub mobile_foreign: f64,

    // Foreign-currency cash tendered and the change given back
    #[serde(default)]
    pub cash_foreign: f64,
    #[serde(default)]
    pub cash_foreign_change: f64,

    // Local-currency cash tendered and the change given back
    #[serde(default)]
    pub cash_local: f64,
    #[serde(default)]
    pub cash_local_change: f64,

    /// Peer-to-peer transfer, foreign currency
    #[serde(default)]
    pub peer_transfer: f64,
}
