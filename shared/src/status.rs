//! Purchase stock status, derived from quantities on demand
//!
//! The status is never an independent flag: it is recomputed from ordered
//! versus launched quantities with the same arithmetic the planner uses.

use serde::{Deserialize, Serialize};

use crate::models::{InventoryUnit, PurchaseOrder, StockStatus};
use crate::planner::launched_count;

/// Ordered, launched and remaining units of an order.
///
/// `ordered == launched + remaining` always holds; `remaining` is summed
/// per line without clamping.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct QuantityLedger {
    pub ordered: i64,
    pub launched: i64,
    pub remaining: i64,
}

impl QuantityLedger {
    /// The ledger after `units` more are launched
    pub fn with_launched(self, units: i64) -> Self {
        Self {
            launched: self.launched + units,
            remaining: self.remaining - units,
            ..self
        }
    }
}

pub fn ledger(order: &PurchaseOrder, units: &[InventoryUnit]) -> QuantityLedger {
    order
        .items
        .iter()
        .fold(QuantityLedger::default(), |mut acc, item| {
            let launched = i64::from(launched_count(item.id, units));
            let ordered = i64::from(item.quantity);
            acc.ordered += ordered;
            acc.launched += launched;
            acc.remaining += ordered - launched;
            acc
        })
}

pub fn reconcile_status(order: &PurchaseOrder, units: &[InventoryUnit]) -> StockStatus {
    if order.stock_status == StockStatus::Cancelled {
        return StockStatus::Cancelled;
    }
    status_from_ledger(&ledger(order, units))
}

pub fn status_from_ledger(ledger: &QuantityLedger) -> StockStatus {
    if ledger.launched <= 0 {
        StockStatus::Pending
    } else if ledger.launched < ledger.ordered {
        StockStatus::PartiallyLaunched
    } else {
        StockStatus::Launched
    }
}
