//! Item ranking and low-stock flagging.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::order::OrderLedger;

/// Default number of items reported by the ranking.
pub const DEFAULT_TOP_N: usize = 5;

/// Items at or above this many units on hand are not flagged.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// Stand-in stock level used until a real inventory feed is wired in.
pub const PLACEHOLDER_STOCK_QTY: u32 = 8;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTotal {
    pub item: String,
    pub total_quantity: u64,
}

/// Top-`n` items by total ordered quantity, descending; equal totals are
/// broken by ascending item name so the ranking is stable across runs.
pub fn rank_items(ledger: &OrderLedger, n: usize) -> Vec<ItemTotal> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for record in ledger.records() {
        *totals.entry(record.item.as_str()).or_default() += u64::from(record.quantity);
    }

    let mut ranked: Vec<ItemTotal> = totals
        .into_iter()
        .map(|(item, total_quantity)| ItemTotal { item: item.to_string(), total_quantity })
        .collect();
    ranked.sort_by(|a, b| {
        b.total_quantity.cmp(&a.total_quantity).then_with(|| a.item.cmp(&b.item))
    });
    ranked.truncate(n);
    ranked
}

/// Current-stock lookup, injected so a real inventory source can replace the
/// placeholder without touching the flagging logic.
pub trait StockLevelSource {
    fn current_stock(&self, item: &str) -> u32;
}

/// Reports the same stock level for every item. `FlatStock::default()` is the
/// placeholder feed the system ships with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlatStock(pub u32);

impl Default for FlatStock {
    fn default() -> Self {
        Self(PLACEHOLDER_STOCK_QTY)
    }
}

impl StockLevelSource for FlatStock {
    fn current_stock(&self, _item: &str) -> u32 {
        self.0
    }
}

/// Stock levels from an explicit table, e.g. a stock CSV export. Items absent
/// from the table count as out of stock.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableStock {
    levels: BTreeMap<String, u32>,
}

impl TableStock {
    pub fn new(levels: BTreeMap<String, u32>) -> Self {
        Self { levels }
    }
}

impl StockLevelSource for TableStock {
    fn current_stock(&self, item: &str) -> u32 {
        self.levels.get(item).copied().unwrap_or(0)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockAlert {
    pub item: String,
    pub stock_qty: u32,
}

/// Flags every ranked item whose stock level sits below
/// [`LOW_STOCK_THRESHOLD`], preserving the ranking order.
pub fn flag_low_stock<S>(ranked: &[ItemTotal], stock: &S) -> Vec<StockAlert>
where
    S: StockLevelSource + ?Sized,
{
    ranked
        .iter()
        .filter_map(|entry| {
            let stock_qty = stock.current_stock(&entry.item);
            (stock_qty < LOW_STOCK_THRESHOLD)
                .then(|| StockAlert { item: entry.item.clone(), stock_qty })
        })
        .collect()
}
