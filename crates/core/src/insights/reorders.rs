//! Repeat-purchase detection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::order::OrderLedger;

/// A (customer, item) pair ordered across more than one order line.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reorder {
    pub customer: String,
    pub item: String,
    pub order_count: u32,
}

/// Every (customer, item) pair appearing on more than one order line over the
/// whole ledger, sorted by customer then item. Line occurrences are counted;
/// quantities are irrelevant, and there is no time window.
pub fn detect_reorders(ledger: &OrderLedger) -> Vec<Reorder> {
    let mut counts: BTreeMap<(&str, &str), u32> = BTreeMap::new();
    for record in ledger.records() {
        *counts.entry((record.customer.as_str(), record.item.as_str())).or_default() += 1;
    }

    counts
        .into_iter()
        .filter(|(_, order_count)| *order_count > 1)
        .map(|((customer, item), order_count)| Reorder {
            customer: customer.to_string(),
            item: item.to_string(),
            order_count,
        })
        .collect()
}
