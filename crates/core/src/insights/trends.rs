//! Week-over-week demand trend detection.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::order::{OrderLedger, WeekBucket};

/// How many trailing weeks a trend verdict is based on.
pub const TREND_WINDOW_WEEKS: usize = 3;

/// An item whose demand rose strictly across the trailing trend window.
///
/// Keeps the raw weekly quantities so a consumer can see the magnitude of the
/// trend, not just the flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrendingItem {
    pub item: String,
    pub window: [u32; TREND_WINDOW_WEEKS],
}

/// Flags items whose weekly quantities rose strictly across the last
/// `TREND_WINDOW_WEEKS` observed weeks of the ledger.
///
/// The week axis is the sorted distinct weeks with at least one order of any
/// item; within that axis an item's quiet weeks count as zero. Items ordered
/// in fewer than `TREND_WINDOW_WEEKS` distinct weeks are excluded outright,
/// so a newcomer cannot be flagged off a zero-padded window. The rule is an
/// exact deterministic comparison; equal neighbors never count as a rise.
pub fn compute_trends(ledger: &OrderLedger) -> Vec<TrendingItem> {
    let axis = ledger.observed_weeks();
    if axis.len() < TREND_WINDOW_WEEKS {
        return Vec::new();
    }
    let recent = &axis[axis.len() - TREND_WINDOW_WEEKS..];

    let mut per_item: BTreeMap<&str, BTreeMap<WeekBucket, u32>> = BTreeMap::new();
    for record in ledger.records() {
        *per_item
            .entry(record.item.as_str())
            .or_default()
            .entry(record.week())
            .or_default() += record.quantity;
    }

    per_item
        .into_iter()
        .filter(|(_, weekly)| weekly.len() >= TREND_WINDOW_WEEKS)
        .filter_map(|(item, weekly)| {
            let mut window = [0u32; TREND_WINDOW_WEEKS];
            for (slot, week) in window.iter_mut().zip(recent) {
                *slot = weekly.get(week).copied().unwrap_or(0);
            }

            let strictly_increasing = window.windows(2).all(|pair| pair[0] < pair[1]);
            strictly_increasing.then(|| TrendingItem { item: item.to_string(), window })
        })
        .collect()
}
