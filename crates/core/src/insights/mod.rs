//! The insight-derivation engine: trend, ranking, lifecycle, and reorder
//! analysis over one immutable order ledger, merged into a single bundle.

pub mod lifecycle;
pub mod ranking;
pub mod reorders;
pub mod summary;
pub mod trends;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::order::OrderLedger;

use lifecycle::{classify_customers, ChurnKind};
use ranking::{flag_low_stock, rank_items, FlatStock, ItemTotal, StockAlert, StockLevelSource};
use reorders::{detect_reorders, Reorder};
use trends::{compute_trends, TrendingItem};

/// Snapshot of all derived metrics for one analysis run.
///
/// The fields are computed independently over the same ledger; none
/// depends on another, and the bundle carries no state beyond the values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InsightBundle {
    pub increasing_items: Vec<TrendingItem>,
    pub top_items: Vec<ItemTotal>,
    pub low_stock: Vec<StockAlert>,
    pub retained_customers: Vec<String>,
    pub churned_customers: BTreeMap<String, ChurnKind>,
    pub reordered_items: Vec<Reorder>,
}

/// Runs the component analyses over a ledger with a chosen ranking depth and
/// stock source. [`InsightEngine::new`] wires the shipped defaults; a real
/// inventory feed slots in via [`InsightEngine::with_stock`].
#[derive(Clone, Debug)]
pub struct InsightEngine<S = FlatStock> {
    top_n: usize,
    stock: S,
}

impl InsightEngine<FlatStock> {
    pub fn new() -> Self {
        Self { top_n: ranking::DEFAULT_TOP_N, stock: FlatStock::default() }
    }
}

impl Default for InsightEngine<FlatStock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: StockLevelSource> InsightEngine<S> {
    pub fn with_stock(stock: S) -> Self {
        Self { top_n: ranking::DEFAULT_TOP_N, stock }
    }

    pub fn top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n.max(1);
        self
    }

    /// One-shot, side-effect-free batch computation; safe to call repeatedly
    /// or concurrently on independent ledgers.
    pub fn compute(&self, ledger: &OrderLedger) -> InsightBundle {
        let top_items = rank_items(ledger, self.top_n);
        let low_stock = flag_low_stock(&top_items, &self.stock);
        let segments = classify_customers(ledger);

        InsightBundle {
            increasing_items: compute_trends(ledger),
            top_items,
            low_stock,
            retained_customers: segments.retained,
            churned_customers: segments.churned,
            reordered_items: detect_reorders(ledger),
        }
    }
}

/// Computes a bundle with the shipped defaults: top 5 items and the
/// placeholder stock source.
pub fn compute_insights(ledger: &OrderLedger) -> InsightBundle {
    InsightEngine::new().compute(ledger)
}
