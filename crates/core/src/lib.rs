pub mod config;
pub mod domain;
pub mod errors;
pub mod insights;

pub use domain::order::{OrderLedger, OrderRecord, WeekBucket};
pub use domain::payment::{
    daily_revenue, reconcile_daily, DailyReconciliation, PaymentLedger, PaymentRecord,
};
pub use errors::DomainError;
pub use insights::lifecycle::{
    classify_customers, classify_customers_at, ChurnKind, CustomerSegments,
};
pub use insights::ranking::{
    flag_low_stock, rank_items, FlatStock, ItemTotal, StockAlert, StockLevelSource, TableStock,
};
pub use insights::reorders::{detect_reorders, Reorder};
pub use insights::summary::{summarize, LedgerSummary};
pub use insights::trends::{compute_trends, TrendingItem};
pub use insights::{compute_insights, InsightBundle, InsightEngine};
