//! Headline metrics for a dashboard summary view.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order::OrderLedger;
use crate::domain::payment::PaymentLedger;
use crate::insights::lifecycle::classify_customers;

/// Plain-number rollup of one analysis run, for a presentation layer to
/// render however it likes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LedgerSummary {
    pub total_order_lines: usize,
    pub unique_customers: usize,
    pub unique_items: usize,
    pub total_quantity: u64,
    pub total_revenue: Decimal,
    pub average_order_value: Decimal,
    pub average_lines_per_customer: f64,
    pub retention_rate_pct: f64,
}

/// Rolls the ledger (and optionally the payment file) up into headline
/// metrics. Ratios over an empty denominator report as zero rather than
/// erroring; an absent payment ledger zeroes the revenue figures.
pub fn summarize(orders: &OrderLedger, payments: Option<&PaymentLedger>) -> LedgerSummary {
    let total_order_lines = orders.len();
    let mut customers = BTreeSet::new();
    let mut items = BTreeSet::new();
    let mut total_quantity = 0u64;
    for record in orders.records() {
        customers.insert(record.customer.as_str());
        items.insert(record.item.as_str());
        total_quantity += u64::from(record.quantity);
    }

    let total_revenue = payments.map(PaymentLedger::total_amount).unwrap_or_default();
    let average_order_value = if total_order_lines == 0 {
        Decimal::ZERO
    } else {
        total_revenue / Decimal::from(total_order_lines as u64)
    };

    let unique_customers = customers.len();
    let average_lines_per_customer = if unique_customers == 0 {
        0.0
    } else {
        total_order_lines as f64 / unique_customers as f64
    };
    let retention_rate_pct = if unique_customers == 0 {
        0.0
    } else {
        let retained = classify_customers(orders).retained.len();
        retained as f64 / unique_customers as f64 * 100.0
    };

    LedgerSummary {
        total_order_lines,
        unique_customers,
        unique_items: items.len(),
        total_quantity,
        total_revenue,
        average_order_value,
        average_lines_per_customer,
        retention_rate_pct,
    }
}
