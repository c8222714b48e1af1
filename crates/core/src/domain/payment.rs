use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::order::OrderLedger;

/// One payment-transfer row, consumed read-only.
///
/// There is no shared key between payments and orders; the only join the
/// system performs is by date, and only for presentation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaymentLedger {
    records: Vec<PaymentRecord>,
}

impl PaymentLedger {
    pub fn new(records: Vec<PaymentRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[PaymentRecord] {
        &self.records
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn total_amount(&self) -> Decimal {
        self.records.iter().map(|record| record.amount).sum()
    }
}

/// Payment totals per calendar day, ascending by date.
pub fn daily_revenue(payments: &PaymentLedger) -> Vec<(NaiveDate, Decimal)> {
    let mut totals: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for record in payments.records() {
        *totals.entry(record.date).or_default() += record.amount;
    }
    totals.into_iter().collect()
}

/// One day of the order-volume vs. payment-amount series.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyReconciliation {
    pub date: NaiveDate,
    pub total_quantity: u64,
    pub total_amount: Decimal,
}

/// Outer-merges order quantities and payment amounts by calendar day.
///
/// Days present on only one side carry a zero for the other; this is a
/// display series, not an identity reconciliation.
pub fn reconcile_daily(orders: &OrderLedger, payments: &PaymentLedger) -> Vec<DailyReconciliation> {
    let mut merged: BTreeMap<NaiveDate, (u64, Decimal)> = BTreeMap::new();
    for record in orders.records() {
        merged.entry(record.date).or_default().0 += u64::from(record.quantity);
    }
    for record in payments.records() {
        merged.entry(record.date).or_default().1 += record.amount;
    }

    merged
        .into_iter()
        .map(|(date, (total_quantity, total_amount))| DailyReconciliation {
            date,
            total_quantity,
            total_amount,
        })
        .collect()
}
