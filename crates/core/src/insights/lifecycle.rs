//! Customer retention and churn classification.

use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::order::OrderLedger;

/// A customer whose last order is at most this many days old is retained.
pub const RETENTION_WINDOW_DAYS: i64 = 14;

/// A churned multi-order customer whose whole history spans fewer than this
/// many days churned quickly.
pub const QUICK_CHURN_LIFETIME_DAYS: i64 = 7;

/// Why a churned customer stopped ordering, by the shape of their history.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChurnKind {
    /// Only ever placed a single order line.
    Trial,
    /// Several orders clustered inside one week, then silence.
    QuickChurn,
    /// A sustained ordering history before stopping.
    SlowChurn,
}

impl fmt::Display for ChurnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChurnKind::Trial => write!(f, "Trial"),
            ChurnKind::QuickChurn => write!(f, "Quick Churn"),
            ChurnKind::SlowChurn => write!(f, "Slow Churn"),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerSegments {
    /// Customers active within the retention window, sorted by name.
    pub retained: Vec<String>,
    pub churned: BTreeMap<String, ChurnKind>,
}

struct Activity {
    first: NaiveDate,
    last: NaiveDate,
    lines: u32,
}

/// Classifies every customer against the ledger's most recent order date.
///
/// "Now" is deliberately simulated as the max date across the whole ledger so
/// runs are reproducible; use [`classify_customers_at`] to supply a wall-clock
/// or otherwise explicit reference date.
pub fn classify_customers(ledger: &OrderLedger) -> CustomerSegments {
    match ledger.max_date() {
        Some(reference) => classify_customers_at(ledger, reference),
        None => CustomerSegments::default(),
    }
}

/// Classifies every customer against an explicit reference date.
///
/// Recency is clamped at zero when the reference predates a customer's last
/// order, so an early reference can only make customers look more recent,
/// never negatively recent.
pub fn classify_customers_at(ledger: &OrderLedger, reference: NaiveDate) -> CustomerSegments {
    let mut per_customer: BTreeMap<&str, Activity> = BTreeMap::new();
    for record in ledger.records() {
        per_customer
            .entry(record.customer.as_str())
            .and_modify(|activity| {
                activity.first = activity.first.min(record.date);
                activity.last = activity.last.max(record.date);
                activity.lines += 1;
            })
            .or_insert(Activity { first: record.date, last: record.date, lines: 1 });
    }

    let mut segments = CustomerSegments::default();
    for (customer, activity) in per_customer {
        let recency_days = (reference - activity.last).num_days().max(0);
        if recency_days <= RETENTION_WINDOW_DAYS {
            segments.retained.push(customer.to_string());
            continue;
        }

        let lifetime_days = (activity.last - activity.first).num_days();
        let kind = if activity.lines == 1 {
            ChurnKind::Trial
        } else if lifetime_days < QUICK_CHURN_LIFETIME_DAYS {
            ChurnKind::QuickChurn
        } else {
            ChurnKind::SlowChurn
        };
        segments.churned.insert(customer.to_string(), kind);
    }

    segments
}
