use std::fmt;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// The calendar week containing a date, identified by its Monday.
///
/// A record's week is always recomputed from its date; it is never stored on
/// the record, so bucket boundaries are fixed by the calendar rather than by
/// any "now" reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekBucket(NaiveDate);

impl WeekBucket {
    pub fn containing(date: NaiveDate) -> Self {
        let offset = i64::from(date.weekday().num_days_from_monday());
        Self(date - Duration::days(offset))
    }

    /// Monday of this week.
    pub fn start(&self) -> NaiveDate {
        self.0
    }

    /// Sunday of this week.
    pub fn end(&self) -> NaiveDate {
        self.0 + Duration::days(6)
    }

    pub fn succ(&self) -> Self {
        Self(self.0 + Duration::days(7))
    }
}

impl fmt::Display for WeekBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let iso = self.0.iso_week();
        write!(f, "{}-W{:02}", iso.year(), iso.week())
    }
}

/// One line-item within an order, as produced by an ingest adapter.
///
/// Invariants: quantity >= 1, customer and item non-empty. Customer and item
/// are opaque identity keys; no case or whitespace normalization is applied
/// beyond trimming the surrounding whitespace the adapters leave behind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    pub date: NaiveDate,
    pub customer: String,
    pub item: String,
    pub quantity: u32,
}

impl OrderRecord {
    pub fn new(
        date: NaiveDate,
        customer: impl Into<String>,
        item: impl Into<String>,
        quantity: u32,
    ) -> Result<Self, DomainError> {
        let record = Self {
            date,
            customer: customer.into().trim().to_string(),
            item: item.into().trim().to_string(),
            quantity,
        };
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.customer.trim().is_empty() {
            return Err(DomainError::EmptyCustomer { item: self.item.clone(), date: self.date });
        }
        if self.item.trim().is_empty() {
            return Err(DomainError::EmptyItem {
                customer: self.customer.clone(),
                date: self.date,
            });
        }
        if self.quantity == 0 {
            return Err(DomainError::ZeroQuantity {
                customer: self.customer.clone(),
                item: self.item.clone(),
                date: self.date,
            });
        }
        Ok(())
    }

    pub fn week(&self) -> WeekBucket {
        WeekBucket::containing(self.date)
    }
}

/// The full set of normalized order line-items under analysis.
///
/// Owned by the caller for the duration of one insight computation; every
/// component reads it and produces new derived structures, never mutating it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrderLedger {
    records: Vec<OrderRecord>,
}

impl OrderLedger {
    /// Builds a ledger, failing fast on any record that violates the
    /// `OrderRecord` invariants. Expected business sparsity (an empty record
    /// set) is a valid ledger, not an error.
    pub fn new(records: Vec<OrderRecord>) -> Result<Self, DomainError> {
        for record in &records {
            record.validate()?;
        }
        Ok(Self { records })
    }

    pub fn records(&self) -> &[OrderRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// The most recent order date across the whole ledger, used as the
    /// simulated "now" by the lifecycle classifier.
    pub fn max_date(&self) -> Option<NaiveDate> {
        self.records.iter().map(|record| record.date).max()
    }

    /// Sorted distinct week buckets with at least one order, the time axis
    /// for trend detection.
    pub fn observed_weeks(&self) -> Vec<WeekBucket> {
        let mut weeks: Vec<WeekBucket> = self.records.iter().map(OrderRecord::week).collect();
        weeks.sort_unstable();
        weeks.dedup();
        weeks
    }
}
