//! Order extraction from exported chat lines.
//!
//! The operator's customers send orders as chat messages in a loose but
//! recognizable shape:
//!
//! ```text
//! Order: 2 Biryani, 1 Naan | Name: John Doe | Date: 2024-06-27
//! ```
//!
//! Everything else in the export (greetings, confirmations, forwarded
//! media placeholders) is chatter and is skipped. Lines that carry the
//! order marker but cannot be parsed are rejected with a reason rather
//! than dropped silently.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use tracing::debug;

use tiffinsight_core::{DomainError, OrderRecord};

use crate::dates::parse_flexible_date;

fn order_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)order:\s*(.*?)\s*\|\s*name:\s*(.*?)\s*\|\s*date:\s*(.*)$")
            .expect("order pattern compiles")
    })
}

/// Why an order-looking line was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "raw")]
pub enum RejectReason {
    /// Carries the `Order:` marker but not the full three-field shape.
    MalformedMessage,
    BadDate(String),
    BadQuantity(String),
    EmptyCustomer,
    EmptyItem,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::MalformedMessage => write!(f, "message does not match the order shape"),
            RejectReason::BadDate(raw) => write!(f, "unparseable date `{raw}`"),
            RejectReason::BadQuantity(raw) => write!(f, "unparseable quantity in `{raw}`"),
            RejectReason::EmptyCustomer => write!(f, "empty customer name"),
            RejectReason::EmptyItem => write!(f, "item entry has no name"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RejectedLine {
    /// 1-based line number in the export.
    pub line_no: usize,
    pub line: String,
    pub reason: RejectReason,
}

/// Valid records plus everything that was lost and why.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChatParseOutcome {
    pub records: Vec<OrderRecord>,
    pub rejected: Vec<RejectedLine>,
    /// Non-blank lines without the order marker (ordinary chatter).
    pub skipped_lines: usize,
}

/// Parses one chat export given as a whole text blob.
pub fn parse_chat_text(text: &str) -> ChatParseOutcome {
    parse_chat_lines(text.lines())
}

/// Parses chat lines into order records.
///
/// A multi-item message yields one record per item entry; a bad entry
/// rejects only that entry, the rest of the message still parses.
pub fn parse_chat_lines<I, S>(lines: I) -> ChatParseOutcome
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut outcome = ChatParseOutcome::default();

    for (index, raw_line) in lines.into_iter().enumerate() {
        let line_no = index + 1;
        let line = raw_line.as_ref().trim();
        if line.is_empty() {
            continue;
        }

        match order_pattern().captures(line) {
            Some(captures) => {
                let items_raw = captures.get(1).map_or("", |group| group.as_str());
                let customer = captures.get(2).map_or("", |group| group.as_str()).trim();
                let date_raw = captures.get(3).map_or("", |group| group.as_str()).trim();
                parse_order_message(line_no, line, items_raw, customer, date_raw, &mut outcome);
            }
            None if line.to_ascii_lowercase().contains("order:") => {
                reject(&mut outcome, line_no, line, RejectReason::MalformedMessage);
            }
            None => outcome.skipped_lines += 1,
        }
    }

    debug!(
        records = outcome.records.len(),
        rejected = outcome.rejected.len(),
        skipped = outcome.skipped_lines,
        "parsed chat export"
    );
    outcome
}

fn parse_order_message(
    line_no: usize,
    line: &str,
    items_raw: &str,
    customer: &str,
    date_raw: &str,
    outcome: &mut ChatParseOutcome,
) {
    if customer.is_empty() {
        reject(outcome, line_no, line, RejectReason::EmptyCustomer);
        return;
    }

    let Some(date) = parse_flexible_date(date_raw) else {
        reject(outcome, line_no, line, RejectReason::BadDate(date_raw.to_string()));
        return;
    };

    for entry in items_raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }

        let (quantity_raw, item) = match entry.split_once(char::is_whitespace) {
            Some(parts) => parts,
            None => {
                reject(outcome, line_no, line, RejectReason::BadQuantity(entry.to_string()));
                continue;
            }
        };
        let Ok(quantity) = quantity_raw.parse::<u32>() else {
            reject(outcome, line_no, line, RejectReason::BadQuantity(entry.to_string()));
            continue;
        };

        match OrderRecord::new(date, customer, item, quantity) {
            Ok(record) => outcome.records.push(record),
            Err(error) => {
                let reason = match error {
                    DomainError::ZeroQuantity { .. } => {
                        RejectReason::BadQuantity(entry.to_string())
                    }
                    DomainError::EmptyCustomer { .. } => RejectReason::EmptyCustomer,
                    DomainError::EmptyItem { .. } => RejectReason::EmptyItem,
                };
                reject(outcome, line_no, line, reason);
            }
        }
    }
}

fn reject(outcome: &mut ChatParseOutcome, line_no: usize, line: &str, reason: RejectReason) {
    debug!(line_no, reason = %reason, "rejected chat line");
    outcome.rejected.push(RejectedLine { line_no, line: line.to_string(), reason });
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{parse_chat_lines, parse_chat_text, RejectReason};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn multi_item_message_yields_one_record_per_item() {
        let outcome =
            parse_chat_text("Order: 2 Biryani, 1 Naan | Name: John Doe | Date: 2024-06-27");

        assert_eq!(outcome.records.len(), 2);
        assert!(outcome.rejected.is_empty());

        let first = &outcome.records[0];
        assert_eq!(first.date, date(2024, 6, 27));
        assert_eq!(first.customer, "John Doe");
        assert_eq!(first.item, "Biryani");
        assert_eq!(first.quantity, 2);
        assert_eq!(outcome.records[1].item, "Naan");
        assert_eq!(outcome.records[1].quantity, 1);
    }

    #[test]
    fn marker_is_case_insensitive_and_dates_are_flexible() {
        let outcome = parse_chat_text("order: 1 Dal Tadka | name: Priya | date: 6/27/24");

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].item, "Dal Tadka");
        assert_eq!(outcome.records[0].date, date(2024, 6, 27));
    }

    #[test]
    fn chatter_is_skipped_not_rejected() {
        let export = "\
Hi, are deliveries on today?
Order: 1 Biryani | Name: John | Date: 2024-06-27
Thanks! See you at noon.
";
        let outcome = parse_chat_text(export);
        assert_eq!(outcome.records.len(), 1);
        assert!(outcome.rejected.is_empty());
        assert_eq!(outcome.skipped_lines, 2);
    }

    #[test]
    fn bad_date_rejects_the_message_with_the_raw_value() {
        let outcome = parse_chat_text("Order: 1 Biryani | Name: John | Date: tomorrow");

        assert!(outcome.records.is_empty());
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].line_no, 1);
        assert_eq!(outcome.rejected[0].reason, RejectReason::BadDate("tomorrow".to_string()));
    }

    #[test]
    fn bad_entry_rejects_only_itself() {
        let outcome =
            parse_chat_text("Order: two Biryani, 1 Naan | Name: John | Date: 2024-06-27");

        assert_eq!(outcome.records.len(), 1);
        assert_eq!(outcome.records[0].item, "Naan");
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(
            outcome.rejected[0].reason,
            RejectReason::BadQuantity("two Biryani".to_string())
        );
    }

    #[test]
    fn zero_quantity_and_missing_name_are_typed_rejects() {
        let zero = parse_chat_text("Order: 0 Biryani | Name: John | Date: 2024-06-27");
        assert_eq!(zero.rejected[0].reason, RejectReason::BadQuantity("0 Biryani".to_string()));

        let anonymous = parse_chat_text("Order: 1 Biryani | Name:  | Date: 2024-06-27");
        assert_eq!(anonymous.rejected[0].reason, RejectReason::EmptyCustomer);
    }

    #[test]
    fn order_marker_without_the_full_shape_is_malformed() {
        let outcome = parse_chat_text("Order: 2 Biryani for tomorrow please");
        assert_eq!(outcome.rejected.len(), 1);
        assert_eq!(outcome.rejected[0].reason, RejectReason::MalformedMessage);
        assert_eq!(outcome.skipped_lines, 0);
    }

    #[test]
    fn entry_without_an_item_name_is_rejected() {
        let outcome = parse_chat_text("Order: 2 | Name: John | Date: 2024-06-27");
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.rejected.len(), 1);
    }

    #[test]
    fn line_numbers_are_one_based_across_the_export() {
        let lines = vec![
            "Order: 1 Biryani | Name: John | Date: 2024-06-27",
            "Order: 1 Naan | Name: Asha | Date: not-a-date",
        ];
        let outcome = parse_chat_lines(lines);
        assert_eq!(outcome.rejected[0].line_no, 2);
    }

    #[test]
    fn empty_input_parses_to_an_empty_outcome() {
        let outcome = parse_chat_text("");
        assert!(outcome.records.is_empty());
        assert!(outcome.rejected.is_empty());
        assert_eq!(outcome.skipped_lines, 0);
    }
}
