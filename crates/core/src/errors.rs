use chrono::NaiveDate;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("order quantity must be at least 1 (customer `{customer}`, item `{item}`, date {date})")]
    ZeroQuantity { customer: String, item: String, date: NaiveDate },
    #[error("order record has an empty customer name (item `{item}`, date {date})")]
    EmptyCustomer { item: String, date: NaiveDate },
    #[error("order record has an empty item name (customer `{customer}`, date {date})")]
    EmptyItem { customer: String, date: NaiveDate },
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::DomainError;

    #[test]
    fn error_messages_name_the_offending_record() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 27).expect("valid date");
        let error = DomainError::ZeroQuantity {
            customer: "John Doe".to_string(),
            item: "Biryani".to_string(),
            date,
        };

        let rendered = error.to_string();
        assert!(rendered.contains("John Doe"));
        assert!(rendered.contains("Biryani"));
        assert!(rendered.contains("2024-06-27"));
    }
}
