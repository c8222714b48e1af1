use std::env;
use std::io::Write;
use std::sync::{Mutex, OnceLock};

use serde_json::Value;
use tempfile::NamedTempFile;

use tiffinsight_cli::commands::{config, insights, orders, revenue};
use tiffinsight_core::config::{AppConfig, LoadOptions};

const CHAT_LOG: &str = "\
hey, is the kitchen open this week?
Order: 1 Biryani | Name: John Doe | Date: 2024-06-03
Order: 2 Biryani | Name: John Doe | Date: 2024-06-10
Order: 3 Biryani, 1 Naan | Name: John Doe | Date: 2024-06-17
Order: 2 Curry | Name: Priya | Date: 2024-06-17
Order: oops | Name: Priya | Date: 2024-06-17
";

const PAYMENTS_CSV: &str = "\
date,description,amount
2024-06-03,Zelle from John Doe,10.00
2024-06-17,Zelle from Priya,20.00
";

fn temp_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(contents.as_bytes()).expect("temp file write");
    file
}

fn parse_payload(output: &str) -> Value {
    serde_json::from_str(output).expect("command output should be valid JSON")
}

#[test]
fn insights_reports_bundle_summary_and_rejects() {
    let chat = temp_file(CHAT_LOG);

    let result = insights::run(&AppConfig::default(), chat.path(), None);
    assert_eq!(result.exit_code, 0, "expected successful insights run");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "insights");
    assert_eq!(payload["status"], "ok");

    assert_eq!(payload["summary"]["total_order_lines"], 5);
    assert_eq!(payload["summary"]["unique_customers"], 2);
    assert_eq!(payload["summary"]["total_quantity"], 9);

    assert_eq!(payload["insights"]["top_items"][0]["item"], "Biryani");
    assert_eq!(payload["insights"]["top_items"][0]["total_quantity"], 6);
    assert_eq!(payload["insights"]["increasing_items"][0]["item"], "Biryani");
    assert_eq!(
        payload["insights"]["increasing_items"][0]["window"],
        serde_json::json!([1, 2, 3])
    );
    assert_eq!(payload["insights"]["retained_customers"], serde_json::json!(["John Doe", "Priya"]));
    assert_eq!(payload["insights"]["reordered_items"][0]["order_count"], 3);

    assert_eq!(payload["ingest"]["order_lines_parsed"], 5);
    assert_eq!(payload["ingest"]["chatter_lines_skipped"], 1);
    assert_eq!(payload["ingest"]["rejected_lines"][0]["reason"]["kind"], "bad_quantity");
    assert_eq!(payload["ingest"]["rejected_lines"][0]["reason"]["raw"], "oops");
}

#[test]
fn insights_with_payments_fills_revenue_summary() {
    let chat = temp_file(CHAT_LOG);
    let payments = temp_file(PAYMENTS_CSV);

    let result = insights::run(&AppConfig::default(), chat.path(), Some(payments.path()));
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["summary"]["total_revenue"], "30.00");
    assert_eq!(payload["ingest"]["rejected_payment_rows"], serde_json::json!([]));
}

#[test]
fn insights_missing_chat_file_fails_with_io_class() {
    let result = insights::run(
        &AppConfig::default(),
        std::path::Path::new("/nonexistent/orders.txt"),
        None,
    );
    assert_eq!(result.exit_code, 2, "expected io failure code");

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "insights");
    assert_eq!(payload["status"], "error");
    assert_eq!(payload["error_class"], "io");
}

#[test]
fn insights_uses_a_stock_csv_when_configured() {
    let chat = temp_file(CHAT_LOG);
    let stock = temp_file("item,stock_qty\nBiryani,25\nNaan,4\n");

    let mut config = AppConfig::default();
    config.stock.csv_path = Some(stock.path().to_path_buf());

    let result = insights::run(&config, chat.path(), None);
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    let low_stock = payload["insights"]["low_stock"].as_array().expect("low_stock array");
    let flagged: Vec<&str> =
        low_stock.iter().map(|alert| alert["item"].as_str().unwrap_or_default()).collect();
    assert!(!flagged.contains(&"Biryani"), "well-stocked item must not be flagged");
    assert!(flagged.contains(&"Naan"));
    assert!(flagged.contains(&"Curry"), "item missing from the table counts as out of stock");
}

#[test]
fn orders_emits_the_normalized_ledger() {
    let chat = temp_file(CHAT_LOG);

    let result = orders::run(chat.path());
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "orders");
    assert_eq!(payload["orders"].as_array().map(Vec::len), Some(5));
    assert_eq!(payload["orders"][0]["customer"], "John Doe");
    assert_eq!(payload["orders"][0]["item"], "Biryani");
    assert_eq!(payload["rejected_lines"].as_array().map(Vec::len), Some(1));
}

#[test]
fn revenue_reconciles_orders_and_payments_by_day() {
    let chat = temp_file(CHAT_LOG);
    let payments = temp_file(PAYMENTS_CSV);

    let result = revenue::run(chat.path(), payments.path());
    assert_eq!(result.exit_code, 0);

    let payload = parse_payload(&result.output);
    assert_eq!(payload["command"], "revenue");
    assert_eq!(payload["total_amount"], "30.00");

    let days = payload["days"].as_array().expect("days array");
    assert_eq!(days.len(), 3);
    assert_eq!(days[0]["date"], "2024-06-03");
    assert_eq!(days[0]["total_quantity"], 1);
    assert_eq!(days[0]["total_amount"], "10.00");
    assert_eq!(days[1]["date"], "2024-06-10");
    assert_eq!(days[1]["total_amount"], "0");
    assert_eq!(days[2]["total_quantity"], 6);
}

#[test]
fn config_reports_default_sources_with_clean_env() {
    with_env(&[], || {
        let output = config::run(&AppConfig::default());
        assert!(output.contains("- insights.top_n = 5 (source: default)"), "{output}");
        assert!(output.contains("- logging.level = info (source: default)"), "{output}");
    });
}

#[test]
fn config_attributes_env_overrides() {
    with_env(&[("TIFFINSIGHT_INSIGHTS_TOP_N", "3")], || {
        let config = AppConfig::load(LoadOptions::default()).expect("config loads");
        let output = config::run(&config);
        assert!(
            output.contains("- insights.top_n = 3 (source: env (TIFFINSIGHT_INSIGHTS_TOP_N))"),
            "{output}"
        );
    });
}

fn with_env(vars: &[(&str, &str)], test_fn: impl FnOnce()) {
    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    let _guard =
        ENV_LOCK.get_or_init(|| Mutex::new(())).lock().expect("env mutex should not be poisoned");

    let keys = [
        "TIFFINSIGHT_INSIGHTS_TOP_N",
        "TIFFINSIGHT_STOCK_CSV_PATH",
        "TIFFINSIGHT_LOGGING_LEVEL",
        "TIFFINSIGHT_LOGGING_FORMAT",
        "TIFFINSIGHT_LOG_LEVEL",
        "TIFFINSIGHT_LOG_FORMAT",
    ];

    let previous_values: Vec<(&str, Option<String>)> =
        keys.iter().map(|key| (*key, env::var(key).ok())).collect();

    for key in &keys {
        env::remove_var(key);
    }
    for (key, value) in vars {
        env::set_var(key, value);
    }

    test_fn();

    for (key, previous) in previous_values {
        match previous {
            Some(value) => env::set_var(key, value),
            None => env::remove_var(key),
        }
    }
}
