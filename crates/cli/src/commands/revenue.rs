use std::fs;
use std::path::Path;

use serde::Serialize;

use tiffinsight_core::{reconcile_daily, DailyReconciliation, OrderLedger, PaymentLedger};
use tiffinsight_ingest::chat::parse_chat_text;
use tiffinsight_ingest::payments::{read_payments_file, RejectedRow};

use crate::commands::CommandResult;

const COMMAND: &str = "revenue";

#[derive(Debug, Serialize)]
struct RevenueReport {
    command: &'static str,
    status: &'static str,
    total_amount: String,
    days: Vec<DailyReconciliation>,
    rejected_payment_rows: Vec<RejectedRow>,
}

pub fn run(chat: &Path, payments: &Path) -> CommandResult {
    let text = match fs::read_to_string(chat) {
        Ok(text) => text,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "io",
                format!("could not read chat log `{}`: {error}", chat.display()),
                2,
            )
        }
    };
    let parsed = parse_chat_text(&text);
    let ledger = match OrderLedger::new(parsed.records) {
        Ok(ledger) => ledger,
        Err(error) => return CommandResult::failure(COMMAND, "ledger_validation", error.to_string(), 2),
    };

    let outcome = match read_payments_file(payments) {
        Ok(outcome) => outcome,
        Err(error) => return CommandResult::failure(COMMAND, "payments_csv", error.to_string(), 2),
    };
    let rejected_payment_rows = outcome.rejected;
    let payment_ledger = PaymentLedger::new(outcome.records);

    let report = RevenueReport {
        command: COMMAND,
        status: "ok",
        total_amount: payment_ledger.total_amount().to_string(),
        days: reconcile_daily(&ledger, &payment_ledger),
        rejected_payment_rows,
    };
    CommandResult::report(COMMAND, &report)
}
