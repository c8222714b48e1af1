use std::fs;
use std::path::Path;

use serde::Serialize;

use tiffinsight_core::{OrderLedger, OrderRecord};
use tiffinsight_ingest::chat::{parse_chat_text, RejectedLine};

use crate::commands::CommandResult;

const COMMAND: &str = "orders";

#[derive(Debug, Serialize)]
struct OrdersReport {
    command: &'static str,
    status: &'static str,
    orders: Vec<OrderRecord>,
    chatter_lines_skipped: usize,
    rejected_lines: Vec<RejectedLine>,
}

pub fn run(chat: &Path) -> CommandResult {
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

    let report = OrdersReport {
        command: COMMAND,
        status: "ok",
        orders: ledger.records().to_vec(),
        chatter_lines_skipped: parsed.skipped_lines,
        rejected_lines: parsed.rejected,
    };
    CommandResult::report(COMMAND, &report)
}
