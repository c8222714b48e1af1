use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use tiffinsight_core::config::AppConfig;
use tiffinsight_core::{
    summarize, InsightBundle, InsightEngine, LedgerSummary, OrderLedger, PaymentLedger, TableStock,
};
use tiffinsight_ingest::chat::{parse_chat_text, RejectedLine};
use tiffinsight_ingest::payments::{read_payments_file, RejectedRow};
use tiffinsight_ingest::stock::{read_stock_file, StockCsvError};

use crate::commands::CommandResult;

const COMMAND: &str = "insights";

#[derive(Debug, Serialize)]
struct IngestReport {
    order_lines_parsed: usize,
    chatter_lines_skipped: usize,
    rejected_lines: Vec<RejectedLine>,
    rejected_payment_rows: Vec<RejectedRow>,
}

#[derive(Debug, Serialize)]
struct InsightsReport {
    command: &'static str,
    status: &'static str,
    summary: LedgerSummary,
    insights: InsightBundle,
    ingest: IngestReport,
}

pub fn run(config: &AppConfig, chat: &Path, payments: Option<&Path>) -> CommandResult {
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

    let mut rejected_payment_rows = Vec::new();
    let payment_ledger = match payments {
        Some(path) => match read_payments_file(path) {
            Ok(outcome) => {
                rejected_payment_rows = outcome.rejected;
                Some(PaymentLedger::new(outcome.records))
            }
            Err(error) => {
                return CommandResult::failure(COMMAND, "payments_csv", error.to_string(), 2)
            }
        },
        None => None,
    };

    let bundle = match stock_source(config) {
        Ok(Some(stock)) => {
            InsightEngine::with_stock(stock).top_n(config.insights.top_n).compute(&ledger)
        }
        Ok(None) => InsightEngine::new().top_n(config.insights.top_n).compute(&ledger),
        Err(error) => return CommandResult::failure(COMMAND, "stock_csv", error.to_string(), 2),
    };
    let summary = summarize(&ledger, payment_ledger.as_ref());

    info!(
        order_lines = ledger.len(),
        rejected_lines = parsed.rejected.len(),
        top_items = bundle.top_items.len(),
        "computed insight bundle"
    );

    let report = InsightsReport {
        command: COMMAND,
        status: "ok",
        summary,
        insights: bundle,
        ingest: IngestReport {
            order_lines_parsed: ledger.len(),
            chatter_lines_skipped: parsed.skipped_lines,
            rejected_lines: parsed.rejected,
            rejected_payment_rows,
        },
    };
    CommandResult::report(COMMAND, &report)
}

fn stock_source(config: &AppConfig) -> Result<Option<TableStock>, StockCsvError> {
    match &config.stock.csv_path {
        Some(path) => read_stock_file(path).map(Some),
        None => Ok(None),
    }
}
