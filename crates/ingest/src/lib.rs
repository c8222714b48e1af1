//! Ingest adapters - chat exports and payment CSVs in, ledgers out
//!
//! This crate turns the raw inputs a tiffin operator actually has into the
//! normalized ledgers the insight core consumes:
//! - **Chat orders** (`chat`) - `Order: 2 Biryani, 1 Naan | Name: ... | Date: ...`
//!   lines from an exported chat
//! - **Payments** (`payments`) - a `date,description,amount` CSV export from
//!   the transfer service
//! - **Stock feed** (`stock`) - an optional `item,stock_qty` CSV backing the
//!   core's `TableStock` source
//!
//! Every adapter returns the valid records alongside the rejected inputs
//! with typed reasons, so data loss is observable instead of silent. Callers
//! that only want the original drop-and-continue behavior ignore the reject
//! channel.

pub mod chat;
pub mod dates;
pub mod payments;
pub mod stock;
