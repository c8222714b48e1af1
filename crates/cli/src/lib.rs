pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use tiffinsight_core::config::{AppConfig, ConfigOverrides, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "tiffinsight",
    about = "Tiffin order-ledger insight CLI",
    long_about = "Parse WhatsApp-style order logs and payment exports, then derive demand \
                  trends, item rankings, stock alerts, customer lifecycle segments, and \
                  reorder patterns.",
    after_help = "Examples:\n  tiffinsight insights --chat orders.txt\n  tiffinsight revenue --chat orders.txt --payments payments.csv\n  tiffinsight config"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a tiffinsight.toml config file")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Parse an order log and emit the full insight bundle as JSON")]
    Insights {
        #[arg(long, help = "Chat-log text file with `Order: ... | Name: ... | Date: ...` lines")]
        chat: PathBuf,
        #[arg(long, help = "Optional payments CSV with date, description, and amount columns")]
        payments: Option<PathBuf>,
        #[arg(long, help = "How many top items to rank (overrides config)")]
        top: Option<usize>,
    },
    #[command(about = "Parse an order log and emit the normalized ledger with rejects")]
    Orders {
        #[arg(long, help = "Chat-log text file with `Order: ... | Name: ... | Date: ...` lines")]
        chat: PathBuf,
    },
    #[command(about = "Reconcile daily order quantities against daily payment totals")]
    Revenue {
        #[arg(long, help = "Chat-log text file with `Order: ... | Name: ... | Date: ...` lines")]
        chat: PathBuf,
        #[arg(long, help = "Payments CSV with date, description, and amount columns")]
        payments: PathBuf,
    },
    #[command(
        about = "Inspect effective configuration values with source attribution"
    )]
    Config,
}

fn init_logging(config: &AppConfig) {
    use tiffinsight_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

fn command_name(command: &Command) -> &'static str {
    match command {
        Command::Insights { .. } => "insights",
        Command::Orders { .. } => "orders",
        Command::Revenue { .. } => "revenue",
        Command::Config => "config",
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let top_override = match &cli.command {
        Command::Insights { top, .. } => *top,
        _ => None,
    };
    let options = LoadOptions {
        config_path: cli.config.clone(),
        overrides: ConfigOverrides { top_n: top_override, ..ConfigOverrides::default() },
        ..LoadOptions::default()
    };
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            let result = commands::CommandResult::failure(
                command_name(&cli.command),
                "config_validation",
                error.to_string(),
                2,
            );
            println!("{}", result.output);
            return ExitCode::from(result.exit_code);
        }
    };
    init_logging(&config);

    let result = match cli.command {
        Command::Insights { chat, payments, .. } => {
            commands::insights::run(&config, &chat, payments.as_deref())
        }
        Command::Orders { chat } => commands::orders::run(&chat),
        Command::Revenue { chat, payments } => commands::revenue::run(&chat, &payments),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run(&config) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
