use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use wallet::application::wallet::WalletService;
use wallet::config::{OutputFormat, WalletConfig};
use wallet::domain::account::{AccountId, Money, Phone};
use wallet::interfaces::csv::payment_writer::PaymentWriter;
use wallet::logging::init_logger;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON configuration file (optional)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the ledger dumps. Overrides the config file.
    #[arg(long, env = "WALLET_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Logging verbosity: off, error, warn, info, debug, trace. RUST_LOG overrides it.
    #[arg(long, default_value_t = LevelFilter::WARN, global = true)]
    log_level: LevelFilter,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register a new account and print its id.
    Register {
        #[arg(long)]
        phone: String,
    },
    /// Credit an account.
    Deposit {
        #[arg(long)]
        account: AccountId,
        /// Amount in minor units
        #[arg(long)]
        amount: i64,
    },
    /// Pay from an account and print the payment id.
    Pay {
        #[arg(long)]
        account: AccountId,
        /// Amount in minor units
        #[arg(long)]
        amount: i64,
        #[arg(long)]
        category: String,
    },
    /// Mark a payment as failed and refund it.
    Reject {
        #[arg(long)]
        payment: String,
    },
    /// Pay again like an earlier payment.
    Repeat {
        #[arg(long)]
        payment: String,
    },
    /// Save a payment as a named favorite.
    Favorite {
        #[arg(long)]
        payment: String,
        #[arg(long)]
        name: String,
    },
    /// Pay using a saved favorite.
    PayFavorite {
        #[arg(long)]
        favorite: String,
    },
    /// Print the sum of all payments.
    Sum {
        #[arg(long)]
        workers: Option<usize>,
    },
    /// List the payments of one account.
    Filter {
        #[arg(long)]
        account: AccountId,
        #[arg(long)]
        workers: Option<usize>,
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.log_level);

    let mut config = match &cli.config {
        Some(path) => WalletConfig::load(path).into_diagnostic()?,
        None => WalletConfig::default(),
    };
    if let Some(data_dir) = cli.data_dir {
        config.data_dir = data_dir;
    }
    debug!(?config, "configuration resolved");

    let service = WalletService::in_memory();
    service.import(&config.data_dir).await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let mutated = match cli.command {
        Command::Register { phone } => {
            let account = service
                .register_account(Phone(phone))
                .await
                .into_diagnostic()?;
            writeln!(out, "{}", account.id).into_diagnostic()?;
            true
        }
        Command::Deposit { account, amount } => {
            service
                .deposit(account, Money::new(amount))
                .await
                .into_diagnostic()?;
            let account = service.find_account_by_id(account).await.into_diagnostic()?;
            writeln!(out, "{}", account.balance).into_diagnostic()?;
            true
        }
        Command::Pay {
            account,
            amount,
            category,
        } => {
            let payment = service
                .pay(account, Money::new(amount), category)
                .await
                .into_diagnostic()?;
            writeln!(out, "{}", payment.id).into_diagnostic()?;
            true
        }
        Command::Reject { payment } => {
            service.reject(&payment).await.into_diagnostic()?;
            true
        }
        Command::Repeat { payment } => {
            let payment = service.repeat(&payment).await.into_diagnostic()?;
            writeln!(out, "{}", payment.id).into_diagnostic()?;
            true
        }
        Command::Favorite { payment, name } => {
            let favorite = service
                .favorite_payment(&payment, &name)
                .await
                .into_diagnostic()?;
            writeln!(out, "{}", favorite.id).into_diagnostic()?;
            true
        }
        Command::PayFavorite { favorite } => {
            let payment = service
                .pay_from_favorite(&favorite)
                .await
                .into_diagnostic()?;
            writeln!(out, "{}", payment.id).into_diagnostic()?;
            true
        }
        Command::Sum { workers } => {
            let total = service
                .sum_payments(workers.unwrap_or(config.workers))
                .await
                .into_diagnostic()?;
            writeln!(out, "{} {}", total, total.to_major()).into_diagnostic()?;
            false
        }
        Command::Filter {
            account,
            workers,
            format,
        } => {
            let payments = service
                .filter_payments(account, workers.unwrap_or(config.workers))
                .await
                .into_diagnostic()?;
            match format.unwrap_or(config.format) {
                OutputFormat::Csv => PaymentWriter::new(&mut out)
                    .write_payments(&payments)
                    .into_diagnostic()?,
                OutputFormat::Json => {
                    serde_json::to_writer_pretty(&mut out, &payments).into_diagnostic()?;
                    writeln!(out).into_diagnostic()?;
                }
            }
            false
        }
    };

    if mutated {
        service.export(&config.data_dir).await.into_diagnostic()?;
    }

    Ok(())
}
