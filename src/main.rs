//! xrptax - XRP Ledger tax reporting from the command line.

use std::io;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use xrptax::app::{App, SettingsChanges};
use xrptax::models::{ProfileUpdate, ReportRequest, TransactionQuery};

#[derive(Parser)]
#[command(name = "xrptax", version, about = "XRP Ledger tax reporting from the command line")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and persist the session
    Login {
        #[arg(long)]
        email: Option<String>,
        /// Remember the password in the OS keychain
        #[arg(long)]
        remember: bool,
    },
    /// Create an account
    Register {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long, default_value = "US")]
        country: String,
    },
    /// Clear the local session
    Logout,
    /// Show the logged-in identity
    Whoami,
    /// Portfolio overview and tax position
    Dashboard {
        /// Skip the local cache
        #[arg(long)]
        refresh: bool,
    },
    /// Manage tracked wallets
    Wallets {
        #[command(subcommand)]
        command: WalletsCommand,
    },
    /// Browse transactions
    Transactions {
        #[command(subcommand)]
        command: TransactionsCommand,
    },
    /// Tax reports
    Reports {
        #[command(subcommand)]
        command: ReportsCommand,
    },
    /// Account settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
    /// Profile details
    Profile {
        #[command(subcommand)]
        command: ProfileCommand,
    },
    /// Change the account password
    ChangePassword,
}

#[derive(Subcommand)]
enum WalletsCommand {
    /// List tracked wallets
    List {
        #[arg(long)]
        refresh: bool,
    },
    /// Track a new wallet
    Add {
        /// XRP Ledger classic address (r...)
        address: String,
        #[arg(long)]
        name: String,
    },
    /// Trigger a server-side sync
    Sync {
        /// Wallet id, address, or name
        wallet: Option<String>,
        /// Sync every tracked wallet
        #[arg(long)]
        all: bool,
    },
}

#[derive(Subcommand)]
enum TransactionsCommand {
    /// List transactions, newest first
    List {
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        limit: Option<u32>,
        /// Filter by wallet id
        #[arg(long)]
        wallet: Option<String>,
        /// Filter by ledger transaction type
        #[arg(long = "type")]
        tx_type: Option<String>,
        #[arg(long)]
        category: Option<String>,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
    },
    /// Show one transaction in full
    Show { id: String },
}

#[derive(Subcommand)]
enum ReportsCommand {
    /// Show the available years, formats, and accounting methods
    Options {
        #[arg(long)]
        refresh: bool,
    },
    /// Generate a tax report
    Generate {
        #[arg(long)]
        year: i32,
        #[arg(long, default_value = "PDF")]
        format: String,
        /// Accounting method (FIFO, LIFO, HIFO, ACB)
        #[arg(long, default_value = "FIFO")]
        method: String,
        #[arg(long, default_value = "US")]
        country: String,
        #[arg(long)]
        form: Option<String>,
    },
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Show tax, notification, and API settings
    Show,
    /// Change settings in place
    Set {
        /// Default accounting method (FIFO, LIFO, HIFO, ACB)
        #[arg(long)]
        method: Option<String>,
        /// Base reporting currency
        #[arg(long)]
        currency: Option<String>,
        /// Include network fees in cost basis (true/false)
        #[arg(long)]
        include_fees: Option<bool>,
        /// Email notifications (true/false)
        #[arg(long)]
        email_notifications: Option<bool>,
        /// Per-transaction alerts (true/false)
        #[arg(long)]
        transaction_alerts: Option<bool>,
    },
    /// Rotate the account API key
    ApiKey,
}

#[derive(Subcommand)]
enum ProfileCommand {
    /// Show the account profile
    Show,
    /// Update name or country
    Update {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        country: Option<String>,
    },
}

/// Initialize the tracing subscriber for logging.
/// Logs go to stderr so command output stays pipeable; RUST_LOG controls
/// the level.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut app = App::new()?;

    match cli.command {
        Command::Login { email, remember } => app.login(email, remember).await,
        Command::Register {
            name,
            email,
            country,
        } => app.register(name, email, country).await,
        Command::Logout => app.logout(),
        Command::Whoami => {
            app.whoami();
            Ok(())
        }
        Command::Dashboard { refresh } => app.dashboard(refresh).await,
        Command::Wallets { command } => match command {
            WalletsCommand::List { refresh } => app.wallets(refresh).await,
            WalletsCommand::Add { address, name } => app.add_wallet(address, name).await,
            WalletsCommand::Sync { wallet, all } => app.sync_wallets(wallet, all).await,
        },
        Command::Transactions { command } => match command {
            TransactionsCommand::List {
                page,
                limit,
                wallet,
                tx_type,
                category,
                from,
                to,
            } => {
                let query = TransactionQuery {
                    page,
                    limit,
                    wallet,
                    tx_type,
                    category,
                    start_date: from,
                    end_date: to,
                };
                app.transactions(query).await
            }
            TransactionsCommand::Show { id } => app.transaction(id).await,
        },
        Command::Reports { command } => match command {
            ReportsCommand::Options { refresh } => app.report_options(refresh).await,
            ReportsCommand::Generate {
                year,
                format,
                method,
                country,
                form,
            } => {
                let request = ReportRequest {
                    year,
                    format,
                    accounting_method: method,
                    country,
                    form,
                };
                app.generate_report(request).await
            }
        },
        Command::Settings { command } => match command {
            SettingsCommand::Show => app.settings().await,
            SettingsCommand::Set {
                method,
                currency,
                include_fees,
                email_notifications,
                transaction_alerts,
            } => {
                let changes = SettingsChanges {
                    method,
                    currency,
                    include_fees,
                    email_notifications,
                    transaction_alerts,
                };
                app.update_settings(changes).await
            }
            SettingsCommand::ApiKey => app.generate_api_key().await,
        },
        Command::Profile { command } => match command {
            ProfileCommand::Show => app.profile().await,
            ProfileCommand::Update { name, country } => {
                app.update_profile(ProfileUpdate { name, country }).await
            }
        },
        Command::ChangePassword => app.change_password().await,
    }
}
