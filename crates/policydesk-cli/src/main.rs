//! policydesk: drive the policy view controller from a terminal.
//!
//! # Usage
//!
//! ```text
//! policydesk --base-url http://127.0.0.1:5000 list --status expiring
//! policydesk add --file policy.json
//! policydesk shell
//! ```
//!
//! Rendered HTML goes to stdout, logs go to stderr.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use policydesk_core::PolicyStatus;

mod commands;
mod shell;

#[derive(Parser)]
#[command(
    name = "policydesk",
    about = "policydesk — insurance policy list client",
    version,
    propagate_version = true
)]
struct Cli {
    /// Path to policydesk.toml (default: ./policydesk.toml if present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override [backend].base_url.
    #[arg(long, global = true)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load policies and print the table body.
    List {
        #[arg(long)]
        search: Option<String>,
        /// Product category, matched exactly.
        #[arg(long)]
        product: Option<String>,
        /// active, expiring or expired.
        #[arg(long)]
        status: Option<PolicyStatus>,
    },
    /// Load salespeople and print the selector options.
    Salespeople,
    /// Submit a new policy read from a JSON file.
    Add {
        #[arg(short, long)]
        file: PathBuf,
    },
    /// Interactive mode: type `help` for commands.
    Shell,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .or_else(|_| tracing_subscriber::EnvFilter::try_new("info,policydesk=debug"))?,
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = commands::load_config(cli.config.as_deref(), cli.base_url.as_deref())?;

    match cli.command {
        Command::List {
            search,
            product,
            status,
        } => commands::list(&config, search.as_deref(), product.as_deref(), status).await,
        Command::Salespeople => commands::salespeople(&config).await,
        Command::Add { file } => commands::add(&config, &file).await,
        Command::Shell => shell::run(&config).await,
    }
}
