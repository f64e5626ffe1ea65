//! Interactive line mode.
//!
//! Search input goes through the controller's debounce, so typing
//! several `search` lines in quick succession filters once. A tokio
//! interval drives `tick()` while stdin is idle.

use std::time::Duration;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use policydesk_controller::{FragmentView, PolicyView};
use policydesk_core::{DeskConfig, PolicyStatus};
use policydesk_dashboard::{BannerId, BannerView, PolicyTable, SalespersonOptions};

use crate::commands;

const TICK_INTERVAL: Duration = Duration::from_millis(50);

const HELP: &str = "\
commands:
  search <term>     filter by policy number, customer, national id or plate
  product [name]    filter by product category (blank clears)
  status [state]    active | expiring | expired (blank clears)
  clear             drop all filters
  reload            fetch policies and salespeople again
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Search(String),
    Product(Option<String>),
    Status(Option<PolicyStatus>),
    Clear,
    Reload,
    Help,
    Quit,
}

impl ShellCommand {
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let arg = (!rest.is_empty()).then(|| rest.to_string());

        match word {
            "search" => Ok(ShellCommand::Search(rest.to_string())),
            "product" => Ok(ShellCommand::Product(arg)),
            "status" => match arg {
                None => Ok(ShellCommand::Status(None)),
                Some(s) => s
                    .parse()
                    .map(|status| ShellCommand::Status(Some(status)))
                    .map_err(|e| format!("{e}")),
            },
            "clear" => Ok(ShellCommand::Clear),
            "reload" => Ok(ShellCommand::Reload),
            "help" | "?" => Ok(ShellCommand::Help),
            "quit" | "exit" => Ok(ShellCommand::Quit),
            other => Err(format!("unknown command: {other}")),
        }
    }
}

/// Prints each fragment as it changes.
#[derive(Debug, Default)]
struct TerminalView {
    inner: FragmentView,
}

impl PolicyView for TerminalView {
    fn replace_table(&mut self, table: &PolicyTable) {
        self.inner.replace_table(table);
        if let Some(html) = &self.inner.table_body {
            println!("{html}");
        }
    }

    fn replace_salesperson_options(&mut self, options: &SalespersonOptions) {
        self.inner.replace_salesperson_options(options);
        if let Some(html) = &self.inner.salesperson_select {
            println!("{html}");
        }
    }

    fn append_banner(&mut self, banner: &BannerView) {
        self.inner.append_banner(banner);
        println!("[{}] {}", banner.severity.alert_class(), banner.message);
    }

    fn remove_banner(&mut self, id: BannerId) {
        self.inner.remove_banner(id);
    }
}

pub async fn run(config: &DeskConfig) -> anyhow::Result<()> {
    let ctl = commands::controller(config, TerminalView::default())?;
    ctl.load_initial().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(TICK_INTERVAL);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => ctl.tick().await,
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                if line.trim().is_empty() {
                    continue;
                }
                match ShellCommand::parse(&line) {
                    Ok(ShellCommand::Search(term)) => ctl.on_search_input(&term).await,
                    Ok(ShellCommand::Product(product)) => {
                        ctl.set_product_filter(product.as_deref()).await
                    }
                    Ok(ShellCommand::Status(status)) => ctl.set_status_filter(status).await,
                    Ok(ShellCommand::Clear) => ctl.clear_filters().await,
                    Ok(ShellCommand::Reload) => {
                        ctl.load_initial().await;
                    }
                    Ok(ShellCommand::Help) => println!("{HELP}"),
                    Ok(ShellCommand::Quit) => break,
                    Err(e) => warn!(error = %e, "ignoring input"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
        }
    }
    Ok(())
}
