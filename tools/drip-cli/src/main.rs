//! drip command-line tool.
//!
//! Runs the deeplink router outside the browser, inspects and edits the
//! on-disk transaction ledger, and fetches the SUI→NGN rate.

mod file_store;

use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use drip_common::completion::ActionCompletion;
use drip_common::config::WalletConfig;
use drip_common::currency::format_naira;
use drip_common::deeplink::{RawParams, UrlState};
use drip_common::ledger::{Direction, Ledger};
use drip_common::rate::parse_rate_response;
use drip_common::router::{DeeplinkRouter, RouteOutcome};
use drip_common::wallet_backend::{complete_action, MockWallet};

use file_store::FileStore;

#[derive(Parser)]
#[command(name = "drip", about = "drip wallet deeplink router and local ledger")]
struct Cli {
    /// Ledger file (default: <data dir>/drip/<storage key>.json).
    #[arg(long, global = true)]
    ledger_path: Option<PathBuf>,

    /// SUI network (mainnet, testnet, devnet, localnet). Overrides DRIP_NETWORK.
    #[arg(long, global = true)]
    network: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the router once against a URL and print the outcome.
    Route {
        /// Absolute or root-relative URL, e.g. "/#action=receive".
        url: String,
        /// Treat a wallet as connected.
        #[arg(long)]
        connected: bool,
    },
    /// Route a URL, execute it against the mock wallet and record it in the ledger.
    Simulate {
        url: String,
        /// Account address the mock wallet reports.
        #[arg(long, default_value = "0x0")]
        account: String,
    },
    /// Inspect or modify the local ledger.
    Ledger {
        #[command(subcommand)]
        action: LedgerCommand,
    },
    /// Fetch the current SUI→NGN rate.
    Rate {
        /// Also convert this SUI amount to Naira.
        #[arg(long)]
        sui: Option<f64>,
    },
}

#[derive(Subcommand)]
enum LedgerCommand {
    /// Print entries newest-first.
    List,
    /// Append an entry.
    Append {
        /// sent or received
        direction: Direction,
        #[arg(allow_hyphen_values = true)]
        magnitude: f64,
        description: String,
        #[arg(long)]
        currency: Option<String>,
    },
    /// Delete the whole log.
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("drip=info,drip_common=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = WalletConfig::from_env().context("reading DRIP_* environment")?;
    if let Some(network) = &cli.network {
        config.network = match network.parse() {
            Ok(n) => n,
            Err(()) => bail!("unknown network: {network}"),
        };
    }
    tracing::debug!("config: {config:?}");

    let ledger_path = cli
        .ledger_path
        .clone()
        .unwrap_or_else(|| FileStore::default_path(&config.storage_key));

    match cli.command {
        Command::Route { url, connected } => route(&config, &url, connected),
        Command::Simulate { url, account } => simulate(&config, &url, account, ledger_path).await,
        Command::Ledger { action } => ledger(action, ledger_path),
        Command::Rate { sui } => rate(&config, sui).await,
    }
}

fn route(config: &WalletConfig, url: &str, connected: bool) -> anyhow::Result<()> {
    let url = UrlState::parse(url).context("parsing url")?;
    let mut router = DeeplinkRouter::from_config(config);
    report(&router.observe(&url, connected, Utc::now()));
    Ok(())
}

async fn simulate(
    config: &WalletConfig,
    url: &str,
    account: String,
    ledger_path: PathBuf,
) -> anyhow::Result<()> {
    let url = UrlState::parse(url).context("parsing url")?;
    let mut router = DeeplinkRouter::from_config(config);
    let mut wallet = MockWallet::connected(account);

    let outcome = router.observe(&url, true, Utc::now());
    report(&outcome);
    let Some(nav) = outcome.navigation() else {
        return Ok(());
    };

    // What the destination screen sees once the navigation lands.
    let screen = UrlState::parse(&nav.to_url()).context("parsing navigation")?;
    router.navigation_settled();
    let request = RawParams::from_screen(&screen)
        .context("navigation does not point at a screen")?
        .validate()?;

    let mut ledger = Ledger::open(FileStore::new(ledger_path));
    match complete_action(&mut wallet, &mut ledger, &request).await? {
        Some(receipt) => println!("executed: {}", receipt.digest),
        None => println!("nothing to execute for {}", request.action()),
    }

    let now = Utc::now();
    let completion = ActionCompletion::new(nav.destination, now);
    if completion.should_redirect(&screen.path, now) {
        println!("{}", completion.notice());
    }
    Ok(())
}

fn ledger(action: LedgerCommand, path: PathBuf) -> anyhow::Result<()> {
    let mut ledger = Ledger::open(FileStore::new(path));
    match action {
        LedgerCommand::List => {
            if ledger.is_empty() {
                println!("No transactions yet");
            }
            let now = Utc::now();
            for entry in ledger.list() {
                println!(
                    "{:>9}  {:>16}  {:<9}  {}",
                    entry.time_ago(now),
                    entry.amount,
                    entry.status.as_str(),
                    entry.description
                );
            }
        }
        LedgerCommand::Append {
            direction,
            magnitude,
            description,
            currency,
        } => {
            let entry = ledger.append(direction, magnitude, description, currency.as_deref())?;
            println!("{} {}", entry.id, entry.amount);
        }
        LedgerCommand::Clear => ledger.clear(),
    }
    if !ledger.is_persisted() {
        bail!("ledger change was not saved to {}", ledger.store().path().display());
    }
    Ok(())
}

async fn rate(config: &WalletConfig, sui: Option<f64>) -> anyhow::Result<()> {
    let body = reqwest::get(&config.rate_api_url)
        .await
        .with_context(|| format!("fetching {}", config.rate_api_url))?
        .error_for_status()?
        .text()
        .await?;
    let rate = parse_rate_response(&body)?;
    println!("1 SUI = {rate} NGN");
    if let Some(sui) = sui {
        println!("{sui} SUI ≈ {}", format_naira(sui, rate));
    }
    Ok(())
}

fn report(outcome: &RouteOutcome) {
    match outcome {
        RouteOutcome::Navigate(nav) => println!("navigate: {nav}"),
        RouteOutcome::Skipped(reason) => println!("skipped: {reason:?}"),
        RouteOutcome::Rejected(_) | RouteOutcome::ConnectWallet(_) => {
            if let Some(notice) = outcome.notice() {
                println!("notice: {notice}");
            }
        }
    }
}
