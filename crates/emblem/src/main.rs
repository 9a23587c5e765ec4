//! Emblem operator CLI.
//!
//! Small inspection tool over the account cache and the indexing API:
//! - `resolve`: canonicalize an address-or-username
//! - `fetch`: run one fetch cycle and print the resulting records
//! - `watch`: poll targets on an interval and report committed changes

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use emblem_accounts::{
    AccountService, AccountStore, AddressCodec, FetchRequest, HexAddressCodec, Resolved, ViewKind,
    ViewRequest,
};
use emblem_indexer::IndexerClient;

#[derive(Parser)]
#[command(name = "emblem")]
#[command(about = "Inspect Emblem accounts against a live indexer", long_about = None)]
struct Cli {
    /// Indexing API base URL
    #[arg(long, env = "EMBLEM_API_URL", default_value = "http://localhost:3001")]
    api_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Canonicalize an address-or-username without touching the network
    Resolve {
        /// Address or username
        target: String,
    },
    /// Run one fetch cycle for the targets and print the cached records
    Fetch {
        /// Addresses or usernames
        targets: Vec<String>,

        /// Also fetch the on-chain sequence
        #[arg(long)]
        sequence: bool,

        /// Also fetch the native token balance
        #[arg(long)]
        balance: bool,

        /// Also fetch the first page of the transfer activity feed
        #[arg(long)]
        activity: bool,
    },
    /// Poll the targets on an interval and report committed changes
    Watch {
        /// Addresses or usernames
        targets: Vec<String>,

        /// Poll interval in seconds
        #[arg(long, default_value = "15")]
        interval: u64,
    },
}

fn build_requests(targets: &[String], sequence: bool, balance: bool, activity: bool) -> Vec<FetchRequest> {
    targets
        .iter()
        .map(|target| {
            let mut request = if HexAddressCodec.canonicalize(target).is_some() {
                FetchRequest::for_address(target.clone())
            } else {
                FetchRequest::for_username(target.clone())
            };
            request.fetch_sequence = sequence;
            request.fetch_balance = balance;
            if activity {
                request.views_to_fetch.push(ViewRequest {
                    view_id: "activity:all".to_string(),
                    kind: ViewKind::Activity,
                    bookmark: String::new(),
                    filters: None,
                });
            }
            request
        })
        .collect()
}

fn print_cached(store: &AccountStore, targets: &[String]) -> Result<()> {
    for target in targets {
        let record = match store.resolve(target) {
            Resolved::Reserved(name) => store.get(name),
            Resolved::Key(key) => store.get(&key),
            Resolved::Unresolved => None,
        };
        match record {
            Some(record) => {
                let json = serde_json::to_string_pretty(&record).into_diagnostic()?;
                println!("{json}");
            }
            None => println!("{target}: not cached"),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "emblem=info".to_string()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve { target } => {
            let store = AccountStore::new(Arc::new(HexAddressCodec));
            match store.resolve(&target) {
                Resolved::Reserved(name) => println!("{target}: reserved account {name}"),
                Resolved::Key(key) => println!("{target}: {key}"),
                Resolved::Unresolved => println!("{target}: unresolved username"),
            }
        }

        Commands::Fetch {
            targets,
            sequence,
            balance,
            activity,
        } => {
            let store = AccountStore::new(Arc::new(HexAddressCodec));
            let service = AccountService::new(store, IndexerClient::new(cli.api_url));

            let requests = build_requests(&targets, sequence, balance, activity);
            service.fetch_accounts(requests).await;
            print_cached(&service.store(), &targets)?;
        }

        Commands::Watch { targets, interval } => {
            let store = AccountStore::new(Arc::new(HexAddressCodec));
            let service = AccountService::new(store, IndexerClient::new(cli.api_url));

            let mut updates = service.store().subscribe();
            tokio::spawn(async move {
                while let Ok(update) = updates.recv().await {
                    let now = chrono::Utc::now().format("%H:%M:%S");
                    println!("[{now}] {update:?}");
                }
            });

            info!(targets = targets.len(), interval, "watching accounts");
            let mut ticker = tokio::time::interval(Duration::from_secs(interval));
            loop {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => break,
                    _ = ticker.tick() => {
                        let requests = build_requests(&targets, true, true, true);
                        service.force_fetch_accounts(requests).await;
                    }
                }
            }
        }
    }

    Ok(())
}
