use account_transfers::application::coordinator::TransferCoordinator;
use account_transfers::config::TransferConfig;
use account_transfers::domain::account::AccountId;
use account_transfers::domain::ports::{AccountStoreRef, NotifierRef};
use account_transfers::domain::transfer::TransferRequest;
use account_transfers::infrastructure::in_memory::InMemoryAccountStore;
use account_transfers::infrastructure::notifier::LoggingNotifier;
use account_transfers::interfaces::csv::account_writer::AccountWriter;
use account_transfers::interfaces::csv::command_reader::{Command, CommandReader};
use account_transfers::telemetry;
use clap::Parser;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::warn;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input commands CSV file (`type, account, counterparty, amount`)
    input: PathBuf,

    /// Number of transfers run concurrently. With more than one worker, all
    /// `open` rows are applied before any transfer starts.
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u16).range(1..))]
    workers: u16,

    /// Fixed pause after a failed lock attempt, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    backoff_base_ms: u64,

    /// Upper bound of the random pause added to the fixed one, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    backoff_jitter_ms: u64,

    /// Fail a transfer after this many lock attempts instead of retrying forever.
    #[arg(long)]
    max_lock_attempts: Option<u32>,
}

impl Cli {
    fn transfer_config(&self) -> TransferConfig {
        let config = TransferConfig::default().with_backoff(
            Duration::from_millis(self.backoff_base_ms),
            Duration::from_millis(self.backoff_jitter_ms),
        );
        match self.max_lock_attempts {
            Some(attempts) => config.with_max_lock_attempts(attempts),
            None => config,
        }
    }
}

async fn run_transfer(coordinator: &TransferCoordinator, from: AccountId, request: TransferRequest) {
    if let Err(e) = coordinator.submit(&from, &request).await {
        warn!(from = %from, to = %request.to, error = %e, "Error processing command");
    }
}

async fn run_concurrently(
    coordinator: Arc<TransferCoordinator>,
    transfers: Vec<(AccountId, TransferRequest)>,
    workers: usize,
) -> Result<()> {
    let permits = Arc::new(Semaphore::new(workers));
    let mut tasks = JoinSet::new();
    for (from, request) in transfers {
        let permit = permits.clone().acquire_owned().await.into_diagnostic()?;
        let coordinator = coordinator.clone();
        tasks.spawn(async move {
            run_transfer(&coordinator, from, request).await;
            drop(permit);
        });
    }
    while let Some(joined) = tasks.join_next().await {
        joined.into_diagnostic()?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init_tracing();
    let cli = Cli::parse();

    let store: AccountStoreRef = Arc::new(InMemoryAccountStore::new());
    let notifier: NotifierRef = Arc::new(LoggingNotifier::new());
    let coordinator = Arc::new(TransferCoordinator::new(
        store,
        notifier,
        cli.transfer_config(),
    ));

    let file = File::open(&cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    let mut queued = Vec::new();
    for command in reader.commands() {
        match command {
            Ok(Command::Open { account, balance }) => {
                if let Err(e) = coordinator.open_account(account, balance).await {
                    warn!(error = %e, "Error processing command");
                }
            }
            Ok(Command::Transfer { from, request }) => {
                if cli.workers > 1 {
                    queued.push((from, request));
                } else {
                    run_transfer(&coordinator, from, request).await;
                }
            }
            Err(e) => {
                warn!(error = %e, "Error reading command");
            }
        }
    }

    if !queued.is_empty() {
        run_concurrently(coordinator.clone(), queued, usize::from(cli.workers)).await?;
    }

    let accounts = coordinator.accounts().await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = AccountWriter::new(stdout.lock());
    writer.write_accounts(accounts).into_diagnostic()?;

    Ok(())
}
