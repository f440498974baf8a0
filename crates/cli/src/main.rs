// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![deny(
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]
#![allow(clippy::multiple_crate_versions)]

mod dispatcher;
mod events;
mod quota;
mod transport;

#[cfg(test)]
mod tests;

use clap::{Parser, Subcommand};
use dispatcher::Dispatcher;
use quota::SubscriptionQuotaGuard;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use transport::{HttpProviderTransport, LoggingTransport};
use wa_blast::{ProviderTransport, QuotaGuard};
use wa_blast_api::{
    CreateBatchRequest, SendPolicy, cancel_batch, create_batch, export_batch, get_batch_status,
    get_quota, list_batches, preview_ingestion, set_quota,
};
use wa_blast_persistence::SqlitePersistence;

/// wa-blast - Bulk WhatsApp message batch engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the `SQLite` database file. If not provided, uses in-memory database.
    #[arg(short, long)]
    database: Option<String>,

    /// Base URL of the WhatsApp HTTP gateway
    #[arg(long, default_value = "http://127.0.0.1:8080")]
    gateway_url: String,

    /// Maximum number of batches dispatching concurrently
    #[arg(long, default_value_t = 3)]
    max_concurrent_batches: usize,

    /// Minimum allowed inter-message delay, in milliseconds
    #[arg(long, default_value_t = 1000)]
    min_delay_ms: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Preview an ingestion without creating a batch
    Preview {
        /// Path to the recipient CSV file
        source: PathBuf,
    },
    /// Create a batch from a recipient CSV file
    Create {
        /// The owning tenant
        #[arg(long)]
        owner: String,
        /// The provider instance to send through
        #[arg(long)]
        instance: String,
        /// Operator-chosen batch name
        #[arg(long)]
        name: String,
        /// Message template with {{field}} placeholders
        #[arg(long)]
        template: String,
        /// Delay between consecutive sends, in milliseconds
        #[arg(long, default_value_t = 1000)]
        delay_ms: u64,
        /// Path to the recipient CSV file
        source: PathBuf,
    },
    /// Dispatch pending batches (or one batch) to a terminal state
    Run {
        /// Dispatch only this batch instead of every pending batch
        #[arg(long)]
        batch_id: Option<i64>,
        /// Log messages instead of delivering them
        #[arg(long)]
        dry_run: bool,
        /// Print dispatch events as JSON lines while running
        #[arg(long)]
        watch: bool,
    },
    /// Show one batch's status and progress
    Status {
        /// The owning tenant
        #[arg(long)]
        owner: String,
        /// The batch to read
        batch_id: i64,
    },
    /// List a tenant's batches, newest first
    List {
        /// The owning tenant
        #[arg(long)]
        owner: String,
        /// Emit the full list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Request cancellation of a batch
    Cancel {
        /// The owning tenant
        #[arg(long)]
        owner: String,
        /// The batch to cancel
        batch_id: i64,
    },
    /// Export a batch's recipients as CSV
    Export {
        /// The owning tenant
        #[arg(long)]
        owner: String,
        /// The batch to export
        batch_id: i64,
        /// Write the CSV here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Manage tenant message quotas
    Quota {
        #[command(subcommand)]
        command: QuotaCommand,
    },
}

#[derive(Subcommand, Debug)]
enum QuotaCommand {
    /// Set (or create) a tenant's message limit
    Set {
        /// The tenant
        #[arg(long)]
        owner: String,
        /// Messages the subscription allows
        limit: i64,
    },
    /// Show a tenant's quota ledger entry
    Show {
        /// The tenant
        #[arg(long)]
        owner: String,
    },
}

fn open_store(database: Option<&str>) -> Result<SqlitePersistence, Box<dyn std::error::Error>> {
    Ok(if let Some(db_path) = database {
        info!("Using file-based database at: {}", db_path);
        SqlitePersistence::new_with_file(db_path)?
    } else {
        info!("Using in-memory database");
        SqlitePersistence::new_in_memory()?
    })
}

fn run_preview(
    source: &PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let csv_bytes: Vec<u8> = std::fs::read(source)?;
    let response = preview_ingestion(&csv_bytes)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn run_create(
    persistence: &mut SqlitePersistence,
    min_delay_ms: u64,
    owner: String,
    instance: String,
    name: String,
    template: String,
    delay_ms: u64,
    source: &PathBuf,
) -> Result<(), Box<dyn std::error::Error>> {
    let csv_bytes: Vec<u8> = std::fs::read(source)?;
    let policy: SendPolicy = SendPolicy { min_delay_ms };
    let request: CreateBatchRequest = CreateBatchRequest {
        owner_id: owner,
        instance_id: instance,
        name,
        template,
        delay_ms,
    };

    let response = create_batch(persistence, &policy, &request, &csv_bytes)?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

async fn run_dispatch(
    persistence: SqlitePersistence,
    gateway_url: &str,
    max_concurrent_batches: usize,
    batch_id: Option<i64>,
    dry_run: bool,
    watch: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let persistence: Arc<Mutex<SqlitePersistence>> = Arc::new(Mutex::new(persistence));

    let transport: Arc<dyn ProviderTransport> = if dry_run {
        Arc::new(LoggingTransport)
    } else {
        Arc::new(HttpProviderTransport::new(gateway_url)?)
    };
    let quota_guard: Arc<dyn QuotaGuard> =
        Arc::new(SubscriptionQuotaGuard::new(Arc::clone(&persistence)));

    let dispatcher: Arc<Dispatcher> = Arc::new(Dispatcher::new(
        persistence,
        transport,
        quota_guard,
        max_concurrent_batches,
    ));

    let printer = watch.then(|| {
        let mut receiver = dispatcher.subscribe();
        tokio::spawn(async move {
            while let Ok(event) = receiver.recv().await {
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(err) => tracing::error!(error = %err, "Failed to serialize event"),
                }
            }
        })
    });

    let result = match batch_id {
        Some(batch_id) => dispatcher.dispatch_batch(batch_id).await,
        None => dispatcher.run_pending().await,
    };

    if let Some(printer) = printer {
        printer.abort();
    }

    result?;
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let mut persistence: SqlitePersistence = open_store(args.database.as_deref())?;

    match args.command {
        Command::Preview { source } => run_preview(&source)?,
        Command::Create {
            owner,
            instance,
            name,
            template,
            delay_ms,
            source,
        } => run_create(
            &mut persistence,
            args.min_delay_ms,
            owner,
            instance,
            name,
            template,
            delay_ms,
            &source,
        )?,
        Command::Run {
            batch_id,
            dry_run,
            watch,
        } => {
            run_dispatch(
                persistence,
                &args.gateway_url,
                args.max_concurrent_batches,
                batch_id,
                dry_run,
                watch,
            )
            .await?;
        }
        Command::Status { owner, batch_id } => {
            let status = get_batch_status(&mut persistence, &owner, batch_id)?;
            print_json(&status)?;
        }
        Command::List { owner, json } => {
            let response = list_batches(&mut persistence, &owner)?;
            if json {
                print_json(&response)?;
            } else {
                for batch in &response.batches {
                    println!(
                        "{:>6}  {:<12}  {:<10}  {}/{} sent, {} failed",
                        batch.batch_id,
                        batch.name,
                        batch.status,
                        batch.sent_count,
                        batch.total_recipients,
                        batch.failed_count
                    );
                }
            }
        }
        Command::Cancel { owner, batch_id } => {
            let response = cancel_batch(&mut persistence, &owner, batch_id)?;
            print_json(&response)?;
        }
        Command::Export {
            owner,
            batch_id,
            output,
        } => {
            let csv_bytes: Vec<u8> = export_batch(&mut persistence, &owner, batch_id)?;
            match output {
                Some(path) => std::fs::write(path, csv_bytes)?,
                None => print!("{}", String::from_utf8_lossy(&csv_bytes)),
            }
        }
        Command::Quota { command } => match command {
            QuotaCommand::Set { owner, limit } => {
                let response = set_quota(&mut persistence, &owner, limit)?;
                print_json(&response)?;
            }
            QuotaCommand::Show { owner } => match get_quota(&mut persistence, &owner)? {
                Some(response) => print_json(&response)?,
                None => println!("Tenant '{owner}' is unmetered"),
            },
        },
    }

    Ok(())
}
