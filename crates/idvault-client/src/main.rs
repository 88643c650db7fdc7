use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use base64::{Engine, prelude::BASE64_STANDARD};
use clap::{Parser, Subcommand};
use idvault_client::{HttpRemote, OfflineStorage};
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Queue idvault writes offline and replay them later")]
struct Cli {
    /// Directory holding the offline snapshots and the sync queue.
    #[arg(long, default_value = ".idvault")]
    data_dir: PathBuf,

    /// Seconds to wait for each replayed item before giving up on it.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Queue a user registration.
    QueueUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        date_of_birth: String,
        #[arg(long)]
        nationality: String,
        #[arg(long = "language", required = true)]
        languages: Vec<String>,
    },
    /// Queue a document upload.
    QueueDocument {
        #[arg(long = "type", default_value = "identity")]
        document_type: String,
        file: PathBuf,
    },
    /// Print the items waiting to be replayed.
    Pending,
    /// Replay the queue against a server.
    Flush {
        #[arg(long)]
        server: String,
        #[arg(long, requires = "password")]
        username: Option<String>,
        #[arg(long, requires = "username")]
        password: Option<String>,
    },
    /// Drop all offline snapshots and pending items.
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let storage = OfflineStorage::open(&cli.data_dir, Duration::from_secs(cli.timeout_secs))
        .with_context(|| format!("opening {}", cli.data_dir.display()))?;

    match cli.command {
        Command::QueueUser {
            username,
            password,
            full_name,
            date_of_birth,
            nationality,
            languages,
        } => {
            let item = storage.save_user(&json!({
                "username": username,
                "password": password,
                "fullName": full_name,
                "dateOfBirth": date_of_birth,
                "nationality": nationality,
                "languages": languages,
            }))?;
            println!("{}", item.id);
        }
        Command::QueueDocument {
            document_type,
            file,
        } => {
            let bytes = tokio::fs::read(&file)
                .await
                .with_context(|| format!("reading {}", file.display()))?;
            anyhow::ensure!(!bytes.is_empty(), "{} is empty", file.display());

            let item = storage.save_document(&json!({
                "documentType": document_type,
                "documentData": BASE64_STANDARD.encode(&bytes),
            }))?;
            println!("{}", item.id);
        }
        Command::Pending => {
            for item in storage.queue().pending()? {
                println!("{}", serde_json::to_string(&item)?);
            }
        }
        Command::Flush {
            server,
            username,
            password,
        } => {
            let remote = HttpRemote::new(&server)?;
            if let (Some(username), Some(password)) = (username, password) {
                remote.login(&username, &password).await?;
            }

            let report = storage.queue().flush(&remote).await?;
            println!(
                "attempted {}, succeeded {}, failed {}",
                report.attempted,
                report.succeeded,
                report.failed.len()
            );
            for id in &report.failed {
                println!("failed: {id}");
            }
        }
        Command::Clear => storage.clear()?,
    }

    Ok(())
}
