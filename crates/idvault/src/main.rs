use idvault::{App, AppState, Config};
use ledger::Ledger;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = Config::from_env()?;

    let ledger = match &config.ledger_path {
        Some(path) => Ledger::open(path)?,
        None => {
            tracing::warn!("IDVAULT_LEDGER_PATH unset, ledger is held in memory only");
            Ledger::new()
        }
    };
    tracing::info!(height = ledger.height(), "ledger ready");

    let state = AppState::in_memory(ledger);

    if let Some(admin) = &config.admin {
        let user = state
            .auth
            .create_admin(&admin.username, &admin.password)
            .await?;
        tracing::info!(user_id = user.id, username = %user.username, "bootstrap admin created");
    }

    let listener = TcpListener::bind(config.addr).await?;
    tracing::info!(addr = %config.addr, "listening");

    App::new(state).run(listener).await?;
    Ok(())
}
