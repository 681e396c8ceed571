//! Election engine node binary

use election_core::{spawn_engine_actor, Config, ElectionEngine, Identity, SystemClock};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    tracing::info!("Starting election node");

    // Load configuration
    let config = match std::env::args().nth(1) {
        Some(path) => Config::from_file(&path)?,
        None => Config::from_env()?,
    };
    tracing::info!(
        service = %config.service_name,
        version = %config.service_version,
        admin = %config.admin,
        ranking = ?config.ballot.ranking,
        "Configuration loaded"
    );

    let admin = Identity::new(config.admin.clone());
    let engine = ElectionEngine::new(config, admin, SystemClock)?;
    let handle = spawn_engine_actor(engine);

    let elections = handle.get_election_count().await?;
    tracing::info!(elections, "Engine ready");

    tokio::signal::ctrl_c().await?;

    tracing::info!("Shutting down election node");
    handle.shutdown().await?;
    Ok(())
}
