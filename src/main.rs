// Sentinel Comments Server

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use sentinel_comments::{app::build_application, config::Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("sentinel_comments=info,tower_http=info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    let addr = config.server_address();

    let application = build_application(config).await?;
    tracing::info!(
        "Registered commentable owner types: {:?}",
        application.state.registry.owner_types()
    );

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("Sentinel comments server listening on http://{}", addr);
    axum::serve(listener, application.router).await?;

    Ok(())
}
