//! Whiteboard relay server entry point.

use clap::Parser;
use tracing::error;
use whiteboard_server::{Config, ServerError};

#[tokio::main]
async fn main() -> Result<(), ServerError> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "whiteboard_server=info,whiteboard_core=info,tower_http=info".into()
            }),
        )
        .init();

    let config = Config::parse();
    whiteboard_server::serve(config).await.inspect_err(|e| {
        error!("{}", e);
    })
}
