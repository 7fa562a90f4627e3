use tracing_subscriber::EnvFilter;
use wordspy::{GatewayError, GatewayServer};

#[tokio::main]
async fn main() -> Result<(), GatewayError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let addr = std::env::var("WORDSPY_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:3000".to_string());

    let server = GatewayServer::builder().bind(&addr).build().await?;
    server.run().await
}
