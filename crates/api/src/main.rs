use std::sync::Arc;

use anyhow::Context;

use catalog_api::{app, config::AppConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    catalog_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(
        bind_addr = %config.bind_addr,
        store = config.store.kind(),
        telemetry_endpoint = config.telemetry.endpoint.as_deref().unwrap_or("<tracing>"),
        "configuration loaded"
    );

    let services = Arc::new(app::services::build_services(&config).await?);
    let router = app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, router).await?;
    Ok(())
}
