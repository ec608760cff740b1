use anyhow::Context;

use devhub_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    devhub_observability::init(&config.log);
    config.warn_on_dev_defaults();

    let app = devhub_api::app::build_app(&config)
        .await
        .context("failed to set up auth backend")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
