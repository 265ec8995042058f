use anyhow::Context;

use billbook_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env().context("invalid configuration")?;
    billbook_observability::init(config.log_format);

    let app = billbook_api::app::build_app(&config);

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        app_id = %config.app_id,
        default_payment_terms = config.default_payment_terms,
        "listening"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
