use anyhow::Context;

use clubroster_api::config::{ApiConfig, BIND_VAR};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env().context("invalid configuration")?;
    clubroster_observability::init(config.log_format);

    if std::env::var(BIND_VAR).is_err() {
        tracing::warn!("{BIND_VAR} not set; binding {}", config.bind);
    }

    if config.seed_demo {
        tracing::warn!("seeding demo accounts with well-known tokens; do not use in production");
    }
    let services =
        clubroster_api::app::build_services(&config).context("failed to seed demo data")?;
    let app = clubroster_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.bind))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        resolve_timeout_ms = config.resolve_timeout.as_millis() as u64,
        "listening"
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
