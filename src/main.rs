mod app;
mod auth;
mod config;
mod db;
mod errors;
mod galleries;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "pixhaven=debug,axum=info,tower_http=info,sqlx=warn".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init().await?;
    let services = app_state.services.clone();

    if std::env::var("DB_DESTRUCTIVE_RESET").map(|v| v == "1").unwrap_or(false) {
        services.destructive_reset().await?;
    } else {
        services.auto_migrate().await?;
    }

    let host = app_state.config.host.clone();
    let port = app_state.config.port;
    let router = app::build_app(app_state);
    let result = app::serve(router, &host, port).await;

    services.close().await;
    result
}
