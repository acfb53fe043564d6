use anyhow::Context;

mod app;
mod config;
mod console;
mod discord;
mod error;
mod interactions;
mod state;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "birthday_bot=debug,axum=info,tower_http=info".to_string());
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

    config::log_env_presence();
    let app_state = state::AppState::init()?;

    // Registration failures are logged inside and never stop startup
    interactions::registration::register_commands(&app_state).await;

    let me = app_state
        .discord
        .current_user()
        .await
        .context("log in to discord")?;
    tracing::info!("🤖 Logged in as {}", me.tag());

    tokio::spawn(console::serve_stdio());

    let (host, port) = (app_state.config.host.clone(), app_state.config.port);
    app::serve(app::build_app(app_state), &host, port).await
}
