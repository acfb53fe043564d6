use tracing::{error, info};

use super::components::commands;
use crate::state::AppState;

/// Registers the guild commands once at startup. Failures are logged, never fatal.
pub async fn register_commands(state: &AppState) {
    let cfg = &state.config.discord;
    info!(guild_id = %cfg.guild_id, "📨 Registering slash command...");
    match state
        .discord
        .register_guild_commands(&cfg.application_id, &cfg.guild_id, &commands())
        .await
    {
        Ok(()) => info!("✅ Slash command registered."),
        Err(e) => error!(error = %e, "❌ Failed to register commands"),
    }
}
