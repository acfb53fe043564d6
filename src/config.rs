use anyhow::Context;
use serde::Deserialize;

/// Environment keys whose presence is reported at startup.
pub const REQUIRED_KEYS: [&str; 4] = ["TOKEN", "CLIENT_ID", "GUILD_ID", "PUBLIC_KEY"];

#[derive(Debug, Clone, Deserialize)]
pub struct DiscordConfig {
    pub token: String,
    pub application_id: String,
    pub guild_id: String,
    pub public_key: String,
    pub api_base: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub discord: DiscordConfig,
    pub host: String,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{key} must be set"))
        };

        let discord = DiscordConfig {
            token: required("TOKEN")?,
            application_id: required("CLIENT_ID")?,
            guild_id: required("GUILD_ID")?,
            public_key: required("PUBLIC_KEY")?,
            api_base: lookup("DISCORD_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "https://discord.com/api/v10".into()),
        };
        let host = lookup("APP_HOST").unwrap_or_else(|| "0.0.0.0".into());
        let port = match lookup("APP_PORT") {
            Some(v) => v
                .parse::<u16>()
                .with_context(|| format!("APP_PORT is not a valid port: {v}"))?,
            None => 3000,
        };

        Ok(Self {
            discord,
            host,
            port,
        })
    }
}

/// Logs which required keys are set. Values are never logged.
pub fn log_env_presence() {
    for (key, present) in env_presence(|key| std::env::var(key).ok()) {
        if present {
            tracing::info!(key, "✅ Present");
        } else {
            tracing::warn!(key, "❌ Missing");
        }
    }
}

fn env_presence<F>(lookup: F) -> Vec<(&'static str, bool)>
where
    F: Fn(&str) -> Option<String>,
{
    REQUIRED_KEYS
        .iter()
        .map(|key| (*key, lookup(*key).is_some_and(|v| !v.is_empty())))
        .collect()
}
