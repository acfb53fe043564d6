use crate::config::AppConfig;
use crate::discord::{Discord, DiscordClient};
use crate::interactions::extractors::SignatureVerifier;
use std::sync::Arc;

/// Process-wide handle passed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub discord: Arc<dyn DiscordClient>,
    pub verifier: SignatureVerifier,
}

impl AppState {
    pub fn init() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let discord = Arc::new(Discord::new(&config.discord)?) as Arc<dyn DiscordClient>;
        Self::from_parts(config, discord)
    }

    pub fn from_parts(config: AppConfig, discord: Arc<dyn DiscordClient>) -> anyhow::Result<Self> {
        let verifier = SignatureVerifier::from_hex(&config.discord.public_key)?;
        Ok(Self {
            config: Arc::new(config),
            discord,
            verifier,
        })
    }

    #[cfg(test)]
    pub fn fake(discord: Arc<dyn DiscordClient>) -> Self {
        use crate::config::DiscordConfig;
        use crate::interactions::extractors::test_keys;

        let config = AppConfig {
            discord: DiscordConfig {
                token: "test-token".into(),
                application_id: "test-app".into(),
                guild_id: "test-guild".into(),
                public_key: test_keys::public_key_hex(),
                api_base: "http://fake.local".into(),
            },
            host: "127.0.0.1".into(),
            port: 0,
        };

        Self::from_parts(config, discord).expect("fake state")
    }
}
