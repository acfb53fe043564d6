//! Discord REST client used for everything the bot sends to the platform.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, Method, RequestBuilder};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::config::DiscordConfig;
use crate::interactions::dto::{CommandDefinition, MessagePayload, Role, User};

#[derive(Error, Debug)]
pub enum DiscordError {
    #[error("discord request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("discord api error ({status}): {message}")]
    Api { status: u16, message: String },
}

#[async_trait]
pub trait DiscordClient: Send + Sync {
    /// The bot account behind the configured token.
    async fn current_user(&self) -> Result<User, DiscordError>;

    /// Overwrites the guild-scoped command set of the application.
    async fn register_guild_commands(
        &self,
        application_id: &str,
        guild_id: &str,
        commands: &[CommandDefinition],
    ) -> Result<(), DiscordError>;

    async fn guild_roles(&self, guild_id: &str) -> Result<Vec<Role>, DiscordError>;

    async fn add_member_role(
        &self,
        guild_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), DiscordError>;

    /// Edits the response opened for an interaction, deferred or not.
    async fn edit_original_response(
        &self,
        application_id: &str,
        interaction_token: &str,
        message: &MessagePayload,
    ) -> Result<(), DiscordError>;
}

#[derive(Clone)]
pub struct Discord {
    http: Client,
    api_base: String,
    token: String,
}

impl Discord {
    pub fn new(config: &DiscordConfig) -> Result<Self, DiscordError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .connect_timeout(Duration::from_secs(5))
            .user_agent(format!(
                "DiscordBot (https://github.com, {}) birthday_bot",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            http,
            api_base: config.api_base.clone(),
            token: config.token.clone(),
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.api_base, path);
        debug!(%method, %url, "discord request");
        self.http
            .request(method, url)
            .header(header::AUTHORIZATION, format!("Bot {}", self.token))
    }

    async fn send(&self, req: RequestBuilder) -> Result<reqwest::Response, DiscordError> {
        let response = req.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let message = response
            .text()
            .await
            .unwrap_or_else(|_| status.canonical_reason().unwrap_or("unknown").to_string());
        Err(DiscordError::Api {
            status: status.as_u16(),
            message,
        })
    }

    async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, DiscordError> {
        self.send(self.request(method, path).json(body)).await
    }
}

#[async_trait]
impl DiscordClient for Discord {
    async fn current_user(&self) -> Result<User, DiscordError> {
        let response = self.send(self.request(Method::GET, "/users/@me")).await?;
        Ok(response.json().await?)
    }

    async fn register_guild_commands(
        &self,
        application_id: &str,
        guild_id: &str,
        commands: &[CommandDefinition],
    ) -> Result<(), DiscordError> {
        let path = format!("/applications/{application_id}/guilds/{guild_id}/commands");
        self.send_json(Method::PUT, &path, commands).await?;
        Ok(())
    }

    async fn guild_roles(&self, guild_id: &str) -> Result<Vec<Role>, DiscordError> {
        let path = format!("/guilds/{guild_id}/roles");
        let response = self.send(self.request(Method::GET, &path)).await?;
        Ok(response.json().await?)
    }

    async fn add_member_role(
        &self,
        guild_id: &str,
        user_id: &str,
        role_id: &str,
    ) -> Result<(), DiscordError> {
        let path = format!("/guilds/{guild_id}/members/{user_id}/roles/{role_id}");
        self.send(self.request(Method::PUT, &path)).await?;
        Ok(())
    }

    async fn edit_original_response(
        &self,
        application_id: &str,
        interaction_token: &str,
        message: &MessagePayload,
    ) -> Result<(), DiscordError> {
        let path = format!("/webhooks/{application_id}/{interaction_token}/messages/@original");
        self.send_json(Method::PATCH, &path, message).await?;
        Ok(())
    }
}
