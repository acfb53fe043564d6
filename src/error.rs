use thiserror::Error;

use crate::discord::DiscordError;

/// Why a birthdate submission did not end in a role assignment.
#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("invalid birthdate {0:?}")]
    InvalidInput(String),

    #[error("required roles not found in guild {guild_id}")]
    MissingRoles { guild_id: String },

    #[error(transparent)]
    Platform(#[from] DiscordError),
}

impl VerifyError {
    /// Text shown to the member; details stay in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            VerifyError::InvalidInput(_) => "❌ Invalid date format. Use DD-MM-YYYY.",
            VerifyError::MissingRoles { .. } => "❌ Required roles not found in the server.",
            VerifyError::Platform(_) => UNEXPECTED_ERROR,
        }
    }
}

pub const UNEXPECTED_ERROR: &str = "❌ An unexpected error occurred.";
