use time::{Date, OffsetDateTime};
use tokio::sync::oneshot;
use tracing::{error, info, instrument, warn};

use super::birthdate::Birthdate;
use super::components::{CustomId, MembershipRole};
use super::dto::{Interaction, MessagePayload, User};
use crate::{discord::DiscordClient, error::VerifyError, state::AppState};

/// A birthdate form submission that passed parsing and waits for role assignment.
#[derive(Debug, Clone)]
pub struct Submission {
    pub application_id: String,
    pub token: String,
    pub guild_id: String,
    pub user: User,
    pub birthdate: Birthdate,
}

impl Submission {
    /// `None` when the form did not come from a guild member or lacks the field.
    /// The inner error is an unparsable birthdate.
    pub fn from_interaction(interaction: &Interaction) -> Option<Result<Self, VerifyError>> {
        let guild_id = interaction.guild_id.clone()?;
        let user = interaction.member.as_ref()?.user.clone();
        let raw_date = interaction.field_value(CustomId::BirthdateField.as_str())?;

        Some(Birthdate::parse(raw_date).map(|birthdate| Self {
            application_id: interaction.application_id.clone(),
            token: interaction.token.clone(),
            guild_id,
            user,
            birthdate,
        }))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verified {
    pub birthdate: Birthdate,
    pub age: i32,
    pub role: MembershipRole,
}

impl Verified {
    pub fn announcement(&self, user: &User) -> String {
        format!(
            "🎉 {} was born on **{}** ({}); role **{}** has been assigned.",
            user.tag(),
            self.birthdate,
            self.age,
            self.role.name()
        )
    }
}

/// Resolves both roles and attaches the one matching the age.
///
/// Exactly one role is attached on success and nothing is mutated on error.
/// Repeated submissions attach again; the platform treats that as a no-op.
pub async fn verify_and_assign(
    discord: &dyn DiscordClient,
    guild_id: &str,
    user_id: &str,
    birthdate: Birthdate,
    today: Date,
) -> Result<Verified, VerifyError> {
    let age = birthdate.age_on(today);

    let roles = discord.guild_roles(guild_id).await?;
    let find = |role: MembershipRole| roles.iter().find(|r| r.name == role.name());
    let (Some(adult), Some(not_verified)) = (
        find(MembershipRole::Adult),
        find(MembershipRole::NotVerified),
    ) else {
        return Err(VerifyError::MissingRoles {
            guild_id: guild_id.to_string(),
        });
    };

    let role = MembershipRole::for_age(age);
    let target = match role {
        MembershipRole::Adult => adult,
        MembershipRole::NotVerified => not_verified,
    };
    discord.add_member_role(guild_id, user_id, &target.id).await?;

    Ok(Verified {
        birthdate,
        age,
        role,
    })
}

/// Waits until the deferred acknowledgement has been written, then completes the submission.
///
/// A dropped sender means the acknowledgement never left, so there is nothing to edit.
pub async fn complete_after_ack(
    state: AppState,
    submission: Submission,
    today: Date,
    ack_written: oneshot::Receiver<()>,
) {
    if ack_written.await.is_err() {
        warn!(user_id = %submission.user.id, "deferred acknowledgement was not sent; dropping submission");
        return;
    }
    complete_submission(state, submission, today).await;
}

/// The outcome replaces the deferred response.
#[instrument(skip(state, submission), fields(user_id = %submission.user.id, guild_id = %submission.guild_id))]
pub async fn complete_submission(state: AppState, submission: Submission, today: Date) {
    let outcome = verify_and_assign(
        state.discord.as_ref(),
        &submission.guild_id,
        &submission.user.id,
        submission.birthdate,
        today,
    )
    .await;

    let content = match outcome {
        Ok(verified) => {
            info!(age = verified.age, role = verified.role.name(), "role assigned");
            verified.announcement(&submission.user)
        }
        Err(e @ VerifyError::Platform(_)) => {
            error!(error = %e, "verification failed");
            e.user_message().to_string()
        }
        Err(e) => {
            warn!(error = %e, "verification rejected");
            e.user_message().to_string()
        }
    };

    if let Err(e) = state
        .discord
        .edit_original_response(
            &submission.application_id,
            &submission.token,
            &MessagePayload::text(content),
        )
        .await
    {
        error!(error = %e, "editing interaction response failed");
    }
}

pub fn today() -> Date {
    OffsetDateTime::now_utc().date()
}
