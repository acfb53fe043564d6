use std::convert::Infallible;

use axum::{
    body::{Body, Bytes},
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use futures::stream;
use tokio::sync::oneshot;
use tracing::{debug, instrument, warn};

use super::{
    components::{birthdate_form, verification_prompt, CustomId, VERIFY_COMMAND},
    dto::{Interaction, InteractionKind, InteractionResponse, MessagePayload},
    extractors::VerifiedInteraction,
    services::{complete_after_ack, today, Submission},
};
use crate::{error::UNEXPECTED_ERROR, state::AppState};

pub fn interaction_routes() -> Router<AppState> {
    Router::new().route("/interactions", post(interactions))
}

/// Event kinds the bot reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Ping,
    VerifyCommand,
    OpenForm,
    SubmitForm,
    Unhandled,
}

impl Route {
    pub fn of(interaction: &Interaction) -> Self {
        match interaction.kind {
            InteractionKind::Ping => Route::Ping,
            InteractionKind::ApplicationCommand
                if interaction.command_name() == Some(VERIFY_COMMAND) =>
            {
                Route::VerifyCommand
            }
            InteractionKind::MessageComponent
                if interaction.custom_id().and_then(CustomId::parse) == Some(CustomId::OpenForm) =>
            {
                Route::OpenForm
            }
            InteractionKind::ModalSubmit
                if interaction.custom_id().and_then(CustomId::parse)
                    == Some(CustomId::BirthdateForm) =>
            {
                Route::SubmitForm
            }
            _ => Route::Unhandled,
        }
    }
}

/// The immediate answer to an interaction, plus the submission to finish once it is sent.
#[derive(Debug)]
pub struct Dispatched {
    pub response: InteractionResponse,
    pub follow_up: Option<Submission>,
}

impl Dispatched {
    fn now(response: InteractionResponse) -> Self {
        Self {
            response,
            follow_up: None,
        }
    }
}

#[instrument(skip_all, fields(interaction_id = %interaction.id, kind = ?interaction.kind))]
pub async fn interactions(
    State(state): State<AppState>,
    VerifiedInteraction(interaction): VerifiedInteraction,
) -> Result<Response, (StatusCode, String)> {
    let Dispatched {
        response,
        follow_up,
    } = dispatch(interaction)?;

    let Some(submission) = follow_up else {
        return Ok(Json(response).into_response());
    };

    let (ack, ack_written) = oneshot::channel();
    tokio::spawn(complete_after_ack(state, submission, today(), ack_written));
    acknowledging(&response, ack)
}

/// Decides the immediate answer. Nothing here talks to Discord.
pub fn dispatch(interaction: Interaction) -> Result<Dispatched, (StatusCode, String)> {
    let route = Route::of(&interaction);
    debug!(?route, "dispatching interaction");

    match route {
        Route::Ping => Ok(Dispatched::now(InteractionResponse::pong())),
        Route::VerifyCommand => Ok(Dispatched::now(InteractionResponse::ephemeral_reply(
            verification_prompt(),
        ))),
        Route::OpenForm => Ok(Dispatched::now(InteractionResponse::modal(birthdate_form()))),
        Route::SubmitForm => match Submission::from_interaction(&interaction) {
            Some(Ok(submission)) => Ok(Dispatched {
                response: InteractionResponse::deferred(),
                follow_up: Some(submission),
            }),
            Some(Err(e)) => {
                debug!(error = %e, "rejected birthdate input");
                Ok(Dispatched::now(InteractionResponse::reply(
                    MessagePayload::text(e.user_message()),
                )))
            }
            None => {
                warn!("birthdate submission without member, guild or field");
                Ok(Dispatched::now(InteractionResponse::ephemeral_message(
                    UNEXPECTED_ERROR,
                )))
            }
        },
        Route::Unhandled => {
            debug!(
                command = ?interaction.command_name(),
                custom_id = ?interaction.custom_id(),
                "ignoring unhandled interaction"
            );
            Err((StatusCode::BAD_REQUEST, "unhandled interaction".into()))
        }
    }
}

/// JSON response whose body fires `ack` once the server has taken all of it.
///
/// The sender is dropped unfired when the body is dropped before that.
fn acknowledging(
    response: &InteractionResponse,
    ack: oneshot::Sender<()>,
) -> Result<Response, (StatusCode, String)> {
    let json = serde_json::to_vec(response)
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    let chunks = stream::unfold(
        (Some(Bytes::from(json)), Some(ack)),
        |(json, ack)| async move {
            match json {
                Some(bytes) => Some((Ok::<_, Infallible>(bytes), (None, ack))),
                None => {
                    if let Some(ack) = ack {
                        let _ = ack.send(());
                    }
                    None
                }
            }
        },
    );

    Ok((
        [(header::CONTENT_TYPE, "application/json")],
        Body::from_stream(chunks),
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use std::{sync::Arc, time::Duration};

    use serde_json::{json, Value};

    use super::*;
    use crate::discord::fake::FakeDiscord;

    fn interaction(value: Value) -> Interaction {
        serde_json::from_value(value).unwrap()
    }

    fn base(kind: u8, data: Value) -> Value {
        json!({
            "id": "1",
            "application_id": "test-app",
            "type": kind,
            "token": "tok",
            "guild_id": "test-guild",
            "member": { "user": { "id": "42", "username": "alice" } },
            "data": data
        })
    }

    fn form(value: &str) -> Value {
        base(
            5,
            json!({
                "custom_id": "ageModal",
                "components": [{ "type": 1, "components": [
                    { "type": 4, "custom_id": "birthdate", "value": value }
                ] }]
            }),
        )
    }

    fn state() -> (AppState, Arc<FakeDiscord>) {
        let discord = Arc::new(FakeDiscord::with_roles(&["18+", "NOT VERIFIED"]));
        (AppState::fake(discord.clone()), discord)
    }

    fn respond(raw: Value) -> Value {
        let dispatched = dispatch(interaction(raw)).unwrap();
        assert!(dispatched.follow_up.is_none());
        serde_json::to_value(dispatched.response).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn routes_by_kind_and_identifier() {
        assert_eq!(Route::of(&interaction(base(1, Value::Null))), Route::Ping);
        assert_eq!(
            Route::of(&interaction(base(2, json!({ "name": "verifybirthday" })))),
            Route::VerifyCommand
        );
        assert_eq!(
            Route::of(&interaction(base(2, json!({ "name": "other" })))),
            Route::Unhandled
        );
        assert_eq!(
            Route::of(&interaction(base(3, json!({ "custom_id": "openModal" })))),
            Route::OpenForm
        );
        assert_eq!(
            Route::of(&interaction(base(3, json!({ "custom_id": "ageModal" })))),
            Route::Unhandled
        );
        assert_eq!(
            Route::of(&interaction(base(4, json!({ "name": "verifybirthday" })))),
            Route::Unhandled
        );
        assert_eq!(Route::of(&interaction(form("01-01-1990"))), Route::SubmitForm);
    }

    #[test]
    fn ping_gets_pong() {
        assert_eq!(respond(base(1, Value::Null)), json!({ "type": 1 }));
    }

    #[test]
    fn command_answers_with_private_prompt() {
        let value = respond(base(2, json!({ "name": "verifybirthday" })));
        assert_eq!(value["type"], 4);
        assert_eq!(value["data"]["flags"], 64);
        assert_eq!(value["data"]["embeds"][0]["title"], "🎂 Birthday Verification");
        assert_eq!(value["data"]["components"][0]["components"][0]["custom_id"], "openModal");
    }

    #[test]
    fn button_opens_form() {
        let value = respond(base(3, json!({ "custom_id": "openModal" })));
        assert_eq!(value["type"], 9);
        assert_eq!(value["data"]["custom_id"], "ageModal");
    }

    #[test]
    fn unknown_button_is_ignored() {
        let err = dispatch(interaction(base(3, json!({ "custom_id": "bogus" })))).unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn invalid_date_is_answered_directly() {
        for raw in ["2005-06-15", "31-02-2000", "not a date"] {
            assert_eq!(
                respond(form(raw)),
                json!({ "type": 4, "data": { "content": "❌ Invalid date format. Use DD-MM-YYYY." } })
            );
        }
    }

    #[test]
    fn valid_submission_is_deferred_publicly() {
        let dispatched = dispatch(interaction(form("01-01-1990"))).unwrap();
        assert_eq!(serde_json::to_value(&dispatched.response).unwrap(), json!({ "type": 5 }));
        let submission = dispatched.follow_up.unwrap();
        assert_eq!(submission.token, "tok");
        assert_eq!(submission.birthdate.to_string(), "01-01-1990");
    }

    #[test]
    fn submission_outside_guild_gets_fresh_ephemeral_failure() {
        let mut raw = form("01-01-1990");
        raw.as_object_mut().unwrap().remove("guild_id");
        assert_eq!(
            respond(raw),
            json!({ "type": 4, "data": { "content": UNEXPECTED_ERROR, "flags": 64 } })
        );
    }

    #[tokio::test]
    async fn edit_waits_until_ack_body_is_sent() {
        let (state, discord) = state();
        let response = interactions(
            State(state),
            VerifiedInteraction(interaction(form("01-01-1990"))),
        )
        .await
        .unwrap();
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(discord.attached().is_empty());
        assert!(discord.edits().is_empty());

        assert_eq!(body_json(response).await, json!({ "type": 5 }));
        for _ in 0..100 {
            if !discord.edits().is_empty() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        let edits = discord.edits();
        assert_eq!(edits.len(), 1);
        assert_eq!(edits[0].0, "tok");
        assert_eq!(discord.attached().len(), 1);
    }

    #[tokio::test]
    async fn dropped_ack_body_means_no_edit() {
        let (state, discord) = state();
        let response = interactions(
            State(state),
            VerifiedInteraction(interaction(form("01-01-1990"))),
        )
        .await
        .unwrap();
        drop(response);

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(discord.attached().is_empty());
        assert!(discord.edits().is_empty());
    }

    #[tokio::test]
    async fn immediate_answers_touch_nothing() {
        let (state, discord) = state();
        let response = interactions(
            State(state),
            VerifiedInteraction(interaction(form("32-01-1990"))),
        )
        .await
        .unwrap();
        assert_eq!(
            body_json(response).await["data"]["content"],
            "❌ Invalid date format. Use DD-MM-YYYY."
        );

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(discord.attached().is_empty());
        assert!(discord.edits().is_empty());
    }
}
