use serde::{Deserialize, Serialize};

/// Ephemeral message flag.
pub const EPHEMERAL: u64 = 1 << 6;

/// Discord "blurple".
pub const BLURPLE: u32 = 0x5865F2;

/// Interaction kinds delivered to the interactions endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "u8")]
pub enum InteractionKind {
    Ping,
    ApplicationCommand,
    MessageComponent,
    /// Parsed but never answered; routes to `Unhandled`.
    Autocomplete,
    ModalSubmit,
}

impl TryFrom<u8> for InteractionKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Ping),
            2 => Ok(Self::ApplicationCommand),
            3 => Ok(Self::MessageComponent),
            4 => Ok(Self::Autocomplete),
            5 => Ok(Self::ModalSubmit),
            other => Err(format!("unknown interaction type {other}")),
        }
    }
}

/// Inbound interaction payload, trimmed to the fields the bot reads.
#[derive(Debug, Clone, Deserialize)]
pub struct Interaction {
    pub id: String,
    pub application_id: String,
    #[serde(rename = "type")]
    pub kind: InteractionKind,
    pub token: String,
    #[serde(default)]
    pub data: Option<InteractionData>,
    #[serde(default)]
    pub guild_id: Option<String>,
    #[serde(default)]
    pub member: Option<Member>,
}

impl Interaction {
    pub fn command_name(&self) -> Option<&str> {
        self.data.as_ref()?.name.as_deref()
    }

    pub fn custom_id(&self) -> Option<&str> {
        self.data.as_ref()?.custom_id.as_deref()
    }

    /// Value of a text input submitted through a modal.
    pub fn field_value(&self, custom_id: &str) -> Option<&str> {
        self.data
            .as_ref()?
            .components
            .iter()
            .flat_map(|row| row.components.iter())
            .find(|field| field.custom_id == custom_id)
            .and_then(|field| field.value.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InteractionData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub custom_id: Option<String>,
    #[serde(default)]
    pub components: Vec<SubmittedRow>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedRow {
    #[serde(default)]
    pub components: Vec<SubmittedField>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SubmittedField {
    pub custom_id: String,
    #[serde(default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Member {
    pub user: User,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub discriminator: Option<String>,
}

impl User {
    /// `name#1234` for legacy accounts, plain username otherwise.
    pub fn tag(&self) -> String {
        match self.discriminator.as_deref() {
            Some(d) if !d.is_empty() && d != "0" => format!("{}#{}", self.username, d),
            _ => self.username.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Role {
    pub id: String,
    pub name: String,
}

// --- outbound ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum ResponseKind {
    Pong,
    ChannelMessage,
    DeferredChannelMessage,
    Modal,
}

impl From<ResponseKind> for u8 {
    fn from(kind: ResponseKind) -> Self {
        match kind {
            ResponseKind::Pong => 1,
            ResponseKind::ChannelMessage => 4,
            ResponseKind::DeferredChannelMessage => 5,
            ResponseKind::Modal => 9,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: ResponseKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<ResponseData>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ResponseData {
    Message(MessagePayload),
    Modal(ModalPayload),
}

impl InteractionResponse {
    pub fn pong() -> Self {
        Self {
            kind: ResponseKind::Pong,
            data: None,
        }
    }

    /// Public "thinking..." acknowledgement, replaced later by editing the original.
    pub fn deferred() -> Self {
        Self {
            kind: ResponseKind::DeferredChannelMessage,
            data: None,
        }
    }

    pub fn reply(message: MessagePayload) -> Self {
        Self {
            kind: ResponseKind::ChannelMessage,
            data: Some(ResponseData::Message(message)),
        }
    }

    pub fn ephemeral_reply(message: MessagePayload) -> Self {
        Self::reply(MessagePayload {
            flags: Some(EPHEMERAL),
            ..message
        })
    }

    pub fn ephemeral_message(content: impl Into<String>) -> Self {
        Self::ephemeral_reply(MessagePayload::text(content))
    }

    pub fn modal(modal: ModalPayload) -> Self {
        Self {
            kind: ResponseKind::Modal,
            data: Some(ResponseData::Modal(modal)),
        }
    }
}

/// Message body used for initial replies and for edits of the original response.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MessagePayload {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub embeds: Vec<Embed>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ActionRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<u64>,
}

impl MessagePayload {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Embed {
    pub title: String,
    pub description: String,
    pub color: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModalPayload {
    pub custom_id: String,
    pub title: String,
    pub components: Vec<ActionRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionRow {
    #[serde(rename = "type")]
    pub kind: u8,
    pub components: Vec<Component>,
}

impl ActionRow {
    pub fn with(component: Component) -> Self {
        Self {
            kind: 1,
            components: vec![component],
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Component {
    Button(Button),
    TextInput(TextInput),
}

#[derive(Debug, Clone, Serialize)]
pub struct Button {
    #[serde(rename = "type")]
    pub kind: u8,
    pub style: u8,
    pub label: String,
    pub custom_id: String,
}

impl Button {
    pub fn primary(custom_id: &str, label: &str) -> Self {
        Self {
            kind: 2,
            style: 1,
            label: label.into(),
            custom_id: custom_id.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TextInput {
    #[serde(rename = "type")]
    pub kind: u8,
    pub custom_id: String,
    pub style: u8,
    pub label: String,
    pub placeholder: String,
    pub required: bool,
}

impl TextInput {
    pub fn short(custom_id: &str, label: &str, placeholder: &str) -> Self {
        Self {
            kind: 4,
            custom_id: custom_id.into(),
            style: 1,
            label: label.into(),
            placeholder: placeholder.into(),
            required: true,
        }
    }
}

/// Chat-input command definition sent at registration.
#[derive(Debug, Clone, Serialize)]
pub struct CommandDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_modal_submission() {
        let raw = json!({
            "id": "1",
            "application_id": "10",
            "type": 5,
            "token": "tok",
            "guild_id": "20",
            "member": { "user": { "id": "30", "username": "alice", "discriminator": "0" } },
            "data": {
                "custom_id": "ageModal",
                "components": [
                    { "type": 1, "components": [
                        { "type": 4, "custom_id": "birthdate", "value": "15-06-2005" }
                    ] }
                ]
            }
        });
        let interaction: Interaction = serde_json::from_value(raw).unwrap();
        assert_eq!(interaction.kind, InteractionKind::ModalSubmit);
        assert_eq!(interaction.custom_id(), Some("ageModal"));
        assert_eq!(interaction.field_value("birthdate"), Some("15-06-2005"));
        assert_eq!(interaction.field_value("other"), None);
        assert_eq!(interaction.member.unwrap().user.tag(), "alice");
    }

    #[test]
    fn rejects_unknown_interaction_type() {
        let raw = json!({ "id": "1", "application_id": "10", "type": 42, "token": "t" });
        assert!(serde_json::from_value::<Interaction>(raw).is_err());
    }

    #[test]
    fn legacy_tag_keeps_discriminator() {
        let user = User {
            id: "1".into(),
            username: "bob".into(),
            discriminator: Some("0420".into()),
        };
        assert_eq!(user.tag(), "bob#0420");
    }

    #[test]
    fn ephemeral_reply_sets_flag() {
        let value = serde_json::to_value(InteractionResponse::ephemeral_message("hi")).unwrap();
        assert_eq!(value, json!({ "type": 4, "data": { "content": "hi", "flags": 64 } }));

        let value = serde_json::to_value(InteractionResponse::deferred()).unwrap();
        assert_eq!(value, json!({ "type": 5 }));
    }
}
