use super::dto::{
    ActionRow, Button, CommandDefinition, Component, Embed, MessagePayload, ModalPayload,
    TextInput, BLURPLE,
};

/// Name of the slash command that starts verification.
pub const VERIFY_COMMAND: &str = "verifybirthday";

/// Identifiers shared by the components the bot emits and the events it accepts back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomId {
    OpenForm,
    BirthdateForm,
    BirthdateField,
}

impl CustomId {
    pub const fn as_str(self) -> &'static str {
        match self {
            CustomId::OpenForm => "openModal",
            CustomId::BirthdateForm => "ageModal",
            CustomId::BirthdateField => "birthdate",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        [Self::OpenForm, Self::BirthdateForm, Self::BirthdateField]
            .into_iter()
            .find(|id| id.as_str() == raw)
    }
}

/// The two mutually exclusive roles handed out after verification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MembershipRole {
    Adult,
    NotVerified,
}

impl MembershipRole {
    pub const fn name(self) -> &'static str {
        match self {
            MembershipRole::Adult => "18+",
            MembershipRole::NotVerified => "NOT VERIFIED",
        }
    }

    pub fn for_age(age: i32) -> Self {
        if age >= super::birthdate::ADULT_AGE {
            MembershipRole::Adult
        } else {
            MembershipRole::NotVerified
        }
    }
}

pub fn commands() -> Vec<CommandDefinition> {
    vec![CommandDefinition {
        name: VERIFY_COMMAND.into(),
        description: "Start birthday verification process".into(),
        kind: 1,
    }]
}

/// Embed and button shown in answer to the command.
pub fn verification_prompt() -> MessagePayload {
    MessagePayload {
        embeds: vec![Embed {
            title: "🎂 Birthday Verification".into(),
            description: "Click the button below to input your birthdate.".into(),
            color: BLURPLE,
        }],
        components: vec![ActionRow::with(Component::Button(Button::primary(
            CustomId::OpenForm.as_str(),
            "Enter Birthdate",
        )))],
        ..MessagePayload::default()
    }
}

pub fn birthdate_form() -> ModalPayload {
    ModalPayload {
        custom_id: CustomId::BirthdateForm.as_str().into(),
        title: "Enter Your Birthdate".into(),
        components: vec![ActionRow::with(Component::TextInput(TextInput::short(
            CustomId::BirthdateField.as_str(),
            "Enter your birthday (DD-MM-YYYY)",
            "e.g. 15-06-2005",
        )))],
    }
}
