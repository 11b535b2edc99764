use super::domain::{ChatId, MediaRef, MessageRef};

/// One inline button: a visible label and the callback payload the
/// transport echoes back when pressed (see [`super::payload`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub payload: String,
}

impl Button {
    pub fn new(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            payload: payload.into(),
        }
    }
}

/// Outbound delivery failure, carrying the transport's own description.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("delivery failed: {0}")]
    Transport(String),
}

/// Outbound side of the messaging transport. The bot framework adapter
/// implements this; the engine never talks to the network directly. An
/// empty button slice means "no keyboard" and edits with an empty slice
/// clear any controls the message carried.
///
/// Sends on the decision path are fatal for the operation in flight.
/// In-place edits of already-delivered cards are best effort: the
/// registry logs a failed edit and carries on, because a stale card must
/// not lose a recorded decision.
pub trait MessengerGateway: Send + Sync {
    fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        buttons: &[Button],
    ) -> Result<MessageRef, DeliveryError>;

    fn send_media(
        &self,
        chat: ChatId,
        media: &MediaRef,
        caption: &str,
        buttons: &[Button],
    ) -> Result<MessageRef, DeliveryError>;

    fn edit_text(
        &self,
        message: &MessageRef,
        text: &str,
        buttons: &[Button],
    ) -> Result<(), DeliveryError>;

    fn edit_media_caption(
        &self,
        message: &MessageRef,
        caption: &str,
        buttons: &[Button],
    ) -> Result<(), DeliveryError>;
}
