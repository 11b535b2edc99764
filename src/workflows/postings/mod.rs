//! Posting moderation workflow: form collection, submission registry,
//! moderation decision protocol, daily publish quota, and the channel
//! renderer.

pub mod domain;
pub mod form;
pub mod gateway;
pub mod payload;
pub mod quota;
pub mod registry;
pub mod render;
pub mod store;
pub mod validate;

#[cfg(test)]
mod tests;

pub use domain::{
    ChatId, FieldKey, MediaKind, MediaRef, MessageRef, PostingDraft, PublishedPost, RejectReason,
    Role, Submission, SubmissionId, SubmissionStatus, UserId,
};
pub use form::{FormSession, FormStep, Transition};
pub use gateway::{Button, DeliveryError, MessengerGateway};
pub use payload::{ButtonPayload, FixTarget, PayloadError, ReasonChoice};
pub use quota::{QuotaTracker, Remaining, DAILY_FREE_LIMIT};
pub use registry::{
    ChannelConfig, DecisionError, PublishReceipt, RejectReceipt, SubmissionRegistry, SubmitError,
};
pub use render::render;
pub use store::{MemorySubmissionStore, StoreError, SubmissionStore};
pub use validate::{ProfanityFilter, WordListFilter};
