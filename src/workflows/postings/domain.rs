use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a bot user (the posting author or a moderator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub i64);

/// Destination chat: a user's private chat, the moderation chat, or the
/// public channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

impl From<UserId> for ChatId {
    fn from(value: UserId) -> Self {
        ChatId(value.0)
    }
}

/// Handle to a delivered message, usable for later in-place edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRef {
    pub chat: ChatId,
    pub message_id: i64,
}

/// Identifier of a submission. Allocated once per "send to moderation"
/// event; never reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

impl std::fmt::Display for SubmissionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Who is posting: an employer advertising a vacancy or a job seeker
/// advertising themselves. The role fixes the field sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Employer,
    Seeker,
}

impl Role {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Employer => "Работодатель",
            Self::Seeker => "Соискатель",
        }
    }

    /// Hashtag marking the posting kind in the public channel.
    pub const fn marker_tag(self) -> &'static str {
        match self {
            Self::Employer => "#вакансия",
            Self::Seeker => "#резюме",
        }
    }

    /// Ordered fields collected by the form flow. The seeker additionally
    /// reports a work schedule.
    pub const fn field_sequence(self) -> &'static [FieldKey] {
        match self {
            Self::Employer => &[
                FieldKey::Position,
                FieldKey::Salary,
                FieldKey::Location,
                FieldKey::Contacts,
                FieldKey::Description,
            ],
            Self::Seeker => &[
                FieldKey::Position,
                FieldKey::Schedule,
                FieldKey::Salary,
                FieldKey::Location,
                FieldKey::Contacts,
                FieldKey::Description,
            ],
        }
    }
}

/// A single collectible field of a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    Position,
    Schedule,
    Salary,
    Location,
    Contacts,
    Description,
}

impl FieldKey {
    /// Stable token used inside button payloads.
    pub const fn token(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Schedule => "schedule",
            Self::Salary => "salary",
            Self::Location => "location",
            Self::Contacts => "contacts",
            Self::Description => "description",
        }
    }

    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "position" => Some(Self::Position),
            "schedule" => Some(Self::Schedule),
            "salary" => Some(Self::Salary),
            "location" => Some(Self::Location),
            "contacts" => Some(Self::Contacts),
            "description" => Some(Self::Description),
            _ => None,
        }
    }

    /// Label shown next to the value in rendered postings.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Position => "👤 Должность",
            Self::Schedule => "🕒 График",
            Self::Salary => "💲 Зарплата",
            Self::Location => "📍 Локация",
            Self::Contacts => "☎️ Контакты",
            Self::Description => "📝 Описание",
        }
    }

    /// Accusative field title used in validation nags.
    pub const fn title_accusative(self) -> &'static str {
        match self {
            Self::Position => "должность",
            Self::Schedule => "график",
            Self::Salary => "зарплату",
            Self::Location => "локацию",
            Self::Contacts => "контакты",
            Self::Description => "описание",
        }
    }
}

/// Kind of media attached to a posting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Photo,
    Video,
}

/// Opaque transport handle to an uploaded photo or video.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRef {
    pub kind: MediaKind,
    pub handle: String,
}

/// Fields collected during the form flow. Mutated only by the owning
/// user's [`super::FormSession`]; the registry works with immutable
/// snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostingDraft {
    pub role: Role,
    pub position: String,
    pub schedule: String,
    pub salary: String,
    pub location: String,
    pub contacts: String,
    pub description: String,
    pub media: Option<MediaRef>,
    pub author_id: UserId,
    pub author_display: String,
}

impl PostingDraft {
    pub fn empty(role: Role, author_id: UserId, author_display: String) -> Self {
        Self {
            role,
            position: String::new(),
            schedule: String::new(),
            salary: String::new(),
            location: String::new(),
            contacts: String::new(),
            description: String::new(),
            media: None,
            author_id,
            author_display,
        }
    }

    pub fn field(&self, key: FieldKey) -> &str {
        match key {
            FieldKey::Position => &self.position,
            FieldKey::Schedule => &self.schedule,
            FieldKey::Salary => &self.salary,
            FieldKey::Location => &self.location,
            FieldKey::Contacts => &self.contacts,
            FieldKey::Description => &self.description,
        }
    }

    pub fn set_field(&mut self, key: FieldKey, value: String) {
        match key {
            FieldKey::Position => self.position = value,
            FieldKey::Schedule => self.schedule = value,
            FieldKey::Salary => self.salary = value,
            FieldKey::Location => self.location = value,
            FieldKey::Contacts => self.contacts = value,
            FieldKey::Description => self.description = value,
        }
    }
}

/// Lifecycle status of a submission. Pending is the only state a
/// moderation decision may act on; Rejected and Published are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    Pending,
    Rejected,
    Published,
}

impl SubmissionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Rejected => "rejected",
            Self::Published => "published",
        }
    }
}

/// Why a moderator rejected the posting: one of the fixed per-field
/// templates, or free text collected from the moderator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RejectReason {
    Field(FieldKey),
    Custom(String),
}

impl RejectReason {
    /// Human-readable reason shown to the author and stamped on the card.
    pub fn summary(&self) -> String {
        match self {
            Self::Field(FieldKey::Position) => "Должность некорректная".to_string(),
            Self::Field(FieldKey::Schedule) => "График некорректный".to_string(),
            Self::Field(FieldKey::Salary) => "Зарплата некорректная".to_string(),
            Self::Field(FieldKey::Location) => "Локация некорректная".to_string(),
            Self::Field(FieldKey::Contacts) => "Контакты некорректные".to_string(),
            Self::Field(FieldKey::Description) => "Описание неправильное".to_string(),
            Self::Custom(text) => text.clone(),
        }
    }

    /// Field the author is pointed at when fixing the posting, if the
    /// reason names one.
    pub fn target_field(&self) -> Option<FieldKey> {
        match self {
            Self::Field(key) => Some(*key),
            Self::Custom(_) => None,
        }
    }
}

/// Reference to the published channel post, including the shareable link
/// when the channel has a public username.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedPost {
    pub message: MessageRef,
    pub url: Option<String>,
}

/// A posting queued for (or resolved by) moderation. The draft is an
/// immutable snapshot decoupled from the live form session. Submissions
/// are never deleted; decisions move them to a terminal status and they
/// remain queryable for the resubmission loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Submission {
    pub id: SubmissionId,
    pub draft: PostingDraft,
    pub status: SubmissionStatus,
    pub moderation_msg: Option<MessageRef>,
    pub author_msg: Option<MessageRef>,
    pub public_post: Option<PublishedPost>,
    pub rejection: Option<RejectReason>,
    pub submitted_at: DateTime<Utc>,
}
