use super::domain::{FieldKey, RejectReason, Role, SubmissionId};
use super::gateway::Button;

/// Reason selector on the rejection keyboard: a concrete field template
/// or the free-text "other" option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReasonChoice {
    Field(FieldKey),
    Custom,
}

/// Target of the author's fix button: jump to one field, or straight to
/// the preview when no single field is named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixTarget {
    Field(FieldKey),
    All,
}

/// Parsed inline-button payload. The wire format is colon-delimited and
/// must stay compatible with buttons already delivered to chats:
///
/// ```text
/// mod_approve:<id>
/// mod_reject:<id>
/// mod_reason:<id>:<field|custom>
/// fix_rej:<id>:<field|all>
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ButtonPayload {
    Approve(SubmissionId),
    Reject(SubmissionId),
    Reason {
        submission: SubmissionId,
        choice: ReasonChoice,
    },
    Fix {
        submission: SubmissionId,
        target: FixTarget,
    },
    /// The placeholder button on a locked draft. Answered with a
    /// transient "already on moderation" notice.
    Noop,
}

/// A payload that cannot be parsed. Answered with a transient notice,
/// never a crash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid button")]
pub struct PayloadError;

impl ButtonPayload {
    pub fn encode(&self) -> String {
        match self {
            Self::Approve(id) => format!("mod_approve:{id}"),
            Self::Reject(id) => format!("mod_reject:{id}"),
            Self::Reason { submission, choice } => {
                let token = match choice {
                    ReasonChoice::Field(field) => field.token(),
                    ReasonChoice::Custom => "custom",
                };
                format!("mod_reason:{submission}:{token}")
            }
            Self::Fix { submission, target } => {
                let token = match target {
                    FixTarget::Field(field) => field.token(),
                    FixTarget::All => "all",
                };
                format!("fix_rej:{submission}:{token}")
            }
            Self::Noop => "noop".to_string(),
        }
    }

    pub fn parse(data: &str) -> Result<Self, PayloadError> {
        if data == "noop" {
            return Ok(Self::Noop);
        }
        let (prefix, rest) = data.split_once(':').ok_or(PayloadError)?;
        match prefix {
            "mod_approve" => Ok(Self::Approve(parse_id(rest)?)),
            "mod_reject" => Ok(Self::Reject(parse_id(rest)?)),
            "mod_reason" => {
                let (id, token) = rest.split_once(':').ok_or(PayloadError)?;
                // Unknown reason tokens fall back to the free-text path.
                let choice = match FieldKey::from_token(token.trim()) {
                    Some(field) => ReasonChoice::Field(field),
                    None => ReasonChoice::Custom,
                };
                Ok(Self::Reason {
                    submission: parse_id(id)?,
                    choice,
                })
            }
            "fix_rej" => {
                let (id, token) = rest.split_once(':').ok_or(PayloadError)?;
                // Unknown fix tokens land on the preview rather than failing.
                let target = match FieldKey::from_token(token.trim()) {
                    Some(field) => FixTarget::Field(field),
                    None => FixTarget::All,
                };
                Ok(Self::Fix {
                    submission: parse_id(id)?,
                    target,
                })
            }
            _ => Err(PayloadError),
        }
    }
}

fn parse_id(raw: &str) -> Result<SubmissionId, PayloadError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed.contains(':') {
        return Err(PayloadError);
    }
    Ok(SubmissionId(trimmed.to_string()))
}

/// Approve/reject controls under a freshly delivered moderation card.
pub fn moderation_controls(id: &SubmissionId) -> Vec<Button> {
    vec![
        Button::new("✅ Одобрить", ButtonPayload::Approve(id.clone()).encode()),
        Button::new("❌ Отклонить", ButtonPayload::Reject(id.clone()).encode()),
    ]
}

/// Reason rows shown after a moderator presses reject. The schedule
/// template only exists for seeker postings.
pub fn rejection_reasons(role: Role, id: &SubmissionId) -> Vec<Button> {
    let mut fields = vec![
        FieldKey::Position,
        FieldKey::Salary,
        FieldKey::Location,
        FieldKey::Contacts,
        FieldKey::Description,
    ];
    if role == Role::Seeker {
        fields.insert(1, FieldKey::Schedule);
    }

    let mut rows: Vec<Button> = fields
        .into_iter()
        .map(|field| {
            Button::new(
                RejectReason::Field(field).summary(),
                ButtonPayload::Reason {
                    submission: id.clone(),
                    choice: ReasonChoice::Field(field),
                }
                .encode(),
            )
        })
        .collect();
    rows.push(Button::new(
        "Другая причина",
        ButtonPayload::Reason {
            submission: id.clone(),
            choice: ReasonChoice::Custom,
        }
        .encode(),
    ));
    rows
}

/// The single fix button attached to a rejection notice.
pub fn fix_button(id: &SubmissionId, target: FixTarget) -> Button {
    let title = match target {
        FixTarget::Field(field) => field.label(),
        FixTarget::All => "Объявление",
    };
    Button::new(
        format!("✏️ Исправить: {title}"),
        ButtonPayload::Fix {
            submission: id.clone(),
            target,
        }
        .encode(),
    )
}

/// The stub button that replaces the edit keyboard once the draft is
/// locked for moderation.
pub fn locked_placeholder() -> Button {
    Button::new(
        "⏳ Объявление отправлено на модерацию",
        ButtonPayload::Noop.encode(),
    )
}
