use serde::{Deserialize, Serialize};

use super::domain::{FieldKey, MediaRef, PostingDraft, Role, UserId};
use super::validate::{validate_field, ProfanityFilter};

/// Position of a form session inside the collection flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FormStep {
    /// Waiting for the value of one field of the role sequence.
    Field(FieldKey),
    /// Waiting for the attach-or-skip media choice.
    MediaChoice,
    /// Media attachment requested; waiting for the upload.
    AwaitingMedia,
    /// Draft is complete and shown with the edit keyboard.
    Preview,
}

/// What the dispatch layer should do after feeding an update into the
/// session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Ask the user for the named field.
    Prompt { field: FieldKey, text: String },
    /// Input rejected; re-ask the same field with the error text.
    Retry { field: FieldKey, error: String },
    /// Ask for the attach-or-skip media choice.
    MediaChoice { text: String },
    /// Ask the user to upload the photo or video.
    AwaitMedia { text: String },
    /// Show the draft preview with the edit keyboard.
    Preview,
    /// Free text arrived outside a field step; nothing to do.
    Ignored,
}

/// Per-user multi-step field collection state machine.
///
/// One user owns at most one session; it is created on role selection and
/// discarded on cancellation or once the published-reset happens. The
/// `inline_edit` and `force_preview` flags both short-circuit the next
/// accepted field straight to the preview and are always cleared together.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormSession {
    step: FormStep,
    draft: PostingDraft,
    inline_edit: bool,
    force_preview: bool,
    on_moderation: bool,
}

impl FormSession {
    /// Start a fresh session for the chosen role, discarding any prior
    /// state the caller held for this user.
    pub fn start(role: Role, author_id: UserId, author_display: String) -> (Self, Transition) {
        let first = role.field_sequence()[0];
        let session = Self {
            step: FormStep::Field(first),
            draft: PostingDraft::empty(role, author_id, author_display),
            inline_edit: false,
            force_preview: false,
            on_moderation: false,
        };
        let prompt = Transition::Prompt {
            field: first,
            text: initial_prompt(role, first),
        };
        (session, prompt)
    }

    /// Rehydrate a session from a rejected draft so the author can fix a
    /// single field. The session jumps straight to `field` (or to the
    /// preview when no field is named) and the next accepted value
    /// returns to the preview instead of re-walking the sequence.
    pub fn resume_for_fix(draft: PostingDraft, field: Option<FieldKey>) -> (Self, Transition) {
        let (step, transition) = match field {
            Some(field) => (
                FormStep::Field(field),
                Transition::Prompt {
                    field,
                    text: fix_prompt(field),
                },
            ),
            None => (FormStep::Preview, Transition::Preview),
        };
        let session = Self {
            step,
            draft,
            inline_edit: true,
            force_preview: true,
            on_moderation: false,
        };
        (session, transition)
    }

    pub fn step(&self) -> FormStep {
        self.step
    }

    pub fn draft(&self) -> &PostingDraft {
        &self.draft
    }

    pub fn role(&self) -> Role {
        self.draft.role
    }

    pub fn author_id(&self) -> UserId {
        self.draft.author_id
    }

    pub fn is_inline_edit(&self) -> bool {
        self.inline_edit
    }

    pub fn is_on_moderation(&self) -> bool {
        self.on_moderation
    }

    pub(crate) fn lock_for_moderation(&mut self) {
        self.on_moderation = true;
    }

    /// Feed one free-text message into the session. On validation failure
    /// the step does not advance; on success the value is stored and the
    /// session either short-circuits to the preview (inline edit or
    /// post-rejection fix) or advances along the role sequence.
    pub fn submit_field_value(
        &mut self,
        raw: &str,
        profanity: &dyn ProfanityFilter,
    ) -> Transition {
        let FormStep::Field(field) = self.step else {
            return Transition::Ignored;
        };

        let value = match validate_field(field, raw, profanity) {
            Ok(value) => value,
            Err(err) => {
                return Transition::Retry {
                    field,
                    error: err.to_string(),
                }
            }
        };
        self.draft.set_field(field, value);

        if self.inline_edit || self.force_preview {
            self.inline_edit = false;
            self.force_preview = false;
            self.on_moderation = false;
            self.step = FormStep::Preview;
            return Transition::Preview;
        }

        match next_field(self.draft.role, field) {
            Some(next) => {
                self.step = FormStep::Field(next);
                Transition::Prompt {
                    field: next,
                    text: initial_prompt(self.draft.role, next),
                }
            }
            None => {
                self.step = FormStep::MediaChoice;
                Transition::MediaChoice {
                    text: "Прикрепи фото/видео или пропусти.".to_string(),
                }
            }
        }
    }

    /// Jump back to a single field from the preview keyboard. The next
    /// accepted value returns straight to the preview.
    pub fn begin_inline_edit(&mut self, field: FieldKey) -> Transition {
        self.inline_edit = true;
        self.force_preview = false;
        self.step = FormStep::Field(field);
        Transition::Prompt {
            field,
            text: edit_prompt(field),
        }
    }

    /// The user chose to attach media; wait for the upload.
    pub fn request_media(&mut self) -> Transition {
        self.step = FormStep::AwaitingMedia;
        Transition::AwaitMedia {
            text: "Отправь фото или видео.".to_string(),
        }
    }

    pub fn attach_media(&mut self, media: MediaRef) -> Transition {
        self.draft.media = Some(media);
        self.step = FormStep::Preview;
        Transition::Preview
    }

    pub fn skip_media(&mut self) -> Transition {
        self.draft.media = None;
        self.step = FormStep::Preview;
        Transition::Preview
    }

    /// Discard the draft entirely. No submission is created.
    pub fn cancel(self) {}
}

fn next_field(role: Role, current: FieldKey) -> Option<FieldKey> {
    let sequence = role.field_sequence();
    let index = sequence.iter().position(|&f| f == current)?;
    sequence.get(index + 1).copied()
}

/// First-pass prompt for a field, with role-appropriate examples.
fn initial_prompt(role: Role, field: FieldKey) -> String {
    let text = match (role, field) {
        (Role::Employer, FieldKey::Position) => {
            "Укажи 👤 должность.\nПример: Бармен, Официант, Администратор"
        }
        (Role::Seeker, FieldKey::Position) => {
            "Укажи 👤 должность.\nПример: Бариста, Официант, Администратор"
        }
        (_, FieldKey::Schedule) => "Укажи 🕒 график.\nПример: 5/2, 2/2, Сменный, Гибкий, Удалёнка",
        (Role::Employer, FieldKey::Salary) => {
            "Укажи 💲 зарплату.\nПример: 120000, до 200000, от 80k, по договорённости"
        }
        (Role::Seeker, FieldKey::Salary) => {
            "Укажи 💲 зарплатные ожидания.\nПример: от 80 000, 120 000, по договорённости"
        }
        (_, FieldKey::Location) => "Укажи 📍 локацию.\nПример: Москва, Санкт-Петербург",
        (_, FieldKey::Contacts) => "Укажи ☎️ контакты.\nПример: @username / +7... / WhatsApp",
        (Role::Employer, FieldKey::Description) => "Опиши 📝 вакансию (до 3000 символов).",
        (Role::Seeker, FieldKey::Description) => "Укажи 📝 описание.\nКоротко: опыт, навыки, условия",
    };
    text.to_string()
}

fn edit_prompt(field: FieldKey) -> String {
    format!("✏️ Редактирование: {}", field.label())
}

fn fix_prompt(field: FieldKey) -> String {
    let text = match field {
        FieldKey::Position => "Введи исправленную 👤 должность:",
        FieldKey::Schedule => "Введи исправленный 🕒 график:",
        FieldKey::Salary => "Введи исправленную 💲 зарплату:",
        FieldKey::Location => "Введи исправленную 📍 локацию:",
        FieldKey::Contacts => "Введи исправленные ☎️ контакты:",
        FieldKey::Description => "Введи исправленное 📝 описание:",
    };
    text.to_string()
}
