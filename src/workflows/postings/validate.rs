use std::sync::OnceLock;

use regex::Regex;

use super::domain::FieldKey;

pub const DESCRIPTION_MIN_CHARS: usize = 10;
pub const DESCRIPTION_MAX_CHARS: usize = 3000;

/// Obscenity predicate consumed by the field validator. The concrete
/// lexicon lives outside the workflow engine; tests and the default
/// wiring use [`WordListFilter`].
pub trait ProfanityFilter: Send + Sync {
    fn contains_profanity(&self, text: &str) -> bool;
}

/// Stem-based word list: a word matches when it starts with one of the
/// lowercased stems.
pub struct WordListFilter {
    stems: Vec<String>,
}

impl WordListFilter {
    pub fn new<I, S>(stems: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stems: stems.into_iter().map(|s| s.into().to_lowercase()).collect(),
        }
    }
}

impl Default for WordListFilter {
    fn default() -> Self {
        Self::new(["хуй", "пизд", "бляд", "блять", "жоп", "ебан", "ёбан", "хер"])
    }
}

impl ProfanityFilter for WordListFilter {
    fn contains_profanity(&self, text: &str) -> bool {
        let lowered = text.to_lowercase();
        lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .any(|word| self.stems.iter().any(|stem| word.starts_with(stem.as_str())))
    }
}

/// A city/district name: Cyrillic letters, spaces, and hyphens only.
/// Latin input is rejected on purpose; the audience is Russian-speaking.
pub fn is_valid_city(text: &str) -> bool {
    static CITY_RE: OnceLock<Regex> = OnceLock::new();
    let re = CITY_RE
        .get_or_init(|| Regex::new(r"^[А-Яа-яЁё\s-]+$").expect("valid city pattern"));
    let trimmed = text.trim();
    !trimmed.is_empty() && re.is_match(trimmed)
}

/// Recoverable per-field validation failure. The message is the retry
/// prompt sent back to the user; the session stays on the same field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    #[error("Пожалуйста, введите текстовое значение для этого поля.")]
    Empty,
    #[error("Без мата, пожалуйста 🙂\nПереформулируй {} без нецензурной лексики.", .0.title_accusative())]
    Profanity(FieldKey),
    #[error("В названии города разрешены только буквы, пробелы и тире.")]
    InvalidLocation,
    #[error("Описание слишком короткое!")]
    DescriptionTooShort,
    #[error("Описание слишком длинное! Максимум — {DESCRIPTION_MAX_CHARS} символов.")]
    DescriptionTooLong,
}

/// Validate one raw input for the given field and return the trimmed
/// value to store.
pub fn validate_field(
    field: FieldKey,
    raw: &str,
    profanity: &dyn ProfanityFilter,
) -> Result<String, FieldError> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(FieldError::Empty);
    }
    if profanity.contains_profanity(value) {
        return Err(FieldError::Profanity(field));
    }

    match field {
        FieldKey::Location => {
            if !is_valid_city(value) {
                return Err(FieldError::InvalidLocation);
            }
        }
        FieldKey::Description => {
            let chars = value.chars().count();
            if chars < DESCRIPTION_MIN_CHARS {
                return Err(FieldError::DescriptionTooShort);
            }
            if chars > DESCRIPTION_MAX_CHARS {
                return Err(FieldError::DescriptionTooLong);
            }
        }
        _ => {}
    }

    Ok(value.to_string())
}
