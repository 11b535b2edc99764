use std::fmt::Write as _;

use super::domain::{FieldKey, PostingDraft, Role};

/// Render a posting into the channel/card text. Deterministic for a given
/// draft, so in-place message edits can recompute and rewrite the same
/// text. The author line is appended only for the moderation card; the
/// public channel never sees it.
pub fn render(draft: &PostingDraft, include_author: bool) -> String {
    let mut text = String::new();
    writeln!(text, "🧑‍💼 {}:", draft.role.label()).expect("write heading");

    for &field in draft.role.field_sequence() {
        let value = draft.field(field);
        if value.is_empty() {
            continue;
        }
        let label = section_label(draft.role, field);
        text.push('\n');
        write!(text, "{label}: {value}").expect("write section");
    }

    if include_author && !draft.author_display.is_empty() {
        text.push_str("\n\n");
        write!(text, "Автор: {}", draft.author_display).expect("write author");
    }

    let tags = hashtags(draft);
    if !tags.is_empty() {
        text.push_str("\n\n");
        text.push_str(&tags);
    }

    text
}

/// Seekers describe themselves, so the description section reads
/// "О себе" instead of the vacancy wording.
fn section_label(role: Role, field: FieldKey) -> &'static str {
    match (role, field) {
        (Role::Seeker, FieldKey::Description) => "📝 О себе",
        _ => field.label(),
    }
}

/// Role marker plus sanitized position and location tags.
pub fn hashtags(draft: &PostingDraft) -> String {
    let mut tags = vec![draft.role.marker_tag().to_string()];
    for value in [&draft.position, &draft.location] {
        let sanitized = sanitize_tag(value);
        if !sanitized.is_empty() {
            tags.push(format!("#{sanitized}"));
        }
    }
    tags.join(" ")
}

/// Keep only characters valid inside a hashtag: ASCII alphanumerics and
/// Cyrillic letters. Spaces and punctuation collapse away.
fn sanitize_tag(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || is_cyrillic(*c))
        .collect()
}

fn is_cyrillic(c: char) -> bool {
    ('А'..='я').contains(&c) || c == 'ё' || c == 'Ё'
}
