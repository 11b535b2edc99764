use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{Local, NaiveDate, Utc};
use uuid::Uuid;

use super::domain::{
    ChatId, MessageRef, PostingDraft, PublishedPost, RejectReason, Submission, SubmissionId,
    SubmissionStatus, UserId,
};
use super::form::{FormSession, Transition};
use super::gateway::{Button, DeliveryError, MessengerGateway};
use super::payload::{fix_button, locked_placeholder, moderation_controls, FixTarget};
use super::quota::{QuotaTracker, Remaining};
use super::render::render;
use super::store::{StoreError, SubmissionStore};

/// Delivery destinations, injected at construction.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    pub moderation_chat: ChatId,
    pub main_channel: ChatId,
    /// Public username of the main channel, without the leading `@`.
    /// Empty when the channel is private; no shareable links then.
    pub channel_username: String,
}

impl ChannelConfig {
    fn public_url(&self, message_id: i64) -> Option<String> {
        if self.channel_username.is_empty() {
            return None;
        }
        Some(format!(
            "https://t.me/{}/{message_id}",
            self.channel_username
        ))
    }
}

/// Failure to create a submission. `QuotaExceeded` is an expected
/// branch, not an incident: the posting simply waits for tomorrow.
#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("⏳ Уже отправлено на модерацию")]
    AlreadyOnModeration,
    #[error("Лимит бесплатных публикаций на сегодня исчерпан (0/3). Попробуй завтра.")]
    QuotaExceeded,
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// Failure of a moderation decision or a resubmission lookup.
#[derive(Debug, thiserror::Error)]
pub enum DecisionError {
    #[error("Объявление не найдено")]
    NotFound,
    #[error("Решение уже принято: {}", .0.label())]
    AlreadyDecided(SubmissionStatus),
    #[error("Дневной лимит автора исчерпан; публикация не выполнена")]
    QuotaExceeded,
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The decision is recorded; only the follow-up notification failed.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

/// Outcome of a successful approval.
#[derive(Debug, Clone)]
pub struct PublishReceipt {
    pub submission: SubmissionId,
    pub post: PublishedPost,
    pub remaining: Remaining,
    /// Whether the author's locked preview was updated in place.
    pub author_notified: bool,
    /// Whether the moderation card got its published stamp.
    pub card_updated: bool,
}

/// Outcome of a successful rejection.
#[derive(Debug, Clone)]
pub struct RejectReceipt {
    pub submission: SubmissionId,
    pub reason: RejectReason,
    pub card_updated: bool,
}

/// Owner of the submission stores and the moderation decision protocol.
///
/// All state flows through the injected [`SubmissionStore`] and
/// [`QuotaTracker`]; handler code never touches the maps directly. Every
/// decision on a submission runs under that submission's exclusive lock,
/// held from the status guard check through the store write, so two
/// moderators racing on the same card resolve to exactly one transition.
pub struct SubmissionRegistry<S, G> {
    store: Arc<S>,
    gateway: Arc<G>,
    quota: Arc<QuotaTracker>,
    channels: ChannelConfig,
    decision_locks: Mutex<HashMap<SubmissionId, Arc<Mutex<()>>>>,
}

impl<S, G> SubmissionRegistry<S, G>
where
    S: SubmissionStore + 'static,
    G: MessengerGateway + 'static,
{
    pub fn new(
        store: Arc<S>,
        gateway: Arc<G>,
        quota: Arc<QuotaTracker>,
        channels: ChannelConfig,
    ) -> Self {
        Self {
            store,
            gateway,
            quota,
            channels,
            decision_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn quota(&self) -> &QuotaTracker {
        &self.quota
    }

    /// Send the session's draft to the moderation queue.
    ///
    /// `author_preview` is the author's own preview message, which gets
    /// rewritten into a locked placeholder so the draft can no longer be
    /// edited or re-sent. Quota is only checked here, never charged.
    pub fn submit(
        &self,
        session: &mut FormSession,
        author_preview: Option<MessageRef>,
    ) -> Result<Submission, SubmitError> {
        if session.is_on_moderation() {
            return Err(SubmitError::AlreadyOnModeration);
        }

        let author = session.author_id();
        if !self.quota.can_publish(author, today()) {
            return Err(SubmitError::QuotaExceeded);
        }

        let draft = session.draft().clone();
        let id = new_submission_id();
        let card = render(&draft, true);
        let moderation_msg = self.deliver(
            self.channels.moderation_chat,
            &draft,
            &card,
            &moderation_controls(&id),
        )?;

        let submission = Submission {
            id,
            draft,
            status: SubmissionStatus::Pending,
            moderation_msg: Some(moderation_msg),
            author_msg: author_preview,
            public_post: None,
            rejection: None,
            submitted_at: Utc::now(),
        };
        self.store.insert(submission.clone())?;
        session.lock_for_moderation();

        // Best effort: the queue entry must survive a failed lock edit.
        if let Some(message) = &submission.author_msg {
            let locked = format!(
                "{}\n\n⏳ Объявление отправлено на модерацию",
                render(&submission.draft, false)
            );
            self.edit_in_place(
                &submission,
                message,
                &locked,
                &[locked_placeholder()],
                "lock author preview",
            );
        }

        tracing::info!(
            submission = %submission.id,
            author = submission.draft.author_id.0,
            role = submission.draft.role.label(),
            "submission queued for moderation"
        );
        Ok(submission)
    }

    /// Publish a pending submission to the main channel.
    ///
    /// Ordering inside the decision lock: deliver the public post, flip
    /// the status, charge the quota (the single charge path), then
    /// best-effort updates of the author placeholder and the moderation
    /// card. A failed channel send leaves the submission Pending and
    /// charges nothing.
    pub fn approve(
        &self,
        id: &SubmissionId,
        moderator: &str,
    ) -> Result<PublishReceipt, DecisionError> {
        let gate = self.decision_gate(id);
        let _held = gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut submission = self.store.fetch(id)?.ok_or(DecisionError::NotFound)?;
        if submission.status != SubmissionStatus::Pending {
            return Err(DecisionError::AlreadyDecided(submission.status));
        }

        let author = submission.draft.author_id;
        let today = today();
        if !self.quota.can_publish(author, today) {
            return Err(DecisionError::QuotaExceeded);
        }

        let public_text = render(&submission.draft, false);
        let message = self.deliver(self.channels.main_channel, &submission.draft, &public_text, &[])?;
        let post = PublishedPost {
            url: self.channels.public_url(message.message_id),
            message,
        };

        submission.status = SubmissionStatus::Published;
        submission.public_post = Some(post.clone());
        self.store.update(submission.clone())?;

        let remaining = self.quota.record_publish(author, today);
        tracing::info!(
            submission = %submission.id,
            author = author.0,
            moderator,
            remaining = %remaining,
            "submission published"
        );

        let author_notified = self.notify_author_published(&submission, &public_text, &post, remaining);

        let stamp = match &post.url {
            Some(url) => format!("✅ Опубликовано!\nМодератор: {moderator}\nСсылка: {url}"),
            None => format!("✅ Опубликовано!\nМодератор: {moderator}"),
        };
        let card_updated = self.stamp_card(&submission, &stamp);

        Ok(PublishReceipt {
            submission: submission.id,
            post,
            remaining,
            author_notified,
            card_updated,
        })
    }

    /// Reject a pending submission with a template or custom reason.
    ///
    /// The status flip commits first; if the author notice then fails to
    /// send, the error surfaces to the moderator while the rejection
    /// stays recorded.
    pub fn reject(
        &self,
        id: &SubmissionId,
        reason: RejectReason,
        moderator: &str,
    ) -> Result<RejectReceipt, DecisionError> {
        let gate = self.decision_gate(id);
        let _held = gate.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        let mut submission = self.store.fetch(id)?.ok_or(DecisionError::NotFound)?;
        if submission.status != SubmissionStatus::Pending {
            return Err(DecisionError::AlreadyDecided(submission.status));
        }

        submission.status = SubmissionStatus::Rejected;
        submission.rejection = Some(reason.clone());
        self.store.update(submission.clone())?;

        tracing::info!(
            submission = %submission.id,
            author = submission.draft.author_id.0,
            moderator,
            reason = %reason.summary(),
            "submission rejected"
        );

        let card_updated =
            self.stamp_card(&submission, &format!("✖ Отклонено: причина — {}", reason.summary()));

        let target = reason
            .target_field()
            .map(FixTarget::Field)
            .unwrap_or(FixTarget::All);
        let notice = format!(
            "❌ Объявление отклонено модератором.\n\nПричина: {}\n\nНажми кнопку ниже, чтобы сразу исправить.",
            reason.summary()
        );
        let buttons = [fix_button(&submission.id, target)];
        if let Err(err) = self.gateway.send_text(
            submission.draft.author_id.into(),
            &notice,
            &buttons,
        ) {
            tracing::warn!(
                submission = %submission.id,
                error = %err,
                "rejection recorded but author notice failed"
            );
            return Err(DecisionError::Delivery(err));
        }

        Ok(RejectReceipt {
            submission: submission.id,
            reason,
            card_updated,
        })
    }

    /// Rehydrate a form session from a rejected submission so the author
    /// can fix one field and land straight back on the preview.
    pub fn resume_for_fix(
        &self,
        id: &SubmissionId,
        target: FixTarget,
        author: UserId,
    ) -> Result<(FormSession, Transition), DecisionError> {
        let submission = self.store.fetch(id)?.ok_or(DecisionError::NotFound)?;
        if submission.status != SubmissionStatus::Rejected
            || submission.draft.author_id != author
        {
            return Err(DecisionError::NotFound);
        }

        let field = match target {
            FixTarget::Field(field) => Some(field),
            FixTarget::All => None,
        };
        Ok(FormSession::resume_for_fix(submission.draft, field))
    }

    /// Current status of a submission, for transient status answers.
    pub fn status(&self, id: &SubmissionId) -> Result<Option<SubmissionStatus>, StoreError> {
        Ok(self.store.fetch(id)?.map(|s| s.status))
    }

    fn decision_gate(&self, id: &SubmissionId) -> Arc<Mutex<()>> {
        let mut locks = self
            .decision_locks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        locks.entry(id.clone()).or_default().clone()
    }

    fn deliver(
        &self,
        chat: ChatId,
        draft: &PostingDraft,
        text: &str,
        buttons: &[Button],
    ) -> Result<MessageRef, DeliveryError> {
        match &draft.media {
            Some(media) => self.gateway.send_media(chat, media, text, buttons),
            None => self.gateway.send_text(chat, text, buttons),
        }
    }

    /// Rewrite the author's locked preview with the publication status,
    /// link, and remaining quota. Best effort.
    fn notify_author_published(
        &self,
        submission: &Submission,
        public_text: &str,
        post: &PublishedPost,
        remaining: Remaining,
    ) -> bool {
        let Some(message) = &submission.author_msg else {
            return false;
        };

        let mut parts = vec!["✅ Опубликовано".to_string()];
        if let Some(url) = &post.url {
            parts.push(format!("🔗 Ссылка: {url}"));
        }
        parts.push(format!("📩 Бесплатные публикации сегодня: {remaining}"));
        parts.push("ℹ️ Чтобы создать новое объявление — нажми /start".to_string());

        let text = format!("{public_text}\n\n{}", parts.join("\n\n"));
        self.edit_in_place(submission, message, &text, &[], "author publish notice")
    }

    /// Append a decision stamp to the moderation card and drop its
    /// controls. Best effort: the card may be stale or deleted.
    fn stamp_card(&self, submission: &Submission, stamp: &str) -> bool {
        let Some(message) = &submission.moderation_msg else {
            return false;
        };
        let text = format!("{}\n\n{stamp}", render(&submission.draft, true));
        self.edit_in_place(submission, message, &text, &[], "moderation card stamp")
    }

    fn edit_in_place(
        &self,
        submission: &Submission,
        message: &MessageRef,
        text: &str,
        buttons: &[Button],
        context: &str,
    ) -> bool {
        let result = match &submission.draft.media {
            Some(_) => self.gateway.edit_media_caption(message, text, buttons),
            None => self.gateway.edit_text(message, text, buttons),
        };
        match result {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(
                    submission = %submission.id,
                    error = %err,
                    context,
                    "best-effort edit failed"
                );
                false
            }
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Random 12-hex token from a v4 UUID. Allocated once per submit; ids
/// are never reused across resubmissions.
fn new_submission_id() -> SubmissionId {
    let hex = Uuid::new_v4().simple().to_string();
    SubmissionId(hex[..12].to_string())
}
