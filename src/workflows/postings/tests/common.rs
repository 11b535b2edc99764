use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use crate::workflows::postings::domain::{
    ChatId, MediaRef, MessageRef, Role, Submission, UserId,
};
use crate::workflows::postings::form::{FormSession, Transition};
use crate::workflows::postings::gateway::{Button, DeliveryError, MessengerGateway};
use crate::workflows::postings::quota::QuotaTracker;
use crate::workflows::postings::registry::{ChannelConfig, SubmissionRegistry};
use crate::workflows::postings::store::MemorySubmissionStore;
use crate::workflows::postings::validate::WordListFilter;

pub(super) const MODERATION_CHAT: ChatId = ChatId(-1001);
pub(super) const MAIN_CHANNEL: ChatId = ChatId(-1002);
pub(super) const AUTHOR: UserId = UserId(777);

pub(super) fn channels() -> ChannelConfig {
    ChannelConfig {
        moderation_chat: MODERATION_CHAT,
        main_channel: MAIN_CHANNEL,
        channel_username: "findex_jobs".to_string(),
    }
}

pub(super) fn filter() -> WordListFilter {
    WordListFilter::default()
}

#[derive(Debug, Clone)]
pub(super) struct SentMessage {
    pub(super) chat: ChatId,
    pub(super) text: String,
    pub(super) buttons: Vec<Button>,
    pub(super) media: Option<MediaRef>,
    pub(super) message: MessageRef,
}

#[derive(Debug, Clone)]
pub(super) struct EditEvent {
    pub(super) message: MessageRef,
    pub(super) text: String,
    pub(super) buttons: Vec<Button>,
}

/// Test double for the messaging transport. Records every send and edit;
/// failure modes are switchable per test.
pub(super) struct RecordingGateway {
    next_message_id: AtomicI64,
    send_budget: AtomicI64,
    fail_edits: AtomicBool,
    denied_chats: Mutex<HashSet<ChatId>>,
    sent: Mutex<Vec<SentMessage>>,
    edits: Mutex<Vec<EditEvent>>,
}

impl Default for RecordingGateway {
    fn default() -> Self {
        Self {
            next_message_id: AtomicI64::new(100),
            send_budget: AtomicI64::new(i64::MAX),
            fail_edits: AtomicBool::new(false),
            denied_chats: Mutex::new(HashSet::new()),
            sent: Mutex::new(Vec::new()),
            edits: Mutex::new(Vec::new()),
        }
    }
}

impl RecordingGateway {
    /// Every send to `chat` fails from now on.
    pub(super) fn deny_chat(&self, chat: ChatId) {
        self.denied_chats
            .lock()
            .expect("gateway mutex poisoned")
            .insert(chat);
    }

    /// Allow `n` more successful sends, then fail the rest.
    pub(super) fn set_send_budget(&self, n: i64) {
        self.send_budget.store(n, Ordering::SeqCst);
    }

    pub(super) fn fail_edits(&self) {
        self.fail_edits.store(true, Ordering::SeqCst);
    }

    pub(super) fn sent(&self) -> Vec<SentMessage> {
        self.sent.lock().expect("gateway mutex poisoned").clone()
    }

    pub(super) fn sent_to(&self, chat: ChatId) -> Vec<SentMessage> {
        self.sent()
            .into_iter()
            .filter(|m| m.chat == chat)
            .collect()
    }

    pub(super) fn edits(&self) -> Vec<EditEvent> {
        self.edits.lock().expect("gateway mutex poisoned").clone()
    }

    fn record_send(
        &self,
        chat: ChatId,
        text: &str,
        buttons: &[Button],
        media: Option<&MediaRef>,
    ) -> Result<MessageRef, DeliveryError> {
        if self
            .denied_chats
            .lock()
            .expect("gateway mutex poisoned")
            .contains(&chat)
        {
            return Err(DeliveryError::Transport(format!("chat {} denied", chat.0)));
        }
        if self.send_budget.fetch_sub(1, Ordering::SeqCst) <= 0 {
            return Err(DeliveryError::Transport("send budget exhausted".to_string()));
        }

        let message = MessageRef {
            chat,
            message_id: self.next_message_id.fetch_add(1, Ordering::SeqCst),
        };
        self.sent.lock().expect("gateway mutex poisoned").push(SentMessage {
            chat,
            text: text.to_string(),
            buttons: buttons.to_vec(),
            media: media.cloned(),
            message,
        });
        Ok(message)
    }

    fn record_edit(
        &self,
        message: &MessageRef,
        text: &str,
        buttons: &[Button],
    ) -> Result<(), DeliveryError> {
        if self.fail_edits.load(Ordering::SeqCst) {
            return Err(DeliveryError::Transport("message is gone".to_string()));
        }
        self.edits.lock().expect("gateway mutex poisoned").push(EditEvent {
            message: *message,
            text: text.to_string(),
            buttons: buttons.to_vec(),
        });
        Ok(())
    }
}

impl MessengerGateway for RecordingGateway {
    fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        buttons: &[Button],
    ) -> Result<MessageRef, DeliveryError> {
        self.record_send(chat, text, buttons, None)
    }

    fn send_media(
        &self,
        chat: ChatId,
        media: &MediaRef,
        caption: &str,
        buttons: &[Button],
    ) -> Result<MessageRef, DeliveryError> {
        self.record_send(chat, caption, buttons, Some(media))
    }

    fn edit_text(
        &self,
        message: &MessageRef,
        text: &str,
        buttons: &[Button],
    ) -> Result<(), DeliveryError> {
        self.record_edit(message, text, buttons)
    }

    fn edit_media_caption(
        &self,
        message: &MessageRef,
        caption: &str,
        buttons: &[Button],
    ) -> Result<(), DeliveryError> {
        self.record_edit(message, caption, buttons)
    }
}

pub(super) fn build_registry() -> (
    SubmissionRegistry<MemorySubmissionStore, RecordingGateway>,
    Arc<MemorySubmissionStore>,
    Arc<RecordingGateway>,
    Arc<QuotaTracker>,
) {
    build_registry_with_quota(QuotaTracker::new(HashSet::new()))
}

pub(super) fn build_registry_with_quota(
    quota: QuotaTracker,
) -> (
    SubmissionRegistry<MemorySubmissionStore, RecordingGateway>,
    Arc<MemorySubmissionStore>,
    Arc<RecordingGateway>,
    Arc<QuotaTracker>,
) {
    let store = Arc::new(MemorySubmissionStore::default());
    let gateway = Arc::new(RecordingGateway::default());
    let quota = Arc::new(quota);
    let registry =
        SubmissionRegistry::new(store.clone(), gateway.clone(), quota.clone(), channels());
    (registry, store, gateway, quota)
}

/// Drive a fresh employer session through the whole field sequence up to
/// the preview. Values match a plausible bartender vacancy.
pub(super) fn employer_session() -> FormSession {
    let (mut session, _) = FormSession::start(Role::Employer, AUTHOR, "@employer".to_string());
    let inputs = [
        "Бармен",
        "120000",
        "Москва",
        "@hr_contact",
        "Ищем бармена в дружную команду, опыт от года.",
    ];
    for input in inputs {
        let transition = session.submit_field_value(input, &filter());
        assert!(
            !matches!(transition, Transition::Retry { .. }),
            "fixture input '{input}' must validate"
        );
    }
    let _ = session.skip_media();
    session
}

pub(super) fn author_preview() -> MessageRef {
    MessageRef {
        chat: ChatId(AUTHOR.0),
        message_id: 555,
    }
}

/// Submit the standard employer draft and return the stored submission.
pub(super) fn submit_employer(
    registry: &SubmissionRegistry<MemorySubmissionStore, RecordingGateway>,
) -> Submission {
    let mut session = employer_session();
    registry
        .submit(&mut session, Some(author_preview()))
        .expect("submission accepted")
}
