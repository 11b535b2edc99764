use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use findex_hub::workflows::postings::{
    Button, ChannelConfig, ChatId, DecisionError, DeliveryError, FieldKey, FixTarget, FormSession,
    MediaRef, MemorySubmissionStore, MessageRef, MessengerGateway, QuotaTracker, RejectReason,
    Remaining, Role, SubmissionRegistry, SubmissionStatus, SubmitError, Transition, UserId,
    WordListFilter,
};

const MODERATION_CHAT: ChatId = ChatId(-1001);
const MAIN_CHANNEL: ChatId = ChatId(-1002);
const AUTHOR: UserId = UserId(4242);

/// Minimal chat simulation: every send lands in a per-chat transcript.
#[derive(Default)]
struct ChatSim {
    next_id: AtomicI64,
    messages: Mutex<Vec<(ChatId, String, Vec<Button>)>>,
}

impl ChatSim {
    fn transcript(&self, chat: ChatId) -> Vec<String> {
        self.messages
            .lock()
            .expect("sim mutex poisoned")
            .iter()
            .filter(|(c, _, _)| *c == chat)
            .map(|(_, text, _)| text.clone())
            .collect()
    }

    fn last_buttons(&self, chat: ChatId) -> Vec<Button> {
        self.messages
            .lock()
            .expect("sim mutex poisoned")
            .iter()
            .filter(|(c, _, _)| *c == chat)
            .last()
            .map(|(_, _, buttons)| buttons.clone())
            .unwrap_or_default()
    }

    fn push(&self, chat: ChatId, text: &str, buttons: &[Button]) -> MessageRef {
        let message_id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.messages
            .lock()
            .expect("sim mutex poisoned")
            .push((chat, text.to_string(), buttons.to_vec()));
        MessageRef { chat, message_id }
    }
}

impl MessengerGateway for ChatSim {
    fn send_text(
        &self,
        chat: ChatId,
        text: &str,
        buttons: &[Button],
    ) -> Result<MessageRef, DeliveryError> {
        Ok(self.push(chat, text, buttons))
    }

    fn send_media(
        &self,
        chat: ChatId,
        _media: &MediaRef,
        caption: &str,
        buttons: &[Button],
    ) -> Result<MessageRef, DeliveryError> {
        Ok(self.push(chat, caption, buttons))
    }

    fn edit_text(
        &self,
        message: &MessageRef,
        text: &str,
        buttons: &[Button],
    ) -> Result<(), DeliveryError> {
        self.push(message.chat, text, buttons);
        Ok(())
    }

    fn edit_media_caption(
        &self,
        message: &MessageRef,
        caption: &str,
        buttons: &[Button],
    ) -> Result<(), DeliveryError> {
        self.push(message.chat, caption, buttons);
        Ok(())
    }
}

fn build() -> (
    SubmissionRegistry<MemorySubmissionStore, ChatSim>,
    Arc<ChatSim>,
) {
    let sim = Arc::new(ChatSim::default());
    let registry = SubmissionRegistry::new(
        Arc::new(MemorySubmissionStore::default()),
        sim.clone(),
        Arc::new(QuotaTracker::new(HashSet::new())),
        ChannelConfig {
            moderation_chat: MODERATION_CHAT,
            main_channel: MAIN_CHANNEL,
            channel_username: "findex_jobs".to_string(),
        },
    );
    (registry, sim)
}

fn bartender_session() -> FormSession {
    let (mut session, _) = FormSession::start(Role::Employer, AUTHOR, "@bar_owner".to_string());
    for input in [
        "Бармен",
        "140000",
        "Москва",
        "@bar_owner",
        "Ищем бармена, вечерние смены, коктейльная карта.",
    ] {
        let transition = session.submit_field_value(input, &WordListFilter::default());
        assert!(
            !matches!(transition, Transition::Retry { .. }),
            "input '{input}' must validate"
        );
    }
    session.skip_media();
    session
}

#[test]
fn bartender_vacancy_travels_from_form_to_channel() {
    let (registry, sim) = build();

    let mut session = bartender_session();
    let submission = registry
        .submit(&mut session, None)
        .expect("submission accepted");

    // Moderation chat got the card with the author line and controls.
    let cards = sim.transcript(MODERATION_CHAT);
    assert_eq!(cards.len(), 1);
    assert!(cards[0].contains("Бармен"));
    assert!(cards[0].contains("Автор: @bar_owner"));
    let controls = sim.last_buttons(MODERATION_CHAT);
    assert_eq!(controls.len(), 2);

    // Locked draft refuses a second submit.
    assert!(matches!(
        registry.submit(&mut session, None),
        Err(SubmitError::AlreadyOnModeration)
    ));

    let receipt = registry
        .approve(&submission.id, "@chief_mod")
        .expect("approval succeeds");
    assert_eq!(receipt.remaining, Remaining::Limited(2));

    // Channel post: same content minus the author line, no buttons.
    let posts = sim.transcript(MAIN_CHANNEL);
    assert_eq!(posts.len(), 1);
    assert!(posts[0].contains("Бармен"));
    assert!(posts[0].contains("Москва"));
    assert!(posts[0].contains("#вакансия"));
    assert!(!posts[0].contains("Автор"));

    assert!(receipt
        .post
        .url
        .as_deref()
        .expect("public channel has links")
        .starts_with("https://t.me/findex_jobs/"));

    // A second press on a stale card is a no-op error, not a repost.
    assert!(matches!(
        registry.approve(&submission.id, "@chief_mod"),
        Err(DecisionError::AlreadyDecided(SubmissionStatus::Published))
    ));
    assert_eq!(sim.transcript(MAIN_CHANNEL).len(), 1);
}

#[test]
fn rejected_posting_is_fixed_and_resubmitted() {
    let (registry, sim) = build();

    let mut session = bartender_session();
    let submission = registry
        .submit(&mut session, None)
        .expect("submission accepted");

    registry
        .reject(
            &submission.id,
            RejectReason::Field(FieldKey::Location),
            "@chief_mod",
        )
        .expect("rejection succeeds");

    // The author hears about it in their private chat.
    let author_chat = ChatId(AUTHOR.0);
    let notices = sim.transcript(author_chat);
    assert!(notices
        .iter()
        .any(|text| text.contains("Локация некорректная")));
    let fix = sim.last_buttons(author_chat);
    assert_eq!(fix[0].payload, format!("fix_rej:{}:location", submission.id));

    // One-tap fix: new value, straight back to the preview.
    let (mut session, transition) = registry
        .resume_for_fix(
            &submission.id,
            FixTarget::Field(FieldKey::Location),
            AUTHOR,
        )
        .expect("author may fix");
    assert!(matches!(
        transition,
        Transition::Prompt {
            field: FieldKey::Location,
            ..
        }
    ));
    assert_eq!(
        session.submit_field_value("Зеленоград", &WordListFilter::default()),
        Transition::Preview
    );

    let resubmitted = registry
        .submit(&mut session, None)
        .expect("resubmission accepted");
    assert_ne!(resubmitted.id, submission.id);

    let receipt = registry
        .approve(&resubmitted.id, "@chief_mod")
        .expect("approval succeeds");
    // The failed first round did not burn quota.
    assert_eq!(receipt.remaining, Remaining::Limited(2));

    let posts = sim.transcript(MAIN_CHANNEL);
    assert_eq!(posts.len(), 1);
    assert!(posts[0].contains("Зеленоград"));
}

#[test]
fn daily_allowance_runs_out_after_three_publications() {
    let (registry, _) = build();

    for _ in 0..3 {
        let mut session = bartender_session();
        let submission = registry
            .submit(&mut session, None)
            .expect("submission accepted");
        registry
            .approve(&submission.id, "@chief_mod")
            .expect("approval succeeds");
    }

    let mut session = bartender_session();
    assert!(matches!(
        registry.submit(&mut session, None),
        Err(SubmitError::QuotaExceeded)
    ));
}
