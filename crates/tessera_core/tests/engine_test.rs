//! Lifecycle engine tests against a mock gateway.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tessera_core::{
    ChannelId, ChannelRecord, GuildId, LifecycleEngine, MessageId, NewTicketChannel,
    TicketEntryPoint, TicketEntryPointBuilder, TicketGateway, TranscriptMessage, UserId,
};
use tessera_error::{TicketError, TicketErrorKind, TicketResult};

const GUILD: GuildId = GuildId(100);

/// In-memory gateway tracking channels, history, and direct messages.
#[derive(Default)]
struct MockGateway {
    state: Mutex<MockState>,
}

#[derive(Default)]
struct MockState {
    next_id: u64,
    categories: HashMap<String, ChannelId>,
    channels: HashMap<ChannelId, (ChannelId, ChannelRecord)>,
    history: HashMap<ChannelId, Vec<TranscriptMessage>>,
    direct_messages: HashMap<UserId, Vec<String>>,
    deleted: Vec<ChannelId>,
    staff: Vec<UserId>,
    fail_direct_messages: bool,
}

impl MockGateway {
    fn new() -> Self {
        Self::default()
    }

    fn with_staff(self, user: UserId) -> Self {
        self.state.lock().unwrap().staff.push(user);
        self
    }

    fn with_direct_message_failure(self) -> Self {
        self.state.lock().unwrap().fail_direct_messages = true;
        self
    }

    fn seed_history(&self, channel: ChannelId, messages: Vec<TranscriptMessage>) {
        self.state.lock().unwrap().history.insert(channel, messages);
    }

    fn deleted(&self) -> Vec<ChannelId> {
        self.state.lock().unwrap().deleted.clone()
    }

    fn direct_messages(&self, user: UserId) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .direct_messages
            .get(&user)
            .cloned()
            .unwrap_or_default()
    }

    fn channel_count(&self) -> usize {
        self.state.lock().unwrap().channels.len()
    }
}

#[async_trait]
impl TicketGateway for MockGateway {
    async fn ensure_category(&self, _guild: GuildId, name: &str) -> TicketResult<ChannelId> {
        let mut state = self.state.lock().unwrap();
        if let Some(id) = state.categories.get(name) {
            return Ok(*id);
        }
        state.next_id += 1;
        let id = ChannelId(state.next_id);
        state.categories.insert(name.to_string(), id);
        Ok(id)
    }

    async fn category_channels(
        &self,
        _guild: GuildId,
        category: ChannelId,
    ) -> TicketResult<Vec<ChannelRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .channels
            .values()
            .filter(|(parent, _)| *parent == category)
            .map(|(_, record)| record.clone())
            .collect())
    }

    async fn channel_record(
        &self,
        _guild: GuildId,
        channel: ChannelId,
    ) -> TicketResult<Option<ChannelRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state.channels.get(&channel).map(|(_, record)| record.clone()))
    }

    async fn create_ticket_channel(
        &self,
        request: &NewTicketChannel,
    ) -> TicketResult<ChannelRecord> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = ChannelId(state.next_id);
        let record = ChannelRecord::new(id, request.name().clone(), Some(*request.owner()));
        state
            .channels
            .insert(id, (*request.category(), record.clone()));
        Ok(record)
    }

    async fn delete_channel(&self, channel: ChannelId) -> TicketResult<()> {
        let mut state = self.state.lock().unwrap();
        state.channels.remove(&channel);
        state.deleted.push(channel);
        Ok(())
    }

    async fn send_welcome(
        &self,
        _channel: ChannelId,
        _creator_name: &str,
    ) -> TicketResult<MessageId> {
        Ok(MessageId(1))
    }

    async fn channel_history(
        &self,
        channel: ChannelId,
        limit: usize,
    ) -> TicketResult<Vec<TranscriptMessage>> {
        let state = self.state.lock().unwrap();
        let mut history = state.history.get(&channel).cloned().unwrap_or_default();
        history.truncate(limit);
        Ok(history)
    }

    async fn direct_message(&self, user: UserId, text: &str) -> TicketResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.fail_direct_messages {
            return Err(TicketError::new(TicketErrorKind::TranscriptDeliveryFailed(
                "recipient unreachable".to_string(),
            )));
        }
        state
            .direct_messages
            .entry(user)
            .or_default()
            .push(text.to_string());
        Ok(())
    }

    async fn has_staff_permission(&self, _guild: GuildId, user: UserId) -> TicketResult<bool> {
        Ok(self.state.lock().unwrap().staff.contains(&user))
    }
}

fn entry_point() -> TicketEntryPoint {
    TicketEntryPointBuilder::default()
        .guild_id(GUILD)
        .title("Support".to_string())
        .text("Need help? Open a ticket.".to_string())
        .button_name("Open Ticket".to_string())
        .category("Support".to_string())
        .build()
        .expect("valid entry point")
}

fn engine_with(gateway: MockGateway) -> (LifecycleEngine, Arc<MockGateway>) {
    let gateway = Arc::new(gateway);
    (LifecycleEngine::new(gateway.clone()), gateway)
}

#[tokio::test]
async fn test_open_ticket_creates_private_channel() {
    let (engine, gateway) = engine_with(MockGateway::new());

    let opened = engine
        .open_ticket(&entry_point(), UserId(7), "alice")
        .await
        .expect("ticket opens");

    assert_eq!(opened.name(), "ticket-alice");
    assert_eq!(gateway.channel_count(), 1);
}

#[tokio::test]
async fn test_second_open_is_duplicate() {
    let (engine, gateway) = engine_with(MockGateway::new());
    let entry = entry_point();

    engine
        .open_ticket(&entry, UserId(7), "alice")
        .await
        .expect("first ticket opens");

    let err = engine
        .open_ticket(&entry, UserId(7), "alice")
        .await
        .expect_err("second attempt rejected");
    assert!(matches!(err.kind(), TicketErrorKind::DuplicateTicket(_)));
    assert_eq!(gateway.channel_count(), 1);
}

#[tokio::test]
async fn test_distinct_creators_get_distinct_tickets() {
    let (engine, gateway) = engine_with(MockGateway::new());
    let entry = entry_point();

    engine.open_ticket(&entry, UserId(7), "alice").await.unwrap();
    engine.open_ticket(&entry, UserId(8), "bob").await.unwrap();

    assert_eq!(gateway.channel_count(), 2);
}

#[tokio::test]
async fn test_request_close_rejects_stranger() {
    let (engine, _gateway) = engine_with(MockGateway::new());
    let opened = engine
        .open_ticket(&entry_point(), UserId(7), "alice")
        .await
        .unwrap();

    let err = engine
        .request_close(GUILD, *opened.channel(), UserId(99))
        .await
        .expect_err("stranger rejected");
    assert!(matches!(err.kind(), TicketErrorKind::Unauthorized));
}

#[tokio::test]
async fn test_request_close_accepts_owner_and_staff() {
    let (engine, _gateway) = engine_with(MockGateway::new().with_staff(UserId(50)));
    let opened = engine
        .open_ticket(&entry_point(), UserId(7), "alice")
        .await
        .unwrap();

    assert!(engine
        .request_close(GUILD, *opened.channel(), UserId(7))
        .await
        .is_ok());
    assert!(engine
        .request_close(GUILD, *opened.channel(), UserId(50))
        .await
        .is_ok());
}

#[tokio::test]
async fn test_close_outside_ticket_channel() {
    let (engine, _gateway) = engine_with(MockGateway::new());

    let err = engine
        .request_close(GUILD, ChannelId(4242), UserId(7))
        .await
        .expect_err("not a ticket channel");
    assert!(matches!(err.kind(), TicketErrorKind::NotATicketChannel));
}

#[tokio::test]
async fn test_cancel_keeps_channel_open() {
    let (engine, gateway) = engine_with(MockGateway::new());
    let opened = engine
        .open_ticket(&entry_point(), UserId(7), "alice")
        .await
        .unwrap();

    engine
        .request_close(GUILD, *opened.channel(), UserId(7))
        .await
        .unwrap();
    engine.cancel_close(*opened.channel()).expect("cancel succeeds");

    assert!(gateway.deleted().is_empty());
    assert_eq!(gateway.channel_count(), 1);

    // The prompt is gone; confirm is now inert.
    let err = engine
        .confirm_close(GUILD, *opened.channel())
        .await
        .expect_err("no prompt left");
    assert!(matches!(err.kind(), TicketErrorKind::PromptExpired));
}

#[tokio::test]
async fn test_confirm_delivers_transcript_and_deletes() {
    let (engine, gateway) = engine_with(MockGateway::new());
    let opened = engine
        .open_ticket(&entry_point(), UserId(7), "alice")
        .await
        .unwrap();
    gateway.seed_history(
        *opened.channel(),
        vec![
            TranscriptMessage::new("alice", "my thing is broken"),
            TranscriptMessage::new("staff", "on it"),
        ],
    );

    engine
        .request_close(GUILD, *opened.channel(), UserId(7))
        .await
        .unwrap();
    let closed = engine
        .confirm_close(GUILD, *opened.channel())
        .await
        .expect("confirm closes");

    assert!(closed.transcript_delivered());
    assert_eq!(gateway.deleted(), vec![*opened.channel()]);

    let dms = gateway.direct_messages(UserId(7));
    assert_eq!(dms.len(), 1);
    assert_eq!(
        dms[0],
        "**Ticket Transcript**\n```alice: my thing is broken\nstaff: on it```"
    );
}

#[tokio::test]
async fn test_confirm_deletes_even_when_delivery_fails() {
    let (engine, gateway) = engine_with(MockGateway::new().with_direct_message_failure());
    let opened = engine
        .open_ticket(&entry_point(), UserId(7), "alice")
        .await
        .unwrap();

    engine
        .request_close(GUILD, *opened.channel(), UserId(7))
        .await
        .unwrap();
    let closed = engine
        .confirm_close(GUILD, *opened.channel())
        .await
        .expect("teardown proceeds");

    assert!(!closed.transcript_delivered());
    assert_eq!(gateway.deleted(), vec![*opened.channel()]);
}

#[tokio::test]
async fn test_confirm_without_prompt_is_inert() {
    let (engine, gateway) = engine_with(MockGateway::new());
    let opened = engine
        .open_ticket(&entry_point(), UserId(7), "alice")
        .await
        .unwrap();

    let err = engine
        .confirm_close(GUILD, *opened.channel())
        .await
        .expect_err("no prompt pending");
    assert!(matches!(err.kind(), TicketErrorKind::PromptExpired));
    assert!(gateway.deleted().is_empty());
}

#[tokio::test]
async fn test_close_now_authorizes_then_deletes() {
    let (engine, gateway) = engine_with(MockGateway::new());
    let opened = engine
        .open_ticket(&entry_point(), UserId(7), "alice")
        .await
        .unwrap();
    gateway.seed_history(
        *opened.channel(),
        vec![TranscriptMessage::new("alice", "never mind, fixed it")],
    );

    let err = engine
        .close_now(GUILD, *opened.channel(), UserId(99))
        .await
        .expect_err("stranger rejected");
    assert!(matches!(err.kind(), TicketErrorKind::Unauthorized));
    assert!(gateway.deleted().is_empty());

    let closed = engine
        .close_now(GUILD, *opened.channel(), UserId(7))
        .await
        .expect("owner closes");
    assert!(closed.transcript_delivered());
    assert_eq!(gateway.deleted(), vec![*opened.channel()]);
    assert_eq!(gateway.direct_messages(UserId(7)).len(), 1);
}

#[tokio::test]
async fn test_empty_transcript_still_delivers_wrapper() {
    let (engine, gateway) = engine_with(MockGateway::new());
    let opened = engine
        .open_ticket(&entry_point(), UserId(7), "alice")
        .await
        .unwrap();

    engine
        .request_close(GUILD, *opened.channel(), UserId(7))
        .await
        .unwrap();
    engine
        .confirm_close(GUILD, *opened.channel())
        .await
        .expect("confirm closes");

    let dms = gateway.direct_messages(UserId(7));
    assert_eq!(dms, vec!["**Ticket Transcript**\n``````".to_string()]);
}

#[tokio::test]
async fn test_long_transcript_is_chunked() {
    let (engine, gateway) = engine_with(MockGateway::new());
    let opened = engine
        .open_ticket(&entry_point(), UserId(7), "alice")
        .await
        .unwrap();
    // "a: " plus 2000 x's renders to 2003 characters, so two chunks.
    gateway.seed_history(
        *opened.channel(),
        vec![TranscriptMessage::new("a", "x".repeat(2000))],
    );

    engine
        .request_close(GUILD, *opened.channel(), UserId(7))
        .await
        .unwrap();
    engine
        .confirm_close(GUILD, *opened.channel())
        .await
        .expect("confirm closes");

    let dms = gateway.direct_messages(UserId(7));
    assert_eq!(dms.len(), 2);
    assert!(dms.iter().all(|m| m.starts_with("**Ticket Transcript**\n```")));
}
