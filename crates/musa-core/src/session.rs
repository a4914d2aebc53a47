//! A single assistant conversation
//!
//! `ChatSession` is the only writer of the conversation context. Each user
//! turn runs to completion (extract, format, send, merge the reply) before
//! the next one can start; every mutating method takes `&mut self`, so a
//! second request cannot be issued while one is in flight.
//!
//! Nothing here fails loudly. Transport and decoding problems become an
//! assistant turn explaining the connection trouble, and the user can try
//! again by sending another message or asking for a reconnect.

use tracing::{debug, info, warn};

use crate::api::{AssistantBackend, ChatRequest};
use crate::context::{ContextField, ConversationContext};
use crate::format::{format_message, CalendarStamp, OutboundMessage};
use crate::language::ChatLanguage;
use crate::state::{ChatTurn, ConnectionStatus};

pub const WELCOME_MESSAGE: &str =
    "Hello! I'm your banana farming assistant. How can I help you?";
pub const CONNECTION_TROUBLE_MESSAGE: &str =
    "I'm having trouble connecting to the server. Please check your network connection and try again.";
pub const BACK_ONLINE_MESSAGE: &str = "I'm back online! How can I help you?";
pub const STILL_OFFLINE_MESSAGE: &str =
    "I'm still having trouble connecting to the server. Please check your network connection.";

pub struct ChatSession<B: AssistantBackend> {
    backend: B,
    context: ConversationContext,
    turns: Vec<ChatTurn>,
    language: ChatLanguage,
    supported_languages: Vec<ChatLanguage>,
    status: ConnectionStatus,
}

impl<B: AssistantBackend> ChatSession<B> {
    pub fn new(backend: B, language: ChatLanguage) -> Self {
        Self {
            backend,
            context: ConversationContext::new(),
            turns: vec![ChatTurn::assistant(WELCOME_MESSAGE, None)],
            language,
            supported_languages: ChatLanguage::all(),
            status: ConnectionStatus::Unknown,
        }
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn language(&self) -> ChatLanguage {
        self.language
    }

    pub fn supported_languages(&self) -> &[ChatLanguage] {
        &self.supported_languages
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status
    }

    /// Initial probe when the conversation opens
    pub async fn connect(&mut self) -> ConnectionStatus {
        match self.backend.ping().await {
            Ok(()) => {
                self.set_status(ConnectionStatus::Connected);
                self.refresh_languages().await;
            }
            Err(err) => {
                warn!(error = %err, "assistant API unreachable");
                self.set_status(ConnectionStatus::Disconnected);
                self.push_assistant(CONNECTION_TROUBLE_MESSAGE);
            }
        }
        self.status
    }

    /// Re-run the connectivity probe and report the outcome in the chat
    pub async fn retry_connection(&mut self) -> ConnectionStatus {
        match self.backend.ping().await {
            Ok(()) => {
                self.set_status(ConnectionStatus::Connected);
                self.push_assistant(BACK_ONLINE_MESSAGE);
            }
            Err(err) => {
                warn!(error = %err, "retry connection failed");
                self.set_status(ConnectionStatus::Disconnected);
                self.push_assistant(STILL_OFFLINE_MESSAGE);
            }
        }
        self.status
    }

    async fn refresh_languages(&mut self) {
        match self.backend.supported_languages().await {
            Ok(names) => {
                let languages: Vec<ChatLanguage> = names
                    .iter()
                    .filter_map(|name| {
                        let language = ChatLanguage::from_str(name);
                        if language.is_none() {
                            debug!(language = %name, "ignoring unknown language");
                        }
                        language
                    })
                    .collect();
                if !languages.is_empty() {
                    self.supported_languages = languages;
                }
                if let Some(&fallback) = self
                    .supported_languages
                    .first()
                    .filter(|_| !self.supported_languages.contains(&self.language))
                {
                    info!(from = ?self.language, to = ?fallback, "selected language not offered by server");
                    self.language = fallback;
                }
            }
            Err(err) => warn!(error = %err, "could not fetch supported languages"),
        }
    }

    /// Handle one user message using today's date for price questions
    pub async fn submit_user_message(&mut self, raw: &str) -> Option<&ChatTurn> {
        self.submit_user_message_at(raw, CalendarStamp::today()).await
    }

    /// Same as [`submit_user_message`](Self::submit_user_message) with an explicit date
    pub async fn submit_user_message_at(
        &mut self,
        raw: &str,
        stamp: CalendarStamp,
    ) -> Option<&ChatTurn> {
        if raw.trim().is_empty() {
            return None;
        }

        self.turns.push(ChatTurn::user(raw));

        let resolved = self.context.extract_and_merge(raw);
        let outbound = format_message(raw, &resolved, stamp);
        debug!(enrichment = outbound.enrichment.as_str(), "formatted outbound message");

        self.send(outbound).await;
        self.turns.last()
    }

    async fn send(&mut self, outbound: OutboundMessage) {
        let request = ChatRequest {
            message: outbound.text,
            language: self.language.as_str().to_string(),
        };

        match self.backend.send_chat(&request).await {
            Ok(response) => {
                self.set_status(ConnectionStatus::Connected);
                if let Some(data) = &response.data {
                    self.context.apply_response(data);
                }
                self.turns
                    .push(ChatTurn::assistant(response.text, response.data));
            }
            Err(err) => {
                warn!(error = %err, network = err.is_network(), "chat request failed");
                self.set_status(ConnectionStatus::Disconnected);
                self.push_assistant(CONNECTION_TROUBLE_MESSAGE);
            }
        }
    }

    /// Switch the answer language; only languages the server supports are accepted
    pub fn set_language(&mut self, language: ChatLanguage) -> bool {
        if self.supported_languages.contains(&language) {
            self.language = language;
            true
        } else {
            false
        }
    }

    pub fn clear_context(&mut self, field: ContextField) {
        self.context.clear(field);
    }

    pub fn clear_all_context(&mut self) {
        self.context.clear_all();
    }

    fn push_assistant(&mut self, text: &str) {
        self.turns.push(ChatTurn::assistant(text, None));
    }

    fn set_status(&mut self, status: ConnectionStatus) {
        if self.status != status {
            info!(from = ?self.status, to = ?status, "assistant connectivity changed");
        }
        self.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ChatResponse, ResponseData};
    use crate::error::{ApiError, Result};
    use crate::state::ChatRole;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeBackend {
        replies: Mutex<VecDeque<Result<ChatResponse>>>,
        pings: Mutex<VecDeque<Result<()>>>,
        languages: Option<Vec<String>>,
        seen: Mutex<Vec<ChatRequest>>,
    }

    impl FakeBackend {
        fn replying(replies: Vec<Result<ChatResponse>>) -> Self {
            Self {
                replies: Mutex::new(replies.into()),
                ..Default::default()
            }
        }

        fn seen_messages(&self) -> Vec<String> {
            self.seen
                .lock()
                .unwrap()
                .iter()
                .map(|r| r.message.clone())
                .collect()
        }
    }

    #[async_trait]
    impl AssistantBackend for FakeBackend {
        async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
            self.seen.lock().unwrap().push(request.clone());
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Decode("no reply queued".to_string())))
        }

        async fn ping(&self) -> Result<()> {
            self.pings.lock().unwrap().pop_front().unwrap_or(Ok(()))
        }

        async fn supported_languages(&self) -> Result<Vec<String>> {
            self.languages
                .clone()
                .ok_or_else(|| ApiError::Decode("no languages".to_string()))
        }
    }

    fn reply(text: &str) -> Result<ChatResponse> {
        Ok(ChatResponse {
            text: text.to_string(),
            data: None,
        })
    }

    fn stamp() -> CalendarStamp {
        CalendarStamp::from_date(NaiveDate::from_ymd_opt(2026, 10, 15).unwrap())
    }

    #[tokio::test]
    async fn test_starts_with_welcome() {
        let session = ChatSession::new(FakeBackend::default(), ChatLanguage::English);
        assert_eq!(session.turns().len(), 1);
        assert_eq!(session.turns()[0].text, WELCOME_MESSAGE);
        assert_eq!(session.status(), ConnectionStatus::Unknown);
    }

    #[tokio::test]
    async fn test_blank_message_is_ignored() {
        let mut session = ChatSession::new(FakeBackend::default(), ChatLanguage::English);
        assert!(session.submit_user_message_at("   ", stamp()).await.is_none());
        assert_eq!(session.turns().len(), 1);
        assert!(session.backend.seen_messages().is_empty());
    }

    #[tokio::test]
    async fn test_two_turn_price_scenario() {
        let backend = FakeBackend::replying(vec![reply("Noted."), reply("About 180 LKR/kg")]);
        let mut session = ChatSession::new(backend, ChatLanguage::Sinhala);

        session
            .submit_user_message_at("I farm in location Matara with 30 kg", stamp())
            .await;
        let last = session
            .submit_user_message_at("price check", stamp())
            .await
            .unwrap();
        assert_eq!(last.role, ChatRole::Assistant);
        assert_eq!(last.text, "About 180 LKR/kg");

        let seen = session.backend.seen_messages();
        assert_eq!(seen[0], "I farm in location Matara with 30 kg");
        assert!(seen[1].starts_with("price check. I need a price prediction"));
        assert!(seen[1].contains("location=Matara with,"));
        assert!(seen[1].contains("quantity=30,"));

        let languages: Vec<String> = session
            .backend
            .seen
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.language.clone())
            .collect();
        assert_eq!(languages, vec!["sinhala", "sinhala"]);
    }

    #[tokio::test]
    async fn test_generic_enrichment_uses_context() {
        let backend = FakeBackend::replying(vec![reply("ok"), reply("ok")]);
        let mut session = ChatSession::new(backend, ChatLanguage::English);

        session.submit_user_message_at("I have 20 kg", stamp()).await;
        session.submit_user_message_at("any tips?", stamp()).await;

        let seen = session.backend.seen_messages();
        assert_eq!(seen[0], "I have 20 kg. Context: I have 20 kg");
        assert_eq!(seen[1], "any tips?. Context: I have 20 kg");
    }

    #[tokio::test]
    async fn test_response_data_updates_context() {
        let backend = FakeBackend::replying(vec![Ok(ChatResponse {
            text: "Galle prices are up".to_string(),
            data: Some(ResponseData {
                location: Some("Galle".to_string()),
                banana_type: Some("kolikuttu".to_string()),
                quantity: Some(40),
                price: Some(210.0),
                currency: Some("LKR".to_string()),
                ..Default::default()
            }),
        })]);
        let mut session = ChatSession::new(backend, ChatLanguage::English);

        let turn = session
            .submit_user_message_at("my location is Kandy", stamp())
            .await
            .unwrap();
        assert_eq!(turn.data.as_ref().unwrap().price, Some(210.0));

        let context = session.context();
        assert_eq!(context.location.as_deref(), Some("Galle"));
        assert_eq!(context.crop_variety.as_deref(), Some("kolikuttu"));
        assert_eq!(context.quantity, Some(40));
        assert_eq!(session.status(), ConnectionStatus::Connected);
    }

    #[tokio::test]
    async fn test_failure_keeps_user_turn_and_context() {
        let backend = FakeBackend::replying(vec![Err(ApiError::Decode("bad body".to_string()))]);
        let mut session = ChatSession::new(backend, ChatLanguage::English);

        let turn = session
            .submit_user_message_at("type is ambul", stamp())
            .await
            .unwrap();
        assert_eq!(turn.text, CONNECTION_TROUBLE_MESSAGE);

        let turns = session.turns();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[1].role, ChatRole::User);
        assert_eq!(turns[1].text, "type is ambul");
        assert_eq!(session.status(), ConnectionStatus::Disconnected);
        assert_eq!(session.context().crop_variety.as_deref(), Some("ambul"));
    }

    #[tokio::test]
    async fn test_send_after_failure_recovers() {
        let backend = FakeBackend::replying(vec![
            Err(ApiError::Decode("bad body".to_string())),
            reply("hello again"),
        ]);
        let mut session = ChatSession::new(backend, ChatLanguage::English);

        session.submit_user_message_at("hi", stamp()).await;
        assert_eq!(session.status(), ConnectionStatus::Disconnected);

        let turn = session.submit_user_message_at("hi", stamp()).await.unwrap();
        assert_eq!(turn.text, "hello again");
        assert_eq!(session.status(), ConnectionStatus::Connected);
    }

    #[tokio::test]
    async fn test_connect_fetches_languages() {
        let backend = FakeBackend {
            languages: Some(vec!["Sinhala".to_string(), "tamil".to_string()]),
            ..Default::default()
        };
        let mut session = ChatSession::new(backend, ChatLanguage::English);

        assert_eq!(session.connect().await, ConnectionStatus::Connected);
        assert_eq!(session.supported_languages(), &[ChatLanguage::Sinhala]);
        assert_eq!(session.turns().len(), 1);
        assert!(!session.set_language(ChatLanguage::English));
        assert!(session.set_language(ChatLanguage::Sinhala));
        assert_eq!(session.language(), ChatLanguage::Sinhala);
    }

    #[tokio::test]
    async fn test_connect_falls_back_when_language_not_offered() {
        let backend = FakeBackend {
            languages: Some(vec!["english".to_string()]),
            ..Default::default()
        };
        let mut session = ChatSession::new(backend, ChatLanguage::Sinhala);

        session.connect().await;
        assert_eq!(session.supported_languages(), &[ChatLanguage::English]);
        assert_eq!(session.language(), ChatLanguage::English);
    }

    #[tokio::test]
    async fn test_connect_keeps_default_languages_when_listing_fails() {
        let mut session = ChatSession::new(FakeBackend::default(), ChatLanguage::English);
        session.connect().await;
        assert_eq!(session.supported_languages(), ChatLanguage::all().as_slice());
    }

    #[tokio::test]
    async fn test_connect_failure_and_retry() {
        let backend = FakeBackend {
            pings: Mutex::new(
                vec![
                    Err(ApiError::Decode("down".to_string())),
                    Err(ApiError::Decode("down".to_string())),
                    Ok(()),
                ]
                .into(),
            ),
            ..Default::default()
        };
        let mut session = ChatSession::new(backend, ChatLanguage::English);

        assert_eq!(session.connect().await, ConnectionStatus::Disconnected);
        assert_eq!(session.turns().last().unwrap().text, CONNECTION_TROUBLE_MESSAGE);

        assert_eq!(session.retry_connection().await, ConnectionStatus::Disconnected);
        assert_eq!(session.turns().last().unwrap().text, STILL_OFFLINE_MESSAGE);

        assert_eq!(session.retry_connection().await, ConnectionStatus::Connected);
        assert_eq!(session.turns().last().unwrap().text, BACK_ONLINE_MESSAGE);
    }

    #[tokio::test]
    async fn test_clear_context() {
        let backend = FakeBackend::replying(vec![reply("ok")]);
        let mut session = ChatSession::new(backend, ChatLanguage::English);
        session
            .submit_user_message_at("location is Kandy, 10 kg", stamp())
            .await;

        session.clear_context(ContextField::Location);
        assert_eq!(session.context().location, None);
        assert_eq!(session.context().quantity, Some(10));

        session.clear_all_context();
        assert!(session.context().is_empty());
    }
}
