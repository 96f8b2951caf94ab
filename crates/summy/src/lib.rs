//! # Summy
//!
//! Summarizes the page a user is reading and answers follow-up questions
//! about it, using any OpenAI-compatible model.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use summy::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let settings = Arc::new(SettingsStore::in_memory().await?);
//!     settings
//!         .write(Settings::new("gpt-4o-mini", std::env::var("OPENAI_API_KEY")?))
//!         .await?;
//!
//!     let backend = Arc::new(LlmBackend::new(ClientFactory::new(ProviderConfig::openai())));
//!     let broker = Arc::new(Broker::new(settings, backend)).spawn();
//!
//!     // One page context: its push channel and its view controller
//!     let tab = TabId(1);
//!     let (port, inbox) = tab_channel(tab, None);
//!     let sender = broker.connect(tab, Arc::new(port)).await;
//!     let page = Arc::new(StaticDocument("<p>Some article</p>".to_string()));
//!     let mut view = ViewController::new(tab, Arc::new(sender), true)
//!         .with_inbox(inbox)
//!         .with_document(page);
//!
//!     view.activate_trigger().await;
//!     view.next_push().await;
//!
//!     if let Some(result) = view.result() {
//!         println!("{}", result.summary);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`summy-types`**: message protocol, settings record, error taxonomy
//! - **`summy-llm`**: chat client for OpenAI-compatible endpoints
//! - **`summy-persist`**: session, conversation and settings stores
//! - **`summy-broker`**: the background broker and the LLM backend
//! - **`summy-view`**: per-tab view controller and panel rendering

pub use summy_broker::{
    extract_text, Backend, BroadcastReport, Broker, BrokerHandle, ConnectionStatus,
    ContextMenuEntry, LlmBackend, SettingsPage, TabSender, CONTEXT_MENU, MODEL_SUGGESTIONS,
};
pub use summy_llm::{
    ChatClient, ChatOptions, ChatRequest, ChatResponse, ClientFactory, Content, Message,
    OpenAIClient, ProviderConfig, ProviderType, ResponseFormat,
};
pub use summy_persist::{
    ConversationStore, JsonFileStorage, MemoryStorage, PersistError, Session, SessionStore,
    SettingsStorage, SettingsStore,
};
pub use summy_types::{
    tab_channel, Ack, AnswerReply, BrokerPort, ChannelTabPort, ConversationHandle,
    DocumentSource, Push, Reply, Request, Settings, SettingsUpdate, StaticDocument,
    SummaryResult, SummyError, TabDelivery, TabId, TabInbox, TabPort,
};
pub use summy_view::{PanelView, RenderScope, StressTier, ViewController, ViewState};

pub mod prelude;
