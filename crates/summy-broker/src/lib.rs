//! Background broker of the Summy page summarizer.
//!
//! The [`Broker`] owns the tab sessions, reads the settings before every
//! backend call and routes the closed message protocol between page contexts
//! and a [`Backend`]. [`LlmBackend`] is the backend talking to an
//! OpenAI-compatible model.

pub mod backend;
pub mod broker;
pub mod extract;
pub mod handle;
pub mod llm_backend;
pub mod prompts;
pub mod settings_page;

pub use backend::Backend;
pub use broker::{BroadcastReport, Broker, ContextMenuEntry, CONTEXT_MENU};
pub use extract::extract_text;
pub use handle::{BrokerHandle, TabSender};
pub use llm_backend::LlmBackend;
pub use settings_page::{ConnectionStatus, SettingsPage, MODEL_SUGGESTIONS};
