pub mod conversation;
pub mod error;
pub mod session;
pub mod settings;

pub use conversation::{Conversation, ConversationStore, MAX_CONVERSATIONS, MAX_MESSAGES_PER_CONVERSATION};
pub use error::{PersistError, Result};
pub use session::{Session, SessionStore};
pub use settings::{JsonFileStorage, MemoryStorage, SettingsStorage, SettingsStore};
