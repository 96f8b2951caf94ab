pub mod channel;
pub mod error;
pub mod protocol;
pub mod settings;
pub mod summary;

pub use channel::{
    await_reply, tab_channel, BrokerPort, ChannelTabPort, DocumentSource, Envelope, Responder,
    SharedDocument, StaticDocument, TabDelivery, TabInbox, TabPort,
};
pub use error::{Result, SummyError};
pub use protocol::{Ack, AnswerReply, Push, Reply, Request};
pub use settings::{Settings, SettingsUpdate};
pub use summary::{SummaryResult, QUESTION_COUNT};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Browser tab identifier; doubles as the session key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub i32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for TabId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

/// Opaque handle of one backend conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHandle(uuid::Uuid);

impl ConversationHandle {
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for ConversationHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConversationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
