use async_trait::async_trait;
use summy_types::{ConversationHandle, Result, SummaryResult};

/// Summarization engine seen by the broker.
///
/// `handle` identifies the conversation of one tab. Errors are
/// [`SummyError::Backend`](summy_types::SummyError::Backend) or
/// [`SummyError::Parse`](summy_types::SummyError::Parse).
#[async_trait]
pub trait Backend: Send + Sync {
    /// Summarize a serialized document and open the conversation behind `handle`
    async fn summarize(
        &self,
        handle: ConversationHandle,
        document: &str,
        model: &str,
        credential: &str,
    ) -> Result<SummaryResult>;

    /// Answer a question within the conversation behind `handle`
    async fn follow_up(
        &self,
        handle: ConversationHandle,
        question: &str,
        model: &str,
        credential: &str,
    ) -> Result<String>;

    /// Release the conversation. Never fails observably.
    async fn cleanup(&self, handle: ConversationHandle);

    /// Round-trip check used by the settings page
    async fn verify_access(&self, model: &str, credential: &str) -> Result<String>;
}
