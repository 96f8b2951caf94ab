use lru::LruCache;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard, PoisonError};
use summy_llm::Message;
use summy_types::ConversationHandle;

/// Conversations kept in memory before the least recently used one is evicted
pub const MAX_CONVERSATIONS: usize = 100;

/// Chat turns kept per conversation; the oldest turn is dropped first
pub const MAX_MESSAGES_PER_CONVERSATION: usize = 100;

/// One conversation about a page
#[derive(Debug, Clone)]
pub struct Conversation {
    prompts: Vec<Message>,
    chat: VecDeque<Message>,
    capacity: usize,
}

impl Conversation {
    pub fn new(prompts: Vec<Message>, capacity: usize) -> Self {
        Self {
            prompts,
            chat: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append(&mut self, message: Message) {
        if self.capacity == 0 {
            return;
        }
        if self.chat.len() == self.capacity {
            self.chat.pop_front();
        }
        self.chat.push_back(message);
    }

    /// Initial prompts followed by the retained chat turns.
    /// Prompts live outside the ring buffer and are never evicted.
    pub fn context_window(&self) -> Vec<Message> {
        self.prompts
            .iter()
            .chain(self.chat.iter())
            .cloned()
            .collect()
    }

    pub fn turns(&self) -> usize {
        self.chat.len()
    }
}

/// LRU-bounded store of conversations keyed by handle
pub struct ConversationStore {
    conversations: Mutex<LruCache<ConversationHandle, Conversation>>,
    messages_per_conversation: usize,
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::with_limits(MAX_CONVERSATIONS, MAX_MESSAGES_PER_CONVERSATION)
    }

    /// A zero conversation limit is treated as one
    pub fn with_limits(conversations: usize, messages_per_conversation: usize) -> Self {
        let capacity = NonZeroUsize::new(conversations).unwrap_or(NonZeroUsize::MIN);
        Self {
            conversations: Mutex::new(LruCache::new(capacity)),
            messages_per_conversation,
        }
    }

    fn lock(&self) -> MutexGuard<'_, LruCache<ConversationHandle, Conversation>> {
        self.conversations
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts (or restarts) the conversation behind `handle`
    pub fn create(&self, handle: ConversationHandle, prompts: Vec<Message>) {
        let conversation = Conversation::new(prompts, self.messages_per_conversation);
        if let Some((evicted, _)) = self.lock().push(handle, conversation) {
            if evicted != handle {
                tracing::debug!(handle = %evicted, "conversation evicted");
            }
        }
    }

    pub fn context_window(&self, handle: &ConversationHandle) -> Option<Vec<Message>> {
        self.lock().get(handle).map(Conversation::context_window)
    }

    /// Appends turns to an existing conversation; unknown handles are ignored
    pub fn append(&self, handle: &ConversationHandle, messages: impl IntoIterator<Item = Message>) {
        let mut guard = self.lock();
        if let Some(conversation) = guard.get_mut(handle) {
            for message in messages {
                conversation.append(message);
            }
        }
    }

    pub fn remove(&self, handle: &ConversationHandle) -> bool {
        self.lock().pop(handle).is_some()
    }

    pub fn contains(&self, handle: &ConversationHandle) -> bool {
        self.lock().contains(handle)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(message: &Message) -> String {
        message.content().to_string()
    }

    #[test]
    fn test_context_window_starts_with_prompts() {
        let store = ConversationStore::new();
        let handle = ConversationHandle::new();
        store.create(handle, vec![Message::system("rules"), Message::human("page")]);
        store.append(&handle, [Message::human("q"), Message::ai("a")]);

        let window = store.context_window(&handle).unwrap();
        let texts: Vec<String> = window.iter().map(text).collect();
        assert_eq!(texts, vec!["rules", "page", "q", "a"]);
    }

    #[test]
    fn test_ring_buffer_keeps_prompts() {
        let store = ConversationStore::with_limits(4, 3);
        let handle = ConversationHandle::new();
        store.create(handle, vec![Message::system("rules")]);
        store.append(&handle, (0..5).map(|i| Message::human(i.to_string())));

        let window = store.context_window(&handle).unwrap();
        let texts: Vec<String> = window.iter().map(text).collect();
        assert_eq!(texts, vec!["rules", "2", "3", "4"]);
    }

    #[test]
    fn test_lru_eviction() {
        let store = ConversationStore::with_limits(2, 10);
        let first = ConversationHandle::new();
        let second = ConversationHandle::new();
        let third = ConversationHandle::new();

        store.create(first, vec![]);
        store.create(second, vec![]);
        // Touch the first so the second becomes least recently used
        assert!(store.context_window(&first).is_some());
        store.create(third, vec![]);

        assert_eq!(store.len(), 2);
        assert!(store.contains(&first));
        assert!(!store.contains(&second));
        assert!(store.contains(&third));
    }

    #[test]
    fn test_append_to_unknown_handle_is_ignored() {
        let store = ConversationStore::new();
        let handle = ConversationHandle::new();
        store.append(&handle, [Message::human("lost")]);
        assert!(store.is_empty());
        assert!(!store.remove(&handle));
    }
}
