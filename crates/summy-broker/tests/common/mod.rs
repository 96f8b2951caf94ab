#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use summy_broker::{Backend, Broker, BrokerHandle};
use summy_persist::SettingsStore;
use summy_types::{
    tab_channel, ConversationHandle, DocumentSource, Result, Settings, StaticDocument, SummaryResult, SummyError,
    TabDelivery, TabId, TabInbox,
};
use tokio::time::timeout;

pub const WAIT: Duration = Duration::from_secs(2);

/// Backend double that counts calls and answers from fixtures
#[derive(Default)]
pub struct MockBackend {
    pub summarize_calls: AtomicUsize,
    pub follow_up_calls: AtomicUsize,
    pub cleanup_calls: AtomicUsize,
    pub verify_calls: AtomicUsize,
    pub documents: Mutex<Vec<String>>,
    pub delay: Option<Duration>,
    pub fail_with: Option<SummyError>,
}

impl MockBackend {
    pub fn slow(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn failing(error: SummyError) -> Self {
        Self {
            fail_with: Some(error),
            ..Default::default()
        }
    }

    pub fn summarize_calls(&self) -> usize {
        self.summarize_calls.load(Ordering::SeqCst)
    }

    pub fn follow_up_calls(&self) -> usize {
        self.follow_up_calls.load(Ordering::SeqCst)
    }

    pub fn cleanup_calls(&self) -> usize {
        self.cleanup_calls.load(Ordering::SeqCst)
    }
}

pub fn fixture_result() -> SummaryResult {
    SummaryResult {
        category: "Sailing".into(),
        summary: "A sailor crossed the Atlantic alone in a small boat.".into(),
        stress_score: 7,
        emoji_outline: "⛵ 🌊 🧭 🌙 🏝".into(),
        questions: vec![
            "How long did it take?".into(),
            "What boat was used?".into(),
            "Was it dangerous?".into(),
        ],
        answers: vec!["Forty days.".into(), "A sloop.".into(), "Very.".into()],
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn summarize(
        &self,
        _handle: ConversationHandle,
        document: &str,
        _model: &str,
        _credential: &str,
    ) -> Result<SummaryResult> {
        self.summarize_calls.fetch_add(1, Ordering::SeqCst);
        self.documents.lock().unwrap().push(document.to_string());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.fail_with {
            Some(e) => Err(e.clone()),
            None => Ok(fixture_result()),
        }
    }

    async fn follow_up(
        &self,
        _handle: ConversationHandle,
        question: &str,
        _model: &str,
        _credential: &str,
    ) -> Result<String> {
        self.follow_up_calls.fetch_add(1, Ordering::SeqCst);
        match &self.fail_with {
            Some(e) => Err(e.clone()),
            None => Ok(format!("Answer to: {}", question)),
        }
    }

    async fn cleanup(&self, _handle: ConversationHandle) {
        self.cleanup_calls.fetch_add(1, Ordering::SeqCst);
    }

    async fn verify_access(&self, model: &str, credential: &str) -> Result<String> {
        self.verify_calls.fetch_add(1, Ordering::SeqCst);
        if credential.is_empty() || model == "unknown-model" {
            Err(SummyError::Backend(
                "Could not access LLM. Please verify model name and API key.".into(),
            ))
        } else {
            Ok("Access confirmed".into())
        }
    }
}

pub fn configured() -> Settings {
    Settings::new("gpt-4o-mini", "sk-test")
}

pub async fn start(settings: Settings, backend: Arc<MockBackend>) -> BrokerHandle {
    let store = Arc::new(SettingsStore::in_memory().await.unwrap());
    store.write(settings).await.unwrap();
    Arc::new(Broker::new(store, backend)).spawn()
}

/// Register a tab whose page serializes to `html`
pub async fn open_tab(handle: &BrokerHandle, tab: i32, html: Option<&str>) -> TabInbox {
    let document: Option<Arc<dyn DocumentSource>> =
        html.map(|h| Arc::new(StaticDocument(h.to_string())) as Arc<dyn DocumentSource>);
    let (port, inbox) = tab_channel(TabId(tab), document);
    handle.broker().register_tab(TabId(tab), Arc::new(port)).await;
    inbox
}

pub async fn next_delivery(inbox: &mut TabInbox) -> TabDelivery {
    timeout(WAIT, inbox.recv())
        .await
        .expect("timed out waiting for a push")
        .expect("inbox closed")
}
