use futures::future::join_all;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use summy_persist::{SessionStore, SettingsStore};
use summy_types::{
    Ack, AnswerReply, Envelope, Push, Reply, Request, Result, Settings, SettingsUpdate,
    SummyError, TabId, TabPort,
};
use tokio::sync::{mpsc, watch, RwLock};
use tokio::task::JoinHandle;
use tracing::Instrument;

use crate::backend::Backend;
use crate::handle::BrokerHandle;

/// Capacity of the broker's request queue
pub const REQUEST_QUEUE_CAPACITY: usize = 256;

/// How long a push waits for the page to acknowledge it
pub const PUSH_ACK_TIMEOUT: Duration = Duration::from_secs(2);

/// The page context-menu entry that triggers a capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ContextMenuEntry {
    pub id: &'static str,
    pub title: &'static str,
    pub contexts: &'static [&'static str],
}

pub const CONTEXT_MENU: ContextMenuEntry = ContextMenuEntry {
    id: "summyContextMenuId",
    title: "Summarize with Summy",
    contexts: &["page"],
};

/// Outcome of a fan-out push to every open tab
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    pub delivered: Vec<TabId>,
    pub failed: Vec<TabId>,
}

/// Background coordinator between page contexts, settings and the backend.
///
/// Requests are keyed by tab; each one runs on its own task once the broker
/// is [spawned](Broker::spawn), so a slow tab never blocks another.
pub struct Broker {
    sessions: Arc<SessionStore>,
    settings: Arc<SettingsStore>,
    backend: Arc<dyn Backend>,
    tabs: RwLock<HashMap<TabId, Arc<dyn TabPort>>>,
    captures_in_flight: Mutex<HashSet<TabId>>,
    tasks: Mutex<Vec<JoinHandle<()>>>,
    ack_timeout: Duration,
}

impl Broker {
    pub fn new(settings: Arc<SettingsStore>, backend: Arc<dyn Backend>) -> Self {
        Self::with_sessions(Arc::new(SessionStore::new()), settings, backend)
    }

    pub fn with_sessions(
        sessions: Arc<SessionStore>,
        settings: Arc<SettingsStore>,
        backend: Arc<dyn Backend>,
    ) -> Self {
        Self {
            sessions,
            settings,
            backend,
            tabs: RwLock::new(HashMap::new()),
            captures_in_flight: Mutex::new(HashSet::new()),
            tasks: Mutex::new(Vec::new()),
            ack_timeout: PUSH_ACK_TIMEOUT,
        }
    }

    /// Bound on the wait for a page acknowledgement; an unacknowledged push
    /// counts as a failed delivery
    pub fn with_ack_timeout(mut self, timeout: Duration) -> Self {
        self.ack_timeout = timeout;
        self
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn settings(&self) -> &Arc<SettingsStore> {
        &self.settings
    }

    pub fn backend(&self) -> &Arc<dyn Backend> {
        &self.backend
    }

    pub fn context_menu(&self) -> ContextMenuEntry {
        CONTEXT_MENU
    }

    /// Start the request loop and the settings watcher
    pub fn spawn(self: Arc<Self>) -> BrokerHandle {
        let (tx, mut rx) = mpsc::channel::<Envelope>(REQUEST_QUEUE_CAPACITY);

        let broker = Arc::clone(&self);
        let router = tokio::spawn(async move {
            while let Some(envelope) = rx.recv().await {
                let broker = Arc::clone(&broker);
                tokio::spawn(async move { broker.dispatch(envelope).await });
            }
            tracing::info!("broker request loop stopped");
        });

        let mut settings_rx = self.settings.subscribe();
        let shown = settings_rx.borrow_and_update().show_button;
        let watcher = tokio::spawn(Arc::clone(&self).watch_settings(settings_rx, shown));

        self.lock_tasks().extend([router, watcher]);
        tracing::info!("broker started");
        BrokerHandle::new(tx, self)
    }

    /// Abort the background tasks started by [`spawn`](Broker::spawn)
    pub fn shutdown(&self) {
        for task in self.lock_tasks().drain(..) {
            task.abort();
        }
    }

    fn lock_tasks(&self) -> MutexGuard<'_, Vec<JoinHandle<()>>> {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Route one request and settle its responder
    pub async fn dispatch(&self, envelope: Envelope) {
        let Envelope {
            tab,
            request,
            responder,
        } = envelope;
        let span = tracing::info_span!("request", tab = %tab, kind = request.kind());

        async move {
            tracing::debug!("request received");
            match request {
                Request::Capture { html } => {
                    // Captures are acknowledged at once; the outcome is pushed later
                    responder.respond(Reply::ack());
                    self.on_capture(tab, html).await;
                }
                Request::Answer { question, .. } => {
                    let reply = match self.on_follow_up(tab, &question).await {
                        Ok(answer) => AnswerReply::answered(answer),
                        Err(e) => AnswerReply::failed(&e),
                    };
                    if !responder.respond(Reply::Answer(reply)) {
                        tracing::warn!("answer dropped, requester is gone");
                    }
                }
                Request::Cleanup => {
                    self.on_cleanup(tab).await;
                    responder.respond(Reply::ack());
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Summarize the tab's page and push the outcome to the tab.
    ///
    /// A capture for a tab that already has one in flight is ignored. When
    /// the outcome cannot be delivered the tab's session is released.
    pub async fn on_capture(&self, tab: TabId, html: Option<String>) {
        let Some(_guard) = CaptureGuard::acquire(&self.captures_in_flight, tab) else {
            tracing::debug!(tab = %tab, "capture already in flight, ignored");
            return;
        };

        let document = match html {
            Some(html) => html,
            None => match self.extract_document(tab).await {
                Ok(html) => html,
                Err(e) => {
                    tracing::warn!(tab = %tab, error = %e, "capture abandoned");
                    return;
                }
            },
        };

        let push = match self.summarize(tab, &document).await {
            Ok(result) => Push::summary(result.to_json()),
            Err(e) => {
                tracing::error!(tab = %tab, kind = e.kind(), error = %e, "summarize failed");
                Push::failure(&e)
            }
        };
        // The tab went away while the backend was busy; its session must not outlive it
        if !self.push(tab, push).await {
            self.on_cleanup(tab).await;
        }
    }

    async fn extract_document(&self, tab: TabId) -> Result<String> {
        let port = self
            .tab_port(tab)
            .await
            .ok_or_else(|| SummyError::Capture(format!("tab {} is not connected", tab)))?;
        port.extract_document().await
    }

    async fn summarize(&self, tab: TabId, document: &str) -> Result<summy_types::SummaryResult> {
        let settings = self.read_settings().await?;
        let model = settings.require_model()?;
        let (session, created) = self.sessions.get_or_create(tab).await;
        if created {
            tracing::info!(tab = %tab, handle = %session.handle, "session opened");
        }

        self.backend
            .summarize(session.handle, document, model, settings.credential.trim())
            .await
    }

    /// Answer a follow-up question within the tab's session
    pub async fn on_follow_up(&self, tab: TabId, question: &str) -> Result<String> {
        let settings = self.read_settings().await?;
        let credential = settings.require_credential()?;
        let model = settings.require_model()?;
        let (session, _) = self.sessions.get_or_create(tab).await;

        self.backend
            .follow_up(session.handle, question, model, credential)
            .await
            .inspect_err(|e| {
                tracing::error!(tab = %tab, kind = e.kind(), error = %e, "follow-up failed")
            })
    }

    /// Release the tab's session. Best effort, never fails.
    pub async fn on_cleanup(&self, tab: TabId) {
        if let Some(session) = self.sessions.remove(tab).await {
            self.backend.cleanup(session.handle).await;
            tracing::info!(tab = %tab, "session closed");
        }
    }

    /// Persist a settings-page write. Subscribed tabs learn about a
    /// `show_button` change through the settings watcher.
    pub async fn on_settings_changed(&self, update: SettingsUpdate) -> Result<Settings> {
        self.settings
            .update(update)
            .await
            .map_err(|e| SummyError::Configuration(format!("Could not save settings: {}", e)))
    }

    /// A page context came up in `tab`
    pub async fn register_tab(&self, tab: TabId, port: Arc<dyn TabPort>) {
        if self.tabs.write().await.insert(tab, port).is_some() {
            tracing::debug!(tab = %tab, "tab port replaced");
        } else {
            tracing::debug!(tab = %tab, "tab registered");
        }
    }

    /// A page context's channel closed. Ignored when `tab` has since
    /// registered another port.
    pub async fn on_port_closed(&self, tab: TabId, port: &Arc<dyn TabPort>) -> bool {
        {
            let mut tabs = self.tabs.write().await;
            let current = match tabs.get(&tab) {
                Some(current) => current,
                None => return false,
            };
            if Arc::as_ptr(current) as *const () != Arc::as_ptr(port) as *const () {
                return false;
            }
            tabs.remove(&tab);
        }
        self.on_cleanup(tab).await;
        tracing::debug!(tab = %tab, "tab port closed");
        true
    }

    /// The browser closed `tab`
    pub async fn on_tab_removed(&self, tab: TabId) {
        self.tabs.write().await.remove(&tab);
        self.on_cleanup(tab).await;
        tracing::debug!(tab = %tab, "tab removed");
    }

    /// The context-menu entry was clicked on `tab`
    pub async fn context_menu_clicked(&self, tab: TabId) {
        tracing::debug!(tab = %tab, menu = CONTEXT_MENU.id, "context menu clicked");
        self.on_capture(tab, None).await;
    }

    pub async fn open_tabs(&self) -> Vec<TabId> {
        let mut tabs: Vec<TabId> = self.tabs.read().await.keys().copied().collect();
        tabs.sort();
        tabs
    }

    async fn tab_port(&self, tab: TabId) -> Option<Arc<dyn TabPort>> {
        self.tabs.read().await.get(&tab).cloned()
    }

    /// Push to one tab. Delivery failures are logged and dropped.
    pub async fn push(&self, tab: TabId, push: Push) -> bool {
        let kind = push.kind();
        let Some(port) = self.tab_port(tab).await else {
            tracing::warn!(tab = %tab, kind, "push dropped, tab is not connected");
            return false;
        };

        match self.deliver(tab, port.as_ref(), push).await {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(tab = %tab, kind, error = %e, "push dropped");
                false
            }
        }
    }

    async fn deliver(&self, tab: TabId, port: &dyn TabPort, push: Push) -> Result<Ack> {
        tokio::time::timeout(self.ack_timeout, port.deliver(push))
            .await
            .map_err(|_| {
                SummyError::Delivery(format!(
                    "tab {} did not acknowledge within {:?}",
                    tab, self.ack_timeout
                ))
            })?
    }

    /// Send the trigger visibility to every open tab.
    /// One failing tab never prevents delivery to the others.
    pub async fn broadcast_visibility(&self, show: bool) -> BroadcastReport {
        let ports: Vec<(TabId, Arc<dyn TabPort>)> = self
            .tabs
            .read()
            .await
            .iter()
            .map(|(tab, port)| (*tab, Arc::clone(port)))
            .collect();

        let outcomes = join_all(ports.into_iter().map(|(tab, port)| async move {
            (tab, self.deliver(tab, port.as_ref(), Push::Visibility { show }).await)
        }))
        .await;

        let mut report = BroadcastReport::default();
        for (tab, outcome) in outcomes {
            match outcome {
                Ok(_) => report.delivered.push(tab),
                Err(e) => {
                    tracing::warn!(tab = %tab, error = %e, "visibility push dropped");
                    report.failed.push(tab);
                }
            }
        }
        report.delivered.sort();
        report.failed.sort();
        tracing::info!(
            show,
            delivered = report.delivered.len(),
            failed = report.failed.len(),
            "visibility broadcast"
        );
        report
    }

    async fn watch_settings(self: Arc<Self>, mut rx: watch::Receiver<Settings>, mut shown: bool) {
        while rx.changed().await.is_ok() {
            let show = rx.borrow_and_update().show_button;
            if show != shown {
                shown = show;
                self.broadcast_visibility(show).await;
            }
        }
    }

    async fn read_settings(&self) -> Result<Settings> {
        self.settings
            .read()
            .await
            .map_err(|e| SummyError::Configuration(format!("Could not read settings: {}", e)))
    }
}

/// Marks a tab's capture as in flight until dropped
struct CaptureGuard<'a> {
    in_flight: &'a Mutex<HashSet<TabId>>,
    tab: TabId,
}

impl<'a> CaptureGuard<'a> {
    fn acquire(in_flight: &'a Mutex<HashSet<TabId>>, tab: TabId) -> Option<Self> {
        let inserted = in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(tab);
        inserted.then_some(Self { in_flight, tab })
    }
}

impl Drop for CaptureGuard<'_> {
    fn drop(&mut self) {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.tab);
    }
}
