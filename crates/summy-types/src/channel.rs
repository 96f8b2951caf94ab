//! Message channel between isolated contexts.
//!
//! Every request carries a single-use [`Responder`]: the receiver either
//! answers right away or keeps the responder and settles it later. A reply can
//! be sent at most once; a responder dropped unsettled closes the channel and
//! the requester sees a [`SummyError::Delivery`].
//!
//! Pushes travel the other way through a [`TabPort`], one per open tab.

use async_trait::async_trait;
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::{mpsc, oneshot};

use crate::error::{Result, SummyError};
use crate::protocol::{Ack, Push, Reply, Request};
use crate::TabId;

const TAB_INBOX_CAPACITY: usize = 32;

const NO_RECEIVER: &str = "Could not establish connection. Receiving end does not exist.";
const PORT_CLOSED: &str = "The message port closed before a response was received.";

/// A request on its way to the broker
#[derive(Debug)]
pub struct Envelope {
    pub tab: TabId,
    pub request: Request,
    pub responder: Responder,
}

impl Envelope {
    pub fn new(tab: TabId, request: Request) -> (Self, oneshot::Receiver<Reply>) {
        let (responder, rx) = Responder::new(tab, request.kind());
        (
            Self {
                tab,
                request,
                responder,
            },
            rx,
        )
    }
}

/// Single-use reply slot of an [`Envelope`]
#[derive(Debug)]
pub struct Responder {
    tx: Option<oneshot::Sender<Reply>>,
    tab: TabId,
    kind: &'static str,
}

impl Responder {
    pub fn new(tab: TabId, kind: &'static str) -> (Self, oneshot::Receiver<Reply>) {
        let (tx, rx) = oneshot::channel();
        (
            Self {
                tx: Some(tx),
                tab,
                kind,
            },
            rx,
        )
    }

    /// Settle the request. Returns `false` when the requester is gone.
    pub fn respond(mut self, reply: Reply) -> bool {
        match self.tx.take() {
            Some(tx) => tx.send(reply).is_ok(),
            None => false,
        }
    }
}

impl Drop for Responder {
    fn drop(&mut self) {
        if self.tx.is_some() {
            tracing::warn!(tab = %self.tab, kind = self.kind, "request dropped without a reply");
        }
    }
}

/// Await the reply of a request sent through an [`Envelope`]
pub async fn await_reply(rx: oneshot::Receiver<Reply>) -> Result<Reply> {
    rx.await
        .map_err(|_| SummyError::Delivery(PORT_CLOSED.to_string()))
}

/// The page context's side of the protocol: how a view controller reaches the broker
#[async_trait]
pub trait BrokerPort: Send + Sync {
    async fn send(&self, request: Request) -> Result<Reply>;
}

/// The broker's handle on one open tab
#[async_trait]
pub trait TabPort: Send + Sync {
    /// Deliver a push and wait for the page's acknowledgement
    async fn deliver(&self, push: Push) -> Result<Ack>;

    /// One-shot extraction of the serialized document from the page
    async fn extract_document(&self) -> Result<String>;
}

/// Something that can serialize the current page document
pub trait DocumentSource: Send + Sync {
    fn outer_html(&self) -> Option<String>;
}

/// Fixed document, for pages that never change
#[derive(Debug, Clone)]
pub struct StaticDocument(pub String);

impl DocumentSource for StaticDocument {
    fn outer_html(&self) -> Option<String> {
        Some(self.0.clone())
    }
}

/// Document that the page can replace, e.g. after client-side navigation
#[derive(Debug, Clone, Default)]
pub struct SharedDocument(Arc<RwLock<Option<String>>>);

impl SharedDocument {
    pub fn new(html: impl Into<String>) -> Self {
        Self(Arc::new(RwLock::new(Some(html.into()))))
    }

    pub fn replace(&self, html: impl Into<String>) {
        *self.0.write().unwrap_or_else(PoisonError::into_inner) = Some(html.into());
    }
}

impl DocumentSource for SharedDocument {
    fn outer_html(&self) -> Option<String> {
        self.0
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// A push waiting in a tab's inbox together with its acknowledgement slot
#[derive(Debug)]
pub struct TabDelivery {
    pub push: Push,
    ack: oneshot::Sender<Ack>,
}

impl TabDelivery {
    pub fn acknowledge(self, ack: Ack) {
        // The broker may have stopped waiting; nothing to do then
        let _ = self.ack.send(ack);
    }
}

/// In-process [`TabPort`] backed by an mpsc channel
#[derive(Clone)]
pub struct ChannelTabPort {
    tab: TabId,
    tx: mpsc::Sender<TabDelivery>,
    document: Option<Arc<dyn DocumentSource>>,
}

/// Receiving end of a [`ChannelTabPort`], owned by the page context
#[derive(Debug)]
pub struct TabInbox {
    tab: TabId,
    rx: mpsc::Receiver<TabDelivery>,
}

/// Open the push channel of one tab.
///
/// Dropping the [`TabInbox`] models the page going away: further deliveries
/// fail with [`SummyError::Delivery`].
pub fn tab_channel(
    tab: TabId,
    document: Option<Arc<dyn DocumentSource>>,
) -> (ChannelTabPort, TabInbox) {
    let (tx, rx) = mpsc::channel(TAB_INBOX_CAPACITY);
    (ChannelTabPort { tab, tx, document }, TabInbox { tab, rx })
}

impl ChannelTabPort {
    pub fn tab(&self) -> TabId {
        self.tab
    }
}

#[async_trait]
impl TabPort for ChannelTabPort {
    async fn deliver(&self, push: Push) -> Result<Ack> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(TabDelivery { push, ack: ack_tx })
            .await
            .map_err(|_| SummyError::Delivery(NO_RECEIVER.to_string()))?;

        ack_rx
            .await
            .map_err(|_| SummyError::Delivery(PORT_CLOSED.to_string()))
    }

    async fn extract_document(&self) -> Result<String> {
        if self.tx.is_closed() {
            return Err(SummyError::Capture(format!("tab {} is gone", self.tab)));
        }

        self.document
            .as_ref()
            .and_then(|doc| doc.outer_html())
            .ok_or_else(|| {
                SummyError::Capture(format!("tab {} did not return its document", self.tab))
            })
    }
}

impl TabInbox {
    pub fn tab(&self) -> TabId {
        self.tab
    }

    pub async fn recv(&mut self) -> Option<TabDelivery> {
        self.rx.recv().await
    }

    pub fn try_recv(&mut self) -> Option<TabDelivery> {
        self.rx.try_recv().ok()
    }

    /// Stop accepting pushes; pending ones can still be drained
    pub fn close(&mut self) {
        self.rx.close();
    }
}
