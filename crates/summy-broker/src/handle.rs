use async_trait::async_trait;
use std::sync::Arc;
use summy_types::{await_reply, BrokerPort, Envelope, Reply, Request, Result, SummyError, TabId, TabPort};
use tokio::sync::mpsc;

use crate::broker::Broker;

/// Cloneable sending side of a running [`Broker`]
#[derive(Clone)]
pub struct BrokerHandle {
    tx: mpsc::Sender<Envelope>,
    broker: Arc<Broker>,
}

impl BrokerHandle {
    pub(crate) fn new(tx: mpsc::Sender<Envelope>, broker: Arc<Broker>) -> Self {
        Self { tx, broker }
    }

    pub fn broker(&self) -> &Arc<Broker> {
        &self.broker
    }

    /// Queue a request from `tab` and wait for its direct reply
    pub async fn send(&self, tab: TabId, request: Request) -> Result<Reply> {
        let (envelope, rx) = Envelope::new(tab, request);
        self.tx
            .send(envelope)
            .await
            .map_err(|_| SummyError::Delivery("The broker is not running.".to_string()))?;
        await_reply(rx).await
    }

    /// Register a page context and return its way back to the broker
    pub async fn connect(&self, tab: TabId, port: Arc<dyn TabPort>) -> TabSender {
        self.broker.register_tab(tab, port).await;
        self.sender(tab)
    }

    /// Sender for a tab that is already registered
    pub fn sender(&self, tab: TabId) -> TabSender {
        TabSender {
            tab,
            handle: self.clone(),
        }
    }

    /// Capture without html for `tab`; runs in the background
    pub fn context_menu_clicked(&self, tab: TabId) {
        let broker = Arc::clone(&self.broker);
        tokio::spawn(async move { broker.context_menu_clicked(tab).await });
    }

    pub async fn tab_removed(&self, tab: TabId) {
        self.broker.on_tab_removed(tab).await;
    }
}

/// [`BrokerPort`] bound to one tab, handed to that tab's view controller
#[derive(Clone)]
pub struct TabSender {
    tab: TabId,
    handle: BrokerHandle,
}

impl TabSender {
    pub fn tab(&self) -> TabId {
        self.tab
    }
}

#[async_trait]
impl BrokerPort for TabSender {
    async fn send(&self, request: Request) -> Result<Reply> {
        self.handle.send(self.tab, request).await
    }
}
