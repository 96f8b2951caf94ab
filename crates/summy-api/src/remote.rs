//! Tabs living outside the process, reached over Server-Sent Events.

use async_trait::async_trait;
use summy_types::{Ack, Push, Result, SummyError, TabId, TabPort};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

const EVENT_BUFFER: usize = 32;

/// [`TabPort`] feeding one open event stream.
///
/// A push counts as acknowledged once it is queued on the stream; the HTTP
/// client has no way to answer an event. The page document cannot be pulled
/// remotely, so captures from these tabs must carry their html.
#[derive(Debug, Clone)]
pub struct RemoteTabPort {
    tab: TabId,
    tx: mpsc::Sender<Push>,
}

impl RemoteTabPort {
    pub fn open(tab: TabId) -> (Self, ReceiverStream<Push>) {
        let (tx, rx) = mpsc::channel(EVENT_BUFFER);
        (Self { tab, tx }, ReceiverStream::new(rx))
    }

    pub fn tab(&self) -> TabId {
        self.tab
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

#[async_trait]
impl TabPort for RemoteTabPort {
    async fn deliver(&self, push: Push) -> Result<Ack> {
        self.tx
            .send(push)
            .await
            .map_err(|_| SummyError::Delivery(format!("event stream of tab {} is closed", self.tab)))?;
        Ok(Ack::received())
    }

    async fn extract_document(&self) -> Result<String> {
        Err(SummyError::Capture(format!(
            "tab {} is remote and must send its html",
            self.tab
        )))
    }
}
