use axum::{
    extract::{Path, State},
    response::sse::{Event, KeepAlive, Sse},
};
use futures::stream::{Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;
use summy_broker::Broker;
use summy_types::{Push, TabId, TabPort};

use crate::{remote::RemoteTabPort, state::AppState};

/// Open the push channel of a tab as a Server-Sent Events stream.
///
/// Each push becomes one event named after its message kind with the push as
/// JSON data. The current trigger visibility is sent first. When the client
/// disconnects the tab is unregistered and its session released.
pub async fn tab_events(
    State(state): State<Arc<AppState>>,
    Path(tab_id): Path<i32>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let tab = TabId(tab_id);
    let (port, pushes) = RemoteTabPort::open(tab);
    let port: Arc<dyn TabPort> = Arc::new(port);

    state.broker.connect(tab, Arc::clone(&port)).await;
    tracing::info!(tab = %tab, "event stream opened");

    let show = state.broker.broker().settings().current().show_button;
    if let Err(e) = port.deliver(Push::Visibility { show }).await {
        tracing::warn!(tab = %tab, error = %e, "could not send initial visibility");
    }

    let guard = StreamGuard {
        broker: Arc::clone(state.broker.broker()),
        tab,
        port,
    };
    let stream = pushes.map(move |push| {
        // Dropped together with the stream
        let _guard = &guard;
        Ok::<_, Infallible>(to_event(tab, &push))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}

fn to_event(tab: TabId, push: &Push) -> Event {
    match Event::default().event(push.kind()).json_data(push) {
        Ok(event) => event,
        Err(e) => {
            tracing::error!(tab = %tab, error = %e, "failed to serialize push");
            Event::default().event("error").data(e.to_string())
        }
    }
}

/// Unregisters the stream's port once the client goes away
struct StreamGuard {
    broker: Arc<Broker>,
    tab: TabId,
    port: Arc<dyn TabPort>,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let broker = Arc::clone(&self.broker);
        let port = Arc::clone(&self.port);
        let tab = self.tab;
        runtime.spawn(async move {
            if broker.on_port_closed(tab, &port).await {
                tracing::info!(tab = %tab, "event stream closed");
            }
        });
    }
}
