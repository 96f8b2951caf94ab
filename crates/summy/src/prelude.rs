//! Prelude module for convenient imports
//!
//! ```rust
//! use summy::prelude::*;
//! ```

pub use crate::{
    tab_channel, Backend, Broker, BrokerHandle, BrokerPort, ClientFactory, LlmBackend,
    ProviderConfig, Push, Reply, Request, Settings, SettingsPage, SettingsStore, SettingsUpdate,
    StaticDocument, SummaryResult, SummyError, TabId, TabPort, ViewController, ViewState,
};
