use std::sync::Arc;
use summy_broker::{Backend, Broker, BrokerHandle, LlmBackend, SettingsPage};
use summy_llm::ClientFactory;
use summy_persist::{
    ConversationStore, JsonFileStorage, MemoryStorage, SettingsStorage, SettingsStore,
};

use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub broker: BrokerHandle,
    pub settings_page: SettingsPage,
}

impl AppState {
    /// Wire the production backend and settings storage, then start the broker
    pub async fn build(config: Config) -> anyhow::Result<Self> {
        let storage: Arc<dyn SettingsStorage> = match &config.settings.path {
            Some(path) => {
                tracing::info!(path = %path.display(), "using file settings storage");
                Arc::new(JsonFileStorage::new(path.clone()))
            }
            None => {
                tracing::warn!("no settings path configured, settings will not survive restarts");
                Arc::new(MemoryStorage::new())
            }
        };
        let settings = Arc::new(SettingsStore::open(storage).await?);

        let factory = ClientFactory::new(config.llm.clone().into());
        let conversations = Arc::new(ConversationStore::with_limits(
            config.sessions.max_conversations,
            config.sessions.max_messages_per_conversation,
        ));
        let backend: Arc<dyn Backend> =
            Arc::new(LlmBackend::with_conversations(factory, conversations));

        Ok(Self::new(config, settings, backend))
    }

    /// Start a broker over the given pieces
    pub fn new(config: Config, settings: Arc<SettingsStore>, backend: Arc<dyn Backend>) -> Self {
        let broker = Arc::new(Broker::new(settings, backend));
        let settings_page = SettingsPage::new(Arc::clone(&broker));
        let handle = broker.spawn();

        Self {
            config: Arc::new(config),
            broker: handle,
            settings_page,
        }
    }
}
