pub mod config;
pub mod openai;
pub mod traits;
pub mod types;

pub use config::{ClientFactory, ProviderConfig, ProviderType};
pub use openai::OpenAIClient;
pub use traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse, ResponseFormat, TokenUsage};
pub use types::{Content, Message};
