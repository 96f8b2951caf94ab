use async_trait::async_trait;
use std::sync::Arc;
use summy_llm::{ChatClient, ChatOptions, ChatRequest, ClientFactory, Message, ResponseFormat};
use summy_persist::ConversationStore;
use summy_types::{ConversationHandle, Result, SummaryResult, SummyError};

use crate::backend::Backend;
use crate::extract::extract_text;
use crate::prompts;

const VERIFY_FAILED: &str = "Could not access LLM. Please verify model name and API key.";
const VERIFY_SILENT: &str = "Access worked but the model did not answer.";
const NO_CONVERSATION: &str = "Please summarize the page before asking questions.";
const NO_TEXT: &str = "The page has no readable text to summarize.";
const NO_ANSWER: &str = "No answer";

/// [`Backend`] talking to an OpenAI-compatible chat completions endpoint.
///
/// Clients are built per call because the credential lives in the user's
/// settings and may change between requests.
pub struct LlmBackend {
    factory: ClientFactory,
    conversations: Arc<ConversationStore>,
}

impl LlmBackend {
    pub fn new(factory: ClientFactory) -> Self {
        Self::with_conversations(factory, Arc::new(ConversationStore::new()))
    }

    pub fn with_conversations(factory: ClientFactory, conversations: Arc<ConversationStore>) -> Self {
        Self {
            factory,
            conversations,
        }
    }

    pub fn conversations(&self) -> &ConversationStore {
        &self.conversations
    }

    fn client(&self, credential: &str) -> Result<Arc<dyn ChatClient>> {
        self.factory
            .create_chat_client(credential)
            .map_err(|e| SummyError::Backend(format!("Error: {:#}", e)))
    }

    fn summary_options(&self) -> ChatOptions {
        let format = if self.factory.config().provider.supports_json_schema() {
            ResponseFormat::JsonSchema {
                name: prompts::SUMMARY_SCHEMA_NAME.to_string(),
                schema: prompts::summary_schema(),
            }
        } else {
            ResponseFormat::JsonObject
        };
        ChatOptions::new().response_format(format)
    }
}

/// Sends one request and returns the trimmed answer
async fn ask(
    client: &dyn ChatClient,
    model: &str,
    messages: Vec<Message>,
    options: ChatOptions,
) -> Result<String> {
    let response = client
        .chat(ChatRequest::new(model, messages).with_options(options))
        .await
        .map_err(|e| {
            tracing::error!(model = %model, error = %e, "chat completion failed");
            SummyError::Backend(format!("Error: {:#}", e))
        })?;

    response
        .text()
        .map(str::to_string)
        .ok_or_else(|| SummyError::Backend(NO_ANSWER.to_string()))
}

/// Some models wrap JSON mode output in a markdown fence
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    match text.strip_prefix("```") {
        Some(rest) => rest
            .trim_start_matches("json")
            .trim_end()
            .trim_end_matches("```")
            .trim(),
        None => text,
    }
}

#[async_trait]
impl Backend for LlmBackend {
    async fn summarize(
        &self,
        handle: ConversationHandle,
        document: &str,
        model: &str,
        credential: &str,
    ) -> Result<SummaryResult> {
        let text = extract_text(document);
        if text.is_empty() {
            return Err(SummyError::Backend(NO_TEXT.to_string()));
        }
        tracing::debug!(handle = %handle, chars = text.len(), "extracted page text");

        let client = self.client(credential)?;
        let messages = vec![
            Message::system(prompts::SUMMARIZE_SYSTEM_PROMPT),
            Message::human(text.as_str()),
        ];
        let raw = ask(client.as_ref(), model, messages, self.summary_options()).await?;
        let result = SummaryResult::from_json_str(strip_code_fence(&raw))?;

        self.conversations.create(
            handle,
            vec![
                Message::system(prompts::ANSWER_SYSTEM_PROMPT),
                Message::human(prompts::context_prompt(&text)),
            ],
        );
        tracing::info!(handle = %handle, category = %result.category, "page summarized");
        Ok(result)
    }

    async fn follow_up(
        &self,
        handle: ConversationHandle,
        question: &str,
        model: &str,
        credential: &str,
    ) -> Result<String> {
        let mut messages = self
            .conversations
            .context_window(&handle)
            .ok_or_else(|| SummyError::Backend(NO_CONVERSATION.to_string()))?;

        let client = self.client(credential)?;
        let language = ask(
            client.as_ref(),
            model,
            vec![
                Message::system(prompts::DETECT_LANGUAGE_PROMPT),
                Message::human(question),
            ],
            ChatOptions::new(),
        )
        .await
        .map_err(|e| SummyError::Backend(format!("Error detecting language: {}", e)))?;
        tracing::debug!(handle = %handle, language = %language, "question language detected");

        let prompt = prompts::question_prompt(&language, question);
        messages.push(Message::human(prompt.as_str()));
        let answer = ask(client.as_ref(), model, messages, ChatOptions::new()).await?;

        self.conversations
            .append(&handle, [Message::human(prompt), Message::ai(answer.as_str())]);
        Ok(answer)
    }

    async fn cleanup(&self, handle: ConversationHandle) {
        if self.conversations.remove(&handle) {
            tracing::debug!(handle = %handle, "conversation dropped");
        }
    }

    async fn verify_access(&self, model: &str, credential: &str) -> Result<String> {
        let client = self
            .client(credential)
            .map_err(|_| SummyError::Backend(VERIFY_FAILED.to_string()))?;
        let request = ChatRequest::new(
            model,
            vec![
                Message::system(prompts::VERIFY_SYSTEM_PROMPT),
                Message::human(prompts::VERIFY_USER_PROMPT),
            ],
        );

        match client.chat(request).await {
            Ok(response) => match response.text() {
                Some(text) => Ok(text.to_string()),
                None => {
                    tracing::warn!(model = %model, "{}", VERIFY_SILENT);
                    Err(SummyError::Backend(VERIFY_SILENT.to_string()))
                }
            },
            Err(e) => {
                tracing::warn!(model = %model, error = %e, "error verifying LLM access");
                Err(SummyError::Backend(VERIFY_FAILED.to_string()))
            }
        }
    }
}
