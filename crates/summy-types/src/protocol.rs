use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SummyError;

/// Requests a page context sends to the broker.
///
/// The protocol is closed: these three kinds plus the [`Push`] kinds are the
/// whole vocabulary between contexts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "msg")]
pub enum Request {
    /// Summarize the page. Answered with an [`Ack`]; the result arrives later
    /// as a [`Push::Tldr`].
    #[serde(rename = "summy_capture")]
    Capture {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        html: Option<String>,
    },

    /// Follow-up question, answered directly with an [`AnswerReply`]
    #[serde(rename = "summy_answer")]
    Answer {
        question: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        html: Option<String>,
    },

    /// The page is going away; release its session
    #[serde(rename = "summy_cleanup")]
    Cleanup,
}

impl Request {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Capture { .. } => "summy_capture",
            Self::Answer { .. } => "summy_answer",
            Self::Cleanup => "summy_cleanup",
        }
    }
}

/// Notifications the broker pushes to a page context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "msg")]
pub enum Push {
    /// Outcome of a capture: exactly one of `result` or `error` is set
    #[serde(rename = "summy_tldr")]
    Tldr {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        result: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        error: Option<String>,
    },

    /// Trigger visibility changed in the settings
    #[serde(rename = "visibility")]
    Visibility { show: bool },
}

impl Push {
    pub fn summary(result: Value) -> Self {
        Self::Tldr {
            result: Some(result),
            error: None,
        }
    }

    pub fn failure(error: &SummyError) -> Self {
        Self::Tldr {
            result: None,
            error: Some(error.to_string()),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Tldr { .. } => "summy_tldr",
            Self::Visibility { .. } => "visibility",
        }
    }
}

/// Direct reply to a [`Request`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reply {
    Answer(AnswerReply),
    Ack(Ack),
}

impl Reply {
    pub fn ack() -> Self {
        Self::Ack(Ack::received())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    pub received: bool,
}

impl Ack {
    pub fn received() -> Self {
        Self { received: true }
    }
}

/// Reply to [`Request::Answer`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerReply {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnswerReply {
    pub fn answered(answer: impl Into<String>) -> Self {
        Self {
            success: true,
            answer: Some(answer.into()),
            error: None,
        }
    }

    pub fn failed(error: &SummyError) -> Self {
        Self {
            success: false,
            answer: None,
            error: Some(error.to_string()),
        }
    }

    /// Collapse into the answer text, or the reported error as a backend failure
    pub fn into_result(self) -> Result<String, SummyError> {
        match (self.success, self.answer) {
            (true, Some(answer)) => Ok(answer),
            _ => Err(SummyError::Backend(
                self.error.unwrap_or_else(|| "No answer".to_string()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_wire_format() {
        let capture = Request::Capture { html: None };
        assert_eq!(serde_json::to_value(&capture).unwrap(), json!({"msg": "summy_capture"}));

        let cleanup: Request = serde_json::from_value(json!({"msg": "summy_cleanup"})).unwrap();
        assert_eq!(cleanup, Request::Cleanup);

        let answer: Request = serde_json::from_value(json!({
            "msg": "summy_answer",
            "question": "Why?"
        }))
        .unwrap();
        assert_eq!(
            answer,
            Request::Answer {
                question: "Why?".to_string(),
                html: None
            }
        );
    }

    #[test]
    fn test_unknown_request_kind_rejected() {
        let result = serde_json::from_value::<Request>(json!({"msg": "summy_delete_everything"}));
        assert!(result.is_err());
    }

    #[test]
    fn test_tldr_carries_result_or_error() {
        let ok = Push::summary(json!({"category": "News"}));
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value["msg"], "summy_tldr");
        assert!(value.get("error").is_none());

        let failed = Push::failure(&SummyError::Backend("quota exceeded".into()));
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["error"], "quota exceeded");
        assert!(value.get("result").is_none());
    }

    #[test]
    fn test_reply_variants_are_distinguishable() {
        let ack: Reply = serde_json::from_value(json!({"received": true})).unwrap();
        assert_eq!(ack, Reply::ack());

        let answer: Reply = serde_json::from_value(json!({"success": true, "answer": "42"})).unwrap();
        assert_eq!(answer, Reply::Answer(AnswerReply::answered("42")));
    }

    #[test]
    fn test_answer_reply_into_result() {
        assert_eq!(AnswerReply::answered("yes").into_result().unwrap(), "yes");

        let err = AnswerReply::failed(&SummyError::missing_credential())
            .into_result()
            .unwrap_err();
        assert!(err.to_string().contains("API key"));
    }
}
