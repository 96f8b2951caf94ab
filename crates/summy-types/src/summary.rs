use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SummyError;

/// Number of follow-up questions every summary carries
pub const QUESTION_COUNT: usize = 3;

/// Highest accepted stress score
pub const MAX_STRESS_SCORE: u8 = 10;

/// Structured outcome of summarizing one page.
///
/// The serialized form is the `SummaryResultJSON` carried by `summy_tldr`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub category: String,
    pub summary: String,
    pub stress_score: u8,
    pub emoji_outline: String,
    pub questions: Vec<String>,
    pub answers: Vec<String>,
}

impl SummaryResult {
    /// Parse and validate a `SummaryResultJSON` value
    pub fn from_json(value: Value) -> Result<Self, SummyError> {
        let result: Self =
            serde_json::from_value(value).map_err(|e| SummyError::Parse(e.to_string()))?;
        result.validate()?;
        Ok(result)
    }

    /// Parse and validate raw model output
    pub fn from_json_str(text: &str) -> Result<Self, SummyError> {
        let result: Self =
            serde_json::from_str(text.trim()).map_err(|e| SummyError::Parse(e.to_string()))?;
        result.validate()?;
        Ok(result)
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn validate(&self) -> Result<(), SummyError> {
        if self.stress_score > MAX_STRESS_SCORE {
            return Err(SummyError::Parse(format!(
                "stress_score {} out of range 0-{}",
                self.stress_score, MAX_STRESS_SCORE
            )));
        }
        if self.questions.len() != QUESTION_COUNT {
            return Err(SummyError::Parse(format!(
                "expected {} questions, got {}",
                QUESTION_COUNT,
                self.questions.len()
            )));
        }
        if self.answers.len() != self.questions.len() {
            return Err(SummyError::Parse(format!(
                "{} questions but {} answers",
                self.questions.len(),
                self.answers.len()
            )));
        }
        Ok(())
    }

    /// Questions paired with their answers, in order
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.questions
            .iter()
            .map(String::as_str)
            .zip(self.answers.iter().map(String::as_str))
    }
}
