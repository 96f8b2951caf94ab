use serde::Serialize;

/// Coarse stress level shown next to a summary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StressTier {
    Low,
    Medium,
    High,
}

impl StressTier {
    /// `< 4` is low, `4..7` is medium, `>= 7` is high
    pub fn from_score(score: u8) -> Self {
        match score {
            0..=3 => Self::Low,
            4..=6 => Self::Medium,
            _ => Self::High,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Low => "🙂",
            Self::Medium => "😐",
            Self::High => "😞",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}
