//! Isolated render scope and the panel it hosts.
//!
//! The scope owns its stylesheet and at most one mounted panel. Nothing
//! outside the scope reads or styles the panel, and clearing the scope tears
//! the panel down completely.

use serde::Serialize;
use summy_types::SummaryResult;

use crate::state::ViewState;
use crate::stress::StressTier;

pub const DEFAULT_STYLESHEET: &str = include_str!("panel.css");

pub const STRESS_TITLE: &str = "Stress Level";
pub const BACK_LABEL: &str = "◂ Back";
pub const ERROR_TITLE: &str = "Summy could not summarize this page";
pub const SETTINGS_LABEL: &str = "Open Summy settings";
pub const SETTINGS_TARGET: &str = "options.html";
pub const INPUT_PLACEHOLDER: &str = "Ask your own question...";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StressIndicator {
    pub title: &'static str,
    pub tier: StressTier,
    pub symbol: &'static str,
    pub label: &'static str,
}

impl StressIndicator {
    pub fn for_score(score: u8) -> Self {
        let tier = StressTier::from_score(score);
        Self {
            title: STRESS_TITLE,
            tier,
            symbol: tier.symbol(),
            label: tier.label(),
        }
    }
}

/// One selectable follow-up question; `index` points into the answers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionItem {
    pub index: usize,
    pub text: String,
}

/// Free-text question field
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct QuestionInput {
    pub value: String,
    pub disabled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SettingsLink {
    pub label: &'static str,
    pub target: &'static str,
}

impl Default for SettingsLink {
    fn default() -> Self {
        Self {
            label: SETTINGS_LABEL,
            target: SETTINGS_TARGET,
        }
    }
}

/// Render tree of the result panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PanelView {
    Summary {
        stress: StressIndicator,
        title: String,
        body: String,
        back_visible: bool,
        questions: Vec<QuestionItem>,
        input: QuestionInput,
        input_placeholder: &'static str,
        emoji_outline: String,
    },
    Error {
        title: &'static str,
        message: String,
        settings_link: SettingsLink,
    },
}

impl PanelView {
    /// Panel for the current state, `None` while no panel is shown
    pub fn render(
        state: &ViewState,
        result: Option<&SummaryResult>,
        input: &QuestionInput,
    ) -> Option<Self> {
        match (state, result) {
            (
                ViewState::Summary {
                    title,
                    body,
                    history,
                },
                Some(result),
            ) => Some(Self::Summary {
                stress: StressIndicator::for_score(result.stress_score),
                title: title.clone(),
                body: body.clone(),
                back_visible: history.is_some(),
                questions: result
                    .questions
                    .iter()
                    .enumerate()
                    .map(|(index, text)| QuestionItem {
                        index,
                        text: text.clone(),
                    })
                    .collect(),
                input: input.clone(),
                input_placeholder: INPUT_PLACEHOLDER,
                emoji_outline: result.emoji_outline.clone(),
            }),
            (ViewState::Error { message }, _) => Some(Self::Error {
                title: ERROR_TITLE,
                message: message.clone(),
                settings_link: SettingsLink::default(),
            }),
            _ => None,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Self::Summary { title, .. } => title,
            Self::Error { title, .. } => title,
        }
    }

    pub fn body(&self) -> &str {
        match self {
            Self::Summary { body, .. } => body,
            Self::Error { message, .. } => message,
        }
    }

    pub fn questions(&self) -> &[QuestionItem] {
        match self {
            Self::Summary { questions, .. } => questions,
            Self::Error { .. } => &[],
        }
    }

    pub fn settings_link(&self) -> Option<&SettingsLink> {
        match self {
            Self::Error { settings_link, .. } => Some(settings_link),
            Self::Summary { .. } => None,
        }
    }

    pub fn back_visible(&self) -> bool {
        matches!(self, Self::Summary { back_visible: true, .. })
    }

    pub fn input(&self) -> Option<&QuestionInput> {
        match self {
            Self::Summary { input, .. } => Some(input),
            Self::Error { .. } => None,
        }
    }

    pub fn stress(&self) -> Option<&StressIndicator> {
        match self {
            Self::Summary { stress, .. } => Some(stress),
            Self::Error { .. } => None,
        }
    }
}

/// The trigger control; lives in its own scope next to the panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Trigger {
    pub visible: bool,
    pub busy: bool,
}

#[derive(Debug, Clone)]
pub struct RenderScope {
    stylesheet: String,
    panel: Option<PanelView>,
    closing: bool,
}

impl Default for RenderScope {
    fn default() -> Self {
        Self::new(DEFAULT_STYLESHEET)
    }
}

impl RenderScope {
    pub fn new(stylesheet: impl Into<String>) -> Self {
        Self {
            stylesheet: stylesheet.into(),
            panel: None,
            closing: false,
        }
    }

    pub fn stylesheet(&self) -> &str {
        &self.stylesheet
    }

    /// Replace whatever is mounted
    pub fn mount(&mut self, panel: PanelView) {
        self.panel = Some(panel);
        self.closing = false;
    }

    pub fn panel(&self) -> Option<&PanelView> {
        self.panel.as_ref()
    }

    /// Start the exit transition. Returns `false` when there is nothing to
    /// close or the transition already runs.
    pub fn begin_closing(&mut self) -> bool {
        if self.panel.is_none() || self.closing {
            return false;
        }
        self.closing = true;
        true
    }

    pub fn is_closing(&self) -> bool {
        self.closing
    }

    /// Tear down the mounted panel
    pub fn clear(&mut self) {
        self.panel = None;
        self.closing = false;
    }

    pub fn is_empty(&self) -> bool {
        self.panel.is_none()
    }
}
