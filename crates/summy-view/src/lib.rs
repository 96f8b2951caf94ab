//! Page-side view of Summy: one [`ViewController`] per tab.

pub mod controller;
pub mod render;
pub mod state;
pub mod stress;

pub use controller::{ViewController, ANSWER_FAILED, ANSWER_PLACEHOLDER, EXIT_TRANSITION};
pub use render::{PanelView, QuestionInput, QuestionItem, RenderScope, SettingsLink, StressIndicator, Trigger};
pub use state::{Snapshot, ViewState};
pub use stress::StressTier;
