/// Title and body shown before entering a question sub-view
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub title: String,
    pub body: String,
}

/// The view state of one tab
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ViewState {
    #[default]
    Idle,
    Loading,
    Summary {
        title: String,
        body: String,
        /// Set on the first entry into a question sub-view, cleared by back
        history: Option<Snapshot>,
    },
    Error {
        message: String,
    },
}

impl ViewState {
    pub fn summary(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Summary {
            title: title.into(),
            body: body.into(),
            history: None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Loading => "loading",
            Self::Summary { .. } => "summary",
            Self::Error { .. } => "error",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    /// A panel is shown in these states
    pub fn has_panel(&self) -> bool {
        matches!(self, Self::Summary { .. } | Self::Error { .. })
    }

    /// Replace title and body with a question sub-view.
    /// Only the first entry snapshots what was shown before.
    pub fn enter_sub_view(&mut self, new_title: impl Into<String>, new_body: impl Into<String>) -> bool {
        let Self::Summary {
            title,
            body,
            history,
        } = self
        else {
            return false;
        };

        if history.is_none() {
            *history = Some(Snapshot {
                title: title.clone(),
                body: body.clone(),
            });
        }
        *title = new_title.into();
        *body = new_body.into();
        true
    }

    pub fn set_body(&mut self, new_body: impl Into<String>) -> bool {
        match self {
            Self::Summary { body, .. } => {
                *body = new_body.into();
                true
            }
            _ => false,
        }
    }

    /// Restore the snapshot taken on entering the sub-view
    pub fn back(&mut self) -> bool {
        let Self::Summary {
            title,
            body,
            history,
        } = self
        else {
            return false;
        };

        match history.take() {
            Some(snapshot) => {
                *title = snapshot.title;
                *body = snapshot.body;
                true
            }
            None => false,
        }
    }

    pub fn in_sub_view(&self) -> bool {
        matches!(self, Self::Summary { history: Some(_), .. })
    }
}
