use std::sync::Arc;
use std::time::Duration;
use summy_types::{
    Ack, BrokerPort, DocumentSource, Push, Reply, Request, SummaryResult, SummyError, TabDelivery,
    TabId, TabInbox,
};

use crate::render::{PanelView, QuestionInput, RenderScope, Trigger};
use crate::state::ViewState;

/// Body shown while a free-text answer is pending
pub const ANSWER_PLACEHOLDER: &str = "Thinking about your question...";
/// Body shown when a free-text answer failed
pub const ANSWER_FAILED: &str = "Sorry, something went wrong while answering. Please try again.";

/// Duration of the panel's exit transition
pub const EXIT_TRANSITION: Duration = Duration::from_millis(250);

/// Trigger, panel and view state of one tab.
///
/// Built once per page load. All input (user actions and pushes from the
/// broker) goes through `&mut self`, so the controller sees one event at a
/// time.
pub struct ViewController {
    tab: TabId,
    port: Arc<dyn BrokerPort>,
    inbox: Option<TabInbox>,
    document: Option<Arc<dyn DocumentSource>>,
    state: ViewState,
    result: Option<SummaryResult>,
    input: QuestionInput,
    trigger: Trigger,
    scope: RenderScope,
    show_button: bool,
    exit_transition: Duration,
}

impl ViewController {
    pub fn new(tab: TabId, port: Arc<dyn BrokerPort>, show_button: bool) -> Self {
        Self {
            tab,
            port,
            inbox: None,
            document: None,
            state: ViewState::Idle,
            result: None,
            input: QuestionInput::default(),
            trigger: Trigger {
                visible: show_button,
                busy: false,
            },
            scope: RenderScope::default(),
            show_button,
            exit_transition: EXIT_TRANSITION,
        }
    }

    /// Receive pushes for this tab from `inbox`
    pub fn with_inbox(mut self, inbox: TabInbox) -> Self {
        self.inbox = Some(inbox);
        self
    }

    /// Send the page along with captures instead of letting the broker extract it
    pub fn with_document(mut self, document: Arc<dyn DocumentSource>) -> Self {
        self.document = Some(document);
        self
    }

    pub fn with_exit_transition(mut self, duration: Duration) -> Self {
        self.exit_transition = duration;
        self
    }

    pub fn with_scope(mut self, scope: RenderScope) -> Self {
        self.scope = scope;
        self
    }

    pub fn tab(&self) -> TabId {
        self.tab
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn result(&self) -> Option<&SummaryResult> {
        self.result.as_ref()
    }

    pub fn scope(&self) -> &RenderScope {
        &self.scope
    }

    pub fn panel(&self) -> Option<&PanelView> {
        self.scope.panel()
    }

    pub fn trigger(&self) -> Trigger {
        self.trigger
    }

    /// Whether the trigger is on screen: enabled in the settings and no panel open
    pub fn trigger_displayed(&self) -> bool {
        self.trigger.visible && self.scope.is_empty()
    }

    pub fn show_button(&self) -> bool {
        self.show_button
    }

    /// User clicked the trigger. Ignored unless idle.
    ///
    /// The broker drops a capture silently when it cannot read the page, so
    /// the view then stays `Loading` until its inbox closes.
    pub async fn activate_trigger(&mut self) -> bool {
        if !self.state.is_idle() {
            tracing::debug!(tab = %self.tab, state = self.state.name(), "trigger ignored");
            return false;
        }

        self.state = ViewState::Loading;
        self.trigger.busy = true;

        let html = self.document.as_ref().and_then(|doc| doc.outer_html());
        match self.port.send(Request::Capture { html }).await {
            Ok(_) => true,
            Err(e) => {
                // The capture never reached the broker; nothing will be pushed
                tracing::warn!(tab = %self.tab, error = %e, "capture not sent");
                self.state = ViewState::Idle;
                self.trigger.busy = false;
                false
            }
        }
    }

    /// Apply one push from the broker
    pub fn handle_push(&mut self, push: Push) -> Ack {
        match push {
            Push::Tldr {
                result: Some(value),
                ..
            } => match SummaryResult::from_json(value) {
                Ok(result) => self.show_summary(result),
                Err(e) => self.show_error(e.to_string()),
            },
            Push::Tldr {
                error: Some(message),
                ..
            } => self.show_error(message),
            Push::Tldr { .. } => self.show_error(SummyError::Backend("No answer".into()).to_string()),
            Push::Visibility { show } => {
                self.show_button = show;
                self.trigger.visible = show;
                tracing::debug!(tab = %self.tab, show, "trigger visibility changed");
            }
        }
        Ack::received()
    }

    /// Apply and acknowledge one inbox delivery
    pub fn handle_delivery(&mut self, delivery: TabDelivery) {
        let push = delivery.push.clone();
        let ack = self.handle_push(push);
        delivery.acknowledge(ack);
    }

    /// Wait for the next push and apply it. `false` once the inbox is closed
    /// or absent; a capture still waiting then is given up.
    pub async fn next_push(&mut self) -> bool {
        let Some(inbox) = self.inbox.as_mut() else {
            return false;
        };
        match inbox.recv().await {
            Some(delivery) => {
                self.handle_delivery(delivery);
                true
            }
            None => {
                if self.state.is_loading() {
                    tracing::debug!(tab = %self.tab, "inbox closed while loading");
                    self.state = ViewState::Idle;
                    self.trigger.busy = false;
                }
                false
            }
        }
    }

    /// Apply every push already waiting, without blocking
    pub fn drain_pushes(&mut self) -> usize {
        let mut applied = 0;
        while let Some(delivery) = self.inbox.as_mut().and_then(TabInbox::try_recv) {
            self.handle_delivery(delivery);
            applied += 1;
        }
        applied
    }

    fn show_summary(&mut self, result: SummaryResult) {
        tracing::debug!(tab = %self.tab, category = %result.category, "summary shown");
        self.state = ViewState::summary(&result.category, &result.summary);
        self.result = Some(result);
        self.input = QuestionInput::default();
        self.trigger.busy = false;
        self.render();
    }

    fn show_error(&mut self, message: String) {
        tracing::debug!(tab = %self.tab, "error shown");
        self.state = ViewState::Error { message };
        self.result = None;
        self.trigger.busy = false;
        self.render();
    }

    fn render(&mut self) {
        match PanelView::render(&self.state, self.result.as_ref(), &self.input) {
            Some(panel) => self.scope.mount(panel),
            None => self.scope.clear(),
        }
    }

    /// Show the answer of listed question `index`
    pub fn select_question(&mut self, index: usize) -> bool {
        let Some((question, answer)) = self
            .result
            .as_ref()
            .and_then(|result| result.pairs().nth(index))
            .map(|(q, a)| (q.to_string(), a.to_string()))
        else {
            return false;
        };

        let entered = self.state.enter_sub_view(question, answer);
        if entered {
            self.render();
        }
        entered
    }

    /// Edit the free-text question field
    pub fn type_question(&mut self, text: impl Into<String>) {
        if self.input.disabled {
            return;
        }
        self.input.value = text.into();
        self.render();
    }

    /// Send the free-text question and show its answer
    pub async fn submit_question(&mut self) -> bool {
        let question = self.input.value.trim().to_string();
        if question.is_empty() || self.input.disabled || !matches!(self.state, ViewState::Summary { .. }) {
            return false;
        }

        self.state.enter_sub_view(question.as_str(), ANSWER_PLACEHOLDER);
        self.input.disabled = true;
        self.render();

        let outcome = match self
            .port
            .send(Request::Answer {
                question: question.clone(),
                html: None,
            })
            .await
        {
            Ok(Reply::Answer(reply)) => reply.into_result(),
            Ok(Reply::Ack(_)) => Err(SummyError::Backend("No answer".into())),
            Err(e) => Err(e),
        };

        self.input.disabled = false;
        let answered = match outcome {
            Ok(answer) => {
                self.state.set_body(answer);
                self.input.value.clear();
                true
            }
            Err(e) => {
                tracing::warn!(tab = %self.tab, kind = e.kind(), error = %e, "question failed");
                self.state.set_body(ANSWER_FAILED);
                false
            }
        };
        self.render();
        answered
    }

    /// Type and submit in one step
    pub async fn ask(&mut self, question: impl Into<String>) -> bool {
        self.type_question(question);
        self.submit_question().await
    }

    /// Leave the question sub-view
    pub fn back(&mut self) -> bool {
        let restored = self.state.back();
        if restored {
            self.render();
        }
        restored
    }

    /// Target of the error panel's settings link
    pub fn open_settings(&self) -> Option<&'static str> {
        self.panel()
            .and_then(PanelView::settings_link)
            .map(|link| link.target)
    }

    /// Start the exit transition. `false` if nothing is open or it already runs.
    pub fn begin_close(&mut self) -> bool {
        self.state.has_panel() && self.scope.begin_closing()
    }

    /// Tear down the panel and return to idle. Safe to call repeatedly.
    pub fn finish_close(&mut self) {
        self.scope.clear();
        if self.state.has_panel() {
            self.state = ViewState::Idle;
            self.result = None;
            self.input = QuestionInput::default();
        }
        self.trigger = Trigger {
            visible: self.show_button,
            busy: self.state.is_loading(),
        };
    }

    /// Close the panel: exit transition, then teardown
    pub async fn close(&mut self) {
        if !self.state.has_panel() && !self.scope.is_closing() {
            return;
        }
        self.begin_close();
        if !self.exit_transition.is_zero() {
            tokio::time::sleep(self.exit_transition).await;
        }
        self.finish_close();
        tracing::debug!(tab = %self.tab, "panel closed");
    }

    /// The page is unloading: release the tab's session
    pub async fn unload(&mut self) {
        if let Err(e) = self.port.send(Request::Cleanup).await {
            tracing::debug!(tab = %self.tab, error = %e, "cleanup not delivered");
        }
        if let Some(inbox) = self.inbox.as_mut() {
            inbox.close();
        }
    }
}
