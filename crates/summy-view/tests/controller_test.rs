use async_trait::async_trait;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use summy_types::{
    tab_channel, AnswerReply, BrokerPort, Push, Reply, Request, Result, StaticDocument, SummyError,
    TabId,
};
use summy_view::{PanelView, StressTier, ViewController, ViewState, ANSWER_FAILED, ANSWER_PLACEHOLDER};

/// Broker stand-in that records requests and replies from a script
#[derive(Default)]
struct ScriptedPort {
    sent: Mutex<Vec<Request>>,
    answer: Mutex<Option<Result<String>>>,
    hang_answers: bool,
    unreachable: bool,
}

impl ScriptedPort {
    fn answering(answer: Result<String>) -> Self {
        Self {
            answer: Mutex::new(Some(answer)),
            ..Default::default()
        }
    }

    fn sent(&self) -> Vec<Request> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl BrokerPort for ScriptedPort {
    async fn send(&self, request: Request) -> Result<Reply> {
        if self.unreachable {
            return Err(SummyError::Delivery("Receiving end does not exist.".into()));
        }
        self.sent.lock().unwrap().push(request.clone());
        match request {
            Request::Answer { .. } => {
                if self.hang_answers {
                    std::future::pending::<()>().await;
                }
                let answer = self.answer.lock().unwrap().take();
                Ok(Reply::Answer(match answer {
                    Some(Ok(text)) => AnswerReply::answered(text),
                    Some(Err(e)) => AnswerReply::failed(&e),
                    None => AnswerReply::failed(&SummyError::Backend("No answer".into())),
                }))
            }
            _ => Ok(Reply::ack()),
        }
    }
}

fn summary_push(stress_score: u8) -> Push {
    Push::summary(json!({
        "category": "Economy",
        "summary": "The economy is showing signs of gradual recovery.",
        "stress_score": stress_score,
        "emoji_outline": "📈 🏦 💶 🏭 🌍",
        "questions": ["What drives it?", "How fast?", "Who benefits?"],
        "answers": ["Lower rates.", "Slowly.", "Exporters."]
    }))
}

fn controller(port: Arc<ScriptedPort>) -> ViewController {
    ViewController::new(TabId(3), port, true).with_exit_transition(Duration::from_millis(1))
}

async fn summarized(port: Arc<ScriptedPort>) -> ViewController {
    let mut view = controller(port);
    assert!(view.activate_trigger().await);
    view.handle_push(summary_push(5));
    view
}

fn title_and_body(view: &ViewController) -> (String, String) {
    let panel = view.panel().unwrap();
    (panel.title().to_string(), panel.body().to_string())
}

#[tokio::test]
async fn test_duplicate_trigger_while_loading_is_ignored() {
    let port = Arc::new(ScriptedPort::default());
    let mut view = controller(port.clone());

    assert!(view.activate_trigger().await);
    assert!(view.state().is_loading());
    assert!(view.trigger().busy);
    assert!(!view.activate_trigger().await);

    assert_eq!(port.sent(), vec![Request::Capture { html: None }]);
}

#[tokio::test]
async fn test_capture_carries_document_when_available() {
    let port = Arc::new(ScriptedPort::default());
    let mut view =
        controller(port.clone()).with_document(Arc::new(StaticDocument("<p>hi</p>".into())));

    view.activate_trigger().await;
    assert_eq!(
        port.sent(),
        vec![Request::Capture {
            html: Some("<p>hi</p>".into())
        }]
    );
}

#[tokio::test]
async fn test_unreachable_broker_returns_to_idle() {
    let port = Arc::new(ScriptedPort {
        unreachable: true,
        ..Default::default()
    });
    let mut view = controller(port);

    assert!(!view.activate_trigger().await);
    assert!(view.state().is_idle());
    assert!(!view.trigger().busy);
}

#[tokio::test]
async fn test_abandoned_capture_returns_to_idle_when_inbox_closes() {
    let (tab_port, inbox) = tab_channel(TabId(3), None);
    let mut view = controller(Arc::new(ScriptedPort::default())).with_inbox(inbox);

    assert!(view.activate_trigger().await);
    assert!(view.state().is_loading());

    drop(tab_port);
    assert!(!view.next_push().await);
    assert!(view.state().is_idle());
    assert!(!view.trigger().busy);
}

#[tokio::test]
async fn test_summary_push_renders_panel() {
    let view = summarized(Arc::new(ScriptedPort::default())).await;

    assert!(matches!(view.state(), ViewState::Summary { history: None, .. }));
    let panel = view.panel().unwrap();
    assert_eq!(panel.title(), "Economy");
    assert_eq!(panel.stress().unwrap().tier, StressTier::Medium);
    assert_eq!(panel.questions().len(), 3);
    assert!(!view.trigger().busy);
    assert!(!view.trigger_displayed());
}

#[tokio::test]
async fn test_each_question_maps_to_its_answer_and_back_restores() {
    let mut view = summarized(Arc::new(ScriptedPort::default())).await;
    let before = title_and_body(&view);
    let result = view.result().unwrap().clone();

    for index in 0..3 {
        assert!(view.select_question(index));
        let (title, body) = title_and_body(&view);
        assert_eq!(title, result.questions[index]);
        assert_eq!(body, result.answers[index]);
        assert!(view.panel().unwrap().back_visible());

        assert!(view.back());
        assert_eq!(title_and_body(&view), before);
        assert!(!view.panel().unwrap().back_visible());
    }
    assert!(!view.select_question(3));
}

#[tokio::test]
async fn test_switching_questions_keeps_original_snapshot() {
    let mut view = summarized(Arc::new(ScriptedPort::default())).await;
    let before = title_and_body(&view);

    view.select_question(0);
    view.select_question(2);
    view.select_question(1);
    view.back();

    assert_eq!(title_and_body(&view), before);
}

#[tokio::test]
async fn test_free_text_success_clears_input() {
    let port = Arc::new(ScriptedPort::answering(Ok("Because of rates.".into())));
    let mut view = summarized(port.clone()).await;

    assert!(view.ask("  Why now?  ").await);
    let panel = view.panel().unwrap();
    assert_eq!(panel.title(), "Why now?");
    assert_eq!(panel.body(), "Because of rates.");
    let input = panel.input().unwrap();
    assert!(!input.disabled);
    assert!(input.value.is_empty());
    assert!(port.sent().contains(&Request::Answer {
        question: "Why now?".into(),
        html: None
    }));

    view.back();
    assert_eq!(view.panel().unwrap().title(), "Economy");
}

#[tokio::test]
async fn test_free_text_failure_keeps_input() {
    let port = Arc::new(ScriptedPort::answering(Err(SummyError::missing_credential())));
    let mut view = summarized(port).await;

    assert!(!view.ask("Why now?").await);
    let panel = view.panel().unwrap();
    assert_eq!(panel.body(), ANSWER_FAILED);
    let input = panel.input().unwrap();
    assert!(!input.disabled);
    assert_eq!(input.value, "Why now?");
}

#[tokio::test]
async fn test_pending_answer_shows_placeholder_and_disables_input() {
    let port = Arc::new(ScriptedPort {
        hang_answers: true,
        ..Default::default()
    });
    let mut view = summarized(port).await;
    view.type_question("Why now?");

    let pending = tokio::time::timeout(Duration::from_millis(20), view.submit_question()).await;
    assert!(pending.is_err());

    let panel = view.panel().unwrap();
    assert_eq!(panel.body(), ANSWER_PLACEHOLDER);
    assert!(panel.input().unwrap().disabled);
}

#[tokio::test]
async fn test_error_push_shows_settings_link() {
    let mut view = controller(Arc::new(ScriptedPort::default()));
    view.activate_trigger().await;
    view.handle_push(Push::failure(&SummyError::missing_model()));

    match view.state() {
        ViewState::Error { message } => assert!(!message.is_empty()),
        other => panic!("unexpected state {:?}", other),
    }
    assert!(matches!(view.panel(), Some(PanelView::Error { .. })));
    assert_eq!(view.open_settings(), Some("options.html"));
}

#[tokio::test]
async fn test_malformed_result_is_an_error() {
    let mut view = controller(Arc::new(ScriptedPort::default()));
    view.activate_trigger().await;
    view.handle_push(Push::summary(json!({"category": "x"})));
    assert!(matches!(view.state(), ViewState::Error { .. }));
}

#[tokio::test]
async fn test_close_is_idempotent() {
    let mut view = summarized(Arc::new(ScriptedPort::default())).await;

    assert!(view.begin_close());
    assert!(!view.begin_close());
    view.close().await;
    view.close().await;
    view.finish_close();

    assert!(view.scope().is_empty());
    assert!(view.state().is_idle());
    assert!(view.trigger_displayed());
}

#[tokio::test]
async fn test_close_honors_current_show_button() {
    let mut view = summarized(Arc::new(ScriptedPort::default())).await;
    view.handle_push(Push::Visibility { show: false });
    assert!(matches!(view.state(), ViewState::Summary { .. }));

    view.close().await;
    assert!(view.state().is_idle());
    assert!(!view.trigger().visible);
    assert!(!view.trigger_displayed());
}

#[tokio::test]
async fn test_visibility_applies_in_every_state() {
    let mut view = controller(Arc::new(ScriptedPort::default()));
    view.handle_push(Push::Visibility { show: false });
    assert!(!view.trigger().visible);

    view.handle_push(Push::Visibility { show: true });
    view.activate_trigger().await;
    view.handle_push(Push::Visibility { show: false });
    assert!(view.state().is_loading());
    assert!(!view.trigger().visible);
}

#[tokio::test]
async fn test_unload_sends_cleanup() {
    let port = Arc::new(ScriptedPort::default());
    let mut view = controller(port.clone());
    view.unload().await;
    assert_eq!(port.sent(), vec![Request::Cleanup]);
}
