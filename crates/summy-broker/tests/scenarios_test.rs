//! End-to-end flows: settings page, broker and page views wired together.

mod common;

use common::*;
use std::sync::Arc;
use std::time::Duration;
use summy_broker::{BrokerHandle, SettingsPage};
use summy_types::{tab_channel, Settings, StaticDocument, TabId};
use summy_view::{StressTier, ViewController, ViewState};
use tokio::time::timeout;

const PAGE: &str = "<html><body><article>A sailor crossed the Atlantic alone.</article></body></html>";

async fn open_view(handle: &BrokerHandle, tab: i32, show_button: bool) -> ViewController {
    let (port, inbox) = tab_channel(TabId(tab), Some(Arc::new(StaticDocument(PAGE.into()))));
    let sender = handle.connect(TabId(tab), Arc::new(port)).await;
    ViewController::new(TabId(tab), Arc::new(sender), show_button)
        .with_inbox(inbox)
        .with_exit_transition(Duration::from_millis(1))
}

async fn wait_for_push(view: &mut ViewController) {
    assert!(timeout(WAIT, view.next_push()).await.expect("no push arrived"));
}

#[tokio::test]
async fn scenario_configured_capture_shows_summary() {
    let backend = Arc::new(MockBackend::default());
    let handle = start(configured(), backend.clone()).await;
    let mut view = open_view(&handle, 1, true).await;

    assert!(view.activate_trigger().await);
    assert!(view.state().is_loading());
    wait_for_push(&mut view).await;

    match view.state() {
        ViewState::Summary { title, body, .. } => {
            assert!(!title.is_empty());
            assert!(!body.is_empty());
        }
        other => panic!("unexpected state {:?}", other),
    }
    let panel = view.panel().unwrap();
    assert_eq!(panel.stress().unwrap().tier, StressTier::High);
    assert_eq!(panel.questions().len(), 3);

    assert!(view.ask("Was it cold?").await);
    assert_eq!(view.panel().unwrap().body(), "Answer to: Was it cold?");
    assert_eq!(backend.follow_up_calls(), 1);

    view.close().await;
    assert!(view.scope().is_empty());
    view.unload().await;
    assert!(handle.broker().sessions().is_empty().await);
}

#[tokio::test]
async fn scenario_unconfigured_capture_shows_error_with_settings_link() {
    let backend = Arc::new(MockBackend::default());
    let handle = start(Settings::default(), backend.clone()).await;
    let mut view = open_view(&handle, 2, true).await;

    view.activate_trigger().await;
    wait_for_push(&mut view).await;

    match view.state() {
        ViewState::Error { message } => assert!(!message.is_empty()),
        other => panic!("unexpected state {:?}", other),
    }
    assert_eq!(view.open_settings(), Some("options.html"));
    assert_eq!(backend.summarize_calls(), 0);
}

#[tokio::test]
async fn scenario_toggling_show_button_updates_open_tabs() {
    let handle = start(configured(), Arc::new(MockBackend::default())).await;
    let page = SettingsPage::new(Arc::clone(handle.broker()));
    let mut view = open_view(&handle, 3, true).await;
    assert!(view.trigger_displayed());

    let saved = page.set_show_button(false).await.unwrap();
    assert!(!saved.show_button);
    wait_for_push(&mut view).await;
    assert!(!view.trigger().visible);
    assert!(!view.trigger_displayed());

    page.set_show_button(true).await.unwrap();
    wait_for_push(&mut view).await;
    assert!(view.trigger_displayed());
}

#[tokio::test]
async fn scenario_settings_page_tests_the_connection() {
    let backend = Arc::new(MockBackend::default());
    let handle = start(Settings::default(), backend).await;
    let page = SettingsPage::new(Arc::clone(handle.broker()));

    let status = page.test_connection().await;
    assert!(!status.ok);
    assert!(!status.message.is_empty());

    page.set_model("gpt-4o-mini").await.unwrap();
    page.set_credential("sk-test").await.unwrap();
    let status = page.test_connection().await;
    assert!(status.ok);
    assert!(status.message.contains("confirmed"));

    page.set_model("unknown-model").await.unwrap();
    let status = page.test_connection().await;
    assert!(!status.ok);
    assert!(status.message.contains("verify model name"));

    assert!(page.model_suggestions().contains(&"gpt-4o-mini"));
    let loaded = page.load().await.unwrap();
    assert_eq!(loaded.credential, "sk-test");
}
