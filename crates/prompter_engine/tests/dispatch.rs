use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};
use std::time::Duration;

use pretty_assertions::assert_eq;
use prompter_engine::{
    run_batch, DispatchSettings, EngineEvent, EventSink, Injector, InjectorFault, ItemLabel,
    Outcome, RunItem, SendSummary,
};
use tokio_util::sync::CancellationToken;

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Call {
    SubmitLine,
    PostText(String),
    AbortLine,
}

/// Injector stub that records every call, plays back scripted text-post
/// results (defaulting to delivered), and can fire a cancellation token
/// from its nth line-submit call.
#[derive(Default)]
struct ScriptedInjector {
    calls: Arc<Mutex<Vec<Call>>>,
    post_results: Mutex<VecDeque<Result<bool, InjectorFault>>>,
    cancel_on_submit: Mutex<Option<(usize, CancellationToken)>>,
}

impl ScriptedInjector {
    fn new() -> Self {
        Self::default()
    }

    fn with_post_results(results: Vec<Result<bool, InjectorFault>>) -> Self {
        Self {
            post_results: Mutex::new(results.into()),
            ..Self::default()
        }
    }

    fn cancel_on_submit(number: usize, token: CancellationToken) -> Self {
        Self {
            cancel_on_submit: Mutex::new(Some((number, token))),
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Injector for ScriptedInjector {
    async fn submit_line(&self) -> Result<bool, InjectorFault> {
        self.calls.lock().unwrap().push(Call::SubmitLine);
        let mut pending = self.cancel_on_submit.lock().unwrap();
        if let Some((remaining, token)) = pending.take() {
            if remaining <= 1 {
                token.cancel();
            } else {
                *pending = Some((remaining - 1, token));
            }
        }
        Ok(true)
    }

    async fn post_text(&self, text: &str) -> Result<bool, InjectorFault> {
        self.calls.lock().unwrap().push(Call::PostText(text.to_string()));
        self.post_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(true))
    }

    async fn abort_line(&self) -> Result<bool, InjectorFault> {
        self.calls.lock().unwrap().push(Call::AbortLine);
        Ok(true)
    }
}

#[derive(Default)]
struct CollectingSink {
    events: Mutex<Vec<EngineEvent>>,
}

impl CollectingSink {
    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for CollectingSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn instant_settings() -> DispatchSettings {
    DispatchSettings {
        settle_delay: Duration::ZERO,
        inter_item_delay: Duration::ZERO,
    }
}

fn plan(texts: &[&str]) -> Vec<RunItem> {
    texts
        .iter()
        .enumerate()
        .map(|(index, text)| RunItem {
            label: ItemLabel::Command { index },
            text: text.to_string(),
        })
        .collect()
}

#[tokio::test]
async fn items_run_in_order_with_the_documented_call_sequence() {
    init_logging();
    let injector = ScriptedInjector::new();
    let sink = CollectingSink::default();
    let cancel = CancellationToken::new();

    let (outcome, summary) = run_batch(
        &plan(&["alias create cmd-0 move x;cmd-1", "alias create cmd-1 move y"]),
        &injector,
        &sink,
        &cancel,
        &instant_settings(),
    )
    .await;

    assert_eq!(outcome, Outcome::Completed);
    assert_eq!(summary, SendSummary { sent: 2, failed: 0 });
    assert_eq!(
        injector.calls(),
        vec![
            Call::SubmitLine,
            Call::PostText("alias create cmd-0 move x;cmd-1".to_string()),
            Call::SubmitLine,
            Call::SubmitLine,
            Call::PostText("alias create cmd-1 move y".to_string()),
            Call::SubmitLine,
        ]
    );
    assert_eq!(
        sink.take(),
        vec![
            EngineEvent::ItemDelivered {
                label: ItemLabel::Command { index: 0 },
                delivered: true,
            },
            EngineEvent::ItemDelivered {
                label: ItemLabel::Command { index: 1 },
                delivered: true,
            },
        ]
    );
}

#[tokio::test]
async fn delivery_failure_is_counted_but_not_fatal() {
    init_logging();
    let injector = ScriptedInjector::with_post_results(vec![Ok(false), Ok(true)]);
    let sink = CollectingSink::default();
    let cancel = CancellationToken::new();

    let (outcome, summary) = run_batch(
        &plan(&["first", "second"]),
        &injector,
        &sink,
        &cancel,
        &instant_settings(),
    )
    .await;

    assert_eq!(outcome, Outcome::Completed);
    assert_eq!(summary, SendSummary { sent: 1, failed: 1 });
    assert_eq!(
        sink.take(),
        vec![
            EngineEvent::ItemDelivered {
                label: ItemLabel::Command { index: 0 },
                delivered: false,
            },
            EngineEvent::ItemDelivered {
                label: ItemLabel::Command { index: 1 },
                delivered: true,
            },
        ]
    );
}

#[tokio::test]
async fn an_injector_fault_interrupts_the_run() {
    init_logging();
    let injector = ScriptedInjector::with_post_results(vec![
        Ok(true),
        Err(InjectorFault::new("target went away")),
    ]);
    let sink = CollectingSink::default();
    let cancel = CancellationToken::new();

    let (outcome, summary) = run_batch(
        &plan(&["first", "second", "third"]),
        &injector,
        &sink,
        &cancel,
        &instant_settings(),
    )
    .await;

    assert_eq!(outcome, Outcome::Interrupted);
    assert_eq!(summary, SendSummary { sent: 1, failed: 0 });
    // The faulting item's trailing submit never happens, and the third item
    // is never attempted.
    assert_eq!(
        injector.calls(),
        vec![
            Call::SubmitLine,
            Call::PostText("first".to_string()),
            Call::SubmitLine,
            Call::SubmitLine,
            Call::PostText("second".to_string()),
        ]
    );
}

#[tokio::test]
async fn a_pre_set_cancellation_sends_nothing() {
    init_logging();
    let injector = ScriptedInjector::new();
    let sink = CollectingSink::default();
    let cancel = CancellationToken::new();
    cancel.cancel();

    let (outcome, summary) = run_batch(
        &plan(&["never sent"]),
        &injector,
        &sink,
        &cancel,
        &instant_settings(),
    )
    .await;

    assert_eq!(outcome, Outcome::Interrupted);
    assert_eq!(summary, SendSummary::default());
    assert_eq!(injector.calls(), Vec::<Call>::new());
    assert_eq!(sink.take(), Vec::<EngineEvent>::new());
}

#[tokio::test]
async fn cancellation_during_the_settle_delay_halts_before_the_text_post() {
    init_logging();
    let cancel = CancellationToken::new();
    let injector = ScriptedInjector::cancel_on_submit(1, cancel.clone());
    let sink = CollectingSink::default();

    let (outcome, summary) = run_batch(
        &plan(&["never posted"]),
        &injector,
        &sink,
        &cancel,
        &instant_settings(),
    )
    .await;

    assert_eq!(outcome, Outcome::Interrupted);
    assert_eq!(summary, SendSummary::default());
    assert_eq!(injector.calls(), vec![Call::SubmitLine]);
}

#[tokio::test]
async fn cancellation_between_items_never_touches_the_next_item() {
    init_logging();
    let cancel = CancellationToken::new();
    // The third submit is the first item's trailing one; the flag is then
    // observed after the inter-item delay, before item two begins.
    let injector = ScriptedInjector::cancel_on_submit(3, cancel.clone());
    let sink = CollectingSink::default();

    let (outcome, summary) = run_batch(
        &plan(&["first", "second"]),
        &injector,
        &sink,
        &cancel,
        &instant_settings(),
    )
    .await;

    assert_eq!(outcome, Outcome::Interrupted);
    assert_eq!(summary, SendSummary { sent: 1, failed: 0 });
    assert_eq!(
        injector.calls(),
        vec![
            Call::SubmitLine,
            Call::PostText("first".to_string()),
            Call::SubmitLine,
        ]
    );
    // The completed first item is still reported.
    assert_eq!(
        sink.take(),
        vec![EngineEvent::ItemDelivered {
            label: ItemLabel::Command { index: 0 },
            delivered: true,
        }]
    );
}

#[tokio::test]
async fn an_empty_plan_completes_immediately() {
    init_logging();
    let injector = ScriptedInjector::new();
    let sink = CollectingSink::default();
    let cancel = CancellationToken::new();

    let (outcome, summary) =
        run_batch(&[], &injector, &sink, &cancel, &instant_settings()).await;

    assert_eq!(outcome, Outcome::Completed);
    assert_eq!(summary, SendSummary::default());
    assert_eq!(injector.calls(), Vec::<Call>::new());
}
