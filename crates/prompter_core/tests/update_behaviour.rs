use std::sync::Once;

use prompter_core::{
    update, AppState, DispatchBatch, Effect, Msg, RunOutcome, RunState,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn edit(state: AppState, content: &str, prefix: &str) -> AppState {
    let (state, _) = update(state, Msg::ContentEdited(content.to_string()));
    let (state, _) = update(state, Msg::AliasPrefixChanged(prefix.to_string()));
    state
}

fn begin_send(state: AppState) -> (AppState, DispatchBatch) {
    let (state, effects) = update(state, Msg::SendClicked);
    match effects.as_slice() {
        [Effect::BeginSend { batch }] => (state, batch.clone()),
        other => panic!("expected BeginSend, got {other:?}"),
    }
}

fn finish(state: AppState, outcome: RunOutcome, sent: usize, failed: usize) -> AppState {
    let (state, effects) = update(state, Msg::RunFinished { outcome, sent, failed });
    assert!(effects.is_empty());
    state
}

#[test]
fn first_send_selects_everything_and_commits_on_completion() {
    init_logging();
    let state = edit(AppState::new(), "move x\nmove y", "cmd");
    let (mut state, batch) = begin_send(state);

    assert_eq!(state.run_state(), RunState::Sending);
    assert_eq!(batch.items.len(), 1);
    assert_eq!(batch.setup, None);
    assert!(state.consume_dirty());

    let mut state = finish(state, RunOutcome::Completed, 1, 0);
    assert_eq!(state.run_state(), RunState::Idle);
    assert!(state.consume_dirty());

    // Nothing changed since the baseline commit, so a second send is a no-op.
    let (state, effects) = update(state, Msg::SendClicked);
    assert!(effects.is_empty());
    assert_eq!(state.run_state(), RunState::Idle);
}

#[test]
fn send_is_rejected_while_a_run_is_active() {
    init_logging();
    let state = edit(AppState::new(), "move x", "cmd");
    let (state, _batch) = begin_send(state);

    let (state, effects) = update(state, Msg::SendClicked);
    assert!(effects.is_empty());
    assert_eq!(state.run_state(), RunState::Sending);

    let (state, effects) = update(state, Msg::ClearClicked);
    assert!(effects.is_empty());
    assert_eq!(state.run_state(), RunState::Sending);
}

#[test]
fn send_with_empty_script_is_a_no_op() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::SendClicked);
    assert!(effects.is_empty());
    assert_eq!(state.run_state(), RunState::Idle);
}

#[test]
fn interrupted_run_keeps_the_previous_baseline() {
    init_logging();
    let state = edit(AppState::new(), "move x", "cmd");
    let (state, first) = begin_send(state);
    let state = finish(state, RunOutcome::Interrupted, 0, 0);

    // The interrupted send committed nothing; the retry selects the same
    // full plan again.
    let (state, retry) = begin_send(state);
    assert_eq!(retry, first);
    assert_eq!(state.run_state(), RunState::Sending);
}

#[test]
fn force_send_bypasses_change_detection() {
    init_logging();
    let state = edit(AppState::new(), "move x\nmove y", "cmd");
    let (state, _batch) = begin_send(state);
    let state = finish(state, RunOutcome::Completed, 1, 0);

    let (state, effects) = update(state, Msg::ForceSendClicked);
    match effects.as_slice() {
        [Effect::BeginSend { batch }] => assert_eq!(batch.items.len(), 1),
        other => panic!("expected BeginSend, got {other:?}"),
    }
    assert_eq!(state.run_state(), RunState::Sending);
}

#[test]
fn edits_during_a_run_only_affect_the_next_run() {
    init_logging();
    let state = edit(AppState::new(), "move x", "cmd");
    let (state, _batch) = begin_send(state);

    // Mid-run edit: recomputed immediately, but the in-flight plan and the
    // pending baseline were captured at send time.
    let (state, effects) = update(state, Msg::ContentEdited("move y".to_string()));
    assert!(effects.is_empty());

    let state = finish(state, RunOutcome::Completed, 1, 0);
    let (_state, batch) = begin_send(state);
    assert_eq!(batch.items.len(), 1);
    assert_eq!(batch.items[0].command, "alias create cmd-0 move y");
}

#[test]
fn context_mode_brackets_the_send() {
    init_logging();
    let state = edit(AppState::new(), "move x", "cmd");
    let (state, _) = update(state, Msg::ContextModeChanged(true));
    let (state, _) = update(state, Msg::ContextNameChanged("grid".to_string()));
    let (state, _) = update(state, Msg::ContextUnitChanged("probe".to_string()));

    let (_state, batch) = begin_send(state);
    assert_eq!(
        batch.setup.as_deref(),
        Some("@context grid;@remove;@spawn probe;@unitvar grid")
    );
    assert_eq!(batch.recall.as_deref(), Some("@context grid;cmd-0"));
}

#[test]
fn clear_sends_deregistration_up_to_the_configured_bound() {
    init_logging();
    let state = edit(AppState::new(), "move x", "cmd");
    let (state, _) = update(state, Msg::ClearMaxIndexChanged(2));
    let (state, effects) = update(state, Msg::ClearClicked);

    assert_eq!(state.run_state(), RunState::Clearing);
    assert_eq!(
        effects,
        vec![Effect::BeginClear {
            commands: vec![
                "alias remove cmd-0".to_string(),
                "alias remove cmd-1".to_string(),
                "alias remove cmd-2".to_string(),
            ],
        }]
    );

    let state = finish(state, RunOutcome::Completed, 3, 0);
    assert_eq!(state.run_state(), RunState::Idle);
}

#[test]
fn clear_without_an_alias_prefix_is_a_no_op() {
    init_logging();
    let state = edit(AppState::new(), "move x", "");
    let (state, effects) = update(state, Msg::ClearClicked);
    assert!(effects.is_empty());
    assert_eq!(state.run_state(), RunState::Idle);
}

#[test]
fn clear_completion_does_not_touch_the_baseline() {
    init_logging();
    let state = edit(AppState::new(), "move x", "cmd");
    let (state, _batch) = begin_send(state);
    let state = finish(state, RunOutcome::Completed, 1, 0);

    let (state, _) = update(state, Msg::ClearClicked);
    let state = finish(state, RunOutcome::Completed, 11, 0);

    // The baseline still matches the sent content, so nothing is pending.
    assert_eq!(state.view().pending_count, 0);
}

#[test]
fn stop_emits_a_cancel_effect_and_stops_the_keepalive() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::KeepaliveToggled);
    assert_eq!(effects, vec![Effect::StartKeepalive { interval_secs: 5 }]);
    assert!(state.keepalive_running());

    let (state, effects) = update(state, Msg::StopClicked);
    assert_eq!(effects, vec![Effect::CancelRuns]);
    assert!(!state.keepalive_running());
}

#[test]
fn keepalive_toggles_between_start_and_stop() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::KeepaliveIntervalChanged(8));
    let (state, effects) = update(state, Msg::KeepaliveToggled);
    assert_eq!(effects, vec![Effect::StartKeepalive { interval_secs: 8 }]);

    let (state, effects) = update(state, Msg::KeepaliveToggled);
    assert_eq!(effects, vec![Effect::StopKeepalive]);
    assert!(!state.keepalive_running());
}

#[test]
fn run_report_is_exposed_to_the_view() {
    init_logging();
    let state = edit(AppState::new(), "move x", "cmd");
    let (state, _batch) = begin_send(state);
    let state = finish(state, RunOutcome::Completed, 1, 0);

    let report = state.view().last_report.expect("report recorded");
    assert_eq!(report.outcome, RunOutcome::Completed);
    assert_eq!(report.sent, 1);
    assert_eq!(report.failed, 0);
}

#[test]
fn stray_run_finished_while_idle_is_ignored() {
    init_logging();
    let before = AppState::new();
    let (after, effects) = update(
        before.clone(),
        Msg::RunFinished {
            outcome: RunOutcome::Completed,
            sent: 1,
            failed: 0,
        },
    );
    assert!(effects.is_empty());
    assert_eq!(after, before);
}
