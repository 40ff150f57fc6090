use crate::alias::remove_commands;
use crate::plan::{build_batch, plan_full, plan_resend};
use crate::{AppState, Effect, Msg, RunReport, RunState};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::ContentEdited(content) => {
            state.set_content(content);
            Vec::new()
        }
        Msg::LineAppended(line) => {
            state.append_line(&line);
            Vec::new()
        }
        Msg::AliasPrefixChanged(prefix) => {
            state.set_alias_prefix(prefix);
            Vec::new()
        }
        Msg::ContextModeChanged(enabled) => {
            state.set_context_enabled(enabled);
            Vec::new()
        }
        Msg::ContextNameChanged(name) => {
            state.set_context_name(name);
            Vec::new()
        }
        Msg::ContextUnitChanged(unit) => {
            state.set_context_unit(unit);
            Vec::new()
        }
        Msg::TabCreated => {
            state.create_tab();
            Vec::new()
        }
        Msg::TabSelected(tab_id) => {
            state.select_tab(tab_id);
            Vec::new()
        }
        Msg::TabCloseRequested(tab_id) => {
            state.close_tab(tab_id);
            Vec::new()
        }
        Msg::SendClicked => start_send(&mut state, false),
        Msg::ForceSendClicked => start_send(&mut state, true),
        Msg::ClearClicked => {
            if state.run_state() != RunState::Idle {
                return (state, Vec::new());
            }
            let commands = remove_commands(
                state.active_tab().alias_prefix(),
                state.clear_max_index(),
            );
            if commands.is_empty() {
                return (state, Vec::new());
            }
            state.begin_clear();
            vec![Effect::BeginClear { commands }]
        }
        Msg::ClearMaxIndexChanged(max_index) => {
            state.set_clear_max_index(max_index);
            Vec::new()
        }
        Msg::StopClicked => {
            if state.keepalive_running() {
                state.set_keepalive_running(false);
            }
            vec![Effect::CancelRuns]
        }
        Msg::KeepaliveToggled => {
            if state.keepalive_running() {
                state.set_keepalive_running(false);
                vec![Effect::StopKeepalive]
            } else {
                state.set_keepalive_running(true);
                vec![Effect::StartKeepalive {
                    interval_secs: state.keepalive_interval_secs(),
                }]
            }
        }
        Msg::KeepaliveIntervalChanged(secs) => {
            state.set_keepalive_interval(secs);
            Vec::new()
        }
        Msg::RunFinished {
            outcome,
            sent,
            failed,
        } => {
            if state.run_state() == RunState::Idle {
                // Stray completion from a run this state never started.
                return (state, Vec::new());
            }
            state.finish_run(RunReport {
                outcome,
                sent,
                failed,
            });
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

/// Entry guard plus plan capture for a send run. Refused while another run
/// is active; selecting nothing (and no context bracket) is a no-op.
fn start_send(state: &mut AppState, force: bool) -> Vec<Effect> {
    if state.run_state() != RunState::Idle {
        return Vec::new();
    }
    let tab = state.active_tab();
    if tab.commands().is_empty() {
        return Vec::new();
    }

    let items = if force {
        plan_full(tab.commands())
    } else {
        plan_resend(tab.baseline(), tab.commands())
    };
    let batch = build_batch(items, tab.context(), tab.alias_prefix());
    if batch.is_empty() {
        return Vec::new();
    }

    let snapshot = tab.commands().to_vec();
    state.begin_send(snapshot);
    vec![Effect::BeginSend { batch }]
}
