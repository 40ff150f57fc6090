use std::fs;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use engine_logging::engine_warn;
use prompter_core::{update, AppState, AppViewModel, Msg, RunState};

use super::commands::{parse_line, Command, HELP_TEXT};
use super::effects::EffectRunner;

/// One unit of work for the shell loop: a core message, or a shell-level
/// action with no counterpart in the state machine.
pub enum Input {
    Msg(Msg),
    Save(PathBuf),
    Show,
    Help,
    Quit,
}

pub fn run(script: Option<PathBuf>) -> anyhow::Result<()> {
    let (input_tx, input_rx) = mpsc::channel::<Input>();
    let runner = EffectRunner::new(input_tx.clone());
    let mut state = AppState::new();

    if let Some(path) = script {
        let content = fs::read_to_string(&path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        state = apply(state, Msg::ContentEdited(content), &runner);
    }

    spawn_input_thread(input_tx);

    state.consume_dirty();
    render(&state.view());

    while let Ok(input) = input_rx.recv() {
        match input {
            Input::Msg(msg) => {
                state = apply(state, msg, &runner);
                if state.consume_dirty() {
                    render(&state.view());
                }
            }
            Input::Save(path) => match fs::write(&path, state.active_tab().content()) {
                Ok(()) => println!("saved {}", path.display()),
                Err(err) => {
                    engine_warn!("failed to write script {}: {}", path.display(), err);
                    println!("could not write {}", path.display());
                }
            },
            Input::Show => render(&state.view()),
            Input::Help => println!("{HELP_TEXT}"),
            Input::Quit => break,
        }
    }
    Ok(())
}

fn apply(state: AppState, msg: Msg, runner: &EffectRunner) -> AppState {
    let (state, effects) = update(state, msg);
    runner.run_effects(effects);
    state
}

fn spawn_input_thread(input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let Some(input) = input_for(parse_line(&line)) else {
                continue;
            };
            if input_tx.send(input).is_err() {
                return;
            }
        }
        let _ = input_tx.send(Input::Quit);
    });
}

/// Maps a parsed shell command onto the loop input; `None` means the line
/// was consumed here (blank, unreadable file, unrecognized command).
fn input_for(command: Command) -> Option<Input> {
    let msg = match command {
        Command::Append(text) => {
            if text.trim().is_empty() {
                return None;
            }
            Msg::LineAppended(text)
        }
        Command::Open(path) => match fs::read_to_string(&path) {
            Ok(content) => Msg::ContentEdited(content),
            Err(err) => {
                engine_warn!("failed to read script {}: {}", path.display(), err);
                println!("could not read {}", path.display());
                return None;
            }
        },
        Command::Save(path) => return Some(Input::Save(path)),
        Command::SetAlias(prefix) => Msg::AliasPrefixChanged(prefix),
        Command::ContextMode(enabled) => Msg::ContextModeChanged(enabled),
        Command::ContextName(name) => Msg::ContextNameChanged(name),
        Command::ContextUnit(unit) => Msg::ContextUnitChanged(unit),
        Command::NewTab => Msg::TabCreated,
        Command::SelectTab(tab_id) => Msg::TabSelected(tab_id),
        Command::CloseTab(tab_id) => Msg::TabCloseRequested(tab_id),
        Command::Send => Msg::SendClicked,
        Command::ForceSend => Msg::ForceSendClicked,
        Command::Clear => Msg::ClearClicked,
        Command::SetClearMax(max_index) => Msg::ClearMaxIndexChanged(max_index),
        Command::Stop => Msg::StopClicked,
        Command::Keepalive => Msg::KeepaliveToggled,
        Command::SetKeepaliveSecs(secs) => Msg::KeepaliveIntervalChanged(secs),
        Command::Show => return Some(Input::Show),
        Command::Help => return Some(Input::Help),
        Command::Quit => return Some(Input::Quit),
        Command::Invalid(line) => {
            println!("unrecognized command: {line} (:help lists commands)");
            return None;
        }
    };
    Some(Input::Msg(msg))
}

fn render(view: &AppViewModel) {
    let tabs: Vec<String> = view
        .tabs
        .iter()
        .map(|tab| {
            let marker = if tab.active { "*" } else { "" };
            format!("[{}:{}{}]", tab.tab_id, tab.name, marker)
        })
        .collect();
    println!("-- prompter -----------------------------------");
    println!("tabs: {}", tabs.join(" "));
    println!(
        "state: {} | keepalive {}",
        run_state_label(view.run_state),
        if view.keepalive_running {
            format!("every {}s", view.keepalive_interval_secs)
        } else {
            "off".to_string()
        }
    );
    println!(
        "batch: {} command(s), {} pending, clear bound {}",
        view.commands.len(),
        view.pending_count,
        view.clear_max_index
    );
    for row in &view.commands {
        println!("  [{}] ({} chars) {}", row.index, row.chars, row.command);
    }
    if let Some(report) = &view.last_report {
        println!(
            "last run: {:?} (sent {}, failed {})",
            report.outcome, report.sent, report.failed
        );
    }
}

fn run_state_label(run_state: RunState) -> &'static str {
    match run_state {
        RunState::Idle => "idle",
        RunState::Sending => "sending",
        RunState::Clearing => "clearing",
    }
}
