use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use prompter_core::{DispatchBatch, Effect, Msg, RunOutcome};
use prompter_engine::{
    DispatchSettings, EngineEvent, EngineHandle, ItemLabel, Outcome, PipeInjector, RunItem,
    StartError,
};

use super::app::Input;

/// Executes core effects against the engine and pumps engine events back
/// into the shell as messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(input_tx: mpsc::Sender<Input>) -> Self {
        // Dry-run target: the injector types into this terminal. A real
        // deployment swaps in an injector bound to the target console.
        let injector = Arc::new(PipeInjector::stdout());
        let (engine, event_rx) = EngineHandle::new(injector, DispatchSettings::default());
        spawn_event_loop(event_rx, input_tx);
        Self { engine }
    }

    pub fn run_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::BeginSend { batch } => {
                    engine_info!("send run: {} command(s)", batch.len());
                    self.begin_run(batch_items(batch));
                }
                Effect::BeginClear { commands } => {
                    engine_info!("clear run: {} command(s)", commands.len());
                    self.begin_run(clear_items(commands));
                }
                Effect::CancelRuns => {
                    engine_info!("stop requested");
                    self.engine.stop();
                }
                Effect::StartKeepalive { interval_secs } => {
                    self.engine
                        .start_keepalive(Duration::from_secs(interval_secs));
                }
                Effect::StopKeepalive => {
                    self.engine.stop_keepalive();
                }
            }
        }
    }

    fn begin_run(&self, items: Vec<RunItem>) {
        if let Err(StartError::Busy) = self.engine.begin_run(items) {
            // The state machine serializes runs, so this only fires if the
            // two ever get out of step; log it rather than wedge the shell.
            engine_warn!("engine rejected run start while busy");
        }
    }
}

fn spawn_event_loop(event_rx: mpsc::Receiver<EngineEvent>, input_tx: mpsc::Sender<Input>) {
    thread::spawn(move || {
        while let Ok(event) = event_rx.recv() {
            match event {
                EngineEvent::ItemDelivered { label, delivered } => {
                    engine_info!("{} delivered={}", label, delivered);
                }
                EngineEvent::RunFinished { outcome, summary } => {
                    engine_info!(
                        "run finished: {:?} (sent {}, failed {})",
                        outcome,
                        summary.sent,
                        summary.failed
                    );
                    let msg = Msg::RunFinished {
                        outcome: map_outcome(outcome),
                        sent: summary.sent,
                        failed: summary.failed,
                    };
                    if input_tx.send(Input::Msg(msg)).is_err() {
                        return;
                    }
                }
            }
        }
    });
}

fn map_outcome(outcome: Outcome) -> RunOutcome {
    match outcome {
        Outcome::Completed => RunOutcome::Completed,
        Outcome::Interrupted => RunOutcome::Interrupted,
    }
}

fn batch_items(batch: DispatchBatch) -> Vec<RunItem> {
    let mut items = Vec::with_capacity(batch.len());
    if let Some(setup) = batch.setup {
        items.push(RunItem {
            label: ItemLabel::ContextSetup,
            text: setup,
        });
    }
    for planned in batch.items {
        items.push(RunItem {
            label: ItemLabel::Command {
                index: planned.index,
            },
            text: planned.command,
        });
    }
    if let Some(recall) = batch.recall {
        items.push(RunItem {
            label: ItemLabel::ContextRecall,
            text: recall,
        });
    }
    items
}

fn clear_items(commands: Vec<String>) -> Vec<RunItem> {
    commands
        .into_iter()
        .enumerate()
        .map(|(index, text)| RunItem {
            label: ItemLabel::AliasRemove { index },
            text,
        })
        .collect()
}
