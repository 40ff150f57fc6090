use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::dispatch::{run_batch, DispatchSettings};
use crate::keepalive::run_keepalive;
use crate::sink::ChannelEventSink;
use crate::{EngineEvent, EventSink, Injector, RunItem, StartError};

enum EngineCommand {
    Run {
        items: Vec<RunItem>,
        cancel: CancellationToken,
    },
    StartKeepalive {
        interval: Duration,
        cancel: CancellationToken,
    },
}

/// Handle to the dispatch engine: a background thread that owns a tokio
/// runtime and executes runs strictly one at a time.
///
/// Runs are serialized on the worker thread; `begin_run` refuses to start a
/// second one while the first is in flight. The keepalive is spawned as an
/// independent task on the same runtime and survives across runs until
/// stopped or cancelled.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    busy: Arc<AtomicBool>,
    run_cancel: Mutex<CancellationToken>,
    keepalive_cancel: Mutex<Option<CancellationToken>>,
}

impl EngineHandle {
    /// Spawns the engine worker. Returns the handle and the event channel
    /// the worker reports through.
    pub fn new(
        injector: Arc<dyn Injector>,
        settings: DispatchSettings,
    ) -> (Self, mpsc::Receiver<EngineEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::channel::<EngineCommand>();
        let (event_tx, event_rx) = mpsc::channel::<EngineEvent>();
        let busy = Arc::new(AtomicBool::new(false));

        let worker_busy = busy.clone();
        thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("tokio runtime");
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Run { items, cancel } => {
                        let sink = ChannelEventSink::new(event_tx.clone());
                        let (outcome, summary) = runtime.block_on(run_batch(
                            &items,
                            injector.as_ref(),
                            &sink,
                            &cancel,
                            &settings,
                        ));
                        // Clear the guard before reporting so a caller that
                        // reacts to RunFinished can start the next run.
                        worker_busy.store(false, Ordering::Release);
                        sink.emit(EngineEvent::RunFinished { outcome, summary });
                    }
                    EngineCommand::StartKeepalive { interval, cancel } => {
                        let injector = injector.clone();
                        runtime.spawn(run_keepalive(injector, cancel, interval));
                    }
                }
            }
        });

        let handle = Self {
            cmd_tx,
            busy,
            run_cancel: Mutex::new(CancellationToken::new()),
            keepalive_cancel: Mutex::new(None),
        };
        (handle, event_rx)
    }

    /// Starts a send or clear run with a fresh cancellation token.
    ///
    /// Refused while another run is in flight; the rejected start changes
    /// no state and is never queued.
    pub fn begin_run(&self, items: Vec<RunItem>) -> Result<(), StartError> {
        if self.busy.swap(true, Ordering::AcqRel) {
            return Err(StartError::Busy);
        }
        let cancel = CancellationToken::new();
        *self.run_cancel.lock().expect("run token lock") = cancel.clone();
        let _ = self.cmd_tx.send(EngineCommand::Run { items, cancel });
        Ok(())
    }

    /// Whether a send or clear run is currently in flight.
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Cancels the in-flight run, if any, and the keepalive.
    ///
    /// Cancellation is cooperative: the run observes it at its next
    /// suspension point and reports `Interrupted` through the event channel.
    pub fn stop(&self) {
        self.run_cancel.lock().expect("run token lock").cancel();
        if let Some(token) = self.keepalive_cancel.lock().expect("keepalive lock").take() {
            token.cancel();
        }
    }

    /// Starts (or restarts) the periodic keepalive pulse.
    pub fn start_keepalive(&self, interval: Duration) {
        let cancel = CancellationToken::new();
        let previous = self
            .keepalive_cancel
            .lock()
            .expect("keepalive lock")
            .replace(cancel.clone());
        if let Some(token) = previous {
            token.cancel();
        }
        let _ = self
            .cmd_tx
            .send(EngineCommand::StartKeepalive { interval, cancel });
    }

    /// Stops the keepalive pulse without touching an in-flight run.
    pub fn stop_keepalive(&self) {
        if let Some(token) = self.keepalive_cancel.lock().expect("keepalive lock").take() {
            token.cancel();
        }
    }
}
