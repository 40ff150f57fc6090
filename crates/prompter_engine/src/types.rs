use std::fmt;

use thiserror::Error;

/// Terminal result of one dispatch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Every item was attempted without cancellation.
    Completed,
    /// Cancellation fired, or the injector faulted, before the last item.
    Interrupted,
}

/// Delivery counts for one run. An item counts as sent when its text-post
/// call reported delivery; line-submit failures around it are logged only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SendSummary {
    pub sent: usize,
    pub failed: usize,
}

/// What an item in a run plan is, for reporting and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemLabel {
    /// Context-setup command preceding the selected chunks.
    ContextSetup,
    /// A selected chunk, tagged with its index in the current sequence.
    Command { index: usize },
    /// Context-recall command trailing the selected chunks.
    ContextRecall,
    /// An alias deregistration command from a clear run.
    AliasRemove { index: usize },
}

impl fmt::Display for ItemLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemLabel::ContextSetup => write!(f, "context setup"),
            ItemLabel::Command { index } => write!(f, "command {index}"),
            ItemLabel::ContextRecall => write!(f, "context recall"),
            ItemLabel::AliasRemove { index } => write!(f, "alias remove {index}"),
        }
    }
}

/// One command in a flattened, ordered run plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunItem {
    pub label: ItemLabel,
    pub text: String,
}

/// Events emitted by the engine while a run is in flight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// One item went through the full per-item protocol; `delivered` is the
    /// text-post result.
    ItemDelivered { label: ItemLabel, delivered: bool },
    /// The run reached a terminal state.
    RunFinished {
        outcome: Outcome,
        summary: SendSummary,
    },
}

/// Unexpected fault from the injector layer, distinct from an ordinary
/// delivery failure. Ends the run as `Interrupted`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("injector fault: {message}")]
pub struct InjectorFault {
    pub message: String,
}

impl InjectorFault {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Rejected attempt to start a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StartError {
    #[error("a dispatch operation is already running")]
    Busy,
}
