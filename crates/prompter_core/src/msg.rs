use crate::{RunOutcome, TabId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Active tab's script text replaced wholesale (debounced by the shell).
    ContentEdited(String),
    /// One line appended to the active tab's script text.
    LineAppended(String),
    /// Active tab's alias prefix changed.
    AliasPrefixChanged(String),
    /// Context mode toggled for the active tab.
    ContextModeChanged(bool),
    ContextNameChanged(String),
    ContextUnitChanged(String),
    /// Create a fresh tab and make it active.
    TabCreated,
    TabSelected(TabId),
    /// Close a tab; refused while its script text is non-empty.
    TabCloseRequested(TabId),
    /// Send the changed subset of the current sequence.
    SendClicked,
    /// Send the entire current sequence, bypassing change detection.
    ForceSendClicked,
    /// Deregister aliases `0..=clear_max_index` in the target.
    ClearClicked,
    ClearMaxIndexChanged(usize),
    /// Stop the in-flight run and the keepalive.
    StopClicked,
    /// Toggle the periodic console keepalive.
    KeepaliveToggled,
    KeepaliveIntervalChanged(u64),
    /// Engine finished a send or clear run.
    RunFinished {
        outcome: RunOutcome,
        sent: usize,
        failed: usize,
    },
    /// UI/render tick to coalesce rendering.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}
