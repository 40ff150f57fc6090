use crate::alias::alias_name;

/// One command selected for transmission, tagged with its position in the
/// current sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedItem {
    pub index: usize,
    pub command: String,
}

/// Selects the commands that must be retransmitted: everything past the end
/// of `previous`, plus every index whose text differs.
///
/// An empty `previous` selects all of `current`. Indices are compared
/// positionally only; an edit that shifts chunk boundaries changes the text
/// at every shifted index and resends all of them.
pub fn plan_resend(previous: &[String], current: &[String]) -> Vec<PlannedItem> {
    current
        .iter()
        .enumerate()
        .filter(|(index, command)| {
            *index >= previous.len() || previous[*index] != **command
        })
        .map(|(index, command)| PlannedItem {
            index,
            command: command.clone(),
        })
        .collect()
}

/// Selects the entire current sequence, bypassing change detection.
pub fn plan_full(current: &[String]) -> Vec<PlannedItem> {
    current
        .iter()
        .enumerate()
        .map(|(index, command)| PlannedItem {
            index,
            command: command.clone(),
        })
        .collect()
}

/// Per-tab context-mode settings: when enabled, sends are bracketed by a
/// context-setup command and a context-recall command.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContextSettings {
    pub enabled: bool,
    pub name: String,
    pub unit: String,
}

/// Everything one dispatch attempt will transmit, in order: the optional
/// context setup, the selected commands ascending by index, the optional
/// context recall. Rebuilt per invocation, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DispatchBatch {
    pub setup: Option<String>,
    pub items: Vec<PlannedItem>,
    pub recall: Option<String>,
}

impl DispatchBatch {
    pub fn is_empty(&self) -> bool {
        self.setup.is_none() && self.items.is_empty() && self.recall.is_none()
    }

    /// Total number of commands this batch will transmit.
    pub fn len(&self) -> usize {
        self.items.len()
            + usize::from(self.setup.is_some())
            + usize::from(self.recall.is_some())
    }
}

/// Assembles a dispatch batch from planned items and the tab's context
/// settings.
///
/// The setup command respawns the context unit; the recall command switches
/// back to the context and invokes the first alias, which cascades through
/// the chain. Recall therefore requires a non-blank alias prefix.
pub fn build_batch(
    items: Vec<PlannedItem>,
    context: &ContextSettings,
    alias_prefix: &str,
) -> DispatchBatch {
    let name = context.name.trim();
    let unit = context.unit.trim();
    let prefix = alias_prefix.trim();

    let setup = (context.enabled && !name.is_empty() && !unit.is_empty())
        .then(|| format!("@context {name};@remove;@spawn {unit};@unitvar {name}"));
    let recall = (context.enabled && !name.is_empty() && !prefix.is_empty())
        .then(|| format!("@context {name};{}", alias_name(prefix, 0)));

    DispatchBatch {
        setup,
        items,
        recall,
    }
}
