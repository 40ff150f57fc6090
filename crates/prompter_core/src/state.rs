use std::collections::BTreeMap;

use crate::alias::alias_chain;
use crate::chunk::chunk_script;
use crate::plan::{plan_resend, ContextSettings};
use crate::view_model::{AppViewModel, CommandRowView, TabRowView};

pub type TabId = u64;

/// Dispatch serialization state: at most one send or clear operation may be
/// active at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Idle,
    Sending,
    Clearing,
}

/// Terminal result of a dispatch run, as reported back by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Completed,
    Interrupted,
}

/// Summary of the most recent finished run, kept for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub sent: usize,
    pub failed: usize,
}

/// One editing session: its script text, alias settings, and the derived
/// command sequence plus the last successfully transmitted baseline.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TabState {
    content: String,
    alias_prefix: String,
    context: ContextSettings,
    /// Current aliased command sequence, recomputed wholesale on every
    /// content or prefix change.
    commands: Vec<String>,
    /// The last fully transmitted command sequence. Replaced atomically on
    /// run completion, never partially updated.
    baseline: Vec<String>,
}

impl TabState {
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn alias_prefix(&self) -> &str {
        &self.alias_prefix
    }

    pub fn context(&self) -> &ContextSettings {
        &self.context
    }

    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    pub fn baseline(&self) -> &[String] {
        &self.baseline
    }

    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }

    fn recompute(&mut self) {
        self.commands = alias_chain(&chunk_script(&self.content), &self.alias_prefix);
    }
}

/// Default upper alias index for the clear operation.
const DEFAULT_CLEAR_MAX_INDEX: usize = 10;

/// Default keepalive pulse interval in seconds.
const DEFAULT_KEEPALIVE_SECS: u64 = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    tabs: BTreeMap<TabId, TabState>,
    active: TabId,
    next_tab_id: TabId,
    run_state: RunState,
    /// Tab addressed by the in-flight run, if any.
    running_tab: Option<TabId>,
    /// Command sequence captured when the in-flight send started; becomes
    /// the tab's baseline if the run completes.
    pending_baseline: Option<Vec<String>>,
    keepalive_running: bool,
    keepalive_interval_secs: u64,
    clear_max_index: usize,
    last_report: Option<RunReport>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        let mut tabs = BTreeMap::new();
        tabs.insert(1, TabState::default());
        Self {
            tabs,
            active: 1,
            next_tab_id: 2,
            run_state: RunState::Idle,
            running_tab: None,
            pending_baseline: None,
            keepalive_running: false,
            keepalive_interval_secs: DEFAULT_KEEPALIVE_SECS,
            clear_max_index: DEFAULT_CLEAR_MAX_INDEX,
            last_report: None,
            dirty: false,
        }
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn active_tab_id(&self) -> TabId {
        self.active
    }

    pub fn active_tab(&self) -> &TabState {
        self.tabs.get(&self.active).expect("active tab exists")
    }

    pub fn keepalive_running(&self) -> bool {
        self.keepalive_running
    }

    pub fn keepalive_interval_secs(&self) -> u64 {
        self.keepalive_interval_secs
    }

    pub fn clear_max_index(&self) -> usize {
        self.clear_max_index
    }

    /// Returns and clears the dirty flag; callers re-render when true.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn active_tab_mut(&mut self) -> &mut TabState {
        self.tabs.get_mut(&self.active).expect("active tab exists")
    }

    pub(crate) fn set_content(&mut self, content: String) {
        let tab = self.active_tab_mut();
        tab.content = content;
        tab.recompute();
        self.dirty = true;
    }

    pub(crate) fn append_line(&mut self, line: &str) {
        let tab = self.active_tab_mut();
        if !tab.content.is_empty() {
            tab.content.push('\n');
        }
        tab.content.push_str(line);
        tab.recompute();
        self.dirty = true;
    }

    pub(crate) fn set_alias_prefix(&mut self, prefix: String) {
        let tab = self.active_tab_mut();
        tab.alias_prefix = prefix;
        tab.recompute();
        self.dirty = true;
    }

    pub(crate) fn set_context_enabled(&mut self, enabled: bool) {
        self.active_tab_mut().context.enabled = enabled;
        self.dirty = true;
    }

    pub(crate) fn set_context_name(&mut self, name: String) {
        self.active_tab_mut().context.name = name;
        self.dirty = true;
    }

    pub(crate) fn set_context_unit(&mut self, unit: String) {
        self.active_tab_mut().context.unit = unit;
        self.dirty = true;
    }

    pub(crate) fn create_tab(&mut self) -> TabId {
        let tab_id = self.next_tab_id;
        self.next_tab_id += 1;
        self.tabs.insert(tab_id, TabState::default());
        self.active = tab_id;
        self.dirty = true;
        tab_id
    }

    pub(crate) fn select_tab(&mut self, tab_id: TabId) -> bool {
        if !self.tabs.contains_key(&tab_id) {
            return false;
        }
        self.active = tab_id;
        self.dirty = true;
        true
    }

    /// Closes a tab. Refused while the tab still holds script text or is
    /// addressed by the in-flight run.
    pub(crate) fn close_tab(&mut self, tab_id: TabId) -> bool {
        let Some(tab) = self.tabs.get(&tab_id) else {
            return false;
        };
        if !tab.is_empty() {
            return false;
        }
        if self.run_state != RunState::Idle && self.running_tab == Some(tab_id) {
            return false;
        }

        self.tabs.remove(&tab_id);
        if self.tabs.is_empty() {
            let fresh = self.next_tab_id;
            self.next_tab_id += 1;
            self.tabs.insert(fresh, TabState::default());
            self.active = fresh;
        } else if self.active == tab_id {
            self.active = *self.tabs.keys().next().expect("tabs non-empty");
        }
        self.dirty = true;
        true
    }

    pub(crate) fn begin_send(&mut self, baseline_snapshot: Vec<String>) {
        self.run_state = RunState::Sending;
        self.running_tab = Some(self.active);
        self.pending_baseline = Some(baseline_snapshot);
        self.dirty = true;
    }

    pub(crate) fn begin_clear(&mut self) {
        self.run_state = RunState::Clearing;
        self.running_tab = Some(self.active);
        self.dirty = true;
    }

    /// Applies a finished run: commits the captured baseline on a completed
    /// send, drops it otherwise, and returns to `Idle`.
    pub(crate) fn finish_run(&mut self, report: RunReport) {
        if self.run_state == RunState::Sending {
            let snapshot = self.pending_baseline.take();
            if report.outcome == RunOutcome::Completed {
                if let (Some(tab_id), Some(baseline)) = (self.running_tab, snapshot) {
                    if let Some(tab) = self.tabs.get_mut(&tab_id) {
                        tab.baseline = baseline;
                    }
                }
            }
        }
        self.run_state = RunState::Idle;
        self.running_tab = None;
        self.last_report = Some(report);
        self.dirty = true;
    }

    pub(crate) fn set_clear_max_index(&mut self, max_index: usize) {
        self.clear_max_index = max_index;
        self.dirty = true;
    }

    pub(crate) fn set_keepalive_running(&mut self, running: bool) {
        self.keepalive_running = running;
        self.dirty = true;
    }

    pub(crate) fn set_keepalive_interval(&mut self, secs: u64) {
        self.keepalive_interval_secs = secs.max(1);
        self.dirty = true;
    }

    pub fn view(&self) -> AppViewModel {
        let active = self.active_tab();
        let tabs = self
            .tabs
            .iter()
            .map(|(tab_id, tab)| TabRowView {
                tab_id: *tab_id,
                name: tab_display_name(*tab_id, tab),
                active: *tab_id == self.active,
                empty: tab.is_empty(),
            })
            .collect();
        let commands = active
            .commands
            .iter()
            .enumerate()
            .map(|(index, command)| CommandRowView {
                index,
                chars: command.chars().count(),
                command: command.clone(),
            })
            .collect();

        AppViewModel {
            run_state: self.run_state,
            active_tab: self.active,
            tabs,
            commands,
            pending_count: plan_resend(&active.baseline, &active.commands).len(),
            keepalive_running: self.keepalive_running,
            keepalive_interval_secs: self.keepalive_interval_secs,
            clear_max_index: self.clear_max_index,
            last_report: self.last_report,
            dirty: self.dirty,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

fn tab_display_name(tab_id: TabId, tab: &TabState) -> String {
    let prefix = tab.alias_prefix.trim();
    if prefix.is_empty() {
        format!("Tab {tab_id}")
    } else {
        prefix.to_string()
    }
}
