//! Prompter core: pure command batching and session state machine.
mod alias;
mod chunk;
mod effect;
mod msg;
mod plan;
mod state;
mod update;
mod view_model;

pub use alias::{alias_chain, alias_name, remove_commands};
pub use chunk::{chunk_script, chunk_script_with_limit, MAX_CHUNK_CHARS};
pub use effect::Effect;
pub use msg::Msg;
pub use plan::{
    build_batch, plan_full, plan_resend, ContextSettings, DispatchBatch, PlannedItem,
};
pub use state::{AppState, RunOutcome, RunReport, RunState, TabId, TabState};
pub use update::update;
pub use view_model::{AppViewModel, CommandRowView, TabRowView};
