//! Prompter engine: cancellable sequential dispatch over an input injector.
mod dispatch;
mod engine;
mod injector;
mod keepalive;
mod sink;
mod types;

pub use dispatch::{run_batch, DispatchSettings};
pub use engine::EngineHandle;
pub use injector::{Injector, PipeInjector};
pub use sink::EventSink;
pub use types::{
    EngineEvent, InjectorFault, ItemLabel, Outcome, RunItem, SendSummary, StartError,
};
