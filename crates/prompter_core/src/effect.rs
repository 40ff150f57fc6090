use crate::plan::DispatchBatch;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Transmit the batch captured at send time. The batch is the plan for
    /// this run; edits made while it is in flight affect only the next run.
    BeginSend { batch: DispatchBatch },
    /// Transmit alias deregistration commands.
    BeginClear { commands: Vec<String> },
    /// Cancel the in-flight run and the keepalive.
    CancelRuns,
    StartKeepalive { interval_secs: u64 },
    StopKeepalive,
}
