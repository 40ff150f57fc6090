use std::sync::Arc;
use std::time::Duration;

use engine_logging::{engine_debug, engine_warn};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::Injector;

/// Periodic console keepalive: alternates a line-submit and a line-abort
/// signal so the target's console prompt does not time out between sends.
///
/// Runs until cancelled or until the injector faults. Unlike the dispatch
/// loop this selects on the token, so a stop takes effect immediately
/// instead of after a potentially long interval.
pub async fn run_keepalive(
    injector: Arc<dyn Injector>,
    cancel: CancellationToken,
    interval: Duration,
) {
    let mut submit_turn = true;
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                engine_debug!("keepalive stopped");
                return;
            }
            _ = sleep(interval) => {}
        }

        let result = if submit_turn {
            injector.submit_line().await
        } else {
            injector.abort_line().await
        };
        match result {
            Ok(delivered) => {
                engine_debug!(
                    "keepalive {} delivered={}",
                    if submit_turn { "submit" } else { "abort" },
                    delivered
                );
            }
            Err(fault) => {
                engine_warn!("keepalive ended on injector fault: {}", fault);
                return;
            }
        }
        submit_turn = !submit_turn;
    }
}
