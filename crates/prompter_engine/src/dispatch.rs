use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_warn};
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

use crate::{EngineEvent, EventSink, Injector, InjectorFault, Outcome, RunItem, SendSummary};

/// Timing knobs for the per-item protocol. The target offers no
/// acknowledgment channel, so fixed settle delays stand in for one.
#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Pause after each line-submit and after the text post, giving the
    /// target time to process the preceding signal.
    pub settle_delay: Duration,
    /// Pause between consecutive items.
    pub inter_item_delay: Duration,
}

impl Default for DispatchSettings {
    fn default() -> Self {
        Self {
            settle_delay: Duration::from_millis(500),
            inter_item_delay: Duration::from_millis(500),
        }
    }
}

enum ItemOutcome {
    /// The full submit/post/submit protocol ran; `delivered` is the
    /// text-post result.
    Sent { delivered: bool },
    /// A cancellation check fired before the protocol finished.
    Cancelled,
}

/// Drives an ordered run plan through the injector, one item at a time.
///
/// Items are strictly ordered: later commands reference earlier ones by
/// alias name, and the target registers names in arrival order. Only
/// cancellation or an injector fault ends the run early; per-item delivery
/// failures are counted and the run proceeds.
pub async fn run_batch(
    items: &[RunItem],
    injector: &dyn Injector,
    sink: &dyn EventSink,
    cancel: &CancellationToken,
    settings: &DispatchSettings,
) -> (Outcome, SendSummary) {
    let mut summary = SendSummary::default();

    for (position, item) in items.iter().enumerate() {
        engine_debug!("dispatching {} ({} chars)", item.label, item.text.len());
        match send_with_enter_buffer(&item.text, injector, cancel, settings).await {
            Ok(ItemOutcome::Sent { delivered }) => {
                if delivered {
                    summary.sent += 1;
                } else {
                    engine_warn!("{} was not delivered", item.label);
                    summary.failed += 1;
                }
                sink.emit(EngineEvent::ItemDelivered {
                    label: item.label,
                    delivered,
                });
            }
            Ok(ItemOutcome::Cancelled) => {
                engine_debug!("run cancelled before {}", item.label);
                return (Outcome::Interrupted, summary);
            }
            Err(fault) => {
                engine_error!("run aborted at {}: {}", item.label, fault);
                return (Outcome::Interrupted, summary);
            }
        }

        if position + 1 < items.len() {
            sleep(settings.inter_item_delay).await;
            if cancel.is_cancelled() {
                return (Outcome::Interrupted, summary);
            }
        }
    }

    (Outcome::Completed, summary)
}

/// The per-item protocol: line-submit, settle, post the full text, settle,
/// line-submit again. The leading submit flushes whatever input state the
/// target console is in; the trailing one enters the text.
///
/// Cancellation is polled before every injection call and never preempts
/// one mid-flight. Submit failures are logged and ignored — the target may
/// still be receptive even when a single delivery cannot be confirmed.
async fn send_with_enter_buffer(
    text: &str,
    injector: &dyn Injector,
    cancel: &CancellationToken,
    settings: &DispatchSettings,
) -> Result<ItemOutcome, InjectorFault> {
    if cancel.is_cancelled() {
        return Ok(ItemOutcome::Cancelled);
    }
    if !injector.submit_line().await? {
        engine_warn!("leading line submit was not delivered");
    }

    sleep(settings.settle_delay).await;
    if cancel.is_cancelled() {
        return Ok(ItemOutcome::Cancelled);
    }
    let delivered = injector.post_text(text).await?;

    sleep(settings.settle_delay).await;
    if cancel.is_cancelled() {
        return Ok(ItemOutcome::Cancelled);
    }
    if !injector.submit_line().await? {
        engine_warn!("trailing line submit was not delivered");
    }

    Ok(ItemOutcome::Sent { delivered })
}
