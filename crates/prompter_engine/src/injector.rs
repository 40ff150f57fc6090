use engine_logging::engine_warn;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::InjectorFault;

/// The external capability that delivers text and key signals to the target
/// console.
///
/// Each method's boolean reports whether the call itself was delivered, not
/// whether the target acted on it — the target gives no acknowledgment.
/// Implementations are bound to their target at construction; addressing
/// (window handles, pipes, child processes) is not the caller's concern.
#[async_trait::async_trait]
pub trait Injector: Send + Sync {
    /// Emits a line-submit ("Enter") signal.
    async fn submit_line(&self) -> Result<bool, InjectorFault>;

    /// Delivers literal text in one post operation. Character pacing and
    /// encoding are the implementation's responsibility.
    async fn post_text(&self, text: &str) -> Result<bool, InjectorFault>;

    /// Emits a line-abort ("Escape") signal. Used by the keepalive pulse.
    async fn abort_line(&self) -> Result<bool, InjectorFault>;
}

const LINE_SUBMIT: &[u8] = b"\n";
const LINE_ABORT: &[u8] = &[0x1b];

/// Injector that types into any writable byte pipe: a child process's stdin,
/// a duplex test stream, or this terminal's stdout.
///
/// Line submits are newline writes and line aborts are a literal ESC byte.
/// Write errors are delivery failures, not faults: the pipe's peer may have
/// gone away exactly like an unresponsive target window.
pub struct PipeInjector<W> {
    target: tokio::sync::Mutex<W>,
}

impl<W: AsyncWrite + Unpin + Send> PipeInjector<W> {
    pub fn new(target: W) -> Self {
        Self {
            target: tokio::sync::Mutex::new(target),
        }
    }

    async fn write(&self, bytes: &[u8], what: &str) -> Result<bool, InjectorFault> {
        let mut target = self.target.lock().await;
        let result = async {
            target.write_all(bytes).await?;
            target.flush().await
        }
        .await;

        match result {
            Ok(()) => Ok(true),
            Err(err) => {
                engine_warn!("pipe injector failed to deliver {}: {}", what, err);
                Ok(false)
            }
        }
    }
}

impl PipeInjector<tokio::io::Stdout> {
    /// Injector that types into this process's own terminal, for dry runs.
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

#[async_trait::async_trait]
impl<W: AsyncWrite + Unpin + Send> Injector for PipeInjector<W> {
    async fn submit_line(&self) -> Result<bool, InjectorFault> {
        self.write(LINE_SUBMIT, "line submit").await
    }

    async fn post_text(&self, text: &str) -> Result<bool, InjectorFault> {
        self.write(text.as_bytes(), "text").await
    }

    async fn abort_line(&self) -> Result<bool, InjectorFault> {
        self.write(LINE_ABORT, "line abort").await
    }
}
