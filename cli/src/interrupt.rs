//! Ctrl-C handling for the interactive loop
//!
//! One listener lives for the whole session. Once tokio owns SIGINT the
//! default handler never comes back, so every interrupt is routed through
//! here: it cancels the pending request, or ends the loop when idle.

use std::future::Future;

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub struct Interrupts {
    receiver: mpsc::UnboundedReceiver<()>,
    /// Parent of every per-request token
    shutdown: CancellationToken,
}

impl Interrupts {
    /// Install the process-wide Ctrl-C listener
    pub fn listen() -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                if sender.send(()).is_err() {
                    break;
                }
            }
            log::debug!("Ctrl-C listener stopped");
        });
        Self::new(receiver)
    }

    pub fn new(receiver: mpsc::UnboundedReceiver<()>) -> Self {
        Self {
            receiver,
            shutdown: CancellationToken::new(),
        }
    }

    /// Token for one request; cancelled by the next interrupt
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    /// Wait for an interrupt while idle. Never resolves once the listener is gone.
    pub async fn interrupted(&mut self) {
        if self.receiver.recv().await.is_none() {
            std::future::pending::<()>().await;
        }
    }

    /// Drive `work` to completion, cancelling `cancel` on the first interrupt
    pub async fn guard<F: Future>(&mut self, cancel: &CancellationToken, work: F) -> F::Output {
        tokio::pin!(work);
        loop {
            tokio::select! {
                output = &mut work => return output,
                received = self.receiver.recv(), if !cancel.is_cancelled() => match received {
                    Some(()) => {
                        log::info!("Interrupt received, cancelling request");
                        cancel.cancel();
                    }
                    None => return work.await,
                },
            }
        }
    }
}

impl Drop for Interrupts {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
