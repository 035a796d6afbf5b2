//! Rotating status messages while a generation call is pending

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::events::{EventSink, SessionEvent};
use crate::prompts::PROGRESS_MESSAGES;

const MIN_INTERVAL: Duration = Duration::from_millis(10);

/// Background task that emits `SessionEvent::Progress` on a fixed interval.
///
/// The first message goes out immediately. Messages cycle through
/// [`PROGRESS_MESSAGES`] until the ticker is stopped or dropped.
pub struct ProgressTicker {
    cancel: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ProgressTicker {
    /// Spawn the ticker on the current tokio runtime
    pub fn start(sink: Arc<dyn EventSink>, interval: Duration) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let period = interval.max(MIN_INTERVAL);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            for message in PROGRESS_MESSAGES.iter().cycle() {
                tokio::select! {
                    biased;
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if let Err(e) = sink.send(SessionEvent::progress(message)) {
                            log::debug!("Progress ticker stopping: {}", e);
                            break;
                        }
                    }
                }
            }
        });

        Self {
            cancel,
            handle: Some(handle),
        }
    }

    /// Stop the ticker and wait for the task to finish
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                log::warn!("Progress ticker task failed: {}", e);
            }
        }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::VecEventSink;

    fn messages(sink: &VecEventSink) -> Vec<String> {
        sink.events()
            .into_iter()
            .filter_map(|event| match event {
                SessionEvent::Progress { message } => Some(message),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn test_rotates_messages_until_stopped() {
        let sink = Arc::new(VecEventSink::new());
        let ticker = ProgressTicker::start(sink.clone(), Duration::from_millis(15));

        tokio::time::sleep(Duration::from_millis(50)).await;
        ticker.stop().await;

        let seen = messages(&sink);
        assert!(seen.len() >= 2, "expected several ticks, got {:?}", seen);
        for (i, message) in seen.iter().enumerate() {
            assert_eq!(message, PROGRESS_MESSAGES[i % PROGRESS_MESSAGES.len()]);
        }

        let count = seen.len();
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(messages(&sink).len(), count);
    }

    #[tokio::test]
    async fn test_drop_stops_ticker() {
        let sink = Arc::new(VecEventSink::new());
        let ticker = ProgressTicker::start(sink.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(25)).await;
        drop(ticker);

        tokio::time::sleep(Duration::from_millis(5)).await;
        let count = messages(&sink).len();
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(messages(&sink).len(), count);
    }
}
