//! Recurring progress poll

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::time::{Instant, MissedTickBehavior};

use crate::messages::NetworkResponse;
use crate::network::service::ProcessingService;

/// Handle to a running poll. Cancelling or dropping it stops further ticks;
/// fetches already in flight still report back.
pub struct PollTask {
    cancel_tx: oneshot::Sender<()>,
}

impl PollTask {
    pub fn cancel(self) {
        let _ = self.cancel_tx.send(());
    }
}

/// Fetch progress every `period`, starting one period from now.
///
/// Every tick spawns its own fetch, so a slow response never delays the
/// next tick. Results are tagged with `generation`.
pub fn spawn_poller(
    service: Arc<dyn ProcessingService>,
    generation: u64,
    period: Duration,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
) -> PollTask {
    let (cancel_tx, mut cancel_rx) = oneshot::channel::<()>();

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tracing::info!(generation, period_ms = period.as_millis() as u64, "Polling started");

        loop {
            tokio::select! {
                biased;

                // Fires on cancel() and on drop of the handle
                _ = &mut cancel_rx => break,

                _ = ticker.tick() => {
                    if response_tx.is_closed() {
                        break;
                    }
                    let service = Arc::clone(&service);
                    let response_tx = response_tx.clone();
                    tokio::spawn(async move {
                        let response = match service.progress().await {
                            Ok(update) => NetworkResponse::Progress { generation, update },
                            Err(e) => NetworkResponse::PollFailed {
                                generation,
                                error: e.to_string(),
                            },
                        };
                        let _ = response_tx.send(response);
                    });
                }
            }
        }

        tracing::info!(generation, "Polling stopped");
    });

    PollTask { cancel_tx }
}
