//! Network actor - runs uploads, polls and downloads in the Tokio runtime

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;

use crate::messages::{NetworkCommand, NetworkResponse};
use crate::network::poller::{spawn_poller, PollTask};
use crate::network::service::ProcessingService;

/// Network actor that executes commands against the processing service
pub struct NetworkActor {
    service: Arc<dyn ProcessingService>,
    response_tx: mpsc::UnboundedSender<NetworkResponse>,
    active_requests: JoinSet<()>,
    pollers: HashMap<u64, PollTask>,
}

impl NetworkActor {
    pub fn new(
        service: Arc<dyn ProcessingService>,
        response_tx: mpsc::UnboundedSender<NetworkResponse>,
    ) -> Self {
        NetworkActor {
            service,
            response_tx,
            active_requests: JoinSet::new(),
            pollers: HashMap::new(),
        }
    }

    /// Run the network actor message loop
    pub async fn run(mut self, mut cmd_rx: mpsc::UnboundedReceiver<NetworkCommand>) {
        loop {
            tokio::select! {
                biased;

                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(NetworkCommand::Shutdown) | None => {
                            for (_, poller) in self.pollers.drain() {
                                poller.cancel();
                            }
                            break;
                        }
                        Some(cmd) => self.handle_command(cmd),
                    }
                }

                // Clean up completed tasks
                Some(_result) = self.active_requests.join_next() => {}
            }
        }
    }

    fn handle_command(&mut self, cmd: NetworkCommand) {
        let service = Arc::clone(&self.service);
        let response_tx = self.response_tx.clone();

        match cmd {
            NetworkCommand::Submit { generation, file } => {
                self.active_requests.spawn(async move {
                    tracing::info!(generation, file = %file.path.display(), "Submitting video");
                    let response = match service.submit(&file).await {
                        Ok(()) => NetworkResponse::Submitted { generation },
                        Err(e) => NetworkResponse::SubmitFailed {
                            generation,
                            error: e.to_string(),
                        },
                    };
                    let _ = response_tx.send(response);
                });
            }

            NetworkCommand::StartPolling { generation, period } => {
                let poller = spawn_poller(service, generation, period, response_tx);
                // A replaced handle is dropped, which stops it
                self.pollers.insert(generation, poller);
            }

            NetworkCommand::StopPolling(generation) => {
                if let Some(poller) = self.pollers.remove(&generation) {
                    poller.cancel();
                } else {
                    tracing::debug!(generation, "No poll to stop");
                }
            }

            NetworkCommand::Play { output } => {
                self.active_requests.spawn(async move {
                    tracing::info!(output = %output, "Requesting playback");
                    let response = match service.play(&output).await {
                        Ok(()) => NetworkResponse::Played,
                        Err(e) => NetworkResponse::PlayFailed { error: e.to_string() },
                    };
                    let _ = response_tx.send(response);
                });
            }

            NetworkCommand::Download { output, dest_dir } => {
                self.active_requests.spawn(async move {
                    tracing::info!(output = %output, dest = %dest_dir.display(), "Downloading output");
                    let response = match service.download(&output, &dest_dir).await {
                        Ok(path) => NetworkResponse::Downloaded { path },
                        Err(e) => NetworkResponse::DownloadFailed { error: e.to_string() },
                    };
                    let _ = response_tx.send(response);
                });
            }

            NetworkCommand::CheckServer => {
                self.active_requests.spawn(async move {
                    let response = match service.server_status().await {
                        Ok(status) => NetworkResponse::ServerStatus(status),
                        Err(e) => NetworkResponse::ServerUnreachable { error: e.to_string() },
                    };
                    let _ = response_tx.send(response);
                });
            }

            NetworkCommand::Shutdown => {}
        }
    }
}
