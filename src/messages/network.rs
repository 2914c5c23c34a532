//! Network messages - communication between App and Network layers

use std::path::PathBuf;
use std::time::Duration;

use crate::models::{ProgressUpdate, SelectedFile, ServerStatus};

/// Commands sent from App layer to Network layer
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkCommand {
    /// Upload a file to the processing endpoint
    Submit {
        generation: u64,
        file: SelectedFile,
    },
    /// Start the recurring progress poll for a cycle
    StartPolling {
        generation: u64,
        period: Duration,
    },
    /// Cancel the poll for a cycle (no-op if it is not running)
    StopPolling(u64),
    /// Ask the server to open the output in its player
    Play { output: String },
    /// Save the output under `dest_dir`
    Download { output: String, dest_dir: PathBuf },
    /// Query server health and version
    CheckServer,
    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkResponse {
    /// Upload accepted by the server
    Submitted { generation: u64 },
    /// Upload failed (status, transport or file error)
    SubmitFailed { generation: u64, error: String },
    /// One poll tick returned a progress report
    Progress {
        generation: u64,
        update: ProgressUpdate,
    },
    /// One poll tick failed to fetch or parse
    PollFailed { generation: u64, error: String },
    Played,
    PlayFailed { error: String },
    Downloaded { path: PathBuf },
    DownloadFailed { error: String },
    ServerStatus(ServerStatus),
    ServerUnreachable { error: String },
}
