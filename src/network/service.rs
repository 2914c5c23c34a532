//! The remote processing service as seen by the client

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ProgressUpdate, SelectedFile, ServerStatus};

/// Client side of the processing server's HTTP contract
#[async_trait]
pub trait ProcessingService: Send + Sync {
    /// `POST /process` with the file as multipart field `video`
    async fn submit(&self, file: &SelectedFile) -> Result<()>;

    /// `GET /progress`
    async fn progress(&self) -> Result<ProgressUpdate>;

    /// `GET /play/{output}`
    async fn play(&self, output: &str) -> Result<()>;

    /// `GET /download/{output}`, saved into `dest_dir`. Returns the saved path.
    async fn download(&self, output: &str, dest_dir: &Path) -> Result<PathBuf>;

    /// `GET /status`
    async fn server_status(&self) -> Result<ServerStatus>;
}

#[cfg(test)]
pub mod testing {
    //! Scripted in-memory service for actor and poller tests

    use super::*;
    use crate::error::ClientError;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn failure(endpoint: &str) -> ClientError {
        ClientError::Status {
            status: 500,
            endpoint: endpoint.to_string(),
        }
    }

    #[derive(Default)]
    pub struct FakeService {
        /// `None` entries fail the tick; an empty queue reports 0%
        pub progress_script: Mutex<VecDeque<Option<ProgressUpdate>>>,
        pub fail_submit: bool,
        pub fail_play: bool,
        pub submit_calls: AtomicUsize,
        pub progress_calls: AtomicUsize,
        pub play_calls: AtomicUsize,
        pub download_calls: AtomicUsize,
    }

    impl FakeService {
        pub fn push_progress(&self, update: Option<ProgressUpdate>) {
            self.progress_script.lock().unwrap().push_back(update);
        }

        pub fn progress_calls(&self) -> usize {
            self.progress_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ProcessingService for FakeService {
        async fn submit(&self, _file: &SelectedFile) -> Result<()> {
            self.submit_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_submit {
                Err(failure("POST /process"))
            } else {
                Ok(())
            }
        }

        async fn progress(&self) -> Result<ProgressUpdate> {
            self.progress_calls.fetch_add(1, Ordering::SeqCst);
            match self.progress_script.lock().unwrap().pop_front() {
                Some(Some(update)) => Ok(update),
                Some(None) => Err(failure("GET /progress")),
                None => Ok(ProgressUpdate::default()),
            }
        }

        async fn play(&self, _output: &str) -> Result<()> {
            self.play_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_play {
                Err(failure("GET /play"))
            } else {
                Ok(())
            }
        }

        async fn download(&self, output: &str, dest_dir: &Path) -> Result<PathBuf> {
            self.download_calls.fetch_add(1, Ordering::SeqCst);
            Ok(dest_dir.join(output))
        }

        async fn server_status(&self) -> Result<ServerStatus> {
            Ok(ServerStatus {
                status: "running".into(),
                version: "1.0.0".into(),
                yolo_available: true,
            })
        }
    }
}
