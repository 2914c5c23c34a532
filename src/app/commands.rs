//! Command handlers - the upload / processing state machine

use tokio::time::Instant;

use crate::app::state::{AppState, Outcome};
use crate::constants::{
    MSG_DOWNLOAD_FAILED, MSG_INVALID_FILE, MSG_NO_OUTPUT, MSG_PLAY_FAILED, MSG_PLAY_OK,
    MSG_POLL_TIMEOUT, MSG_PROCESSING_FAILED, MSG_SUBMIT_FAILED,
};
use crate::messages::{Effect, NetworkCommand, NetworkResponse};
use crate::models::{PollHandle, ProgressUpdate, Screen, SelectedFile, ServerStatus, SessionStage};

impl AppState {
    // ========================
    // File intake
    // ========================

    /// Validate a chosen file and, if accepted, start submitting it
    pub fn select_file(&mut self, file: SelectedFile) -> Outcome {
        let mut outcome = Outcome::default();

        if self.screen != Screen::Upload {
            tracing::debug!(screen = ?self.screen, file = %file.name, "Ignoring file outside upload screen");
            return outcome;
        }

        if !file.is_accepted() {
            tracing::info!(file = %file.name, media_type = ?file.media_type, "Rejected file");
            self.fail(MSG_INVALID_FILE, &mut outcome);
            return outcome;
        }

        let generation = self.next_id();
        tracing::info!(generation, file = %file.name, "Accepted file");

        self.session.stage = SessionStage::FileSelected(file.clone());
        self.pending_submission = Some(generation);
        self.enter(Screen::Processing, &mut outcome);
        outcome.effect(Effect::SetFileName(file.name.clone()));
        outcome.command(NetworkCommand::Submit { generation, file });
        outcome
    }

    /// Intake for the path typed on the upload screen
    pub fn submit_path(&mut self) -> Outcome {
        let path = self.path_input.trim();
        if path.is_empty() {
            return Outcome::default();
        }
        let file = SelectedFile::from_path(path);
        self.select_file(file)
    }

    // ========================
    // Path input editing
    // ========================

    pub fn path_char(&mut self, c: char) {
        if self.cursor_position <= self.path_input.len() {
            self.path_input.insert(self.cursor_position, c);
            self.cursor_position += c.len_utf8();
        }
    }

    pub fn path_backspace(&mut self) {
        if self.cursor_position > 0 {
            let prev_pos = self.path_input[..self.cursor_position]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
            self.path_input.remove(prev_pos);
            self.cursor_position = prev_pos;
        }
    }

    pub fn path_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position = self.path_input[..self.cursor_position]
                .char_indices()
                .last()
                .map(|(i, _)| i)
                .unwrap_or(0);
        }
    }

    pub fn path_cursor_right(&mut self) {
        if self.cursor_position < self.path_input.len() {
            self.cursor_position = self.path_input[self.cursor_position..]
                .char_indices()
                .nth(1)
                .map(|(i, _)| self.cursor_position + i)
                .unwrap_or(self.path_input.len());
        }
    }

    // ========================
    // Network responses
    // ========================

    pub fn handle_response(&mut self, response: NetworkResponse) -> Outcome {
        match response {
            NetworkResponse::Submitted { generation } => self.on_submitted(generation),
            NetworkResponse::SubmitFailed { generation, error } => {
                self.on_submit_failed(generation, &error)
            }
            NetworkResponse::Progress { generation, update } => self.on_progress(generation, update),
            NetworkResponse::PollFailed { generation, error } => {
                self.on_poll_failed(generation, &error)
            }
            NetworkResponse::Played => notice(MSG_PLAY_OK),
            NetworkResponse::PlayFailed { error } => {
                tracing::warn!(error = %error, "Play failed");
                notice(MSG_PLAY_FAILED)
            }
            NetworkResponse::Downloaded { path } => {
                notice(&format!("Saved to {}", path.display()))
            }
            NetworkResponse::DownloadFailed { error } => {
                tracing::warn!(error = %error, "Download failed");
                notice(MSG_DOWNLOAD_FAILED)
            }
            NetworkResponse::ServerStatus(status) => server_info(&status),
            NetworkResponse::ServerUnreachable { error } => {
                tracing::warn!(error = %error, "Server status check failed");
                let mut outcome = Outcome::default();
                outcome.effect(Effect::SetServerInfo(String::from("server offline")));
                outcome
            }
        }
    }

    fn on_submitted(&mut self, generation: u64) -> Outcome {
        let mut outcome = Outcome::default();
        if self.pending_submission != Some(generation) {
            tracing::debug!(generation, "Ignoring stale submission result");
            return outcome;
        }
        self.pending_submission = None;

        tracing::info!(generation, "Upload accepted, polling for progress");
        self.session.poll = Some(PollHandle {
            generation,
            started: Instant::now(),
        });
        outcome.command(NetworkCommand::StartPolling {
            generation,
            period: self.poll_period,
        });
        outcome
    }

    fn on_submit_failed(&mut self, generation: u64, error: &str) -> Outcome {
        let mut outcome = Outcome::default();
        if self.pending_submission != Some(generation) {
            tracing::debug!(generation, "Ignoring stale submission failure");
            return outcome;
        }
        self.pending_submission = None;

        // The cause is logged only; the user gets a generic message
        tracing::warn!(generation, error = %error, "Processing request failed");
        self.fail(MSG_SUBMIT_FAILED, &mut outcome);
        outcome
    }

    fn on_progress(&mut self, generation: u64, update: ProgressUpdate) -> Outcome {
        let mut outcome = Outcome::default();
        if !self.is_current_poll(generation) {
            tracing::debug!(generation, "Ignoring stale progress");
            return outcome;
        }

        outcome.effect(Effect::SetProgress {
            percent: update.progress,
            message: update.message.clone(),
        });

        if !update.completed {
            self.check_poll_ceiling(&mut outcome);
            return outcome;
        }

        self.stop_polling(&mut outcome);

        if update.success == Some(true) {
            match update.output_file {
                Some(output) => {
                    tracing::info!(generation, output = %output, "Processing complete");
                    outcome.effect(Effect::SetOutputInfo(format!("Output: {}", output)));
                    self.session.stage = SessionStage::OutputReady(output);
                }
                None => {
                    tracing::warn!(generation, "Processing complete without an output file");
                    self.session.stage = SessionStage::Empty;
                }
            }
            self.enter(Screen::Complete, &mut outcome);
        } else {
            let message = update
                .error
                .filter(|e| !e.is_empty())
                .unwrap_or_else(|| MSG_PROCESSING_FAILED.to_string());
            tracing::warn!(generation, error = %message, "Processing failed");
            self.fail(&message, &mut outcome);
        }
        outcome
    }

    fn on_poll_failed(&mut self, generation: u64, error: &str) -> Outcome {
        let mut outcome = Outcome::default();
        if !self.is_current_poll(generation) {
            return outcome;
        }
        // A failed tick is not fatal; the next one may succeed
        tracing::warn!(generation, error = %error, "Progress poll failed");
        self.check_poll_ceiling(&mut outcome);
        outcome
    }

    fn is_current_poll(&self, generation: u64) -> bool {
        self.session.poll.is_some_and(|p| p.generation == generation)
    }

    fn stop_polling(&mut self, outcome: &mut Outcome) {
        if let Some(generation) = self.session.take_poll() {
            outcome.command(NetworkCommand::StopPolling(generation));
        }
    }

    fn check_poll_ceiling(&mut self, outcome: &mut Outcome) {
        let (Some(max), Some(poll)) = (self.max_poll, self.session.poll) else {
            return;
        };
        if poll.started.elapsed() >= max {
            tracing::warn!(generation = poll.generation, max_secs = max.as_secs(), "Giving up on processing");
            self.stop_polling(outcome);
            self.fail(MSG_POLL_TIMEOUT, outcome);
        }
    }

    fn fail(&mut self, message: &str, outcome: &mut Outcome) {
        self.enter(Screen::Error, outcome);
        outcome.effect(Effect::SetErrorMessage(message.to_string()));
    }

    // ========================
    // User actions
    // ========================

    /// Back to the upload screen from anywhere
    pub fn reset(&mut self) -> Outcome {
        let mut outcome = Outcome::default();
        self.stop_polling(&mut outcome);
        self.pending_submission = None;
        self.session.clear();
        self.path_input.clear();
        self.cursor_position = 0;

        outcome.effect(Effect::ResetProgressDisplay);
        outcome.effect(Effect::SetErrorMessage(String::new()));
        outcome.effect(Effect::SetOutputInfo(String::new()));
        outcome.effect(Effect::SetFileName(String::new()));
        self.enter(Screen::Upload, &mut outcome);
        outcome
    }

    pub fn play(&mut self) -> Outcome {
        match self.session.output_reference() {
            Some(output) => {
                let mut outcome = Outcome::default();
                outcome.command(NetworkCommand::Play {
                    output: output.to_string(),
                });
                outcome
            }
            None => notice(MSG_NO_OUTPUT),
        }
    }

    pub fn download(&mut self) -> Outcome {
        match self.session.output_reference() {
            Some(output) => {
                let mut outcome = Outcome::default();
                outcome.command(NetworkCommand::Download {
                    output: output.to_string(),
                    dest_dir: self.download_dir.clone(),
                });
                outcome
            }
            None => notice(MSG_NO_OUTPUT),
        }
    }

    // ========================
    // Popups
    // ========================

    pub fn dismiss_notice(&mut self) {
        self.view.notice = None;
    }

    pub fn toggle_help(&mut self) {
        self.view.show_help = !self.view.show_help;
    }

    pub fn close_help(&mut self) {
        self.view.show_help = false;
    }
}

fn notice(text: &str) -> Outcome {
    let mut outcome = Outcome::default();
    outcome.effect(Effect::Notice(text.to_string()));
    outcome
}

fn server_info(status: &ServerStatus) -> Outcome {
    let mut outcome = Outcome::default();
    let mut label = format!("server v{}", status.version);
    if status.yolo_available {
        label.push_str(" (yolo)");
    }
    outcome.effect(Effect::SetServerInfo(label));
    outcome
}
