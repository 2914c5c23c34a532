//! Render state - data structure sent from App layer to UI for rendering
//!
//! The controller never touches `RenderState` fields directly. It emits
//! [`Effect`]s, which are replayed against anything implementing
//! [`Presentation`].

use crate::models::{display_percent, Screen};

/// Operations the controller may perform on the presentation layer
pub trait Presentation {
    fn show_screen(&mut self, screen: Screen);
    fn set_status(&mut self, text: &str);
    /// Update the bar; a message is appended to the log, never replacing it
    fn set_progress(&mut self, percent: f64, message: Option<&str>);
    fn set_error_message(&mut self, text: &str);
    fn set_output_info(&mut self, text: &str);
    fn set_file_name(&mut self, name: &str);
    fn set_server_info(&mut self, text: &str);
    fn reset_progress_display(&mut self);
    /// Blocking notice, dismissed by the user
    fn show_notice(&mut self, text: &str);
}

/// A single presentation change requested by the controller
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    ShowScreen(Screen),
    SetStatus(String),
    SetProgress {
        percent: f64,
        message: Option<String>,
    },
    SetErrorMessage(String),
    SetOutputInfo(String),
    SetFileName(String),
    SetServerInfo(String),
    ResetProgressDisplay,
    Notice(String),
}

impl Effect {
    pub fn apply<P: Presentation + ?Sized>(&self, target: &mut P) {
        match self {
            Effect::ShowScreen(screen) => target.show_screen(*screen),
            Effect::SetStatus(text) => target.set_status(text),
            Effect::SetProgress { percent, message } => {
                target.set_progress(*percent, message.as_deref())
            }
            Effect::SetErrorMessage(text) => target.set_error_message(text),
            Effect::SetOutputInfo(text) => target.set_output_info(text),
            Effect::SetFileName(name) => target.set_file_name(name),
            Effect::SetServerInfo(text) => target.set_server_info(text),
            Effect::ResetProgressDisplay => target.reset_progress_display(),
            Effect::Notice(text) => target.show_notice(text),
        }
    }
}

/// Complete state needed by the UI to render
#[derive(Debug, Clone)]
pub struct RenderState {
    // Workflow
    pub screen: Screen,
    pub status: String,
    pub file_name: String,

    // Progress
    pub progress: u16,
    pub log: Vec<String>,

    // Outcome
    pub error_message: String,
    pub output_info: String,

    // Upload screen input
    pub path_input: String,
    pub cursor_position: usize,

    // Header
    pub server_label: String,

    // Popups
    pub notice: Option<String>,
    pub show_help: bool,
}

impl Default for RenderState {
    fn default() -> Self {
        RenderState {
            screen: Screen::Upload,
            status: Screen::Upload.status().to_string(),
            file_name: String::new(),
            progress: 0,
            log: Vec::new(),
            error_message: String::new(),
            output_info: String::new(),
            path_input: String::new(),
            cursor_position: 0,
            server_label: String::from("connecting..."),
            notice: None,
            show_help: false,
        }
    }
}

impl Presentation for RenderState {
    fn show_screen(&mut self, screen: Screen) {
        self.screen = screen;
    }

    fn set_status(&mut self, text: &str) {
        self.status = text.to_string();
    }

    fn set_progress(&mut self, percent: f64, message: Option<&str>) {
        self.progress = display_percent(percent);
        if let Some(message) = message.filter(|m| !m.is_empty()) {
            let timestamp = chrono::Local::now().format("%H:%M:%S");
            self.log.push(format!("[{}] {}", timestamp, message));
        }
    }

    fn set_error_message(&mut self, text: &str) {
        self.error_message = text.to_string();
    }

    fn set_output_info(&mut self, text: &str) {
        self.output_info = text.to_string();
    }

    fn set_file_name(&mut self, name: &str) {
        self.file_name = name.to_string();
    }

    fn set_server_info(&mut self, text: &str) {
        self.server_label = text.to_string();
    }

    fn reset_progress_display(&mut self) {
        self.progress = 0;
        self.log.clear();
    }

    fn show_notice(&mut self, text: &str) {
        self.notice = Some(text.to_string());
    }
}
