//! App state - pure data structure with no I/O logic

use std::path::PathBuf;
use std::time::Duration;

use crate::config::Config;
use crate::messages::{Effect, NetworkCommand, RenderState};
use crate::models::{Screen, Session};

/// What a handler wants done: presentation changes and network work
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Outcome {
    pub effects: Vec<Effect>,
    pub commands: Vec<NetworkCommand>,
}

impl Outcome {
    pub fn effect(&mut self, effect: Effect) {
        self.effects.push(effect);
    }

    pub fn command(&mut self, command: NetworkCommand) {
        self.commands.push(command);
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty() && self.commands.is_empty()
    }
}

/// Main application state - pure data, no I/O
pub struct AppState {
    // Workflow
    pub session: Session,
    pub screen: Screen,
    /// Cycle whose upload has been sent but not yet answered
    pub pending_submission: Option<u64>,
    pub next_generation: u64,

    // Settings
    pub poll_period: Duration,
    pub max_poll: Option<Duration>,
    pub download_dir: PathBuf,

    // Upload screen input
    pub path_input: String,
    pub cursor_position: usize,

    // What the UI is showing
    pub view: RenderState,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(&Config::default())
    }
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        AppState {
            session: Session::default(),
            screen: Screen::Upload,
            pending_submission: None,
            next_generation: 1,
            poll_period: config.poll_interval(),
            max_poll: config.max_poll(),
            download_dir: config.download_dir.clone(),
            path_input: String::new(),
            cursor_position: 0,
            view: RenderState::default(),
        }
    }

    /// Generate a unique cycle ID
    pub fn next_id(&mut self) -> u64 {
        let id = self.next_generation;
        self.next_generation += 1;
        id
    }

    /// Activate a screen along with its status text
    pub(crate) fn enter(&mut self, screen: Screen, outcome: &mut Outcome) {
        self.screen = screen;
        outcome.effect(Effect::ShowScreen(screen));
        outcome.effect(Effect::SetStatus(screen.status().to_string()));
    }

    /// Replay an outcome's effects on the view and hand back its commands
    pub fn apply(&mut self, outcome: Outcome) -> Vec<NetworkCommand> {
        for effect in &outcome.effects {
            effect.apply(&mut self.view);
        }
        outcome.commands
    }

    /// Convert state to RenderState for UI
    pub fn to_render_state(&self) -> RenderState {
        RenderState {
            path_input: self.path_input.clone(),
            cursor_position: self.cursor_position,
            ..self.view.clone()
        }
    }
}
