//! App actor - message loop processing UI events and network responses

use tokio::sync::mpsc;

use crate::app::state::{AppState, Outcome};
use crate::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};

/// App actor that processes UI events and network responses
pub struct AppActor {
    state: AppState,
    network_tx: mpsc::UnboundedSender<NetworkCommand>,
    render_tx: mpsc::UnboundedSender<RenderState>,
}

impl AppActor {
    pub fn new(
        state: AppState,
        network_tx: mpsc::UnboundedSender<NetworkCommand>,
        render_tx: mpsc::UnboundedSender<RenderState>,
    ) -> Self {
        AppActor {
            state,
            network_tx,
            render_tx,
        }
    }

    /// Run the actor message loop
    pub async fn run(
        mut self,
        mut ui_rx: mpsc::UnboundedReceiver<UiEvent>,
        mut net_rx: mpsc::UnboundedReceiver<NetworkResponse>,
    ) {
        // Send initial render state
        let _ = self.render_tx.send(self.state.to_render_state());
        let _ = self.network_tx.send(NetworkCommand::CheckServer);

        loop {
            tokio::select! {
                Some(event) = ui_rx.recv() => {
                    if self.handle_ui_event(event) {
                        // Quit signal received
                        let _ = self.network_tx.send(NetworkCommand::Shutdown);
                        break;
                    }
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                Some(response) = net_rx.recv() => {
                    let outcome = self.state.handle_response(response);
                    self.dispatch(outcome);
                    let _ = self.render_tx.send(self.state.to_render_state());
                }
                else => break,
            }
        }
    }

    /// Handle a UI event, returns true if quit was requested
    fn handle_ui_event(&mut self, event: UiEvent) -> bool {
        let outcome = match event {
            // File intake
            UiEvent::FileSelected(file) => self.state.select_file(file),
            UiEvent::SubmitPath => self.state.submit_path(),

            // Path input
            UiEvent::PathChar(c) => {
                self.state.path_char(c);
                return false;
            }
            UiEvent::PathBackspace => {
                self.state.path_backspace();
                return false;
            }
            UiEvent::PathCursorLeft => {
                self.state.path_cursor_left();
                return false;
            }
            UiEvent::PathCursorRight => {
                self.state.path_cursor_right();
                return false;
            }

            // Workflow actions
            UiEvent::Play => self.state.play(),
            UiEvent::Download => self.state.download(),
            UiEvent::Reset => self.state.reset(),

            // Popups
            UiEvent::DismissNotice => {
                self.state.dismiss_notice();
                return false;
            }
            UiEvent::ToggleHelp => {
                self.state.toggle_help();
                return false;
            }
            UiEvent::CloseHelp => {
                self.state.close_help();
                return false;
            }

            // System
            UiEvent::Quit => return true,
        };

        self.dispatch(outcome);
        false
    }

    fn dispatch(&mut self, outcome: Outcome) {
        for cmd in self.state.apply(outcome) {
            let _ = self.network_tx.send(cmd);
        }
    }
}
