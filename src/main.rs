//! Objectify TUI - upload a video, follow its processing, fetch the result
//!
//! Architecture:
//! - UI Layer (Ratatui) - synchronous terminal rendering
//! - App Layer - central state machine processing events
//! - Network Layer (Tokio) - async HTTP execution

use std::io;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{self, DisableBracketedPaste, EnableBracketedPaste, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{prelude::*, widgets::*};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use objectify::app::{AppActor, AppState};
use objectify::config::{Args, Config};
use objectify::constants::{APP_NAME, APP_VERSION};
use objectify::messages::ui_events::{key_to_ui_event, paste_to_ui_event};
use objectify::messages::{NetworkCommand, NetworkResponse, RenderState, UiEvent};
use objectify::models::{Screen, SelectedFile};
use objectify::network::{HttpProcessingService, NetworkActor};
use objectify::ui::{centered_rect, key_hint, log_lines, render_progress, status_color};

/// Terminal cleanup guard
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), DisableBracketedPaste, LeaveAlternateScreen);
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = Config::load(&args)?;

    // Initialize logging to file
    let log_dir = config
        .log_file
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    let log_name = config
        .log_file
        .file_name()
        .context("log_file must name a file")?;
    let file_appender = tracing_appender::rolling::never(log_dir, log_name);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    tracing::info!(server = %config.server_url, version = APP_VERSION, "Starting");

    let service = Arc::new(HttpProcessingService::new(&config)?);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let _terminal_guard = TerminalGuard;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create channels
    let (ui_tx, ui_rx) = mpsc::unbounded_channel::<UiEvent>();
    let (net_cmd_tx, net_cmd_rx) = mpsc::unbounded_channel::<NetworkCommand>();
    let (net_resp_tx, net_resp_rx) = mpsc::unbounded_channel::<NetworkResponse>();
    let (render_tx, mut render_rx) = mpsc::unbounded_channel::<RenderState>();

    // Spawn network actor
    let network_actor = NetworkActor::new(service, net_resp_tx);
    tokio::spawn(network_actor.run(net_cmd_rx));

    // Spawn app actor
    let app_actor = AppActor::new(AppState::new(&config), net_cmd_tx, render_tx);
    tokio::spawn(app_actor.run(ui_rx, net_resp_rx));

    if let Some(file) = &args.file {
        let _ = ui_tx.send(UiEvent::FileSelected(SelectedFile::from_path(file)));
    }

    run_ui_loop(&mut terminal, ui_tx, &mut render_rx).await?;

    tracing::info!("Exiting");
    Ok(())
}

/// Run the synchronous UI rendering loop
async fn run_ui_loop(
    terminal: &mut Terminal<impl Backend>,
    ui_tx: mpsc::UnboundedSender<UiEvent>,
    render_rx: &mut mpsc::UnboundedReceiver<RenderState>,
) -> anyhow::Result<()> {
    let mut current_state = RenderState::default();

    loop {
        // Draw with current state
        terminal.draw(|f| draw_ui(f, &current_state))?;

        // Poll for events with timeout
        if event::poll(Duration::from_millis(50))? {
            let ui_event = match event::read()? {
                Event::Key(key) => key_to_ui_event(
                    key,
                    current_state.screen,
                    current_state.show_help,
                    current_state.notice.is_some(),
                ),
                // Dropping a file on the terminal pastes its path
                Event::Paste(text) => paste_to_ui_event(&text, current_state.screen),
                _ => None,
            };

            if let Some(event) = ui_event {
                let quit = matches!(event, UiEvent::Quit);
                let _ = ui_tx.send(event);
                if quit {
                    break;
                }
            }
        }

        // Check for state updates (non-blocking)
        while let Ok(state) = render_rx.try_recv() {
            current_state = state;
        }
    }

    Ok(())
}

// ============================================================================
// UI Drawing Functions
// ============================================================================

fn draw_ui(f: &mut Frame, state: &RenderState) {
    let area = f.area();

    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(0),    // Screen
            Constraint::Length(1), // Key hints
        ])
        .split(area);

    draw_header(f, state, main_chunks[0]);

    match state.screen {
        Screen::Upload => draw_upload_screen(f, state, main_chunks[1]),
        Screen::Processing => draw_processing_screen(f, state, main_chunks[1]),
        Screen::Complete => draw_complete_screen(f, state, main_chunks[1]),
        Screen::Error => draw_error_screen(f, state, main_chunks[1]),
    }

    draw_key_bar(f, state, main_chunks[2]);

    if state.show_help {
        draw_help_popup(f, area);
    }

    if let Some(notice) = &state.notice {
        draw_notice_popup(f, notice, area);
    }
}

fn draw_header(f: &mut Frame, state: &RenderState, area: Rect) {
    let header = Line::from(vec![
        Span::styled(format!(" {} ", APP_NAME), Style::default().fg(Color::Black).bg(Color::Cyan).bold()),
        Span::raw(" "),
        Span::styled(
            format!("[{}]", state.status),
            Style::default().fg(status_color(state.screen)).bold(),
        ),
        Span::raw(" "),
        Span::styled(state.server_label.clone(), Style::default().fg(Color::DarkGray)),
    ]);
    f.render_widget(Paragraph::new(header), area);
}

fn draw_upload_screen(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Path input
            Constraint::Min(3),    // Instructions
        ])
        .split(area);

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(" Video file (Enter to upload) ");
    let input = Paragraph::new(state.path_input.as_str()).block(block);
    f.render_widget(input, chunks[0]);

    let max_x = chunks[0].x + chunks[0].width.saturating_sub(2);
    let cursor_x = (chunks[0].x + state.path_input[..state.cursor_position].chars().count() as u16 + 1).min(max_x);
    f.set_cursor_position(Position::new(cursor_x, chunks[0].y + 1));

    let help = Paragraph::new(vec![
        Line::from("Type the path of a video, or drag a file onto this window."),
        Line::from(""),
        Line::from(Span::styled(
            "Supported formats: MP4, AVI, MOV",
            Style::default().fg(Color::DarkGray),
        )),
    ])
    .block(Block::default().borders(Borders::ALL).title(" Upload "))
    .wrap(Wrap { trim: false });
    f.render_widget(help, chunks[1]);
}

fn draw_processing_screen(f: &mut Frame, state: &RenderState, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // File name
            Constraint::Length(3), // Gauge
            Constraint::Min(3),    // Log
        ])
        .split(area);

    let file_line = Line::from(vec![
        Span::styled(" File: ", Style::default().fg(Color::DarkGray)),
        Span::raw(state.file_name.clone()),
    ]);
    f.render_widget(Paragraph::new(file_line), chunks[0]);

    f.render_widget(render_progress(state.progress), chunks[1]);

    let log_height = chunks[2].height.saturating_sub(2);
    let log = Paragraph::new(log_lines(&state.log, log_height))
        .block(Block::default().borders(Borders::ALL).title(" Log "));
    f.render_widget(log, chunks[2]);
}

fn draw_complete_screen(f: &mut Frame, state: &RenderState, area: Rect) {
    let lines = vec![
        Line::from(Span::styled(
            "Processing complete",
            Style::default().fg(Color::Green).bold(),
        )),
        Line::from(""),
        Line::from(state.output_info.clone()),
    ];
    let body = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Green)))
        .wrap(Wrap { trim: false });
    f.render_widget(body, area);
}

fn draw_error_screen(f: &mut Frame, state: &RenderState, area: Rect) {
    let lines = vec![
        Line::from(Span::styled("Error", Style::default().fg(Color::Red).bold())),
        Line::from(""),
        Line::from(state.error_message.clone()),
    ];
    let body = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Red)))
        .wrap(Wrap { trim: false });
    f.render_widget(body, area);
}

fn draw_key_bar(f: &mut Frame, state: &RenderState, area: Rect) {
    let mut spans = vec![Span::raw(" ")];
    match state.screen {
        Screen::Upload => {
            spans.extend(key_hint("Enter", "upload"));
            spans.extend(key_hint("F1", "help"));
            spans.extend(key_hint("Esc", "quit"));
        }
        Screen::Processing => {
            spans.extend(key_hint("r", "cancel"));
            spans.extend(key_hint("?", "help"));
            spans.extend(key_hint("q", "quit"));
        }
        Screen::Complete => {
            spans.extend(key_hint("p", "play"));
            spans.extend(key_hint("d", "download"));
            spans.extend(key_hint("n", "new video"));
            spans.extend(key_hint("q", "quit"));
        }
        Screen::Error => {
            spans.extend(key_hint("r", "restart"));
            spans.extend(key_hint("q", "quit"));
        }
    }
    f.render_widget(Paragraph::new(Line::from(spans)).style(Style::default().fg(Color::DarkGray)), area);
}

fn draw_help_popup(f: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);

    let help_text = r#"
 OBJECTIFY - Keyboard Shortcuts

 UPLOAD
   type / paste       Enter a video path
   drag & drop        Drop a file on the terminal
   Enter              Upload and start processing

 PROCESSING
   r                  Cancel and start over

 COMPLETE
   p                  Play result on the server
   d                  Download result
   n                  Process another video

 GENERAL
   F1 / ?             Toggle this help
   q / Esc / Ctrl+C   Quit

 Press any key to close...
"#;

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Help ")
        .style(Style::default().bg(Color::Black));

    let help = Paragraph::new(help_text)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(help, popup_area);
}

fn draw_notice_popup(f: &mut Frame, notice: &str, area: Rect) {
    let popup_area = centered_rect(50, 20, area);

    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Notice (any key to close) ")
        .style(Style::default().bg(Color::Black));

    let text = Paragraph::new(notice)
        .block(block)
        .wrap(Wrap { trim: false });

    f.render_widget(Clear, popup_area);
    f.render_widget(text, popup_area);
}
