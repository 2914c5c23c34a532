//! UI events - messages from UI layer to App layer

use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::models::{Screen, SelectedFile};

/// Events generated from user input in the UI layer
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    // File intake: typed path, drop/paste and startup argument all end here
    FileSelected(SelectedFile),

    // Path input on the upload screen
    PathChar(char),
    PathBackspace,
    PathCursorLeft,
    PathCursorRight,
    SubmitPath,

    // Workflow actions
    Play,
    Download,
    Reset,

    // Popups
    DismissNotice,
    ToggleHelp,
    CloseHelp,

    // System
    Quit,
}

/// Convert a key event to a UiEvent based on current UI context
pub fn key_to_ui_event(
    key: KeyEvent,
    screen: Screen,
    show_help: bool,
    has_notice: bool,
) -> Option<UiEvent> {
    use crossterm::event::KeyEventKind;

    if key.kind != KeyEventKind::Press {
        return None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(UiEvent::Quit);
    }

    // Popups swallow the next key
    if has_notice {
        return Some(UiEvent::DismissNotice);
    }
    if show_help {
        return Some(UiEvent::CloseHelp);
    }

    if key.code == KeyCode::F(1) {
        return Some(UiEvent::ToggleHelp);
    }

    match screen {
        Screen::Upload => match key.code {
            KeyCode::Esc => Some(UiEvent::Quit),
            KeyCode::Enter => Some(UiEvent::SubmitPath),
            KeyCode::Backspace => Some(UiEvent::PathBackspace),
            KeyCode::Left => Some(UiEvent::PathCursorLeft),
            KeyCode::Right => Some(UiEvent::PathCursorRight),
            KeyCode::Char(c) if is_plain_char(key.modifiers) => Some(UiEvent::PathChar(c)),
            _ => None,
        },
        Screen::Processing => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(UiEvent::Quit),
            KeyCode::Char('?') => Some(UiEvent::ToggleHelp),
            KeyCode::Char('r') => Some(UiEvent::Reset),
            _ => None,
        },
        Screen::Complete => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(UiEvent::Quit),
            KeyCode::Char('?') => Some(UiEvent::ToggleHelp),
            KeyCode::Char('p') => Some(UiEvent::Play),
            KeyCode::Char('d') => Some(UiEvent::Download),
            KeyCode::Char('n') | KeyCode::Char('r') | KeyCode::Enter => Some(UiEvent::Reset),
            _ => None,
        },
        Screen::Error => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(UiEvent::Quit),
            KeyCode::Char('?') => Some(UiEvent::ToggleHelp),
            KeyCode::Char('r') | KeyCode::Enter => Some(UiEvent::Reset),
            _ => None,
        },
    }
}

/// Typed text, not a Ctrl/Alt chord
fn is_plain_char(modifiers: KeyModifiers) -> bool {
    modifiers.difference(KeyModifiers::SHIFT).is_empty()
}

/// Turn pasted text into a path.
///
/// Dropping a file on a terminal pastes its path, possibly quoted, with
/// escaped spaces, or as a `file://` URL.
pub fn path_from_paste(text: &str) -> Option<PathBuf> {
    let mut s = text.trim();
    if s.len() >= 2
        && ((s.starts_with('\'') && s.ends_with('\'')) || (s.starts_with('"') && s.ends_with('"')))
    {
        s = &s[1..s.len() - 1];
    }
    if s.starts_with("file://") {
        return reqwest::Url::parse(s).ok().and_then(|url| url.to_file_path().ok());
    }
    let unescaped = s.replace("\\ ", " ");
    if unescaped.is_empty() {
        None
    } else {
        Some(PathBuf::from(unescaped))
    }
}

/// Map a paste event to file intake; empty pastes are dropped
pub fn paste_to_ui_event(text: &str, screen: Screen) -> Option<UiEvent> {
    if screen != Screen::Upload {
        return None;
    }
    path_from_paste(text).map(|path| UiEvent::FileSelected(SelectedFile::from_path(path)))
}
