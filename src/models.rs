use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::time::Instant;

use crate::constants::ACCEPTED_MEDIA_TYPES;

/// Workflow screen. Exactly one is active at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Upload,
    Processing,
    Complete,
    Error,
}

impl Screen {
    /// Status line text shown while this screen is active
    pub fn status(&self) -> &'static str {
        match self {
            Screen::Upload => "READY",
            Screen::Processing => "PROCESSING",
            Screen::Complete => "COMPLETE",
            Screen::Error => "ERROR",
        }
    }
}

/// A file chosen by the user, with the media type it declares
#[derive(Clone, Debug, PartialEq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
    pub media_type: Option<String>,
}

impl SelectedFile {
    /// Describe a file on disk. The media type comes from the extension only.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let media_type = media_type_for(&path).map(String::from);
        SelectedFile {
            path,
            name,
            media_type,
        }
    }

    /// Build a file with an explicitly declared media type
    pub fn with_media_type(path: impl Into<PathBuf>, media_type: impl Into<String>) -> Self {
        SelectedFile {
            media_type: Some(media_type.into()),
            ..Self::from_path(path)
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.media_type
            .as_deref()
            .is_some_and(|t| ACCEPTED_MEDIA_TYPES.contains(&t))
    }
}

/// Media type a browser would declare for this extension
fn media_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let media_type = match ext.as_str() {
        "mp4" | "m4v" => "video/mp4",
        "avi" => "video/x-msvideo",
        "mov" | "qt" => "video/quicktime",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "wmv" => "video/x-ms-wmv",
        "flv" => "video/x-flv",
        "mpeg" | "mpg" => "video/mpeg",
        "gif" => "image/gif",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "txt" => "text/plain",
        _ => return None,
    };
    Some(media_type)
}

/// One `/progress` response
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ProgressUpdate {
    #[serde(default)]
    pub progress: f64,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub output_file: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Progress as shown to the user: clamped to 0..=100 and rounded
pub fn display_percent(progress: f64) -> u16 {
    if progress.is_nan() {
        return 0;
    }
    progress.clamp(0.0, 100.0).round() as u16
}

/// `/status` response
#[derive(Clone, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct ServerStatus {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub yolo_available: bool,
}

/// Which of the mutually exclusive session phases we are in
#[derive(Clone, Debug, PartialEq, Default)]
pub enum SessionStage {
    #[default]
    Empty,
    FileSelected(SelectedFile),
    OutputReady(String),
}

/// Handle to the active recurring poll
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PollHandle {
    pub generation: u64,
    pub started: Instant,
}

/// State of one workflow run
#[derive(Clone, Debug, Default)]
pub struct Session {
    pub stage: SessionStage,
    pub poll: Option<PollHandle>,
}

impl Session {
    pub fn selected_file(&self) -> Option<&SelectedFile> {
        match &self.stage {
            SessionStage::FileSelected(file) => Some(file),
            _ => None,
        }
    }

    pub fn output_reference(&self) -> Option<&str> {
        match &self.stage {
            SessionStage::OutputReady(output) => Some(output),
            _ => None,
        }
    }

    /// Drop the poll handle, returning the generation that was active
    pub fn take_poll(&mut self) -> Option<u64> {
        self.poll.take().map(|p| p.generation)
    }

    pub fn clear(&mut self) {
        self.stage = SessionStage::Empty;
        self.poll = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_from_extension() {
        assert_eq!(SelectedFile::from_path("a/clip.MP4").media_type.as_deref(), Some("video/mp4"));
        assert_eq!(SelectedFile::from_path("clip.avi").media_type.as_deref(), Some("video/x-msvideo"));
        assert_eq!(SelectedFile::from_path("clip.mov").media_type.as_deref(), Some("video/quicktime"));
        assert_eq!(SelectedFile::from_path("clip").media_type, None);
        assert_eq!(SelectedFile::from_path("/tmp/dir/clip.mov").name, "clip.mov");
    }

    #[test]
    fn test_accepted_media_types() {
        for t in ACCEPTED_MEDIA_TYPES {
            assert!(SelectedFile::with_media_type("x", t).is_accepted(), "{t}");
        }
        assert!(!SelectedFile::from_path("clip.mkv").is_accepted());
        assert!(!SelectedFile::from_path("notes.txt").is_accepted());
        assert!(!SelectedFile::from_path("noext").is_accepted());
        // equality, not prefix or case-insensitive matching
        assert!(!SelectedFile::with_media_type("x.mp4", "VIDEO/MP4").is_accepted());
        assert!(!SelectedFile::with_media_type("x.mp4", "video/mp4; codecs=avc1").is_accepted());
    }

    #[test]
    fn test_display_percent_clamps_and_rounds() {
        assert_eq!(display_percent(-12.0), 0);
        assert_eq!(display_percent(0.0), 0);
        assert_eq!(display_percent(41.6), 42);
        assert_eq!(display_percent(99.4), 99);
        assert_eq!(display_percent(100.0), 100);
        assert_eq!(display_percent(250.0), 100);
        assert_eq!(display_percent(f64::NAN), 0);
    }

    #[test]
    fn test_progress_update_parses_partial_json() {
        let update: ProgressUpdate = serde_json::from_str(
            r#"{"progress": 37.5, "message": "Frame 12/32", "completed": false}"#,
        )
        .unwrap();
        assert_eq!(update.progress, 37.5);
        assert_eq!(update.message.as_deref(), Some("Frame 12/32"));
        assert!(!update.completed);
        assert_eq!(update.success, None);

        let done: ProgressUpdate = serde_json::from_str(
            r#"{"progress": 100, "completed": true, "success": true, "output_file": "out.mp4"}"#,
        )
        .unwrap();
        assert_eq!(done.output_file.as_deref(), Some("out.mp4"));
        assert_eq!(done.success, Some(true));
    }

    #[test]
    fn test_session_stage_accessors() {
        let mut session = Session::default();
        assert!(session.selected_file().is_none());
        session.stage = SessionStage::FileSelected(SelectedFile::from_path("a.mp4"));
        assert!(session.selected_file().is_some());
        assert!(session.output_reference().is_none());
        session.stage = SessionStage::OutputReady("out.mp4".into());
        assert!(session.selected_file().is_none());
        assert_eq!(session.output_reference(), Some("out.mp4"));
        session.clear();
        assert_eq!(session.stage, SessionStage::Empty);
    }
}
