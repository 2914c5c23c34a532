//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

/// Default processing server
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";

/// Default period between progress polls
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Default timeout for short requests (progress, play, status)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default log file, relative to the working directory
pub const DEFAULT_LOG_FILE: &str = "objectify.log";

/// Multipart field carrying the uploaded video
pub const UPLOAD_FIELD: &str = "video";

/// Media types accepted at intake, matched by equality
pub const ACCEPTED_MEDIA_TYPES: [&str; 5] = [
    "video/mp4",
    "video/avi",
    "video/mov",
    "video/x-msvideo",
    "video/quicktime",
];

// User-facing messages
pub const MSG_INVALID_FILE: &str = "Please select a valid video file (MP4, AVI, MOV)";
pub const MSG_SUBMIT_FAILED: &str = "Failed to start processing. Please try again.";
pub const MSG_PROCESSING_FAILED: &str = "Processing failed";
pub const MSG_POLL_TIMEOUT: &str = "Processing timed out";
pub const MSG_NO_OUTPUT: &str = "No output file available";
pub const MSG_PLAY_OK: &str = "Video opened in default player";
pub const MSG_PLAY_FAILED: &str = "Failed to play video";
pub const MSG_DOWNLOAD_FAILED: &str = "Failed to download video";

/// Application name
pub const APP_NAME: &str = "OBJECTIFY";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
