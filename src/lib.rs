//! # Objectify TUI
//!
//! A terminal client for the Objectify video processing server.
//!
//! ## Features
//! - Pick a video by typing its path or dropping it on the terminal
//! - Upload to the server and follow processing progress live
//! - Play or download the processed result
//! - Server status in the header
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine)
//! - Network Layer (Tokio runtime)

pub mod app;
pub mod config;
pub mod constants;
pub mod error;
pub mod messages;
pub mod models;
pub mod network;
pub mod ui;

// Re-export commonly used types
pub use app::{AppActor, AppState, Outcome};
pub use config::{Args, Config};
pub use error::ClientError;
pub use messages::{Effect, NetworkCommand, NetworkResponse, Presentation, RenderState, UiEvent};
pub use models::{ProgressUpdate, Screen, SelectedFile, Session};
pub use network::{HttpProcessingService, NetworkActor, ProcessingService};
