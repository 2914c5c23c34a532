//! App layer - the upload / processing state machine
//!
//! The App actor receives UI events and network responses,
//! updates state, and emits network commands and render state.

pub mod state;
pub mod actor;
pub mod commands;

pub use state::{AppState, Outcome};
pub use actor::AppActor;
