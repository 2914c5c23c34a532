//! Network layer - uploads, progress polling and downloads
//!
//! The Network actor receives commands and sends back responses.

pub mod actor;
pub mod client;
pub mod poller;
pub mod service;

pub use actor::NetworkActor;
pub use client::HttpProcessingService;
pub use service::ProcessingService;
