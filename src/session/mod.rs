//! Module de session
//!
//! Contrôleur record / pause / stop / export.

mod controller;

pub use controller::{CaptureSession, SessionConfig, SessionError, SessionState, FILE_PREFIX};
