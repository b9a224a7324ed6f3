//! Module des vues
//!
//! Vue live, vue d'enregistrement et afficheurs.

mod chart;
mod live;
mod recording;

pub use chart::{ChartSink, TerminalChart};
pub use live::LiveView;
pub use recording::{RecordingView, TickOutcome};

/// Cadence de rafraîchissement de l'affichage (20 images/s)
pub const REDRAW_INTERVAL: std::time::Duration = std::time::Duration::from_millis(50);
