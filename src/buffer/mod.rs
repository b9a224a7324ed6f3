//! Module de buffer d'échantillons
//!
//! Couple l'échantillonneur (producteur) et la vue d'enregistrement
//! (consommateur) via un handle explicite.

mod sample_buffer;
mod shared;

pub use sample_buffer::{OverflowPolicy, PushOutcome, ReadCursor, SampleBuffer, DEFAULT_CAPACITY};
pub use shared::{SharedBuffer, SharedReader};
