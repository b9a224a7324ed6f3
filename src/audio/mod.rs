//! Module de capture audio
//!
//! Gère la source audio (microphone) et la conversion PCM.

mod microphone;
mod pcm;
mod source;

pub use microphone::{Microphone, MicrophoneConfig};
pub use pcm::{chunk_len, normalize, DEFAULT_SCALE};
pub use source::{AudioSource, MicrophoneError};

#[cfg(test)]
pub use source::MockAudioSource;
