//! Module d'acquisition
//!
//! Thread dédié: source audio → buffer partagé + flux live.

mod sampler;

pub use sampler::{
    LiveSample, Sampler, SamplerConfig, SamplerError, SamplerStatus, MAX_INTERVAL, MIN_INTERVAL,
};
