//! Trait des sources audio

use std::time::Duration;
use thiserror::Error;

/// Erreurs liées à l'acquisition audio
#[derive(Error, Debug)]
pub enum MicrophoneError {
    #[error("Aucun périphérique d'entrée audio trouvé")]
    NoDevice,

    #[error("Erreur de configuration: {0}")]
    ConfigError(String),

    #[error("Erreur de stream: {0}")]
    StreamError(String),

    #[error("Aucune donnée audio reçue après {0:?}")]
    Timeout(Duration),

    #[error("Source audio non initialisée")]
    NotInitialized,
}

/// Source d'échantillons PCM 16 bits mono
///
/// Cycle de vie: `begin()` une fois, `read()` à chaque acquisition,
/// `end()` une fois.
#[cfg_attr(test, mockall::automock)]
pub trait AudioSource {
    /// Ouvre le flux d'acquisition
    fn begin(&mut self) -> Result<(), MicrophoneError>;

    /// Remplit `buffer` et retourne le nombre d'échantillons lus
    ///
    /// Bloque tant que le buffer n'est pas plein.
    fn read(&mut self, buffer: &mut [i16]) -> Result<usize, MicrophoneError>;

    /// Ferme le flux (sans effet s'il n'est pas ouvert)
    fn end(&mut self);

    /// Taux d'échantillonnage du périphérique (Hz)
    fn sample_rate(&self) -> u32;
}
