//! Conversion PCM → amplitude

use std::time::Duration;

/// Échelle par défaut: pleine échelle = 5 V
pub const DEFAULT_SCALE: f32 = 5.0;

/// Convertit un échantillon PCM 16 bits signé en amplitude
pub fn normalize(pcm: i16, scale: f32) -> f32 {
    (pcm as f32 / 32768.0) * scale
}

/// Nombre de trames couvrant un intervalle d'échantillonnage (au moins 1)
pub fn chunk_len(interval: Duration, sample_rate: u32) -> usize {
    let frames = (interval.as_secs_f64() * sample_rate as f64) as usize;
    frames.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(0, DEFAULT_SCALE), 0.0);
        assert_eq!(normalize(i16::MIN, DEFAULT_SCALE), -5.0);
        assert_eq!(normalize(16384, DEFAULT_SCALE), 2.5);
        assert_eq!(normalize(16384, 1.0), 0.5);
        assert!(normalize(i16::MAX, DEFAULT_SCALE) < 5.0);
    }

    #[test]
    fn test_chunk_len() {
        assert_eq!(chunk_len(Duration::from_millis(20), 44100), 882);
        assert_eq!(chunk_len(Duration::from_millis(500), 48000), 24000);
        // Jamais zéro
        assert_eq!(chunk_len(Duration::from_millis(20), 10), 1);
        assert_eq!(chunk_len(Duration::ZERO, 48000), 1);
    }
}
