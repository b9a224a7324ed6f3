//! Capture audio depuis le microphone
//!
//! Utilise cpal pour la capture cross-platform et ringbuf pour le buffering
//! entre le callback du stream et `read()`.

use super::source::{AudioSource, MicrophoneError};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, FromSample, Sample, SampleFormat, SizedSample, Stream, StreamConfig};
use ringbuf::{traits::*, HeapCons, HeapProd, HeapRb};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Configuration de la capture microphone
#[derive(Debug, Clone)]
pub struct MicrophoneConfig {
    /// Taille du ring buffer en secondes d'audio
    pub buffer_secs: u32,
    /// Attente maximale d'un `read()`
    pub read_timeout: Duration,
}

impl Default for MicrophoneConfig {
    fn default() -> Self {
        Self {
            buffer_secs: 2,
            read_timeout: Duration::from_secs(2),
        }
    }
}

/// Microphone par défaut du système
///
/// Le `Stream` cpal n'est pas `Send` sur toutes les plateformes: créer le
/// microphone dans le thread qui l'utilise.
pub struct Microphone {
    device: Device,
    stream_config: StreamConfig,
    sample_format: SampleFormat,
    stream: Option<Stream>,
    consumer: Option<HeapCons<i16>>,
    config: MicrophoneConfig,
}

impl Microphone {
    /// Ouvre le périphérique d'entrée par défaut
    pub fn open() -> Result<Self, MicrophoneError> {
        Self::with_config(MicrophoneConfig::default())
    }

    pub fn with_config(config: MicrophoneConfig) -> Result<Self, MicrophoneError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(MicrophoneError::NoDevice)?;

        tracing::info!("Périphérique audio: {:?}", device.name());

        // Taux préféré de la carte son
        let supported_config = device
            .default_input_config()
            .map_err(|e| MicrophoneError::ConfigError(e.to_string()))?;

        tracing::debug!(
            "Config audio: {}Hz {}ch {:?}",
            supported_config.sample_rate().0,
            supported_config.channels(),
            supported_config.sample_format()
        );

        Ok(Self {
            sample_format: supported_config.sample_format(),
            stream_config: supported_config.config(),
            device,
            stream: None,
            consumer: None,
            config,
        })
    }

    /// Liste les périphériques d'entrée disponibles
    pub fn list_devices() -> Vec<String> {
        let host = cpal::default_host();
        host.input_devices()
            .map(|devices| devices.filter_map(|d| d.name().ok()).collect())
            .unwrap_or_default()
    }

    fn build_stream(&self, producer: HeapProd<i16>) -> Result<Stream, MicrophoneError> {
        match self.sample_format {
            SampleFormat::F32 => self.build_typed_stream::<f32>(producer),
            SampleFormat::I16 => self.build_typed_stream::<i16>(producer),
            SampleFormat::U16 => self.build_typed_stream::<u16>(producer),
            other => Err(MicrophoneError::ConfigError(format!(
                "format d'échantillon non supporté: {other}"
            ))),
        }
    }

    fn build_typed_stream<T>(&self, mut producer: HeapProd<i16>) -> Result<Stream, MicrophoneError>
    where
        T: SizedSample,
        f32: FromSample<T>,
    {
        let channels = self.stream_config.channels.max(1) as usize;

        self.device
            .build_input_stream(
                &self.stream_config,
                move |data: &[T], _: &cpal::InputCallbackInfo| {
                    for frame in data.chunks(channels) {
                        // Buffer plein: l'échantillon est perdu
                        let _ = producer.try_push(downmix(frame));
                    }
                },
                |err| {
                    tracing::error!("Erreur stream audio: {}", err);
                },
                None,
            )
            .map_err(|e| MicrophoneError::StreamError(e.to_string()))
    }
}

/// Moyenne des canaux d'une trame, en PCM 16 bits
fn downmix<T>(frame: &[T]) -> i16
where
    T: Sample,
    f32: FromSample<T>,
{
    let sum: f32 = frame.iter().map(|&s| f32::from_sample(s)).sum();
    i16::from_sample(sum / frame.len() as f32)
}

impl AudioSource for Microphone {
    fn begin(&mut self) -> Result<(), MicrophoneError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let capacity = (self.stream_config.sample_rate.0 * self.config.buffer_secs.max(1)) as usize;
        let (producer, consumer) = HeapRb::<i16>::new(capacity).split();

        let stream = self.build_stream(producer)?;
        stream
            .play()
            .map_err(|e| MicrophoneError::StreamError(e.to_string()))?;

        self.stream = Some(stream);
        self.consumer = Some(consumer);
        tracing::info!("Capture audio démarrée");
        Ok(())
    }

    fn read(&mut self, buffer: &mut [i16]) -> Result<usize, MicrophoneError> {
        let consumer = self
            .consumer
            .as_mut()
            .ok_or(MicrophoneError::NotInitialized)?;

        let deadline = Instant::now() + self.config.read_timeout;
        let mut filled = 0;
        while filled < buffer.len() {
            filled += consumer.pop_slice(&mut buffer[filled..]);
            if filled == buffer.len() {
                break;
            }
            if Instant::now() >= deadline {
                return Err(MicrophoneError::Timeout(self.config.read_timeout));
            }
            thread::sleep(POLL_INTERVAL);
        }

        Ok(filled)
    }

    fn end(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                tracing::warn!("Impossible de mettre le stream en pause: {}", e);
            }
            tracing::info!("Capture audio arrêtée");
        }
        self.consumer = None;
    }

    fn sample_rate(&self) -> u32 {
        self.stream_config.sample_rate.0
    }
}

impl Drop for Microphone {
    fn drop(&mut self) {
        self.end();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downmix_mono_i16() {
        assert_eq!(downmix(&[1000i16]), 1000);
    }

    #[test]
    fn test_downmix_averages_channels() {
        assert_eq!(downmix(&[0.5f32, -0.5]), 0);
        assert_eq!(downmix(&[0.5f32, 0.5]), i16::from_sample(0.5f32));
    }

    #[test]
    fn test_downmix_unsigned() {
        // Le point milieu u16 correspond au silence
        assert_eq!(downmix(&[32768u16]), 0);
    }
}
