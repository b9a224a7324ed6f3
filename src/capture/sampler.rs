//! Échantillonneur temps réel
//!
//! Un thread dédié possède la source audio. À chaque itération il lit un
//! intervalle d'audio, garde la première trame, la pousse dans le buffer
//! partagé et la diffuse aux vues live.

use crate::audio::{chunk_len, normalize, AudioSource, MicrophoneError, DEFAULT_SCALE};
use crate::buffer::{PushOutcome, SharedBuffer};
use std::sync::mpsc::{self, TryRecvError};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;

/// Intervalle minimal (en dessous, certaines cartes son débordent)
pub const MIN_INTERVAL: Duration = Duration::from_millis(20);
/// Intervalle maximal
pub const MAX_INTERVAL: Duration = Duration::from_millis(500);

/// Configuration de l'échantillonneur
#[derive(Debug, Clone)]
pub struct SamplerConfig {
    /// Intervalle entre deux échantillons affichés
    pub sample_interval: Duration,
    /// Amplitude correspondant à la pleine échelle PCM
    pub scale: f32,
}

impl SamplerConfig {
    /// Configuration avec un intervalle en secondes, borné à [0.02, 0.5]
    pub fn with_interval_secs(secs: f64) -> Self {
        let secs = if secs.is_finite() { secs } else { 0.0 };
        let interval = Duration::from_secs_f64(
            secs.clamp(MIN_INTERVAL.as_secs_f64(), MAX_INTERVAL.as_secs_f64()),
        );
        Self {
            sample_interval: interval,
            ..Default::default()
        }
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            sample_interval: MIN_INTERVAL,
            scale: DEFAULT_SCALE,
        }
    }
}

/// Un échantillon diffusé aux vues live
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LiveSample {
    /// Numéro d'ordre depuis le démarrage de l'échantillonneur
    pub sequence: u64,
    /// Amplitude normalisée
    pub value: f32,
}

impl LiveSample {
    /// Instant de l'échantillon (s) pour un intervalle donné
    pub fn time(&self, interval: Duration) -> f64 {
        self.sequence as f64 * interval.as_secs_f64()
    }
}

/// Erreurs de l'échantillonneur
#[derive(Error, Debug)]
pub enum SamplerError {
    #[error("Erreur audio: {0}")]
    AudioError(#[from] MicrophoneError),

    #[error("Échantillonneur déjà en cours d'exécution")]
    AlreadyRunning,

    #[error("Le thread d'acquisition s'est arrêté brutalement")]
    ThreadPanicked,
}

/// État de l'échantillonneur
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SamplerStatus {
    /// Thread arrêté
    Stopped,
    /// Acquisition en cours
    Running,
    /// La source a échoué en cours d'acquisition
    Error(String),
}

enum SamplerCommand {
    Stop,
}

/// Handle vers le thread d'acquisition
pub struct Sampler {
    config: SamplerConfig,
    status: Arc<Mutex<SamplerStatus>>,
    live_tx: broadcast::Sender<LiveSample>,
    command_tx: Option<mpsc::Sender<SamplerCommand>>,
    thread_handle: Option<JoinHandle<()>>,
}

impl Sampler {
    pub fn new(config: SamplerConfig) -> Self {
        let (live_tx, _) = broadcast::channel(100);

        Self {
            config,
            status: Arc::new(Mutex::new(SamplerStatus::Stopped)),
            live_tx,
            command_tx: None,
            thread_handle: None,
        }
    }

    /// Lance l'acquisition dans un thread dédié
    ///
    /// `open` est appelé dans ce thread. Les erreurs d'ouverture ou de
    /// `begin()` sont renvoyées ici.
    pub fn start<S, F>(&mut self, open: F, buffer: SharedBuffer) -> Result<(), SamplerError>
    where
        S: AudioSource + 'static,
        F: FnOnce() -> Result<S, MicrophoneError> + Send + 'static,
    {
        if self.thread_handle.is_some() {
            return Err(SamplerError::AlreadyRunning);
        }

        let (command_tx, command_rx) = mpsc::channel();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<u32, MicrophoneError>>();
        let config = self.config.clone();
        let status = Arc::clone(&self.status);
        let live_tx = self.live_tx.clone();

        let thread_handle = thread::spawn(move || {
            let mut source = match open().and_then(|mut s| s.begin().map(|_| s)) {
                Ok(source) => source,
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                    return;
                }
            };

            let _ = ready_tx.send(Ok(source.sample_rate()));
            run_sampler(&mut source, &config, &buffer, &live_tx, &command_rx, &status);
            source.end();
        });

        match ready_rx.recv() {
            Ok(Ok(sample_rate)) => {
                tracing::info!(
                    "Échantillonneur démarré: {}Hz, intervalle {:?}",
                    sample_rate,
                    self.config.sample_interval
                );
                self.command_tx = Some(command_tx);
                self.thread_handle = Some(thread_handle);
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = thread_handle.join();
                Err(e.into())
            }
            Err(_) => {
                let _ = thread_handle.join();
                Err(SamplerError::ThreadPanicked)
            }
        }
    }

    /// Arrête l'acquisition et attend la fin du thread
    pub fn stop(&mut self) -> Result<(), SamplerError> {
        if let Some(command_tx) = self.command_tx.take() {
            let _ = command_tx.send(SamplerCommand::Stop);
        }

        if let Some(handle) = self.thread_handle.take() {
            handle.join().map_err(|_| SamplerError::ThreadPanicked)?;
            tracing::info!("Échantillonneur arrêté");
        }
        Ok(())
    }

    pub fn status(&self) -> SamplerStatus {
        self.status
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// S'abonne au flux d'échantillons live
    pub fn subscribe(&self) -> broadcast::Receiver<LiveSample> {
        self.live_tx.subscribe()
    }

    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn set_status(status: &Mutex<SamplerStatus>, value: SamplerStatus) {
    *status.lock().unwrap_or_else(PoisonError::into_inner) = value;
}

/// Boucle d'acquisition (dans le thread dédié)
fn run_sampler<S: AudioSource>(
    source: &mut S,
    config: &SamplerConfig,
    buffer: &SharedBuffer,
    live_tx: &broadcast::Sender<LiveSample>,
    command_rx: &mpsc::Receiver<SamplerCommand>,
    status: &Mutex<SamplerStatus>,
) {
    let mut chunk = vec![0i16; chunk_len(config.sample_interval, source.sample_rate())];
    let mut sequence = 0u64;

    set_status(status, SamplerStatus::Running);

    loop {
        match command_rx.try_recv() {
            Ok(SamplerCommand::Stop) | Err(TryRecvError::Disconnected) => break,
            Err(TryRecvError::Empty) => {}
        }

        match source.read(&mut chunk) {
            Ok(0) => continue,
            Ok(_) => {
                let value = normalize(chunk[0], config.scale);

                match buffer.push(value) {
                    PushOutcome::Reset => {
                        tracing::warn!("Buffer plein: contenu précédent effacé");
                    }
                    PushOutcome::Full => {
                        tracing::warn!("Buffer plein: enregistrement interrompu");
                    }
                    PushOutcome::Stored | PushOutcome::Ignored => {}
                }

                // Aucun abonné n'est une situation normale
                let _ = live_tx.send(LiveSample { sequence, value });
                sequence += 1;
            }
            Err(e) => {
                tracing::error!("Erreur d'acquisition: {}", e);
                set_status(status, SamplerStatus::Error(e.to_string()));
                return;
            }
        }
    }

    set_status(status, SamplerStatus::Stopped);
}
