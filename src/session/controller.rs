//! Contrôleur de session d'acquisition
//!
//! Possède le buffer partagé et l'échantillonneur; les vues reçoivent un
//! handle explicite à leur création.

use crate::audio::{AudioSource, MicrophoneError};
use crate::buffer::{OverflowPolicy, SampleBuffer, SharedBuffer, DEFAULT_CAPACITY};
use crate::capture::{LiveSample, Sampler, SamplerConfig, SamplerError, SamplerStatus};
use crate::export::{ExportError, Exporter};
use crate::view::{LiveView, RecordingView};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::broadcast;

/// Préfixe des fichiers générés automatiquement
pub const FILE_PREFIX: &str = "new_wavy_data_";

/// Configuration d'une session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Capacité du buffer d'enregistrement
    pub capacity: usize,
    /// Politique de débordement du buffer
    pub policy: OverflowPolicy,
    pub sampler: SamplerConfig,
    /// Dossier des exports
    pub data_folder: PathBuf,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            policy: OverflowPolicy::default(),
            sampler: SamplerConfig::default(),
            data_folder: PathBuf::from("."),
        }
    }
}

/// Erreurs de session
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Erreur d'acquisition: {0}")]
    SamplerError(#[from] SamplerError),

    #[error("Enregistrement déjà en cours")]
    AlreadyRecording,

    #[error("Aucun enregistrement en cours")]
    NotRecording,

    #[error("Export impossible: l'enregistrement n'est pas arrêté")]
    NotStopped,

    #[error("Erreur d'export: {0}")]
    ExportError(#[from] ExportError),
}

/// État de la session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Rien n'a encore été enregistré
    Idle,
    /// Enregistrement en cours
    Recording,
    /// Enregistrement suspendu
    Paused,
    /// Enregistrement terminé, export possible
    Stopped,
}

/// Session d'acquisition: buffer + échantillonneur + état d'enregistrement
pub struct CaptureSession {
    config: SessionConfig,
    buffer: SharedBuffer,
    sampler: Sampler,
    state: SessionState,
    /// `None` tant que rien n'a été acquis
    saved: Option<bool>,
    file_stem: Option<PathBuf>,
}

impl CaptureSession {
    pub fn new(config: SessionConfig) -> Self {
        let buffer = SharedBuffer::new(SampleBuffer::with_policy(config.capacity, config.policy));
        let sampler = Sampler::new(config.sampler.clone());

        Self {
            config,
            buffer,
            sampler,
            state: SessionState::Idle,
            saved: None,
            file_stem: None,
        }
    }

    /// Démarre l'acquisition live
    ///
    /// Un échec ici (pas de périphérique) est fatal pour l'application.
    pub fn start_capture<S, F>(&mut self, open: F) -> Result<(), SessionError>
    where
        S: AudioSource + 'static,
        F: FnOnce() -> Result<S, MicrophoneError> + Send + 'static,
    {
        self.sampler.start(open, self.buffer.clone())?;
        Ok(())
    }

    /// S'abonne au flux live
    pub fn subscribe_live(&self) -> broadcast::Receiver<LiveSample> {
        self.sampler.subscribe()
    }

    /// Crée une vue live sur une fenêtre de temps
    pub fn live_view(&self, time_window: Duration) -> LiveView {
        LiveView::new(time_window, self.config.sampler.sample_interval)
    }

    /// Démarre un nouvel enregistrement
    ///
    /// Le buffer est vidé; la vue retournée lit ce buffer avec son propre
    /// curseur.
    pub fn record(&mut self, time_limit: Option<Duration>) -> Result<RecordingView, SessionError> {
        if matches!(self.state, SessionState::Recording | SessionState::Paused) {
            return Err(SessionError::AlreadyRecording);
        }

        if self.saved == Some(false) {
            tracing::warn!("Les données précédentes n'ont pas été exportées");
        }

        let stem = self.config.data_folder.join(new_file_name());
        tracing::info!("Nouvel enregistrement: {}", stem.display());

        self.buffer.with(|buffer| {
            buffer.clear();
            buffer.set_time_limit(time_limit);
            buffer.start_recording();
        });

        self.file_stem = Some(stem);
        self.saved = Some(false);
        self.state = SessionState::Recording;

        Ok(RecordingView::new(
            self.buffer.reader(),
            self.config.sampler.sample_interval,
        ))
    }

    /// Bascule entre enregistrement et pause
    pub fn pause(&mut self) -> Result<SessionState, SessionError> {
        self.state = match self.state {
            SessionState::Recording => {
                self.buffer.stop_recording();
                tracing::info!("Enregistrement en pause");
                SessionState::Paused
            }
            SessionState::Paused => {
                self.buffer.start_recording();
                tracing::info!("Enregistrement repris");
                SessionState::Recording
            }
            SessionState::Idle | SessionState::Stopped => return Err(SessionError::NotRecording),
        };
        Ok(self.state)
    }

    /// Arrête l'enregistrement
    ///
    /// Retourne la plage valide du buffer telle qu'elle était à l'arrêt.
    pub fn stop(&mut self) -> Result<Vec<f32>, SessionError> {
        if !matches!(self.state, SessionState::Recording | SessionState::Paused) {
            return Err(SessionError::NotRecording);
        }

        let samples = self.buffer.with(|buffer| {
            let samples = buffer.snapshot();
            buffer.stop_recording();
            samples
        });

        self.state = SessionState::Stopped;
        tracing::info!("Enregistrement arrêté ({} échantillons en buffer)", samples.len());
        Ok(samples)
    }

    /// Exporte des points vers le fichier de la session
    ///
    /// En cas d'échec l'état de la session ne change pas.
    pub fn export(
        &mut self,
        points: &[(f64, f32)],
        exporter: &dyn Exporter,
    ) -> Result<PathBuf, SessionError> {
        if self.state != SessionState::Stopped {
            return Err(SessionError::NotStopped);
        }
        let stem = self.file_stem.as_deref().ok_or(SessionError::NotStopped)?;

        match exporter.export(stem, points) {
            Ok(path) => {
                self.saved = Some(true);
                Ok(path)
            }
            Err(e) => {
                tracing::error!("Export échoué: {}", e);
                Err(e.into())
            }
        }
    }

    /// Arrête l'acquisition live
    pub fn shutdown(&mut self) -> Result<(), SessionError> {
        if matches!(self.state, SessionState::Recording | SessionState::Paused) {
            self.stop()?;
        }
        self.sampler.stop()?;
        Ok(())
    }

    /// Remplace le chemin d'export (sans extension)
    pub fn set_file_stem(&mut self, stem: impl Into<PathBuf>) {
        self.file_stem = Some(stem.into());
    }

    pub fn file_stem(&self) -> Option<&Path> {
        self.file_stem.as_deref()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// `None` si rien n'a été acquis
    pub fn is_saved(&self) -> Option<bool> {
        self.saved
    }

    pub fn buffer(&self) -> &SharedBuffer {
        &self.buffer
    }

    pub fn sampler_status(&self) -> SamplerStatus {
        self.sampler.status()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

/// Nom de fichier horodaté (UTC)
fn new_file_name() -> String {
    format!(
        "{FILE_PREFIX}{}",
        jiff::Timestamp::now().strftime("%Y%m%d%H%M%S")
    )
}
