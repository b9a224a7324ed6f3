//! Handle partagé entre le producteur et les vues

use super::sample_buffer::{PushOutcome, ReadCursor, SampleBuffer};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Buffer partagé entre le thread de capture et les consommateurs
///
/// Chaque clone pointe vers le même `SampleBuffer`. Le mutex est un mutex
/// std car le producteur tourne dans un thread hors runtime tokio.
#[derive(Debug, Clone, Default)]
pub struct SharedBuffer {
    inner: Arc<Mutex<SampleBuffer>>,
}

impl SharedBuffer {
    pub fn new(buffer: SampleBuffer) -> Self {
        Self {
            inner: Arc::new(Mutex::new(buffer)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SampleBuffer> {
        // Un panic côté producteur ne doit pas bloquer l'affichage
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Exécute `f` avec le buffer verrouillé
    pub fn with<R>(&self, f: impl FnOnce(&mut SampleBuffer) -> R) -> R {
        f(&mut self.lock())
    }

    pub fn start_recording(&self) {
        self.lock().start_recording();
    }

    pub fn stop_recording(&self) {
        self.lock().stop_recording();
    }

    pub fn push(&self, sample: f32) -> PushOutcome {
        self.lock().push(sample)
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn snapshot(&self) -> Vec<f32> {
        self.lock().snapshot()
    }

    pub fn set_time_limit(&self, limit: Option<Duration>) {
        self.lock().set_time_limit(limit);
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.lock().time_limit()
    }

    pub fn time_limit_reached(&self) -> bool {
        self.lock().time_limit_reached()
    }

    pub fn is_exhausted(&self) -> bool {
        self.lock().is_exhausted()
    }

    pub fn is_recording(&self) -> bool {
        self.lock().is_recording()
    }

    pub fn write_cursor(&self) -> usize {
        self.lock().write_cursor()
    }

    pub fn capacity(&self) -> usize {
        self.lock().capacity()
    }

    /// Crée un lecteur avec un curseur neuf
    pub fn reader(&self) -> SharedReader {
        SharedReader {
            buffer: self.clone(),
            cursor: ReadCursor::new(),
        }
    }
}

/// Consommateur: un handle vers le buffer et son propre curseur
#[derive(Debug, Clone)]
pub struct SharedReader {
    buffer: SharedBuffer,
    cursor: ReadCursor,
}

impl SharedReader {
    pub fn read_latest(&mut self) -> f32 {
        let buffer = self.buffer.lock();
        self.cursor.read_latest(&buffer)
    }

    pub fn position(&self) -> usize {
        self.cursor.position()
    }

    pub fn buffer(&self) -> &SharedBuffer {
        &self.buffer
    }
}
