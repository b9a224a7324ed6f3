//! Buffer circulaire d'échantillons
//!
//! Un seul producteur écrit avec `push`, chaque consommateur lit avec son
//! propre `ReadCursor`. Le buffer ne fait aucune I/O.

use std::str::FromStr;
use std::time::{Duration, Instant};

/// Capacité par défaut (en échantillons)
pub const DEFAULT_CAPACITY: usize = 1024;

/// Comportement quand le curseur d'écriture atteint la capacité
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverflowPolicy {
    /// Remet le stockage à zéro et repart du début (le contenu précédent est perdu)
    #[default]
    Reset,
    /// Écrase l'échantillon le plus ancien (vrai ring buffer)
    Overwrite,
    /// Refuse les nouveaux échantillons et quitte l'enregistrement
    Stop,
}

impl OverflowPolicy {
    /// Nom utilisé en ligne de commande
    pub fn name(&self) -> &str {
        match self {
            OverflowPolicy::Reset => "reset",
            OverflowPolicy::Overwrite => "overwrite",
            OverflowPolicy::Stop => "stop",
        }
    }
}

impl FromStr for OverflowPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reset" => Ok(OverflowPolicy::Reset),
            "overwrite" | "ring" => Ok(OverflowPolicy::Overwrite),
            "stop" => Ok(OverflowPolicy::Stop),
            other => Err(format!("politique de débordement inconnue: {other}")),
        }
    }
}

/// Résultat d'un `push`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushOutcome {
    /// Pas d'enregistrement en cours, rien n'a été écrit
    Ignored,
    /// Échantillon stocké
    Stored,
    /// Le stockage a été remis à zéro avant d'écrire l'échantillon
    Reset,
    /// Buffer plein, échantillon refusé
    Full,
}

/// Buffer d'échantillons de capacité fixe
#[derive(Debug, Clone)]
pub struct SampleBuffer {
    data: Vec<f32>,
    /// Nombre d'écritures depuis le dernier reset
    counter: usize,
    recording: bool,
    started_at: Option<Instant>,
    time_limit: Option<Duration>,
    policy: OverflowPolicy,
}

impl SampleBuffer {
    /// Crée un buffer avec la politique par défaut
    pub fn new(capacity: usize) -> Self {
        Self::with_policy(capacity, OverflowPolicy::default())
    }

    /// Crée un buffer avec une politique de débordement explicite
    ///
    /// Une capacité nulle est ramenée à 1.
    pub fn with_policy(capacity: usize, policy: OverflowPolicy) -> Self {
        Self {
            data: vec![0.0; capacity.max(1)],
            counter: 0,
            recording: false,
            started_at: None,
            time_limit: None,
            policy,
        }
    }

    /// Démarre l'enregistrement et remet le compteur d'écriture à zéro
    pub fn start_recording(&mut self) {
        self.started_at = Some(Instant::now());
        self.recording = true;
        self.counter = 0;
    }

    /// Arrête l'enregistrement (idempotent)
    pub fn stop_recording(&mut self) {
        self.started_at = None;
        self.recording = false;
        self.counter = 0;
    }

    /// Ajoute un échantillon au curseur d'écriture
    ///
    /// Sans enregistrement en cours, l'appel ne fait rien.
    pub fn push(&mut self, sample: f32) -> PushOutcome {
        if !self.recording {
            return PushOutcome::Ignored;
        }

        let capacity = self.capacity();
        match self.policy {
            OverflowPolicy::Reset => {
                let outcome = if self.counter >= capacity {
                    self.clear();
                    PushOutcome::Reset
                } else {
                    PushOutcome::Stored
                };
                self.data[self.counter] = sample;
                self.counter += 1;
                outcome
            }
            OverflowPolicy::Overwrite => {
                self.data[self.counter % capacity] = sample;
                self.counter += 1;
                PushOutcome::Stored
            }
            OverflowPolicy::Stop => {
                if self.counter >= capacity {
                    // Le compteur est conservé pour que snapshot() reste valide
                    self.recording = false;
                    return PushOutcome::Full;
                }
                self.data[self.counter] = sample;
                self.counter += 1;
                PushOutcome::Stored
            }
        }
    }

    /// Remet le stockage à zéro en conservant la capacité
    pub fn clear(&mut self) {
        self.data.fill(0.0);
        self.counter = 0;
    }

    /// Copie de la plage valide, du plus ancien au plus récent
    pub fn snapshot(&self) -> Vec<f32> {
        let capacity = self.capacity();
        if self.counter <= capacity {
            return self.data[..self.counter].to_vec();
        }

        let start = self.counter % capacity;
        self.data[start..]
            .iter()
            .chain(&self.data[..start])
            .copied()
            .collect()
    }

    /// Définit la durée maximale d'enregistrement (`None` ou zéro = illimitée)
    pub fn set_time_limit(&mut self, limit: Option<Duration>) {
        self.time_limit = limit.filter(|l| !l.is_zero());
    }

    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    /// Temps écoulé depuis le début de l'enregistrement
    pub fn elapsed(&self) -> Option<Duration> {
        self.started_at.map(|t| t.elapsed())
    }

    /// Vrai si un enregistrement a dépassé sa durée maximale
    pub fn time_limit_reached(&self) -> bool {
        match (self.elapsed(), self.time_limit) {
            (Some(elapsed), Some(limit)) => elapsed >= limit,
            _ => false,
        }
    }

    /// Vrai si la politique `Stop` a refusé des échantillons
    pub fn is_exhausted(&self) -> bool {
        self.policy == OverflowPolicy::Stop && self.counter >= self.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn write_cursor(&self) -> usize {
        self.counter
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    fn value_at(&self, position: usize) -> f32 {
        self.data[position % self.capacity()]
    }
}

impl Default for SampleBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

/// Curseur de lecture d'un consommateur
///
/// Le curseur ne dépasse jamais le curseur d'écriture du buffer lu.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadCursor {
    position: usize,
}

impl ReadCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Lit l'échantillon suivant, en rattrapant le producteur si besoin
    ///
    /// - en retard: lit l'échantillon non lu le plus ancien et avance;
    /// - à jour: relit le dernier échantillon écrit (0.0 si aucun);
    /// - en avance (le producteur a été remis à zéro): recule jusqu'au
    ///   curseur d'écriture et retourne 0.0.
    pub fn read_latest(&mut self, buffer: &SampleBuffer) -> f32 {
        let producer = buffer.write_cursor();
        if self.position > producer {
            self.position = producer;
            return 0.0;
        }

        if self.position < producer {
            let value = buffer.value_at(self.position);
            self.position += 1;
            return value;
        }

        match producer.checked_sub(1) {
            Some(latest) => buffer.value_at(latest),
            None => 0.0,
        }
    }
}
