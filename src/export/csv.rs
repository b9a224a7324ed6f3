//! Export de la fenêtre enregistrée en texte délimité

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Erreurs d'export
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Erreur d'écriture de {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Erreur de lecture WAV: {0}")]
    Wav(#[from] hound::Error),
}

impl ExportError {
    pub(crate) fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Collaborateur de persistance de la fenêtre enregistrée
#[cfg_attr(test, mockall::automock)]
pub trait Exporter {
    /// Écrit les points à partir de `stem` et retourne le chemin créé
    fn export(&self, stem: &Path, points: &[(f64, f32)]) -> Result<PathBuf, ExportError>;
}

/// Export CSV `time,amplitude`
#[derive(Debug, Clone, Default)]
pub struct CsvExporter;

impl Exporter for CsvExporter {
    fn export(&self, stem: &Path, points: &[(f64, f32)]) -> Result<PathBuf, ExportError> {
        let path = with_suffix(stem, "csv");
        let file = File::create(&path).map_err(|e| ExportError::io(&path, e))?;
        let mut out = BufWriter::new(file);

        write_rows(&mut out, points).map_err(|e| ExportError::io(&path, e))?;

        tracing::info!("{} points exportés dans {}", points.len(), path.display());
        Ok(path)
    }
}

fn write_rows<W: Write>(out: &mut W, points: &[(f64, f32)]) -> std::io::Result<()> {
    writeln!(out, "time,amplitude")?;
    for (t, v) in points {
        writeln!(out, "{t},{v}")?;
    }
    out.flush()
}

/// Ajoute une extension sans remplacer celle qui existe déjà
pub fn with_suffix(stem: &Path, extension: &str) -> PathBuf {
    let mut name = stem.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

/// Points (temps, amplitude) d'une suite d'échantillons bruts
pub fn points_from_samples(samples: &[f32], interval: Duration) -> Vec<(f64, f32)> {
    let step = interval.as_secs_f64();
    samples
        .iter()
        .enumerate()
        .map(|(i, &v)| (i as f64 * step, v))
        .collect()
}
