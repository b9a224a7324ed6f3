//! Conversion d'un fichier WAV en fichier de données
//!
//! Une ligne `temps    valeur` par trame, premier canal uniquement.

use super::csv::ExportError;
use hound::{SampleFormat, WavReader};
use std::fmt::Display;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// Propriétés d'un fichier WAV
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WavInfo {
    pub channels: u16,
    /// Taille d'un échantillon en octets
    pub sample_width: u16,
    pub frame_rate: u32,
    pub frames: u32,
}

impl WavInfo {
    fn from_reader(reader: &WavReader<BufReader<File>>) -> Self {
        let spec = reader.spec();
        Self {
            channels: spec.channels,
            sample_width: spec.bits_per_sample.div_ceil(8),
            frame_rate: spec.sample_rate,
            frames: reader.duration(),
        }
    }

    /// Durée en secondes
    pub fn duration_secs(&self) -> f64 {
        if self.frame_rate == 0 {
            return 0.0;
        }
        self.frames as f64 / self.frame_rate as f64
    }
}

/// Lit les propriétés d'un fichier WAV
pub fn read_wav_info(path: &Path) -> Result<WavInfo, ExportError> {
    let reader = WavReader::open(path)?;
    Ok(WavInfo::from_reader(&reader))
}

/// Chemin `.dat` par défaut: même dossier, même nom
pub fn default_dat_path(input: &Path) -> PathBuf {
    input.with_extension("dat")
}

/// Convertit `input` (WAV) en `output` (données texte)
pub fn convert_wav(input: &Path, output: &Path) -> Result<WavInfo, ExportError> {
    let mut reader = WavReader::open(input)?;
    let info = WavInfo::from_reader(&reader);
    tracing::info!(
        "{}: {} canaux, {} octets/échantillon, {}Hz, {} trames",
        input.display(),
        info.channels,
        info.sample_width,
        info.frame_rate,
        info.frames
    );

    let file = File::create(output).map_err(|e| ExportError::io(output, e))?;
    let mut out = BufWriter::new(file);
    let channels = info.channels.max(1) as usize;
    let rate = info.frame_rate.max(1) as f64;

    let written = match reader.spec().sample_format {
        SampleFormat::Int => write_frames(&mut out, reader.samples::<i32>(), channels, rate, output)?,
        SampleFormat::Float => {
            write_frames(&mut out, reader.samples::<f32>(), channels, rate, output)?
        }
    };
    out.flush().map_err(|e| ExportError::io(output, e))?;

    tracing::info!("Conversion terminée: {} lignes dans {}", written, output.display());
    Ok(info)
}

fn write_frames<W, T, I>(
    out: &mut W,
    samples: I,
    channels: usize,
    rate: f64,
    path: &Path,
) -> Result<usize, ExportError>
where
    W: Write,
    T: Display,
    I: Iterator<Item = hound::Result<T>>,
{
    let mut written = 0;
    for (index, sample) in samples.step_by(channels).enumerate() {
        let value = sample?;
        writeln!(out, "{}    {}", index as f64 / rate, value).map_err(|e| ExportError::io(path, e))?;
        written += 1;
    }
    Ok(written)
}
