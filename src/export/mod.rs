//! Module d'export
//!
//! Persistance de la fenêtre enregistrée et conversion WAV → données.

mod csv;
mod wav;

pub use csv::{points_from_samples, with_suffix, CsvExporter, ExportError, Exporter};
pub use wav::{convert_wav, default_dat_path, read_wav_info, WavInfo};

#[cfg(test)]
pub use csv::MockExporter;
