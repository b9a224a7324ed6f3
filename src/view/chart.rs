//! Affichage des courbes
//!
//! `ChartSink` est le point d'entrée de tout afficheur; `TerminalChart`
//! dessine un vumètre d'une ligne.

use std::io::Write;

/// Afficheur de points (temps, amplitude)
pub trait ChartSink {
    /// Redessine la courbe complète
    fn redraw(&mut self, title: &str, points: &[(f64, f32)]);
}

const BAR_WIDTH: usize = 40;

/// Vumètre texte: niveau du dernier point sur une ligne réécrite
pub struct TerminalChart<W: Write> {
    out: W,
    full_scale: f32,
}

impl<W: Write> TerminalChart<W> {
    pub fn new(out: W, full_scale: f32) -> Self {
        Self {
            out,
            full_scale: full_scale.abs().max(f32::EPSILON),
        }
    }

    /// Termine la ligne courante
    pub fn finish(&mut self) {
        if let Err(e) = writeln!(self.out).and_then(|_| self.out.flush()) {
            tracing::debug!("Affichage impossible: {}", e);
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> ChartSink for TerminalChart<W> {
    fn redraw(&mut self, title: &str, points: &[(f64, f32)]) {
        let (time, value) = points.last().copied().unwrap_or_default();
        let line = format!(
            "\r{:<12} |{}| {:+7.3} V  t={:>7.2}s  ({} pts)",
            title,
            level_bar(value, self.full_scale),
            value,
            time,
            points.len()
        );

        if let Err(e) = self.out.write_all(line.as_bytes()).and_then(|_| self.out.flush()) {
            tracing::debug!("Affichage impossible: {}", e);
        }
    }
}

fn level_bar(value: f32, full_scale: f32) -> String {
    let ratio = (value.abs() / full_scale).clamp(0.0, 1.0);
    let filled = (ratio * BAR_WIDTH as f32).round() as usize;
    format!("{}{}", "#".repeat(filled), " ".repeat(BAR_WIDTH - filled))
}
