//! Vue d'enregistrement: fenêtre enregistrée lue depuis le buffer partagé

use crate::buffer::SharedReader;
use std::time::Duration;

/// Résultat d'un `tick()`
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickOutcome {
    /// Un point a été ajouté
    Appended(f32),
    /// La durée maximale est atteinte, l'enregistrement doit s'arrêter
    LimitReached,
    /// Le buffer a refusé des échantillons (politique `Stop`)
    BufferFull,
    /// Le buffer n'enregistre pas (pause): aucun point ajouté
    Paused,
}

/// Trace accumulée pendant l'enregistrement
///
/// Chaque `tick()` lit la dernière valeur via son propre curseur et
/// ajoute un point; l'abscisse avance de l'intervalle d'échantillonnage.
#[derive(Debug, Clone)]
pub struct RecordingView {
    reader: SharedReader,
    interval: Duration,
    points: Vec<(f64, f32)>,
    next_time: f64,
}

impl RecordingView {
    pub fn new(reader: SharedReader, interval: Duration) -> Self {
        Self {
            reader,
            interval,
            points: Vec::new(),
            next_time: 0.0,
        }
    }

    pub fn tick(&mut self) -> TickOutcome {
        let buffer = self.reader.buffer();
        if buffer.time_limit_reached() {
            return TickOutcome::LimitReached;
        }
        if let Some(limit) = buffer.time_limit() {
            if self.next_time >= limit.as_secs_f64() {
                return TickOutcome::LimitReached;
            }
        }
        if buffer.is_exhausted() {
            return TickOutcome::BufferFull;
        }
        if !buffer.is_recording() {
            return TickOutcome::Paused;
        }

        let value = self.reader.read_latest();
        self.points.push((self.next_time, value));
        self.next_time += self.interval.as_secs_f64();
        TickOutcome::Appended(value)
    }

    /// Fenêtre enregistrée (source de l'export)
    pub fn points(&self) -> &[(f64, f32)] {
        &self.points
    }

    pub fn duration(&self) -> f64 {
        self.next_time
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn reader(&self) -> &SharedReader {
        &self.reader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::buffer::{OverflowPolicy, SampleBuffer, SharedBuffer};

    fn recording(capacity: usize, policy: OverflowPolicy) -> SharedBuffer {
        let buffer = SharedBuffer::new(SampleBuffer::with_policy(capacity, policy));
        buffer.start_recording();
        buffer
    }

    #[test]
    fn test_tick_appends_latest_values() {
        let buffer = recording(16, OverflowPolicy::Reset);
        let mut view = RecordingView::new(buffer.reader(), Duration::from_millis(500));

        buffer.push(1.0);
        assert_eq!(view.tick(), TickOutcome::Appended(1.0));
        buffer.push(2.0);
        assert_eq!(view.tick(), TickOutcome::Appended(2.0));

        assert_eq!(view.points(), &[(0.0, 1.0), (0.5, 2.0)]);
        assert_eq!(view.duration(), 1.0);
    }

    #[test]
    fn test_tick_faster_than_producer_repeats_latest() {
        let buffer = recording(16, OverflowPolicy::Reset);
        let mut view = RecordingView::new(buffer.reader(), Duration::from_millis(20));

        buffer.push(1.5);
        assert_eq!(view.tick(), TickOutcome::Appended(1.5));
        assert_eq!(view.tick(), TickOutcome::Appended(1.5));
        buffer.push(-0.5);
        assert_eq!(view.tick(), TickOutcome::Appended(-0.5));

        let values: Vec<f32> = view.points().iter().map(|p| p.1).collect();
        assert_eq!(values, vec![1.5, 1.5, -0.5]);
    }

    #[test]
    fn test_paused_buffer_adds_no_points() {
        let buffer = recording(16, OverflowPolicy::Reset);
        let mut view = RecordingView::new(buffer.reader(), Duration::from_millis(20));

        buffer.push(1.0);
        assert_eq!(view.tick(), TickOutcome::Appended(1.0));

        buffer.stop_recording();
        assert_eq!(view.tick(), TickOutcome::Paused);
        assert_eq!(view.tick(), TickOutcome::Paused);
        assert_eq!(view.points().len(), 1);
        assert_eq!(view.duration(), 0.02);

        buffer.start_recording();
        buffer.push(2.0);
        assert!(matches!(view.tick(), TickOutcome::Appended(_)));
        assert_eq!(view.points().len(), 2);
    }

    #[test]
    fn test_limit_reached_on_time_axis() {
        let buffer = recording(16, OverflowPolicy::Reset);
        buffer.set_time_limit(Some(Duration::from_secs(3600)));
        let mut view = RecordingView::new(buffer.reader(), Duration::from_secs(1800));

        assert!(matches!(view.tick(), TickOutcome::Appended(_)));
        assert!(matches!(view.tick(), TickOutcome::Appended(_)));
        assert_eq!(view.tick(), TickOutcome::LimitReached);
        assert_eq!(view.points().len(), 2);
    }

    #[test]
    fn test_limit_reached_on_wall_clock() {
        let buffer = recording(16, OverflowPolicy::Reset);
        buffer.set_time_limit(Some(Duration::from_millis(1)));
        std::thread::sleep(Duration::from_millis(5));

        let mut view = RecordingView::new(buffer.reader(), Duration::from_micros(1));
        assert_eq!(view.tick(), TickOutcome::LimitReached);
        assert!(view.points().is_empty());
    }

    #[test]
    fn test_buffer_full_with_stop_policy() {
        let buffer = recording(2, OverflowPolicy::Stop);
        let mut view = RecordingView::new(buffer.reader(), Duration::from_millis(20));

        buffer.push(1.0);
        buffer.push(2.0);
        assert!(matches!(view.tick(), TickOutcome::Appended(_)));

        buffer.push(3.0);
        assert_eq!(view.tick(), TickOutcome::BufferFull);
    }

    #[test]
    fn test_no_limit_keeps_going() {
        let buffer = recording(4, OverflowPolicy::Reset);
        let mut view = RecordingView::new(buffer.reader(), Duration::from_secs(10));

        for _ in 0..50 {
            assert!(matches!(view.tick(), TickOutcome::Appended(_)));
        }
        assert!(view.reader().position() <= buffer.write_cursor());
    }
}
