//! Vue live: fenêtre glissante du signal entrant

use std::collections::VecDeque;
use std::time::Duration;

/// Fenêtre glissante de longueur fixe
///
/// Les abscisses vont de `-time_window` à 0, le point le plus récent à 0.
#[derive(Debug, Clone)]
pub struct LiveView {
    time_window: Duration,
    values: VecDeque<f32>,
}

impl LiveView {
    pub fn new(time_window: Duration, interval: Duration) -> Self {
        let len = window_len(time_window, interval);
        Self {
            time_window,
            values: VecDeque::from(vec![0.0; len]),
        }
    }

    /// Ajoute une valeur et fait défiler la fenêtre
    pub fn push(&mut self, value: f32) {
        self.values.pop_front();
        self.values.push_back(value);
    }

    pub fn latest(&self) -> f32 {
        self.values.back().copied().unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn time_window(&self) -> Duration {
        self.time_window
    }

    /// Points (temps, amplitude) à tracer
    pub fn points(&self) -> Vec<(f64, f32)> {
        let window = self.time_window.as_secs_f64();
        let len = self.values.len();
        let step = if len > 1 { window / (len - 1) as f64 } else { 0.0 };

        self.values
            .iter()
            .enumerate()
            .map(|(i, &v)| {
                let x = if len > 1 { -window + i as f64 * step } else { 0.0 };
                (x, v)
            })
            .collect()
    }
}

fn window_len(time_window: Duration, interval: Duration) -> usize {
    if interval.is_zero() {
        return 1;
    }
    ((time_window.as_secs_f64() / interval.as_secs_f64()) as usize).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_with_zeros() {
        let view = LiveView::new(Duration::from_secs(20), Duration::from_millis(20));
        assert_eq!(view.len(), 1000);
        assert_eq!(view.latest(), 0.0);

        let points = view.points();
        assert_eq!(points.first().unwrap().0, -20.0);
        assert_eq!(points.last().unwrap().0, 0.0);
    }

    #[test]
    fn test_push_scrolls() {
        let mut view = LiveView::new(Duration::from_millis(60), Duration::from_millis(20));
        assert_eq!(view.len(), 3);

        for v in [1.0, 2.0, 3.0, 4.0] {
            view.push(v);
        }

        let values: Vec<f32> = view.points().iter().map(|p| p.1).collect();
        assert_eq!(values, vec![2.0, 3.0, 4.0]);
        assert_eq!(view.latest(), 4.0);
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn test_degenerate_window() {
        let view = LiveView::new(Duration::ZERO, Duration::ZERO);
        assert_eq!(view.len(), 1);
        assert_eq!(view.points(), vec![(0.0, 0.0)]);
    }
}
