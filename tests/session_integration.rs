//! Tests d'intégration de la session d'acquisition
//!
//! Une source audio synthétique remplace le microphone:
//! ```bash
//! cargo test --test session_integration
//! ```

use std::thread;
use std::time::{Duration, Instant};
use tokio::sync::broadcast::error::TryRecvError;
use wavy_lib::audio::{AudioSource, MicrophoneError};
use wavy_lib::buffer::OverflowPolicy;
use wavy_lib::capture::{SamplerConfig, SamplerStatus};
use wavy_lib::export::CsvExporter;
use wavy_lib::session::{CaptureSession, SessionConfig, SessionState};
use wavy_lib::view::TickOutcome;

/// Source qui produit une rampe PCM, une valeur par lecture
struct RampSource {
    next: i16,
    open: bool,
}

impl RampSource {
    fn new() -> Self {
        Self { next: 0, open: false }
    }
}

impl AudioSource for RampSource {
    fn begin(&mut self) -> Result<(), MicrophoneError> {
        self.open = true;
        Ok(())
    }

    fn read(&mut self, buffer: &mut [i16]) -> Result<usize, MicrophoneError> {
        if !self.open {
            return Err(MicrophoneError::NotInitialized);
        }
        buffer.fill(self.next);
        self.next = self.next.wrapping_add(1);
        thread::sleep(Duration::from_millis(1));
        Ok(buffer.len())
    }

    fn end(&mut self) {
        self.open = false;
    }

    fn sample_rate(&self) -> u32 {
        1000
    }
}

fn new_session(capacity: usize, policy: OverflowPolicy, folder: &std::path::Path) -> CaptureSession {
    CaptureSession::new(SessionConfig {
        capacity,
        policy,
        sampler: SamplerConfig::default(),
        data_folder: folder.to_path_buf(),
    })
}

fn wait_until(mut condition: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(Instant::now() < deadline, "condition jamais atteinte");
        thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn record_and_export_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = new_session(10_000, OverflowPolicy::Reset, dir.path());
    session.start_capture(|| Ok(RampSource::new())).unwrap();

    let mut recording = session.record(None).unwrap();
    wait_until(|| session.buffer().write_cursor() >= 20);

    for _ in 0..10 {
        assert!(matches!(recording.tick(), TickOutcome::Appended(_)));
    }

    let raw = session.stop().unwrap();
    assert!(raw.len() >= 20);
    assert_eq!(session.state(), SessionState::Stopped);

    let path = session.export(recording.points(), &CsvExporter).unwrap();
    let content = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines[0], "time,amplitude");
    assert_eq!(lines.len(), 11);

    // Les valeurs lues suivent la rampe: strictement croissantes
    let values: Vec<f32> = lines[1..]
        .iter()
        .map(|l| l.split(',').nth(1).unwrap().parse().unwrap())
        .collect();
    assert!(values.windows(2).all(|w| w[0] < w[1]));

    session.shutdown().unwrap();
    assert_eq!(session.sampler_status(), SamplerStatus::Stopped);
}

#[test]
fn live_stream_runs_without_recording() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = new_session(64, OverflowPolicy::Reset, dir.path());
    let mut live_rx = session.subscribe_live();
    session.start_capture(|| Ok(RampSource::new())).unwrap();

    let mut received = 0;
    wait_until(|| {
        loop {
            match live_rx.try_recv() {
                Ok(_) => received += 1,
                Err(TryRecvError::Lagged(_)) => {}
                Err(_) => break,
            }
        }
        received >= 5
    });

    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.buffer().write_cursor(), 0);
    session.shutdown().unwrap();
}

#[test]
fn overwrite_policy_keeps_latest_window() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = new_session(8, OverflowPolicy::Overwrite, dir.path());
    session.start_capture(|| Ok(RampSource::new())).unwrap();

    session.record(None).unwrap();
    wait_until(|| session.buffer().write_cursor() >= 20);
    let raw = session.stop().unwrap();

    assert_eq!(raw.len(), 8);
    assert!(raw.windows(2).all(|w| w[0] < w[1]));
    session.shutdown().unwrap();
}

#[test]
fn missing_device_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = new_session(64, OverflowPolicy::Reset, dir.path());

    let result = session.start_capture(|| Err::<RampSource, _>(MicrophoneError::NoDevice));
    let message = result.unwrap_err().to_string();
    assert!(message.contains("Aucun périphérique"));
}
