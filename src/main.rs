//! Wavy - Acquisition audio temps réel
//!
//! Point d'entrée en ligne de commande.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use wavy_lib::audio::{Microphone, DEFAULT_SCALE};
use wavy_lib::buffer::{OverflowPolicy, DEFAULT_CAPACITY};
use wavy_lib::capture::{SamplerConfig, SamplerStatus};
use wavy_lib::config::AppConfig;
use wavy_lib::export::{
    convert_wav, default_dat_path, points_from_samples, read_wav_info, CsvExporter,
};
use wavy_lib::session::{CaptureSession, SessionConfig};
use wavy_lib::view::{ChartSink, TerminalChart, TickOutcome, REDRAW_INTERVAL};

#[derive(Parser)]
#[command(name = "wavy", version, about = "Acquisition audio temps réel")]
struct Cli {
    /// Fichier de configuration
    #[arg(long, global = true, default_value_os_t = AppConfig::default_path())]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Liste les périphériques d'entrée audio
    Devices,
    /// Acquiert le signal et enregistre une fenêtre
    Record(RecordArgs),
    /// Affiche ou définit le dossier de données
    Config {
        #[arg(long)]
        data_folder: Option<PathBuf>,
    },
    /// Convertit un fichier WAV en fichier .dat
    Convert {
        input: PathBuf,
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Args)]
struct RecordArgs {
    /// Intervalle d'échantillonnage en secondes (0.02 à 0.5)
    #[arg(long, default_value_t = 0.02)]
    interval: f64,

    /// Fenêtre de la vue live en secondes
    #[arg(long, default_value_t = 20.0)]
    window: f64,

    /// Arrêt automatique après N secondes (0 = Ctrl-C)
    #[arg(long, default_value_t = 0.0)]
    stop_after: f64,

    /// Capacité du buffer d'enregistrement
    #[arg(long, default_value_t = DEFAULT_CAPACITY)]
    capacity: usize,

    /// Politique de débordement: reset, overwrite ou stop
    #[arg(long, default_value = "reset")]
    policy: OverflowPolicy,

    /// Amplitude de la pleine échelle
    #[arg(long, default_value_t = DEFAULT_SCALE)]
    scale: f32,

    /// Fichier de sortie (sans extension)
    #[arg(long)]
    out: Option<PathBuf>,

    /// Exporte les échantillons bruts du buffer au lieu de la fenêtre enregistrée
    #[arg(long)]
    raw: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialiser le logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "wavy=info,wavy_lib=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::debug!("Wavy v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Command::Devices => {
            let devices = Microphone::list_devices();
            if devices.is_empty() {
                println!("Aucun périphérique d'entrée");
            }
            for device in &devices {
                println!("  - {}", device);
            }
            Ok(())
        }
        Command::Record(args) => record(args, &cli.config).await,
        Command::Config { data_folder } => configure(data_folder, &cli.config),
        Command::Convert { input, out } => {
            let info = read_wav_info(&input)
                .with_context(|| format!("{} n'est pas un fichier WAV lisible", input.display()))?;
            println!(
                "{}: {} canaux, {} octets/échantillon, {}Hz, {} trames ({:.2}s)",
                input.display(),
                info.channels,
                info.sample_width,
                info.frame_rate,
                info.frames,
                info.duration_secs()
            );

            let output = out.unwrap_or_else(|| default_dat_path(&input));
            convert_wav(&input, &output)
                .with_context(|| format!("Conversion de {} impossible", input.display()))?;
            println!("{} → {}", input.display(), output.display());
            Ok(())
        }
    }
}

fn configure(data_folder: Option<PathBuf>, config_path: &Path) -> anyhow::Result<()> {
    match data_folder {
        Some(folder) => {
            let config = AppConfig {
                data_folder: folder,
            };
            config
                .save(config_path)
                .context("Impossible de définir le dossier de données")?;
            println!("Dossier de données: {}", config.data_folder.display());
        }
        None => {
            let config = AppConfig::load_or_default(config_path);
            println!("Dossier de données: {}", config.data_folder.display());
        }
    }
    Ok(())
}

fn seconds(value: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(value)
        .ok()
        .filter(|d| !d.is_zero())
}

async fn record(args: RecordArgs, config_path: &Path) -> anyhow::Result<()> {
    let app_config = AppConfig::load_or_default(config_path);

    let sampler = SamplerConfig {
        scale: args.scale,
        ..SamplerConfig::with_interval_secs(args.interval)
    };
    let interval = sampler.sample_interval;

    let mut session = CaptureSession::new(SessionConfig {
        capacity: args.capacity,
        policy: args.policy,
        sampler,
        data_folder: app_config.data_folder,
    });

    session
        .start_capture(Microphone::open)
        .context("Aucun périphérique d'entrée: branchez-le puis relancez le programme")?;

    let mut live_rx = session.subscribe_live();
    let mut live = session.live_view(seconds(args.window).unwrap_or(Duration::from_secs(20)));
    let mut recording = session.record(seconds(args.stop_after))?;
    if let Some(out) = args.out {
        session.set_file_stem(out);
    }

    let mut chart = TerminalChart::new(std::io::stderr(), args.scale);
    let mut redraw = tokio::time::interval(REDRAW_INTERVAL);
    let mut sample_tick = tokio::time::interval(interval);
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let mut capture_error = None;
    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracing::info!("Arrêt demandé");
                break;
            }
            received = live_rx.recv() => match received {
                Ok(sample) => live.push(sample.value),
                Err(RecvError::Lagged(n)) => tracing::debug!("{} échantillons live sautés", n),
                Err(RecvError::Closed) => break,
            },
            _ = sample_tick.tick() => match recording.tick() {
                TickOutcome::Appended(_) | TickOutcome::Paused => {}
                TickOutcome::LimitReached => {
                    tracing::info!("Durée maximale atteinte");
                    break;
                }
                TickOutcome::BufferFull => {
                    tracing::warn!("Buffer plein, enregistrement arrêté");
                    break;
                }
            },
            _ = redraw.tick() => {
                chart.redraw(&format!("REC {:.1}s", recording.duration()), &live.points());
                if let SamplerStatus::Error(e) = session.sampler_status() {
                    capture_error = Some(e);
                    break;
                }
            }
        }
    }
    chart.finish();

    let samples = session.stop()?;
    let points = if args.raw {
        points_from_samples(&samples, interval)
    } else {
        recording.points().to_vec()
    };

    let exported = session.export(&points, &CsvExporter);
    session.shutdown()?;

    if let Some(e) = capture_error {
        bail!("Acquisition interrompue: {}", e);
    }
    let path = exported.context("Les données n'ont pas pu être enregistrées")?;
    println!("Données enregistrées: {}", path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults_to_local_file() {
        let cli = Cli::parse_from(["wavy", "devices"]);
        assert_eq!(cli.config, AppConfig::default_path());

        let cli = Cli::parse_from(["wavy", "config", "--config", "/tmp/autre.config"]);
        assert_eq!(cli.config, PathBuf::from("/tmp/autre.config"));
    }

    #[test]
    fn test_record_defaults() {
        let cli = Cli::parse_from(["wavy", "record"]);
        let Command::Record(args) = cli.command else {
            panic!("sous-commande inattendue");
        };
        assert_eq!(args.interval, 0.02);
        assert_eq!(args.policy, OverflowPolicy::Reset);
        assert!(seconds(args.stop_after).is_none());
        assert_eq!(seconds(args.window), Some(Duration::from_secs(20)));
    }
}
