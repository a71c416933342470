//! curve-bake: offline curve library and keyframe baking, plus headless
//! swarm runs.
//!
//! Usage:
//!   curve-bake generate --output strikes.vcl --count 32 --seed 7
//!   curve-bake keyframes --output swings.vkf --count 8 --arc 150
//!   curve-bake inspect --input strikes.vcl
//!   curve-bake simulate --config swarm.json --library strikes.vcl --ticks 1200

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec3;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Serialize;

use volley_core::commands::SwarmCommand;
use volley_core::config::SwarmConfig;
use volley_core::constants::DEFAULT_NUM_SAMPLES;
use volley_core::enums::FinishReason;
use volley_core::events::StrikeEvent;
use volley_curves::codec::{load_library, write_library};
use volley_curves::keyframes::{load_keyframes, write_keyframes};
use volley_curves::{CumulativeMode, CurveLibrary, SwingKeyframeSet};
use volley_sim::SwarmEngine;

const DEFAULT_KEYFRAME_COUNT: usize = 8;
const DEFAULT_ARC_DEGREES: f32 = 150.0;

#[derive(Parser, Debug)]
#[command(name = "curve-bake")]
#[command(about = "Bake strike curves and swing keyframes, and run headless swarm simulations")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Bake a library of random strike curves into a .vcl file
    Generate {
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = 32)]
        count: usize,
        /// Bezier control points per curve (3, 4 or 5)
        #[arg(long, default_value_t = 4)]
        control_points: usize,
        #[arg(long, default_value_t = DEFAULT_NUM_SAMPLES)]
        samples: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Accumulate chord lengths instead of integrated arc lengths
        #[arg(long, default_value_t = false)]
        chord: bool,
        /// Bend every curve through this point at t = 0.5, as x,y,z in the
        /// unit strike frame
        #[arg(long, value_parser = parse_vec3)]
        hump: Option<Vec3>,
    },
    /// Bake a swing keyframe set into a .vkf file
    Keyframes {
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = DEFAULT_KEYFRAME_COUNT)]
        count: usize,
        /// Swing arc in degrees
        #[arg(long, default_value_t = DEFAULT_ARC_DEGREES)]
        arc: f32,
        /// Swing plane normal as x,y,z
        #[arg(long, default_value = "0,1,0", value_parser = parse_vec3)]
        normal: Vec3,
    },
    /// Print the contents of a .vcl curve library
    Inspect {
        #[arg(long)]
        input: PathBuf,
    },
    /// Run a seeded headless swarm and print a JSON summary
    Simulate {
        /// Swarm config JSON (defaults when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Curve library (.vcl); a library is generated from the seed when omitted
        #[arg(long)]
        library: Option<PathBuf>,
        /// Swing keyframes (.vkf); a default set is baked when omitted
        #[arg(long)]
        keyframes: Option<PathBuf>,
        /// Override the config seed
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long, default_value_t = 1200)]
        ticks: u32,
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Aggregate outcome of a headless run.
#[derive(Debug, Default, Serialize)]
struct SimulationSummary {
    seed: u64,
    ticks: u32,
    elapsed_secs: f64,
    attackers: usize,
    launched: u32,
    predicted: u32,
    prediction_rejected: u32,
    completed_natural: u32,
    completed_early: u32,
    cancelled: u32,
    peak_active: usize,
    launches_by_kind: BTreeMap<String, u32>,
    final_target: Vec3,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    match Cli::parse().command {
        Commands::Generate {
            output,
            count,
            control_points,
            samples,
            seed,
            chord,
            hump,
        } => cmd_generate(&output, count, control_points, samples, seed, chord, hump),
        Commands::Keyframes {
            output,
            count,
            arc,
            normal,
        } => cmd_keyframes(&output, count, arc, normal),
        Commands::Inspect { input } => cmd_inspect(&input),
        Commands::Simulate {
            config,
            library,
            keyframes,
            seed,
            ticks,
            output,
        } => cmd_simulate(
            config.as_deref(),
            library.as_deref(),
            keyframes.as_deref(),
            seed,
            ticks,
            output.as_deref(),
        ),
    }
}

fn parse_vec3(value: &str) -> Result<Vec3, String> {
    let parts: Vec<f32> = value
        .split(',')
        .map(|part| part.trim().parse::<f32>())
        .collect::<Result<_, _>>()
        .map_err(|err| format!("invalid component in '{value}': {err}"))?;
    match parts.as_slice() {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => Err(format!("expected x,y,z, got '{value}'")),
    }
}

fn cmd_generate(
    output: &Path,
    count: usize,
    control_points: usize,
    samples: usize,
    seed: u64,
    chord: bool,
    hump: Option<Vec3>,
) -> Result<()> {
    let mode = if chord {
        CumulativeMode::Chord
    } else {
        CumulativeMode::Precise
    };
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let library = match hump {
        Some(hump) => {
            CurveLibrary::generate_through(&mut rng, count, control_points, hump, samples, mode)
        }
        None => CurveLibrary::generate(&mut rng, count, control_points, samples, mode),
    }
    .with_context(|| format!("failed baking {count} curves"))?;
    ensure_parent(output)?;
    write_library(&library, output)?;

    println!(
        "Wrote {} curves ({} control points, {} samples, {:?}) to {}",
        library.len(),
        control_points,
        samples,
        mode,
        output.display()
    );
    Ok(())
}

fn cmd_keyframes(output: &Path, count: usize, arc: f32, normal: Vec3) -> Result<()> {
    let normal = normal
        .try_normalize()
        .ok_or_else(|| anyhow!("plane normal must be non-zero"))?;
    let set = SwingKeyframeSet::bake(normal, count, arc);
    ensure_parent(output)?;
    write_keyframes(&set, output)?;

    println!(
        "Wrote {} keyframes ({arc} degree arc, normal {normal}) to {}",
        set.len(),
        output.display()
    );
    Ok(())
}

fn cmd_inspect(input: &Path) -> Result<()> {
    let library = load_library(input)?;
    println!("{}: {} curves", input.display(), library.len());

    for (index, record) in library.records().iter().enumerate() {
        println!(
            "  [{index:3}] samples {:3}  length {:.4}  to contact {:.4}  contact ratio {:.4}",
            record.num_samples(),
            record.total_arc_length,
            record.arc_length_to_contact,
            record.contact_time_ratio
        );
    }

    let ratios: Vec<f32> = library
        .records()
        .iter()
        .map(|r| r.contact_time_ratio)
        .collect();
    if !ratios.is_empty() {
        let min = ratios.iter().copied().fold(f32::INFINITY, f32::min);
        let max = ratios.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mean = ratios.iter().sum::<f32>() / ratios.len() as f32;
        println!("contact ratio: min {min:.4}  mean {mean:.4}  max {max:.4}");
    }
    Ok(())
}

fn cmd_simulate(
    config_path: Option<&Path>,
    library_path: Option<&Path>,
    keyframes_path: Option<&Path>,
    seed: Option<u64>,
    ticks: u32,
    output: Option<&Path>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => SwarmConfig::from_file(path)?,
        None => SwarmConfig::default(),
    };
    if let Some(seed) = seed {
        config.seed = seed;
    }

    let library = match library_path {
        Some(path) => load_library(path)?,
        None => {
            let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
            CurveLibrary::generate(&mut rng, 16, 4, DEFAULT_NUM_SAMPLES, CumulativeMode::Precise)
                .context("failed baking the default curve library")?
        }
    };
    let keyframes = match keyframes_path {
        Some(path) => load_keyframes(path)?,
        None => SwingKeyframeSet::bake(Vec3::Y, DEFAULT_KEYFRAME_COUNT, DEFAULT_ARC_DEGREES),
    };

    let summary = run_simulation(config, Arc::new(library), Arc::new(keyframes), ticks)?;
    let encoded =
        serde_json::to_string_pretty(&summary).context("failed encoding simulation summary")?;
    match output {
        Some(path) => {
            ensure_parent(path)?;
            fs::write(path, encoded)
                .with_context(|| format!("failed writing {}", path.display()))?;
        }
        None => println!("{encoded}"),
    }
    Ok(())
}

fn run_simulation(
    config: SwarmConfig,
    library: Arc<CurveLibrary>,
    keyframes: Arc<SwingKeyframeSet>,
    ticks: u32,
) -> Result<SimulationSummary> {
    let mut summary = SimulationSummary {
        seed: config.seed,
        ticks,
        ..Default::default()
    };
    let mut engine =
        SwarmEngine::new(config, library, keyframes).context("rejected swarm config")?;
    engine.queue_command(SwarmCommand::StartEpisode);

    for _ in 0..ticks {
        let snapshot = engine.tick();
        summary.peak_active = summary.peak_active.max(snapshot.pool.active);
        summary.attackers = snapshot.attackers.len();
        summary.elapsed_secs = snapshot.time.elapsed_secs;
        summary.final_target = snapshot.target.position;

        for event in &snapshot.events {
            match event {
                StrikeEvent::Launched {
                    kind, predicted, ..
                } => {
                    summary.launched += 1;
                    if *predicted {
                        summary.predicted += 1;
                    }
                    *summary
                        .launches_by_kind
                        .entry(format!("{kind:?}"))
                        .or_default() += 1;
                }
                StrikeEvent::PredictionRejected { .. } => summary.prediction_rejected += 1,
                StrikeEvent::Completed { reason, .. } => match reason {
                    FinishReason::Natural => summary.completed_natural += 1,
                    FinishReason::EarlyExit => summary.completed_early += 1,
                },
                StrikeEvent::Cancelled { .. } => summary.cancelled += 1,
                StrikeEvent::PoolRebuilt { .. } => {}
            }
        }
    }

    tracing::info!(
        target: "volley::cli",
        ticks,
        launched = summary.launched,
        peak_active = summary.peak_active,
        "simulate.finished"
    );
    Ok(summary)
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }
    Ok(())
}
