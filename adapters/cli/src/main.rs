#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs an Outpost session headlessly.

mod headless;
mod script;

use std::{io::IsTerminal, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use outpost_rendering::{palette, Presentation, RenderingBackend, Scene};
use outpost_system_clock::{Config, SimulationClock};
use tracing_subscriber::EnvFilter;

use crate::{headless::HeadlessBackend, script::InputScript};

const DEFAULT_TICKS: u64 = 600;

/// Runs an Outpost session without a window, replaying scripted input.
#[derive(Debug, Parser)]
#[command(name = "outpost", version, about)]
struct Args {
    /// Number of frames to simulate. Defaults to the script length, or 600
    /// frames without a script.
    #[arg(long)]
    ticks: Option<u64>,

    /// Seed for spawner layout and spawn angles.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// TOML file describing per-frame input.
    #[arg(long)]
    script: Option<PathBuf>,

    /// Viewport width in screen units.
    #[arg(long, default_value_t = 1280.0)]
    width: f32,

    /// Viewport height in screen units.
    #[arg(long, default_value_t = 720.0)]
    height: f32,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_ansi(std::io::stdout().is_terminal())
        .init();

    let args = Args::parse();
    let script = match &args.script {
        Some(path) => InputScript::load(path)
            .with_context(|| format!("could not load script {}", path.display()))?,
        None => InputScript::default(),
    };
    let ticks = args.ticks.unwrap_or_else(|| match args.script {
        Some(_) => script.len(),
        None => DEFAULT_TICKS,
    });

    let mut clock = SimulationClock::new(Config::new(args.seed));
    let _ = clock.resize(args.width, args.height);
    let scene = Scene::capture(&clock).context("could not build the initial scene")?;

    let backend = HeadlessBackend::new(script.expand(ticks), script.frame_duration());
    backend.run(
        Presentation::new("Outpost", palette::BACKGROUND, scene),
        move |dt, input, scene| {
            let report = clock.step(dt, &input);
            scene.sync(&clock, &report);
        },
    )
}
