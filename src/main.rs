//! Atelier - Main Entry Point
//!
//! Runs the studio walk headless: a scripted visitor fetches the cart,
//! dresses the model and takes a photo while the event stream is logged.
//! Set `RUST_LOG=info` (or `debug`) to see it.

mod tour;

use std::path::PathBuf;

use anyhow::Context;
use atelier_game::{Level, LevelDesc, SimEvent, Simulation, SimulationConfig};
use clap::Parser;
use log::info;

use crate::tour::Tour;

#[derive(Parser, Debug)]
#[command(name = "atelier", version, about = "Headless first-person studio walk")]
struct Args {
    /// Simulation config (RON). Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Level description (RON). The built-in studio is used when omitted.
    #[arg(long)]
    level: Option<PathBuf>,

    /// Maximum number of frames to run.
    #[arg(long, default_value_t = 4000)]
    frames: u32,

    /// Seed for wearable tints and the screen feed.
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Length of each rendered frame in milliseconds.
    #[arg(long, default_value_t = 1000.0 / 60.0)]
    frame_ms: f32,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => SimulationConfig::load(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => SimulationConfig::default(),
    };

    let desc = match &args.level {
        Some(path) => {
            LevelDesc::load(path).with_context(|| format!("loading level {}", path.display()))?
        }
        None => LevelDesc::studio(),
    };
    let level = Level::build(&desc, args.seed).context("building level")?;

    let mut tour = Tour::through(&level);
    let mut sim = Simulation::new(config, level, args.seed);
    info!(
        "{}: spawned at {}, {} frames of {:.2} ms",
        sim.level.name, sim.camera.position, args.frames, args.frame_ms
    );

    let elapsed = args.frame_ms / 1000.0;
    for _ in 0..args.frames {
        for event in tour.next_inputs(&sim) {
            sim.handle_input(event);
        }
        sim.frame(elapsed);

        for event in sim.drain_events() {
            report(&sim, &event);
        }

        if tour.is_finished() {
            break;
        }
    }

    info!(
        "finished after {} frames ({:.2} s): eye at {}, outfit {}, notice {:?}",
        sim.frame,
        sim.time,
        sim.camera.position,
        if sim.is_outfit_visible() { "on" } else { "off" },
        sim.notice()
    );

    Ok(())
}

fn report(sim: &Simulation, event: &SimEvent) {
    let scene = &sim.level.scene;
    let frame = sim.frame;

    match event {
        SimEvent::PickedUp { node, tag } => {
            info!("[{frame}] picked up {} ({tag:?})", scene.node(*node).name)
        }
        SimEvent::Released { node } => info!("[{frame}] released {}", scene.node(*node).name),
        SimEvent::Flash { node, .. } => info!("[{frame}] flash from {}", scene.node(*node).name),
        SimEvent::ZoneEntered => info!("[{frame}] entered the model's zone"),
        SimEvent::ZoneRearmed => info!("[{frame}] left the model's zone"),
        SimEvent::Announced(text) => info!("[{frame}] notice: {text}"),
        SimEvent::OutfitChanged { item } => {
            info!("[{frame}] model now wears {}", scene.node(*item).name)
        }
        SimEvent::FeedRefreshed(material) => info!("[{frame}] screen shows {material:?}"),
    }
}
