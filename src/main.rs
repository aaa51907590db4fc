//! Reanim engine command line.
//!
//! - `inspect` prints the tracks and animation windows of a definition.
//! - `bake` plays a definition on a headless world and prints the render
//!   parts of every frame as JSON, ready for an external rasterizer or a
//!   golden-file diff.
//!
//! # Running
//!
//! ```sh
//! cargo run -- inspect assets/peashooter.json
//! cargo run -- bake assets/peashooter.json --anim shoot --anim idle --frames 24
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bevy_ecs::prelude::*;
use clap::{Parser, Subcommand};
use glam::Vec2;
use log::{info, warn};
use serde::Serialize;

use reanimengine::error::Result;
use reanimengine::events::reanim::ReanimFinishedEvent;
use reanimengine::reanim::definition::{ReanimDefinition, TrackId};
use reanimengine::reanim::format::ReanimSource;
use reanimengine::reanim::render::RenderPart;
use reanimengine::resources::imageregistry::{ImageHandle, ImageRegistry};
use reanimengine::resources::reanimconfig::ReanimConfig;
use reanimengine::resources::reanimstore::ReanimStore;
use reanimengine::resources::worldtime::WorldTime;
use reanimengine::systems::reanimation::{self as reanim_api, reanimation_system};
use reanimengine::systems::time::update_world_time;

/// Reanim engine
#[derive(Parser)]
#[command(version, about = "Inspect and bake keyframed 2D sprite animations.")]
struct Cli {
    /// INI configuration file (default: ./reanim.ini if present).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print tracks and animation windows of a definition.
    Inspect {
        /// Reanim definition (JSON).
        file: PathBuf,
    },
    /// Play a definition headless and print render parts per frame as JSON.
    Bake {
        /// Reanim definition (JSON).
        file: PathBuf,
        /// Animation to play; repeat to play several concurrently. Without
        /// it the whole timeline plays.
        #[arg(long = "anim", value_name = "NAME")]
        anims: Vec<String>,
        /// Number of frames to output.
        #[arg(long, default_value_t = 1)]
        frames: usize,
        /// Seconds per tick (default: one definition frame).
        #[arg(long)]
        dt: Option<f32>,
        /// Make CHILD follow PARENT's motion.
        #[arg(long, value_name = "PARENT:CHILD")]
        attach: Vec<String>,
        /// Play once and freeze on the last frame.
        #[arg(long)]
        no_loop: bool,
    },
}

#[derive(Serialize)]
struct BakedFrame {
    tick: usize,
    frame: Option<usize>,
    /// Frame index within the played animation.
    logical: Option<usize>,
    finished: bool,
    parts: Vec<RenderPart>,
}

fn load_config(path: Option<PathBuf>) -> ReanimConfig {
    let explicit = path.is_some();
    let mut config = path.map(ReanimConfig::with_path).unwrap_or_default();
    if let Err(e) = config.load_from_file() {
        if explicit {
            warn!("{}; using defaults", e);
        }
    }
    config
}

fn load_definition(file: &Path, config: &ReanimConfig) -> Result<ReanimDefinition> {
    let source = ReanimSource::load_from_file(file)?;
    ReanimDefinition::from_source_with_prefix(&source, &config.definition_prefix)
}

fn inspect(file: &Path, config: &ReanimConfig) -> Result<()> {
    let definition = load_definition(file, config)?;
    println!(
        "{}: {} fps, {} frames, {} tracks",
        file.display(),
        definition.fps(),
        definition.frame_count(),
        definition.tracks().len()
    );
    println!("tracks:");
    for (index, track) in definition.tracks().iter().enumerate() {
        println!(
            "  {:>3} {:<24} {:?}",
            index,
            track.name,
            definition.track_role(TrackId(index))
        );
    }
    println!("animations:");
    for animation in definition.animations() {
        match animation.window {
            Some(w) => println!(
                "  {:<24} frames {}..={} ({} frames)",
                animation.name,
                w.first,
                w.last,
                w.len()
            ),
            None => println!("  {:<24} (never visible)", animation.name),
        }
    }
    Ok(())
}

/// One 1x1 handle per distinct image reference, so every part is baked.
fn placeholder_images(definition: &ReanimDefinition) -> ImageRegistry {
    let mut images = ImageRegistry::new();
    for frame in definition.tracks().iter().flat_map(|t| &t.frames) {
        if let Some(image) = &frame.image {
            if !images.contains(image) {
                let id = images.len() as u32;
                images.insert(image.clone(), ImageHandle::new(id, 1.0, 1.0));
            }
        }
    }
    images
}

fn bake(
    file: &Path,
    config: ReanimConfig,
    anims: &[String],
    frames: usize,
    dt: Option<f32>,
    attach: &[String],
    no_loop: bool,
) -> Result<()> {
    let mut definition = load_definition(file, &config)?;
    for pair in attach {
        let Some((parent, child)) = pair.split_once(':') else {
            warn!("Ignoring malformed attachment '{}'", pair);
            continue;
        };
        definition = definition.with_attachment(parent, child)?;
    }
    let dt = dt.unwrap_or(1.0 / definition.fps());
    let images = placeholder_images(&definition);

    let mut world = World::new();
    let mut store = ReanimStore::new();
    store.insert("bake", definition, images);
    world.insert_resource(store);
    world.insert_resource(WorldTime::default());
    world.insert_resource(config);
    world.add_observer(|trigger: On<ReanimFinishedEvent>| {
        info!("Finished {:?}", trigger.event().animation);
    });

    let entity = reanim_api::spawn_reanimation(&mut world, "bake", Vec2::ZERO)?;
    if no_loop {
        reanim_api::set_looping(&mut world, entity, false)?;
    }
    match anims {
        [] => reanim_api::play_timeline(&mut world, entity)?,
        [single] => reanim_api::play(&mut world, entity, single)?,
        many => {
            let names: Vec<&str> = many.iter().map(String::as_str).collect();
            reanim_api::play_concurrent(&mut world, entity, &names)?;
        }
    }

    let mut schedule = Schedule::default();
    schedule.add_systems(reanimation_system);

    let mut baked = Vec::with_capacity(frames);
    for tick in 0..frames {
        if tick > 0 {
            update_world_time(&mut world, dt);
            schedule.run(&mut world);
        }
        baked.push(BakedFrame {
            tick,
            frame: reanim_api::current_frame(&world, entity),
            logical: reanim_api::current_logical_frame(&world, entity),
            finished: reanim_api::is_finished(&world, entity),
            parts: reanim_api::get_render_data(&world, entity),
        });
    }
    println!("{}", serde_json::to_string_pretty(&baked)?);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(cli.config);

    let result = match cli.command {
        Command::Inspect { file } => inspect(&file, &config),
        Command::Bake {
            file,
            anims,
            frames,
            dt,
            attach,
            no_loop,
        } => bake(&file, config, &anims, frames, dt, &attach, no_loop),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
