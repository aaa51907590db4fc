//! Reanimation systems and the entity-level API.
//!
//! - [`reanimation_system`] advances every [`Reanimation`] by the
//!   [`WorldTime`] delta and triggers [`ReanimFinishedEvent`]s.
//! - The free functions drive a single entity through a `World`: playback
//!   control goes through `&mut World`, render queries through `&World`.
//!
//! # Flow
//!
//! 1. Definitions are registered in [`ReanimStore`]
//! 2. [`spawn_reanimation`] attaches a [`Reanimation`] pointing at a key
//! 3. [`play`] / [`play_concurrent`] pick the active animations
//! 4. Each frame, [`reanimation_system`] (or [`tick`]) advances playback
//! 5. [`get_render_data`] turns the state into [`RenderPart`]s
//!
//! # Related
//!
//! - [`crate::components::reanimation::Reanimation`] – per-entity state
//! - [`crate::reanim::render`] – render assembly

use bevy_ecs::prelude::*;
use glam::Vec2;
use rustc_hash::FxHashMap;

use crate::components::mapposition::MapPosition;
use crate::components::reanimation::Reanimation;
use crate::components::renderfx::RenderEffects;
use crate::components::rotation::Rotation;
use crate::components::scale::Scale;
use crate::error::{ReanimError, Result};
use crate::events::reanim::ReanimFinishedEvent;
use crate::reanim::render::{RenderPart, assemble, center_offset};
use crate::reanim::transform::EntityTransform;
use crate::resources::highlight::HighlightTarget;
use crate::resources::imageregistry::ImageRegistry;
use crate::resources::reanimconfig::ReanimConfig;
use crate::resources::reanimstore::ReanimStore;
use crate::resources::worldtime::WorldTime;

fn finished_event(entity: Entity, reanim: &Reanimation) -> ReanimFinishedEvent {
    ReanimFinishedEvent {
        entity,
        animation: reanim.active_animations().into_iter().next().flatten(),
    }
}

/// Advance reanimation playback.
///
/// Contract
/// - Reads [`WorldTime`] for the scaled delta.
/// - Mutates [`Reanimation`] cursors, phase and parent offsets.
/// - Triggers [`ReanimFinishedEvent`] on the tick playback finishes.
pub fn reanimation_system(
    mut query: Query<(Entity, &mut Reanimation)>,
    time: Res<WorldTime>,
    mut commands: Commands,
) {
    for (entity, mut reanim) in query.iter_mut() {
        if reanim.advance(time.delta) {
            commands.trigger(finished_event(entity, &reanim));
        }
    }
}

/// Spawn an entity playing nothing yet, with the definition stored under
/// `key`, at `position`.
///
/// Looping and catch-up defaults come from [`ReanimConfig`] when present.
pub fn spawn_reanimation(world: &mut World, key: &str, position: Vec2) -> Result<Entity> {
    let definition = world
        .get_resource::<ReanimStore>()
        .ok_or_else(|| ReanimError::DefinitionNotFound(key.to_string()))?
        .definition(key)?;
    let mut reanim = Reanimation::new(key, definition);
    if let Some(config) = world.get_resource::<ReanimConfig>() {
        reanim = reanim
            .with_looping(config.default_looping)
            .with_max_catch_up_frames(config.max_catch_up_frames);
    }
    Ok(world
        .spawn((
            reanim,
            MapPosition { pos: position },
            Scale::default(),
            Rotation::default(),
        ))
        .id())
}

fn with_reanimation<T>(
    world: &mut World,
    entity: Entity,
    f: impl FnOnce(&mut Reanimation) -> Result<T>,
) -> Result<T> {
    let mut reanim = world
        .get_mut::<Reanimation>(entity)
        .ok_or(ReanimError::MissingReanimation(entity))?;
    f(&mut reanim)
}

/// Play one animation from its window start.
pub fn play(world: &mut World, entity: Entity, name: &str) -> Result<()> {
    with_reanimation(world, entity, |r| r.play(name))
}

/// Play several animations at once, binding each track to one of them.
pub fn play_concurrent(world: &mut World, entity: Entity, names: &[&str]) -> Result<()> {
    with_reanimation(world, entity, |r| r.play_concurrent(names))
}

/// Play the full timeline, ignoring animation windows.
pub fn play_timeline(world: &mut World, entity: Entity) -> Result<()> {
    with_reanimation(world, entity, |r| {
        r.play_timeline();
        Ok(())
    })
}

/// Jump to a logical frame of the active animations.
pub fn seek(world: &mut World, entity: Entity, logical: usize) -> Result<()> {
    with_reanimation(world, entity, |r| r.seek(logical))
}

/// Override inferred track bindings, track name -> animation name.
pub fn set_track_bindings_override(
    world: &mut World,
    entity: Entity,
    overrides: &FxHashMap<String, String>,
) -> Result<()> {
    with_reanimation(world, entity, |r| r.set_track_bindings_override(overrides))
}

pub fn set_image_override(world: &mut World, entity: Entity, track: &str, image: &str) -> Result<()> {
    with_reanimation(world, entity, |r| r.set_image_override(track, image))
}

/// Returns whether an override was removed.
pub fn clear_image_override(world: &mut World, entity: Entity, track: &str) -> Result<bool> {
    with_reanimation(world, entity, |r| Ok(r.clear_image_override(track)))
}

pub fn set_track_hidden(world: &mut World, entity: Entity, track: &str, hidden: bool) -> Result<()> {
    with_reanimation(world, entity, |r| r.set_track_hidden(track, hidden))
}

pub fn set_looping(world: &mut World, entity: Entity, looping: bool) -> Result<()> {
    with_reanimation(world, entity, |r| {
        r.set_looping(looping);
        Ok(())
    })
}

pub fn set_rate(world: &mut World, entity: Entity, fps: f32) -> Result<()> {
    with_reanimation(world, entity, |r| {
        r.set_rate(fps);
        Ok(())
    })
}

/// Advance one entity by `dt` seconds, outside any schedule.
///
/// Triggers [`ReanimFinishedEvent`] like [`reanimation_system`].
pub fn tick(world: &mut World, entity: Entity, dt: f32) -> Result<()> {
    let event = with_reanimation(world, entity, |r| {
        Ok(r.advance(dt).then(|| finished_event(entity, r)))
    })?;
    if let Some(event) = event {
        world.trigger(event);
    }
    Ok(())
}

/// `false` for entities without a reanimation.
pub fn is_finished(world: &World, entity: Entity) -> bool {
    world
        .get::<Reanimation>(entity)
        .is_some_and(|r| r.is_finished())
}

/// Physical frame of the first active animation.
pub fn current_frame(world: &World, entity: Entity) -> Option<usize> {
    world.get::<Reanimation>(entity)?.current_frame()
}

/// Logical frame of the first active animation.
pub fn current_logical_frame(world: &World, entity: Entity) -> Option<usize> {
    world.get::<Reanimation>(entity)?.current_logical_frame()
}

/// Placement of `entity` from its position, scale and rotation components.
pub fn entity_transform(world: &World, entity: Entity) -> EntityTransform {
    EntityTransform {
        position: world
            .get::<MapPosition>(entity)
            .map(|p| p.pos)
            .unwrap_or(Vec2::ZERO),
        scale: world
            .get::<Scale>(entity)
            .map(|s| s.signed())
            .unwrap_or(Vec2::ONE),
        rotation_degrees: world
            .get::<Rotation>(entity)
            .map(|r| r.degrees)
            .unwrap_or(0.0),
    }
}

/// Ordered render parts of `entity`; empty without a reanimation.
pub fn get_render_data(world: &World, entity: Entity) -> Vec<RenderPart> {
    let Some(reanim) = world.get::<Reanimation>(entity) else {
        return Vec::new();
    };
    let empty = ImageRegistry::new();
    let images = world
        .get_resource::<ReanimStore>()
        .and_then(|store| store.images(&reanim.reanim_key))
        .unwrap_or(&empty);
    let highlighted = world
        .get_resource::<HighlightTarget>()
        .is_some_and(|h| h.is(entity));
    let settings = world
        .get_resource::<ReanimConfig>()
        .map(|c| c.effects)
        .unwrap_or_default();
    assemble(
        reanim,
        images,
        &entity_transform(world, entity),
        world.get::<RenderEffects>(entity),
        highlighted,
        &settings,
    )
}

/// Offset from the entity position to the center of its drawn parts.
pub fn get_center_offset(world: &World, entity: Entity) -> Vec2 {
    let parts = get_render_data(world, entity);
    center_offset(&parts, entity_transform(world, entity).position)
}
