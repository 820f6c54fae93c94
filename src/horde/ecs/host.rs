// src/horde/ecs/host.rs
//! `HordeHost` over a Bevy `World`. Built inside exclusive systems.

use std::time::Duration;

use bevy::prelude::*;

use super::components::{
    Anchored, CueEmitter, CueExpiry, HordeMob, Jitter, NavBeacon, Station, StationMember,
    Terminating, Thrown, VentSpawnLocation,
};
use crate::horde::core::{
    Anchor, AudioHandle, AudioSink, Clock, CueSpec, GroupKey, HordeWorld, LandmarkLocator,
    SpawnSpec, Thrower, Timestamp,
};
use crate::horde::error::HordeError;
use crate::horde::settings::{HordeSettings, JitterSettings};

pub struct EcsHost<'w> {
    world: &'w mut World,
}

impl<'w> EcsHost<'w> {
    pub fn new(world: &'w mut World) -> Self {
        Self { world }
    }

    fn exists(&self, entity: Entity) -> bool {
        self.world.entities().contains(entity)
    }

    fn settings(&self) -> Option<&HordeSettings> {
        self.world.get_resource::<HordeSettings>()
    }

    fn jitter(&self) -> JitterSettings {
        self.settings().map(|s| s.jitter).unwrap_or_default()
    }

    fn one_shot_lifetime(&self) -> Duration {
        let secs = self
            .settings()
            .map_or(HordeSettings::default().one_shot_lifetime_secs, |s| s.one_shot_lifetime_secs);
        Duration::from_secs_f32(secs.max(0.0))
    }

    /// Display name for `spec`, or `None` if the prototype list rejects it.
    fn prototype_name(&self, spec: &SpawnSpec) -> Option<String> {
        let Some(settings) = self.settings() else {
            return Some(spec.to_string());
        };
        if !settings.knows(spec.as_str()) {
            return None;
        }
        Some(
            settings
                .prototype(spec.as_str())
                .map_or_else(|| spec.to_string(), |p| p.name.clone()),
        )
    }
}

impl HordeWorld for EcsHost<'_> {
    fn potential_anchors(&self) -> Vec<Anchor> {
        self.world
            .iter_entities()
            .filter(|e| e.contains::<VentSpawnLocation>())
            .map(|e| e.id())
            .collect()
    }

    fn is_anchored(&self, anchor: Anchor) -> bool {
        self.world.get::<Anchored>(anchor).is_some()
    }

    fn group_of(&self, anchor: Anchor) -> Option<GroupKey> {
        self.world.get::<StationMember>(anchor).map(|m| m.0)
    }

    fn groups(&self) -> Vec<GroupKey> {
        self.world
            .iter_entities()
            .filter_map(|e| e.get::<Station>().map(|s| s.0))
            .collect()
    }

    fn position_of(&self, anchor: Anchor) -> Option<Vec3> {
        self.world.get::<Transform>(anchor).map(|t| t.translation)
    }

    fn is_terminating(&self, anchor: Anchor) -> bool {
        !self.exists(anchor) || self.world.get::<Terminating>(anchor).is_some()
    }

    fn spawn(&mut self, spec: &SpawnSpec, at: Vec3) -> Result<Entity, HordeError> {
        let Some(name) = self.prototype_name(spec) else {
            return Err(HordeError::SpawnCreationFailed {
                spec: spec.clone(),
                reason: "unknown prototype".to_string(),
            });
        };
        let entity = self
            .world
            .spawn((HordeMob { spec: spec.clone() }, Name::new(name), Transform::from_translation(at)))
            .id();
        Ok(entity)
    }

    fn attach_effect(&mut self, anchor: Anchor) {
        let jitter = self.jitter();
        if let Ok(mut entity) = self.world.get_entity_mut(anchor) {
            entity.insert(Jitter { amplitude: jitter.amplitude, frequency: jitter.frequency });
        }
    }

    fn detach_effect(&mut self, anchor: Anchor) {
        if let Ok(mut entity) = self.world.get_entity_mut(anchor) {
            entity.remove::<Jitter>();
        }
    }
}

impl AudioSink for EcsHost<'_> {
    fn play_looping(&mut self, cue: &CueSpec, at: Anchor) -> Option<AudioHandle> {
        let translation = self.position_of(at)?;
        let emitter = self
            .world
            .spawn((
                CueEmitter { cue: cue.clone(), looping: true, attached_to: Some(at) },
                Transform::from_translation(translation),
            ))
            .id();
        Some(AudioHandle(emitter))
    }

    fn stop(&mut self, handle: AudioHandle) {
        if self.exists(handle.0) {
            self.world.despawn(handle.0);
        }
    }

    fn play_once(&mut self, cue: &CueSpec, at: Vec3) {
        let expires = self.now() + self.one_shot_lifetime();
        self.world.spawn((
            CueEmitter { cue: cue.clone(), looping: false, attached_to: None },
            CueExpiry(expires),
            Transform::from_translation(at),
        ));
    }
}

impl Thrower for EcsHost<'_> {
    fn throw(&mut self, object: Entity, direction: Vec2, speed: f32) {
        let distance = direction.length();
        let heading = direction.normalize_or_zero();
        let velocity = Vec3::new(heading.x, 0.0, heading.y) * speed;
        if let Ok(mut entity) = self.world.get_entity_mut(object) {
            entity.insert(Thrown { velocity, remaining: distance });
        }
    }
}

impl Clock for EcsHost<'_> {
    fn now(&self) -> Timestamp {
        self.world.get_resource::<Time>().map(|t| t.elapsed()).unwrap_or_default()
    }
}

impl LandmarkLocator for EcsHost<'_> {
    fn nearest_landmark_name(&self, at: Vec3) -> Option<String> {
        self.world
            .iter_entities()
            .filter_map(|e| Some((e.get::<NavBeacon>()?, e.get::<Transform>()?)))
            .min_by(|a, b| {
                a.1.translation
                    .distance_squared(at)
                    .total_cmp(&b.1.translation.distance_squared(at))
            })
            .map(|(beacon, _)| beacon.name.clone())
    }
}
