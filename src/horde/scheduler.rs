// src/horde/scheduler.rs
//! Owns every armed horde. Arms, fires (on deadline or interrupt) and tears down.
//!
//! State per anchor: `Unarmed -> Armed(deadline) -> Fired | TornDown`.
//! The record is removed from the map before any side effect runs, so a second
//! `fire`/`interrupt`/`tick` for the same anchor always finds nothing to do.

use std::collections::HashMap;
use std::time::Duration;

use bevy::prelude::*;

use super::core::{
    Anchor, HordeHost, InterruptReason, RandomSource, SpawnSpec, SpawnerProfile, ThrowParams,
    Timestamp,
};
use super::error::HordeError;
use super::schedule::SpawnSchedule;

/// One object created by a fire, with the throw that was requested for it.
#[derive(Clone, Debug)]
pub struct SpawnedObject {
    pub entity: Entity,
    pub spec: SpawnSpec,
    /// Unit direction in the XZ plane.
    pub direction: Vec2,
    pub distance: f32,
    pub speed: f32,
}

/// Outcome of a single fire.
#[derive(Debug)]
pub struct FireReport {
    pub anchor: Anchor,
    pub spawned: Vec<SpawnedObject>,
    pub failures: Vec<HordeError>,
}

/// Side table `Anchor -> SpawnSchedule`.
#[derive(Resource, Default)]
pub struct DeferredSpawnScheduler {
    schedules: HashMap<Anchor, SpawnSchedule>,
    profile: SpawnerProfile,
}

impl DeferredSpawnScheduler {
    pub fn new(profile: SpawnerProfile) -> Self {
        Self { schedules: HashMap::new(), profile }
    }

    pub fn is_armed(&self, anchor: Anchor) -> bool {
        self.schedules.contains_key(&anchor)
    }

    pub fn schedule(&self, anchor: Anchor) -> Option<&SpawnSchedule> {
        self.schedules.get(&anchor)
    }

    pub fn deadline_of(&self, anchor: Anchor) -> Option<Timestamp> {
        self.schedules.get(&anchor).and_then(|s| s.deadline)
    }

    pub fn armed_count(&self) -> usize {
        self.schedules.len()
    }

    pub fn anchors(&self) -> impl Iterator<Item = Anchor> + '_ {
        self.schedules.keys().copied()
    }

    /// Arm `anchor` with the default profile, firing `delay` from now.
    pub fn arm<H: HordeHost + ?Sized>(
        &mut self,
        host: &mut H,
        anchor: Anchor,
        payload: Vec<SpawnSpec>,
        delay: Duration,
    ) -> Result<(), HordeError> {
        let profile = self.profile.clone();
        self.arm_with(host, anchor, payload, delay, profile)
    }

    /// Arm with an explicit profile. Never replaces a live schedule.
    pub fn arm_with<H: HordeHost + ?Sized>(
        &mut self,
        host: &mut H,
        anchor: Anchor,
        payload: Vec<SpawnSpec>,
        delay: Duration,
        profile: SpawnerProfile,
    ) -> Result<(), HordeError> {
        if self.schedules.contains_key(&anchor) {
            return Err(HordeError::AlreadyArmed(anchor));
        }

        let deadline = host.now() + delay;
        let mut schedule = SpawnSchedule::new(payload, profile, deadline)?;

        schedule.looping_cue = host.play_looping(&schedule.profile.passive_cue, anchor);
        host.attach_effect(anchor);
        schedule.aux_effect = true;

        info!(
            "Horde: armed {:?} with {} spawns, fires at {:.2}s",
            anchor,
            schedule.payload.len(),
            deadline.as_secs_f32()
        );
        self.schedules.insert(anchor, schedule);
        Ok(())
    }

    /// Fire every schedule whose deadline is strictly before `now`. No ordering among them.
    pub fn tick<H, R>(&mut self, host: &mut H, rng: &mut R, now: Timestamp) -> Vec<FireReport>
    where
        H: HordeHost + ?Sized,
        R: RandomSource + ?Sized,
    {
        let due: Vec<Anchor> = self
            .schedules
            .iter()
            .filter(|(_, schedule)| schedule.is_due(now))
            .map(|(anchor, _)| *anchor)
            .collect();

        due.into_iter()
            .filter_map(|anchor| self.fire(host, rng, anchor))
            .collect()
    }

    /// Detonate now. `None` when `anchor` has no schedule.
    pub fn fire<H, R>(&mut self, host: &mut H, rng: &mut R, anchor: Anchor) -> Option<FireReport>
    where
        H: HordeHost + ?Sized,
        R: RandomSource + ?Sized,
    {
        let mut schedule = self.schedules.remove(&anchor)?;

        // 1) looping cue
        if let Some(handle) = schedule.take_cue() {
            host.stop(handle);
        }

        // 2) end cue + 3) spawns
        let origin = host.position_of(anchor);
        match origin {
            Some(at) => host.play_once(&schedule.profile.end_cue, at),
            None => debug!("Horde: {:?} has no position, skipping end cue", anchor),
        }

        let mut report = FireReport { anchor, spawned: Vec::new(), failures: Vec::new() };
        let throw = *schedule.throw_params();
        for spec in schedule.payload.drain(..) {
            let Some(at) = origin else {
                report.failures.push(HordeError::SpawnCreationFailed {
                    spec,
                    reason: format!("anchor {anchor:?} has no position"),
                });
                continue;
            };
            match host.spawn(&spec, at) {
                Ok(entity) => {
                    let (direction, distance, speed) = roll_throw(rng, &throw);
                    host.throw(entity, direction * distance, speed);
                    debug!(
                        "Horde: {} -> {:?} thrown {:.2}m at {:.2}m/s",
                        spec, entity, distance, speed
                    );
                    report.spawned.push(SpawnedObject { entity, spec, direction, distance, speed });
                }
                Err(err) => {
                    warn!("Horde: {}", err);
                    report.failures.push(err);
                }
            }
        }

        // 4) aux effect; 5) the record is already out of the map
        if schedule.aux_effect {
            host.detach_effect(anchor);
            schedule.aux_effect = false;
        }

        info!(
            "Horde: fired {:?}, {} spawned, {} failed",
            anchor,
            report.spawned.len(),
            report.failures.len()
        );
        Some(report)
    }

    /// Something happened to an armed anchor. There is no escape: it fires now,
    /// unless the anchor is being deleted, in which case teardown owns it.
    pub fn interrupt<H, R>(
        &mut self,
        host: &mut H,
        rng: &mut R,
        anchor: Anchor,
        reason: InterruptReason,
    ) -> Option<FireReport>
    where
        H: HordeHost + ?Sized,
        R: RandomSource + ?Sized,
    {
        if !self.schedules.contains_key(&anchor) {
            return None;
        }
        if host.is_terminating(anchor) {
            debug!("Horde: ignoring {} on terminating {:?}", reason, anchor);
            return None;
        }
        info!("Horde: {:?} interrupted ({}), firing early", anchor, reason);
        self.fire(host, rng, anchor)
    }

    /// Anchor is going away for good: release everything, spawn nothing.
    /// Returns whether a schedule was dropped.
    pub fn on_anchor_removed<H: HordeHost + ?Sized>(&mut self, host: &mut H, anchor: Anchor) -> bool {
        let Some(mut schedule) = self.schedules.remove(&anchor) else {
            return false;
        };
        if let Some(handle) = schedule.take_cue() {
            host.stop(handle);
        }
        if schedule.aux_effect {
            host.detach_effect(anchor);
        }
        info!(
            "Horde: {:?} removed while armed, dropped {} pending spawns",
            anchor,
            schedule.payload.len()
        );
        true
    }
}

/// Unit direction, distance in `[min_distance, max_distance]`, speed in `[min_speed, max_speed]`.
pub fn roll_throw<R: RandomSource + ?Sized>(rng: &mut R, throw: &ThrowParams) -> (Vec2, f32, f32) {
    let direction = rng.direction().normalize_or(Vec2::X);
    let distance = rng
        .range_f32(throw.min_distance, throw.max_distance)
        .clamp(throw.min_distance, throw.max_distance);
    let speed = rng
        .range_f32(throw.min_speed, throw.max_speed)
        .clamp(throw.min_speed, throw.max_speed);
    (direction, distance, speed)
}
