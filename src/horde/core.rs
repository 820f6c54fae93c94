// src/horde/core.rs
//! Core types/traits for deferred horde spawns.
//! Keep this file ECS-light; `horde::ecs` adapts these traits to a Bevy `World`.

use std::fmt;
use std::time::Duration;

use bevy::prelude::*; // Entity, Vec2, Vec3
use serde::{Deserialize, Serialize};

use super::error::HordeError;

// ---------- Ids & time ----------

/// A world object that can host at most one spawn schedule.
pub type Anchor = Entity;

/// Simulation time since start (virtual clock, so it stops while paused).
pub type Timestamp = Duration;

/// Logical group an anchor belongs to (the station/site of the event).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupKey(pub u32);

/// Template id of an object to create on fire. Opaque to the scheduler.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpawnSpec(pub String);

impl SpawnSpec {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpawnSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Handle to a playing looping cue; owned by exactly one schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AudioHandle(pub Entity);

/// Why an armed anchor is being forced to fire early.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InterruptReason {
    /// The anchor was broken (destructible damage threshold).
    Breakage,
    /// The anchor was unfixed from its mount.
    Unanchored,
}

impl fmt::Display for InterruptReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterruptReason::Breakage => f.write_str("destroyed-by-breakage"),
            InterruptReason::Unanchored => f.write_str("unanchored"),
        }
    }
}

// ---------- Profile data ----------

/// A sound to play, addressed by asset path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CueSpec {
    pub path: String,
    #[serde(default)]
    pub volume_db: f32,
}

impl CueSpec {
    pub fn new(path: impl Into<String>, volume_db: f32) -> Self {
        Self { path: path.into(), volume_db }
    }
}

/// Speed/distance ranges used when throwing spawned objects out of the anchor.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThrowParams {
    pub min_speed: f32,
    pub max_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for ThrowParams {
    fn default() -> Self {
        Self {
            min_speed: 0.5,
            max_speed: 1.5,
            min_distance: 2.0,
            max_distance: 4.0,
        }
    }
}

impl ThrowParams {
    /// All values finite and >= 0, `min <= max` for each pair.
    pub fn validate(&self) -> Result<(), HordeError> {
        let pairs = [
            ("speed", self.min_speed, self.max_speed),
            ("distance", self.min_distance, self.max_distance),
        ];
        for (what, min, max) in pairs {
            if !min.is_finite() || !max.is_finite() {
                return Err(HordeError::InvalidThrowParams(format!("{what} range is not finite")));
            }
            if min < 0.0 {
                return Err(HordeError::InvalidThrowParams(format!("min {what} {min} is negative")));
            }
            if min > max {
                return Err(HordeError::InvalidThrowParams(format!(
                    "min {what} {min} exceeds max {what} {max}"
                )));
            }
        }
        Ok(())
    }
}

/// Everything a schedule needs besides its payload: throw ranges and cues.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnerProfile {
    #[serde(default)]
    pub throw: ThrowParams,
    #[serde(default = "default_passive_cue")]
    pub passive_cue: CueSpec,
    #[serde(default = "default_end_cue")]
    pub end_cue: CueSpec,
}

impl Default for SpawnerProfile {
    fn default() -> Self {
        Self {
            throw: ThrowParams::default(),
            passive_cue: default_passive_cue(),
            end_cue: default_end_cue(),
        }
    }
}

fn default_passive_cue() -> CueSpec {
    CueSpec::new("/Audio/Machines/airlock_creaking.ogg", -3.0)
}
fn default_end_cue() -> CueSpec {
    CueSpec::new("/Audio/Weapons/Guns/Gunshots/grenade_launcher.ogg", -3.0)
}

// ---------- Collaborators ----------

/// World query/mutation surface the scheduler and selector need.
pub trait HordeWorld {
    /// Every object carrying the potential-anchor marker.
    fn potential_anchors(&self) -> Vec<Anchor>;
    /// Physically fixed in place.
    fn is_anchored(&self, anchor: Anchor) -> bool;
    fn group_of(&self, anchor: Anchor) -> Option<GroupKey>;
    /// All groups an event could target.
    fn groups(&self) -> Vec<GroupKey>;
    fn position_of(&self, anchor: Anchor) -> Option<Vec3>;
    /// True while the anchor is being deleted (or is already gone).
    fn is_terminating(&self, anchor: Anchor) -> bool;
    /// Create one object from `spec` at `at`.
    fn spawn(&mut self, spec: &SpawnSpec, at: Vec3) -> Result<Entity, HordeError>;
    fn attach_effect(&mut self, anchor: Anchor);
    fn detach_effect(&mut self, anchor: Anchor);
}

pub trait AudioSink {
    /// Start a looping cue following `at`. `None` if nothing could be played.
    fn play_looping(&mut self, cue: &CueSpec, at: Anchor) -> Option<AudioHandle>;
    fn stop(&mut self, handle: AudioHandle);
    fn play_once(&mut self, cue: &CueSpec, at: Vec3);
}

pub trait Thrower {
    /// `direction` carries the travel distance as its length.
    fn throw(&mut self, object: Entity, direction: Vec2, speed: f32);
}

pub trait Clock {
    fn now(&self) -> Timestamp;
}

pub trait LandmarkLocator {
    fn nearest_landmark_name(&self, at: Vec3) -> Option<String>;
}

/// Injected randomness. Object safe so tables can take `&mut dyn RandomSource`.
pub trait RandomSource {
    /// Uniform index in `0..len`, `None` when `len == 0`.
    fn pick_index(&mut self, len: usize) -> Option<usize>;
    /// Uniform float in `[lo, hi]` (inclusive).
    fn range_f32(&mut self, lo: f32, hi: f32) -> f32;
    /// Uniform integer in `[lo, hi]` (inclusive).
    fn range_u32(&mut self, lo: u32, hi: u32) -> u32;
    /// True with probability `p` (clamped into 0..=1).
    fn chance(&mut self, p: f32) -> bool;
    /// Uniform unit vector in the XZ plane.
    fn direction(&mut self) -> Vec2;
}

/// Expands an opaque table reference into a concrete payload.
pub trait SpawnTable {
    fn expand(&self, table: &TableRef, rng: &mut dyn RandomSource) -> Result<Vec<SpawnSpec>, HordeError>;
}

/// Name of a spawn table.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TableRef(pub String);

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Everything the scheduler touches on the host side.
pub trait HordeHost: HordeWorld + AudioSink + Thrower + Clock + LandmarkLocator {}

impl<T> HordeHost for T where T: HordeWorld + AudioSink + Thrower + Clock + LandmarkLocator {}
