// src/horde/ecs/components.rs
use std::time::Duration;

use bevy::prelude::*;

use crate::horde::core::{CueSpec, GroupKey, InterruptReason, SpawnSpec};

/// Marks an object that may host a horde (a vent).
#[derive(Component, Debug, Default)]
pub struct VentSpawnLocation;

/// Fixed in place. Removing it is an anchor-state change.
#[derive(Component, Debug, Default)]
pub struct Anchored;

/// The station/site an object belongs to.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct StationMember(pub GroupKey);

/// A station root; its key is what `StationMember` points at.
#[derive(Component, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Station(pub GroupKey);

/// Inserted by the host right before an anchor is despawned.
#[derive(Component, Debug, Default)]
pub struct Terminating;

/// Shake on an armed anchor; lives exactly as long as the schedule.
#[derive(Component, Clone, Copy, Debug, PartialEq)]
pub struct Jitter {
    pub amplitude: f32,
    pub frequency: f32,
}

/// Navigation beacon used to describe locations in announcements.
#[derive(Component, Clone, Debug)]
pub struct NavBeacon {
    pub name: String,
}

/// Everything a horde spawned.
#[derive(Component, Clone, Debug)]
pub struct HordeMob {
    pub spec: SpawnSpec,
}

/// In flight after being thrown out of an anchor.
#[derive(Component, Clone, Copy, Debug)]
pub struct Thrown {
    pub velocity: Vec3,
    pub remaining: f32,
}

/// A playing sound. Looping emitters follow `attached_to`.
#[derive(Component, Clone, Debug)]
pub struct CueEmitter {
    pub cue: CueSpec,
    pub looping: bool,
    pub attached_to: Option<Entity>,
}

/// One-shot emitters are despawned once virtual time passes this.
#[derive(Component, Clone, Copy, Debug)]
pub struct CueExpiry(pub Duration);

// ---------- Events ----------

/// Something happened to an anchor that may force its horde out.
#[derive(Event, Clone, Copy, Debug)]
pub struct HordeInterrupt {
    pub anchor: Entity,
    pub reason: InterruptReason,
}

/// Sent by the host before despawning an anchor.
#[derive(Event, Clone, Copy, Debug)]
pub struct HordeAnchorRemoved {
    pub anchor: Entity,
}

/// Start a horde event: pick a vent (in `group`, or any station) and fire after `end_in`.
#[derive(Event, Clone, Debug)]
pub struct HordeRuleRequest {
    pub group: Option<GroupKey>,
    pub table: String,
    pub end_in: Duration,
}

/// Formatted start announcement of a horde rule.
#[derive(Event, Clone, Debug)]
pub struct HordeAnnouncement {
    pub anchor: Entity,
    pub text: String,
}

/// A horde went off.
#[derive(Event, Clone, Debug)]
pub struct HordeFired {
    pub anchor: Entity,
    pub spawned: Vec<Entity>,
    pub failed: usize,
}
