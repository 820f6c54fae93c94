// src/horde/testing.rs
//! In-memory host for core tests. Entity ids come from a throwaway `World`.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use bevy::prelude::*;

use super::core::*;
use super::error::HordeError;

#[derive(Clone, Debug)]
pub struct FakeAnchor {
    pub id: Anchor,
    pub group: Option<GroupKey>,
    pub anchored: bool,
    pub position: Vec3,
    pub terminating: bool,
}

#[derive(Default)]
pub struct FakeHost {
    ids: World,
    pub now: Duration,
    pub anchors: Vec<FakeAnchor>,
    pub groups: Vec<GroupKey>,
    pub landmarks: Vec<(String, Vec3)>,
    pub spawned: Vec<(Entity, SpawnSpec, Vec3)>,
    pub throws: Vec<(Entity, Vec2, f32)>,
    pub effects: HashSet<Anchor>,
    pub playing: HashMap<AudioHandle, (CueSpec, Anchor)>,
    pub stopped: Vec<AudioHandle>,
    pub one_shots: Vec<(CueSpec, Vec3)>,
    /// Spec ids whose creation fails.
    pub failing: HashSet<String>,
    pub mute: bool,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_anchor(&mut self, group: GroupKey, position: Vec3) -> Anchor {
        let id = self.ids.spawn_empty().id();
        if !self.groups.contains(&group) {
            self.groups.push(group);
        }
        self.anchors.push(FakeAnchor { id, group: Some(group), anchored: true, position, terminating: false });
        id
    }

    pub fn anchor_mut(&mut self, id: Anchor) -> &mut FakeAnchor {
        self.anchors.iter_mut().find(|a| a.id == id).expect("unknown fake anchor")
    }

    pub fn remove_anchor(&mut self, id: Anchor) {
        self.anchors.retain(|a| a.id != id);
    }

    fn anchor(&self, id: Anchor) -> Option<&FakeAnchor> {
        self.anchors.iter().find(|a| a.id == id)
    }
}

impl HordeWorld for FakeHost {
    fn potential_anchors(&self) -> Vec<Anchor> {
        self.anchors.iter().map(|a| a.id).collect()
    }

    fn is_anchored(&self, anchor: Anchor) -> bool {
        self.anchor(anchor).is_some_and(|a| a.anchored)
    }

    fn group_of(&self, anchor: Anchor) -> Option<GroupKey> {
        self.anchor(anchor).and_then(|a| a.group)
    }

    fn groups(&self) -> Vec<GroupKey> {
        self.groups.clone()
    }

    fn position_of(&self, anchor: Anchor) -> Option<Vec3> {
        self.anchor(anchor).map(|a| a.position)
    }

    fn is_terminating(&self, anchor: Anchor) -> bool {
        self.anchor(anchor).is_none_or(|a| a.terminating)
    }

    fn spawn(&mut self, spec: &SpawnSpec, at: Vec3) -> Result<Entity, HordeError> {
        if self.failing.contains(spec.as_str()) {
            return Err(HordeError::SpawnCreationFailed {
                spec: spec.clone(),
                reason: "scripted failure".to_string(),
            });
        }
        let id = self.ids.spawn_empty().id();
        self.spawned.push((id, spec.clone(), at));
        Ok(id)
    }

    fn attach_effect(&mut self, anchor: Anchor) {
        self.effects.insert(anchor);
    }

    fn detach_effect(&mut self, anchor: Anchor) {
        self.effects.remove(&anchor);
    }
}

impl AudioSink for FakeHost {
    fn play_looping(&mut self, cue: &CueSpec, at: Anchor) -> Option<AudioHandle> {
        if self.mute {
            return None;
        }
        let handle = AudioHandle(self.ids.spawn_empty().id());
        self.playing.insert(handle, (cue.clone(), at));
        Some(handle)
    }

    fn stop(&mut self, handle: AudioHandle) {
        self.playing.remove(&handle);
        self.stopped.push(handle);
    }

    fn play_once(&mut self, cue: &CueSpec, at: Vec3) {
        self.one_shots.push((cue.clone(), at));
    }
}

impl Thrower for FakeHost {
    fn throw(&mut self, object: Entity, direction: Vec2, speed: f32) {
        self.throws.push((object, direction, speed));
    }
}

impl Clock for FakeHost {
    fn now(&self) -> Timestamp {
        self.now
    }
}

impl LandmarkLocator for FakeHost {
    fn nearest_landmark_name(&self, at: Vec3) -> Option<String> {
        self.landmarks
            .iter()
            .min_by(|a, b| a.1.distance_squared(at).total_cmp(&b.1.distance_squared(at)))
            .map(|(name, _)| name.clone())
    }
}
