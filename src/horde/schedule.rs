// src/horde/schedule.rs
//! Per-anchor schedule record: deadline, payload, held resources.

use super::core::{AudioHandle, SpawnSpec, SpawnerProfile, ThrowParams, Timestamp};
use super::error::HordeError;

/// One armed horde. Owned by the scheduler, keyed by anchor.
#[derive(Clone, Debug)]
pub struct SpawnSchedule {
    /// Fire once `now > deadline` unless interrupted first.
    pub deadline: Option<Timestamp>,
    /// What to create on fire; each entry spawns independently.
    pub payload: Vec<SpawnSpec>,
    pub profile: SpawnerProfile,
    /// Exclusively owned; stopped exactly once on fire or teardown.
    pub looping_cue: Option<AudioHandle>,
    /// True while the auxiliary effect is attached to the anchor.
    pub aux_effect: bool,
}

impl SpawnSchedule {
    pub fn new(
        payload: Vec<SpawnSpec>,
        profile: SpawnerProfile,
        deadline: Timestamp,
    ) -> Result<Self, HordeError> {
        profile.throw.validate()?;
        Ok(Self {
            deadline: Some(deadline),
            payload,
            profile,
            looping_cue: None,
            aux_effect: false,
        })
    }

    pub fn throw_params(&self) -> &ThrowParams {
        &self.profile.throw
    }

    /// Strictly past the deadline. A schedule without a deadline is never due.
    pub fn is_due(&self, now: Timestamp) -> bool {
        matches!(self.deadline, Some(deadline) if now > deadline)
    }

    /// Hand the cue over for stopping; a second call yields `None`.
    pub fn take_cue(&mut self) -> Option<AudioHandle> {
        self.looping_cue.take()
    }
}
