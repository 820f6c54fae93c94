// src/horde/selector.rs
//! Picks an eligible anchor for a horde. Read-only; deterministic for a fixed rng.

use super::core::{Anchor, GroupKey, HordeWorld, RandomSource};
use super::scheduler::DeferredSpawnScheduler;

pub struct CandidateSelector;

impl CandidateSelector {
    /// Marked anchors that are fixed in place, unarmed and in `group`. Sorted by id.
    pub fn eligible<W: HordeWorld + ?Sized>(
        world: &W,
        scheduler: &DeferredSpawnScheduler,
        group: GroupKey,
    ) -> Vec<Anchor> {
        let mut out: Vec<Anchor> = world
            .potential_anchors()
            .into_iter()
            .filter(|&anchor| world.is_anchored(anchor))
            .filter(|&anchor| !scheduler.is_armed(anchor))
            .filter(|&anchor| world.group_of(anchor) == Some(group))
            .collect();
        // Host iteration order is not stable.
        out.sort();
        out.dedup();
        out
    }

    /// Uniform pick among [`Self::eligible`]. `None` means abort.
    pub fn select<W, R>(
        world: &W,
        scheduler: &DeferredSpawnScheduler,
        group: GroupKey,
        rng: &mut R,
    ) -> Option<Anchor>
    where
        W: HordeWorld + ?Sized,
        R: RandomSource + ?Sized,
    {
        let candidates = Self::eligible(world, scheduler, group);
        let idx = rng.pick_index(candidates.len())?;
        candidates.get(idx).copied()
    }

    /// Pick a random group first, then an anchor in it. No retry on an empty group.
    pub fn select_any_group<W, R>(
        world: &W,
        scheduler: &DeferredSpawnScheduler,
        rng: &mut R,
    ) -> Option<(GroupKey, Anchor)>
    where
        W: HordeWorld + ?Sized,
        R: RandomSource + ?Sized,
    {
        let mut groups = world.groups();
        groups.sort();
        groups.dedup();
        let group = *groups.get(rng.pick_index(groups.len())?)?;
        Self::select(world, scheduler, group, rng).map(|anchor| (group, anchor))
    }
}
