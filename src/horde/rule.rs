// src/horde/rule.rs
//! Horde event rule: chooses the anchor and announces it on `begin`,
//! arms the scheduler on `start`.

use super::core::{
    Anchor, GroupKey, HordeHost, HordeWorld, LandmarkLocator, RandomSource, SpawnTable, TableRef,
    Timestamp,
};
use super::error::HordeError;
use super::scheduler::DeferredSpawnScheduler;
use super::selector::CandidateSelector;

use bevy::prelude::*;

pub const LOCATION_TOKEN: &str = "{location}";
pub const UNKNOWN_LOCATION: &str = "an unknown location";

#[derive(Clone, Debug)]
pub struct EventRuleCoordinator {
    table: TableRef,
    announcement_template: Option<String>,
    chosen: Option<Anchor>,
    announcement: Option<String>,
}

impl EventRuleCoordinator {
    pub fn new(table: TableRef, announcement_template: Option<String>) -> Self {
        Self { table, announcement_template, chosen: None, announcement: None }
    }

    pub fn table(&self) -> &TableRef {
        &self.table
    }

    pub fn chosen(&self) -> Option<Anchor> {
        self.chosen
    }

    /// Formatted start announcement, once `begin` succeeded.
    pub fn announcement(&self) -> Option<&str> {
        self.announcement.as_deref()
    }

    /// Choose an anchor in `group`. On `NoCandidate` the caller ends the event.
    pub fn begin<W, R>(
        &mut self,
        world: &W,
        scheduler: &DeferredSpawnScheduler,
        rng: &mut R,
        group: GroupKey,
    ) -> Result<Anchor, HordeError>
    where
        W: HordeWorld + LandmarkLocator + ?Sized,
        R: RandomSource + ?Sized,
    {
        let chosen = CandidateSelector::select(world, scheduler, group, rng);
        self.accept(world, chosen)
    }

    /// Like [`Self::begin`], but picks the group at random too.
    pub fn begin_any<W, R>(
        &mut self,
        world: &W,
        scheduler: &DeferredSpawnScheduler,
        rng: &mut R,
    ) -> Result<Anchor, HordeError>
    where
        W: HordeWorld + LandmarkLocator + ?Sized,
        R: RandomSource + ?Sized,
    {
        let chosen = CandidateSelector::select_any_group(world, scheduler, rng).map(|(_, anchor)| anchor);
        self.accept(world, chosen)
    }

    fn accept<W>(&mut self, world: &W, chosen: Option<Anchor>) -> Result<Anchor, HordeError>
    where
        W: HordeWorld + LandmarkLocator + ?Sized,
    {
        let Some(anchor) = chosen else {
            warn!("Horde: unable to find a valid anchor for table '{}'", self.table);
            return Err(HordeError::NoCandidate);
        };
        self.chosen = Some(anchor);

        // Never includes the fire time.
        self.announcement = self.announcement_template.as_deref().map(|template| {
            let location = world
                .position_of(anchor)
                .and_then(|at| world.nearest_landmark_name(at))
                .unwrap_or_else(|| UNKNOWN_LOCATION.to_string());
            format_announcement(template, &location)
        });
        Ok(anchor)
    }

    /// Arm the chosen anchor to fire at `end_time` (or right away if that has passed).
    /// Returns the armed anchor, `None` if `begin` never chose one.
    pub fn start<H, T, R>(
        &mut self,
        host: &mut H,
        scheduler: &mut DeferredSpawnScheduler,
        tables: &T,
        rng: &mut R,
        end_time: Timestamp,
    ) -> Result<Option<Anchor>, HordeError>
    where
        H: HordeHost + ?Sized,
        T: SpawnTable + ?Sized,
        R: RandomSource,
    {
        let Some(anchor) = self.chosen else {
            return Ok(None);
        };
        let duration = end_time.saturating_sub(host.now());
        let payload = tables.expand(&self.table, rng)?;
        scheduler.arm(host, anchor, payload, duration)?;
        Ok(Some(anchor))
    }

    /// Forget the chosen anchor. The schedule itself runs to completion.
    pub fn end(&mut self) {
        self.chosen = None;
    }
}

/// Substitute the location token; templates without one pass through unchanged.
pub fn format_announcement(template: &str, location: &str) -> String {
    template.replace(LOCATION_TOKEN, location)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::prelude::*;

    use super::*;
    use crate::horde::random::SeededRandom;
    use crate::horde::table::HordeTables;
    use crate::horde::testing::FakeHost;

    const STATION: GroupKey = GroupKey(7);

    fn tables() -> HordeTables {
        HordeTables::from_ron_str(r#"[(name: "mice", root: Entity(id: "MobMouse", amount: 3))]"#).unwrap()
    }

    fn rule(template: Option<&str>) -> EventRuleCoordinator {
        EventRuleCoordinator::new(TableRef::new("mice"), template.map(str::to_string))
    }

    #[test]
    fn begin_without_candidates_fails() {
        let host = FakeHost::new();
        let sched = DeferredSpawnScheduler::default();
        let mut rng = SeededRandom::new(1);
        let mut r = rule(None);
        assert!(matches!(r.begin(&host, &sched, &mut rng, STATION), Err(HordeError::NoCandidate)));
        assert!(r.chosen().is_none());
        assert!(matches!(r.begin_any(&host, &sched, &mut rng), Err(HordeError::NoCandidate)));
    }

    #[test]
    fn announcement_names_nearest_landmark() {
        let mut host = FakeHost::new();
        host.add_anchor(STATION, Vec3::new(10.0, 0.0, 10.0));
        host.landmarks.push(("Medbay".to_string(), Vec3::new(9.0, 0.0, 9.0)));
        host.landmarks.push(("Bridge".to_string(), Vec3::new(-50.0, 0.0, 0.0)));
        let sched = DeferredSpawnScheduler::default();
        let mut rng = SeededRandom::new(1);

        let mut r = rule(Some("Lifesigns detected near {location}."));
        r.begin(&host, &sched, &mut rng, STATION).unwrap();
        assert_eq!(r.announcement(), Some("Lifesigns detected near Medbay."));
    }

    #[test]
    fn announcement_without_landmarks_or_token() {
        let mut host = FakeHost::new();
        host.add_anchor(STATION, Vec3::ZERO);
        let sched = DeferredSpawnScheduler::default();
        let mut rng = SeededRandom::new(1);

        let mut r = rule(Some("Vermin near {location}!"));
        r.begin(&host, &sched, &mut rng, STATION).unwrap();
        assert_eq!(r.announcement(), Some("Vermin near an unknown location!"));

        let mut plain = rule(Some("Something stirs."));
        plain.begin(&host, &sched, &mut rng, STATION).unwrap();
        assert_eq!(plain.announcement(), Some("Something stirs."));

        let mut silent = rule(None);
        silent.begin(&host, &sched, &mut rng, STATION).unwrap();
        assert_eq!(silent.announcement(), None);
    }

    #[test]
    fn start_arms_until_end_time() {
        let mut host = FakeHost::new();
        let vent = host.add_anchor(STATION, Vec3::ZERO);
        let mut sched = DeferredSpawnScheduler::default();
        let mut rng = SeededRandom::new(1);

        let mut r = rule(None);
        assert_eq!(r.begin(&host, &sched, &mut rng, STATION).unwrap(), vent);
        host.now = Duration::from_secs(4);
        let armed = r.start(&mut host, &mut sched, &tables(), &mut rng, Duration::from_secs(64)).unwrap();

        assert_eq!(armed, Some(vent));
        assert_eq!(sched.deadline_of(vent), Some(Duration::from_secs(64)));
        assert_eq!(sched.schedule(vent).unwrap().payload.len(), 3);
    }

    #[test]
    fn past_end_time_clamps_to_now() {
        let mut host = FakeHost::new();
        let vent = host.add_anchor(STATION, Vec3::ZERO);
        let mut sched = DeferredSpawnScheduler::default();
        let mut rng = SeededRandom::new(1);

        let mut r = rule(None);
        r.begin(&host, &sched, &mut rng, STATION).unwrap();
        host.now = Duration::from_secs(100);
        r.start(&mut host, &mut sched, &tables(), &mut rng, Duration::from_secs(50)).unwrap();
        assert_eq!(sched.deadline_of(vent), Some(Duration::from_secs(100)));
    }

    #[test]
    fn start_without_begin_is_noop() {
        let mut host = FakeHost::new();
        host.add_anchor(STATION, Vec3::ZERO);
        let mut sched = DeferredSpawnScheduler::default();
        let mut rng = SeededRandom::new(1);

        let mut r = rule(None);
        let armed = r.start(&mut host, &mut sched, &tables(), &mut rng, Duration::from_secs(5)).unwrap();
        assert_eq!(armed, None);
        assert_eq!(sched.armed_count(), 0);
    }

    #[test]
    fn end_forgets_the_anchor_but_not_the_schedule() {
        let mut host = FakeHost::new();
        let vent = host.add_anchor(STATION, Vec3::ZERO);
        let mut sched = DeferredSpawnScheduler::default();
        let mut rng = SeededRandom::new(1);

        let mut r = rule(None);
        r.begin(&host, &sched, &mut rng, STATION).unwrap();
        r.start(&mut host, &mut sched, &tables(), &mut rng, Duration::from_secs(5)).unwrap();
        r.end();

        assert_eq!(r.chosen(), None);
        let again = r.start(&mut host, &mut sched, &tables(), &mut rng, Duration::from_secs(1)).unwrap();
        assert_eq!(again, None);
        assert_eq!(sched.deadline_of(vent), Some(Duration::from_secs(5)));

        let reports = sched.tick(&mut host, &mut rng, Duration::from_secs(6));
        assert_eq!(reports.len(), 1);
        assert_eq!(host.spawned.len(), 3);
    }

    #[test]
    fn table_is_kept_for_reporting() {
        assert_eq!(rule(None).table(), &TableRef::new("mice"));
    }

    #[test]
    fn second_rule_picks_another_vent() {
        let mut host = FakeHost::new();
        let a = host.add_anchor(STATION, Vec3::ZERO);
        let b = host.add_anchor(STATION, Vec3::ONE);
        let mut sched = DeferredSpawnScheduler::default();
        let mut rng = SeededRandom::new(3);

        let mut first = rule(None);
        let picked = first.begin(&host, &sched, &mut rng, STATION).unwrap();
        first.start(&mut host, &mut sched, &tables(), &mut rng, Duration::from_secs(5)).unwrap();

        let mut second = rule(None);
        let other = second.begin(&host, &sched, &mut rng, STATION).unwrap();
        assert_ne!(picked, other);
        assert!([a, b].contains(&other));
    }
}
