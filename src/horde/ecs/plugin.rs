//! Horde plugin wiring (glue).
//! - Settings + spawn tables (RON, with default fallback)
//! - Scheduler, seeded rng
//! - Interrupt / removal / rule events, removal observers
//! - Per-frame: interrupts -> teardown -> rule requests -> deadline tick -> throws/cues

use bevy::prelude::*;

use super::components::{
    HordeAnchorRemoved, HordeAnnouncement, HordeFired, HordeInterrupt, HordeRuleRequest,
};
use super::systems::{
    advance_thrown, apply_horde_interrupts, expire_one_shot_cues, follow_attached_cues,
    queue_removed_vent, queue_unanchored, release_removed_anchors, run_horde_rule_requests,
    tick_horde_schedules, PendingAnchorChanges,
};
use crate::horde::random::SeededRandom;
use crate::horde::scheduler::DeferredSpawnScheduler;
use crate::horde::settings::HordeSettings;
use crate::horde::table::HordeTables;

/// Everything horde-related runs in here, so hosts can order around it.
#[derive(SystemSet, Debug, Hash, PartialEq, Eq, Clone)]
pub struct HordeSet;

pub struct HordePlugin {
    /// When set, settings are read from this RON file at build time.
    pub settings_path: Option<String>,
    pub settings: HordeSettings,
    /// When `None`, tables are read from `settings.tables_path`.
    pub tables: Option<HordeTables>,
}

impl Default for HordePlugin {
    fn default() -> Self {
        Self { settings_path: None, settings: HordeSettings::default(), tables: Some(HordeTables::default()) }
    }
}

impl HordePlugin {
    pub fn from_files(settings_path: impl Into<String>) -> Self {
        Self { settings_path: Some(settings_path.into()), settings: HordeSettings::default(), tables: None }
    }

    pub fn with_data(settings: HordeSettings, tables: HordeTables) -> Self {
        Self { settings_path: None, settings, tables: Some(tables) }
    }
}

impl Plugin for HordePlugin {
    fn build(&self, app: &mut App) {
        let settings = match &self.settings_path {
            Some(path) => HordeSettings::load_or_default(path),
            None => self.settings.clone(),
        };
        let tables = match &self.tables {
            Some(tables) => tables.clone(),
            None => match HordeTables::load(&settings.tables_path) {
                Ok(tables) => {
                    info!("Horde: loaded {} spawn tables from '{}'", tables.len(), settings.tables_path);
                    tables
                }
                Err(err) => {
                    warn!("Horde: no spawn tables, '{}' failed: {}", settings.tables_path, err);
                    HordeTables::default()
                }
            },
        };

        // Hosts without TimePlugin still get a clock (advanced by hand).
        if !app.world().contains_resource::<Time>() {
            app.init_resource::<Time>();
        }

        app.insert_resource(SeededRandom::new(settings.seed))
            .insert_resource(DeferredSpawnScheduler::new(settings.profile.clone()))
            .insert_resource(tables)
            .insert_resource(settings)
            .init_resource::<PendingAnchorChanges>()
            .add_observer(queue_unanchored)
            .add_observer(queue_removed_vent)
            .add_event::<HordeInterrupt>()
            .add_event::<HordeAnchorRemoved>()
            .add_event::<HordeRuleRequest>()
            .add_event::<HordeAnnouncement>()
            .add_event::<HordeFired>()
            .add_systems(
                Update,
                (
                    apply_horde_interrupts,
                    release_removed_anchors,
                    run_horde_rule_requests,
                    tick_horde_schedules,
                    advance_thrown,
                    follow_attached_cues,
                    expire_one_shot_cues,
                )
                    .chain()
                    .in_set(HordeSet),
            );
    }
}
