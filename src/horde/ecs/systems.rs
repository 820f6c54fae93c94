// src/horde/ecs/systems.rs

use bevy::ecs::event::EventCursor;
use bevy::prelude::*;

use super::components::{
    Anchored, CueEmitter, CueExpiry, HordeAnchorRemoved, HordeAnnouncement, HordeFired,
    HordeInterrupt, HordeRuleRequest, Thrown, VentSpawnLocation,
};
use super::host::EcsHost;
use crate::horde::core::{Clock, InterruptReason, TableRef};
use crate::horde::random::SeededRandom;
use crate::horde::rule::EventRuleCoordinator;
use crate::horde::scheduler::{DeferredSpawnScheduler, FireReport};
use crate::horde::settings::HordeSettings;
use crate::horde::table::HordeTables;

/// Run `f` with the scheduler, the rng and a host view of the rest of the world.
pub fn with_horde<T>(
    world: &mut World,
    f: impl FnOnce(&mut EcsHost<'_>, &mut DeferredSpawnScheduler, &mut SeededRandom) -> T,
) -> T {
    world.resource_scope(|world, mut rng: Mut<SeededRandom>| {
        world.resource_scope(|world, mut scheduler: Mut<DeferredSpawnScheduler>| {
            let mut host = EcsHost::new(world);
            f(&mut host, &mut scheduler, &mut rng)
        })
    })
}

fn unread<E: Event + Clone>(world: &World, cursor: &mut EventCursor<E>) -> Vec<E> {
    world
        .get_resource::<Events<E>>()
        .map(|events| cursor.read(events).cloned().collect())
        .unwrap_or_default()
}

fn announce_fired(world: &mut World, reports: Vec<FireReport>) {
    for report in reports {
        world.send_event(HordeFired {
            anchor: report.anchor,
            spawned: report.spawned.iter().map(|s| s.entity).collect(),
            failed: report.failures.len(),
        });
    }
}

/// Removals seen by the observers below, kept until the next `HordeSet` run.
/// Removals happen anywhere in the frame, including after `HordeSet`.
#[derive(Resource, Default, Debug)]
pub struct PendingAnchorChanges {
    unanchored: Vec<Entity>,
    vents_removed: Vec<Entity>,
}

pub fn queue_unanchored(trigger: Trigger<OnRemove, Anchored>, mut pending: ResMut<PendingAnchorChanges>) {
    pending.unanchored.push(trigger.target());
}

pub fn queue_removed_vent(trigger: Trigger<OnRemove, VentSpawnLocation>, mut pending: ResMut<PendingAnchorChanges>) {
    pending.vents_removed.push(trigger.target());
}

fn drain_pending(world: &mut World, f: impl FnOnce(&mut PendingAnchorChanges) -> &mut Vec<Entity>) -> Vec<Entity> {
    world
        .get_resource_mut::<PendingAnchorChanges>()
        .map(|mut pending| std::mem::take(f(&mut *pending)))
        .unwrap_or_default()
}

/// Explicit interrupts, plus anchors that lost `Anchored` since the last run.
pub fn apply_horde_interrupts(world: &mut World, mut cursor: Local<EventCursor<HordeInterrupt>>) {
    let mut pending = unread(world, &mut cursor);
    let unanchored = drain_pending(world, |p| &mut p.unanchored);
    pending.extend(unanchored.into_iter().map(|anchor| HordeInterrupt {
        anchor,
        reason: InterruptReason::Unanchored,
    }));
    if pending.is_empty() {
        return;
    }

    let reports = with_horde(world, |host, scheduler, rng| {
        pending
            .into_iter()
            .filter_map(|ev| scheduler.interrupt(host, rng, ev.anchor, ev.reason))
            .collect::<Vec<_>>()
    });
    announce_fired(world, reports);
}

/// Teardown for anchors announced as removed, or despawned outright.
pub fn release_removed_anchors(world: &mut World, mut cursor: Local<EventCursor<HordeAnchorRemoved>>) {
    let mut gone: Vec<Entity> = unread(world, &mut cursor).into_iter().map(|ev| ev.anchor).collect();
    let despawned: Vec<Entity> = drain_pending(world, |p| &mut p.vents_removed)
        .into_iter()
        .filter(|&e| !world.entities().contains(e))
        .collect();
    gone.extend(despawned);
    if gone.is_empty() {
        return;
    }

    with_horde(world, |host, scheduler, _| {
        for anchor in gone {
            scheduler.on_anchor_removed(host, anchor);
        }
    });
}

/// Begin + start a rule per request. A request with no eligible vent is dropped.
pub fn run_horde_rule_requests(world: &mut World, mut cursor: Local<EventCursor<HordeRuleRequest>>) {
    let requests = unread(world, &mut cursor);
    if requests.is_empty() {
        return;
    }
    let template = world.get_resource::<HordeSettings>().and_then(|s| s.announcement.clone());

    for request in requests {
        let announced = world.resource_scope(|world, tables: Mut<HordeTables>| {
            with_horde(world, |host, scheduler, rng| {
                let mut rule = EventRuleCoordinator::new(TableRef::new(request.table.clone()), template.clone());
                let begun = match request.group {
                    Some(group) => rule.begin(&*host, &*scheduler, rng, group),
                    None => rule.begin_any(&*host, &*scheduler, rng),
                };
                let anchor = begun.ok()?;
                let end_time = host.now() + request.end_in;
                if let Err(err) = rule.start(host, scheduler, &*tables, rng, end_time) {
                    warn!("Horde: rule for table '{}' failed to start: {}", rule.table(), err);
                    rule.end();
                    return None;
                }
                let text = rule.announcement().map(str::to_string);
                // Armed; the schedule outlives the rule.
                rule.end();
                text.map(|text| HordeAnnouncement { anchor, text })
            })
        });

        if let Some(announcement) = announced {
            info!("Horde: announcing '{}'", announcement.text);
            world.send_event(announcement);
        }
    }
}

/// Fire every schedule past its deadline.
pub fn tick_horde_schedules(world: &mut World) {
    let reports = with_horde(world, |host, scheduler, rng| {
        let now = host.now();
        scheduler.tick(host, rng, now)
    });
    announce_fired(world, reports);
}

/// Move thrown mobs until they have covered their throw distance.
pub fn advance_thrown(
    mut commands: Commands,
    time: Res<Time>,
    mut q: Query<(Entity, &mut Transform, &mut Thrown)>,
) {
    let dt = time.delta_secs();
    for (entity, mut tf, mut thrown) in &mut q {
        let speed = thrown.velocity.length();
        if speed <= f32::EPSILON || thrown.remaining <= 0.0 {
            commands.entity(entity).remove::<Thrown>();
            continue;
        }
        let step = (speed * dt).min(thrown.remaining);
        tf.translation += thrown.velocity / speed * step;
        thrown.remaining -= step;
        if thrown.remaining <= 0.0 {
            commands.entity(entity).remove::<Thrown>();
        }
    }
}

/// Looping cues sit on their anchor.
pub fn follow_attached_cues(
    mut emitters: Query<(&CueEmitter, &mut Transform)>,
    anchors: Query<&Transform, Without<CueEmitter>>,
) {
    for (emitter, mut tf) in &mut emitters {
        let Some(anchor) = emitter.attached_to else { continue };
        if let Ok(anchor_tf) = anchors.get(anchor) {
            tf.translation = anchor_tf.translation;
        }
    }
}

pub fn expire_one_shot_cues(mut commands: Commands, time: Res<Time>, q: Query<(Entity, &CueExpiry)>) {
    let now = time.elapsed();
    for (entity, expiry) in &q {
        if now >= expiry.0 {
            commands.entity(entity).despawn();
        }
    }
}
