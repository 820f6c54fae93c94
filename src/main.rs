use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;

use vent_horde::horde::ecs::{HordeAnnouncement, HordeFired, HordeRuleRequest, HordeSet};
use vent_horde::setup;
use vent_horde::HordePlugin;

/// How long the demo rule runs before the vent gives way.
const RULE_DURATION: Duration = Duration::from_secs(3);

fn main() {
    App::new()
        // headless: fixed 60Hz loop, logs to stdout
        .add_plugins(MinimalPlugins.set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(1.0 / 60.0))))
        .add_plugins(LogPlugin::default())
        .add_plugins(HordePlugin::from_files("assets/horde/settings.ron"))
        .add_systems(Startup, (setup::setup, request_demo_horde).chain())
        .add_systems(Update, (log_announcements, exit_when_fired).after(HordeSet))
        .run();
}

fn request_demo_horde(mut requests: EventWriter<HordeRuleRequest>) {
    requests.write(HordeRuleRequest {
        group: None,
        table: "vermin".to_string(),
        end_in: RULE_DURATION,
    });
}

fn log_announcements(mut announcements: EventReader<HordeAnnouncement>) {
    for announcement in announcements.read() {
        info!("[station announcement] {}", announcement.text);
    }
}

fn exit_when_fired(
    mut fired: EventReader<HordeFired>,
    names: Query<&Name>,
    mut exit: EventWriter<AppExit>,
) {
    for ev in fired.read() {
        let vent = names.get(ev.anchor).map(|n| n.as_str()).unwrap_or("unknown vent");
        info!("{} burst open: {} spawned, {} failed", vent, ev.spawned.len(), ev.failed);
        exit.write(AppExit::Success);
    }
}
