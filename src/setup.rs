use bevy::prelude::*;

use crate::horde::core::GroupKey;
use crate::horde::ecs::{Anchored, NavBeacon, Station, StationMember, VentSpawnLocation};

pub const DEMO_STATION: GroupKey = GroupKey(1);

/// Spawns a small station: a few vents on it, a loose one, and nav beacons.
pub fn setup(mut commands: Commands) {
    commands.spawn((Station(DEMO_STATION), Name::new("Demo Station")));

    // 1) Vents bolted to the station
    let vents = [
        ("Vent (Medbay)", Vec3::new(12.0, 0.0, 4.0)),
        ("Vent (Bar)", Vec3::new(-8.0, 0.0, 10.0)),
        ("Vent (Cargo)", Vec3::new(20.0, 0.0, -14.0)),
    ];
    for (name, at) in vents {
        commands.spawn((
            VentSpawnLocation,
            Anchored,
            StationMember(DEMO_STATION),
            Transform::from_translation(at),
            Name::new(name),
        ));
    }

    // 2) A vent someone already unbolted; never picked
    commands.spawn((
        VentSpawnLocation,
        StationMember(DEMO_STATION),
        Transform::from_xyz(0.0, 0.0, -30.0),
        Name::new("Vent (Maintenance, loose)"),
    ));

    // 3) Beacons for the announcement
    let beacons = [
        ("Medbay", Vec3::new(14.0, 0.0, 2.0)),
        ("Bar", Vec3::new(-10.0, 0.0, 12.0)),
        ("Cargo Bay", Vec3::new(22.0, 0.0, -10.0)),
    ];
    for (name, at) in beacons {
        commands.spawn((NavBeacon { name: name.to_string() }, Transform::from_translation(at)));
    }
}
