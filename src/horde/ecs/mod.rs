//! Bevy side of the horde: marker components, a `HordeHost` over `World`,
//! the per-frame systems and `HordePlugin`.

pub mod components;
pub mod host;
pub mod plugin;
pub mod systems;

pub use components::*;
pub use host::EcsHost;
pub use plugin::{HordePlugin, HordeSet};
pub use systems::with_horde;
