pub mod core;
pub mod ecs;
pub mod error;
pub mod random;
pub mod rule;
pub mod schedule;
pub mod scheduler;
pub mod selector;
pub mod settings;
pub mod table;

#[cfg(test)]
pub(crate) mod testing;

pub use ecs::HordePlugin;
pub use error::HordeError;
pub use scheduler::{DeferredSpawnScheduler, FireReport};
