pub mod horde;
pub mod setup;

pub use horde::HordePlugin;
