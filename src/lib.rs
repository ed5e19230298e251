// Re-export core modules for use by the binary or other consumers
pub mod core;
pub mod data;
pub mod prefs;
pub mod systems;

// Expose the session wrapper and types needed for interaction
pub use crate::core::session::{Session, Snapshot};
pub use crate::systems::toggle::SetupIntent;
