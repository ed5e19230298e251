pub mod repository;
pub mod sqlite;

pub use repository::{MemoryPreferences, PreferenceRepository};
pub use sqlite::{PrefsDb, PrefsDbError};
