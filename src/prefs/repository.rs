use std::collections::HashMap;

/// Durable storage for the user's expansion toggle choices. `persist` is
/// invoked once per successful enable/disable transition; `restore` feeds
/// the startup merge with the catalog defaults.
pub trait PreferenceRepository {
    fn persist(&mut self, code: &str, enabled: bool) -> Result<(), Box<dyn std::error::Error>>;
    fn restore(&self) -> Result<HashMap<String, bool>, Box<dyn std::error::Error>>;
}

/// In-memory preferences for sessions without a durable store. Choices
/// live for the process lifetime only.
#[derive(Debug, Default)]
pub struct MemoryPreferences {
    entries: HashMap<String, bool>,
}

impl MemoryPreferences {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceRepository for MemoryPreferences {
    fn persist(&mut self, code: &str, enabled: bool) -> Result<(), Box<dyn std::error::Error>> {
        self.entries.insert(code.to_string(), enabled);
        Ok(())
    }

    fn restore(&self) -> Result<HashMap<String, bool>, Box<dyn std::error::Error>> {
        Ok(self.entries.clone())
    }
}
