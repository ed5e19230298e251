use std::collections::HashMap;

use bevy_ecs::prelude::*;
use bevy_utils::tracing::warn;

use crate::core::ecs::{create_schedule, create_world};
use crate::data::catalog::{ContentCatalog, FactionDef, ItemDef, MapDef};
use crate::prefs::repository::PreferenceRepository;
use crate::systems::expansion::{ExpansionStore, ExpansionSummary, PendingPrefWrites};
use crate::systems::sync::{ComponentStore, ExpansionComponent};
use crate::systems::toggle::{IntentQueue, SetupIntent};

/// Data snapshot returned to the UI layer after each tick. Lists are
/// sorted by code.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub expansions: Vec<ExpansionSummary>,
    pub factions: Vec<FactionDef>,
    pub items: Vec<ItemDef>,
    pub maps: Vec<MapDef>,
}

/// Wrapper around the ECS world and schedule, plus the preference store
/// the toggle transitions are persisted to. One `tick` per externally
/// triggered action; every store's reaction completes inside it.
pub struct Session {
    world: World,
    schedule: Schedule,
    prefs: Box<dyn PreferenceRepository>,
}

impl Session {
    /// Create a session from a validated catalog, merging any preferences
    /// restored from a prior run. A failed restore degrades to catalog
    /// defaults.
    pub fn new(catalog: ContentCatalog, prefs: Box<dyn PreferenceRepository>) -> Self {
        let restored = match prefs.restore() {
            Ok(restored) => restored,
            Err(err) => {
                warn!("failed to restore expansion preferences: {}", err);
                HashMap::new()
            }
        };

        let world = create_world(catalog, &restored);
        let schedule = create_schedule();

        Self {
            world,
            schedule,
            prefs,
        }
    }

    /// Run one tick with the provided intents and return a snapshot for
    /// rendering. Each accepted toggle persists its new flag before this
    /// call returns; a failed persist is logged and the in-memory state
    /// stands.
    pub fn tick(&mut self, intents: Vec<SetupIntent>) -> Snapshot {
        {
            let mut queue = self.world.resource_mut::<IntentQueue>();
            queue.0 = intents;
        }

        self.schedule.run(&mut self.world);

        let writes = std::mem::take(&mut self.world.resource_mut::<PendingPrefWrites>().0);
        for write in writes {
            if let Err(err) = self.prefs.persist(&write.code, write.enabled) {
                warn!(
                    "failed to persist expansion preference {}={}: {}",
                    write.code, write.enabled, err
                );
            }
        }

        self.snapshot()
    }

    /// Toggle a single expansion. Unknown and base codes are safe no-ops.
    pub fn toggle(&mut self, code: &str) -> Snapshot {
        self.tick(vec![SetupIntent::ToggleExpansion {
            code: code.to_string(),
        }])
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            expansions: self.expansions(),
            factions: self.factions(),
            items: self.items(),
            maps: self.maps(),
        }
    }

    /// Current expansion list with codes attached, sorted by code.
    pub fn expansions(&self) -> Vec<ExpansionSummary> {
        self.world.resource::<ExpansionStore>().summaries()
    }

    pub fn factions(&self) -> Vec<FactionDef> {
        self.active::<FactionDef>()
    }

    pub fn items(&self) -> Vec<ItemDef> {
        self.active::<ItemDef>()
    }

    pub fn maps(&self) -> Vec<MapDef> {
        self.active::<MapDef>()
    }

    fn active<T: ExpansionComponent>(&self) -> Vec<T> {
        self.world.resource::<ComponentStore<T>>().sorted()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::data::catalog::ExpansionDef;

    /// Preference store that records every persist call for assertions.
    #[derive(Debug, Default, Clone)]
    struct RecordingPrefs {
        writes: Arc<Mutex<Vec<(String, bool)>>>,
        restored: HashMap<String, bool>,
    }

    impl PreferenceRepository for RecordingPrefs {
        fn persist(
            &mut self,
            code: &str,
            enabled: bool,
        ) -> Result<(), Box<dyn std::error::Error>> {
            self.writes
                .lock()
                .unwrap()
                .push((code.to_string(), enabled));
            Ok(())
        }

        fn restore(&self) -> Result<HashMap<String, bool>, Box<dyn std::error::Error>> {
            Ok(self.restored.clone())
        }
    }

    fn catalog() -> ContentCatalog {
        let json = r#"{
            "schema_version": 1,
            "expansions": [
                { "code": "core", "base": true, "enabled": true },
                { "code": "tides", "image": "tides.png" }
            ],
            "factions": [
                { "code": "legion", "expansion_code": "core", "name": "Ironclad Legion",
                  "complexity": 1, "wealth": 0, "aggression": 2, "crafting": 1 },
                { "code": "corsairs", "expansion_code": "tides", "name": "Saltwater Corsairs",
                  "complexity": 2, "wealth": 2, "aggression": 1, "crafting": 0 },
                { "code": "mudfolk", "expansion_code": "tides", "name": "Mudfolk Court",
                  "complexity": 0, "wealth": 1, "aggression": 0, "crafting": 2 }
            ],
            "items": [
                { "code": "sword", "expansion_code": "core", "name": "Sword", "count": 2 },
                { "code": "harpoon", "expansion_code": "tides", "name": "Harpoon" }
            ],
            "maps": [
                { "code": "valley", "expansion_code": "core", "name": "Valley", "clearings": 12 },
                { "code": "estuary", "expansion_code": "tides", "name": "Estuary", "clearings": 10 }
            ]
        }"#;
        let catalog: ContentCatalog = serde_json::from_str(json).unwrap();
        catalog.validate().unwrap();
        catalog
    }

    fn session() -> (Session, RecordingPrefs) {
        let prefs = RecordingPrefs::default();
        let session = Session::new(catalog(), Box::new(prefs.clone()));
        (session, prefs)
    }

    fn faction_codes(snapshot: &Snapshot) -> Vec<&str> {
        snapshot
            .factions
            .iter()
            .map(|def| def.code.as_str())
            .collect()
    }

    #[test]
    fn starts_with_base_content_only() {
        let (session, _) = session();
        let snapshot = session.snapshot();
        assert_eq!(faction_codes(&snapshot), vec!["legion"]);
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.maps.len(), 1);
    }

    #[test]
    fn toggle_round_trip_adds_then_removes_components() {
        let (mut session, prefs) = session();

        let snapshot = session.toggle("tides");
        assert!(snapshot
            .expansions
            .iter()
            .any(|e| e.code == "tides" && e.enabled));
        assert_eq!(faction_codes(&snapshot), vec!["corsairs", "legion", "mudfolk"]);
        assert_eq!(snapshot.items.len(), 2);
        assert_eq!(snapshot.maps.len(), 2);

        let snapshot = session.toggle("tides");
        assert!(snapshot
            .expansions
            .iter()
            .any(|e| e.code == "tides" && !e.enabled));
        assert_eq!(faction_codes(&snapshot), vec!["legion"]);
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.maps.len(), 1);

        let writes = prefs.writes.lock().unwrap();
        assert_eq!(
            *writes,
            vec![("tides".to_string(), true), ("tides".to_string(), false)]
        );
    }

    #[test]
    fn base_stays_enabled_across_any_toggle_sequence() {
        let (mut session, prefs) = session();

        session.toggle("core");
        session.toggle("tides");
        session.toggle("core");
        let snapshot = session.toggle("tides");

        let base = snapshot
            .expansions
            .iter()
            .find(|e| e.code == "core")
            .unwrap();
        assert!(base.base);
        assert!(base.enabled);
        assert!(snapshot.factions.iter().any(|f| f.code == "legion"));

        // Only the two tides toggles persisted anything.
        assert_eq!(prefs.writes.lock().unwrap().len(), 2);
    }

    #[test]
    fn toggling_base_makes_no_persist_call() {
        let (mut session, prefs) = session();
        session.toggle("core");
        assert!(prefs.writes.lock().unwrap().is_empty());
    }

    #[test]
    fn toggling_unknown_code_changes_nothing() {
        let (mut session, prefs) = session();
        let before = session.snapshot();

        let after = session.toggle("nonexistent-code");

        assert_eq!(before.expansions, after.expansions);
        assert_eq!(faction_codes(&before), faction_codes(&after));
        assert_eq!(before.items.len(), after.items.len());
        assert!(prefs.writes.lock().unwrap().is_empty());
    }

    #[test]
    fn restored_preference_enables_expansion_at_startup() {
        let prefs = RecordingPrefs {
            restored: HashMap::from([("tides".to_string(), true)]),
            ..RecordingPrefs::default()
        };
        let session = Session::new(catalog(), Box::new(prefs));

        let snapshot = session.snapshot();
        assert!(snapshot
            .expansions
            .iter()
            .any(|e| e.code == "tides" && e.enabled));
        assert_eq!(faction_codes(&snapshot), vec!["corsairs", "legion", "mudfolk"]);
    }

    #[test]
    fn multiple_intents_process_in_order_within_one_tick() {
        let (mut session, _) = session();

        // Enable then disable in the same tick: the second intent sees the
        // first one's store update.
        let snapshot = session.tick(vec![
            SetupIntent::ToggleExpansion {
                code: "tides".to_string(),
            },
            SetupIntent::ToggleExpansion {
                code: "tides".to_string(),
            },
        ]);

        assert!(snapshot
            .expansions
            .iter()
            .any(|e| e.code == "tides" && !e.enabled));
        assert_eq!(faction_codes(&snapshot), vec!["legion"]);
    }
}
