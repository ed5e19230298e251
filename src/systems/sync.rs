use std::collections::HashMap;

use bevy_ecs::prelude::*;

use crate::data::catalog::{ContentCatalog, FactionDef, ItemDef, MapDef};
use crate::systems::expansion::{ExpansionEvent, ExpansionEventLog, ExpansionStore};

/// Read-only content catalog shared by every sync handler.
#[derive(Resource, Debug, Clone)]
pub struct Catalog(pub ContentCatalog);

/// Capability every component kind implements to take part in expansion
/// synchronization. A kind's store reacts only to the event payload and
/// the static catalog, never to another store's contents, so kinds can be
/// added freely without touching the protocol.
pub trait ExpansionComponent: Clone + Send + Sync + 'static {
    fn code(&self) -> &str;
    fn expansion_code(&self) -> &str;

    /// All catalog definitions of this kind.
    fn catalog_defs(catalog: &ContentCatalog) -> &[Self];
}

impl ExpansionComponent for FactionDef {
    fn code(&self) -> &str {
        &self.code
    }

    fn expansion_code(&self) -> &str {
        &self.expansion_code
    }

    fn catalog_defs(catalog: &ContentCatalog) -> &[Self] {
        &catalog.factions
    }
}

impl ExpansionComponent for ItemDef {
    fn code(&self) -> &str {
        &self.code
    }

    fn expansion_code(&self) -> &str {
        &self.expansion_code
    }

    fn catalog_defs(catalog: &ContentCatalog) -> &[Self] {
        &catalog.items
    }
}

impl ExpansionComponent for MapDef {
    fn code(&self) -> &str {
        &self.code
    }

    fn expansion_code(&self) -> &str {
        &self.expansion_code
    }

    fn catalog_defs(catalog: &ContentCatalog) -> &[Self] {
        &catalog.maps
    }
}

/// Active components of one kind, keyed by component code. Holds an entry
/// only while the owning expansion is enabled. Entries are inserted and
/// removed here and nowhere else.
#[derive(Resource, Debug)]
pub struct ComponentStore<T: ExpansionComponent> {
    entries: HashMap<String, T>,
}

impl<T: ExpansionComponent> Default for ComponentStore<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T: ExpansionComponent> ComponentStore<T> {
    /// Startup population: one entry per catalog def whose expansion is
    /// currently enabled.
    pub fn seeded(catalog: &ContentCatalog, expansions: &ExpansionStore) -> Self {
        let mut store = Self::default();
        for def in T::catalog_defs(catalog) {
            if expansions.is_enabled(def.expansion_code()) {
                store.entries.insert(def.code().to_string(), def.clone());
            }
        }
        store
    }

    /// React to one expansion event. Enable inserts every catalog def of
    /// the expansion not already present; re-delivery is a safe overwrite.
    /// Disable removes exactly the entries of that expansion, except that
    /// a disable naming the base game is tolerated as a no-op.
    pub fn apply(&mut self, event: &ExpansionEvent, catalog: &ContentCatalog) {
        match event {
            ExpansionEvent::Enabled { code } => {
                for def in T::catalog_defs(catalog) {
                    if def.expansion_code() == code {
                        self.entries.insert(def.code().to_string(), def.clone());
                    }
                }
            }
            ExpansionEvent::Disabled { code } => {
                if catalog.is_base(code) {
                    return;
                }
                self.entries.retain(|_, entry| entry.expansion_code() != code);
            }
        }
    }

    pub fn get(&self, code: &str) -> Option<&T> {
        self.entries.get(code)
    }

    pub fn contains(&self, code: &str) -> bool {
        self.entries.contains_key(code)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Active entries sorted by code, for the display surface.
    pub fn sorted(&self) -> Vec<T> {
        let mut out: Vec<T> = self.entries.values().cloned().collect();
        out.sort_by(|a, b| a.code().cmp(b.code()));
        out
    }
}

/// Replay the tick's expansion events into this kind's store. One
/// instantiation per registered kind; instantiations are independent and
/// order-free among themselves.
pub fn expansion_sync_system<T: ExpansionComponent>(
    events: Res<ExpansionEventLog>,
    catalog: Res<Catalog>,
    mut store: ResMut<ComponentStore<T>>,
) {
    for event in events.0.iter() {
        store.apply(event, &catalog.0);
    }
}
