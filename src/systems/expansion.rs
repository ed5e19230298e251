use std::collections::HashMap;

use bevy_ecs::prelude::*;

use crate::data::catalog::ContentCatalog;

/// Emitted once per accepted toggle; every component store reacts to the
/// same event independently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpansionEvent {
    Enabled { code: String },
    Disabled { code: String },
}

impl ExpansionEvent {
    pub fn code(&self) -> &str {
        match self {
            ExpansionEvent::Enabled { code } | ExpansionEvent::Disabled { code } => code,
        }
    }
}

/// Events accepted during the current tick. Cleared and rewritten by the
/// toggle intake system before any sync system runs.
#[derive(Resource, Debug, Default)]
pub struct ExpansionEventLog(pub Vec<ExpansionEvent>);

/// Preference write owed to the durable store for a successful transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefWrite {
    pub code: String,
    pub enabled: bool,
}

/// Writes queued inside the tick and drained by the session immediately
/// after the schedule runs.
#[derive(Resource, Debug, Default)]
pub struct PendingPrefWrites(pub Vec<PrefWrite>);

#[derive(Debug, Clone)]
pub struct ExpansionState {
    pub base: bool,
    pub enabled: bool,
    pub image: Option<String>,
}

/// Expansion list entry with the map key attached as `code`, for the
/// read-only display surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionSummary {
    pub code: String,
    pub base: bool,
    pub enabled: bool,
    pub image: Option<String>,
}

/// Authoritative owner of the per-expansion enabled flag. The base game is
/// always enabled and never written.
#[derive(Resource, Debug, Default)]
pub struct ExpansionStore {
    entries: HashMap<String, ExpansionState>,
}

impl ExpansionStore {
    /// Build the store from the catalog, merging restored preferences.
    /// A non-base expansion starts enabled when its catalog default or a
    /// restored preference says so; the base expansion is always enabled.
    pub fn from_catalog(catalog: &ContentCatalog, restored: &HashMap<String, bool>) -> Self {
        let mut entries = HashMap::new();
        for def in &catalog.expansions {
            let restored_enabled = restored.get(&def.code).copied().unwrap_or(false);
            entries.insert(
                def.code.clone(),
                ExpansionState {
                    base: def.base,
                    enabled: def.base || def.enabled || restored_enabled,
                    image: def.image.clone(),
                },
            );
        }
        Self { entries }
    }

    pub fn get(&self, code: &str) -> Option<&ExpansionState> {
        self.entries.get(code)
    }

    pub fn is_enabled(&self, code: &str) -> bool {
        self.get(code).map(|state| state.enabled).unwrap_or(false)
    }

    /// Set the flag for an existing non-base expansion. Returns true when
    /// the write was applied and a preference write is owed; unknown and
    /// base codes are silent no-ops.
    pub fn enable(&mut self, code: &str) -> bool {
        self.set_enabled(code, true)
    }

    pub fn disable(&mut self, code: &str) -> bool {
        self.set_enabled(code, false)
    }

    fn set_enabled(&mut self, code: &str, enabled: bool) -> bool {
        match self.entries.get_mut(code) {
            Some(state) if !state.base => {
                state.enabled = enabled;
                true
            }
            _ => false,
        }
    }

    /// Current expansion list with codes attached, sorted by code.
    pub fn summaries(&self) -> Vec<ExpansionSummary> {
        let mut out: Vec<ExpansionSummary> = self
            .entries
            .iter()
            .map(|(code, state)| ExpansionSummary {
                code: code.clone(),
                base: state.base,
                enabled: state.enabled,
                image: state.image.clone(),
            })
            .collect();
        out.sort_by(|a, b| a.code.cmp(&b.code));
        out
    }
}
