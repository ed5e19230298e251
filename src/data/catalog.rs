use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Static, read-only source of truth for which components belong to which
/// expansion. Loaded once at startup and validated as a whole before any
/// store is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentCatalog {
    pub schema_version: u32,
    pub expansions: Vec<ExpansionDef>,
    #[serde(default)]
    pub factions: Vec<FactionDef>,
    #[serde(default)]
    pub items: Vec<ItemDef>,
    #[serde(default)]
    pub maps: Vec<MapDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionDef {
    pub code: String,
    #[serde(default)]
    pub base: bool,
    /// Catalog default for the toggle; merged with any restored preference.
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactionDef {
    pub code: String,
    pub expansion_code: String,
    pub name: String,
    pub complexity: u8,
    pub wealth: u8,
    pub aggression: u8,
    pub crafting: u8,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    pub code: String,
    pub expansion_code: String,
    pub name: String,
    #[serde(default = "default_count")]
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapDef {
    pub code: String,
    pub expansion_code: String,
    pub name: String,
    pub clearings: u32,
}

fn default_count() -> u32 {
    1
}

#[derive(Debug)]
pub enum DataError {
    Io { path: String, source: std::io::Error },
    Json { path: String, source: serde_json::Error },
    Validation(String),
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::Io { path, source } => {
                write!(f, "failed to read {}: {}", path, source)
            }
            DataError::Json { path, source } => {
                write!(f, "failed to parse {}: {}", path, source)
            }
            DataError::Validation(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for DataError {}

pub fn load_content_catalog(path: impl AsRef<Path>) -> Result<ContentCatalog, DataError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| DataError::Io {
        path: path.display().to_string(),
        source,
    })?;
    let catalog: ContentCatalog =
        serde_json::from_str(&raw).map_err(|source| DataError::Json {
            path: path.display().to_string(),
            source,
        })?;
    catalog.validate()?;
    Ok(catalog)
}

impl ContentCatalog {
    pub fn expansion(&self, code: &str) -> Option<&ExpansionDef> {
        self.expansions.iter().find(|def| def.code == code)
    }

    /// Whether `code` names the base game in this catalog.
    pub fn is_base(&self, code: &str) -> bool {
        self.expansion(code).map(|def| def.base).unwrap_or(false)
    }

    pub fn validate(&self) -> Result<(), DataError> {
        ensure_unique_ids("expansion", self.expansions.iter().map(|def| def.code.as_str()))?;
        ensure_unique_ids("faction", self.factions.iter().map(|def| def.code.as_str()))?;
        ensure_unique_ids("item", self.items.iter().map(|def| def.code.as_str()))?;
        ensure_unique_ids("map", self.maps.iter().map(|def| def.code.as_str()))?;

        for def in &self.expansions {
            if def.code.trim().is_empty() {
                return Err(DataError::Validation(
                    "expansion code cannot be empty".to_string(),
                ));
            }
        }

        let base_count = self.expansions.iter().filter(|def| def.base).count();
        if base_count != 1 {
            return Err(DataError::Validation(format!(
                "catalog must define exactly one base expansion, found {}",
                base_count
            )));
        }

        let expansion_codes: HashSet<&str> = self
            .expansions
            .iter()
            .map(|def| def.code.as_str())
            .collect();
        validate_links(
            "faction",
            &expansion_codes,
            self.factions
                .iter()
                .map(|def| (def.code.as_str(), def.expansion_code.as_str())),
        )?;
        validate_links(
            "item",
            &expansion_codes,
            self.items
                .iter()
                .map(|def| (def.code.as_str(), def.expansion_code.as_str())),
        )?;
        validate_links(
            "map",
            &expansion_codes,
            self.maps
                .iter()
                .map(|def| (def.code.as_str(), def.expansion_code.as_str())),
        )?;
        Ok(())
    }
}

fn validate_links<'a>(
    label: &str,
    expansion_codes: &HashSet<&'a str>,
    links: impl Iterator<Item = (&'a str, &'a str)>,
) -> Result<(), DataError> {
    for (code, expansion_code) in links {
        if code.trim().is_empty() {
            return Err(DataError::Validation(format!(
                "{} code cannot be empty",
                label
            )));
        }
        if !expansion_codes.contains(expansion_code) {
            return Err(DataError::Validation(format!(
                "{} {} references unknown expansion {}",
                label, code, expansion_code
            )));
        }
    }
    Ok(())
}

fn ensure_unique_ids<'a>(
    label: &str,
    ids: impl Iterator<Item = &'a str>,
) -> Result<(), DataError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(DataError::Validation(format!(
                "duplicate {} code {}",
                label, id
            )));
        }
    }
    Ok(())
}
