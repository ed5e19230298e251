use std::collections::HashMap;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};

use crate::prefs::repository::PreferenceRepository;

const PREFS_SCHEMA_VERSION: i64 = 1;

const PREFS_DB_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS prefs_meta (
  id INTEGER PRIMARY KEY CHECK (id = 1),
  schema_version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS expansion_prefs (
  expansion_code TEXT PRIMARY KEY,
  enabled INTEGER NOT NULL
);
"#;

#[derive(Debug)]
pub enum PrefsDbError {
    Sqlite(rusqlite::Error),
    InvalidData(String),
}

impl std::fmt::Display for PrefsDbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PrefsDbError::Sqlite(err) => write!(f, "sqlite error: {}", err),
            PrefsDbError::InvalidData(message) => write!(f, "{}", message),
        }
    }
}

impl std::error::Error for PrefsDbError {}

impl From<rusqlite::Error> for PrefsDbError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Sqlite(err)
    }
}

/// SQLite-backed expansion preference store, one row per toggled code.
pub struct PrefsDb {
    conn: Connection,
}

impl PrefsDb {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PrefsDbError> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self, PrefsDbError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, PrefsDbError> {
        let mut db = Self { conn };
        db.conn.execute_batch(PREFS_DB_SCHEMA)?;
        db.ensure_meta()?;
        Ok(db)
    }

    fn ensure_meta(&mut self) -> Result<(), PrefsDbError> {
        let schema_version = self
            .conn
            .query_row(
                "SELECT schema_version FROM prefs_meta WHERE id = 1",
                [],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;

        match schema_version {
            Some(version) if version == PREFS_SCHEMA_VERSION => Ok(()),
            Some(version) => Err(PrefsDbError::InvalidData(format!(
                "prefs_meta version mismatch (schema {}, expected {})",
                version, PREFS_SCHEMA_VERSION
            ))),
            None => {
                self.conn.execute(
                    "INSERT INTO prefs_meta (id, schema_version) VALUES (1, ?1)",
                    params![PREFS_SCHEMA_VERSION],
                )?;
                Ok(())
            }
        }
    }

    pub fn persist(&mut self, code: &str, enabled: bool) -> Result<(), PrefsDbError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO expansion_prefs (expansion_code, enabled) VALUES (?1, ?2)",
            params![code, if enabled { 1 } else { 0 }],
        )?;
        Ok(())
    }

    pub fn restore(&self) -> Result<HashMap<String, bool>, PrefsDbError> {
        let mut stmt = self
            .conn
            .prepare("SELECT expansion_code, enabled FROM expansion_prefs")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? != 0))
        })?;

        let mut out = HashMap::new();
        for row in rows {
            let (code, enabled) = row?;
            out.insert(code, enabled);
        }
        Ok(out)
    }
}

impl PreferenceRepository for PrefsDb {
    fn persist(&mut self, code: &str, enabled: bool) -> Result<(), Box<dyn std::error::Error>> {
        Ok(PrefsDb::persist(self, code, enabled)?)
    }

    fn restore(&self) -> Result<HashMap<String, bool>, Box<dyn std::error::Error>> {
        Ok(PrefsDb::restore(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persist_then_restore_round_trips() {
        let mut db = PrefsDb::open_in_memory().unwrap();
        db.persist("tides", true).unwrap();
        db.persist("embers", false).unwrap();

        let restored = db.restore().unwrap();
        assert_eq!(restored.get("tides"), Some(&true));
        assert_eq!(restored.get("embers"), Some(&false));
        assert_eq!(restored.len(), 2);
    }

    #[test]
    fn persist_overwrites_prior_choice() {
        let mut db = PrefsDb::open_in_memory().unwrap();
        db.persist("tides", true).unwrap();
        db.persist("tides", false).unwrap();

        let restored = db.restore().unwrap();
        assert_eq!(restored.get("tides"), Some(&false));
    }

    #[test]
    fn fresh_db_restores_empty() {
        let db = PrefsDb::open_in_memory().unwrap();
        assert!(db.restore().unwrap().is_empty());
    }
}
