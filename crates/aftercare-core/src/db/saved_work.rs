//! Saved-work database operations.

use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::{Database, DbResult};
use crate::models::{NeedItem, PatientDetails};

/// Key the working copy of a case is saved under.
pub const STORAGE_KEY: &str = "s117_toolkit_data";

/// Document stored for a saved case. Either part may be absent in blobs
/// written by other front-ends; loaders apply only what is present.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SavedWork {
    #[serde(default)]
    pub patient_details: Option<PatientDetails>,
    #[serde(default)]
    pub needs: Option<Vec<NeedItem>>,
    #[serde(default)]
    pub saved_at: String,
}

impl SavedWork {
    /// Snapshot the given state, stamped with the current UTC time.
    pub fn snapshot(details: &PatientDetails, needs: &[NeedItem]) -> Self {
        Self {
            patient_details: Some(details.clone()),
            needs: Some(needs.to_vec()),
            saved_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl Database {
    /// Write `work` under `key`, replacing any previous value.
    pub fn save_work(&self, key: &str, work: &SavedWork) -> DbResult<()> {
        let value = serde_json::to_string(work)?;
        self.conn.execute(
            r#"
            INSERT INTO saved_work (key, value, saved_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                saved_at = excluded.saved_at
            "#,
            params![key, value, work.saved_at],
        )?;
        info!(key, "work saved");
        Ok(())
    }

    /// Read the document under `key`. `Ok(None)` when nothing is saved;
    /// an unparseable document is an error.
    pub fn load_work(&self, key: &str) -> DbResult<Option<SavedWork>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM saved_work WHERE key = ?",
                [key],
                |row| row.get(0),
            )
            .optional()?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        match serde_json::from_str(&raw) {
            Ok(work) => Ok(Some(work)),
            Err(err) => {
                warn!(key, %err, "saved work is corrupted");
                Err(err.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbError;

    #[test]
    fn test_save_and_load() {
        let db = Database::open_in_memory().unwrap();
        let mut details = PatientDetails::default();
        details.name = "Jane Doe".into();

        let work = SavedWork::snapshot(&details, &[]);
        db.save_work(STORAGE_KEY, &work).unwrap();

        let loaded = db.load_work(STORAGE_KEY).unwrap().unwrap();
        assert_eq!(loaded, work);
    }

    #[test]
    fn test_save_overwrites() {
        let db = Database::open_in_memory().unwrap();
        let mut details = PatientDetails::default();
        details.name = "First".into();
        db.save_work(STORAGE_KEY, &SavedWork::snapshot(&details, &[]))
            .unwrap();
        details.name = "Second".into();
        db.save_work(STORAGE_KEY, &SavedWork::snapshot(&details, &[]))
            .unwrap();

        let loaded = db.load_work(STORAGE_KEY).unwrap().unwrap();
        assert_eq!(loaded.patient_details.unwrap().name, "Second");
    }

    #[test]
    fn test_missing_key() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.load_work(STORAGE_KEY).unwrap().is_none());
    }

    #[test]
    fn test_corrupted_value() {
        let db = Database::open_in_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO saved_work (key, value) VALUES (?, ?)",
                [STORAGE_KEY, "{not json"],
            )
            .unwrap();

        assert!(matches!(db.load_work(STORAGE_KEY), Err(DbError::Json(_))));
    }

    #[test]
    fn test_partial_document() {
        let db = Database::open_in_memory().unwrap();
        db.conn()
            .execute(
                "INSERT INTO saved_work (key, value) VALUES (?, ?)",
                [STORAGE_KEY, r#"{"needs": []}"#],
            )
            .unwrap();

        let loaded = db.load_work(STORAGE_KEY).unwrap().unwrap();
        assert!(loaded.patient_details.is_none());
        assert_eq!(loaded.needs, Some(vec![]));
    }
}
