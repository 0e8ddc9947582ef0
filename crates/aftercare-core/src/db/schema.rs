//! SQLite schema definition.

/// Complete database schema.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Saved work (key/value, one JSON document per key)
-- ============================================================================

CREATE TABLE IF NOT EXISTS saved_work (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,                         -- JSON {patientDetails, needs, savedAt}
    saved_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
