//! SQLite schema for the shelter database
//!
//! One table, `pets`. The schema version lives in SQLite's `user_version`
//! pragma. Upgrades walk an ordered list of [`Migration`] steps; today the
//! list only holds the initial version, whose step does nothing because
//! [`ensure_schema`] already creates that layout.

use rusqlite::Connection;
use tracing::info;

use crate::error::{Result, ShelterError};

/// Current schema version for migrations
pub const SCHEMA_VERSION: i32 = 1;

/// Name of the pets table
pub const TABLE_PETS: &str = "pets";

/// One step in the upgrade path
pub struct Migration {
    /// Version the database is at after this step
    pub version: i32,
    pub description: &'static str,
    pub apply: fn(&Connection) -> rusqlite::Result<()>,
}

/// Upgrade steps in ascending version order
pub const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    description: "initial pets table",
    apply: identity,
}];

fn identity(_conn: &Connection) -> rusqlite::Result<()> {
    Ok(())
}

/// Create the pets table if it does not exist
pub fn ensure_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS pets (
            _id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            breed TEXT,
            gender INTEGER NOT NULL,
            weight INTEGER NOT NULL DEFAULT 0
        );
        "#,
    )
}

/// Get the schema version recorded in the database (0 when fresh)
pub fn schema_version(conn: &Connection) -> rusqlite::Result<i32> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
}

fn set_schema_version(conn: &Connection, version: i32) -> rusqlite::Result<()> {
    // pragmas cannot take bound parameters
    conn.execute_batch(&format!("PRAGMA user_version = {};", version))
}

/// Run every migration step in `(from, to]`, in order
pub fn upgrade_schema(conn: &Connection, from: i32, to: i32) -> Result<()> {
    if from > to || to > SCHEMA_VERSION {
        return Err(ShelterError::UnsupportedMigration { from, to });
    }

    for step in MIGRATIONS
        .iter()
        .filter(|m| m.version > from && m.version <= to)
    {
        info!(
            "Applying schema migration to version {}: {}",
            step.version, step.description
        );
        (step.apply)(conn)?;
    }

    set_schema_version(conn, to)?;
    Ok(())
}

/// Bring a freshly opened database to [`SCHEMA_VERSION`]
pub fn provision(conn: &Connection) -> Result<()> {
    let found = schema_version(conn)?;
    if found > SCHEMA_VERSION {
        return Err(ShelterError::UnsupportedMigration {
            from: found,
            to: SCHEMA_VERSION,
        });
    }

    ensure_schema(conn)?;
    if found == 0 {
        info!("Created {} table at schema version {}", TABLE_PETS, SCHEMA_VERSION);
        set_schema_version(conn, SCHEMA_VERSION)?;
    } else if found < SCHEMA_VERSION {
        upgrade_schema(conn, found, SCHEMA_VERSION)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(conn: &Connection) -> Vec<(String, String, bool)> {
        conn.prepare("PRAGMA table_info(pets)")
            .unwrap()
            .query_map([], |row| Ok((row.get(1)?, row.get(2)?, row.get(3)?)))
            .unwrap()
            .filter_map(|r| r.ok())
            .collect()
    }

    #[test]
    fn test_ensure_schema() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();

        let cols = columns(&conn);
        let names: Vec<&str> = cols.iter().map(|(n, _, _)| n.as_str()).collect();
        assert_eq!(names, vec!["_id", "name", "breed", "gender", "weight"]);

        let not_null: Vec<&str> = cols
            .iter()
            .filter(|(_, _, nn)| *nn)
            .map(|(n, _, _)| n.as_str())
            .collect();
        assert_eq!(not_null, vec!["name", "gender", "weight"]);
    }

    #[test]
    fn test_ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO pets (name, gender) VALUES ('Toto', 1)",
            [],
        )
        .unwrap();

        ensure_schema(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM pets", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_weight_defaults_to_zero() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute("INSERT INTO pets (name, gender) VALUES ('Toto', 1)", [])
            .unwrap();
        let weight: i64 = conn
            .query_row("SELECT weight FROM pets", [], |row| row.get(0))
            .unwrap();
        assert_eq!(weight, 0);
    }

    #[test]
    fn test_schema_version() {
        let conn = Connection::open_in_memory().unwrap();

        // Before provisioning, nothing is recorded
        assert_eq!(schema_version(&conn).unwrap(), 0);

        provision(&conn).unwrap();

        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);

        // provisioning again changes nothing
        provision(&conn).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_upgrade_identity() {
        let conn = Connection::open_in_memory().unwrap();
        provision(&conn).unwrap();
        upgrade_schema(&conn, SCHEMA_VERSION, SCHEMA_VERSION).unwrap();
        assert_eq!(schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_upgrade_rejects_bad_ranges() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(matches!(
            upgrade_schema(&conn, 2, 1),
            Err(ShelterError::UnsupportedMigration { from: 2, to: 1 })
        ));
        assert!(matches!(
            upgrade_schema(&conn, 1, SCHEMA_VERSION + 1),
            Err(ShelterError::UnsupportedMigration { .. })
        ));
    }

    #[test]
    fn test_provision_rejects_newer_database() {
        let conn = Connection::open_in_memory().unwrap();
        set_schema_version(&conn, SCHEMA_VERSION + 1).unwrap();

        let err = provision(&conn).unwrap_err();
        assert!(err.is_storage_unavailable());
    }

    #[test]
    fn test_migrations_are_ordered() {
        let versions: Vec<i32> = MIGRATIONS.iter().map(|m| m.version).collect();
        let mut sorted = versions.clone();
        sorted.sort_unstable();
        sorted.dedup();
        assert_eq!(versions, sorted);
        assert_eq!(versions.last(), Some(&SCHEMA_VERSION));
    }
}
