//! SQLite-backed pet store
//!
//! Owns the single database connection of the process. The connection is
//! opened and provisioned on first use (or by an explicit [`SqliteStore::open`])
//! and released by [`SqliteStore::close`]; any later operation opens it again.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{params, params_from_iter, Connection, ToSql};
use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Result, ShelterError};
use crate::models::{Column, Gender, NewPet, PetChanges, PetRow, Value};
use crate::query::{Filter, SortOrder};
use crate::storage::schema::{self, TABLE_PETS};
use crate::storage::PetStore;

impl ToSql for Value {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Value::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            Value::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            Value::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

/// SQLite store for pet records
pub struct SqliteStore {
    /// Database file; `None` keeps the database in memory
    path: Option<PathBuf>,
    conn: Mutex<Option<Connection>>,
}

impl SqliteStore {
    /// Store at the configured database path, opened lazily
    pub fn new(config: &Config) -> Self {
        Self::at_path(config.database_path())
    }

    /// Store at an explicit database file, opened lazily
    pub fn at_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
            conn: Mutex::new(None),
        }
    }

    /// Open an in-memory database (for testing)
    ///
    /// Closing an in-memory store discards its contents.
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            path: None,
            conn: Mutex::new(None),
        };
        store.open()?;
        Ok(store)
    }

    /// Database file, if any
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Open and provision the database now instead of on first use
    pub fn open(&self) -> Result<()> {
        let mut guard = self.lock();
        if guard.is_none() {
            *guard = Some(self.connect()?);
        }
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.lock().is_some()
    }

    /// Release the connection
    pub fn close(&self) -> Result<()> {
        let mut guard = self.lock();
        if let Some(conn) = guard.take() {
            if let Err((conn, e)) = conn.close() {
                *guard = Some(conn);
                return Err(e.into());
            }
            debug!("Closed database {}", self.describe());
        }
        Ok(())
    }

    /// Schema version recorded in the database
    pub fn schema_version(&self) -> Result<i32> {
        self.with_conn(|conn| Ok(schema::schema_version(conn)?))
    }

    fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let mut guard = self.lock();
        let conn = match guard.take() {
            Some(conn) => conn,
            None => self.connect()?,
        };
        f(guard.insert(conn))
    }

    fn connect(&self) -> Result<Connection> {
        let conn = match &self.path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent).map_err(|source| {
                        ShelterError::CreateDirectory {
                            path: parent.to_path_buf(),
                            source,
                        }
                    })?;
                }
                Connection::open(path).map_err(|source| self.unavailable(source))?
            }
            None => Connection::open_in_memory().map_err(|source| self.unavailable(source))?,
        };

        schema::provision(&conn).map_err(|e| match e {
            ShelterError::Database(source) => self.unavailable(source),
            other => other,
        })?;

        info!("Opened database {}", self.describe());
        Ok(conn)
    }

    fn unavailable(&self, source: rusqlite::Error) -> ShelterError {
        ShelterError::StorageUnavailable {
            path: self
                .path
                .clone()
                .unwrap_or_else(|| PathBuf::from(":memory:")),
            source,
        }
    }

    fn describe(&self) -> String {
        match &self.path {
            Some(path) => path.display().to_string(),
            None => ":memory:".to_string(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<Connection>> {
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PetStore for SqliteStore {
    fn select(
        &self,
        columns: &[Column],
        filter: &Filter,
        sort: Option<&SortOrder>,
    ) -> Result<Vec<PetRow>> {
        let names: Vec<&str> = columns.iter().map(|c| c.name()).collect();
        let mut sql = format!("SELECT {} FROM {}", names.join(", "), TABLE_PETS);
        let args = append_where(&mut sql, filter);
        if let Some(order) = sort.and_then(SortOrder::to_sql) {
            sql.push_str(" ORDER BY ");
            sql.push_str(&order);
        }
        debug!("select: {}", sql);

        self.with_conn(|conn| {
            let mut stmt = conn.prepare(&sql)?;
            let raw_rows = stmt.query_map(params_from_iter(args.iter()), |row| {
                let mut raw = RawRow::default();
                for (idx, column) in columns.iter().enumerate() {
                    match column {
                        Column::Id => raw.id = row.get(idx)?,
                        Column::Name => raw.name = row.get(idx)?,
                        Column::Breed => raw.breed = row.get(idx)?,
                        Column::Gender => raw.gender = row.get(idx)?,
                        Column::Weight => raw.weight = row.get(idx)?,
                    }
                }
                Ok(raw)
            })?;

            let mut rows = Vec::new();
            for raw in raw_rows {
                rows.push(raw?.into_row()?);
            }
            Ok(rows)
        })
    }

    fn insert(&self, pet: &NewPet) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                &format!(
                    "INSERT INTO {} (name, breed, gender, weight) VALUES (?1, ?2, ?3, ?4)",
                    TABLE_PETS
                ),
                params![pet.name, pet.breed, pet.gender.code(), pet.weight],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    fn update(&self, changes: &PetChanges, filter: &Filter) -> Result<usize> {
        let mut assignments = Vec::new();
        let mut args: Vec<Value> = Vec::new();
        if let Some(name) = &changes.name {
            assignments.push("name = ?");
            args.push(name.clone().into());
        }
        if let Some(breed) = &changes.breed {
            assignments.push("breed = ?");
            args.push(breed.clone().into());
        }
        if let Some(gender) = changes.gender {
            assignments.push("gender = ?");
            args.push(gender.into());
        }
        if let Some(weight) = changes.weight {
            assignments.push("weight = ?");
            args.push(weight.into());
        }
        if assignments.is_empty() {
            return Ok(0);
        }

        let mut sql = format!("UPDATE {} SET {}", TABLE_PETS, assignments.join(", "));
        args.extend(append_where(&mut sql, filter));
        debug!("update: {}", sql);

        self.with_conn(|conn| Ok(conn.execute(&sql, params_from_iter(args.iter()))?))
    }

    fn delete(&self, filter: &Filter) -> Result<usize> {
        let mut sql = format!("DELETE FROM {}", TABLE_PETS);
        let args = append_where(&mut sql, filter);
        debug!("delete: {}", sql);

        self.with_conn(|conn| Ok(conn.execute(&sql, params_from_iter(args.iter()))?))
    }

    fn count(&self) -> Result<i64> {
        self.with_conn(|conn| {
            let sql = format!("SELECT COUNT(*) FROM {}", TABLE_PETS);
            Ok(conn.query_row(&sql, [], |row| row.get(0))?)
        })
    }
}

/// Append a `WHERE` clause for `filter`, returning its arguments
fn append_where(sql: &mut String, filter: &Filter) -> Vec<Value> {
    match filter.to_sql() {
        Some((clause, args)) => {
            sql.push_str(" WHERE ");
            sql.push_str(&clause);
            args
        }
        None => Vec::new(),
    }
}

/// Row as read from SQLite, before gender is decoded
#[derive(Default)]
struct RawRow {
    id: Option<i64>,
    name: Option<String>,
    breed: Option<String>,
    gender: Option<i64>,
    weight: Option<i64>,
}

impl RawRow {
    fn into_row(self) -> Result<PetRow> {
        let gender = match self.gender {
            Some(code) => Some(Gender::from_code(code).ok_or_else(|| ShelterError::CorruptRow {
                id: self.id.unwrap_or(-1),
                details: format!("gender {} is not 0, 1 or 2", code),
            })?),
            None => None,
        };
        Ok(PetRow {
            id: self.id,
            name: self.name,
            breed: self.breed,
            gender,
            weight: self.weight,
        })
    }
}
