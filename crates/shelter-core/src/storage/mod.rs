//! Storage layer
//!
//! Table-level access to pet records behind the [`PetStore`] trait.
//!
//! ## Implementations
//!
//! - [`SqliteStore`]: the on-device database (`shelter.db`), opened on first
//!   use and closed explicitly
//! - [`MemoryStore`]: in-memory records with the same filter and sort
//!   semantics, for tests and for callers that need no persistence
//!
//! Stores receive already-validated input and already-scoped filters; routing
//! and validation happen in [`crate::provider`].

pub mod memory;
pub mod schema;
pub mod sqlite;

pub use memory::MemoryStore;
pub use schema::{ensure_schema, upgrade_schema, SCHEMA_VERSION};
pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::models::{Column, NewPet, PetChanges, PetRow};
use crate::query::{Filter, SortOrder};

/// Table-level operations on pet records
///
/// Every write is a single statement. Implementations use interior
/// mutability so a store can be shared behind `&self`.
pub trait PetStore {
    /// Rows matching `filter`, holding only `columns`
    ///
    /// Without a sort order the store's natural (id) order is used.
    fn select(
        &self,
        columns: &[Column],
        filter: &Filter,
        sort: Option<&SortOrder>,
    ) -> Result<Vec<PetRow>>;

    /// Persist a new record and return its id
    fn insert(&self, pet: &NewPet) -> Result<i64>;

    /// Apply `changes` to every matching record; returns the row count
    fn update(&self, changes: &PetChanges, filter: &Filter) -> Result<usize>;

    /// Remove every matching record; returns the row count
    fn delete(&self, filter: &Filter) -> Result<usize>;

    /// Total number of records
    fn count(&self) -> Result<i64>;
}
