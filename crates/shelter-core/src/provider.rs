//! Pet content provider
//!
//! [`PetCatalog`] is the whole surface the presentation layer sees: query,
//! insert, update and delete against content URIs, plus the MIME type of a
//! URI and a change feed. [`PetProvider`] implements it over any
//! [`PetStore`].
//!
//! Every call runs in the same order:
//!
//! 1. the [`Router`] classifies the URI (unknown URIs fail here, before any
//!    storage access)
//! 2. writes are validated (see [`crate::validate`])
//! 3. the store executes a single statement
//! 4. a [`Change`] is broadcast when rows were written

use std::sync::mpsc::Receiver;

use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Operation, Result, ShelterError};
use crate::models::{Column, ContentValues};
use crate::notify::{Change, ChangeNotifier};
use crate::query::{Cursor, Filter, SortOrder};
use crate::resource::{Resource, Router};
use crate::storage::{PetStore, SqliteStore};
use crate::validate::{validate_for_insert, validate_for_update};

/// CRUD access to pets through content URIs
pub trait PetCatalog {
    /// Router used to build and classify URIs
    fn router(&self) -> &Router;

    /// Rows addressed by `uri` that match `filter`
    ///
    /// `columns` of `None` selects every column. For an item URI the id
    /// replaces the caller's filter.
    fn query(
        &self,
        uri: &str,
        columns: Option<&[Column]>,
        filter: &Filter,
        sort: Option<&SortOrder>,
    ) -> Result<Cursor>;

    /// Insert a pet into the collection; returns the new id
    fn insert(&self, uri: &str, values: &ContentValues) -> Result<i64>;

    /// Update the pets addressed by `uri` that also match `filter`
    ///
    /// An empty `values` is a no-op returning 0.
    fn update(&self, uri: &str, values: &ContentValues, filter: &Filter) -> Result<usize>;

    /// Delete the pets addressed by `uri`
    ///
    /// For the collection, `filter` narrows the delete; an empty filter
    /// deletes every pet.
    fn delete(&self, uri: &str, filter: &Filter) -> Result<usize>;

    /// MIME type of the data behind `uri`
    fn get_type(&self, uri: &str) -> Result<String>;

    /// Receive a [`Change`] after each successful write
    fn subscribe(&self) -> Receiver<Change>;
}

/// [`PetCatalog`] over a [`PetStore`]
pub struct PetProvider<S> {
    router: Router,
    store: S,
    notifier: ChangeNotifier,
}

impl PetProvider<SqliteStore> {
    /// Provider over the configured database; the connection opens on first use
    pub fn open(config: &Config) -> Self {
        Self::new(SqliteStore::new(config), Router::new(config.authority.clone()))
    }
}

impl<S: PetStore> PetProvider<S> {
    pub fn new(store: S, router: Router) -> Self {
        Self {
            router,
            store,
            notifier: ChangeNotifier::new(),
        }
    }

    /// Get the underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    fn notify(&self, resource: Resource) {
        self.notifier.notify(Change {
            uri: self.router.uri(resource),
            resource,
        });
    }
}

impl<S: PetStore> PetCatalog for PetProvider<S> {
    fn router(&self) -> &Router {
        &self.router
    }

    fn query(
        &self,
        uri: &str,
        columns: Option<&[Column]>,
        filter: &Filter,
        sort: Option<&SortOrder>,
    ) -> Result<Cursor> {
        let resource = self.router.classify(uri, Operation::Query)?;
        if matches!(resource, Resource::Item(_)) && !filter.is_empty() {
            warn!("Ignoring filter on item query {}", uri);
        }
        let filter = resource.narrow(filter);
        let columns = match columns {
            Some(cols) if !cols.is_empty() => cols,
            _ => &Column::ALL[..],
        };

        let rows = self.store.select(columns, &filter, sort)?;
        debug!("query {} returned {} row(s)", uri, rows.len());
        Ok(Cursor::new(rows))
    }

    fn insert(&self, uri: &str, values: &ContentValues) -> Result<i64> {
        match self.router.classify(uri, Operation::Insert)? {
            Resource::Collection => {}
            Resource::Item(_) => return Err(ShelterError::unrecognized(uri, Operation::Insert)),
        }

        let pet = validate_for_insert(values)?;
        let id = self.store.insert(&pet)?;
        debug!("inserted pet {} ({})", id, pet.name);

        self.notify(Resource::Collection);
        Ok(id)
    }

    fn update(&self, uri: &str, values: &ContentValues, filter: &Filter) -> Result<usize> {
        let resource = self.router.classify(uri, Operation::Update)?;

        let changes = match validate_for_update(values) {
            Ok(changes) => changes,
            Err(ShelterError::NoOpUpdate) => {
                debug!("update {} has no fields, nothing to do", uri);
                return Ok(0);
            }
            Err(e) => return Err(e),
        };

        let updated = self.store.update(&changes, &resource.scope(filter))?;
        debug!("update {} affected {} row(s)", uri, updated);

        if updated > 0 {
            self.notify(resource);
        }
        Ok(updated)
    }

    fn delete(&self, uri: &str, filter: &Filter) -> Result<usize> {
        let resource = self.router.classify(uri, Operation::Delete)?;
        if matches!(resource, Resource::Item(_)) && !filter.is_empty() {
            warn!("Ignoring filter on item delete {}", uri);
        }

        let deleted = self.store.delete(&resource.narrow(filter))?;
        debug!("delete {} removed {} row(s)", uri, deleted);

        if deleted > 0 {
            self.notify(resource);
        }
        Ok(deleted)
    }

    fn get_type(&self, uri: &str) -> Result<String> {
        let resource = self.router.classify(uri, Operation::GetType)?;
        Ok(self.router.mime_type(resource))
    }

    fn subscribe(&self) -> Receiver<Change> {
        self.notifier.subscribe()
    }
}
