//! Shelter Core Library
//!
//! This crate provides the data-access layer for Shelter, a local tracker
//! for pets in an animal shelter.
//!
//! # Architecture
//!
//! - **Router**: classifies content URIs as the pet collection or a single pet
//! - **Validator**: checks field invariants before any write
//! - **Store**: SQLite (or in-memory) table access, one statement per write
//! - **Provider**: ties them together and broadcasts change notifications
//!
//! # Quick Start
//!
//! ```text
//! let provider = PetProvider::open(&Config::load()?);
//! let pets = provider.router().collection_uri();
//!
//! // Add a pet
//! let values = ContentValues::new()
//!     .with(Column::Name, "Toto")
//!     .with(Column::Gender, Gender::Male);
//! let id = provider.insert(&pets, &values)?;
//!
//! // Query it back
//! let cursor = provider.query(&provider.router().item_uri(id), None, &Filter::new(), None)?;
//! ```
//!
//! # Modules
//!
//! - `provider`: The CRUD interface over content URIs (main entry point)
//! - `resource`: URI routing and MIME types
//! - `validate`: Insert and update validation
//! - `storage`: Schema management and stores
//! - `query`: Filters, sort orders and cursors
//! - `notify`: Change notifications
//! - `models`: Pet records and field sets
//! - `config`: Application configuration

pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod provider;
pub mod query;
pub mod resource;
pub mod storage;
pub mod validate;

pub use config::Config;
pub use error::{ErrorKind, Operation, Result, ShelterError};
pub use models::{Column, ContentValues, Gender, NewPet, Pet, PetChanges, PetRow, Value};
pub use notify::{Change, ChangeNotifier};
pub use provider::{PetCatalog, PetProvider};
pub use query::{Cursor, Direction, Filter, Op, SortOrder};
pub use resource::{Resource, Router, DEFAULT_AUTHORITY};
pub use storage::{MemoryStore, PetStore, SqliteStore, SCHEMA_VERSION};
