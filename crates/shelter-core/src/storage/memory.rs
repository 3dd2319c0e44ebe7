//! In-memory pet store
//!
//! Same observable behavior as [`super::SqliteStore`]: ids are assigned
//! from a counter that never goes back, the natural order is by id, and
//! filters and sort orders use SQL semantics (see [`crate::query`]).

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard};

use crate::error::Result;
use crate::models::{Column, NewPet, Pet, PetChanges, PetRow};
use crate::query::{Filter, SortOrder};
use crate::storage::PetStore;

#[derive(Debug, Default)]
struct State {
    last_id: i64,
    pets: BTreeMap<i64, Pet>,
}

/// Pet records held in memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: Mutex<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PetStore for MemoryStore {
    fn select(
        &self,
        columns: &[Column],
        filter: &Filter,
        sort: Option<&SortOrder>,
    ) -> Result<Vec<PetRow>> {
        let state = self.lock();
        let mut matched: Vec<&Pet> = state.pets.values().filter(|p| filter.matches(p)).collect();
        if let Some(order) = sort {
            matched.sort_by(|a, b| order.compare(a, b));
        }
        Ok(matched
            .into_iter()
            .map(|pet| PetRow::project(pet, columns))
            .collect())
    }

    fn insert(&self, pet: &NewPet) -> Result<i64> {
        let mut state = self.lock();
        state.last_id += 1;
        let id = state.last_id;
        state.pets.insert(id, pet.clone().into_pet(id));
        Ok(id)
    }

    fn update(&self, changes: &PetChanges, filter: &Filter) -> Result<usize> {
        if changes.is_empty() {
            return Ok(0);
        }
        let mut state = self.lock();
        let mut updated = 0;
        for pet in state.pets.values_mut().filter(|p| filter.matches(p)) {
            changes.apply_to(pet);
            updated += 1;
        }
        Ok(updated)
    }

    fn delete(&self, filter: &Filter) -> Result<usize> {
        let mut state = self.lock();
        let before = state.pets.len();
        state.pets.retain(|_, pet| !filter.matches(pet));
        Ok(before - state.pets.len())
    }

    fn count(&self) -> Result<i64> {
        Ok(self.lock().pets.len() as i64)
    }
}
