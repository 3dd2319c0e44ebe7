//! Write validation
//!
//! Every insert and update passes through here before it reaches a store.
//! The functions are pure: they read a [`ContentValues`] and either return a
//! typed record or an [`ShelterError::InvalidField`].

use crate::error::{Result, ShelterError};
use crate::models::{Column, ContentValues, Gender, NewPet, PetChanges, Value};

/// Validate a full record for insertion
///
/// `name` and `gender` are required, `weight` defaults to 0.
pub fn validate_for_insert(values: &ContentValues) -> Result<NewPet> {
    reject_id(values)?;

    let name = match values.get(Column::Name) {
        Some(value) => check_name(value)?,
        None => return Err(ShelterError::invalid(Column::Name, "a pet requires a name")),
    };

    let gender = match values.get(Column::Gender) {
        Some(value) => check_gender(value)?,
        None => {
            return Err(ShelterError::invalid(
                Column::Gender,
                "a pet requires a gender",
            ))
        }
    };

    let weight = match values.get(Column::Weight) {
        None | Some(Value::Null) => 0,
        Some(value) => check_weight(value)?,
    };

    let breed = values.get(Column::Breed).and_then(breed_text);

    Ok(NewPet {
        name,
        breed,
        gender,
        weight,
    })
}

/// Validate a partial record for update
///
/// Only supplied fields are checked. An empty field set yields
/// [`ShelterError::NoOpUpdate`].
pub fn validate_for_update(values: &ContentValues) -> Result<PetChanges> {
    if values.is_empty() {
        return Err(ShelterError::NoOpUpdate);
    }

    let mut changes = PetChanges::default();
    for (column, value) in values.iter() {
        match column {
            Column::Id => return Err(id_not_writable()),
            Column::Name => changes.name = Some(check_name(value)?),
            Column::Breed => changes.breed = Some(breed_text(value)),
            Column::Gender => changes.gender = Some(check_gender(value)?),
            Column::Weight => {
                if value.is_null() {
                    return Err(ShelterError::invalid(
                        Column::Weight,
                        "weight cannot be cleared",
                    ));
                }
                changes.weight = Some(check_weight(value)?);
            }
        }
    }

    Ok(changes)
}

fn reject_id(values: &ContentValues) -> Result<()> {
    if values.contains(Column::Id) {
        return Err(id_not_writable());
    }
    Ok(())
}

fn id_not_writable() -> ShelterError {
    ShelterError::invalid(
        Column::Id,
        "the id is assigned by the store and cannot be written",
    )
}

fn check_name(value: &Value) -> Result<String> {
    match value.as_text() {
        Some(name) if !name.trim().is_empty() => Ok(name),
        _ => Err(ShelterError::invalid(Column::Name, "a pet requires a name")),
    }
}

fn check_gender(value: &Value) -> Result<Gender> {
    let code = value.as_integer().ok_or_else(|| {
        ShelterError::invalid(Column::Gender, format!("expected 0, 1 or 2, got {:?}", value))
    })?;
    Gender::from_code(code).ok_or_else(|| {
        ShelterError::invalid(Column::Gender, format!("expected 0, 1 or 2, got {}", code))
    })
}

fn check_weight(value: &Value) -> Result<i64> {
    match value.as_integer() {
        Some(weight) if weight >= 0 => Ok(weight),
        Some(weight) => Err(ShelterError::invalid(
            Column::Weight,
            format!("weight must not be negative, got {}", weight),
        )),
        None => Err(ShelterError::invalid(
            Column::Weight,
            format!("expected a whole number, got {:?}", value),
        )),
    }
}

fn breed_text(value: &Value) -> Option<String> {
    value.as_text()
}
