//! Data models for Shelter
//!
//! Defines the pet record, its gender enumeration, the column set exposed
//! through the provider, and `ContentValues`, the key-value field set that
//! callers use to describe inserts and updates.
//!
//! Gender travels as an integer (0/1/2) only at the boundary: inside
//! `ContentValues` supplied by callers and in the SQLite column. Everywhere
//! else it is a [`Gender`].

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Gender of a pet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Unknown,
    Male,
    Female,
}

impl Gender {
    pub const ALL: [Gender; 3] = [Gender::Unknown, Gender::Male, Gender::Female];

    /// Decode the stored integer value
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Gender::Unknown),
            1 => Some(Gender::Male),
            2 => Some(Gender::Female),
            _ => None,
        }
    }

    /// Integer value used in storage and in `ContentValues`
    pub fn code(self) -> i64 {
        match self {
            Gender::Unknown => 0,
            Gender::Male => 1,
            Gender::Female => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Gender::Unknown => "Unknown",
            Gender::Male => "Male",
            Gender::Female => "Female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unknown" | "0" => Ok(Gender::Unknown),
            "male" | "m" | "1" => Ok(Gender::Male),
            "female" | "f" | "2" => Ok(Gender::Female),
            other => Err(format!(
                "unknown gender '{}', expected unknown, male or female",
                other
            )),
        }
    }
}

/// Columns of the `pets` table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Column {
    Id,
    Name,
    Breed,
    Gender,
    Weight,
}

impl Column {
    pub const ALL: [Column; 5] = [
        Column::Id,
        Column::Name,
        Column::Breed,
        Column::Gender,
        Column::Weight,
    ];

    /// SQL column name
    pub fn name(self) -> &'static str {
        match self {
            Column::Id => "_id",
            Column::Name => "name",
            Column::Breed => "breed",
            Column::Gender => "gender",
            Column::Weight => "weight",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Column {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "_id" | "id" => Ok(Column::Id),
            "name" => Ok(Column::Name),
            "breed" => Ok(Column::Breed),
            "gender" => Ok(Column::Gender),
            "weight" => Ok(Column::Weight),
            other => Err(format!("unknown column '{}'", other)),
        }
    }
}

/// A single field value as supplied by callers
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Value {
    Null,
    Integer(i64),
    Text(String),
}

impl Value {
    /// Interpret as an integer, accepting numeric text
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            Value::Text(s) => s.trim().parse().ok(),
            Value::Null => None,
        }
    }

    /// Interpret as text, rendering integers
    pub fn as_text(&self) -> Option<String> {
        match self {
            Value::Text(s) => Some(s.clone()),
            Value::Integer(i) => Some(i.to_string()),
            Value::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v.into())
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Gender> for Value {
    fn from(g: Gender) -> Self {
        Value::Integer(g.code())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

/// Key-value field set describing a record or a partial record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContentValues {
    values: BTreeMap<Column, Value>,
}

impl ContentValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field, replacing any previous value
    pub fn put(&mut self, column: Column, value: impl Into<Value>) -> &mut Self {
        self.values.insert(column, value.into());
        self
    }

    /// Builder-style variant of [`ContentValues::put`]
    pub fn with(mut self, column: Column, value: impl Into<Value>) -> Self {
        self.put(column, value);
        self
    }

    pub fn get(&self, column: Column) -> Option<&Value> {
        self.values.get(&column)
    }

    pub fn contains(&self, column: Column) -> bool {
        self.values.contains_key(&column)
    }

    pub fn remove(&mut self, column: Column) -> Option<Value> {
        self.values.remove(&column)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Column, &Value)> {
        self.values.iter().map(|(c, v)| (*c, v))
    }
}

/// A persisted pet
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: i64,
    pub name: String,
    pub breed: Option<String>,
    pub gender: Gender,
    pub weight: i64,
}

impl Pet {
    /// Breed for display, falling back when none was recorded
    pub fn breed_or_unknown(&self) -> &str {
        match self.breed.as_deref() {
            Some(b) if !b.trim().is_empty() => b,
            _ => "Unknown breed",
        }
    }
}

/// A validated pet ready to be inserted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPet {
    pub name: String,
    pub breed: Option<String>,
    pub gender: Gender,
    pub weight: i64,
}

impl NewPet {
    pub fn into_pet(self, id: i64) -> Pet {
        Pet {
            id,
            name: self.name,
            breed: self.breed,
            gender: self.gender,
            weight: self.weight,
        }
    }
}

/// A validated partial update; `None` leaves the stored field untouched
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetChanges {
    pub name: Option<String>,
    /// `Some(None)` clears the breed
    pub breed: Option<Option<String>>,
    pub gender: Option<Gender>,
    pub weight: Option<i64>,
}

impl PetChanges {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.breed.is_none() && self.gender.is_none() && self.weight.is_none()
    }

    /// Apply the changes to an in-memory record
    pub fn apply_to(&self, pet: &mut Pet) {
        if let Some(name) = &self.name {
            pet.name = name.clone();
        }
        if let Some(breed) = &self.breed {
            pet.breed = breed.clone();
        }
        if let Some(gender) = self.gender {
            pet.gender = gender;
        }
        if let Some(weight) = self.weight {
            pet.weight = weight;
        }
    }
}

/// One row of a query result, holding only the projected columns
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PetRow {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub breed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<i64>,
}

impl PetRow {
    /// Project a full record down to the requested columns
    pub fn project(pet: &Pet, columns: &[Column]) -> Self {
        let mut row = PetRow::default();
        for column in columns {
            match column {
                Column::Id => row.id = Some(pet.id),
                Column::Name => row.name = Some(pet.name.clone()),
                Column::Breed => row.breed = pet.breed.clone(),
                Column::Gender => row.gender = Some(pet.gender),
                Column::Weight => row.weight = Some(pet.weight),
            }
        }
        row
    }

    /// Full record, if every required column was projected
    pub fn to_pet(&self) -> Option<Pet> {
        Some(Pet {
            id: self.id?,
            name: self.name.clone()?,
            breed: self.breed.clone(),
            gender: self.gender?,
            weight: self.weight?,
        })
    }
}
