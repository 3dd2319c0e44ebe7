//! Pet command handlers
//!
//! Every handler goes through [`PetCatalog`] with content URIs.

use anyhow::{bail, Context, Result};

use shelter_core::{Column, ContentValues, Filter, Gender, Pet, PetCatalog, SortOrder, Value};

use crate::editor::confirm;
use crate::output::{Output, OutputFormat};

/// Fields accepted by `add` and `edit`
#[derive(Debug, Default)]
pub struct PetFields {
    pub name: Option<String>,
    pub breed: Option<String>,
    pub gender: Option<Gender>,
    pub weight: Option<i64>,
}

impl PetFields {
    /// Only the supplied fields; an empty breed clears it
    fn to_values(&self) -> ContentValues {
        let mut values = ContentValues::new();
        if let Some(name) = &self.name {
            values.put(Column::Name, name.as_str());
        }
        if let Some(breed) = &self.breed {
            if breed.trim().is_empty() {
                values.put(Column::Breed, Value::Null);
            } else {
                values.put(Column::Breed, breed.as_str());
            }
        }
        if let Some(gender) = self.gender {
            values.put(Column::Gender, gender);
        }
        if let Some(weight) = self.weight {
            values.put(Column::Weight, weight);
        }
        values
    }
}

/// List every pet
pub fn list(
    catalog: &dyn PetCatalog,
    sort: Option<Column>,
    descending: bool,
    output: &Output,
) -> Result<()> {
    let order = sort.map(|column| {
        if descending {
            SortOrder::desc(column)
        } else {
            SortOrder::asc(column)
        }
    });

    let uri = catalog.router().collection_uri();
    let cursor = catalog
        .query(&uri, None, &Filter::new(), order.as_ref())
        .context("Failed to load pets")?;

    let pets: Vec<Pet> = cursor.iter().filter_map(|row| row.to_pet()).collect();
    output.print_pets(&pets);
    Ok(())
}

/// Show a single pet
pub fn show(catalog: &dyn PetCatalog, id: i64, output: &Output) -> Result<()> {
    let pet = load(catalog, id)?;
    output.print_pet(&pet);
    Ok(())
}

/// Add a pet
pub fn add(catalog: &dyn PetCatalog, fields: PetFields, output: &Output) -> Result<()> {
    let mut values = fields.to_values();
    if !values.contains(Column::Gender) {
        values.put(Column::Gender, Gender::Unknown);
    }

    let uri = catalog.router().collection_uri();
    let id = catalog
        .insert(&uri, &values)
        .context("Error with saving pet")?;

    report_saved(id, "Pet saved", output);
    Ok(())
}

/// Insert the sample pet
pub fn seed(catalog: &dyn PetCatalog, output: &Output) -> Result<()> {
    let values = ContentValues::new()
        .with(Column::Name, "Toto")
        .with(Column::Breed, "Terrier")
        .with(Column::Gender, Gender::Male)
        .with(Column::Weight, 7);

    let uri = catalog.router().collection_uri();
    let id = catalog
        .insert(&uri, &values)
        .context("Error with saving pet")?;

    report_saved(id, "Pet saved", output);
    Ok(())
}

/// Edit the supplied fields of a pet
pub fn edit(catalog: &dyn PetCatalog, id: i64, fields: PetFields, output: &Output) -> Result<()> {
    let values = fields.to_values();
    if values.is_empty() {
        output.message("No changes");
        return Ok(());
    }

    let uri = catalog.router().item_uri(id);
    let updated = catalog
        .update(&uri, &values, &Filter::new())
        .context("Error with updating pet")?;

    if updated == 0 {
        bail!("Error with updating pet: no pet with id {}", id);
    }

    report_saved(id, "Pet updated", output);
    Ok(())
}

/// Delete a pet
pub fn delete(catalog: &dyn PetCatalog, id: i64, yes: bool, output: &Output) -> Result<()> {
    let pet = load(catalog, id)?;

    if !yes && output.should_prompt() {
        println!("{} ({})", pet.name, pet.breed_or_unknown());
        if !confirm("Delete this pet?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    let uri = catalog.router().item_uri(id);
    let deleted = catalog
        .delete(&uri, &Filter::new())
        .context("Error with deleting pet")?;

    if deleted == 0 {
        bail!("Error with deleting pet: no pet with id {}", id);
    }

    output.success("Pet deleted");
    Ok(())
}

/// Delete every pet
pub fn delete_all(catalog: &dyn PetCatalog, yes: bool, output: &Output) -> Result<()> {
    if !yes && output.should_prompt() && !confirm("Delete all pets?")? {
        println!("Cancelled.");
        return Ok(());
    }

    let uri = catalog.router().collection_uri();
    let deleted = catalog
        .delete(&uri, &Filter::new())
        .context("Error with deleting pets")?;

    match output.format {
        OutputFormat::Quiet => println!("{}", deleted),
        _ => output.success(&format!("Deleted {} pet(s)", deleted)),
    }
    Ok(())
}

fn load(catalog: &dyn PetCatalog, id: i64) -> Result<Pet> {
    let uri = catalog.router().item_uri(id);
    let cursor = catalog
        .query(&uri, None, &Filter::new(), None)
        .context("Failed to load pet")?;

    match cursor.first().and_then(|row| row.to_pet()) {
        Some(pet) => Ok(pet),
        None => bail!("Pet not found: {}", id),
    }
}

fn report_saved(id: i64, message: &str, output: &Output) {
    match output.format {
        OutputFormat::Quiet => println!("{}", id),
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({"status": "success", "message": message, "id": id})
            );
        }
        OutputFormat::Human => output.success(&format!("{} (id {})", message, id)),
    }
}
