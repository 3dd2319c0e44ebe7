//! Status command handler

use anyhow::{Context, Result};

use shelter_core::{PetCatalog, PetProvider, PetStore, SqliteStore, SCHEMA_VERSION};

use crate::output::{Output, OutputFormat};

/// Show status information
pub fn show(provider: &PetProvider<SqliteStore>, output: &Output) -> Result<()> {
    let store = provider.store();
    let authority = provider.router().authority();
    let location = store
        .path()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ":memory:".to_string());

    let schema_version = store
        .schema_version()
        .context("Failed to read schema version")?;
    let count = store.count().context("Failed to count pets")?;

    match output.format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "database": location,
                    "schema_version": schema_version,
                    "supported_schema_version": SCHEMA_VERSION,
                    "authority": authority,
                    "counts": {
                        "pets": count
                    }
                })
            );
        }
        OutputFormat::Quiet => {
            println!("{}", count);
        }
        OutputFormat::Human => {
            println!("Shelter Status");
            println!("==============");
            println!();
            println!("Storage:");
            println!("  Database: {}", location);
            println!("  Schema:   v{}", schema_version);
            println!();
            println!("Provider:");
            println!("  Authority: {}", authority);
            println!("  Pets URI:  {}", provider.router().collection_uri());
            println!();
            println!("Contents:");
            println!("  Pets: {}", count);
        }
    }

    Ok(())
}
