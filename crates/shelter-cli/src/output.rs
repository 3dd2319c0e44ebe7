//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use shelter_core::Pet;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Print the editor view of a single pet
    pub fn print_pet(&self, pet: &Pet) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:     {}", pet.id);
                println!("Name:   {}", pet.name);
                println!("Breed:  {}", pet.breed_or_unknown());
                println!("Gender: {}", pet.gender.label());
                println!("Weight: {} kg", pet.weight);
            }
            OutputFormat::Json => match serde_json::to_string_pretty(pet) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Failed to serialize pet: {}", e),
            },
            OutputFormat::Quiet => {
                println!("{}", pet.id);
            }
        }
    }

    /// Print the catalog view
    pub fn print_pets(&self, pets: &[Pet]) {
        match self.format {
            OutputFormat::Human => {
                if pets.is_empty() {
                    println!("No pets in the shelter yet.");
                    println!("Add one with `shelter add --name <name>` or `shelter seed`.");
                    return;
                }
                for pet in pets {
                    println!(
                        "{:>5} | {} | {}",
                        pet.id,
                        truncate(&pet.name, 30),
                        truncate(pet.breed_or_unknown(), 30)
                    );
                }
                println!("\n{} pet(s)", pets.len());
            }
            OutputFormat::Json => match serde_json::to_string_pretty(pets) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Failed to serialize pets: {}", e),
            },
            OutputFormat::Quiet => {
                for pet in pets {
                    println!("{}", pet.id);
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt for confirmation
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
