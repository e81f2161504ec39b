//! Seed command implementation

use authgate_config::load_settings;
use authgate_core::AuthgateError;
use authgate_runtime::{SeedUser, Seeder};
use clap::Args;
use tracing::info;

const DEFAULT_USER: &str = "juan:juan@example.com:prueba123";

/// Seed command arguments
#[derive(Args, Debug)]
pub struct SeedCommand {
    /// User to insert or update, as `username:email:password` (repeatable)
    #[arg(short, long = "user", value_name = "USERNAME:EMAIL:PASSWORD", default_value = DEFAULT_USER)]
    pub users: Vec<SeedUser>,
}

impl SeedCommand {
    /// Execute the seed command
    pub async fn execute(&self) -> Result<(), AuthgateError> {
        let settings = load_settings()?;

        let count = Seeder::new(&settings).seed(&self.users).await?;
        info!("Seeding finished: {} user(s) written", count);
        Ok(())
    }
}
