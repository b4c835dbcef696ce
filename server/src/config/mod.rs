pub mod settings;

use log::info;

pub use settings::AppSettings;

use crate::error::AppError;

/// Initialize application configuration
pub fn init_config() -> Result<settings::AppSettings, AppError> {
    info!("Initializing application configuration from environment");
    let config = settings::AppSettings::from_env()?;
    Ok(config)
}
