use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{AnalysisSettings, Config, DataSettings, MonteCarloSettings};

/// Prefix of the environment variables that override file values,
/// e.g. `FINSIGHT__MONTE_CARLO__PATHS=500`.
pub const ENV_PREFIX: &str = "FINSIGHT";

/// Loads the application configuration.
///
/// Values are layered: built-in defaults, then the TOML file at `path` (if it
/// exists), then `FINSIGHT__SECTION__KEY` environment variables. The result is
/// validated before it is returned.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    load_with_environment(path, environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn load_with_environment(
    path: &Path,
    environment: config::Environment,
) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(environment)
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(path = %path.display(), ?config, "Configuration loaded.");
    Ok(config)
}
