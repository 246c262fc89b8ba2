use thiserror::Error;

/// Failures while assembling the runtime settings.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The TOML file or a `FINSIGHT__*` variable could not be read or deserialized.
    #[error("Failed to load settings: {0}")]
    Load(#[from] config::ConfigError),

    /// The settings were read but a value is out of its allowed range.
    #[error("Invalid setting: {0}")]
    Invalid(String),
}
