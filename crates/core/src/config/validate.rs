use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Database path is not empty
/// - Sync staleness threshold is not 0
/// - Event buffer size is not 0
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.database.path.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "database.path cannot be empty".to_string(),
        ));
    }

    if config.sync.stale_after_hours == 0 {
        return Err(ConfigError::ValidationError(
            "sync.stale_after_hours cannot be 0".to_string(),
        ));
    }

    if config.events.buffer_size == 0 {
        return Err(ConfigError::ValidationError(
            "events.buffer_size cannot be 0".to_string(),
        ));
    }

    Ok(())
}
