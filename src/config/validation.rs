use crate::config::types::Config;
use crate::ConfigError;

/// Validates cross-field constraints that serde defaults cannot express
///
/// # Returns
///
/// * `Ok(())` - Configuration is usable
/// * `Err(ConfigError::Validation)` - A constraint was violated
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    if config.fetch.concurrent_requests == 0 {
        return Err(ConfigError::Validation(
            "concurrent-requests must be at least 1".to_string(),
        ));
    }

    if config.fetch.retry_attempts == 0 {
        return Err(ConfigError::Validation(
            "retry-attempts must be at least 1".to_string(),
        ));
    }

    if config.fetch.request_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "request-timeout-secs must be at least 1".to_string(),
        ));
    }

    let delay = config.fetch.delay_between_requests_secs;
    if !delay.is_finite() || delay < 0.0 {
        return Err(ConfigError::Validation(
            "delay-between-requests-secs must be a non-negative number".to_string(),
        ));
    }

    if config.storage.database_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "database-path must not be empty".to_string(),
        ));
    }

    let base = &config.catalog.base_url;
    if !base.starts_with("http://") && !base.starts_with("https://") {
        return Err(ConfigError::Validation(format!(
            "base-url must be an absolute http(s) URL, got '{}'",
            base
        )));
    }

    Ok(())
}
