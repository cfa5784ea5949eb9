//! Range and format checks for [`AppConfig`].

use crate::schema::AppConfig;
use ciska_common::ConfigError;

const LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    validate_range(&mut errors, "event_capacity", config.event_capacity, 1, 4096);

    if let Some(level) = &config.log_level {
        let level = level.trim();
        if level.is_empty() {
            errors.push("log_level must not be empty".into());
        } else if !level.contains('=') && !LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
            errors.push(format!("log_level = {level} is not a known level"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

/// Check that an environment name is usable as a single path component.
pub fn validate_environment(environment: &str) -> Result<(), ConfigError> {
    let ok = !environment.is_empty()
        && environment != "."
        && environment != ".."
        && environment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.');
    if ok {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(format!(
            "invalid environment name: {environment:?}"
        )))
    }
}

fn validate_range(errors: &mut Vec<String>, name: &str, value: u32, min: u32, max: u32) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}
