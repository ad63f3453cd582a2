//! Configuration validation utilities.

use std::collections::HashSet;

use super::error::{ConfigError, ConfigResult};
use super::schema::{LogOutput, LoggingConfig, MediatorConfig, MediatorSection};

/// Validates the entire configuration.
pub fn validate_config(config: &MediatorConfig) -> ConfigResult<()> {
    validate_mediator_section(&config.mediator)?;
    validate_logging_config(&config.logging)?;
    Ok(())
}

/// Validates handler discovery settings.
fn validate_mediator_section(section: &MediatorSection) -> ConfigResult<()> {
    let root = match &section.root_crate {
        Some(root) => Some(validate_crate_name(root)?),
        None => None,
    };

    let mut seen = HashSet::new();
    for referenced in &section.referenced_crates {
        let name = validate_crate_name(referenced)?;
        if root.as_deref() == Some(name.as_str()) || !seen.insert(name.clone()) {
            return Err(ConfigError::DuplicateReference(name));
        }
    }

    Ok(())
}

/// Checks a crate name and returns it normalised (`-` → `_`).
fn validate_crate_name(name: &str) -> ConfigResult<String> {
    let normalized = name.trim().replace('-', "_");
    let mut chars = normalized.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    let valid_rest = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if valid_start && valid_rest {
        Ok(normalized)
    } else {
        Err(ConfigError::InvalidCrateName(name.to_string()))
    }
}

/// Validates logging settings.
fn validate_logging_config(logging: &LoggingConfig) -> ConfigResult<()> {
    if logging.output == LogOutput::File && logging.file_path.is_none() {
        return Err(ConfigError::validation(
            "logging.file_path is required when logging.output = \"file\"",
        ));
    }

    if logging.max_files == 0 {
        return Err(ConfigError::validation(
            "logging.max_files must be greater than 0",
        ));
    }

    if let Some(module) = logging.filters.keys().find(|m| m.trim().is_empty()) {
        return Err(ConfigError::validation(format!(
            "Invalid logging filter module: '{module}'"
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::LogLevel;

    fn with_scope(root: Option<&str>, referenced: &[&str]) -> MediatorConfig {
        let mut config = MediatorConfig::default();
        config.mediator.root_crate = root.map(str::to_string);
        config.mediator.referenced_crates = referenced.iter().map(|s| s.to_string()).collect();
        config
    }

    #[test]
    fn test_validate_default_config() {
        assert!(validate_config(&MediatorConfig::default()).is_ok());
    }

    #[test]
    fn test_validate_scope() {
        let scoped = with_scope(Some("order-service"), &["billing", "shipping"]);
        assert!(validate_config(&scoped).is_ok());

        let result = validate_config(&with_scope(Some("shop"), &["billing", "billing"]));
        assert!(matches!(result, Err(ConfigError::DuplicateReference(name)) if name == "billing"));

        let result = validate_config(&with_scope(Some("shop"), &["shop"]));
        assert!(matches!(result, Err(ConfigError::DuplicateReference(_))));

        let result = validate_config(&with_scope(Some("my shop"), &[]));
        assert!(matches!(result, Err(ConfigError::InvalidCrateName(_))));

        let result = validate_config(&with_scope(None, &["9lives"]));
        assert!(matches!(result, Err(ConfigError::InvalidCrateName(_))));
    }

    #[test]
    fn test_validate_file_output_requires_path() {
        let mut config = MediatorConfig::default();
        config.logging.output = LogOutput::File;
        assert!(matches!(
            validate_config(&config),
            Err(ConfigError::ValidationError { .. })
        ));

        config.logging.file_path = Some("mediator.log".into());
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_validate_filters() {
        let mut config = MediatorConfig::default();
        config
            .logging
            .filters
            .insert("mediator_framework".into(), LogLevel::Trace);
        assert!(validate_config(&config).is_ok());

        config.logging.filters.insert(" ".into(), LogLevel::Debug);
        assert!(validate_config(&config).is_err());
    }
}
