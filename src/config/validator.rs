use thiserror::Error;
use url::Url;

use crate::config::{ApiSettings, Settings, StorageSettings};

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

pub struct ConfigValidator;

impl ConfigValidator {
    /// Check every section, collecting all problems rather than stopping at the first.
    pub fn validate(settings: &Settings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = Self::validate_api(&settings.api) {
            errors.extend(e);
        }

        if let Err(e) = Self::validate_storage(&settings.storage) {
            errors.extend(e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_api(api: &ApiSettings) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if api.base_url.trim().is_empty() {
            errors.push(ValidationError::MissingField("api.base_url".to_string()));
        } else {
            match Url::parse(&api.base_url) {
                Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
                Ok(url) => errors.push(ValidationError::InvalidValue {
                    field: "api.base_url".to_string(),
                    reason: format!("Unsupported scheme '{}', expected http or https", url.scheme()),
                }),
                Err(e) => errors.push(ValidationError::InvalidValue {
                    field: "api.base_url".to_string(),
                    reason: e.to_string(),
                }),
            }
        }

        if api.timeout_secs == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "api.timeout_secs".to_string(),
                reason: "Timeout must be greater than 0".to_string(),
            });
        }

        if api.retry.max_attempts == 0 {
            errors.push(ValidationError::InvalidValue {
                field: "api.retry.max_attempts".to_string(),
                reason: "At least one attempt is required".to_string(),
            });
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    fn validate_storage(storage: &StorageSettings) -> Result<(), Vec<ValidationError>> {
        if storage.favorites_path.as_os_str().is_empty() {
            return Err(vec![ValidationError::MissingField(
                "storage.favorites_path".to_string(),
            )]);
        }
        Ok(())
    }
}
