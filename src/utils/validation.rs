use crate::utils::error::{RekognizerError, Result};
use url::Url;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_url(field_name: &str, url_str: &str) -> Result<Url> {
    if url_str.is_empty() {
        return Err(RekognizerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: "URL cannot be empty".to_string(),
        });
    }

    match Url::parse(url_str) {
        Ok(url) => match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(RekognizerError::InvalidConfigValueError {
                field: field_name.to_string(),
                value: url_str.to_string(),
                reason: format!("Unsupported URL scheme: {}", scheme),
            }),
        },
        Err(e) => Err(RekognizerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: url_str.to_string(),
            reason: format!("Invalid URL format: {}", e),
        }),
    }
}

pub fn validate_positive_number(field_name: &str, value: usize, min_value: usize) -> Result<()> {
    if value < min_value {
        return Err(RekognizerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be at least {}", min_value),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(RekognizerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

/// Rejects `${VAR}` placeholders left behind by env substitution.
pub fn validate_resolved(field_name: &str, value: &str) -> Result<()> {
    if value.contains("${") {
        return Err(RekognizerError::MissingConfigError {
            field: format!("{} (unresolved placeholder in '{}')", field_name, value),
        });
    }
    Ok(())
}

/// `min` is exclusive, `max` inclusive.
pub fn validate_range(field_name: &str, value: f64, min: f64, max: f64) -> Result<()> {
    if !(value > min && value <= max) {
        return Err(RekognizerError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be greater than {} and at most {}", min, max),
        });
    }
    Ok(())
}

/// Parses a user supplied image URL; failures are request validation errors.
pub fn parse_image_url(field_name: &str, value: &str) -> Result<Url> {
    validate_url(field_name, value)
        .map_err(|e| RekognizerError::validation(format!("{}", e)))
}
