//! Validation helpers for DTOs.

use reqwest::Url;
use validator::ValidationError;

/// Accepts an empty value or an absolute `http`/`https` URL.
///
/// # Examples
///
/// ```ignore
/// validate_optional_http_url("")                         // Ok - not configured
/// validate_optional_http_url("https://example.test/exec") // Ok
/// validate_optional_http_url("ftp://example.test")       // Err - scheme
/// ```
pub fn validate_optional_http_url(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }

    let url = Url::parse(value).map_err(|err| {
        let mut error = ValidationError::new("url_format");
        error.message = Some(format!("`{value}` is not a valid URL: {err}").into());
        error
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        let mut error = ValidationError::new("url_scheme");
        error.message =
            Some(format!("URL scheme must be http or https (got {})", url.scheme()).into());
        return Err(error);
    }

    Ok(())
}

/// Accepts an empty value or a string of ASCII digits, the shape of chat user ids.
pub fn validate_user_id(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() || value.chars().all(|c| c.is_ascii_digit()) {
        return Ok(());
    }

    let mut error = ValidationError::new("user_id_format");
    error.message = Some("User ID must contain only digits".into());
    Err(error)
}
