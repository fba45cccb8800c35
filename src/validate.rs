use serde::Serialize;
use url::Url;

use crate::cnfg::ValidationMode;
use crate::error::HttpError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Checks the screenshot target before any browser is launched.
///
/// `Basic` mirrors the minimal prefix check; `Strict` runs a full URL parse
/// and reports itemized field errors.
pub fn screenshot_url(url: Option<&str>, mode: ValidationMode) -> Result<String, HttpError> {
    let raw = url.unwrap_or("");

    match mode {
        ValidationMode::Basic => {
            if !raw.starts_with("http") {
                tracing::error!("Validation failed: Invalid URL {raw:?}");
                return Err(HttpError::BadRequest("Invalid URL".to_string()));
            }
            Ok(raw.to_string())
        }
        ValidationMode::Strict => match Url::parse(raw) {
            Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(raw.to_string()),
            _ => {
                tracing::error!("Validation failed: Invalid URL {raw:?}");
                Err(HttpError::Validation(vec![FieldError {
                    field: "url",
                    message: "must be a valid http(s) URL".to_string(),
                }]))
            }
        },
    }
}

/// The document route requires a non-empty HTML payload.
pub fn html_content(html: Option<&str>) -> Result<String, HttpError> {
    match html {
        Some(content) if !content.trim().is_empty() => Ok(content.to_string()),
        _ => {
            tracing::error!("Validation failed: missing HTML content");
            Err(HttpError::BadRequest("HTML content is required".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_accepts_http_prefix() {
        assert!(screenshot_url(Some("http://example.com"), ValidationMode::Basic).is_ok());
        assert!(screenshot_url(Some("https://example.com"), ValidationMode::Basic).is_ok());
    }

    #[test]
    fn basic_rejects_missing_or_unprefixed() {
        assert!(screenshot_url(None, ValidationMode::Basic).is_err());
        assert!(screenshot_url(Some(""), ValidationMode::Basic).is_err());
        assert!(screenshot_url(Some("ftp://example.com"), ValidationMode::Basic).is_err());
        assert!(screenshot_url(Some("example.com"), ValidationMode::Basic).is_err());
    }

    #[test]
    fn strict_requires_a_well_formed_url() {
        assert!(screenshot_url(Some("https://example.com/page"), ValidationMode::Strict).is_ok());
        // Passes the basic prefix check but is not a parseable URL.
        assert!(screenshot_url(Some("http://"), ValidationMode::Strict).is_err());
        assert!(screenshot_url(Some("example.com"), ValidationMode::Strict).is_err());
        assert!(screenshot_url(Some("ftp://example.com"), ValidationMode::Strict).is_err());
    }

    #[test]
    fn strict_failures_name_the_field() {
        let err = screenshot_url(Some("nope"), ValidationMode::Strict).unwrap_err();
        match err {
            HttpError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "url");
            }
            _ => panic!("expected itemized validation errors"),
        }
    }

    #[test]
    fn html_content_rejects_empty_payloads() {
        assert!(html_content(None).is_err());
        assert!(html_content(Some("")).is_err());
        assert!(html_content(Some("   \n")).is_err());
        assert!(html_content(Some("<html></html>")).is_ok());
    }
}
