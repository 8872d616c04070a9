//! Centralized validation helpers for filenames and upload metadata.

use std::path::Path;

/// Maximum length accepted for a requested filename
pub const MAX_FILENAME_LENGTH: usize = 255;

/// Maximum length for a file extension carried over from the client
pub const MAX_EXTENSION_LENGTH: usize = 8;

/// Extension used when the client filename has none worth keeping
pub const DEFAULT_EXTENSION: &str = ".jpg";

/// Validation error types
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Empty filename provided")]
    EmptyFilename,
    #[error("Filename too long: exceeds {MAX_FILENAME_LENGTH} characters")]
    FilenameTooLong,
    #[error("Invalid filename: contains path traversal or invalid characters")]
    InvalidFilename,
}

/// Validate a filename requested from the upload directory.
///
/// Stored names are generated server-side as `<millis>-<token><ext>`, so anything
/// outside that shape is rejected rather than sanitized:
/// - length limits
/// - directory traversal (`..`, `/`, `\`)
/// - hidden files (leading `.`)
/// - characters outside ASCII alphanumerics plus `.`, `-`, `_`
///
/// # Errors
///
/// Returns `ValidationError::EmptyFilename` if the name is empty,
/// `ValidationError::FilenameTooLong` if it exceeds the limit, or
/// `ValidationError::InvalidFilename` for traversal or disallowed characters.
pub fn validate_filename(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyFilename);
    }

    if name.len() > MAX_FILENAME_LENGTH {
        return Err(ValidationError::FilenameTooLong);
    }

    // Prevent directory traversal attacks
    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(ValidationError::InvalidFilename);
    }

    // Hidden files are never generated by the store
    if name.starts_with('.') {
        return Err(ValidationError::InvalidFilename);
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
    {
        return Err(ValidationError::InvalidFilename);
    }

    Ok(())
}

/// Extract a safe extension (including the leading dot) from a client-supplied
/// filename, defaulting to `.jpg`.
///
/// The extension is lowercased and must be short and purely alphanumeric;
/// anything else falls back to the default.
#[must_use]
pub fn safe_extension(original: Option<&str>) -> String {
    let Some(name) = original else {
        return DEFAULT_EXTENSION.to_string();
    };

    let Some(ext) = Path::new(name).extension().and_then(|e| e.to_str()) else {
        return DEFAULT_EXTENSION.to_string();
    };

    let lowered = ext.to_lowercase();
    if lowered.is_empty()
        || lowered.len() > MAX_EXTENSION_LENGTH
        || !lowered.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return DEFAULT_EXTENSION.to_string();
    }

    format!(".{lowered}")
}

/// Check whether a declared content type claims to be an image.
///
/// This trusts the client header and never inspects file bytes, so it is a weak
/// guarantee only.
#[must_use]
pub fn is_image_mime(content_type: Option<&str>) -> bool {
    content_type.is_some_and(|ct| ct.trim().to_ascii_lowercase().starts_with("image/"))
}
