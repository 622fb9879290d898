//! Validation utilities for incoming conversion requests

use std::sync::OnceLock;

use regex_lite::Regex;

use crate::error::{AppError, Result};
use crate::models::OutputFormat;

/// Accepted source URLs: YouTube domains only
const SOURCE_URL_PATTERN: &str = r"^(https?://)?(www\.)?(youtube\.com|youtu\.be)/.+";

fn source_url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SOURCE_URL_PATTERN).expect("pattern statico valido"))
}

/// Validate the source URL of a conversion request
///
/// # Returns
/// Ok(()) if the URL is non-empty and matches an accepted domain,
/// Err with the appropriate validation error otherwise
pub fn validate_source_url(url: &str) -> Result<()> {
    if url.is_empty() {
        return Err(AppError::MissingUrl);
    }
    if !source_url_regex().is_match(url) {
        return Err(AppError::InvalidUrl);
    }
    Ok(())
}

/// Parse the requested output format
///
/// # Returns
/// The parsed format, or Err if the value is outside {mp3, mp4}
pub fn parse_output_format(format: &str) -> Result<OutputFormat> {
    OutputFormat::parse(format).ok_or_else(|| AppError::UnsupportedFormat(format.to_string()))
}
