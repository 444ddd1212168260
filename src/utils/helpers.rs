//! Helper functions and utilities
//!
//! This module contains common helper functions used throughout the application.

use std::sync::OnceLock;
use std::time::Instant;

use regex::Regex;

/// Maximum length of an opaque identifier
pub const MAX_IDENTIFIER_LEN: usize = 128;

fn identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9_.:@|\-]+$").expect("identifier pattern is a valid regex")
    })
}

/// Validate an opaque identifier supplied by a collaborator
pub fn validate_identifier(kind: &str, raw: &str) -> Result<(), String> {
    if raw.is_empty() {
        return Err(format!("{} must not be empty", kind));
    }

    if raw.len() > MAX_IDENTIFIER_LEN {
        return Err(format!("{} exceeds {} characters", kind, MAX_IDENTIFIER_LEN));
    }

    if !identifier_pattern().is_match(raw) {
        return Err(format!("{} contains unsupported characters", kind));
    }

    Ok(())
}

/// Milliseconds elapsed since `started`, saturating
pub fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Mask a secret for display, keeping only its length visible
pub fn redact(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        format!("<redacted:{}>", secret.chars().count())
    }
}
