//! Regular expressions backing the string format markers.
//!
//! These are written in the common subset of Rust `regex` and PCRE syntax, so the
//! same text can be checked locally and embedded in a database validator.

use crate::types::StringFormat;
use regex::Regex;
use std::sync::LazyLock;

/// Loose email address shape: local part, `@`, dotted domain with an alphabetic TLD.
pub const EMAIL_PATTERN: &str = r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$";

/// Canonical hyphenated UUID text (8-4-4-4-12 hex digits).
pub const UUID_PATTERN: &str =
    r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$";

static EMAIL_REGEX: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(EMAIL_PATTERN));
static UUID_REGEX: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(UUID_PATTERN));

/// Compiled regex for a format marker, built on first use.
pub(crate) fn format_regex(format: StringFormat) -> Option<&'static Regex> {
    let compiled = match format {
        StringFormat::Email => &*EMAIL_REGEX,
        StringFormat::Uuid => &*UUID_REGEX,
    };
    compiled.as_ref().ok()
}
