//! Concurrency token parsing for optimistic updates
//!
//! The token travels as a quoted integer, e.g. `"7"`, the way an HTTP
//! `If-Match` header carries an entity tag. Reads produce the current
//! version as a token; updates must present exactly the last-read version
//! to succeed, compared for equality only.

use thiserror::Error;

/// Shortest well-formed token: two quotes around at least one digit
pub const MIN_TOKEN_LEN: usize = 3;

/// The token is not a quoted non-negative integer
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Malformed concurrency token: {token}")]
pub struct MalformedToken {
    pub token: String,
}

/// Parse a concurrency token into the version it encodes.
///
/// The token must be at least [`MIN_TOKEN_LEN`] characters, start and end
/// with a quote character, and enclose a plain digit string; a sign, even
/// a `+`, makes the token malformed.
pub fn parse_token(raw: &str) -> Result<i64, MalformedToken> {
    let malformed = || MalformedToken {
        token: raw.to_string(),
    };

    if raw.len() < MIN_TOKEN_LEN || !raw.starts_with('"') || !raw.ends_with('"') {
        return Err(malformed());
    }

    // Digits only: no sign, no whitespace.
    let inner = &raw[1..raw.len() - 1];
    if !inner.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    inner.parse::<i64>().map_err(|_| malformed())
}

/// Encode a version as the token echoed to clients
pub fn format_token(version: i64) -> String {
    format!("\"{version}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quoted_integer_parses() {
        assert_eq!(parse_token("\"0\""), Ok(0));
        assert_eq!(parse_token("\"7\""), Ok(7));
        assert_eq!(parse_token("\"1234\""), Ok(1234));
    }

    #[test]
    fn test_unquoted_token_is_malformed() {
        assert!(parse_token("0").is_err());
        assert!(parse_token("7").is_err());
        assert!(parse_token("\"7").is_err());
        assert!(parse_token("7\"").is_err());
    }

    #[test]
    fn test_short_token_is_malformed() {
        assert!(parse_token("").is_err());
        assert!(parse_token("\"").is_err());
        assert!(parse_token("\"\"").is_err());
    }

    #[test]
    fn test_non_integer_inner_value_is_malformed() {
        assert!(parse_token("\"abc\"").is_err());
        assert!(parse_token("\"1.5\"").is_err());
        assert!(parse_token("\"-1\"").is_err());
        assert!(parse_token("\" 7\"").is_err());
    }

    #[test]
    fn test_signed_inner_value_is_malformed() {
        assert!(parse_token("\"+7\"").is_err());
        assert!(parse_token("\"+0\"").is_err());
    }

    #[test]
    fn test_round_trip() {
        let token = format_token(42);
        assert_eq!(token, "\"42\"");
        assert_eq!(parse_token(&token), Ok(42));
    }
}
