//! Token derivation.
//!
//! A token is the hex-encoded SHA-256 digest of a window's canonical string
//! followed by the shared secret. It is a pure function of `(Window, Secret)`
//! and carries no identity of its own.

use crate::domain::window::Window;
use serde::{Serialize, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;
use subtle::ConstantTimeEq;
use zeroize::Zeroizing;

/// Length of a token in hex characters (256-bit digest).
pub const TOKEN_LEN: usize = 64;

/// Number of leading characters shown when a token appears in logs.
pub const LOG_PREFIX_LEN: usize = 8;

/// Shared symmetric secret mixed into every token.
///
/// The value is wiped from memory on drop and never printed by `Debug`.
#[derive(Clone)]
pub struct Secret(Zeroizing<String>);

impl Secret {
    /// Wrap a secret value. Returns `None` for an empty string.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            return None;
        }
        Some(Self(Zeroizing::new(value)))
    }

    pub(crate) fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(<redacted>)")
    }
}

/// Error returned when parsing a string that is not a well-formed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenParseError {
    /// Token must be exactly 64 characters
    InvalidLength(usize),
    /// Token must be lowercase hexadecimal
    InvalidCharacter,
}

impl fmt::Display for TokenParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenParseError::InvalidLength(len) => {
                write!(f, "token must be {} characters, got {}", TOKEN_LEN, len)
            }
            TokenParseError::InvalidCharacter => {
                write!(f, "token must be lowercase hexadecimal")
            }
        }
    }
}

impl std::error::Error for TokenParseError {}

/// A rotating token: 64 lowercase hex characters.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Token(String);

impl Token {
    /// Derive the token for `window` under `secret`.
    ///
    /// # Example
    /// ```
    /// use chrono::{FixedOffset, TimeZone};
    /// use timeclock_token::{Secret, Token, Window, WindowSize};
    ///
    /// let offset = FixedOffset::west_opt(5 * 3600).unwrap();
    /// let instant = offset.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
    /// let window = Window::containing(instant, WindowSize::default());
    /// let secret = Secret::new("mmqep2024").unwrap();
    ///
    /// let token = Token::derive(&window, &secret);
    /// assert_eq!(token.as_str().len(), 64);
    /// assert_eq!(token, Token::derive(&window, &secret));
    /// ```
    pub fn derive(window: &Window, secret: &Secret) -> Self {
        let digest = Sha256::new()
            .chain_update(window.canonical().as_bytes())
            .chain_update(secret.expose().as_bytes())
            .finalize();
        Token(hex::encode(digest))
    }

    /// Parse a presented string as a well-formed token.
    ///
    /// Validation does not require this; any string can be checked. Parsing
    /// is for collaborators that want to reject garbage early.
    pub fn parse(value: &str) -> Result<Self, TokenParseError> {
        if value.len() != TOKEN_LEN {
            return Err(TokenParseError::InvalidLength(value.len()));
        }
        if !value
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(TokenParseError::InvalidCharacter);
        }
        Ok(Token(value.to_string()))
    }

    /// The hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Leading characters for log output.
    pub fn short(&self) -> &str {
        &self.0[..LOG_PREFIX_LEN]
    }

    /// Constant-time comparison against an arbitrary presented string.
    pub fn matches(&self, presented: &str) -> bool {
        self.0.as_bytes().ct_eq(presented.as_bytes()).into()
    }

    /// Consume the token, returning the hex string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({}...)", self.short())
    }
}

impl AsRef<str> for Token {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Token {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

/// Log-safe prefix of an untrusted presented value.
///
/// Works on characters so arbitrary scanner input never splits a code point.
pub fn log_prefix(presented: &str) -> String {
    presented.chars().take(LOG_PREFIX_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::window::WindowSize;
    use chrono::{FixedOffset, TimeZone};

    fn window_at(s: u32) -> Window {
        let instant = FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2024, 1, 1, 12, 0, s)
            .unwrap();
        Window::containing(instant, WindowSize::default())
    }

    fn secret() -> Secret {
        Secret::new("mmqep2024").unwrap()
    }

    #[test]
    fn test_known_digest() {
        let token = Token::derive(&window_at(0), &secret());
        assert_eq!(
            token.as_str(),
            "0a5bea31a5e5f6c0c581453e889c1cd356f73b455f77be13e135b62f2f25b257"
        );
    }

    #[test]
    fn test_same_window_same_token() {
        assert_eq!(
            Token::derive(&window_at(0), &secret()),
            Token::derive(&window_at(9), &secret())
        );
    }

    #[test]
    fn test_adjacent_windows_differ() {
        let current = Token::derive(&window_at(10), &secret());
        let previous = Token::derive(&window_at(0), &secret());
        assert_ne!(current, previous);
        assert_eq!(
            current.as_str(),
            "e3cba415b01c2a6abf841dbc260bff3e7f7dae641dcbf2785cdc655dd05265f8"
        );
    }

    #[test]
    fn test_secret_changes_token() {
        let other = Secret::new("another-secret").unwrap();
        assert_ne!(
            Token::derive(&window_at(0), &secret()),
            Token::derive(&window_at(0), &other)
        );
    }

    #[test]
    fn test_empty_secret_rejected() {
        assert!(Secret::new("").is_none());
    }

    #[test]
    fn test_secret_debug_is_redacted() {
        let rendered = format!("{:?}", secret());
        assert!(!rendered.contains("mmqep2024"));
    }

    #[test]
    fn test_matches() {
        let token = Token::derive(&window_at(0), &secret());
        assert!(token.matches(token.as_str()));
        assert!(!token.matches(""));
        assert!(!token.matches("garbage"));
        assert!(!token.matches(&token.as_str().to_uppercase()));
        assert!(!token.matches(&format!("{} ", token)));
    }

    #[test]
    fn test_parse() {
        let token = Token::derive(&window_at(0), &secret());
        assert_eq!(Token::parse(token.as_str()), Ok(token.clone()));
        assert_eq!(
            Token::parse("abc"),
            Err(TokenParseError::InvalidLength(3))
        );
        let upper = token.as_str().to_uppercase();
        assert_eq!(Token::parse(&upper), Err(TokenParseError::InvalidCharacter));
    }

    #[test]
    fn test_short_and_debug_hide_full_token() {
        let token = Token::derive(&window_at(0), &secret());
        assert_eq!(token.short(), "0a5bea31");
        assert_eq!(format!("{:?}", token), "Token(0a5bea31...)");
    }

    #[test]
    fn test_log_prefix_handles_multibyte_input() {
        assert_eq!(log_prefix("cédula-ñandú-xyz"), "cédula-ñ");
        assert_eq!(log_prefix("ab"), "ab");
    }
}
