//! Codec configuration.
//!
//! A `CodecConfig` is built once at startup and stays immutable for the
//! process lifetime. Every component that generates or validates tokens must
//! be built from the same configuration, or their windows diverge.
//!
//! Values can be supplied through the builder or loaded from the environment:
//!
//! | Variable                   | Default  | Meaning                              |
//! |----------------------------|----------|--------------------------------------|
//! | `TIMECLOCK_SECRET`         | required | Shared secret mixed into every token |
//! | `TIMECLOCK_WINDOW_SECONDS` | `10`     | Rotation period, must divide 60      |
//! | `TIMECLOCK_GRACE_SECONDS`  | `2`      | Grace threshold, `off` disables      |
//! | `TIMECLOCK_UTC_OFFSET`     | `-05:00` | Reference offset, `+HH:MM`/`-HH:MM`  |

use crate::application::bucket_clock::DEFAULT_OFFSET;
use crate::domain::token::Secret;
use crate::domain::window::{WindowSize, WindowSizeError, DEFAULT_WINDOW_SECONDS};
use chrono::FixedOffset;
use std::fmt;

/// Default grace threshold in seconds (inclusive).
pub const DEFAULT_GRACE_SECONDS: u32 = 2;

pub const ENV_SECRET: &str = "TIMECLOCK_SECRET";
pub const ENV_WINDOW_SECONDS: &str = "TIMECLOCK_WINDOW_SECONDS";
pub const ENV_GRACE_SECONDS: &str = "TIMECLOCK_GRACE_SECONDS";
pub const ENV_UTC_OFFSET: &str = "TIMECLOCK_UTC_OFFSET";

/// Secret used for local development only.
#[cfg(feature = "dev-secret")]
pub const DEV_SECRET: &str = "mmqep2024";

/// Error returned when building a `CodecConfig` fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    /// No secret was supplied
    MissingSecret,
    /// The supplied secret is empty
    EmptySecret,
    /// Window size is not usable
    WindowSize(WindowSizeError),
    /// Grace threshold must end before the window does
    GraceTooLong {
        grace_seconds: u32,
        window_seconds: u32,
    },
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::MissingSecret => write!(f, "a shared secret is required"),
            BuildError::EmptySecret => write!(f, "the shared secret must not be empty"),
            BuildError::WindowSize(e) => write!(f, "window size error: {}", e),
            BuildError::GraceTooLong {
                grace_seconds,
                window_seconds,
            } => write!(
                f,
                "grace of {}s must be shorter than the {}s window",
                grace_seconds, window_seconds
            ),
        }
    }
}

impl std::error::Error for BuildError {}

impl From<WindowSizeError> for BuildError {
    fn from(e: WindowSizeError) -> Self {
        BuildError::WindowSize(e)
    }
}

/// Error returned when loading configuration from the environment fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A configuration value is invalid
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
    /// A required configuration value is missing
    MissingRequired { key: String, hint: String },
    /// Values parsed but do not form a valid configuration
    Build(BuildError),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidValue { key, value, reason } => {
                write!(f, "invalid configuration for {}: '{}' ({})", key, value, reason)
            }
            ConfigError::MissingRequired { key, hint } => {
                write!(f, "missing required configuration: {} ({})", key, hint)
            }
            ConfigError::Build(e) => write!(f, "invalid configuration: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<BuildError> for ConfigError {
    fn from(e: BuildError) -> Self {
        ConfigError::Build(e)
    }
}

/// Validated, immutable codec configuration.
#[derive(Debug, Clone)]
pub struct CodecConfig {
    secret: Secret,
    window_size: WindowSize,
    grace_seconds: Option<u32>,
    utc_offset: FixedOffset,
}

impl CodecConfig {
    /// Create a builder for configuring the codec.
    ///
    /// Defaults:
    /// - Secret: none (must be supplied)
    /// - Window: 10 seconds
    /// - Grace: 2 seconds
    /// - Reference offset: UTC-05:00
    pub fn builder() -> CodecConfigBuilder {
        CodecConfigBuilder {
            secret: None,
            window_seconds: DEFAULT_WINDOW_SECONDS,
            grace_seconds: Some(DEFAULT_GRACE_SECONDS),
            utc_offset: DEFAULT_OFFSET,
            #[cfg(feature = "dev-secret")]
            dev_secret: false,
        }
    }

    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    ///
    /// # Example
    /// ```
    /// use std::collections::HashMap;
    /// use timeclock_token::CodecConfig;
    ///
    /// let vars = HashMap::from([
    ///     ("TIMECLOCK_SECRET", "s3cret"),
    ///     ("TIMECLOCK_WINDOW_SECONDS", "30"),
    /// ]);
    /// let config = CodecConfig::from_lookup(|k| vars.get(k).map(|v| v.to_string())).unwrap();
    /// assert_eq!(config.window_size().as_secs(), 30);
    /// assert_eq!(config.grace_seconds(), Some(2));
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Self::builder();

        builder = match lookup(ENV_SECRET) {
            Some(secret) => builder.with_secret(secret),
            None => missing_secret(builder)?,
        };

        if let Some(raw) = lookup(ENV_WINDOW_SECONDS) {
            let secs = raw.trim().parse::<u32>().map_err(|_| ConfigError::InvalidValue {
                key: ENV_WINDOW_SECONDS.to_string(),
                value: raw.clone(),
                reason: "must be a whole number of seconds".to_string(),
            })?;
            builder = builder.with_window_seconds(secs);
        }

        if let Some(raw) = lookup(ENV_GRACE_SECONDS) {
            builder = match raw.trim().to_ascii_lowercase().as_str() {
                "off" | "none" => builder.without_grace(),
                value => {
                    let secs = value.parse::<u32>().map_err(|_| ConfigError::InvalidValue {
                        key: ENV_GRACE_SECONDS.to_string(),
                        value: raw.clone(),
                        reason: "must be a whole number of seconds or 'off'".to_string(),
                    })?;
                    builder.with_grace_seconds(secs)
                }
            };
        }

        if let Some(raw) = lookup(ENV_UTC_OFFSET) {
            let offset = parse_utc_offset(&raw).ok_or_else(|| ConfigError::InvalidValue {
                key: ENV_UTC_OFFSET.to_string(),
                value: raw.clone(),
                reason: "expected +HH:MM or -HH:MM".to_string(),
            })?;
            builder = builder.with_utc_offset(offset);
        }

        Ok(builder.build()?)
    }

    pub(crate) fn secret(&self) -> &Secret {
        &self.secret
    }

    /// Rotation window length.
    pub fn window_size(&self) -> WindowSize {
        self.window_size
    }

    /// Inclusive grace threshold, or `None` when grace is disabled.
    pub fn grace_seconds(&self) -> Option<u32> {
        self.grace_seconds
    }

    /// Reference offset all windows are computed in.
    pub fn utc_offset(&self) -> FixedOffset {
        self.utc_offset
    }
}

/// Builder for constructing a `CodecConfig`.
#[derive(Clone)]
pub struct CodecConfigBuilder {
    secret: Option<String>,
    window_seconds: u32,
    grace_seconds: Option<u32>,
    utc_offset: FixedOffset,
    #[cfg(feature = "dev-secret")]
    dev_secret: bool,
}

impl fmt::Debug for CodecConfigBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CodecConfigBuilder")
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("window_seconds", &self.window_seconds)
            .field("grace_seconds", &self.grace_seconds)
            .field("utc_offset", &self.utc_offset)
            .finish()
    }
}

impl CodecConfigBuilder {
    /// Set the shared secret.
    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    /// Use the built-in development secret when no other secret is set.
    #[cfg(feature = "dev-secret")]
    pub fn with_dev_secret(mut self) -> Self {
        self.dev_secret = true;
        self
    }

    /// Set the rotation period in seconds.
    ///
    /// The value will be validated when `build()` is called.
    pub fn with_window_seconds(mut self, secs: u32) -> Self {
        self.window_seconds = secs;
        self
    }

    /// Set the inclusive grace threshold in seconds.
    ///
    /// During the first `secs` whole seconds of a window (inclusive), the
    /// previous window's token is still accepted.
    pub fn with_grace_seconds(mut self, secs: u32) -> Self {
        self.grace_seconds = Some(secs);
        self
    }

    /// Accept only the current window's token.
    pub fn without_grace(mut self) -> Self {
        self.grace_seconds = None;
        self
    }

    /// Set the reference offset.
    pub fn with_utc_offset(mut self, offset: FixedOffset) -> Self {
        self.utc_offset = offset;
        self
    }

    /// Build the configuration.
    ///
    /// # Errors
    /// Returns `BuildError` if the secret is missing or empty, the window size
    /// does not divide 60, or the grace threshold reaches the window length.
    pub fn build(self) -> Result<CodecConfig, BuildError> {
        #[cfg(feature = "dev-secret")]
        let secret = match (self.secret, self.dev_secret) {
            (Some(secret), _) => secret,
            (None, true) => DEV_SECRET.to_string(),
            (None, false) => return Err(BuildError::MissingSecret),
        };
        #[cfg(not(feature = "dev-secret"))]
        let secret = self.secret.ok_or(BuildError::MissingSecret)?;

        let secret = Secret::new(secret).ok_or(BuildError::EmptySecret)?;
        let window_size = WindowSize::new(self.window_seconds)?;

        if let Some(grace) = self.grace_seconds {
            if grace >= window_size.as_secs() {
                return Err(BuildError::GraceTooLong {
                    grace_seconds: grace,
                    window_seconds: window_size.as_secs(),
                });
            }
        }

        Ok(CodecConfig {
            secret,
            window_size,
            grace_seconds: self.grace_seconds,
            utc_offset: self.utc_offset,
        })
    }
}

#[cfg(feature = "dev-secret")]
fn missing_secret(builder: CodecConfigBuilder) -> Result<CodecConfigBuilder, ConfigError> {
    tracing::warn!(
        key = ENV_SECRET,
        "no secret configured, falling back to the development secret"
    );
    Ok(builder.with_dev_secret())
}

#[cfg(not(feature = "dev-secret"))]
fn missing_secret(_builder: CodecConfigBuilder) -> Result<CodecConfigBuilder, ConfigError> {
    Err(ConfigError::MissingRequired {
        key: ENV_SECRET.to_string(),
        hint: "set it to the secret shared by the QR and scan endpoints".to_string(),
    })
}

/// Parse `+HH:MM`, `-HH:MM`, `+HHMM`, `+HH` or `Z`.
fn parse_utc_offset(raw: &str) -> Option<FixedOffset> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("z") || raw.eq_ignore_ascii_case("utc") {
        return FixedOffset::east_opt(0);
    }

    let (sign, rest) = match raw.as_bytes().first()? {
        b'+' => (1, &raw[1..]),
        b'-' => (-1, &raw[1..]),
        _ => return None,
    };
    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let (hours, minutes) = match digits.len() {
        2 => (digits.parse::<i32>().ok()?, 0),
        4 => (digits[..2].parse::<i32>().ok()?, digits[2..].parse::<i32>().ok()?),
        _ => return None,
    };
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
