//! Registry configuration.
//!
//! Defaults suit a single-process deployment over the in-memory store.
//! Override via environment variables or explicit construction in tests.

use std::time::Duration;

use seal_core::DEFAULT_CODE_WIDTH;

/// Tunables for [`crate::SealRegistry`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Compare-and-swap attempts per seal before giving up with
    /// `ConcurrentModification`.
    pub max_cas_attempts: u32,
    /// Upper bound on every store call and per-prefix lock acquisition.
    pub store_timeout: Duration,
    /// Digits in the zero-padded suffix of a code.
    pub code_width: usize,
    /// Page size when a listing names none.
    pub default_page_size: usize,
    /// Largest page size a listing may request.
    pub max_page_size: usize,
    /// Largest batch one generation call may create.
    pub max_generate_batch: u64,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_cas_attempts: 3,
            store_timeout: Duration::from_secs(2),
            code_width: DEFAULT_CODE_WIDTH,
            default_page_size: 24,
            max_page_size: 1000,
            max_generate_batch: 100_000,
        }
    }
}

impl RegistryConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `SEAL_MAX_CAS_ATTEMPTS` (default: 3, at least 1)
    /// - `SEAL_STORE_TIMEOUT_MS` (default: 2000, at least 1)
    /// - `SEAL_CODE_WIDTH` (default: 6, between 1 and 18)
    /// - `SEAL_MAX_GENERATE_BATCH` (default: 100000, at least 1)
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Same as [`RegistryConfig::from_env`] over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let max_cas_attempts = parse_var(&lookup, "SEAL_MAX_CAS_ATTEMPTS", 1, u32::MAX as u64)?
            .map_or(defaults.max_cas_attempts, |v| v as u32);
        let store_timeout = parse_var(&lookup, "SEAL_STORE_TIMEOUT_MS", 1, u64::MAX)?
            .map_or(defaults.store_timeout, Duration::from_millis);
        let code_width = parse_var(&lookup, "SEAL_CODE_WIDTH", 1, 18)?
            .map_or(defaults.code_width, |v| v as usize);
        let max_generate_batch = parse_var(&lookup, "SEAL_MAX_GENERATE_BATCH", 1, u64::MAX)?
            .unwrap_or(defaults.max_generate_batch);

        Ok(Self {
            max_cas_attempts,
            store_timeout,
            code_width,
            max_generate_batch,
            ..defaults
        })
    }

    /// `store_timeout` in whole milliseconds, for error reports.
    pub fn store_timeout_ms(&self) -> u64 {
        u64::try_from(self.store_timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

fn parse_var(
    lookup: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    min: u64,
    max: u64,
) -> Result<Option<u64>, ConfigError> {
    let Some(raw) = lookup(var) else {
        return Ok(None);
    };
    let value: u64 = raw.trim().parse().map_err(|_| ConfigError::Invalid {
        var,
        value: raw.clone(),
        reason: "not a non-negative integer".to_string(),
    })?;
    if value < min || value > max {
        return Err(ConfigError::Invalid {
            var,
            value: raw,
            reason: format!("must be between {min} and {max}"),
        });
    }
    Ok(Some(value))
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let cfg = RegistryConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(cfg, RegistryConfig::default());
        assert_eq!(cfg.store_timeout_ms(), 2000);
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = RegistryConfig::from_lookup(lookup(&[
            ("SEAL_MAX_CAS_ATTEMPTS", "5"),
            ("SEAL_STORE_TIMEOUT_MS", "250"),
            ("SEAL_CODE_WIDTH", "8"),
        ]))
        .unwrap();
        assert_eq!(cfg.max_cas_attempts, 5);
        assert_eq!(cfg.store_timeout, Duration::from_millis(250));
        assert_eq!(cfg.code_width, 8);
        assert_eq!(cfg.default_page_size, 24);
    }

    #[test]
    fn rejects_garbage_and_out_of_range() {
        let err = RegistryConfig::from_lookup(lookup(&[("SEAL_CODE_WIDTH", "wide")])).unwrap_err();
        assert!(err.to_string().contains("SEAL_CODE_WIDTH"));
        assert!(RegistryConfig::from_lookup(lookup(&[("SEAL_CODE_WIDTH", "19")])).is_err());
        assert!(RegistryConfig::from_lookup(lookup(&[("SEAL_MAX_CAS_ATTEMPTS", "0")])).is_err());
    }
}
