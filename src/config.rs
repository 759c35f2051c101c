// =====================================================================
// File: config.rs
//
// Description:
//   Startup configuration for the `ordtrees` shell. The only setting is
//   the B-tree order, resolved in this order:
//
//     1. First command-line argument, if given.
//     2. `ORDTREES_ORDER` environment variable, if set.
//     3. `DEFAULT_ORDER` (5).
//
// Notes:
//   * The value is checked against `MIN_ORDER` here so the binary can
//     report a bad setting before any tree is built.
// =====================================================================
use std::env;

use thiserror::Error;

use crate::btree::{DEFAULT_ORDER, MIN_ORDER};

/// Environment variable holding the B-tree order.
pub const ORDER_ENV: &str = "ORDTREES_ORDER";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{source_name} must be an integer, got {value:?}")]
    NotAnInteger { source_name: String, value: String },

    #[error("{source_name} must be at least {min}, got {order}")]
    OrderTooSmall {
        source_name: String,
        order: usize,
        min: usize,
    },
}

/// Settings for one shell session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShellConfig {
    pub order: usize,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            order: DEFAULT_ORDER,
        }
    }
}

impl ShellConfig {
    /// Resolve the configuration from the process arguments and
    /// environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let arg = env::args().nth(1);
        Self::resolve(arg.as_deref(), |key| env::var(key).ok())
    }

    /// Resolve from an explicit argument and a variable lookup.
    ///
    /// # Example
    /// ```
    /// use ordtrees::ShellConfig;
    /// let config = ShellConfig::resolve(Some("7"), |_| None).unwrap();
    /// assert_eq!(config.order, 7);
    /// ```
    pub fn resolve<F>(arg: Option<&str>, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let (source_name, raw) = match arg {
            Some(value) => ("order argument".to_string(), value.to_string()),
            None => match lookup(ORDER_ENV) {
                Some(value) => (ORDER_ENV.to_string(), value),
                None => return Ok(Self::default()),
            },
        };

        let order: usize = raw.trim().parse().map_err(|_| ConfigError::NotAnInteger {
            source_name: source_name.clone(),
            value: raw.clone(),
        })?;
        if order < MIN_ORDER {
            return Err(ConfigError::OrderTooSmall {
                source_name,
                order,
                min: MIN_ORDER,
            });
        }
        Ok(Self { order })
    }
}


// =====================================================================
// Unit Tests for ShellConfig
// =====================================================================
