//! Graph Configuration
//!
//! Each graph carries its own [`DepsgraphConfig`]. The process-wide default
//! comes from the `DEPSGRAPH_DEBUG` environment variable, read once, and is
//! only consulted when a configuration is built from defaults and for tag
//! calls that have no graph at all.

use std::str::FromStr;
use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

use crate::error::{DepsgraphError, Result};

/// Environment variable holding the process-wide debug flags.
pub const DEBUG_ENV_VAR: &str = "DEPSGRAPH_DEBUG";

bitflags::bitflags! {
    /// Debug output switches of a graph.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct DebugFlags: u32 {
        /// Log every tag call.
        const TAG = 1 << 0;
        /// Report tags that arrive while the graph is evaluating.
        const EVAL = 1 << 1;
    }
}

static PROCESS_DEFAULT: OnceLock<DebugFlags> = OnceLock::new();

impl DebugFlags {
    /// The process-wide default, read from [`DEBUG_ENV_VAR`] on first use.
    ///
    /// An unparsable value is reported and treated as no flags.
    pub fn process_default() -> DebugFlags {
        *PROCESS_DEFAULT.get_or_init(|| match std::env::var(DEBUG_ENV_VAR) {
            Ok(value) => value.parse().unwrap_or_else(|err| {
                tracing::warn!("Ignoring {}: {}", DEBUG_ENV_VAR, err);
                DebugFlags::empty()
            }),
            Err(_) => DebugFlags::empty(),
        })
    }
}

impl FromStr for DebugFlags {
    type Err = DepsgraphError;

    /// Parse a comma or `|` separated list of flag names, e.g. `"tag,eval"`.
    fn from_str(value: &str) -> Result<Self> {
        let mut flags = DebugFlags::empty();
        for name in value.split([',', '|']).map(str::trim).filter(|name| !name.is_empty()) {
            flags |= match name.to_ascii_lowercase().as_str() {
                "tag" => DebugFlags::TAG,
                "eval" => DebugFlags::EVAL,
                "all" => DebugFlags::all(),
                _ => return Err(DepsgraphError::UnknownDebugFlag(name.to_string())),
            };
        }
        Ok(flags)
    }
}

/// Configuration of a single graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepsgraphConfig {
    /// Human-readable name, used in logs.
    pub name: String,

    pub debug: DebugFlags,
}

impl DepsgraphConfig {
    /// Configuration with the given name and the process-wide debug flags.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_debug(mut self, debug: DebugFlags) -> Self {
        self.debug = debug;
        self
    }

    /// Parse a configuration from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for DepsgraphConfig {
    fn default() -> Self {
        Self {
            name: "Depsgraph".to_string(),
            debug: DebugFlags::process_default(),
        }
    }
}
