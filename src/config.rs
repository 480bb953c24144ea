//! Top-level configuration.

use serde::{Deserialize, Serialize};

use crate::search::SearchConfig;
use crate::storage::StoreConfig;
use crate::Result;

/// Everything needed to open an [`Associates`](crate::Associates) handle.
///
/// ```json
/// {
///   "store": { "kind": "memory" },
///   "search": { "retain_threshold": 0.5, "max_rounds": 256 }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssociatesConfig {
    pub store: StoreConfig,
    /// Defaults for every search. The decay threshold is overridden per call.
    pub search: SearchConfig,
}

impl AssociatesConfig {
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(raw)?;
        config.search.validate()?;
        Ok(config)
    }
}
