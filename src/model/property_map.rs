//! PropertyMap — the key-value bag on a vertex.

use std::collections::HashMap;
use super::Value;

/// A map of property names to scalar values.
///
/// Replaced wholesale on update; there is no merge.
pub type PropertyMap = HashMap<String, Value>;
