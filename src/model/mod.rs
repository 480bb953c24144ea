//! # Property Graph Model
//!
//! Plain DTOs for the person/knows graph. These types cross every
//! boundary: store ↔ search engine ↔ caller.
//!
//! This module is pure data — no I/O, no state, no async.

pub mod vertex;
pub mod edge;
pub mod value;
pub mod property_map;

pub use vertex::{Vertex, VertexId};
pub use edge::{Edge, EdgeId, validate_weight};
pub use value::Value;
pub use property_map::PropertyMap;

/// Label carried by every relationship the associate search walks.
pub const KNOWS: &str = "knows";
