//! Person vertices: create, read, wholesale replace, list.

use tracing::info;

use crate::model::{PropertyMap, Vertex, VertexId};
use crate::storage::GraphStore;
use crate::{Error, Result};

/// Create a person with all of its properties in a single store call.
///
/// Fails with `InvalidArgument` for an empty id and `Conflict` when the id
/// is already taken.
pub async fn create_person<S: GraphStore>(
    store: &S,
    tx: &mut S::Tx,
    id: VertexId,
    properties: PropertyMap,
) -> Result<Vertex> {
    if id.as_str().is_empty() {
        return Err(Error::InvalidArgument("person id must not be empty".into()));
    }
    let vertex = store.create_vertex(tx, id, properties).await?;
    info!(person = %vertex.id, properties = vertex.properties.len(), "created person");
    Ok(vertex)
}

/// Load a person or fail with `NotFound`.
pub async fn get_person<S: GraphStore>(store: &S, tx: &S::Tx, id: &VertexId) -> Result<Vertex> {
    store
        .get_vertex(tx, id)
        .await?
        .ok_or_else(|| Error::NotFound(id.to_string()))
}

/// Replace every property of a person. Keys absent from `properties` are
/// removed.
pub async fn replace_person<S: GraphStore>(
    store: &S,
    tx: &mut S::Tx,
    id: &VertexId,
    properties: PropertyMap,
) -> Result<()> {
    get_person(store, tx, id).await?;
    store.replace_vertex_properties(tx, id, properties).await?;
    info!(person = %id, "replaced person properties");
    Ok(())
}

/// Every person in the store.
pub async fn list_persons<S: GraphStore>(store: &S, tx: &S::Tx) -> Result<Vec<Vertex>> {
    store.all_vertices(tx).await
}
