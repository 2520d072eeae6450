//! Enumerations shared by the entities

use serde::{Deserialize, Serialize};

/// Pending persistence action of an in-memory entity, relative to storage.
///
/// Callers set it before handing the entity to a repository `save`; the
/// repository resets it to `Unchanged` once the write has completed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectState {
    #[default]
    Unchanged,
    Modified,
    Added,
    Deleted,
}
