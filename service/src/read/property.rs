//! [`Property`] read model definitions.

use crate::domain::{MapDrawing, Property};

/// [`Property`] along with all its [`MapDrawing`]s.
#[derive(Clone, Debug, PartialEq)]
pub struct WithMaps {
    /// The [`Property`] itself.
    pub property: Property,

    /// [`MapDrawing`]s of the [`Property`] in creation order.
    pub maps: Vec<MapDrawing>,
}
