//! [`Command`] definition.

pub mod create_map;
pub mod create_property;
pub mod delete_map;
pub mod delete_property;

/// [`Command`] of the [`Service`].
///
/// [`Service`]: crate::Service
pub use common::Handler as Command;

pub use self::{
    create_map::CreateMap, create_property::CreateProperty,
    delete_map::DeleteMap, delete_property::DeleteProperty,
};
