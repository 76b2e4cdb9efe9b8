//! [`Query`] collection related to the multiple [`Property`].

use common::operations::By;

use crate::{
    domain::{user, Property},
    read::property::WithMaps,
};
#[cfg(doc)]
use crate::Query;

use super::DatabaseQuery;

/// Queries all the [`Property`] owned by a user, in creation order.
pub type ByOwner = DatabaseQuery<By<Vec<Property>, user::Id>>;

/// Queries all the [`Property`] owned by a user along with their maps, in
/// creation order.
pub type WithMapsByOwner = DatabaseQuery<By<Vec<WithMaps>, user::Id>>;
