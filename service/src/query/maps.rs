//! [`Query`] collection related to the [`MapDrawing`]s of a [`Property`].

use common::operations::By;

use crate::domain::{property, MapDrawing};
#[cfg(doc)]
use crate::{domain::Property, Query};

use super::DatabaseQuery;

/// Queries all the [`MapDrawing`]s of a [`Property`], in creation order.
pub type ByProperty = DatabaseQuery<By<Vec<MapDrawing>, property::Id>>;
