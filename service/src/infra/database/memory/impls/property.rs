//! [`Property`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{property, user, Property},
    infra::{
        database::{
            self,
            memory::{Connection, Step},
            Memory,
        },
        Database,
    },
    read::property::WithMaps,
};

impl<C> Database<Select<By<Vec<Property>, user::Id>>> for Memory<C>
where
    C: Connection,
{
    type Ok = Vec<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Property>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let owner_id = by.into_inner();
        self.with_store(None, |store| {
            store
                .properties
                .iter()
                .filter(|p| p.owner_id == owner_id)
                .cloned()
                .collect()
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Vec<WithMaps>, user::Id>>> for Memory<C>
where
    C: Connection,
{
    type Ok = Vec<WithMaps>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<WithMaps>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let owner_id = by.into_inner();
        self.with_store(None, |store| {
            store
                .properties
                .iter()
                .filter(|p| p.owner_id == owner_id)
                .map(|p| WithMaps {
                    property: p.clone(),
                    maps: store.maps.get(&p.id).cloned().unwrap_or_default(),
                })
                .collect()
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Option<Property>, property::Id>>> for Memory<C>
where
    C: Connection,
{
    type Ok = Option<Property>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Property>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.with_store(None, |store| {
            store.properties.iter().find(|p| p.id == id).cloned()
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Insert<Property>> for Memory<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(property): Insert<Property>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with_store(Some(Step::InsertProperty), |store| {
            if let Some(existing) =
                store.properties.iter_mut().find(|p| p.id == property.id)
            {
                *existing = property;
            } else {
                store.properties.push(property);
            }
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Delete<By<Property, property::Id>>> for Memory<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Property, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        self.with_store(Some(Step::DeleteProperty), |store| {
            store.properties.retain(|p| p.id != id);
        })
        .await
        .map_err(tracerr::wrap!())
    }
}
