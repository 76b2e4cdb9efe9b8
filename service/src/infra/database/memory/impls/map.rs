//! [`MapDrawing`]-related [`Database`] implementations.

use common::operations::{By, Delete, Insert, Select};
use tracerr::Traced;

use crate::{
    domain::{map, property, MapDrawing},
    infra::{
        database::{
            self,
            memory::{Connection, Step},
            Memory,
        },
        Database,
    },
};

impl<C> Database<Select<By<Vec<MapDrawing>, property::Id>>> for Memory<C>
where
    C: Connection,
{
    type Ok = Vec<MapDrawing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<MapDrawing>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let property_id = by.into_inner();
        self.with_store(None, |store| {
            store.maps.get(&property_id).cloned().unwrap_or_default()
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Select<By<Option<MapDrawing>, (property::Id, map::Id)>>>
    for Memory<C>
where
    C: Connection,
{
    type Ok = Option<MapDrawing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<MapDrawing>, (property::Id, map::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (property_id, map_id) = by.into_inner();
        self.with_store(None, |store| {
            store
                .maps
                .get(&property_id)
                .and_then(|maps| maps.iter().find(|m| m.id == map_id))
                .cloned()
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Insert<MapDrawing>> for Memory<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(map): Insert<MapDrawing>,
    ) -> Result<Self::Ok, Self::Err> {
        self.with_store(Some(Step::InsertMap), |store| {
            let maps = store.maps.entry(map.property_id).or_default();
            if let Some(existing) = maps.iter_mut().find(|m| m.id == map.id) {
                *existing = map;
            } else {
                maps.push(map);
            }
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Delete<By<Vec<MapDrawing>, property::Id>>> for Memory<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<Vec<MapDrawing>, property::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let property_id = by.into_inner();
        self.with_store(Some(Step::DeleteMaps), |store| {
            _ = store.maps.remove(&property_id);
        })
        .await
        .map_err(tracerr::wrap!())
    }
}

impl<C> Database<Delete<By<MapDrawing, (property::Id, map::Id)>>>
    for Memory<C>
where
    C: Connection,
{
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Delete(by): Delete<By<MapDrawing, (property::Id, map::Id)>>,
    ) -> Result<Self::Ok, Self::Err> {
        let (property_id, map_id) = by.into_inner();
        self.with_store(Some(Step::DeleteMap), |store| {
            if let Some(maps) = store.maps.get_mut(&property_id) {
                maps.retain(|m| m.id != map_id);
            }
        })
        .await
        .map_err(tracerr::wrap!())
    }
}
