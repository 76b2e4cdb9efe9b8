//! [`Command`] for deleting a [`MapDrawing`].

use common::operations::{By, Commit, Delete, Select, Transact, Transacted};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{map, property, MapDrawing},
    infra::{database, Database},
    Service,
};
#[cfg(doc)]
use crate::domain::Property;

use super::Command;

/// [`Command`] for deleting a [`MapDrawing`].
#[derive(Clone, Copy, Debug)]
pub struct DeleteMap {
    /// ID of the [`Property`] the [`MapDrawing`] belongs to.
    pub property_id: property::Id,

    /// ID of the [`MapDrawing`] to be deleted.
    pub map_id: map::Id,
}

impl<Db> Command<DeleteMap> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<MapDrawing>, (property::Id, map::Id)>>,
            Ok = Option<MapDrawing>,
            Err = Traced<database::Error>,
        > + Database<
            Delete<By<MapDrawing, (property::Id, map::Id)>>,
            Err = Traced<database::Error>,
        > + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = ();
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: DeleteMap) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeleteMap {
            property_id,
            map_id,
        } = cmd;

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        tx.execute(Select(By::<Option<MapDrawing>, _>::new((
            property_id,
            map_id,
        ))))
        .await
        .map_err(tracerr::map_from_and_wrap!(=> E))?
        .ok_or(E::MapNotExists(map_id))
        .map_err(tracerr::wrap!())
        .map(drop)?;

        tx.execute(Delete(By::<MapDrawing, _>::new((property_id, map_id))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)
    }
}

/// Error of [`DeleteMap`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`MapDrawing`] with the provided ID does not exist.
    #[display("`MapDrawing(id: {_0})` does not exist")]
    MapNotExists(#[error(not(source))] map::Id),
}
