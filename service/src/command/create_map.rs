//! [`Command`] for creating a new [`MapDrawing`] of a [`Property`].

use common::{
    operations::{By, Commit, Insert, Select, Transact, Transacted},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{map, property, user, MapDrawing, Property},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a new [`MapDrawing`] of a [`Property`].
#[derive(Clone, Debug)]
pub struct CreateMap {
    /// ID of the [`Property`] a new [`MapDrawing`] belongs to.
    pub property_id: property::Id,

    /// ID of the user drawing a new [`MapDrawing`].
    pub owner_id: user::Id,

    /// [`map::Polygon`] of a new [`MapDrawing`].
    pub polygon: map::Polygon,

    /// [`map::Description`] of a new [`MapDrawing`].
    pub description: map::Description,

    /// Optional [`map::Kind`] of a new [`MapDrawing`].
    pub kind: Option<map::Kind>,
}

impl<Db> Command<CreateMap> for Service<Db>
where
    Db: Database<Transact, Err = Traced<database::Error>>,
    Transacted<Db>: Database<
            Select<By<Option<Property>, property::Id>>,
            Ok = Option<Property>,
            Err = Traced<database::Error>,
        > + Database<Insert<MapDrawing>, Err = Traced<database::Error>>
        + Database<Commit, Err = Traced<database::Error>>,
{
    type Ok = MapDrawing;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CreateMap) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CreateMap {
            property_id,
            owner_id,
            polygon,
            description,
            kind,
        } = cmd;

        let map = MapDrawing {
            id: map::Id::new(),
            owner_id,
            property_id,
            polygon,
            description,
            kind,
            created_at: DateTime::now().coerce(),
        };

        let tx = self
            .database()
            .execute(Transact)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Parent may have been deleted meanwhile.
        tx.execute(Select(By::<Option<Property>, _>::new(property_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::PropertyNotExists(property_id))
            .map_err(tracerr::wrap!())
            .map(drop)?;

        tx.execute(Insert(map.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;
        tx.execute(Commit)
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))
            .map(drop)?;

        log::debug!(
            "`MapDrawing(id: {})` of `Property(id: {property_id})` created \
             with {} points",
            map.id,
            map.polygon.len(),
        );
        Ok(map)
    }
}

/// Error of [`CreateMap`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    #[from]
    Db(database::Error),

    /// [`Property`] with the provided ID does not exist.
    #[display("`Property(id: {_0})` does not exist")]
    PropertyNotExists(#[error(not(source))] property::Id),
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Insert, Select},
        DateTime,
    };

    use crate::{
        domain::{map, property, user, GeoPoint, MapDrawing, Property},
        infra::{memory::Step, Database, Memory},
        Service,
    };

    use super::{CreateMap, ExecutionError};

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    fn cmd(property_id: property::Id) -> CreateMap {
        CreateMap {
            property_id,
            owner_id: user::Id::new("owner").unwrap(),
            polygon: map::Polygon::new(vec![
                point(-24.5, -54.0),
                point(-24.6, -54.0),
                point(-24.6, -54.1),
            ])
            .unwrap(),
            description: map::Description::new("north field").unwrap(),
            kind: map::Kind::new("pasture"),
        }
    }

    async fn seed(db: &Memory) -> property::Id {
        let property = Property {
            id: property::Id::new(),
            owner_id: user::Id::new("owner").unwrap(),
            name: property::Name::new("Fazenda").unwrap(),
            location: point(-24.56, -54.06),
            created_at: DateTime::now().coerce(),
        };
        db.execute(Insert(property.clone())).await.unwrap();
        property.id
    }

    async fn maps(db: &Memory, id: property::Id) -> Vec<MapDrawing> {
        db.execute(Select(By::<Vec<MapDrawing>, _>::new(id)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn appends_to_sub_collection() {
        let service = Service::new(Memory::new());
        let property_id = seed(service.database()).await;

        let first = service.execute(cmd(property_id)).await.unwrap();
        let second = service.execute(cmd(property_id)).await.unwrap();

        assert_eq!(first.description.to_string(), "north field");
        assert_eq!(first.kind, map::Kind::new("pasture"));
        assert_eq!(
            maps(service.database(), property_id).await,
            vec![first, second],
        );
    }

    #[tokio::test]
    async fn fails_on_missing_property() {
        let service = Service::new(Memory::new());
        let id = property::Id::new();

        let err = service.execute(cmd(id)).await.unwrap_err();

        let err: &ExecutionError = err.as_ref();
        assert!(matches!(
            err,
            ExecutionError::PropertyNotExists(e) if *e == id,
        ));
        assert!(maps(service.database(), id).await.is_empty());
    }

    #[tokio::test]
    async fn persists_nothing_on_failure() {
        let service = Service::new(Memory::new());
        let property_id = seed(service.database()).await;

        service.database().disconnect_before(Step::InsertMap);
        let err = service.execute(cmd(property_id)).await.unwrap_err();
        let err: &ExecutionError = err.as_ref();
        assert!(matches!(err, ExecutionError::Db(_)));

        service.database().reconnect();
        assert!(maps(service.database(), property_id).await.is_empty());
    }
}
