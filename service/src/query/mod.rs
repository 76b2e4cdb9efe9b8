//! [`Query`] definition.

pub mod maps;
pub mod properties;

use common::operations::{By, Select};
use tracerr::Traced;

use crate::{
    infra::{database, Database},
    Service,
};

/// [`Query`] of the [`Service`].
pub use common::Handler as Query;

/// [`Query`] [`Select`]ing a `T`ype from a [`Database`].
#[derive(Clone, Copy, Debug)]
#[expect(clippy::module_name_repetitions, reason = "more readable")]
pub struct DatabaseQuery<T>(T);

impl<W, B> DatabaseQuery<By<W, B>> {
    /// Creates a new [`DatabaseQuery`] selecting a `W` by the provided `B`.
    #[must_use]
    pub fn by(by: B) -> Self {
        Self(By::new(by))
    }
}

impl<Db, W, B> Query<DatabaseQuery<By<W, B>>> for Service<Db>
where
    Db: Database<Select<By<W, B>>, Ok = W, Err = Traced<database::Error>>,
{
    type Ok = W;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        DatabaseQuery(by): DatabaseQuery<By<W, B>>,
    ) -> Result<Self::Ok, Self::Err> {
        self.database()
            .execute(Select(by))
            .await
            .map_err(tracerr::wrap!())
    }
}

#[cfg(test)]
mod spec {
    use crate::{
        command::{CreateMap, CreateProperty},
        domain::{map, property, user, GeoPoint},
        infra::Memory,
        Query as _, Service,
    };

    use super::{maps, properties};

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    fn create(owner: &str, name: &str) -> CreateProperty {
        CreateProperty {
            owner_id: user::Id::new(owner).unwrap(),
            name: property::Name::new(name).unwrap(),
            location: point(-24.56, -54.06),
        }
    }

    #[tokio::test]
    async fn lists_properties_of_owner_in_creation_order() {
        let service = Service::new(Memory::new());
        let a = service.execute(create("alice", "A")).await.unwrap();
        _ = service.execute(create("bob", "B")).await.unwrap();
        let c = service.execute(create("alice", "C")).await.unwrap();

        let listed = service
            .execute(properties::ByOwner::by(user::Id::new("alice").unwrap()))
            .await
            .unwrap();

        assert_eq!(listed, vec![a, c]);
    }

    #[tokio::test]
    async fn lists_maps_of_property() {
        let service = Service::new(Memory::new());
        let a = service.execute(create("alice", "A")).await.unwrap();
        let b = service.execute(create("alice", "B")).await.unwrap();
        let map = service
            .execute(CreateMap {
                property_id: a.id,
                owner_id: a.owner_id.clone(),
                polygon: map::Polygon::new(vec![
                    point(0.0, 0.0),
                    point(0.0, 1.0),
                    point(1.0, 1.0),
                ])
                .unwrap(),
                description: map::Description::new("north field").unwrap(),
                kind: None,
            })
            .await
            .unwrap();

        let of_a = service.execute(maps::ByProperty::by(a.id)).await.unwrap();
        let of_b = service.execute(maps::ByProperty::by(b.id)).await.unwrap();

        assert_eq!(of_a, vec![map]);
        assert!(of_b.is_empty());
    }

    #[tokio::test]
    async fn lists_properties_of_owner_with_their_maps() {
        let service = Service::new(Memory::new());
        let a = service.execute(create("alice", "A")).await.unwrap();
        _ = service.execute(create("bob", "B")).await.unwrap();
        let c = service.execute(create("alice", "C")).await.unwrap();
        let map = service
            .execute(CreateMap {
                property_id: c.id,
                owner_id: c.owner_id.clone(),
                polygon: map::Polygon::new(vec![
                    point(0.0, 0.0),
                    point(0.0, 1.0),
                    point(1.0, 1.0),
                ])
                .unwrap(),
                description: map::Description::new("pasture").unwrap(),
                kind: None,
            })
            .await
            .unwrap();

        let overview = service
            .execute(properties::WithMapsByOwner::by(
                user::Id::new("alice").unwrap(),
            ))
            .await
            .unwrap();

        assert_eq!(overview.len(), 2);
        assert_eq!(overview[0].property, a);
        assert!(overview[0].maps.is_empty());
        assert_eq!(overview[1].property, c);
        assert_eq!(overview[1].maps, vec![map]);
    }
}
