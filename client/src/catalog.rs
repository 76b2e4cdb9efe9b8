//! [`PropertyCatalog`] definitions.

use service::{
    command::{
        create_property::{self, CreateProperty},
        delete_map::{self, DeleteMap},
        delete_property::{self, DeleteProperty},
    },
    domain::{map, property, user, GeoPoint, MapDrawing, Property, Region},
    infra::database,
    query,
    read::property::WithMaps,
    Command, Query,
};
use tracerr::Traced;
use tracing as log;

use crate::error::{Error, NotFound, Precondition, Violation};

/// [`Property`]s of the signed-in user and the selected one.
#[derive(Debug)]
pub struct PropertyCatalog<G> {
    /// Gateway to load and modify [`Property`]s with.
    gateway: G,

    /// Held [`Property`]s in creation order.
    properties: Vec<Property>,

    /// ID of the selected [`Property`], if any.
    selected: Option<property::Id>,

    /// Loaded [`MapDrawing`]s of the selected [`Property`].
    maps: Vec<MapDrawing>,
}

impl<G> PropertyCatalog<G> {
    /// Creates a new empty [`PropertyCatalog`] over the provided `gateway`.
    #[must_use]
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            properties: Vec::new(),
            selected: None,
            maps: Vec::new(),
        }
    }

    /// Returns the held [`Property`]s.
    #[must_use]
    pub fn properties(&self) -> &[Property] {
        &self.properties
    }

    /// Returns the held [`Property`] with the provided ID, if any.
    #[must_use]
    pub fn get(&self, id: property::Id) -> Option<&Property> {
        self.properties.iter().find(|p| p.id == id)
    }

    /// Returns the selected [`Property`], if any.
    #[must_use]
    pub fn selected(&self) -> Option<&Property> {
        self.selected.and_then(|id| self.get(id))
    }

    /// Returns ID of the selected [`Property`], if any.
    #[must_use]
    pub fn selected_id(&self) -> Option<property::Id> {
        self.selected
    }

    /// Returns the loaded [`MapDrawing`]s of the selected [`Property`].
    #[must_use]
    pub fn maps(&self) -> &[MapDrawing] {
        &self.maps
    }

    /// Forgets everything held.
    pub fn reset(&mut self) {
        self.properties.clear();
        self.selected = None;
        self.maps.clear();
    }

    /// Replaces the held [`Property`]s with the ones owned by the provided
    /// user.
    ///
    /// The selection is kept only if the selected [`Property`] is still
    /// there.
    ///
    /// # Errors
    ///
    /// [`Error::Persistence`] if the gateway failed, keeping the held
    /// [`Property`]s as they were.
    pub async fn load(
        &mut self,
        owner_id: user::Id,
    ) -> Result<(), Error<Traced<database::Error>>>
    where
        G: Query<
            query::properties::ByOwner,
            Ok = Vec<Property>,
            Err = Traced<database::Error>,
        >,
    {
        let properties = self
            .gateway
            .execute(query::properties::ByOwner::by(owner_id))
            .await
            .map_err(|e| {
                log::warn!("failed to load properties: {e}");
                Error::Persistence(e)
            })?;

        self.properties = properties;
        if self.selected().is_none() {
            self.deselect();
        }
        Ok(())
    }

    /// Lists all the [`Property`]s of the provided user along with their
    /// [`MapDrawing`]s.
    ///
    /// Nothing held is touched.
    ///
    /// # Errors
    ///
    /// [`Error::Persistence`] if the gateway failed.
    pub async fn overview(
        &self,
        owner_id: user::Id,
    ) -> Result<Vec<WithMaps>, Error<Traced<database::Error>>>
    where
        G: Query<
            query::properties::WithMapsByOwner,
            Ok = Vec<WithMaps>,
            Err = Traced<database::Error>,
        >,
    {
        self.gateway
            .execute(query::properties::WithMapsByOwner::by(owner_id))
            .await
            .map_err(|e| {
                log::warn!("failed to load properties overview: {e}");
                Error::Persistence(e)
            })
    }

    /// Selects the held [`Property`] with the provided ID, returning the
    /// [`Region`] framing it.
    ///
    /// # Errors
    ///
    /// [`NotFound::Property`] if there is no such [`Property`].
    pub fn select(&mut self, id: property::Id) -> Result<Region, Error> {
        let location = self.get(id).ok_or(NotFound::Property(id))?.location;

        if self.selected != Some(id) {
            self.maps.clear();
            self.selected = Some(id);
        }
        Ok(Region::bounding(&[location])
            .unwrap_or_else(|e| unreachable!("single point: {e}")))
    }

    /// Clears the selection.
    pub fn deselect(&mut self) {
        self.selected = None;
        self.maps.clear();
    }

    /// Creates a new [`Property`] and holds it.
    ///
    /// # Errors
    ///
    /// - [`Violation::InvalidName`] if the `name` is blank or too long.
    /// - [`Error::Persistence`] if the gateway failed.
    pub async fn create(
        &mut self,
        name: &str,
        location: GeoPoint,
        owner_id: user::Id,
    ) -> Result<Property, Error<Traced<create_property::ExecutionError>>>
    where
        G: Command<
            CreateProperty,
            Ok = Property,
            Err = Traced<create_property::ExecutionError>,
        >,
    {
        let name =
            property::Name::new(name.trim()).ok_or(Violation::InvalidName)?;

        let property = self
            .gateway
            .execute(CreateProperty {
                owner_id,
                name,
                location,
            })
            .await
            .map_err(|e| {
                log::warn!("failed to create property: {e}");
                Error::Persistence(e)
            })?;

        self.properties.push(property.clone());
        Ok(property)
    }

    /// Deletes the held [`Property`] with the provided ID along with its
    /// [`MapDrawing`]s.
    ///
    /// # Errors
    ///
    /// - [`NotFound::Property`] if there is no such [`Property`].
    /// - [`Error::Persistence`] if the gateway failed, keeping everything
    ///   as it was.
    pub async fn delete(
        &mut self,
        id: property::Id,
    ) -> Result<(), Error<Traced<delete_property::ExecutionError>>>
    where
        G: Command<
            DeleteProperty,
            Ok = (),
            Err = Traced<delete_property::ExecutionError>,
        >,
    {
        if self.get(id).is_none() {
            return Err(NotFound::Property(id).into());
        }

        self.gateway
            .execute(DeleteProperty { property_id: id })
            .await
            .map_err(|e| {
                log::warn!("failed to delete `Property(id: {id})`: {e}");
                Error::Persistence(e)
            })?;

        self.properties.retain(|p| p.id != id);
        if self.selected == Some(id) {
            self.deselect();
        }
        Ok(())
    }

    /// Loads the [`MapDrawing`]s of the selected [`Property`].
    ///
    /// # Errors
    ///
    /// - [`Precondition::NoPropertySelected`] if nothing is selected.
    /// - [`Error::Persistence`] if the gateway failed, keeping the loaded
    ///   [`MapDrawing`]s as they were.
    pub async fn load_maps(
        &mut self,
    ) -> Result<&[MapDrawing], Error<Traced<database::Error>>>
    where
        G: Query<
            query::maps::ByProperty,
            Ok = Vec<MapDrawing>,
            Err = Traced<database::Error>,
        >,
    {
        let id = self.selected.ok_or(Precondition::NoPropertySelected)?;

        self.maps = self
            .gateway
            .execute(query::maps::ByProperty::by(id))
            .await
            .map_err(|e| {
                log::warn!(
                    "failed to load maps of `Property(id: {id})`: {e}",
                );
                Error::Persistence(e)
            })?;
        Ok(&self.maps)
    }

    /// Returns the [`Region`] framing the loaded [`MapDrawing`] with the
    /// provided ID.
    ///
    /// # Errors
    ///
    /// [`NotFound::Map`] if there is no such loaded [`MapDrawing`].
    pub fn frame_map(&self, id: map::Id) -> Result<Region, Error> {
        self.maps
            .iter()
            .find(|m| m.id == id)
            .map(MapDrawing::region)
            .ok_or_else(|| NotFound::Map(id).into())
    }

    /// Deletes the loaded [`MapDrawing`] with the provided ID.
    ///
    /// # Errors
    ///
    /// - [`Precondition::NoPropertySelected`] if nothing is selected.
    /// - [`NotFound::Map`] if there is no such loaded [`MapDrawing`].
    /// - [`Error::Persistence`] if the gateway failed.
    pub async fn delete_map(
        &mut self,
        id: map::Id,
    ) -> Result<(), Error<Traced<delete_map::ExecutionError>>>
    where
        G: Command<
            DeleteMap,
            Ok = (),
            Err = Traced<delete_map::ExecutionError>,
        >,
    {
        let property_id =
            self.selected.ok_or(Precondition::NoPropertySelected)?;
        if !self.maps.iter().any(|m| m.id == id) {
            return Err(NotFound::Map(id).into());
        }

        self.gateway
            .execute(DeleteMap {
                property_id,
                map_id: id,
            })
            .await
            .map_err(|e| {
                log::warn!("failed to delete `MapDrawing(id: {id})`: {e}");
                Error::Persistence(e)
            })?;

        self.maps.retain(|m| m.id != id);
        Ok(())
    }

    /// Adds the provided just saved [`MapDrawing`] to the loaded ones, if it
    /// belongs to the selected [`Property`].
    pub(crate) fn record_map(&mut self, map: MapDrawing) {
        if self.selected == Some(map.property_id) {
            self.maps.push(map);
        }
    }
}

#[cfg(test)]
mod spec {
    use common::{
        operations::{By, Delete, Insert, Select},
        DateTime,
    };
    use service::{
        command::{CreateMap, CreateProperty},
        domain::{map, property, user, GeoPoint, MapDrawing, Property, Region},
        infra::{memory::Step, Database as _, Memory},
        Service,
    };

    use crate::error::{Error, NotFound, Precondition, Violation};

    use super::PropertyCatalog;

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    fn owner() -> user::Id {
        user::Id::new("owner").unwrap()
    }

    async fn catalog_with(
        names: &[&str],
    ) -> (Service<Memory>, PropertyCatalog<Service<Memory>>) {
        let service = Service::new(Memory::new());
        let mut catalog = PropertyCatalog::new(service.clone());
        for (i, name) in (0_u8..).zip(names) {
            _ = catalog
                .create(name, point(f64::from(i), 0.0), owner())
                .await
                .unwrap();
        }
        (service, catalog)
    }

    async fn add_map(service: &Service<Memory>, property_id: property::Id) {
        _ = service
            .execute(CreateMap {
                property_id,
                owner_id: owner(),
                polygon: map::Polygon::new(vec![
                    point(10.0, 10.0),
                    point(10.0, 12.0),
                    point(14.0, 12.0),
                ])
                .unwrap(),
                description: map::Description::new("north field").unwrap(),
                kind: None,
            })
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn loads_owned_properties() {
        let (service, _) = catalog_with(&["A", "B"]).await;
        _ = service
            .execute(CreateProperty {
                owner_id: user::Id::new("stranger").unwrap(),
                name: property::Name::new("C").unwrap(),
                location: point(0.0, 0.0),
            })
            .await
            .unwrap();

        let mut catalog = PropertyCatalog::new(service);
        catalog.load(owner()).await.unwrap();

        let names = catalog
            .properties()
            .iter()
            .map(|p| p.name.to_string())
            .collect::<Vec<_>>();
        assert_eq!(names, ["A", "B"]);
    }

    #[tokio::test]
    async fn keeps_properties_when_load_fails() {
        let (service, mut catalog) = catalog_with(&["A"]).await;
        service.database().disconnect();

        assert!(matches!(
            catalog.load(owner()).await,
            Err(Error::Persistence(_)),
        ));
        assert_eq!(catalog.properties().len(), 1);
    }

    #[tokio::test]
    async fn clears_vanished_selection_on_load() {
        let (service, mut catalog) = catalog_with(&["A", "B"]).await;
        let a = catalog.properties()[0].clone();
        let b = catalog.properties()[1].clone();
        _ = catalog.select(a.id).unwrap();

        catalog.load(owner()).await.unwrap();
        assert_eq!(catalog.selected_id(), Some(a.id));

        service
            .database()
            .execute(Delete(By::<Property, _>::new(a.id)))
            .await
            .unwrap();
        catalog.load(owner()).await.unwrap();

        assert_eq!(catalog.selected_id(), None);
        assert_eq!(catalog.properties(), [b]);
    }

    #[tokio::test]
    async fn selects_held_property() {
        let (_, mut catalog) = catalog_with(&["A"]).await;
        let a = catalog.properties()[0].clone();

        let region = catalog.select(a.id).unwrap();

        assert_eq!(Some(region), Region::new(a.location, 0.05, 0.05));
        assert_eq!(catalog.selected(), Some(&a));

        let missing = property::Id::new();
        assert!(matches!(
            catalog.select(missing),
            Err(Error::NotFound(NotFound::Property(id))) if id == missing,
        ));
        assert_eq!(catalog.selected_id(), Some(a.id));
    }

    #[tokio::test]
    async fn rejects_blank_names() {
        let (_, mut catalog) = catalog_with(&[]).await;

        assert!(matches!(
            catalog.create("   ", point(0.0, 0.0), owner()).await,
            Err(Error::Validation(Violation::InvalidName)),
        ));
        assert!(catalog.properties().is_empty());

        let created = catalog
            .create("  Sítio  ", point(0.0, 0.0), owner())
            .await
            .unwrap();
        assert_eq!(created.name.to_string(), "Sítio");
    }

    #[tokio::test]
    async fn deletes_property_with_maps() {
        let (service, mut catalog) = catalog_with(&["A", "B"]).await;
        let a = catalog.properties()[0].id;
        add_map(&service, a).await;
        _ = catalog.select(a).unwrap();

        catalog.delete(a).await.unwrap();

        assert_eq!(catalog.properties().len(), 1);
        assert_eq!(catalog.selected_id(), None);
        let maps = service
            .database()
            .execute(Select(By::<Vec<MapDrawing>, _>::new(a)))
            .await
            .unwrap();
        assert!(maps.is_empty());
    }

    #[tokio::test]
    async fn deletes_only_held_properties() {
        let (_, mut catalog) = catalog_with(&["A"]).await;
        let missing = property::Id::new();

        assert!(matches!(
            catalog.delete(missing).await,
            Err(Error::NotFound(NotFound::Property(id))) if id == missing,
        ));
        assert_eq!(catalog.properties().len(), 1);
    }

    #[tokio::test]
    async fn keeps_everything_when_cascade_is_interrupted() {
        let (service, mut catalog) = catalog_with(&["A"]).await;
        let a = catalog.properties()[0].id;
        add_map(&service, a).await;
        _ = catalog.select(a).unwrap();

        service.database().disconnect_before(Step::DeleteProperty);
        assert!(matches!(
            catalog.delete(a).await,
            Err(Error::Persistence(_)),
        ));

        assert_eq!(catalog.properties().len(), 1);
        assert_eq!(catalog.selected_id(), Some(a));

        service.database().reconnect();
        let maps = service
            .database()
            .execute(Select(By::<Vec<MapDrawing>, _>::new(a)))
            .await
            .unwrap();
        assert_eq!(maps.len(), 1);
    }

    #[tokio::test]
    async fn loads_and_frames_maps_of_selection() {
        let (service, mut catalog) = catalog_with(&["A", "B"]).await;
        let (a, b) = (catalog.properties()[0].id, catalog.properties()[1].id);
        add_map(&service, a).await;

        assert!(matches!(
            catalog.load_maps().await,
            Err(Error::Precondition(Precondition::NoPropertySelected)),
        ));

        _ = catalog.select(a).unwrap();
        let id = catalog.load_maps().await.unwrap()[0].id;
        let region = catalog.frame_map(id).unwrap();
        assert_eq!(region.center_latitude(), 12.0);
        assert_eq!(region.center_longitude(), 11.0);
        assert_eq!(region.latitude_span(), 6.0);
        assert_eq!(region.longitude_span(), 3.0);

        _ = catalog.select(b).unwrap();
        assert!(catalog.maps().is_empty());
        assert!(matches!(
            catalog.frame_map(id),
            Err(Error::NotFound(NotFound::Map(_))),
        ));
    }

    #[tokio::test]
    async fn deletes_loaded_maps() {
        let (service, mut catalog) = catalog_with(&["A"]).await;
        let a = catalog.properties()[0].id;
        add_map(&service, a).await;
        add_map(&service, a).await;
        _ = catalog.select(a).unwrap();
        let id = catalog.load_maps().await.unwrap()[0].id;

        catalog.delete_map(id).await.unwrap();

        assert_eq!(catalog.maps().len(), 1);
        assert_eq!(catalog.load_maps().await.unwrap().len(), 1);
        assert!(matches!(
            catalog.delete_map(id).await,
            Err(Error::NotFound(NotFound::Map(_))),
        ));
    }

    #[tokio::test]
    async fn inserts_are_visible_after_reload() {
        let (service, mut catalog) = catalog_with(&[]).await;
        let property = Property {
            id: property::Id::new(),
            owner_id: owner(),
            name: property::Name::new("Elsewhere").unwrap(),
            location: point(1.0, 1.0),
            created_at: DateTime::now().coerce(),
        };
        service
            .database()
            .execute(Insert(property.clone()))
            .await
            .unwrap();

        catalog.load(owner()).await.unwrap();

        assert_eq!(catalog.properties(), [property]);
    }
}
