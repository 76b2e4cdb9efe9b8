//! Client-side state of drawing property maps.
//!
//! [`PropertyCatalog`] holds the signed-in user's properties and the selected
//! one, while [`DrawingSession`] traces a polygon over the selected property
//! and saves it. [`Client`] combines both and reacts to [`auth::Event`]s.
#![deny(
    nonstandard_style,
    rust_2018_idioms,
    rustdoc::all,
    trivial_casts,
    trivial_numeric_casts,
    unsafe_code
)]
#![forbid(non_ascii_idents)]
#![warn(
    clippy::allow_attributes,
    clippy::allow_attributes_without_reason,
    clippy::pedantic,
    clippy::wildcard_enum_match_arm,
    deprecated_in_future,
    missing_copy_implementations,
    missing_debug_implementations,
    missing_docs,
    unreachable_pub,
    unused_crate_dependencies,
    unused_import_braces,
    unused_labels,
    unused_lifetimes,
    unused_qualifications,
    unused_results
)]

pub mod auth;
pub mod catalog;
pub mod drawing;
pub mod error;

use std::future::Future;

use service::{
    command::{create_map, create_property, delete_map, delete_property},
    domain::{map, property, user, GeoPoint, MapDrawing, Property, Region},
    infra::database,
    query,
    read::property::WithMaps,
    Command, Query,
};
use tracerr::Traced;
use tracing as log;

pub use self::{
    catalog::PropertyCatalog,
    drawing::{DrawingSession, Mode, Toggle},
    error::Error,
};

/// Signed-in user's [`PropertyCatalog`] and [`DrawingSession`] over the
/// same gateway.
#[derive(Debug)]
pub struct Client<G> {
    /// Owner the [`Client`] acts on behalf of, if signed in.
    owner_id: Option<user::Id>,

    /// [`PropertyCatalog`] of the signed-in owner.
    catalog: PropertyCatalog<G>,

    /// [`DrawingSession`] over the selected [`Property`].
    drawing: DrawingSession<G>,
}

impl<G: Clone> Client<G> {
    /// Creates a new signed-out [`Client`] over the provided `gateway`.
    #[must_use]
    pub fn new(gateway: G) -> Self {
        Self {
            owner_id: None,
            catalog: PropertyCatalog::new(gateway.clone()),
            drawing: DrawingSession::new(gateway),
        }
    }
}

impl<G> Client<G> {
    /// Returns ID of the signed-in owner, if any.
    #[must_use]
    pub fn owner_id(&self) -> Option<&user::Id> {
        self.owner_id.as_ref()
    }

    /// Returns the [`PropertyCatalog`] of this [`Client`].
    #[must_use]
    pub fn catalog(&self) -> &PropertyCatalog<G> {
        &self.catalog
    }

    /// Returns the [`DrawingSession`] of this [`Client`].
    #[must_use]
    pub fn drawing(&self) -> &DrawingSession<G> {
        &self.drawing
    }

    /// Returns the [`DrawingSession`] of this [`Client`] for editing.
    pub fn drawing_mut(&mut self) -> &mut DrawingSession<G> {
        &mut self.drawing
    }

    /// Reacts to the provided [`auth::Event`].
    ///
    /// Both components are reset on any event, and the catalog of a newly
    /// signed-in owner is loaded.
    ///
    /// # Errors
    ///
    /// If failed to load the owner's properties. The owner stays signed in
    /// with an empty catalog, so loading may be retried with
    /// [`Client::reload()`].
    pub async fn handle(
        &mut self,
        event: auth::Event,
    ) -> Result<(), Error<Traced<database::Error>>>
    where
        G: Query<
            query::properties::ByOwner,
            Ok = Vec<Property>,
            Err = Traced<database::Error>,
        >,
    {
        self.catalog.reset();
        self.drawing.reset();

        match event {
            auth::Event::SignedIn(owner_id) => {
                log::debug!("signed in as `{owner_id}`");
                self.owner_id = Some(owner_id);
                self.reload().await
            }
            auth::Event::SignedOut => {
                log::debug!("signed out");
                self.owner_id = None;
                Ok(())
            }
        }
    }

    /// Reloads the catalog of the signed-in owner.
    ///
    /// # Errors
    ///
    /// - [`Error::Precondition`] if signed out.
    /// - [`Error::Persistence`] if failed to list the properties.
    pub async fn reload(&mut self) -> Result<(), Error<Traced<database::Error>>>
    where
        G: Query<
            query::properties::ByOwner,
            Ok = Vec<Property>,
            Err = Traced<database::Error>,
        >,
    {
        let owner_id = self.signed_in()?.clone();
        let previous = self.catalog.selected_id();
        self.catalog.load(owner_id).await?;
        if self.catalog.selected_id() != previous {
            self.drawing.reset();
        }
        Ok(())
    }

    /// Selects the [`Property`] with the provided ID, returning the
    /// [`Region`] framing it.
    ///
    /// Switching to another [`Property`] discards the drawing in progress.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`] if the catalog has no such [`Property`].
    pub fn select(&mut self, id: property::Id) -> Result<Region, Error> {
        let previous = self.catalog.selected_id();
        let region = self.catalog.select(id)?;
        if previous != Some(id) {
            self.drawing.reset();
        }
        Ok(region)
    }

    /// Creates a new [`Property`] of the signed-in owner.
    ///
    /// # Errors
    ///
    /// - [`Error::Precondition`] if signed out.
    /// - [`Error::Validation`] if the `name` is blank or too long.
    /// - [`Error::Persistence`] if failed to create the [`Property`].
    pub async fn create_property(
        &mut self,
        name: &str,
        location: GeoPoint,
    ) -> Result<Property, Error<Traced<create_property::ExecutionError>>>
    where
        G: Command<
            create_property::CreateProperty,
            Ok = Property,
            Err = Traced<create_property::ExecutionError>,
        >,
    {
        let owner_id = self.signed_in()?.clone();
        self.catalog.create(name, location, owner_id).await
    }

    /// Deletes the [`Property`] with the provided ID along with its maps.
    ///
    /// A drawing targeting the deleted [`Property`] is discarded.
    ///
    /// # Errors
    ///
    /// - [`Error::NotFound`] if the catalog has no such [`Property`].
    /// - [`Error::Persistence`] if failed to delete the [`Property`].
    pub async fn delete_property(
        &mut self,
        id: property::Id,
    ) -> Result<(), Error<Traced<delete_property::ExecutionError>>>
    where
        G: Command<
            delete_property::DeleteProperty,
            Ok = (),
            Err = Traced<delete_property::ExecutionError>,
        >,
    {
        self.catalog.delete(id).await?;
        if self.drawing.target() == Some(id) {
            self.drawing.reset();
        }
        Ok(())
    }

    /// Lists all the [`Property`]s of the signed-in owner along with their
    /// maps.
    ///
    /// # Errors
    ///
    /// - [`Error::Precondition`] if signed out.
    /// - [`Error::Persistence`] if failed to list them.
    pub async fn overview(
        &self,
    ) -> Result<Vec<WithMaps>, Error<Traced<database::Error>>>
    where
        G: Query<
            query::properties::WithMapsByOwner,
            Ok = Vec<WithMaps>,
            Err = Traced<database::Error>,
        >,
    {
        let owner_id = self.signed_in()?.clone();
        self.catalog.overview(owner_id).await
    }

    /// Loads the maps of the selected [`Property`].
    ///
    /// # Errors
    ///
    /// See [`PropertyCatalog::load_maps()`].
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
        self.catalog.load_maps().await
    }

    /// Deletes the map with the provided ID of the selected [`Property`].
    ///
    /// # Errors
    ///
    /// See [`PropertyCatalog::delete_map()`].
    pub async fn delete_map(
        &mut self,
        id: map::Id,
    ) -> Result<(), Error<Traced<delete_map::ExecutionError>>>
    where
        G: Command<
            delete_map::DeleteMap,
            Ok = (),
            Err = Traced<delete_map::ExecutionError>,
        >,
    {
        self.catalog.delete_map(id).await
    }

    /// Starts drawing over the selected [`Property`].
    ///
    /// # Errors
    ///
    /// See [`DrawingSession::start()`].
    pub fn start_drawing(&mut self) -> Result<(), Error> {
        self.drawing.start(self.catalog.selected())
    }

    /// Toggles drawing over the selected [`Property`], asking to `confirm`
    /// before discarding placed points.
    ///
    /// # Errors
    ///
    /// See [`DrawingSession::toggle_or_cancel()`].
    pub async fn toggle_drawing<F, Fut>(
        &mut self,
        confirm: F,
    ) -> Result<Toggle, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = bool>,
    {
        self.drawing
            .toggle_or_cancel(self.catalog.selected(), confirm)
            .await
    }

    /// Saves the finalized drawing, adding it to the loaded maps of the
    /// selected [`Property`].
    ///
    /// # Errors
    ///
    /// See [`DrawingSession::save()`].
    pub async fn save_drawing(
        &mut self,
    ) -> Result<MapDrawing, Error<Traced<create_map::ExecutionError>>>
    where
        G: Command<
            create_map::CreateMap,
            Ok = MapDrawing,
            Err = Traced<create_map::ExecutionError>,
        >,
    {
        let map = self.drawing.save().await?;
        self.catalog.record_map(map.clone());
        Ok(map)
    }

    /// Returns ID of the signed-in owner.
    fn signed_in(&self) -> Result<&user::Id, error::Precondition> {
        self.owner_id.as_ref().ok_or(error::Precondition::SignedOut)
    }
}
