//! [`DrawingSession`] definitions.

use std::{future::Future, mem};

use derive_more::Display;
use service::{
    command::create_map::{self, CreateMap},
    domain::{map, property, user, GeoPoint, MapDrawing, Property, Region},
    Command,
};
use tracerr::Traced;
use tracing as log;

use crate::error::{Error, Precondition, Violation};

/// Stage of a [`DrawingSession`].
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Mode {
    /// Nothing is being drawn.
    #[display("idle")]
    Idle,

    /// Points are being placed.
    #[display("drawing")]
    Drawing,

    /// Placed points are being described before saving.
    #[display("finalizing")]
    Finalizing,
}

/// Outcome of [`DrawingSession::toggle_or_cancel()`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Toggle {
    /// Drawing has started.
    Started,

    /// Drawing was discarded.
    Cancelled,

    /// Discarding was declined, so the drawing goes on.
    Kept,
}

/// Polygon being traced over a [`Property`] and saved as a [`MapDrawing`].
///
/// ```text
/// Idle --start--> Drawing --finalize--> Finalizing --save--> Idle
///                   ^  |                   |
///                   |  +--cancel--> Idle   |
///                   +--cancel_finalizing---+
/// ```
#[derive(Debug)]
pub struct DrawingSession<G> {
    /// Gateway to save [`MapDrawing`]s with.
    gateway: G,

    /// Current [`State`] of this [`DrawingSession`].
    state: State,
}

/// State of a [`DrawingSession`].
#[derive(Clone, Debug, Default)]
enum State {
    /// Nothing is being drawn.
    #[default]
    Idle,

    /// Points are being placed.
    Drawing(Draft),

    /// Placed points are being described.
    Finalizing(Draft),
}

/// Work in progress of a [`DrawingSession`].
#[derive(Clone, Debug)]
struct Draft {
    /// ID of the [`Property`] being drawn over.
    property_id: property::Id,

    /// ID of the user owning the [`Property`].
    owner_id: user::Id,

    /// Placed points in placement order.
    points: Vec<GeoPoint>,

    /// Raw description text.
    description: String,

    /// Raw kind text.
    kind: String,
}

impl Draft {
    /// Creates an empty [`Draft`] over the provided [`Property`].
    fn new(property: &Property) -> Self {
        Self {
            property_id: property.id,
            owner_id: property.owner_id.clone(),
            points: Vec::new(),
            description: String::new(),
            kind: String::new(),
        }
    }

    /// Validates this [`Draft`] into a [`CreateMap`] command.
    fn to_command(&self) -> Result<CreateMap, Violation> {
        let polygon = map::Polygon::new(self.points.clone())
            .ok_or(Violation::TooFewPoints)?;

        let description = self.description.trim();
        if description.is_empty() {
            return Err(Violation::EmptyDescription);
        }
        let description = map::Description::new(description)
            .ok_or(Violation::DescriptionTooLong)?;

        let kind = self.kind.trim();
        let kind = (!kind.is_empty())
            .then(|| map::Kind::new(kind).ok_or(Violation::KindTooLong))
            .transpose()?;

        Ok(CreateMap {
            property_id: self.property_id,
            owner_id: self.owner_id.clone(),
            polygon,
            description,
            kind,
        })
    }
}

impl<G> DrawingSession<G> {
    /// Creates a new idle [`DrawingSession`] saving via the provided
    /// `gateway`.
    #[must_use]
    pub fn new(gateway: G) -> Self {
        Self {
            gateway,
            state: State::Idle,
        }
    }

    /// Returns the current [`Mode`] of this [`DrawingSession`].
    #[must_use]
    pub fn mode(&self) -> Mode {
        match self.state {
            State::Idle => Mode::Idle,
            State::Drawing(_) => Mode::Drawing,
            State::Finalizing(_) => Mode::Finalizing,
        }
    }

    /// Returns ID of the [`Property`] being drawn over, if any.
    #[must_use]
    pub fn target(&self) -> Option<property::Id> {
        self.draft().map(|d| d.property_id)
    }

    /// Returns the placed points.
    #[must_use]
    pub fn points(&self) -> &[GeoPoint] {
        self.draft().map_or(&[], |d| &d.points)
    }

    /// Returns the description entered so far, if drawing.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.draft().map(|d| d.description.as_str())
    }

    /// Returns the kind entered so far, if drawing.
    #[must_use]
    pub fn kind(&self) -> Option<&str> {
        self.draft().map(|d| d.kind.as_str())
    }

    /// Returns the [`Region`] framing the placed points, if any.
    #[must_use]
    pub fn region(&self) -> Option<Region> {
        Region::bounding(self.points()).ok()
    }

    /// Starts drawing over the `selected` [`Property`], discarding any
    /// drawing in progress.
    ///
    /// # Errors
    ///
    /// [`Precondition::NoPropertySelected`] if nothing is `selected`.
    pub fn start(&mut self, selected: Option<&Property>) -> Result<(), Error> {
        let property = selected.ok_or(Precondition::NoPropertySelected)?;
        self.state = State::Drawing(Draft::new(property));
        log::debug!("started drawing over `Property(id: {})`", property.id);
        Ok(())
    }

    /// Places the provided `point` after the already placed ones.
    ///
    /// Does nothing unless [`Mode::Drawing`].
    pub fn add_point(&mut self, point: GeoPoint) {
        if let State::Drawing(draft) = &mut self.state {
            draft.points.push(point);
        }
    }

    /// Removes the last placed point, returning it.
    ///
    /// Does nothing unless [`Mode::Drawing`].
    pub fn undo_last(&mut self) -> Option<GeoPoint> {
        match &mut self.state {
            State::Drawing(draft) => draft.points.pop(),
            State::Idle | State::Finalizing(_) => None,
        }
    }

    /// Starts drawing over the `selected` [`Property`] when idle, or
    /// discards the drawing in progress otherwise.
    ///
    /// Placed points are discarded only if the user `confirm`s it.
    ///
    /// # Errors
    ///
    /// [`Precondition::NoPropertySelected`] if idle and nothing is
    /// `selected`.
    pub async fn toggle_or_cancel<F, Fut>(
        &mut self,
        selected: Option<&Property>,
        confirm: F,
    ) -> Result<Toggle, Error>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = bool>,
    {
        match self.mode() {
            Mode::Idle => {
                self.start(selected)?;
                Ok(Toggle::Started)
            }
            Mode::Drawing | Mode::Finalizing => {
                if !self.points().is_empty() && !confirm().await {
                    return Ok(Toggle::Kept);
                }
                self.reset();
                log::debug!("drawing cancelled");
                Ok(Toggle::Cancelled)
            }
        }
    }

    /// Stops placing points to describe the drawing.
    ///
    /// # Errors
    ///
    /// - [`Precondition::NotDrawing`] unless [`Mode::Drawing`].
    /// - [`Violation::TooFewPoints`] if less than [`map::Polygon`] requires
    ///   are placed.
    pub fn finalize(&mut self) -> Result<(), Error> {
        let placed = match &self.state {
            State::Drawing(draft) => draft.points.len(),
            State::Idle | State::Finalizing(_) => {
                return Err(Precondition::NotDrawing.into());
            }
        };
        if placed < map::Polygon::MIN_VERTICES {
            return Err(Violation::TooFewPoints.into());
        }

        if let State::Drawing(draft) = mem::take(&mut self.state) {
            self.state = State::Finalizing(draft);
        }
        Ok(())
    }

    /// Sets the description of the drawing.
    ///
    /// # Errors
    ///
    /// [`Precondition::NotDrawing`] if [`Mode::Idle`].
    pub fn set_description(
        &mut self,
        text: impl Into<String>,
    ) -> Result<(), Error> {
        self.draft_mut()?.description = text.into();
        Ok(())
    }

    /// Sets the kind of the drawing.
    ///
    /// # Errors
    ///
    /// [`Precondition::NotDrawing`] if [`Mode::Idle`].
    pub fn set_kind(&mut self, text: impl Into<String>) -> Result<(), Error> {
        self.draft_mut()?.kind = text.into();
        Ok(())
    }

    /// Returns to placing points, keeping them but clearing the
    /// description and the kind.
    ///
    /// # Errors
    ///
    /// [`Precondition::NotFinalizing`] unless [`Mode::Finalizing`].
    pub fn cancel_finalizing(&mut self) -> Result<(), Error> {
        match mem::take(&mut self.state) {
            State::Finalizing(mut draft) => {
                draft.description.clear();
                draft.kind.clear();
                self.state = State::Drawing(draft);
                Ok(())
            }
            state @ (State::Idle | State::Drawing(_)) => {
                self.state = state;
                Err(Precondition::NotFinalizing.into())
            }
        }
    }

    /// Discards everything, returning to [`Mode::Idle`].
    pub fn reset(&mut self) {
        self.state = State::Idle;
    }

    /// Saves the finalized drawing as a new [`MapDrawing`] and returns to
    /// [`Mode::Idle`].
    ///
    /// Nothing changes on failure, so saving may be retried as is.
    ///
    /// # Errors
    ///
    /// - [`Precondition::NotFinalizing`] unless [`Mode::Finalizing`].
    /// - [`Error::Validation`] if the drawing has too few points, or its
    ///   description is blank or too long, or its kind is too long.
    /// - [`Error::Persistence`] if the gateway failed.
    pub async fn save(
        &mut self,
    ) -> Result<MapDrawing, Error<Traced<create_map::ExecutionError>>>
    where
        G: Command<
            CreateMap,
            Ok = MapDrawing,
            Err = Traced<create_map::ExecutionError>,
        >,
    {
        let State::Finalizing(draft) = &self.state else {
            return Err(Precondition::NotFinalizing.into());
        };
        let cmd = draft.to_command()?;

        let map = self.gateway.execute(cmd).await.map_err(|e| {
            log::warn!("failed to save drawing: {e}");
            Error::Persistence(e)
        })?;

        self.state = State::Idle;
        log::debug!(
            "saved `MapDrawing(id: {})` of `Property(id: {})`",
            map.id,
            map.property_id,
        );
        Ok(map)
    }

    /// Returns the [`Draft`] in progress, if any.
    fn draft(&self) -> Option<&Draft> {
        match &self.state {
            State::Idle => None,
            State::Drawing(draft) | State::Finalizing(draft) => Some(draft),
        }
    }

    /// Returns the [`Draft`] in progress for editing.
    fn draft_mut(&mut self) -> Result<&mut Draft, Precondition> {
        match &mut self.state {
            State::Idle => Err(Precondition::NotDrawing),
            State::Drawing(draft) | State::Finalizing(draft) => Ok(draft),
        }
    }
}
