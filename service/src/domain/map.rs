//! [`MapDrawing`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::Property;
use crate::domain::{property, user, GeoPoint, Region};

/// Hand-drawn polygon marking a sub-area (a plot, a field) of a
/// [`Property`].
///
/// Immutable once persisted.
#[derive(Clone, Debug, PartialEq)]
pub struct MapDrawing {
    /// ID of this [`MapDrawing`].
    pub id: Id,

    /// ID of the user who drew this [`MapDrawing`].
    pub owner_id: user::Id,

    /// ID of the [`Property`] this [`MapDrawing`] belongs to.
    pub property_id: property::Id,

    /// Outline of this [`MapDrawing`].
    pub polygon: Polygon,

    /// [`Description`] of this [`MapDrawing`].
    pub description: Description,

    /// Optional [`Kind`] tag of this [`MapDrawing`].
    pub kind: Option<Kind>,

    /// [`DateTime`] when this [`MapDrawing`] was created.
    pub created_at: CreationDateTime,
}

impl MapDrawing {
    /// Returns the [`Region`] framing this [`MapDrawing`].
    #[must_use]
    pub fn region(&self) -> Region {
        Region::bounding(self.polygon.points()).unwrap_or_else(|e| {
            unreachable!("`Polygon` always has vertices: {e}")
        })
    }
}

/// ID of a [`MapDrawing`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Ordered vertices of a closed polygon.
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon(Vec<GeoPoint>);

impl Polygon {
    /// Minimum number of vertices of a [`Polygon`].
    pub const MIN_VERTICES: usize = 3;

    /// Creates a new [`Polygon`] if at least [`Polygon::MIN_VERTICES`]
    /// `points` are provided.
    ///
    /// Coincident points are kept as is.
    #[must_use]
    pub fn new(points: Vec<GeoPoint>) -> Option<Self> {
        (points.len() >= Self::MIN_VERTICES).then_some(Self(points))
    }

    /// Returns the vertices of this [`Polygon`].
    #[must_use]
    pub fn points(&self) -> &[GeoPoint] {
        &self.0
    }

    /// Returns the number of vertices of this [`Polygon`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`, as a [`Polygon`] cannot be empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }
}

impl From<Polygon> for Vec<GeoPoint> {
    fn from(polygon: Polygon) -> Self {
        polygon.0
    }
}

/// Description of a [`MapDrawing`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct Description(String);

impl Description {
    /// Maximum length of a [`Description`] in bytes.
    pub const MAX_LEN: usize = 1024;

    /// Creates a new [`Description`] if the given `text` is valid.
    ///
    /// A valid [`Description`] is non-empty, has no surrounding whitespace
    /// and is at most [`Description::MAX_LEN`] bytes long.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        Self::check(&text).then_some(Self(text))
    }

    /// Checks whether the given `text` is a valid [`Description`].
    fn check(text: impl AsRef<str>) -> bool {
        let text = text.as_ref();
        text.trim() == text && !text.is_empty() && text.len() <= Self::MAX_LEN
    }
}

/// Free-text tag of a [`MapDrawing`] (e.g. "pasture", "soy").
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct Kind(String);

impl Kind {
    /// Maximum length of a [`Kind`] in bytes.
    pub const MAX_LEN: usize = 256;

    /// Creates a new [`Kind`] if the given `tag` is valid.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Option<Self> {
        let tag = tag.into();
        Self::check(&tag).then_some(Self(tag))
    }

    /// Checks whether the given `tag` is a valid [`Kind`].
    fn check(tag: impl AsRef<str>) -> bool {
        let tag = tag.as_ref();
        tag.trim() == tag && !tag.is_empty() && tag.len() <= Self::MAX_LEN
    }
}

/// [`DateTime`] when a [`MapDrawing`] was created.
pub type CreationDateTime = DateTimeOf<(MapDrawing, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::DateTime;

    use crate::domain::{property, user, GeoPoint, Region};

    use super::{Description, Id, Kind, MapDrawing, Polygon};

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    #[test]
    fn polygon_needs_three_vertices() {
        let p = point(1.0, 1.0);

        assert!(Polygon::new(vec![]).is_none());
        assert!(Polygon::new(vec![p]).is_none());
        assert!(Polygon::new(vec![p, p]).is_none());
        assert_eq!(Polygon::new(vec![p, p, p]).unwrap().len(), 3);
    }

    #[test]
    fn polygon_preserves_order() {
        let points = vec![point(0.0, 0.0), point(0.0, 1.0), point(1.0, 1.0)];
        let polygon = Polygon::new(points.clone()).unwrap();

        assert_eq!(polygon.points(), points.as_slice());
        assert_eq!(Vec::from(polygon), points);
    }

    #[test]
    fn description_and_kind_are_trimmed_text() {
        assert!(Description::new("north field").is_some());
        assert!(Description::new("").is_none());
        assert!(Description::new(" north field ").is_none());
        assert!(Kind::new("pasture").is_some());
        assert!(Kind::new("  ").is_none());
    }

    #[test]
    fn region_frames_the_polygon() {
        let map = MapDrawing {
            id: Id::new(),
            owner_id: user::Id::new("owner").unwrap(),
            property_id: property::Id::new(),
            polygon: Polygon::new(vec![
                point(-24.5, -54.0),
                point(-24.6, -54.0),
                point(-24.6, -54.1),
            ])
            .unwrap(),
            description: Description::new("north field").unwrap(),
            kind: None,
            created_at: DateTime::now().coerce(),
        };

        assert_eq!(
            map.region(),
            Region::bounding(map.polygon.points()).unwrap(),
        );
    }
}
