//! Geographic primitives and viewport geometry.

use derive_more::{Display, Error};

/// Point on the Earth surface in decimal degrees.
#[derive(Clone, Copy, Debug, Display, PartialEq)]
#[display("({latitude}, {longitude})")]
pub struct GeoPoint {
    /// Latitude in `[-90, 90]`.
    latitude: f64,

    /// Longitude in `[-180, 180]`.
    longitude: f64,
}

impl GeoPoint {
    /// Creates a new [`GeoPoint`] if both coordinates are finite and in
    /// range.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        Self::check(latitude, longitude).then_some(Self {
            latitude,
            longitude,
        })
    }

    /// Returns the latitude of this [`GeoPoint`].
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Returns the longitude of this [`GeoPoint`].
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Checks whether the given coordinates form a valid [`GeoPoint`].
    fn check(latitude: f64, longitude: f64) -> bool {
        (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude)
    }
}

/// Rectangular map viewport: a center and the spans around it, in degrees.
#[derive(Clone, Copy, Debug, Display, PartialEq)]
#[display(
    "center ({center_latitude}, {center_longitude}), \
     span {latitude_span}x{longitude_span}"
)]
pub struct Region {
    /// Latitude of the viewport center.
    center_latitude: f64,

    /// Longitude of the viewport center.
    center_longitude: f64,

    /// Visible latitude range.
    latitude_span: f64,

    /// Visible longitude range.
    longitude_span: f64,
}

impl Region {
    /// Span used on an axis where all the bounded points coincide.
    pub const DEFAULT_SPAN: f64 = 0.05;

    /// Factor enlarging the bounding box, so the shape doesn't touch the
    /// viewport edges.
    pub const MARGIN: f64 = 1.5;

    /// Creates a new [`Region`] centered at `center` if both spans are finite
    /// and non-negative.
    #[must_use]
    pub fn new(
        center: GeoPoint,
        latitude_span: f64,
        longitude_span: f64,
    ) -> Option<Self> {
        let valid = |span: f64| span.is_finite() && span >= 0.0;
        (valid(latitude_span) && valid(longitude_span)).then_some(Self {
            center_latitude: center.latitude,
            center_longitude: center.longitude,
            latitude_span,
            longitude_span,
        })
    }

    /// Computes the [`Region`] bounding all the provided `points`.
    ///
    /// Each span is the extent of the points on that axis multiplied by
    /// [`Region::MARGIN`], or [`Region::DEFAULT_SPAN`] when the extent is
    /// zero.
    ///
    /// # Errors
    ///
    /// With [`EmptyPoints`] if no `points` are provided.
    pub fn bounding(points: &[GeoPoint]) -> Result<Self, EmptyPoints> {
        if points.is_empty() {
            return Err(EmptyPoints);
        }

        let (min_lat, max_lat, min_lng, max_lng) = points.iter().fold(
            (90.0_f64, -90.0_f64, 180.0_f64, -180.0_f64),
            |(min_lat, max_lat, min_lng, max_lng), p| {
                (
                    min_lat.min(p.latitude),
                    max_lat.max(p.latitude),
                    min_lng.min(p.longitude),
                    max_lng.max(p.longitude),
                )
            },
        );

        Ok(Self {
            center_latitude: (min_lat + max_lat) / 2.0,
            center_longitude: (min_lng + max_lng) / 2.0,
            latitude_span: Self::span(min_lat, max_lat),
            longitude_span: Self::span(min_lng, max_lng),
        })
    }

    /// Returns the center of this [`Region`].
    #[must_use]
    pub fn center(&self) -> GeoPoint {
        GeoPoint {
            latitude: self.center_latitude,
            longitude: self.center_longitude,
        }
    }

    /// Returns the latitude of this [`Region`] center.
    #[must_use]
    pub const fn center_latitude(&self) -> f64 {
        self.center_latitude
    }

    /// Returns the longitude of this [`Region`] center.
    #[must_use]
    pub const fn center_longitude(&self) -> f64 {
        self.center_longitude
    }

    /// Returns the visible latitude range of this [`Region`].
    #[must_use]
    pub const fn latitude_span(&self) -> f64 {
        self.latitude_span
    }

    /// Returns the visible longitude range of this [`Region`].
    #[must_use]
    pub const fn longitude_span(&self) -> f64 {
        self.longitude_span
    }

    /// Span of a `[min, max]` extent with the margin applied.
    fn span(min: f64, max: f64) -> f64 {
        let span = (max - min) * Self::MARGIN;
        if span > 0.0 {
            span
        } else {
            Self::DEFAULT_SPAN
        }
    }
}

/// Error of bounding an empty set of points.
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
#[display("cannot bound an empty set of points")]
pub struct EmptyPoints;

#[cfg(test)]
mod spec {
    use super::{EmptyPoints, GeoPoint, Region};

    fn point(lat: f64, lng: f64) -> GeoPoint {
        GeoPoint::new(lat, lng).unwrap()
    }

    #[test]
    fn rejects_out_of_range_points() {
        assert!(GeoPoint::new(90.0, 180.0).is_some());
        assert!(GeoPoint::new(-90.0, -180.0).is_some());
        assert!(GeoPoint::new(90.5, 0.0).is_none());
        assert!(GeoPoint::new(0.0, -180.1).is_none());
        assert!(GeoPoint::new(f64::NAN, 0.0).is_none());
        assert!(GeoPoint::new(0.0, f64::INFINITY).is_none());
    }

    #[test]
    fn single_point_uses_default_span() {
        let region = Region::bounding(&[point(10.0, 20.0)]).unwrap();

        assert_eq!(
            region,
            Region::new(point(10.0, 20.0), 0.05, 0.05).unwrap(),
        );
        assert_eq!(region.center_latitude(), 10.0);
        assert_eq!(region.center_longitude(), 20.0);
        assert_eq!(region.latitude_span(), 0.05);
        assert_eq!(region.longitude_span(), 0.05);
    }

    #[test]
    fn coincident_points_use_default_span_on_both_axes() {
        let p = point(-24.5, -54.0);
        let region = Region::bounding(&[p, p, p]).unwrap();

        assert_eq!(region.latitude_span(), Region::DEFAULT_SPAN);
        assert_eq!(region.longitude_span(), Region::DEFAULT_SPAN);
        assert_eq!(region.center(), p);
    }

    #[test]
    fn applies_margin_per_axis() {
        let region =
            Region::bounding(&[point(0.0, 0.0), point(2.0, 4.0)]).unwrap();

        assert_eq!(region.center(), point(1.0, 2.0));
        assert_eq!(region.latitude_span(), 3.0);
        assert_eq!(region.longitude_span(), 6.0);

        let flat =
            Region::bounding(&[point(5.0, -1.0), point(5.0, 1.0)]).unwrap();
        assert_eq!(flat.latitude_span(), Region::DEFAULT_SPAN);
        assert_eq!(flat.longitude_span(), 3.0);
    }

    #[test]
    fn center_is_midpoint_of_extrema() {
        let sets = [
            vec![point(-24.5, -54.0), point(-24.6, -54.0), point(-24.6, -54.1)],
            vec![point(89.0, 179.0), point(-89.0, -179.0), point(0.0, 0.0)],
            vec![point(-10.0, 30.0), point(-12.5, 31.25)],
            vec![point(45.0, 90.0), point(45.0, 90.0), point(44.0, 91.0)],
        ];

        for points in sets {
            let region = Region::bounding(&points).unwrap();

            let lats = points.iter().map(GeoPoint::latitude);
            let lngs = points.iter().map(GeoPoint::longitude);
            let (min_lat, max_lat) = lats.fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(lo, hi), v| (lo.min(v), hi.max(v)),
            );
            let (min_lng, max_lng) = lngs.fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(lo, hi), v| (lo.min(v), hi.max(v)),
            );

            assert_eq!(region.center_latitude(), (min_lat + max_lat) / 2.0);
            assert_eq!(region.center_longitude(), (min_lng + max_lng) / 2.0);
            assert!((min_lat..=max_lat).contains(&region.center_latitude()));
            assert!((min_lng..=max_lng).contains(&region.center_longitude()));
            assert!(region.latitude_span() > 0.0);
            assert!(region.longitude_span() > 0.0);
        }
    }

    #[test]
    fn empty_input_is_an_error() {
        assert_eq!(Region::bounding(&[]), Err(EmptyPoints));
    }

    #[test]
    fn rejects_negative_spans() {
        assert!(Region::new(point(0.0, 0.0), -1.0, 1.0).is_none());
        assert!(Region::new(point(0.0, 0.0), 1.0, f64::NAN).is_none());
        assert!(Region::new(point(0.0, 0.0), 0.0, 0.0).is_some());
    }
}
