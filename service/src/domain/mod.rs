//! Domain definitions.

pub mod geo;
pub mod map;
pub mod property;
pub mod user;

pub use self::{
    geo::{GeoPoint, Region},
    map::MapDrawing,
    property::Property,
};
