//! [`Property`] definitions.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
use uuid::Uuid;

use crate::domain::{user, GeoPoint};

/// Property owned by a user and marked on the map by a single pin.
#[derive(Clone, Debug, PartialEq)]
pub struct Property {
    /// ID of this [`Property`].
    pub id: Id,

    /// ID of the user owning this [`Property`].
    pub owner_id: user::Id,

    /// [`Name`] of this [`Property`].
    pub name: Name,

    /// Pin location of this [`Property`].
    pub location: GeoPoint,

    /// [`DateTime`] when this [`Property`] was created.
    pub created_at: CreationDateTime,
}

/// ID of a [`Property`].
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

/// Name of a [`Property`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq)]
#[as_ref(str, String)]
pub struct Name(String);

impl Name {
    /// Maximum length of a [`Name`] in bytes.
    pub const MAX_LEN: usize = 512;

    /// Creates a new [`Name`] if the given `name` is valid.
    ///
    /// A valid [`Name`] is non-empty, has no surrounding whitespace and is at
    /// most [`Name::MAX_LEN`] bytes long.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= Self::MAX_LEN
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `property::Name`")
    }
}

/// [`DateTime`] when a [`Property`] was created.
pub type CreationDateTime = DateTimeOf<(Property, unit::Creation)>;
