//! [`Error`] kinds of client-side operations.

use std::{convert::Infallible, error::Error as StdError};

use derive_more::{Display, Error as DeriveError, From};
use service::domain::{map, property};

/// Error of a client-side operation.
///
/// `P` is the error of the persistence gateway involved in the operation,
/// if any.
#[derive(Debug, Display, From)]
pub enum Error<P = Infallible> {
    /// Operation is not allowed in the current state.
    #[display("{_0}")]
    #[from]
    Precondition(Precondition),

    /// User-provided data breaks a rule.
    #[display("{_0}")]
    #[from]
    Validation(Violation),

    /// Referenced entity is absent from the local state.
    #[display("{_0}")]
    #[from]
    NotFound(NotFound),

    /// Persistence gateway failed.
    #[display("persistence failed: {_0}")]
    Persistence(P),
}

impl<P> StdError for Error<P>
where
    P: StdError + 'static,
{
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Self::Precondition(e) => Some(e),
            Self::Validation(e) => Some(e),
            Self::NotFound(e) => Some(e),
            Self::Persistence(e) => Some(e),
        }
    }
}

/// Violated precondition of an operation.
#[derive(Clone, Copy, Debug, DeriveError, Display, Eq, PartialEq)]
pub enum Precondition {
    /// No property is selected.
    #[display("no property selected")]
    NoPropertySelected,

    /// Drawing is not in progress.
    #[display("not drawing")]
    NotDrawing,

    /// Drawing is not being finalized.
    #[display("not finalizing a drawing")]
    NotFinalizing,

    /// No user is signed in.
    #[display("signed out")]
    SignedOut,
}

/// Violated rule of user-provided data.
#[derive(Clone, Copy, Debug, DeriveError, Display, Eq, PartialEq)]
pub enum Violation {
    /// Polygon has too few points.
    #[display("minimum {} points", map::Polygon::MIN_VERTICES)]
    TooFewPoints,

    /// Description is blank.
    #[display("description must not be blank")]
    EmptyDescription,

    /// Description is too long.
    #[display("description exceeds {} bytes", map::Description::MAX_LEN)]
    DescriptionTooLong,

    /// Kind is too long.
    #[display("kind exceeds {} bytes", map::Kind::MAX_LEN)]
    KindTooLong,

    /// Property name is blank or too long.
    #[display(
        "name must not be blank nor exceed {} bytes",
        property::Name::MAX_LEN
    )]
    InvalidName,
}

/// Entity absent from the local state.
#[derive(Clone, Copy, Debug, DeriveError, Display, Eq, PartialEq)]
pub enum NotFound {
    /// Property is not in the catalog.
    #[display("`Property(id: {_0})` not found")]
    Property(#[error(not(source))] property::Id),

    /// Map is not among the loaded ones.
    #[display("`MapDrawing(id: {_0})` not found")]
    Map(#[error(not(source))] map::Id),
}
