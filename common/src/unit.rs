//! Marker types for [`DateTimeOf`] kinds.

#[cfg(doc)]
use crate::DateTimeOf;

/// Marker of the moment a document was created.
#[derive(Clone, Copy, Debug)]
pub struct Creation;
