//! Authentication events fed by the host.

use service::domain::user;

/// Change of the authenticated user reported by the identity provider.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Event {
    /// User with the provided ID signed in.
    SignedIn(user::Id),

    /// Current user signed out.
    SignedOut,
}
