//! In-process document store [`Database`] implementation.
//!
//! Documents are kept in a `properties` collection and per-[`Property`]
//! `maps` sub-collections. The link to the store is simulated, so it may
//! carry latency and may be broken on purpose to exercise failure paths.

pub mod client;
mod impls;

use std::{
    collections::HashMap,
    future::Future,
    sync::{Mutex as SyncMutex, PoisonError},
    time::Duration,
};

use derive_more::{Deref, Display, Error as StdError};
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::{property, MapDrawing, Property},
    infra::database,
};
#[cfg(doc)]
use crate::infra::Database;

pub use self::client::{NonTx, Tx};

/// In-process document store [`Database`] client.
#[derive(Clone, Debug, Deref)]
pub struct Memory<C = NonTx>(C);

impl Memory {
    /// Creates a new empty [`Memory`] store answering immediately.
    #[must_use]
    pub fn new() -> Self {
        Self::with_latency(Duration::ZERO)
    }

    /// Creates a new empty [`Memory`] store delaying every round trip by the
    /// provided `latency`.
    #[must_use]
    pub fn with_latency(latency: Duration) -> Self {
        Self(NonTx::new(latency))
    }

    /// Breaks the link to this [`Memory`] store, so every following
    /// operation fails with [`Error::Disconnected`].
    pub fn disconnect(&self) {
        self.link().disconnected = true;
    }

    /// Restores the link to this [`Memory`] store and disarms any pending
    /// [`Memory::disconnect_before()`].
    pub fn reconnect(&self) {
        *self.link() = Link::default();
    }

    /// Breaks the link to this [`Memory`] store right before the provided
    /// [`Step`] is performed next time.
    pub fn disconnect_before(&self, step: Step) {
        self.link().break_before = Some(step);
    }

    /// Indicates whether the link to this [`Memory`] store is broken.
    #[must_use]
    pub fn is_disconnected(&self) -> bool {
        self.link().disconnected
    }
}

impl Default for Memory {
    fn default() -> Self {
        Self::new()
    }
}

/// Writing step performed on a [`Memory`] store.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Step {
    /// Inserting a [`Property`].
    InsertProperty,

    /// Deleting a [`Property`] document.
    DeleteProperty,

    /// Inserting a [`MapDrawing`].
    InsertMap,

    /// Deleting the whole `maps` sub-collection of a [`Property`].
    DeleteMaps,

    /// Deleting a single [`MapDrawing`].
    DeleteMap,

    /// Committing a transaction.
    Commit,
}

/// [`Memory`] store [`Error`].
#[derive(Clone, Copy, Debug, Display, StdError)]
pub enum Error {
    /// Link to the store is broken.
    #[display("link to the document store is broken")]
    Disconnected,

    /// Transaction is already committed.
    #[display("transaction is already committed")]
    AlreadyCommitted,
}

/// Documents held by a [`Memory`] store.
#[derive(Clone, Debug, Default)]
pub struct Store {
    /// `properties` collection in insertion order.
    properties: Vec<Property>,

    /// `maps` sub-collections by their parent [`Property`].
    maps: HashMap<property::Id, Vec<MapDrawing>>,
}

/// State of the simulated link to a [`Memory`] store.
#[derive(Clone, Copy, Debug, Default)]
struct Link {
    /// Whether the link is broken.
    disconnected: bool,

    /// [`Step`] to break the link before.
    break_before: Option<Step>,
}

/// Simulated link to a [`Memory`] store.
#[derive(Debug, Default)]
pub struct Wire {
    /// Current state of the link.
    link: SyncMutex<Link>,

    /// Delay of every round trip.
    latency: Duration,
}

impl Wire {
    /// Creates a new connected [`Wire`] with the provided `latency`.
    fn new(latency: Duration) -> Self {
        Self {
            link: SyncMutex::default(),
            latency,
        }
    }

    /// Performs a round trip over this [`Wire`] preceding the provided
    /// [`Step`], if any.
    ///
    /// # Errors
    ///
    /// If the link is broken.
    async fn round_trip(
        &self,
        step: Option<Step>,
    ) -> Result<(), Traced<database::Error>> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut link = self.link.lock().unwrap_or_else(PoisonError::into_inner);
        if step.is_some() && link.break_before == step {
            link.break_before = None;
            link.disconnected = true;
            log::debug!("link broken before `{step:?}`");
        }
        if link.disconnected {
            return Err(tracerr::new!(database::Error::from(
                Error::Disconnected
            )));
        }
        Ok(())
    }
}

impl<C: Connection> Memory<C> {
    /// Returns the current [`Link`] state, recovering it from a poisoned
    /// lock.
    fn link(&self) -> std::sync::MutexGuard<'_, Link> {
        self.0
            .wire()
            .link
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Connection to the documents of a [`Memory`] store.
pub trait Connection {
    /// Performs a round trip preceding the provided [`Step`] (if any) and
    /// applies the provided function to the [`Store`] visible through this
    /// [`Connection`].
    ///
    /// # Errors
    ///
    /// If the link to the store is broken, or the transaction of this
    /// [`Connection`] is already committed.
    fn with_store<F, R>(
        &self,
        step: Option<Step>,
        f: F,
    ) -> impl Future<Output = Result<R, Traced<database::Error>>>
    where
        F: FnOnce(&mut Store) -> R;

    /// Returns the simulated [`Wire`] of this [`Connection`].
    fn wire(&self) -> &Wire;
}

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::{
        operations::{By, Commit, Delete, Insert, Select, Transact},
        DateTime,
    };
    use tokio::time::Instant;

    use crate::{
        domain::{property, user, GeoPoint, Property},
        infra::{database, Database},
    };

    use super::{Error, Memory, Step};

    fn property(owner: &str) -> Property {
        Property {
            id: property::Id::new(),
            owner_id: user::Id::new(owner).unwrap(),
            name: property::Name::new("Sítio Boa Vista").unwrap(),
            location: GeoPoint::new(-24.56, -54.06).unwrap(),
            created_at: DateTime::now().coerce(),
        }
    }

    async fn find(db: &Memory, id: property::Id) -> Option<Property> {
        db.execute(Select(By::<Option<Property>, _>::new(id)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn commit_publishes_staged_writes() {
        let db = Memory::new();
        let p = property("owner");

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(p.clone())).await.unwrap();
        tx.execute(Commit).await.unwrap();
        drop(tx);

        assert_eq!(find(&db, p.id).await, Some(p));
    }

    #[tokio::test]
    async fn dropped_transaction_rolls_back() {
        let db = Memory::new();
        let p = property("owner");

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Insert(p.clone())).await.unwrap();
        assert!(tx
            .execute(Select(By::<Option<Property>, _>::new(p.id)))
            .await
            .unwrap()
            .is_some());
        drop(tx);

        assert_eq!(find(&db, p.id).await, None);
    }

    #[tokio::test]
    async fn committed_transaction_is_finished() {
        let db = Memory::new();

        let tx = db.execute(Transact).await.unwrap();
        tx.execute(Commit).await.unwrap();
        let err = tx.execute(Insert(property("owner"))).await.unwrap_err();

        let err: &database::Error = err.as_ref();
        assert!(matches!(err, database::Error::Memory(Error::AlreadyCommitted)));
    }

    #[tokio::test]
    async fn breaks_link_before_armed_step_only() {
        let db = Memory::new();
        db.disconnect_before(Step::DeleteProperty);

        db.execute(Insert(property("owner"))).await.unwrap();
        assert!(!db.is_disconnected());

        let err = db
            .execute(Delete(By::<Property, _>::new(
                property::Id::new(),
            )))
            .await
            .unwrap_err();
        let err: &database::Error = err.as_ref();
        assert!(matches!(err, database::Error::Memory(Error::Disconnected)));
        assert!(db.is_disconnected());

        db.reconnect();
        let owner = user::Id::new("owner").unwrap();
        let listed = db
            .execute(Select(By::<Vec<Property>, _>::new(owner)))
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn disconnected_store_rejects_reads() {
        let db = Memory::new();
        db.disconnect();

        assert!(db
            .execute(Select(By::<Option<Property>, _>::new(
                property::Id::new()
            )))
            .await
            .is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn delays_round_trips_by_latency() {
        let db = Memory::with_latency(Duration::from_millis(300));
        let started = Instant::now();

        db.execute(Insert(property("owner"))).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(300));
    }
}
