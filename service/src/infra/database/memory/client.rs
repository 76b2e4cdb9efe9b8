//! [`Memory`] store client definitions.

use std::{sync::Arc, time::Duration};

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracerr::Traced;

use crate::infra::database::{self, memory};
#[cfg(doc)]
use crate::infra::database::Memory;

use super::{Connection, Step, Store, Wire};

/// Non-transactional [`Memory`] store client.
#[derive(Clone, Debug)]
pub struct NonTx {
    /// Published documents.
    store: Arc<Mutex<Store>>,

    /// Simulated link to the documents.
    wire: Arc<Wire>,
}

impl NonTx {
    /// Creates a new [`NonTx`] client over an empty [`Store`].
    pub(crate) fn new(latency: Duration) -> Self {
        Self {
            store: Arc::new(Mutex::new(Store::default())),
            wire: Arc::new(Wire::new(latency)),
        }
    }
}

impl Connection for NonTx {
    async fn with_store<F, R>(
        &self,
        step: Option<Step>,
        f: F,
    ) -> Result<R, Traced<database::Error>>
    where
        F: FnOnce(&mut Store) -> R,
    {
        self.wire.round_trip(step).await.map_err(tracerr::wrap!())?;
        Ok(f(&mut *self.store.lock().await))
    }

    fn wire(&self) -> &Wire {
        &self.wire
    }
}

/// Transactional [`Memory`] store client.
///
/// Holds the published documents exclusively until committed or dropped.
/// Writes are staged on a private copy, which replaces the published
/// documents on commit and is discarded otherwise.
#[derive(Clone, Debug)]
pub struct Tx {
    /// Staged transaction, if not committed yet.
    staged: Arc<Mutex<Option<Staged>>>,

    /// Simulated link to the documents.
    wire: Arc<Wire>,
}

/// Staged state of a [`Tx`].
#[derive(Debug)]
struct Staged {
    /// Exclusive hold over the published documents.
    published: OwnedMutexGuard<Store>,

    /// Working copy of the documents.
    working: Store,
}

impl Tx {
    /// Starts a new [`Tx`] over the documents of the provided [`NonTx`]
    /// client.
    ///
    /// # Errors
    ///
    /// If the link to the store is broken.
    pub(crate) async fn begin(
        client: &NonTx,
    ) -> Result<Self, Traced<database::Error>> {
        client
            .wire
            .round_trip(None)
            .await
            .map_err(tracerr::wrap!())?;

        let published = Arc::clone(&client.store).lock_owned().await;
        let working = published.clone();
        Ok(Self {
            staged: Arc::new(Mutex::new(Some(Staged { published, working }))),
            wire: Arc::clone(&client.wire),
        })
    }

    /// Commits this [`Tx`], publishing its staged writes.
    ///
    /// # Errors
    ///
    /// If the link to the store is broken, or this [`Tx`] is already
    /// committed.
    pub async fn commit(&self) -> Result<(), Traced<database::Error>> {
        self.wire
            .round_trip(Some(Step::Commit))
            .await
            .map_err(tracerr::wrap!())?;

        let Staged {
            mut published,
            working,
        } = self.staged.lock().await.take().ok_or_else(|| {
            tracerr::new!(database::Error::from(
                memory::Error::AlreadyCommitted
            ))
        })?;
        *published = working;
        Ok(())
    }
}

impl Connection for Tx {
    async fn with_store<F, R>(
        &self,
        step: Option<Step>,
        f: F,
    ) -> Result<R, Traced<database::Error>>
    where
        F: FnOnce(&mut Store) -> R,
    {
        self.wire.round_trip(step).await.map_err(tracerr::wrap!())?;

        let mut staged = self.staged.lock().await;
        let staged = staged.as_mut().ok_or_else(|| {
            tracerr::new!(database::Error::from(
                memory::Error::AlreadyCommitted
            ))
        })?;
        Ok(f(&mut staged.working))
    }

    fn wire(&self) -> &Wire {
        &self.wire
    }
}
