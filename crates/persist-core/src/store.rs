// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Embedded object store with a serialized writer.
//!
//! # Threads
//!
//! ```text
//!  callers (any thread / task)
//!     │  Job
//!     ▼
//!  worker thread ── owns StoreState (arena, observers)
//!     │  runs jobs one at a time with a fresh Context
//!     │  commits, writes the snapshot, lets observers compute deliveries
//!     │  Delivery
//!     ▼
//!  notifier thread ── runs subscriber callbacks in commit order
//! ```
//!
//! Record state is touched only by the worker, so no locks guard it.
//! Callbacks run on the notifier thread, never concurrently with a job, and
//! may call back into the store.
//!
//! # Failure policy
//!
//! The infallible entry points ([`Store::perform_blocking`],
//! [`Store::perform`], [`Store::add_or_update`]) log and degrade when the
//! worker is gone or a job panics. The `try_` variants surface the
//! [`StoreError`] instead.

mod config;
mod context;
mod snapshot;

use std::{
    collections::{BTreeMap, HashMap},
    panic::{self, AssertUnwindSafe},
    path::PathBuf,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
        mpsc
    },
    thread
};

pub use config::{StoreConfig, StoreLocation};
pub use context::{ChangeSet, Context};
use futures::channel::oneshot;
use tracing::{debug, error, trace, warn};

use crate::{
    collect::{IntoPredicates, IntoSortDescriptors},
    entity::{Entity, Identifiable},
    error::StoreError,
    predicate::{ObjectPredicate, and},
    query::QueryExecutor,
    record::{ObjectId, Record},
    schema::Schema,
    value::FieldValue
};

type Job = Box<dyn FnOnce(&mut StoreState) + Send>;

/// Callback work produced on the worker and run on the notifier thread.
pub(crate) type Delivery = Box<dyn FnOnce() + Send>;

/// Registered change observer, driven by the worker after each commit.
pub(crate) trait Observer: Send {
    /// Called once on registration with the current state; may produce an
    /// initial delivery.
    fn prime(&mut self, view: &Context<'_>) -> Option<Delivery>;

    /// Called after every non-empty commit.
    fn observe(&mut self, changes: &ChangeSet, view: &Context<'_>) -> Option<Delivery>;
}

struct StoreState {
    schema:     Arc<Schema>,
    records:    BTreeMap<ObjectId, Record>,
    next_id:    u64,
    snapshot:   Option<PathBuf>,
    observers:  HashMap<u64, Box<dyn Observer>>,
    deliveries: mpsc::Sender<Delivery>
}

impl StoreState {
    fn view(&self) -> Context<'_> {
        Context::new(&self.records, &self.schema, self.next_id)
    }

    fn run<T>(&mut self, job: impl FnOnce(&mut Context<'_>) -> T) -> Result<T, StoreError> {
        let outcome = {
            let mut context = self.view();
            panic::catch_unwind(AssertUnwindSafe(|| job(&mut context)))
                .map(|value| (value, context.into_changes()))
        };
        match outcome {
            Ok((value, changes)) => {
                self.next_id = changes.next_id;
                self.commit(changes.records);
                Ok(value)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                warn!(%message, "store job panicked, changes discarded");
                Err(StoreError::Panicked(message))
            }
        }
    }

    fn commit(&mut self, pending: BTreeMap<ObjectId, Option<Record>>) {
        let mut changes = ChangeSet::default();
        for (id, record) in pending {
            let existed = self.records.contains_key(&id);
            match record {
                Some(record) if !existed => {
                    changes.inserted.push(id);
                    self.records.insert(id, record);
                }
                Some(record) => {
                    if self.records.get(&id) != Some(&record) {
                        changes.updated.push(id);
                        self.records.insert(id, record);
                    }
                }
                None if existed => {
                    changes.deleted.push(id);
                    self.records.remove(&id);
                }
                None => {}
            }
        }
        if changes.is_empty() {
            return;
        }

        debug!(
            model = self.schema.model_name(),
            inserted = changes.inserted.len(),
            updated = changes.updated.len(),
            deleted = changes.deleted.len(),
            "commit"
        );

        if let Some(path) = &self.snapshot
            && let Err(error) = snapshot::save(path, &self.records, self.next_id)
        {
            error!(path = %path.display(), %error, "failed to write snapshot");
        }

        let view = Context::new(&self.records, &self.schema, self.next_id);
        for observer in self.observers.values_mut() {
            if let Some(delivery) = observer.observe(&changes, &view)
                && self.deliveries.send(delivery).is_err()
            {
                warn!("notifier thread is gone, dropping delivery");
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_owned()
    }
}

struct Inner {
    jobs:          mpsc::Sender<Job>,
    schema:        Arc<Schema>,
    next_observer: AtomicU64
}

/// Cloneable handle to one store worker.
///
/// The worker shuts down once every handle, query executor and subscription
/// referring to it has been dropped.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Inner>
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("model", &self.inner.schema.model_name())
            .finish_non_exhaustive()
    }
}

impl Store {
    /// Open a store for `schema`, loading the snapshot when on disk.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the snapshot exists but cannot be read, or
    /// a thread cannot be spawned.
    pub fn open(schema: Schema, config: StoreConfig) -> Result<Self, StoreError> {
        let snapshot = config.location.snapshot_path(schema.model_name());
        let (records, next_id) = match &snapshot {
            Some(path) => snapshot::load(path)?,
            None => (BTreeMap::new(), 1)
        };

        let worker_name = config.worker_name(schema.model_name());
        let (deliveries, incoming) = mpsc::channel::<Delivery>();
        thread::Builder::new()
            .name(format!("{worker_name}-notify"))
            .spawn(move || {
                for delivery in incoming {
                    if panic::catch_unwind(AssertUnwindSafe(delivery)).is_err() {
                        warn!("subscriber callback panicked");
                    }
                }
            })
            .map_err(StoreError::Spawn)?;

        let schema = Arc::new(schema);
        let mut state = StoreState {
            schema: Arc::clone(&schema),
            records,
            next_id,
            snapshot,
            observers: HashMap::new(),
            deliveries
        };
        let (jobs, queue) = mpsc::channel::<Job>();
        thread::Builder::new()
            .name(worker_name)
            .spawn(move || {
                for job in queue {
                    job(&mut state);
                }
                trace!(model = state.schema.model_name(), "store worker stopped");
            })
            .map_err(StoreError::Spawn)?;

        debug!(model = schema.model_name(), "store opened");
        Ok(Self {
            inner: Arc::new(Inner {
                jobs,
                schema,
                next_observer: AtomicU64::new(1)
            })
        })
    }

    /// Open a volatile store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Spawn`] when a thread cannot be spawned.
    pub fn in_memory(schema: Schema) -> Result<Self, StoreError> {
        Self::open(schema, StoreConfig::in_memory())
    }

    /// Schema the store was opened with.
    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.inner.schema
    }

    /// Run `job` on the worker and wait for it. Pending changes are committed
    /// when the job returns.
    ///
    /// Blocks the calling thread; prefer [`try_perform`](Self::try_perform)
    /// inside async code. Calling it from a subscriber callback is fine,
    /// calling it from inside another job deadlocks.
    ///
    /// # Errors
    ///
    /// [`StoreError::Closed`] when the worker is gone,
    /// [`StoreError::Panicked`] when the job panicked.
    pub fn try_perform_blocking<T, F>(&self, job: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Context<'_>) -> T + Send + 'static,
        T: Send + 'static
    {
        futures::executor::block_on(self.submit(job)?)
            .unwrap_or(Err(StoreError::Closed))
    }

    /// Async version of [`try_perform_blocking`](Self::try_perform_blocking).
    ///
    /// # Errors
    ///
    /// Same as [`try_perform_blocking`](Self::try_perform_blocking).
    pub async fn try_perform<T, F>(&self, job: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut Context<'_>) -> T + Send + 'static,
        T: Send + 'static
    {
        self.submit(job)?.await.unwrap_or(Err(StoreError::Closed))
    }

    /// Run `job` on the worker and wait for it, `None` on failure.
    pub fn perform_blocking<T, F>(&self, job: F) -> Option<T>
    where
        F: FnOnce(&mut Context<'_>) -> T + Send + 'static,
        T: Send + 'static
    {
        self.try_perform_blocking(job).map_err(log_degraded).ok()
    }

    /// Run `job` on the worker, `None` on failure.
    pub async fn perform<T, F>(&self, job: F) -> Option<T>
    where
        F: FnOnce(&mut Context<'_>) -> T + Send + 'static,
        T: Send + 'static
    {
        self.try_perform(job).await.map_err(log_degraded).ok()
    }

    /// Query handle for `E` built from raw terms.
    #[must_use]
    pub fn make_query<E: Entity>(
        &self,
        filter: impl IntoPredicates,
        sort: impl IntoSortDescriptors
    ) -> QueryExecutor<E> {
        QueryExecutor::new(
            self.clone(),
            and(filter.into_predicates()),
            sort.into_sort_descriptors()
        )
    }

    /// Insert or update a batch of identifiable entities in one job.
    ///
    /// Existing records are found with a single `id IN ..` fetch. Records
    /// are committed only when something actually changed. A failed batch
    /// leaves the store untouched.
    pub async fn add_or_update<E: Identifiable>(&self, entities: Vec<E>) {
        if entities.is_empty() {
            return;
        }
        let count = entities.len();
        let outcome = self
            .try_perform(move |context| upsert(context, &entities))
            .await;
        match outcome {
            Ok(()) => trace!(entity = E::ENTITY_NAME, count, "add_or_update finished"),
            Err(error) => warn!(entity = E::ENTITY_NAME, count, %error, "add_or_update failed")
        }
    }

    pub(crate) fn register(&self, observer: Box<dyn Observer>) -> Subscription {
        let id = self.inner.next_observer.fetch_add(1, Ordering::Relaxed);
        let job: Job = Box::new(move |state: &mut StoreState| {
            let mut observer = observer;
            if let Some(delivery) = observer.prime(&state.view())
                && state.deliveries.send(delivery).is_err()
            {
                warn!("notifier thread is gone, dropping initial delivery");
            }
            state.observers.insert(id, observer);
        });
        if self.inner.jobs.send(job).is_err() {
            warn!("subscribing to a closed store");
        }
        Subscription {
            id,
            jobs: Some(self.inner.jobs.clone())
        }
    }

    fn submit<T, F>(
        &self,
        job: F
    ) -> Result<oneshot::Receiver<Result<T, StoreError>>, StoreError>
    where
        F: FnOnce(&mut Context<'_>) -> T + Send + 'static,
        T: Send + 'static
    {
        let (reply, receiver) = oneshot::channel();
        let job: Job = Box::new(move |state: &mut StoreState| {
            trace!("running job");
            let _ = reply.send(state.run(job));
        });
        self.inner.jobs.send(job).map_err(|_| StoreError::Closed)?;
        Ok(receiver)
    }
}

fn upsert<E: Identifiable>(context: &mut Context<'_>, entities: &[E]) {
    let ids: Vec<String> = entities.iter().map(|entity| entity.id().to_owned()).collect();
    let filter = ObjectPredicate::root()
        .value::<String>(E::ID_KEY, false)
        .is_in(ids);

    let mut existing: HashMap<String, ObjectId> = context
        .fetch(E::ENTITY_NAME, &filter, &[])
        .into_iter()
        .filter_map(|record| {
            let id = String::from_value(record.value(E::ID_KEY)?)?;
            Some((id, record.id()))
        })
        .collect();

    for entity in entities {
        let object = match existing.get(entity.id()) {
            Some(object) => *object,
            None => {
                let object = context.insert(E::ENTITY_NAME);
                existing.insert(entity.id().to_owned(), object);
                object
            }
        };
        entity.update(object, context);
    }
}

fn log_degraded(error: StoreError) -> StoreError {
    warn!(%error, "store operation degraded to an empty result");
    error
}

/// Live registration returned by the `subscribe_*` methods.
///
/// Dropping it, or calling [`cancel`](Self::cancel), unregisters the
/// callback. Deliveries already queued may still arrive.
#[derive(Debug)]
#[must_use = "dropping a subscription unregisters it"]
pub struct Subscription {
    id:   u64,
    jobs: Option<mpsc::Sender<Job>>
}

impl Subscription {
    /// Unregister now.
    pub fn cancel(mut self) {
        self.unregister();
    }

    fn unregister(&mut self) {
        let Some(jobs) = self.jobs.take() else {
            return;
        };
        let id = self.id;
        let _ = jobs.send(Box::new(move |state: &mut StoreState| {
            state.observers.remove(&id);
        }));
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unregister();
    }
}
