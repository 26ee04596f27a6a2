// SPDX-FileCopyrightText: 2025-2026 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

//! Query handles and subscriptions.
//!
//! A [`QueryExecutor`] pairs a filter and sort keys with a store. It can be
//! executed any number of times and observed for changes:
//!
//! | Method | Delivers |
//! |--------|----------|
//! | [`execute`](QueryExecutor::execute) | current matches, once |
//! | [`subscribe_to_results`](QueryExecutor::subscribe_to_results) | the full result set, whenever it differs from the last delivery |
//! | [`subscribe_to_updates`](QueryExecutor::subscribe_to_updates) | inserted or updated matches of each commit |
//! | [`results_stream`](QueryExecutor::results_stream) | current matches, then like `subscribe_to_results` |
//! | [`updates_stream`](QueryExecutor::updates_stream) | like `subscribe_to_updates` |
//! | [`delete_all`](QueryExecutor::delete_all) | nothing; removes every match |
//!
//! Records that fail to map are skipped with a warning.

use std::{
    marker::PhantomData,
    pin::Pin,
    sync::Arc,
    task::{Context as TaskContext, Poll}
};

use futures::{Stream, StreamExt, channel::mpsc};
use tracing::warn;

use crate::{
    collect::{IntoPredicates, IntoSortDescriptors},
    entity::Entity,
    error::StoreError,
    predicate::{Predicate, PredicateBuilder, and},
    record::{ObjectId, Record, RecordSource},
    sort::{SortBuilder, SortDescriptor, sort_records},
    store::{ChangeSet, Context, Delivery, Observer, Store, Subscription}
};

/// Reusable query over one entity.
pub struct QueryExecutor<E> {
    store:   Store,
    filter:  Predicate,
    sort:    Vec<SortDescriptor>,
    _entity: PhantomData<fn() -> E>
}

impl<E> Clone for QueryExecutor<E> {
    fn clone(&self) -> Self {
        Self {
            store:   self.store.clone(),
            filter:  self.filter.clone(),
            sort:    self.sort.clone(),
            _entity: PhantomData
        }
    }
}

impl<E> std::fmt::Debug for QueryExecutor<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExecutor")
            .field("filter", &self.filter.to_string())
            .field("sort", &self.sort)
            .finish_non_exhaustive()
    }
}

impl<E: Entity> QueryExecutor<E> {
    pub(crate) fn new(store: Store, filter: Predicate, sort: Vec<SortDescriptor>) -> Self {
        Self {
            store,
            filter,
            sort,
            _entity: PhantomData
        }
    }

    /// Combined filter.
    #[must_use]
    pub fn filter(&self) -> &Predicate {
        &self.filter
    }

    /// Sort keys, most significant first.
    #[must_use]
    pub fn sort(&self) -> &[SortDescriptor] {
        &self.sort
    }

    /// Fetch current matches.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the worker is gone or the fetch panicked.
    pub fn try_execute(&self) -> Result<Vec<E>, StoreError> {
        let (filter, sort) = (self.filter.clone(), self.sort.clone());
        self.store
            .try_perform_blocking(move |context| fetch_mapped::<E>(context, &filter, &sort))
    }

    /// Fetch current matches, empty on failure.
    #[must_use]
    pub fn execute(&self) -> Vec<E> {
        let (filter, sort) = (self.filter.clone(), self.sort.clone());
        self.store
            .perform_blocking(move |context| fetch_mapped::<E>(context, &filter, &sort))
            .unwrap_or_default()
    }

    /// Async version of [`execute`](Self::execute).
    pub async fn execute_async(&self) -> Vec<E> {
        let (filter, sort) = (self.filter.clone(), self.sort.clone());
        self.store
            .perform(move |context| fetch_mapped::<E>(context, &filter, &sort))
            .await
            .unwrap_or_default()
    }

    /// Delete every match and commit.
    pub fn delete_all(&self) {
        let filter = self.filter.clone();
        self.store
            .perform_blocking(move |context| delete_matches::<E>(context, &filter));
    }

    /// Async version of [`delete_all`](Self::delete_all).
    pub async fn delete_all_async(&self) {
        let filter = self.filter.clone();
        self.store
            .perform(move |context| delete_matches::<E>(context, &filter))
            .await;
    }

    /// Call `callback` with the full result set whenever a commit changes it.
    pub fn subscribe_to_results<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Vec<E>) + Send + Sync + 'static
    {
        self.store.register(Box::new(ResultsObserver {
            filter:   self.filter.clone(),
            sort:     self.sort.clone(),
            last:     Vec::new(),
            initial:  false,
            callback: Arc::new(callback)
        }))
    }

    /// Call `callback` with the inserted or updated matches of each commit.
    pub fn subscribe_to_updates<F>(&self, callback: F) -> Subscription
    where
        F: Fn(Vec<E>) + Send + Sync + 'static
    {
        self.store.register(Box::new(UpdatesObserver {
            filter:   self.filter.clone(),
            sort:     self.sort.clone(),
            callback: Arc::new(callback),
            _entity:  PhantomData
        }))
    }

    /// Stream of result sets, starting with the current one.
    #[must_use]
    pub fn results_stream(&self) -> QueryStream<E> {
        let (sender, receiver) = mpsc::unbounded();
        let subscription = self.store.register(Box::new(ResultsObserver {
            filter:   self.filter.clone(),
            sort:     self.sort.clone(),
            last:     Vec::new(),
            initial:  true,
            callback: Arc::new(move |items: Vec<E>| {
                let _ = sender.unbounded_send(items);
            })
        }));
        QueryStream {
            receiver,
            _subscription: subscription
        }
    }

    /// Stream of per-commit updates.
    #[must_use]
    pub fn updates_stream(&self) -> QueryStream<E> {
        let (sender, receiver) = mpsc::unbounded();
        let subscription = self.subscribe_to_updates(move |items| {
            let _ = sender.unbounded_send(items);
        });
        QueryStream {
            receiver,
            _subscription: subscription
        }
    }
}

impl Store {
    /// Query handle for `E` built from builder closures.
    ///
    /// ```rust,ignore
    /// let long_books = store.query::<BookEntity, _, _>(
    ///     |b| b.pages().greater_than(100),
    ///     |s| s.title().ascending()
    /// );
    /// ```
    pub fn query<E, P, S>(
        &self,
        filter: impl FnOnce(&E::Predicate) -> P,
        sort: impl FnOnce(&E::Sort) -> S
    ) -> QueryExecutor<E>
    where
        E: Entity,
        P: IntoPredicates,
        S: IntoSortDescriptors
    {
        let filter = filter(&E::Predicate::root()).into_predicates();
        let sort = sort(&E::Sort::root()).into_sort_descriptors();
        QueryExecutor::new(self.clone(), and(filter), sort)
    }
}

/// Declarative custom query: filter and sort terms for one entity.
///
/// Functions marked `#[query]` inside a `#[persistence_service]` module
/// return this; the generated client turns it into a [`QueryExecutor`].
///
/// Name the entity on `new`: the builder closures are typed before the
/// function's return type is known.
///
/// ```rust,ignore
/// #[query]
/// pub fn books_titled(title: String) -> QuerySpec<BookEntity> {
///     QuerySpec::<BookEntity>::new()
///         .filter(|b| b.title().equals(title))
///         .sort(|s| s.pages().descending())
/// }
/// ```
pub struct QuerySpec<E: Entity> {
    filter:  Vec<Predicate>,
    sort:    Vec<SortDescriptor>,
    _entity: PhantomData<fn() -> E>
}

impl<E: Entity> Default for QuerySpec<E> {
    fn default() -> Self {
        Self {
            filter:  Vec::new(),
            sort:    Vec::new(),
            _entity: PhantomData
        }
    }
}

impl<E: Entity> std::fmt::Debug for QuerySpec<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuerySpec")
            .field("entity", &E::ENTITY_NAME)
            .field("filter", &self.filter)
            .field("sort", &self.sort)
            .finish()
    }
}

impl<E: Entity> QuerySpec<E> {
    /// Match everything, unsorted.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add filter terms built from the entity's predicate builder.
    #[must_use]
    pub fn filter<P: IntoPredicates>(mut self, build: impl FnOnce(&E::Predicate) -> P) -> Self {
        self.filter
            .extend(build(&E::Predicate::root()).into_predicates());
        self
    }

    /// Add sort keys built from the entity's sort builder.
    #[must_use]
    pub fn sort<S: IntoSortDescriptors>(mut self, build: impl FnOnce(&E::Sort) -> S) -> Self {
        self.sort
            .extend(build(&E::Sort::root()).into_sort_descriptors());
        self
    }

    /// Filter terms, conjoined when executed.
    #[must_use]
    pub fn make_filter(&self) -> Vec<Predicate> {
        self.filter.clone()
    }

    /// Sort keys, most significant first.
    #[must_use]
    pub fn make_sorter(&self) -> Vec<SortDescriptor> {
        self.sort.clone()
    }
}

/// Stream returned by [`QueryExecutor::results_stream`] and
/// [`QueryExecutor::updates_stream`]. Dropping it unsubscribes.
#[derive(Debug)]
pub struct QueryStream<E> {
    receiver:      mpsc::UnboundedReceiver<Vec<E>>,
    _subscription: Subscription
}

impl<E> Stream for QueryStream<E> {
    type Item = Vec<E>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_next_unpin(cx)
    }
}

impl<E> Unpin for QueryStream<E> {}

fn map_records<E: Entity>(records: Vec<&Record>, source: &dyn RecordSource) -> Vec<E> {
    records
        .into_iter()
        .filter_map(|record| match E::from_record(record, source) {
            Ok(value) => Some(value),
            Err(error) => {
                warn!(entity = E::ENTITY_NAME, id = %record.id(), %error, "skipping record");
                None
            }
        })
        .collect()
}

fn fetch_mapped<E: Entity>(context: &Context<'_>, filter: &Predicate, sort: &[SortDescriptor]) -> Vec<E> {
    map_records(context.fetch(E::ENTITY_NAME, filter, sort), context)
}

fn delete_matches<E: Entity>(context: &mut Context<'_>, filter: &Predicate) {
    let doomed: Vec<ObjectId> = context
        .fetch(E::ENTITY_NAME, filter, &[])
        .into_iter()
        .map(Record::id)
        .collect();
    for id in doomed {
        context.delete(id);
    }
}

struct ResultsObserver<E, F> {
    filter:   Predicate,
    sort:     Vec<SortDescriptor>,
    last:     Vec<E>,
    initial:  bool,
    callback: Arc<F>
}

impl<E, F> Observer for ResultsObserver<E, F>
where
    E: Entity,
    F: Fn(Vec<E>) + Send + Sync + 'static
{
    fn prime(&mut self, view: &Context<'_>) -> Option<Delivery> {
        self.last = fetch_mapped(view, &self.filter, &self.sort);
        self.initial.then(|| deliver(&self.callback, self.last.clone()))
    }

    fn observe(&mut self, _: &ChangeSet, view: &Context<'_>) -> Option<Delivery> {
        let current: Vec<E> = fetch_mapped(view, &self.filter, &self.sort);
        if current == self.last {
            return None;
        }
        self.last = current.clone();
        Some(deliver(&self.callback, current))
    }
}

struct UpdatesObserver<E, F> {
    filter:   Predicate,
    sort:     Vec<SortDescriptor>,
    callback: Arc<F>,
    _entity:  PhantomData<fn() -> E>
}

impl<E, F> Observer for UpdatesObserver<E, F>
where
    E: Entity,
    F: Fn(Vec<E>) + Send + Sync + 'static
{
    fn prime(&mut self, _: &Context<'_>) -> Option<Delivery> {
        None
    }

    fn observe(&mut self, changes: &ChangeSet, view: &Context<'_>) -> Option<Delivery> {
        let mut touched: Vec<&Record> = changes
            .upserted()
            .filter_map(|id| view.record(id))
            .filter(|record| {
                record.entity() == E::ENTITY_NAME && self.filter.evaluate(record, view)
            })
            .collect();
        if touched.is_empty() {
            return None;
        }
        sort_records(&mut touched, &self.sort, view);
        let items: Vec<E> = map_records(touched, view);
        Some(deliver(&self.callback, items))
    }
}

fn deliver<E, F>(callback: &Arc<F>, items: Vec<E>) -> Delivery
where
    E: Send + 'static,
    F: Fn(Vec<E>) + Send + Sync + 'static
{
    let callback = Arc::clone(callback);
    Box::new(move || callback(items))
}
