//! Hierarchical resource scopes.
//!
//! A [`Scope`] stores resources and resource factories, chains to an optional
//! parent for lookups, and runs teardown callbacks in reverse order when it
//! closes. [`Scope::run`] drives a future with the scope held as the active
//! one for the task, then closes the scope when the future settles.

pub mod events;
pub mod teardown;

use core::any::{TypeId, type_name};
use core::fmt;
use core::future::Future;
use core::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hashbrown::HashSet;
use parking_lot::RwLock;
use tokio::sync::broadcast;

use crate::current;
use crate::resource::{
    DEFAULT_NAME, FactorySlot, InvalidName, Payload, ResourceKey, ResourceName, ResourceTable,
    erase, extract,
};
use crate::{BoxError, Failure};

pub use events::ResourceEvent;
pub use teardown::TeardownError;

use events::EventHub;
use teardown::{TeardownChain, TeardownFn};

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Errors from registering a resource, factory, or teardown callback.
#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    /// The scope has already been closed.
    #[error("the scope is closed")]
    Closed,

    /// The resource name is not a word string.
    #[error(transparent)]
    InvalidName(#[from] InvalidName),

    /// An entry of the same kind already exists under this type and name.
    #[error("a `{type_name}` resource named `{name}` is already registered in this scope")]
    DuplicateKey {
        /// The registration type's name.
        type_name: &'static str,
        /// The name the registration collided on.
        name: ResourceName,
    },

    /// An entry of the same kind already exists under this binding.
    #[error("binding `{binding}` is already taken in this scope")]
    DuplicateBinding {
        /// The binding the registration collided on.
        binding: String,
    },
}

/// Errors from resolving a resource.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The scope has already been closed.
    #[error("the scope is closed")]
    Closed,

    /// Nothing in the scope chain matched the requested type and name.
    #[error("no `{type_name}` resource named `{name}` was found")]
    NotFound {
        /// The requested type's name.
        type_name: &'static str,
        /// The requested resource name.
        name: ResourceName,
    },

    /// Nothing in the scope chain is registered under the requested binding.
    #[error("no resource is bound to `{binding}`")]
    BindingNotFound {
        /// The requested binding.
        binding: String,
    },

    /// The resource under the requested binding has a different type.
    #[error("the resource bound to `{binding}` is not a `{expected}`")]
    BindingType {
        /// The requested binding.
        binding: String,
        /// The type the caller asked for.
        expected: &'static str,
    },
}

pub(crate) fn not_found<T: ?Sized + 'static>(name: &str) -> LookupError {
    LookupError::NotFound {
        type_name: type_name::<T>(),
        name: ResourceName::raw(name),
    }
}

/// Errors from closing a scope.
#[derive(Debug, thiserror::Error)]
pub enum CloseError {
    /// The scope was closed before.
    #[error("the scope is already closed")]
    AlreadyClosed,

    /// One or more teardown callbacks failed.
    #[error(transparent)]
    Teardown(#[from] TeardownError),
}

/// Errors from [`Scope::run`].
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// The scope was already run once; a scope cannot be entered twice.
    #[error("the scope has already been entered")]
    AlreadyEntered,

    /// The scope was closed before it was run.
    #[error("the scope is already closed")]
    AlreadyClosed,

    /// The body future resolved to an error. The scope still closed cleanly.
    #[error("scope body failed: {0}")]
    Failure(Failure),

    /// Teardown callbacks failed while the scope was closing.
    #[error("{teardown}")]
    Teardown {
        /// The aggregated callback failures.
        teardown: TeardownError,
        /// The body failure the scope was closing with, if any.
        failure: Option<Failure>,
    },
}

// ─────────────────────────────────────────────────────────────────────────────
// Scope
// ─────────────────────────────────────────────────────────────────────────────

struct ScopeInner {
    parent: Option<Scope>,
    hub: EventHub,
    entered: AtomicBool,
    state: RwLock<ScopeState>,
}

#[derive(Default)]
struct ScopeState {
    closed: bool,
    table: ResourceTable,
    teardown: TeardownChain,
}

/// A hierarchical, task-scoped resource container.
///
/// Scopes hold resources keyed by type and name. Lookups walk the parent
/// chain, so a child sees everything its ancestors hold while its own
/// registrations shadow same-keyed ones further up. Cloning a `Scope` is
/// cheap and yields a handle to the same container.
///
/// A scope is closed explicitly with [`close`](Scope::close) or, more
/// commonly, by [`run`](Scope::run), which closes it as soon as the body
/// future settles. Closing runs the registered teardown callbacks in reverse
/// registration order and permanently disables the scope.
#[derive(Clone)]
pub struct Scope {
    inner: Arc<ScopeInner>,
}

impl Scope {
    /// Creates a scope.
    ///
    /// When the creating task has an active scope, the new one becomes its
    /// child; otherwise it is a root. Use [`child`](Scope::child) to pick the
    /// parent explicitly.
    #[must_use]
    pub fn new() -> Self {
        Self::with_parent(current::current_scope().ok())
    }

    /// Creates a child of this scope.
    #[must_use]
    pub fn child(&self) -> Self {
        Self::with_parent(Some(self.clone()))
    }

    fn with_parent(parent: Option<Scope>) -> Self {
        Self {
            inner: Arc::new(ScopeInner {
                parent,
                hub: EventHub::new(),
                entered: AtomicBool::new(false),
                state: RwLock::new(ScopeState::default()),
            }),
        }
    }

    /// The parent scope, if this is not a root.
    #[must_use]
    pub fn parent(&self) -> Option<&Scope> {
        self.inner.parent.as_ref()
    }

    /// Whether the scope has been closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.state.read().closed
    }

    /// Iterates the scope chain from this scope up to the root.
    #[must_use]
    pub fn chain(&self) -> Chain<'_> {
        Chain { next: Some(self) }
    }

    /// Subscribes to registration events from this scope.
    ///
    /// Only events from this scope are delivered; ancestors have their own
    /// streams. [`request_resource`](Scope::request_resource) watches the
    /// whole chain.
    #[must_use]
    pub fn resource_events(&self) -> broadcast::Receiver<ResourceEvent> {
        self.inner.hub.subscribe()
    }

    // ───── Registration ─────

    /// Adds a resource under the default name.
    ///
    /// The value is shared as an `Arc<T>` with every scope that can see it.
    /// Fails if the scope is closed or already holds a `T` under the same
    /// name.
    pub fn add_resource<T>(&self, value: T) -> Result<(), RegisterError>
    where
        T: Send + Sync + 'static,
    {
        self.add_value_entry::<T>(DEFAULT_NAME, None, Arc::new(value))
    }

    /// Adds a resource under `name`.
    pub fn add_resource_named<T>(&self, name: &str, value: T) -> Result<(), RegisterError>
    where
        T: Send + Sync + 'static,
    {
        self.add_value_entry::<T>(name, None, Arc::new(value))
    }

    /// Adds a resource under `name`, also reachable through `binding`.
    ///
    /// Bindings are scope-wide string aliases resolved with
    /// [`resolve`](Scope::resolve), independent of the type-and-name key.
    pub fn add_resource_bound<T>(
        &self,
        name: &str,
        binding: &str,
        value: T,
    ) -> Result<(), RegisterError>
    where
        T: Send + Sync + 'static,
    {
        self.add_value_entry::<T>(name, Some(binding), Arc::new(value))
    }

    /// Adds an already shared resource under the default name.
    ///
    /// This is the only way to register an unsized type, such as a trait
    /// object: the registration type is the `T` of the `Arc`, so
    /// `add_resource_arc::<dyn Database>(pool)` registers under
    /// `dyn Database`.
    pub fn add_resource_arc<T>(&self, value: Arc<T>) -> Result<(), RegisterError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.add_value_entry::<T>(DEFAULT_NAME, None, value)
    }

    /// Adds an already shared resource under `name`.
    pub fn add_resource_arc_named<T>(&self, name: &str, value: Arc<T>) -> Result<(), RegisterError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.add_value_entry::<T>(name, None, value)
    }

    /// Adds an already shared resource under `name` and `binding`.
    pub fn add_resource_arc_bound<T>(
        &self,
        name: &str,
        binding: &str,
        value: Arc<T>,
    ) -> Result<(), RegisterError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.add_value_entry::<T>(name, Some(binding), value)
    }

    /// Adds a lazy factory for `T` under the default name.
    ///
    /// The factory runs the first time a scope resolves the key, against that
    /// requesting scope, and the produced value is stored there. Every scope
    /// that resolves the key gets its own instance; repeated lookups from the
    /// same scope share one.
    pub fn add_resource_factory<T, F>(&self, factory: F) -> Result<(), RegisterError>
    where
        T: Send + Sync + 'static,
        F: Fn(&Scope) -> T + Send + Sync + 'static,
    {
        self.add_factory_entry::<T>(
            DEFAULT_NAME,
            None,
            Box::new(move |scope| erase(Arc::new(factory(scope)))),
        )
    }

    /// Adds a lazy factory for `T` under `name`.
    pub fn add_resource_factory_named<T, F>(
        &self,
        name: &str,
        factory: F,
    ) -> Result<(), RegisterError>
    where
        T: Send + Sync + 'static,
        F: Fn(&Scope) -> T + Send + Sync + 'static,
    {
        self.add_factory_entry::<T>(name, None, Box::new(move |scope| erase(Arc::new(factory(scope)))))
    }

    /// Adds a lazy factory for `T` under `name` and `binding`.
    pub fn add_resource_factory_bound<T, F>(
        &self,
        name: &str,
        binding: &str,
        factory: F,
    ) -> Result<(), RegisterError>
    where
        T: Send + Sync + 'static,
        F: Fn(&Scope) -> T + Send + Sync + 'static,
    {
        self.add_factory_entry::<T>(
            name,
            Some(binding),
            Box::new(move |scope| erase(Arc::new(factory(scope)))),
        )
    }

    /// Adds a lazy factory producing an `Arc<T>` under the default name.
    ///
    /// Like [`add_resource_arc`](Scope::add_resource_arc), this is the
    /// factory form that can register unsized types.
    pub fn add_resource_factory_arc<T, F>(&self, factory: F) -> Result<(), RegisterError>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Scope) -> Arc<T> + Send + Sync + 'static,
    {
        self.add_factory_entry::<T>(DEFAULT_NAME, None, Box::new(move |scope| erase(factory(scope))))
    }

    /// Adds a lazy factory producing an `Arc<T>` under `name`.
    pub fn add_resource_factory_arc_named<T, F>(
        &self,
        name: &str,
        factory: F,
    ) -> Result<(), RegisterError>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Scope) -> Arc<T> + Send + Sync + 'static,
    {
        self.add_factory_entry::<T>(name, None, Box::new(move |scope| erase(factory(scope))))
    }

    /// Adds a lazy factory producing an `Arc<T>` under `name` and `binding`.
    pub fn add_resource_factory_arc_bound<T, F>(
        &self,
        name: &str,
        binding: &str,
        factory: F,
    ) -> Result<(), RegisterError>
    where
        T: ?Sized + Send + Sync + 'static,
        F: Fn(&Scope) -> Arc<T> + Send + Sync + 'static,
    {
        self.add_factory_entry::<T>(name, Some(binding), Box::new(move |scope| erase(factory(scope))))
    }

    fn add_value_entry<T>(
        &self,
        name: &str,
        binding: Option<&str>,
        value: Arc<T>,
    ) -> Result<(), RegisterError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = ResourceKey::of::<T>(ResourceName::new(name)?);
        {
            let mut state = self.inner.state.write();
            if state.closed {
                return Err(RegisterError::Closed);
            }
            state.table.try_insert_value(key.clone(), binding, erase(value))?;
        }
        tracing::debug!(resource = key.type_name(), name = %key.name(), "added resource");
        self.inner.hub.publish(ResourceEvent::new(key, false));
        Ok(())
    }

    fn add_factory_entry<T>(
        &self,
        name: &str,
        binding: Option<&str>,
        produce: Box<dyn Fn(&Scope) -> Payload + Send + Sync>,
    ) -> Result<(), RegisterError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = ResourceKey::of::<T>(ResourceName::new(name)?);
        let slot = Arc::new(FactorySlot::new(
            key.clone(),
            binding.map(ToOwned::to_owned),
            produce,
        ));
        {
            let mut state = self.inner.state.write();
            if state.closed {
                return Err(RegisterError::Closed);
            }
            state.table.try_insert_factory(slot)?;
        }
        tracing::debug!(resource = key.type_name(), name = %key.name(), "added resource factory");
        self.inner.hub.publish(ResourceEvent::new(key, true));
        Ok(())
    }

    // ───── Lookup ─────

    /// Looks up a `T` under the default name.
    pub fn get_resource<T>(&self) -> Result<Option<Arc<T>>, LookupError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get_resource_named(DEFAULT_NAME)
    }

    /// Looks up a `T` under `name`.
    ///
    /// Resolution order: a value in this scope, then the nearest factory
    /// anywhere on the chain, then the nearest ancestor value. A factory hit
    /// materializes the value into this scope first, so later lookups from
    /// here return the same instance.
    pub fn get_resource_named<T>(&self, name: &str) -> Result<Option<Arc<T>>, LookupError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let key = ResourceKey::of::<T>(ResourceName::raw(name));
        {
            let state = self.inner.state.read();
            if state.closed {
                return Err(LookupError::Closed);
            }
            if let Some(payload) = state.table.value(&key) {
                return Ok(Some(stored::<T>(payload)));
            }
        }

        let slot = self
            .chain()
            .find_map(|node| node.inner.state.read().table.factory(&key).cloned());
        if let Some(slot) = slot {
            return Ok(Some(stored::<T>(&self.materialize(&slot))));
        }

        for node in self.chain().skip(1) {
            if let Some(payload) = node.inner.state.read().table.value(&key) {
                return Ok(Some(stored::<T>(payload)));
            }
        }
        Ok(None)
    }

    /// Looks up a `T` under the default name, failing if it is missing.
    pub fn require_resource<T>(&self) -> Result<Arc<T>, LookupError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.require_resource_named(DEFAULT_NAME)
    }

    /// Looks up a `T` under `name`, failing if it is missing.
    pub fn require_resource_named<T>(&self, name: &str) -> Result<Arc<T>, LookupError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.get_resource_named(name)?.ok_or_else(|| not_found::<T>(name))
    }

    /// Looks up a `T` under the default name, waiting until one appears.
    pub async fn request_resource<T>(&self) -> Result<Arc<T>, LookupError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        self.request_resource_named(DEFAULT_NAME).await
    }

    /// Looks up a `T` under `name`, waiting until one appears.
    ///
    /// The wait covers the whole scope chain: a matching registration in any
    /// ancestor releases it. Subscriptions are taken before the first
    /// resolution attempt, so a registration racing this call is not missed.
    /// The wait ends in `NotFound` only if every scope on the chain is
    /// dropped, and never resolves if the chain stays alive without the
    /// resource appearing.
    pub async fn request_resource_named<T>(&self, name: &str) -> Result<Arc<T>, LookupError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let receivers: Vec<_> = self.chain().map(|node| node.inner.hub.subscribe()).collect();
        if let Some(value) = self.get_resource_named::<T>(name)? {
            return Ok(value);
        }
        events::wait_for(receivers, name, || self.get_resource_named::<T>(name)).await
    }

    /// Collects every `T` visible from this scope, across all names.
    ///
    /// Registrations closer to this scope win per name, in the same order a
    /// single lookup resolves: local values, then chain factories for names
    /// not yet covered, then ancestor values. Factory hits materialize into
    /// this scope. The order of the returned values is unspecified.
    pub fn get_resources<T>(&self) -> Result<Vec<Arc<T>>, LookupError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let type_id = TypeId::of::<T>();
        let mut seen: HashSet<ResourceName> = HashSet::new();
        let mut found: Vec<Arc<T>> = Vec::new();

        {
            let state = self.inner.state.read();
            if state.closed {
                return Err(LookupError::Closed);
            }
            for (key, payload) in state.table.values_of(type_id) {
                seen.insert(key.name().clone());
                found.push(stored::<T>(payload));
            }
        }

        // Collect matching factory slots before running any of them, so the
        // chain locks are released by the time a factory body runs.
        let mut slots: Vec<Arc<FactorySlot>> = Vec::new();
        for node in self.chain() {
            let state = node.inner.state.read();
            for slot in state.table.factories_of(type_id) {
                let name = slot.key.name();
                if seen.contains(name) || slots.iter().any(|held| held.key.name() == name) {
                    continue;
                }
                slots.push(slot.clone());
            }
        }
        for slot in slots {
            seen.insert(slot.key.name().clone());
            found.push(stored::<T>(&self.materialize(&slot)));
        }

        for node in self.chain().skip(1) {
            let state = node.inner.state.read();
            for (key, payload) in state.table.values_of(type_id) {
                if seen.insert(key.name().clone()) {
                    found.push(stored::<T>(payload));
                }
            }
        }
        Ok(found)
    }

    /// Resolves the resource registered under the string `binding`.
    ///
    /// Bindings follow the same resolution order as keyed lookups: a bound
    /// value in this scope, then the nearest bound factory on the chain
    /// (materialized into this scope), then ancestor bound values. Fails
    /// with `BindingType` when the bound resource is not a `T`.
    pub fn resolve<T>(&self, binding: &str) -> Result<Arc<T>, LookupError>
    where
        T: ?Sized + Send + Sync + 'static,
    {
        let mismatch = || LookupError::BindingType {
            binding: binding.to_owned(),
            expected: type_name::<T>(),
        };

        {
            let state = self.inner.state.read();
            if state.closed {
                return Err(LookupError::Closed);
            }
            if let Some(payload) = state.table.bound_value(binding) {
                return extract::<T>(payload).ok_or_else(mismatch);
            }
        }

        let slot = self
            .chain()
            .find_map(|node| node.inner.state.read().table.bound_factory(binding).cloned());
        if let Some(slot) = slot {
            return extract::<T>(&self.materialize(&slot)).ok_or_else(mismatch);
        }

        for node in self.chain().skip(1) {
            if let Some(payload) = node.inner.state.read().table.bound_value(binding) {
                return extract::<T>(payload).ok_or_else(mismatch);
            }
        }
        Err(LookupError::BindingNotFound {
            binding: binding.to_owned(),
        })
    }

    /// Runs `slot`'s factory against this scope and records the produced
    /// value here. The factory body runs without any lock held, so it may
    /// register or look up resources itself.
    fn materialize(&self, slot: &FactorySlot) -> Payload {
        let payload = slot.produce(self);
        let mut state = self.inner.state.write();
        state
            .table
            .memoize(slot.key.clone(), slot.binding.as_deref(), payload)
    }

    // ───── Lifecycle ─────

    /// Registers a callback to run when the scope closes.
    ///
    /// Callbacks run in reverse registration order. A failing callback does
    /// not stop the others; all failures surface together in the close
    /// result.
    pub fn add_teardown<F, Fut, E>(&self, callback: F) -> Result<(), RegisterError>
    where
        F: FnOnce() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError>,
    {
        self.push_teardown(Box::new(move |_failure| {
            Box::pin(async move { callback().await.map_err(Into::into) })
        }))
    }

    /// Registers a teardown callback that receives the failure the scope is
    /// closing with, or `None` on a clean close.
    pub fn add_teardown_with<F, Fut, E>(&self, callback: F) -> Result<(), RegisterError>
    where
        F: FnOnce(Option<Failure>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), E>> + Send + 'static,
        E: Into<BoxError>,
    {
        self.push_teardown(Box::new(move |failure| {
            Box::pin(async move { callback(failure).await.map_err(Into::into) })
        }))
    }

    fn push_teardown(&self, callback: TeardownFn) -> Result<(), RegisterError> {
        let mut state = self.inner.state.write();
        if state.closed {
            return Err(RegisterError::Closed);
        }
        state.teardown.push(callback);
        Ok(())
    }

    /// Closes the scope, running its teardown callbacks in reverse order.
    ///
    /// `failure` is handed to callbacks registered with
    /// [`add_teardown_with`](Scope::add_teardown_with). After this returns
    /// the scope rejects every further operation; closing twice fails with
    /// `AlreadyClosed`. Cancelling the returned future loses any failures
    /// already collected, but the scope stays closed.
    pub async fn close(&self, failure: Option<Failure>) -> Result<(), CloseError> {
        let entries = {
            let mut state = self.inner.state.write();
            if state.closed {
                return Err(CloseError::AlreadyClosed);
            }
            state.closed = true;
            state.teardown.take()
        };
        tracing::debug!(callbacks = entries.len(), "closing scope");
        teardown::run_all(entries, failure).await.map_err(CloseError::from)
    }

    /// Runs `body` with this scope active on the task, then closes the scope.
    ///
    /// While the body runs, [`current_scope`](crate::current::current_scope)
    /// on the same task returns this scope; the previously active one is
    /// restored when `run` returns, even if the body fails. A body error is
    /// converted into a [`Failure`], handed to the teardown callbacks, and
    /// reported back; teardown failures on top of it surface in
    /// [`RunError::Teardown`]. A scope runs at most once.
    ///
    /// ```
    /// use mizar_scope::{BoxError, Scope};
    ///
    /// # #[tokio::main(flavor = "current_thread")]
    /// # async fn main() -> Result<(), BoxError> {
    /// let scope = Scope::new();
    /// scope.add_resource(42u32)?;
    /// let answer = scope
    ///     .run(async {
    ///         let active = mizar_scope::current_scope()?;
    ///         let n = active.require_resource::<u32>()?;
    ///         Ok::<u32, BoxError>(*n)
    ///     })
    ///     .await?;
    /// assert_eq!(answer, 42);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run<F, T, E>(&self, body: F) -> Result<T, RunError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<BoxError>,
    {
        if self.is_closed() {
            return Err(RunError::AlreadyClosed);
        }
        if self.inner.entered.swap(true, Ordering::SeqCst) {
            return Err(RunError::AlreadyEntered);
        }
        current::enter(self.clone(), async move {
            match body.await {
                Ok(value) => match self.close(None).await {
                    Ok(()) => Ok(value),
                    Err(CloseError::AlreadyClosed) => {
                        tracing::warn!("scope was closed from inside its own run body");
                        Ok(value)
                    }
                    Err(CloseError::Teardown(teardown)) => Err(RunError::Teardown {
                        teardown,
                        failure: None,
                    }),
                },
                Err(error) => {
                    let failure: Failure = Arc::from(error.into());
                    match self.close(Some(failure.clone())).await {
                        Ok(()) => Err(RunError::Failure(failure)),
                        Err(CloseError::AlreadyClosed) => {
                            tracing::warn!("scope was closed from inside its own run body");
                            Err(RunError::Failure(failure))
                        }
                        Err(CloseError::Teardown(teardown)) => Err(RunError::Teardown {
                            teardown,
                            failure: Some(failure),
                        }),
                    }
                }
            }
        })
        .await
    }
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("root", &self.parent().is_none())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

/// Two handles are equal when they point at the same scope.
impl PartialEq for Scope {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Scope {}

/// Iterator over a scope and its ancestors, nearest first.
///
/// Created by [`Scope::chain`].
#[derive(Debug, Clone)]
pub struct Chain<'a> {
    next: Option<&'a Scope>,
}

impl<'a> Iterator for Chain<'a> {
    type Item = &'a Scope;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.parent();
        Some(current)
    }
}

fn stored<T>(payload: &Payload) -> Arc<T>
where
    T: ?Sized + Send + Sync + 'static,
{
    extract::<T>(payload).expect("stored resource payload does not match its key (this is a bug)")
}
