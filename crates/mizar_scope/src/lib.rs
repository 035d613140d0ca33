//! Hierarchical, task-scoped resource containers (Layer 1).
//!
//! `mizar_scope` shares resources between async tasks through a tree of
//! [`Scope`]s. A lookup starts at a scope and walks its parent chain, so a
//! child can see everything its ancestors published while shadowing any of it
//! locally. Scopes also carry lazy resource factories, an ordered teardown
//! chain, and a waiting primitive for resources that have not been published
//! yet.
//!
//! # Core Concepts
//!
//! - [`Scope`] - a node in the hierarchy; cloning the handle is cheap
//! - [`Scope::add_resource`] / [`Scope::get_resource`] - publish and look up
//!   values keyed by `(type, name)`
//! - [`Scope::add_resource_factory`] - lazy construction, memoized per
//!   requesting scope
//! - [`Scope::request_resource`] - wait until a matching resource appears
//!   anywhere in the chain
//! - [`Scope::run`] - execute a future with the scope active for the task,
//!   closing it (and running teardown callbacks in reverse order) on exit
//! - [`current_scope`] - the innermost scope entered via `run` on this task
//!
//! # Example
//!
//! ```
//! use mizar_scope::Scope;
//!
//! let root = Scope::new();
//! root.add_resource(42u32)?;
//!
//! let child = root.child();
//! assert_eq!(*child.require_resource::<u32>()?, 42);
//!
//! // The child can shadow the parent's value without touching it.
//! child.add_resource(7u32)?;
//! assert_eq!(*child.require_resource::<u32>()?, 7);
//! assert_eq!(*root.require_resource::<u32>()?, 42);
//! # Ok::<(), mizar_scope::BoxError>(())
//! ```
//!
//! # Architecture
//!
//! This crate is Layer 1 of the Mizar architecture:
//!
//! - **Layer 1** (`mizar_scope`): scopes, resources, teardown (this crate)
//! - **Layer 2** (`mizar_inject`): dependency injection over scopes

use core::future::Future;
use core::pin::Pin;
use std::sync::Arc;

/// Task-local tracking of the active scope.
pub mod current;

/// Resource identity and type-erased storage.
pub mod resource;

/// Scopes: registration, lookup, waiting, teardown, and scoped execution.
pub mod scope;

/// Two-phase resource installation.
pub mod setup;

/// Type-erased error produced by teardown callbacks and scope bodies.
pub type BoxError = Box<dyn core::error::Error + Send + Sync>;

/// The error a scope ended with, shared with every teardown callback.
pub type Failure = Arc<dyn core::error::Error + Send + Sync>;

/// An owned, boxed future bounded by lifetime `'a`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::current::{NoActiveScope, current_scope};
    pub use crate::resource::{DEFAULT_NAME, InvalidName, ResourceKey, ResourceName};
    pub use crate::scope::{
        CloseError, LookupError, RegisterError, ResourceEvent, RunError, Scope, TeardownError,
    };
    pub use crate::setup::{MountError, Setup};
    pub use crate::{BoxError, BoxFuture, Failure};
}

// Re-export key types at crate root for convenience
pub use current::{NoActiveScope, current_scope};
pub use resource::{DEFAULT_NAME, ResourceKey, ResourceName};
pub use scope::{
    CloseError, LookupError, RegisterError, ResourceEvent, RunError, Scope, TeardownError,
};
pub use setup::{MountError, Setup};
