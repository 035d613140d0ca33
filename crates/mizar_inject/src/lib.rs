//! Dependency injection over Mizar scopes (Layer 2).
//!
//! `mizar_inject` wraps async functions so their parameters are resolved
//! from a [`Scope`](mizar_scope::Scope) instead of being passed by the
//! caller. The wrapper records which resources the function consumes at wrap
//! time, so a missing dependency is diagnosable before anything runs.
//!
//! # Core Concepts
//!
//! - [`Dep<T>`](Dep) - a parameter resolved from the scope by type and name
//! - [`Label`] - a type-level resource name for non-default dependencies
//! - [`inject`] - wraps an async function into an [`Injected`] value
//! - [`Injected::call`] - resolves against the task's active scope
//! - [`Injected::call_in`] - resolves against an explicit scope
//!
//! # Example
//!
//! ```
//! use mizar_inject::{Dep, inject};
//! use mizar_scope::{BoxError, Scope};
//!
//! struct Config {
//!     greeting: &'static str,
//! }
//!
//! async fn greet(config: Dep<Config>, name: Dep<String>) -> String {
//!     format!("{}, {}!", config.greeting, *name)
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), BoxError> {
//! let scope = Scope::new();
//! scope.add_resource(Config { greeting: "hello" })?;
//! scope.add_resource(String::from("world"))?;
//!
//! let greet = inject(greet);
//! let message = scope
//!     .run(async move { Ok::<_, BoxError>(greet.call().await?) })
//!     .await?;
//! assert_eq!(message, "hello, world!");
//! # Ok(())
//! # }
//! ```
//!
//! # Architecture
//!
//! This crate is Layer 2 of the Mizar architecture:
//!
//! - **Layer 1** (`mizar_scope`): scopes, resources, teardown
//! - **Layer 2** (`mizar_inject`): dependency injection over scopes (this
//!   crate)

/// Dependency declarations: [`Dep`], labels, and scope extraction.
pub mod dep;

/// Wrapped async functions and their binding tables.
pub mod injected;

use mizar_scope::{LookupError, NoActiveScope};

/// Errors from resolving an injected call's dependencies.
#[derive(Debug, thiserror::Error)]
pub enum InjectError {
    /// The call ran on a task with no active scope.
    #[error(transparent)]
    NoActiveScope(#[from] NoActiveScope),

    /// A dependency failed to resolve.
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Re-export all common types for easy access.
pub mod prelude {
    pub use crate::InjectError;
    pub use crate::dep::{DefaultName, Dep, DepBinding, FromScope, Label};
    pub use crate::injected::{InjectFn, Injected, inject};
}

// Re-export key types at crate root for convenience
pub use dep::{DefaultName, Dep, DepBinding, FromScope, Label};
pub use injected::{InjectFn, Injected, inject};
