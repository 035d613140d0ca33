//! # Mizar Internal Library
//!
//! Re-exports the core Mizar crates for convenience.

/// Layer 1: hierarchical, task-scoped resource containers.
pub use mizar_scope;

/// Layer 2: dependency injection over scopes.
pub use mizar_inject;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use mizar_inject::prelude::*;
    pub use mizar_scope::prelude::*;
}
