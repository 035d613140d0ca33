//! Hierarchical, task-scoped resource containers for async Rust.
//!

pub use mizar_internal::*;

/// Re-export all common types for easy access.
pub mod prelude {
    pub use mizar_internal::prelude::*;
}
