//! The task's active scope.
//!
//! [`Scope::run`](crate::scope::Scope::run) holds its scope active for the
//! duration of the body future; [`current_scope`] reads it back anywhere
//! inside. The active scope is task-local state: it follows the future across
//! worker threads but is not inherited by tasks spawned from it. Hand a
//! spawned task its own [`Scope`] clone instead.

use core::future::Future;

use crate::scope::Scope;

tokio::task_local! {
    static ACTIVE_SCOPE: Scope;
}

/// No scope is active on the current task.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no scope is active on this task")]
pub struct NoActiveScope;

/// Returns the scope currently active on this task.
///
/// A scope is active only inside [`Scope::run`](crate::scope::Scope::run);
/// outside one this fails with [`NoActiveScope`].
pub fn current_scope() -> Result<Scope, NoActiveScope> {
    ACTIVE_SCOPE.try_with(Scope::clone).map_err(|_| NoActiveScope)
}

/// Drives `fut` with `scope` active on the task.
///
/// The previous active scope, if any, is restored when `fut` settles, by
/// construction of the task-local scope guard.
pub(crate) async fn enter<F: Future>(scope: Scope, fut: F) -> F::Output {
    ACTIVE_SCOPE.scope(scope, fut).await
}
