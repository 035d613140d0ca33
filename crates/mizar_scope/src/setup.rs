//! Mountable components with paired setup and teardown.

use parking_lot::Mutex;

use crate::scope::{RegisterError, Scope};
use crate::{BoxError, BoxFuture, Failure};

/// A component that sets resources up in a scope and tears them down when
/// the scope closes.
///
/// `setup` runs once, against the scope the component is mounted on, and
/// returns a handle holding whatever teardown will need. `teardown` runs
/// during scope close, in reverse mount order relative to other teardown
/// callbacks, and receives the failure the scope is closing with.
pub trait Setup: Send + Sync {
    /// State carried from setup to teardown.
    type Handle: Send + 'static;

    /// Prepares the component, typically registering resources on `scope`.
    fn setup<'a>(&'a self, scope: &'a Scope) -> BoxFuture<'a, Result<Self::Handle, BoxError>>;

    /// Releases whatever [`setup`](Setup::setup) acquired.
    fn teardown(
        handle: Self::Handle,
        failure: Option<Failure>,
    ) -> BoxFuture<'static, Result<(), BoxError>>;
}

/// Errors from [`Scope::mount`].
#[derive(Debug, thiserror::Error)]
pub enum MountError {
    /// The component's setup failed. Its teardown was not registered.
    #[error("setup failed: {0}")]
    Setup(BoxError),

    /// The scope rejected the teardown registration.
    #[error(transparent)]
    Register(#[from] RegisterError),
}

impl Scope {
    /// Mounts a component: runs its setup now and queues its teardown for
    /// when this scope closes.
    pub async fn mount<S: Setup>(&self, setup: S) -> Result<(), MountError> {
        let handle = setup.setup(self).await.map_err(MountError::Setup)?;
        // The teardown store wants Sync callbacks; the lock carries a handle
        // that need not be Sync itself.
        let handle = Mutex::new(handle);
        self.add_teardown_with(move |failure| S::teardown(handle.into_inner(), failure))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use super::*;

    struct CachePlugin {
        torn_down: Arc<AtomicBool>,
    }

    impl Setup for CachePlugin {
        type Handle = Arc<AtomicBool>;

        fn setup<'a>(&'a self, scope: &'a Scope) -> BoxFuture<'a, Result<Self::Handle, BoxError>> {
            let flag = self.torn_down.clone();
            Box::pin(async move {
                scope.add_resource(String::from("warm cache"))?;
                Ok(flag)
            })
        }

        fn teardown(
            handle: Self::Handle,
            _failure: Option<Failure>,
        ) -> BoxFuture<'static, Result<(), BoxError>> {
            Box::pin(async move {
                handle.store(true, Ordering::SeqCst);
                Ok(())
            })
        }
    }

    struct FailingPlugin;

    impl Setup for FailingPlugin {
        type Handle = ();

        fn setup<'a>(&'a self, _scope: &'a Scope) -> BoxFuture<'a, Result<(), BoxError>> {
            Box::pin(async { Err(BoxError::from("port already in use")) })
        }

        fn teardown(
            _handle: Self::Handle,
            _failure: Option<Failure>,
        ) -> BoxFuture<'static, Result<(), BoxError>> {
            Box::pin(async { Ok(()) })
        }
    }

    struct FailureProbe {
        seen: Arc<Mutex<Option<String>>>,
    }

    impl Setup for FailureProbe {
        type Handle = Arc<Mutex<Option<String>>>;

        fn setup<'a>(&'a self, _scope: &'a Scope) -> BoxFuture<'a, Result<Self::Handle, BoxError>> {
            let seen = self.seen.clone();
            Box::pin(async move { Ok(seen) })
        }

        fn teardown(
            handle: Self::Handle,
            failure: Option<Failure>,
        ) -> BoxFuture<'static, Result<(), BoxError>> {
            Box::pin(async move {
                *handle.lock() = failure.map(|f| f.to_string());
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn mount_registers_resources_and_queues_teardown() {
        let torn_down = Arc::new(AtomicBool::new(false));
        let scope = Scope::new();
        scope
            .mount(CachePlugin {
                torn_down: torn_down.clone(),
            })
            .await
            .unwrap();

        assert_eq!(*scope.require_resource::<String>().unwrap(), "warm cache");
        assert!(!torn_down.load(Ordering::SeqCst));

        scope.close(None).await.unwrap();
        assert!(torn_down.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn teardown_receives_the_closing_failure() {
        let seen = Arc::new(Mutex::new(None));
        let scope = Scope::new();
        scope.mount(FailureProbe { seen: seen.clone() }).await.unwrap();

        let failure: Failure = Arc::new(std::io::Error::other("listener died"));
        scope.close(Some(failure)).await.unwrap();

        assert_eq!(seen.lock().as_deref(), Some("listener died"));
    }

    #[tokio::test]
    async fn a_failing_setup_queues_no_teardown() {
        let scope = Scope::new();
        let error = scope.mount(FailingPlugin).await.unwrap_err();

        assert!(matches!(error, MountError::Setup(_)));
        assert!(error.to_string().contains("port already in use"));
        scope.close(None).await.unwrap();
    }
}
