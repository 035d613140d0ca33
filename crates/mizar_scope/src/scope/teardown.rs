//! Reverse-order teardown of registered callbacks.

use core::fmt;

use crate::{BoxError, BoxFuture, Failure};

pub(crate) type TeardownFuture = BoxFuture<'static, Result<(), BoxError>>;

/// A queued teardown callback. Receives the failure that is closing the
/// scope, if any.
///
/// `Sync` is required because the chain lives behind the scope's `RwLock`,
/// whose readers may share it across threads.
pub(crate) type TeardownFn = Box<dyn FnOnce(Option<Failure>) -> TeardownFuture + Send + Sync>;

/// The callbacks a scope will run when it closes.
///
/// Callbacks run in reverse registration order, so later registrations may
/// depend on earlier ones during cleanup. Closing takes the whole list; a
/// closed scope has nothing left to run.
#[derive(Default)]
pub(crate) struct TeardownChain {
    entries: Vec<TeardownFn>,
}

impl TeardownChain {
    pub(crate) fn push(&mut self, callback: TeardownFn) {
        self.entries.push(callback);
    }

    pub(crate) fn take(&mut self) -> Vec<TeardownFn> {
        core::mem::take(&mut self.entries)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Runs every callback in reverse registration order.
///
/// A failing callback never stops the ones after it; all failures are
/// collected into a single [`TeardownError`] in the order they occurred.
pub(crate) async fn run_all(
    entries: Vec<TeardownFn>,
    failure: Option<Failure>,
) -> Result<(), TeardownError> {
    let mut failures = Vec::new();
    for callback in entries.into_iter().rev() {
        if let Err(error) = callback(failure.clone()).await {
            tracing::error!(error = %error, "teardown callback failed");
            failures.push(error);
        }
    }
    if failures.is_empty() {
        Ok(())
    } else {
        Err(TeardownError { failures })
    }
}

/// One or more teardown callbacks failed while a scope was closing.
#[derive(Debug)]
pub struct TeardownError {
    failures: Vec<BoxError>,
}

impl TeardownError {
    /// The individual callback failures, in the order they occurred.
    #[must_use]
    pub fn failures(&self) -> &[BoxError] {
        &self.failures
    }

    /// Consumes the error, yielding the individual failures.
    #[must_use]
    pub fn into_failures(self) -> Vec<BoxError> {
        self.failures
    }
}

impl fmt::Display for TeardownError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} teardown callback(s) failed: ", self.failures.len())?;
        for (index, failure) in self.failures.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{failure}")?;
        }
        Ok(())
    }
}

impl core::error::Error for TeardownError {}
