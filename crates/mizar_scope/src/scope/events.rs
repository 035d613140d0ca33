//! Resource publication events and the wait loop behind
//! [`Scope::request_resource`](crate::scope::Scope::request_resource).

use core::any::TypeId;
use std::sync::Arc;

use futures::future;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use crate::resource::ResourceKey;
use crate::scope::{LookupError, not_found};

/// Buffered events per subscriber. A waiter that falls further behind than
/// this re-resolves against the scope chain instead of replaying the backlog.
const EVENT_CAPACITY: usize = 64;

/// Announcement that a resource or resource factory was added to a scope.
#[derive(Debug, Clone)]
pub struct ResourceEvent {
    key: ResourceKey,
    is_factory: bool,
}

impl ResourceEvent {
    pub(crate) fn new(key: ResourceKey, is_factory: bool) -> Self {
        Self { key, is_factory }
    }

    /// The key the resource was registered under.
    #[must_use]
    pub fn key(&self) -> &ResourceKey {
        &self.key
    }

    /// Whether the registration was a factory rather than a concrete value.
    #[must_use]
    pub fn is_factory(&self) -> bool {
        self.is_factory
    }

    /// Whether this event announces type `T` under `name`.
    #[must_use]
    pub fn matches<T: ?Sized + 'static>(&self, name: &str) -> bool {
        self.key.type_id() == TypeId::of::<T>() && self.key.name().as_str() == name
    }
}

/// Per-scope fan-out of [`ResourceEvent`]s.
pub(crate) struct EventHub {
    sender: broadcast::Sender<ResourceEvent>,
}

impl EventHub {
    pub(crate) fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    /// Announces an event. Having no subscribers is not an error.
    pub(crate) fn publish(&self, event: ResourceEvent) {
        self.sender.send(event).ok();
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<ResourceEvent> {
        self.sender.subscribe()
    }
}

/// Waits on every receiver until an event for `T` under `name` arrives and
/// `recheck` confirms the resource resolves.
///
/// Callers subscribe before their first resolution attempt, so an event
/// published between that attempt and this call is still buffered here. A
/// lagged receiver falls back to `recheck`; a closed receiver is dropped from
/// the set. With every receiver closed the resource can no longer appear and
/// the wait ends in `NotFound`.
pub(crate) async fn wait_for<T, F>(
    mut receivers: Vec<broadcast::Receiver<ResourceEvent>>,
    name: &str,
    mut recheck: F,
) -> Result<Arc<T>, LookupError>
where
    T: ?Sized + Send + Sync + 'static,
    F: FnMut() -> Result<Option<Arc<T>>, LookupError>,
{
    loop {
        if receivers.is_empty() {
            return Err(not_found::<T>(name));
        }
        // select_all requires a non-empty set, checked above.
        let (outcome, index, rest) =
            future::select_all(receivers.iter_mut().map(|rx| Box::pin(rx.recv()))).await;
        drop(rest);
        match outcome {
            Ok(event) if event.matches::<T>(name) => {
                if let Some(value) = recheck()? {
                    return Ok(value);
                }
            }
            Ok(_) => {}
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(skipped, "resource event receiver lagged, re-resolving");
                if let Some(value) = recheck()? {
                    return Ok(value);
                }
            }
            Err(RecvError::Closed) => {
                receivers.swap_remove(index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use core::sync::atomic::{AtomicUsize, Ordering};

    use crate::resource::ResourceName;

    use super::*;

    fn key_of<T: ?Sized + 'static>(name: &str) -> ResourceKey {
        ResourceKey::of::<T>(ResourceName::new(name).unwrap())
    }

    #[test]
    fn matches_checks_type_and_name() {
        let event = ResourceEvent::new(key_of::<u32>("primary"), false);
        assert!(event.matches::<u32>("primary"));
        assert!(!event.matches::<u32>("default"));
        assert!(!event.matches::<i64>("primary"));
    }

    #[tokio::test]
    async fn buffered_matching_event_resolves() {
        let hub = EventHub::new();
        let rx = hub.subscribe();
        hub.publish(ResourceEvent::new(key_of::<u32>("default"), false));

        let rechecks = AtomicUsize::new(0);
        let value = wait_for::<u32, _>(vec![rx], "default", || {
            rechecks.fetch_add(1, Ordering::SeqCst);
            Ok(Some(Arc::new(7u32)))
        })
        .await
        .unwrap();

        assert_eq!(*value, 7);
        assert_eq!(rechecks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unrelated_events_do_not_trigger_a_recheck() {
        let hub = EventHub::new();
        let rx = hub.subscribe();
        hub.publish(ResourceEvent::new(key_of::<i64>("default"), false));
        hub.publish(ResourceEvent::new(key_of::<u32>("other"), true));
        hub.publish(ResourceEvent::new(key_of::<u32>("default"), true));

        let rechecks = AtomicUsize::new(0);
        let value = wait_for::<u32, _>(vec![rx], "default", || {
            rechecks.fetch_add(1, Ordering::SeqCst);
            Ok(Some(Arc::new(1u32)))
        })
        .await
        .unwrap();

        assert_eq!(*value, 1);
        assert_eq!(rechecks.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn all_receivers_closed_means_not_found() {
        let hub = EventHub::new();
        let rx = hub.subscribe();
        drop(hub);

        let error = wait_for::<u32, _>(vec![rx], "default", || Ok(None))
            .await
            .unwrap_err();

        assert!(matches!(error, LookupError::NotFound { .. }));
    }

    #[tokio::test]
    async fn no_receivers_at_all_means_not_found() {
        let error = wait_for::<u32, _>(Vec::new(), "default", || Ok(None))
            .await
            .unwrap_err();

        assert!(matches!(error, LookupError::NotFound { .. }));
    }

    #[tokio::test]
    async fn a_lagged_receiver_falls_back_to_the_recheck() {
        let hub = EventHub::new();
        let rx = hub.subscribe();
        // Overflow the subscriber's buffer so its next recv reports a lag.
        for _ in 0..(EVENT_CAPACITY + 8) {
            hub.publish(ResourceEvent::new(key_of::<i64>("noise"), false));
        }

        let value = wait_for::<u32, _>(vec![rx], "default", || Ok(Some(Arc::new(3u32))))
            .await
            .unwrap();

        assert_eq!(*value, 3);
    }
}
