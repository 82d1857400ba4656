//! Task-scoped ad-hoc callbacks.
//!
//! Callbacks registered inside [`scope`] are invoked by every raise that
//! happens within that scope, after the registered handlers. They are stored
//! per async task, so concurrently running tests never observe each other's
//! callbacks, and they are separate from the start-up handler registry.

use std::any::Any;
use std::cell::RefCell;
use std::future::Future;

use crate::DomainEvent;

type Callback<E> = Box<dyn Fn(&E) + Send>;

struct Registration {
    event_type: &'static str,
    callback: Box<dyn Any + Send>,
}

tokio::task_local! {
    static CALLBACKS: RefCell<Vec<Registration>>;
}

/// Runs a future with its own, initially empty, callback list.
pub async fn scope<F: Future>(future: F) -> F::Output {
    CALLBACKS.scope(RefCell::new(Vec::new()), future).await
}

/// Registers a callback for events of the given type in the current scope.
///
/// Returns false, registering nothing, when called outside [`scope`].
/// Callbacks must not register further callbacks.
pub fn register<E: DomainEvent>(
    event_type: &'static str,
    callback: impl Fn(&E) + Send + 'static,
) -> bool {
    CALLBACKS
        .try_with(|callbacks| {
            let callback: Callback<E> = Box::new(callback);
            callbacks.borrow_mut().push(Registration {
                event_type,
                callback: Box::new(callback),
            });
        })
        .is_ok()
}

/// Clears the callbacks registered in the current scope.
pub fn clear() {
    let _ = CALLBACKS.try_with(|callbacks| callbacks.borrow_mut().clear());
}

/// Returns the number of callbacks registered in the current scope.
pub fn registered() -> usize {
    CALLBACKS
        .try_with(|callbacks| callbacks.borrow().len())
        .unwrap_or(0)
}

pub(crate) fn invoke<E: DomainEvent>(event: &E) {
    let event_type = event.event_type();
    let _ = CALLBACKS.try_with(|callbacks| {
        for registration in callbacks.borrow().iter() {
            if registration.event_type != event_type {
                continue;
            }
            if let Some(callback) = registration.callback.downcast_ref::<Callback<E>>() {
                callback(event);
            }
        }
    });
}
