//! Event sinks for the retry executor.
//!
//! Events are write-only from the executor's point of view: it emits them and
//! never reads anything back, so a listener can observe an execution but
//! cannot steer it.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

/// Trait for events emitted while an operation is being executed.
pub trait ExecutionEvent: Send + Sync + fmt::Debug {
    /// Returns the kind of event (e.g., "Attempt", "Retry").
    fn event_type(&self) -> &'static str;

    /// Returns when this event occurred.
    fn timestamp(&self) -> Instant;

    /// Returns the name of the executor instance that emitted this event.
    fn executor_name(&self) -> &str;
}

/// Trait for receiving execution events.
pub trait EventListener<E: ExecutionEvent>: Send + Sync {
    /// Called when an event occurs.
    fn on_event(&self, event: &E);
}

/// Type alias for shared event listeners.
pub type BoxedEventListener<E> = Arc<dyn EventListener<E>>;

/// An ordered collection of event listeners.
#[derive(Clone)]
pub struct EventListeners<E: ExecutionEvent> {
    listeners: Vec<BoxedEventListener<E>>,
}

impl<E: ExecutionEvent> EventListeners<E> {
    /// Creates a new empty listener collection.
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    /// Adds a listener to the collection.
    pub fn add<L>(&mut self, listener: L)
    where
        L: EventListener<E> + 'static,
    {
        self.listeners.push(Arc::new(listener));
    }

    /// Adds an already shared listener, keeping the caller's handle valid.
    pub fn add_shared(&mut self, listener: BoxedEventListener<E>) {
        self.listeners.push(listener);
    }

    /// Delivers an event to every listener, in registration order.
    ///
    /// A panicking listener is contained: the remaining listeners still see
    /// the event and the panic never reaches the emitting execution.
    pub fn emit(&self, event: &E) {
        for listener in &self.listeners {
            let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                listener.on_event(event);
            }));

            #[cfg(feature = "tracing")]
            if outcome.is_err() {
                tracing::warn!(
                    executor = event.executor_name(),
                    event_type = event.event_type(),
                    "Event listener panicked"
                );
            }

            #[cfg(not(feature = "tracing"))]
            let _ = outcome;
        }
    }

    /// Returns true if there are no listeners.
    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Returns the number of listeners.
    pub fn len(&self) -> usize {
        self.listeners.len()
    }
}

impl<E: ExecutionEvent> Default for EventListeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: ExecutionEvent> fmt::Debug for EventListeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventListeners")
            .field("len", &self.listeners.len())
            .finish()
    }
}

/// A closure-based event listener.
pub struct FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    f: F,
    _phantom: std::marker::PhantomData<fn(&E)>,
}

impl<E, F> FnListener<E, F>
where
    F: Fn(&E) + Send + Sync,
{
    /// Creates a new closure-based listener.
    pub fn new(f: F) -> Self {
        Self {
            f,
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<E, F> EventListener<E> for FnListener<E, F>
where
    E: ExecutionEvent,
    F: Fn(&E) + Send + Sync,
{
    fn on_event(&self, event: &E) {
        (self.f)(event)
    }
}

/// A listener that keeps a copy of every event it receives.
///
/// Clones share the same storage, so one handle can be registered with an
/// executor while another is kept around to inspect what was emitted.
pub struct RecordingListener<E> {
    events: Arc<Mutex<Vec<E>>>,
}

impl<E> RecordingListener<E> {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<E>> {
        // A listener that panicked mid-push leaves the vector intact.
        self.events
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Returns the number of recorded events.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Discards everything recorded so far.
    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl<E: Clone> RecordingListener<E> {
    /// Returns a snapshot of the recorded events, oldest first.
    pub fn events(&self) -> Vec<E> {
        self.lock().clone()
    }
}

impl<E: ExecutionEvent> RecordingListener<E> {
    /// Returns the recorded event types, oldest first.
    pub fn event_types(&self) -> Vec<&'static str> {
        self.lock().iter().map(ExecutionEvent::event_type).collect()
    }
}

impl<E> Clone for RecordingListener<E> {
    fn clone(&self) -> Self {
        Self {
            events: Arc::clone(&self.events),
        }
    }
}

impl<E> Default for RecordingListener<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> EventListener<E> for RecordingListener<E>
where
    E: ExecutionEvent + Clone,
{
    fn on_event(&self, event: &E) {
        self.lock().push(event.clone());
    }
}
