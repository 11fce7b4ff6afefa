//! Bindable async commands.
//!
//! An `AsyncCommand` pairs an async action with an optional enablement
//! predicate. While the action runs the command reports itself disabled, and
//! a second invocation is rejected rather than queued. Observers subscribe to
//! can-execute changes to re-poll `can_execute`.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;

use crate::observable::{Event, Subscription};

type Action<P> = Arc<dyn Fn(Option<P>) -> BoxFuture<'static, ()> + Send + Sync>;
type Predicate<P> = Arc<dyn Fn(Option<&P>) -> bool + Send + Sync>;

pub struct AsyncCommand<P> {
    action: Action<P>,
    predicate: Option<Predicate<P>>,
    executing: Arc<AtomicBool>,
    can_execute_changed: Event<()>,
}

impl<P> Clone for AsyncCommand<P> {
    fn clone(&self) -> Self {
        Self {
            action: Arc::clone(&self.action),
            predicate: self.predicate.clone(),
            executing: Arc::clone(&self.executing),
            can_execute_changed: self.can_execute_changed.clone(),
        }
    }
}

impl<P: Send + 'static> AsyncCommand<P> {
    /// Command without a predicate; enabled whenever it is not running.
    pub fn new<F, Fut>(action: F) -> Self
    where
        F: Fn(Option<P>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            action: Arc::new(move |param| action(param).boxed()),
            predicate: None,
            executing: Arc::new(AtomicBool::new(false)),
            can_execute_changed: Event::new(),
        }
    }

    pub fn with_predicate(
        mut self,
        predicate: impl Fn(Option<&P>) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    pub fn can_execute(&self, param: Option<&P>) -> bool {
        !self.is_executing() && self.predicate.as_ref().map_or(true, |predicate| predicate(param))
    }

    pub fn is_executing(&self) -> bool {
        self.executing.load(Ordering::Acquire)
    }

    /// Run the action if the command is enabled for `param`; otherwise do
    /// nothing. Errors are the action's own business.
    pub async fn execute(&self, param: Option<P>) {
        if !self.can_execute(param.as_ref()) {
            return;
        }
        if self
            .executing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }
        let _running = Running { command: self };
        self.raise_can_execute_changed();

        (self.action)(param).await;
    }

    pub fn raise_can_execute_changed(&self) {
        self.can_execute_changed.emit(&());
    }

    pub fn subscribe(&self, handler: impl Fn() + Send + Sync + 'static) -> Subscription {
        self.can_execute_changed.subscribe(move |_| handler())
    }
}

/// Clears the executing flag however the action ends, including when the
/// future is dropped mid-flight or the action panics.
struct Running<'a, P: Send + 'static> {
    command: &'a AsyncCommand<P>,
}

impl<P: Send + 'static> Drop for Running<'_, P> {
    fn drop(&mut self) {
        self.command.executing.store(false, Ordering::Release);
        self.command.raise_can_execute_changed();
    }
}
