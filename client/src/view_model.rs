//! The main view model: the todo collection, the draft title, and the four
//! commands a front end binds to.
//!
//! # Design
//! Every flow runs through `run_busy`, which drops the call outright if
//! another flow is in flight. That busy flag is the only concurrency control
//! on the client: there is no queue, and nothing is retried.
//!
//! Every successful mutation is followed by a full reload. The collection is
//! replaced wholesale from the server's answer and never patched locally, so
//! the counters are always derived from what the store returned last.

use std::future::Future;
use std::sync::{Arc, Weak};

use tracing::{debug, warn};

use todo_core::{ClientError, TodoItemDto, TodoItemUpdateDto};

use crate::api::TodoApi;
use crate::command::AsyncCommand;
use crate::observable::{Observable, ObservableList, Subscription};

pub const TITLE_REQUIRED_MESSAGE: &str = "Enter a task title.";
pub const CONNECTION_FAILED_MESSAGE: &str = "Unable to connect to the API server.";
pub const REQUEST_CANCELLED_MESSAGE: &str = "The request to the server was cancelled.";

/// Text shown to the user for a failed flow.
pub fn error_message_for(err: &ClientError) -> String {
    match err {
        ClientError::Api(api) => api.message().to_string(),
        ClientError::Connection(_) => CONNECTION_FAILED_MESSAGE.to_string(),
        ClientError::Cancelled => REQUEST_CANCELLED_MESSAGE.to_string(),
        other => format!("Error: {other}"),
    }
}

/// Cheap to clone; clones share the same state.
#[derive(Clone)]
pub struct MainViewModel {
    inner: Arc<Inner>,
}

struct Inner {
    api: Arc<dyn TodoApi>,

    items: ObservableList<TodoItemDto>,
    new_title: Observable<String>,
    is_busy: Observable<bool>,
    error_message: Observable<Option<String>>,
    total_count: Observable<usize>,
    done_count: Observable<usize>,
    remaining_count: Observable<usize>,

    load_command: AsyncCommand<()>,
    add_command: AsyncCommand<()>,
    toggle_command: AsyncCommand<TodoItemDto>,
    delete_command: AsyncCommand<TodoItemDto>,

    _bindings: Vec<Subscription>,
}

impl MainViewModel {
    pub fn new(api: Arc<dyn TodoApi>) -> Self {
        let inner = Arc::new_cyclic(|weak: &Weak<Inner>| {
            let load_command: AsyncCommand<()> =
                AsyncCommand::new(with_view_model(weak, |vm, _: Option<()>| async move { vm.load().await }))
                    .with_predicate(reads(weak, |inner, _| !inner.is_busy.get()));

            let add_command: AsyncCommand<()> =
                AsyncCommand::new(with_view_model(weak, |vm, _: Option<()>| async move { vm.add().await }))
                    .with_predicate(reads(weak, |inner, _| {
                        !inner.is_busy.get() && inner.new_title.with(|title| !title.trim().is_empty())
                    }));

            let toggle_command: AsyncCommand<TodoItemDto> =
                AsyncCommand::new(with_view_model(weak, |vm, item: Option<TodoItemDto>| async move {
                    if let Some(item) = item {
                        vm.toggle(&item).await;
                    }
                }))
                .with_predicate(reads(weak, |inner, item| !inner.is_busy.get() && item.is_some()));

            let delete_command: AsyncCommand<TodoItemDto> =
                AsyncCommand::new(with_view_model(weak, |vm, item: Option<TodoItemDto>| async move {
                    if let Some(item) = item {
                        vm.delete(&item).await;
                    }
                }))
                .with_predicate(reads(weak, |inner, item| !inner.is_busy.get() && item.is_some()));

            let is_busy = Observable::new(false);
            let new_title = Observable::new(String::new());

            let busy_binding = {
                let (load, add, toggle, delete) = (
                    load_command.clone(),
                    add_command.clone(),
                    toggle_command.clone(),
                    delete_command.clone(),
                );
                is_busy.subscribe(move |busy| {
                    debug!(busy = *busy, "busy state changed");
                    load.raise_can_execute_changed();
                    add.raise_can_execute_changed();
                    toggle.raise_can_execute_changed();
                    delete.raise_can_execute_changed();
                })
            };
            let title_binding = {
                let add = add_command.clone();
                new_title.subscribe(move |_| add.raise_can_execute_changed())
            };

            Inner {
                api,
                items: ObservableList::new(),
                new_title,
                is_busy,
                error_message: Observable::new(None),
                total_count: Observable::new(0),
                done_count: Observable::new(0),
                remaining_count: Observable::new(0),
                load_command,
                add_command,
                toggle_command,
                delete_command,
                _bindings: vec![busy_binding, title_binding],
            }
        });
        Self { inner }
    }

    pub fn items(&self) -> &ObservableList<TodoItemDto> {
        &self.inner.items
    }

    pub fn new_title(&self) -> &Observable<String> {
        &self.inner.new_title
    }

    pub fn is_busy(&self) -> &Observable<bool> {
        &self.inner.is_busy
    }

    pub fn error_message(&self) -> &Observable<Option<String>> {
        &self.inner.error_message
    }

    pub fn total_count(&self) -> &Observable<usize> {
        &self.inner.total_count
    }

    pub fn done_count(&self) -> &Observable<usize> {
        &self.inner.done_count
    }

    pub fn remaining_count(&self) -> &Observable<usize> {
        &self.inner.remaining_count
    }

    pub fn load_command(&self) -> &AsyncCommand<()> {
        &self.inner.load_command
    }

    pub fn add_command(&self) -> &AsyncCommand<()> {
        &self.inner.add_command
    }

    pub fn toggle_command(&self) -> &AsyncCommand<TodoItemDto> {
        &self.inner.toggle_command
    }

    pub fn delete_command(&self) -> &AsyncCommand<TodoItemDto> {
        &self.inner.delete_command
    }

    /// Fetch the full list and replace the collection.
    pub async fn load(&self) {
        self.run_busy(self.load_items()).await;
    }

    async fn add(&self) {
        let title = self.inner.new_title.with(|title| title.trim().to_string());
        if title.is_empty() {
            self.inner.error_message.set(Some(TITLE_REQUIRED_MESSAGE.to_string()));
            return;
        }

        self.run_busy(async {
            self.inner.api.create(&title).await?;
            self.inner.new_title.set(String::new());
            self.load_items().await
        })
        .await;
    }

    async fn toggle(&self, item: &TodoItemDto) {
        self.run_busy(async {
            self.inner.api.update(item.id, &TodoItemUpdateDto::toggled(item)).await?;
            self.load_items().await
        })
        .await;
    }

    async fn delete(&self, item: &TodoItemDto) {
        self.run_busy(async {
            self.inner.api.delete(item.id).await?;
            self.load_items().await
        })
        .await;
    }

    async fn load_items(&self) -> Result<(), ClientError> {
        let items = self.inner.api.get_all().await?;
        self.inner.items.replace_all(items);
        self.update_counts();
        Ok(())
    }

    fn update_counts(&self) {
        let items = self.inner.items.snapshot();
        let total = items.len();
        let done = items.iter().filter(|item| item.is_done).count();
        self.inner.total_count.set(total);
        self.inner.done_count.set(done);
        self.inner.remaining_count.set(total.saturating_sub(done));
    }

    async fn run_busy<F>(&self, action: F)
    where
        F: Future<Output = Result<(), ClientError>>,
    {
        // `set` only reports a change when the flag was clear, which makes
        // this the test-and-set.
        if !self.inner.is_busy.set(true) {
            debug!("busy; dropping request");
            return;
        }
        let _busy = Busy(&self.inner.is_busy);
        self.inner.error_message.set(None);

        if let Err(err) = action.await {
            warn!(error = %err, "todo request failed");
            self.inner.error_message.set(Some(error_message_for(&err)));
        }
    }
}

struct Busy<'a>(&'a Observable<bool>);

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// Command action that upgrades the weak back-reference before running.
fn with_view_model<P, F, Fut>(
    weak: &Weak<Inner>,
    f: F,
) -> impl Fn(Option<P>) -> futures::future::BoxFuture<'static, ()> + Send + Sync + 'static
where
    P: Send + 'static,
    F: Fn(MainViewModel, Option<P>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    use futures::FutureExt;

    let weak = weak.clone();
    move |param| match weak.upgrade() {
        Some(inner) => f(MainViewModel { inner }, param).boxed(),
        None => futures::future::ready(()).boxed(),
    }
}

/// Command predicate over the view model state; false once it is gone.
fn reads<P, F>(weak: &Weak<Inner>, f: F) -> impl Fn(Option<&P>) -> bool + Send + Sync + 'static
where
    P: 'static,
    F: Fn(&Inner, Option<&P>) -> bool + Send + Sync + 'static,
{
    let weak = weak.clone();
    move |param| weak.upgrade().is_some_and(|inner| f(&inner, param))
}
