//! Submit-event registry. Registration hands back a [`Disposer`] so a front
//! end can detach a controller without tearing down the page.

use std::{
    collections::BTreeMap,
    future::Future,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc, Mutex, MutexGuard, Weak,
    },
};

use futures::future::{BoxFuture, FutureExt};
use tracing::debug;

use crate::controller::SubmitOptions;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitEvent {
    pub text: String,
    pub options: SubmitOptions,
}

impl SubmitEvent {
    pub fn new(text: impl Into<String>, options: SubmitOptions) -> Self {
        Self {
            text: text.into(),
            options,
        }
    }
}

pub type SubmitHandler = Arc<dyn Fn(SubmitEvent) -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Default)]
struct Registry {
    next_id: AtomicU64,
    handlers: Mutex<BTreeMap<u64, SubmitHandler>>,
}

impl Registry {
    fn handlers(&self) -> MutexGuard<'_, BTreeMap<u64, SubmitHandler>> {
        self.handlers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Clone, Default)]
pub struct FormEvents {
    registry: Arc<Registry>,
}

impl FormEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_submit<F, Fut>(&self, handler: F) -> Disposer
    where
        F: Fn(SubmitEvent) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let id = self.registry.next_id.fetch_add(1, Ordering::SeqCst);
        let handler: SubmitHandler = Arc::new(move |event: SubmitEvent| handler(event).boxed());
        self.registry.handlers().insert(id, handler);
        debug!(handler_id = id, "submit handler attached");
        Disposer {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    pub fn handler_count(&self) -> usize {
        self.registry.handlers().len()
    }

    /// Runs every attached handler in registration order and returns how many ran.
    pub async fn emit_submit(&self, event: SubmitEvent) -> usize {
        let handlers: Vec<SubmitHandler> = self.registry.handlers().values().cloned().collect();
        for handler in &handlers {
            handler(event.clone()).await;
        }
        handlers.len()
    }
}

#[must_use = "dropping a Disposer leaves the handler attached with no way to detach it"]
pub struct Disposer {
    id: u64,
    registry: Weak<Registry>,
}

impl Disposer {
    pub fn is_attached(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let attached = registry.handlers().contains_key(&self.id);
        attached
    }

    /// Detaches the handler. Returns false if it was already gone.
    pub fn dispose(&self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let removed = registry.handlers().remove(&self.id).is_some();
        if removed {
            debug!(handler_id = self.id, "submit handler detached");
        }
        removed
    }
}
