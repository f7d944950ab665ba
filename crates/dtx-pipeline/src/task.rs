use std::fmt;
use std::sync::Arc;

use dtx_core::{Message, Payload};

use crate::context::Context;

/// Error returned by a step handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Business logic behind a step.
///
/// `commit` performs the forward action and `rollback` undoes it. Both read
/// the active payload from the [`Context`]. Handlers run on the pipeline's
/// thread and must return only once their work is finished.
pub trait Handler: Send + Sync {
    /// Perform the step.
    ///
    /// # Errors
    ///
    /// Returns an error if the step failed; the pipeline then compensates
    /// every previously committed step.
    fn commit(&self, ctx: &Context) -> Result<(), HandlerError>;

    /// Undo the step.
    ///
    /// The default does nothing, which suits steps without side effects.
    ///
    /// # Errors
    ///
    /// Returns an error if compensation failed; the failure is recorded and
    /// compensation of the remaining steps continues.
    fn rollback(&self, ctx: &Context) -> Result<(), HandlerError> {
        let _ = ctx;
        Ok(())
    }
}

/// [`Handler`] built from a pair of closures. See [`handler_fn`].
pub struct FnHandler<C, R> {
    commit: C,
    rollback: R,
}

/// Build a handler from a commit closure and a rollback closure.
///
/// ```
/// use dtx_pipeline::{Context, handler_fn};
///
/// let handler = handler_fn(
///     |_ctx: &Context| Ok(()),
///     |_ctx: &Context| Ok(()),
/// );
/// # let _ = handler;
/// ```
pub fn handler_fn<C, R>(commit: C, rollback: R) -> FnHandler<C, R>
where
    C: Fn(&Context) -> Result<(), HandlerError> + Send + Sync,
    R: Fn(&Context) -> Result<(), HandlerError> + Send + Sync,
{
    FnHandler { commit, rollback }
}

impl<C, R> Handler for FnHandler<C, R>
where
    C: Fn(&Context) -> Result<(), HandlerError> + Send + Sync,
    R: Fn(&Context) -> Result<(), HandlerError> + Send + Sync,
{
    fn commit(&self, ctx: &Context) -> Result<(), HandlerError> {
        (self.commit)(ctx)
    }

    fn rollback(&self, ctx: &Context) -> Result<(), HandlerError> {
        (self.rollback)(ctx)
    }
}

/// One step of a transaction: its id, payloads and handler.
#[derive(Clone)]
pub struct Task {
    id: String,
    commit: Arc<dyn Payload>,
    rollback: Arc<dyn Payload>,
    handler: Arc<dyn Handler>,
}

impl Task {
    /// Create a step. `id` must be unique within the transaction.
    pub fn new<C, R, H>(id: impl Into<String>, commit: C, rollback: R, handler: H) -> Self
    where
        C: Message,
        R: Message,
        H: Handler + 'static,
    {
        Self {
            id: id.into(),
            commit: Arc::new(commit),
            rollback: Arc::new(rollback),
            handler: Arc::new(handler),
        }
    }

    /// Create a step whose handler is shared with other steps.
    pub fn with_shared_handler<C, R>(
        id: impl Into<String>,
        commit: C,
        rollback: R,
        handler: Arc<dyn Handler>,
    ) -> Self
    where
        C: Message,
        R: Message,
    {
        Self {
            id: id.into(),
            commit: Arc::new(commit),
            rollback: Arc::new(rollback),
            handler,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn commit_payload(&self) -> &Arc<dyn Payload> {
        &self.commit
    }

    #[must_use]
    pub fn rollback_payload(&self) -> &Arc<dyn Payload> {
        &self.rollback
    }

    #[must_use]
    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("id", &self.id)
            .field("commit", &self.commit)
            .field("rollback", &self.rollback)
            .finish_non_exhaustive()
    }
}
