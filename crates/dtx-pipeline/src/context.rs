use std::sync::{Arc, Mutex, PoisonError};

use dtx_core::{Message, Payload, TxState};
use tracing::debug;

/// Shared, lock-guarded transaction state.
///
/// Handlers that hand work to other threads keep a clone of this handle to
/// poll [`StateHandle::is_aborting`] or to call [`StateHandle::signal_halt`]
/// while the pipeline keeps running.
#[derive(Debug, Clone, Default)]
pub struct StateHandle {
    state: Arc<Mutex<TxState>>,
}

impl StateHandle {
    #[must_use]
    pub fn state(&self) -> TxState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn is_aborting(&self) -> bool {
        self.state().is_aborting()
    }

    /// Ask the pipeline to skip every later step.
    ///
    /// Moves the state to END without writing a log entry; the next
    /// [`Pipeline::exec`](crate::Pipeline::exec) becomes a no-op. Ignored
    /// while compensation is running. Returns whether the signal was taken.
    pub fn signal_halt(&self) -> bool {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        let current = *state;
        if current.is_aborting() {
            debug!(state = %current, "halt signal ignored during compensation");
            return false;
        }
        *state = TxState::End;
        true
    }

    pub(crate) fn set(&self, next: TxState) {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner) = next;
    }
}

/// Per-transaction view handed to step handlers.
#[derive(Debug)]
pub struct Context {
    id: String,
    payload: Option<Arc<dyn Payload>>,
    state: StateHandle,
}

impl Context {
    pub(crate) fn new(id: String) -> Self {
        Self {
            id,
            payload: None,
            state: StateHandle::default(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The payload of the step in progress, if it is an `M`.
    ///
    /// During commit this is the task's commit payload, during rollback its
    /// rollback payload.
    #[must_use]
    pub fn payload<M: Message>(&self) -> Option<&M> {
        self.payload.as_deref()?.as_any().downcast_ref::<M>()
    }

    #[must_use]
    pub fn raw_payload(&self) -> Option<&dyn Payload> {
        self.payload.as_deref()
    }

    #[must_use]
    pub fn state(&self) -> TxState {
        self.state.state()
    }

    /// True while the transaction is in ABOUT or ROLLBACK.
    #[must_use]
    pub fn is_aborting(&self) -> bool {
        self.state.is_aborting()
    }

    /// See [`StateHandle::signal_halt`].
    pub fn signal_halt(&self) -> bool {
        self.state.signal_halt()
    }

    #[must_use]
    pub fn state_handle(&self) -> StateHandle {
        self.state.clone()
    }

    pub(crate) fn enter(&mut self, payload: Arc<dyn Payload>, state: TxState) {
        self.payload = Some(payload);
        self.state.set(state);
    }

    pub(crate) fn set_state(&self, state: TxState) {
        self.state.set(state);
    }
}
