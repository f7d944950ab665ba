use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use dtx_core::{Payload, Store, TxLog, TxState};
use tracing::{debug, info, warn};

use crate::context::Context;
use crate::error::TxError;
use crate::options::Options;
use crate::registry::TaskRegistry;
use crate::task::Task;

/// Source of entry timestamps, in seconds since the Unix epoch.
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

/// Transaction pipeline for one transaction id.
///
/// Drive it from a single flow: [`begin`](Self::begin), one
/// [`exec`](Self::exec) per step, then [`end`](Self::end). Every transition
/// is appended to the store. When a commit handler fails, the pipeline
/// records an ABOUT entry and runs the rollback handler of every committed
/// step, newest first.
///
/// Every method returns [`TxError`] only when the log could not be written or
/// read; such errors are fatal for the transaction.
pub struct Pipeline {
    ctx: Context,
    options: Options,
    clock: Clock,
    tasks: TaskRegistry,
    stack: Vec<TxLog>,
    store: Arc<dyn Store>,
    abort_depth: usize,
    replayed: HashSet<usize>,
    compensating: Vec<String>,
}

impl Pipeline {
    pub fn new(id: impl Into<String>, store: Arc<dyn Store>) -> Self {
        Self::with_options(id, store, Options::default())
    }

    pub fn with_options(id: impl Into<String>, store: Arc<dyn Store>, options: Options) -> Self {
        Self {
            ctx: Context::new(id.into()),
            options,
            clock: Arc::new(|| Utc::now().timestamp()),
            tasks: TaskRegistry::new(),
            stack: Vec::new(),
            store,
            abort_depth: 0,
            replayed: HashSet::new(),
            compensating: Vec::new(),
        }
    }

    /// Replace the timestamp source.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    #[must_use]
    pub fn id(&self) -> &str {
        self.ctx.id()
    }

    #[must_use]
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    #[must_use]
    pub fn options(&self) -> Options {
        self.options
    }

    #[must_use]
    pub fn tasks(&self) -> &TaskRegistry {
        &self.tasks
    }

    /// Entries recorded since the last reset, oldest first.
    #[must_use]
    pub fn stack(&self) -> &[TxLog] {
        &self.stack
    }

    /// Load the durable history of this transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub fn history(&self) -> Result<Vec<TxLog>, TxError> {
        self.load_history()
    }

    /// Start a sequence of steps.
    ///
    /// # Errors
    ///
    /// Returns an error if the BEGIN entry cannot be persisted.
    pub fn begin(&mut self) -> Result<&mut Self, TxError> {
        let entry = TxLog::marker(self.ctx.id(), TxState::Begin, self.now());
        self.ctx.set_state(TxState::Begin);
        self.stack.push(entry.clone());
        self.persist(&entry)?;
        Ok(self)
    }

    /// Run one step.
    ///
    /// Skipped entirely when the transaction has ended, including after a
    /// handler called [`Context::signal_halt`]. If the commit handler fails the
    /// step's COMMIT entry is never persisted; it becomes the ABOUT entry and
    /// compensation runs before this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be encoded or the log cannot be
    /// written or read. A failing handler is not an error.
    pub fn exec(&mut self, task: Task) -> Result<&mut Self, TxError> {
        if self.ctx.state() == TxState::End {
            debug!(id = self.ctx.id(), task = task.id(), "transaction ended, step skipped");
            return Ok(self);
        }

        self.tasks.put(task.clone());

        let entry = self.step_entry(TxState::Commit, &task, task.commit_payload())?;
        self.stack.push(entry.clone());
        self.ctx
            .enter(Arc::clone(task.commit_payload()), TxState::Commit);

        if let Err(err) = task.handler().commit(&self.ctx) {
            warn!(
                id = self.ctx.id(),
                task = task.id(),
                error = %err,
                "commit failed, compensating committed steps"
            );
            self.about(&err)?;
            return Ok(self);
        }

        self.persist(&entry)?;
        Ok(self)
    }

    /// Finish the sequence and reset the in-process stack.
    ///
    /// Durable history is kept; the pipeline can [`begin`](Self::begin) a
    /// new sequence under the same id.
    ///
    /// # Errors
    ///
    /// Returns an error if the END entry cannot be persisted.
    pub fn end(&mut self) -> Result<(), TxError> {
        let entry = TxLog::marker(self.ctx.id(), TxState::End, self.now());
        self.stack.push(entry.clone());
        self.persist(&entry)?;
        self.ctx.set_state(TxState::End);
        self.stack.clear();
        Ok(())
    }

    /// Abort: record `reason` and compensate every committed step.
    ///
    /// The newest stack entry is turned into an ABOUT entry carrying the
    /// reason. Compensation then replays the history loaded *before* that
    /// entry was written. Does nothing when the stack is empty, so a second
    /// call right after a completed abort is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be loaded or an entry cannot be
    /// persisted.
    pub fn about(&mut self, reason: impl fmt::Display) -> Result<(), TxError> {
        let history = self.load_history()?;

        let Some(mut entry) = self.stack.pop() else {
            debug!(id = self.ctx.id(), "nothing to abort");
            return Ok(());
        };
        entry.state = TxState::About;
        entry.timestamp = self.now();
        entry.error_message = reason.to_string();

        self.ctx.set_state(TxState::About);
        self.stack.push(entry.clone());
        self.persist(&entry)?;

        self.abort_depth += 1;
        let replayed = self.replay(&history);
        self.abort_depth -= 1;
        if self.abort_depth == 0 {
            self.replayed.clear();
            self.stack.clear();
        }
        replayed
    }

    /// Compensate the step recorded by `entry`.
    ///
    /// Unknown steps are skipped. The ROLLBACK entry is persisted whether or
    /// not the rollback handler succeeded; a failing handler additionally
    /// triggers a nested [`about`](Self::about) first. That nested abort never
    /// compensates the step again.
    ///
    /// # Errors
    ///
    /// Returns an error if the ROLLBACK entry cannot be persisted or the
    /// nested abort fails.
    pub fn rollback(&mut self, entry: &TxLog) -> Result<(), TxError> {
        let Some(task) = self.tasks.get(&entry.task).cloned() else {
            debug!(id = self.ctx.id(), task = %entry.task, "no task registered, nothing to compensate");
            return Ok(());
        };

        let rollback_entry = self.step_entry(TxState::Rollback, &task, task.rollback_payload())?;
        self.stack.push(rollback_entry.clone());
        self.ctx
            .enter(Arc::clone(task.rollback_payload()), TxState::Rollback);

        self.compensating.push(task.id().to_string());
        let outcome = match task.handler().rollback(&self.ctx) {
            Ok(()) => Ok(()),
            Err(err) => {
                warn!(
                    id = self.ctx.id(),
                    task = task.id(),
                    error = %err,
                    "rollback failed"
                );
                self.about(&err)
            }
        };
        self.compensating.pop();
        outcome?;

        self.persist(&rollback_entry)
    }

    /// Walk `history` newest first and compensate each COMMIT entry.
    ///
    /// A COMMIT already matched by a later ROLLBACK of the same step is
    /// skipped, as is any entry an enclosing replay of this abort has taken
    /// and any step whose compensation is still running.
    fn replay(&mut self, history: &[TxLog]) -> Result<(), TxError> {
        let mut compensated: HashMap<&str, usize> = HashMap::new();

        for (index, entry) in history.iter().enumerate().rev() {
            match entry.state {
                TxState::Rollback => {
                    *compensated.entry(entry.task.as_str()).or_default() += 1;
                }
                TxState::Commit => {
                    if let Some(count) = compensated
                        .get_mut(entry.task.as_str())
                        .filter(|count| **count > 0)
                    {
                        *count -= 1;
                        debug!(id = self.ctx.id(), task = %entry.task, "already compensated");
                        continue;
                    }
                    if self.compensating.iter().any(|task| *task == entry.task) {
                        debug!(id = self.ctx.id(), task = %entry.task, "compensation in flight");
                        continue;
                    }
                    if !self.replayed.insert(index) {
                        continue;
                    }
                    self.rollback(entry)?;
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn step_entry(
        &self,
        state: TxState,
        task: &Task,
        payload: &Arc<dyn Payload>,
    ) -> Result<TxLog, TxError> {
        let data = payload
            .encode(self.options.codec())
            .map_err(|source| TxError::Encode {
                task: task.id().to_string(),
                type_name: payload.type_name(),
                source,
            })?;
        Ok(TxLog::step(
            self.ctx.id(),
            state,
            task.id(),
            payload.type_name(),
            data,
            self.now(),
        ))
    }

    fn load_history(&self) -> Result<Vec<TxLog>, TxError> {
        self.store
            .load(self.ctx.id())
            .map_err(|source| TxError::LoadHistory {
                id: self.ctx.id().to_string(),
                source,
            })
    }

    fn persist(&self, entry: &TxLog) -> Result<(), TxError> {
        self.store
            .append(entry)
            .map_err(|source| TxError::Persist {
                id: entry.id.clone(),
                state: entry.state,
                source,
            })?;
        self.trace(entry);
        Ok(())
    }

    fn trace(&self, entry: &TxLog) {
        if !self.options.debug() {
            return;
        }
        info!(
            target: "dtx",
            id = %entry.id,
            state = %entry.state,
            task = %entry.task,
            type_name = %entry.type_name,
            timestamp = entry.timestamp,
            error = %entry.error_message,
            "transition recorded"
        );
    }

    fn now(&self) -> i64 {
        (self.clock)()
    }
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("ctx", &self.ctx)
            .field("options", &self.options)
            .field("tasks", &self.tasks.len())
            .field("stack", &self.stack)
            .field("compensating", &self.compensating)
            .finish_non_exhaustive()
    }
}
