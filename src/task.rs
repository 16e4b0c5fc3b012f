//! Background task runner.
//!
//! A task runs one unit of work on a dedicated worker thread, streams
//! `TaskProgress` events back over an mpsc channel and finishes with exactly
//! one `TaskOutcome`. The UI owns the returned `TaskHandle`, polls it once per
//! frame and may request cancellation through it.

use std::cell::Cell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvError, TryRecvError};
use std::sync::Arc;
use std::thread;

use log::{error, info};

use crate::error::TaskError;
use crate::types::{TaskKind, TaskProgress, TaskTiming};

/// Shared advisory cancellation flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Terminal result of a task run.
#[derive(Debug)]
pub enum TaskOutcome<T> {
    Completed(T),
    Failed(TaskError),
    /// Stopped early on request. Carries whatever partial payload the work
    /// still produced (search keeps the files scanned so far).
    Cancelled(Option<T>),
}

#[derive(Debug)]
pub enum TaskEvent<T> {
    Progress(TaskProgress),
    Finished(TaskOutcome<T>),
}

/// Handed to the work function; reports progress and exposes cancellation.
pub struct TaskContext {
    cancel: CancelToken,
    emit: Option<Box<dyn Fn(TaskProgress) + Send>>,
    last_completed: Cell<usize>,
    saw_cancel: Cell<bool>,
}

impl TaskContext {
    pub(crate) fn new(cancel: CancelToken, emit: Box<dyn Fn(TaskProgress) + Send>) -> Self {
        Self {
            cancel,
            emit: Some(emit),
            last_completed: Cell::new(0),
            saw_cancel: Cell::new(false),
        }
    }

    /// Context for running an engine synchronously: progress goes nowhere.
    #[cfg(test)]
    pub fn detached() -> Self {
        Self::with_token(CancelToken::new())
    }

    /// Synchronous context bound to an existing token.
    #[cfg(test)]
    pub fn with_token(cancel: CancelToken) -> Self {
        Self {
            cancel,
            emit: None,
            last_completed: Cell::new(0),
            saw_cancel: Cell::new(false),
        }
    }

    /// Checked by work loops at iteration boundaries.
    pub fn is_cancelled(&self) -> bool {
        let cancelled = self.cancel.is_cancelled();
        if cancelled {
            self.saw_cancel.set(true);
        }
        cancelled
    }

    pub fn token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn report(&self, completed: usize, total: usize) {
        self.emit_progress(completed, total, None);
    }

    pub fn report_timed(&self, completed: usize, total: usize, timing: TaskTiming) {
        self.emit_progress(completed, total, Some(timing));
    }

    fn emit_progress(&self, completed: usize, total: usize, timing: Option<TaskTiming>) {
        if self.cancel.is_cancelled() {
            return;
        }
        let completed = completed.min(total);
        if completed < self.last_completed.get() {
            return;
        }
        self.last_completed.set(completed);
        if let Some(emit) = &self.emit {
            emit(TaskProgress {
                completed,
                total,
                timing,
            });
        }
    }

    fn observed_cancel(&self) -> bool {
        self.saw_cancel.get()
    }
}

/// Caller-owned handle to a running task.
pub struct TaskHandle<T> {
    kind: TaskKind,
    cancel: CancelToken,
    rx: Receiver<TaskEvent<T>>,
    finished: bool,
}

impl<T> TaskHandle<T> {
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Request cooperative cancellation. In-flight file operations finish;
    /// the next iteration is skipped.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancel_requested(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Next pending event without blocking, `None` when nothing is queued or
    /// the terminal event was already delivered.
    pub fn try_next(&mut self) -> Option<TaskEvent<T>> {
        while !self.finished {
            let received = match self.rx.try_recv() {
                Ok(event) => Ok(event),
                Err(TryRecvError::Empty) => return None,
                Err(TryRecvError::Disconnected) => Err(RecvError),
            };
            if let Some(event) = self.accept(received) {
                return Some(event);
            }
        }
        None
    }

    /// Next event, blocking until one is available.
    #[cfg(test)]
    pub fn next_blocking(&mut self) -> Option<TaskEvent<T>> {
        while !self.finished {
            let received = self.rx.recv();
            if let Some(event) = self.accept(received) {
                return Some(event);
            }
        }
        None
    }

    /// Block until the task finishes, discarding progress.
    #[cfg(test)]
    pub fn wait(mut self) -> TaskOutcome<T> {
        while let Some(event) = self.next_blocking() {
            if let TaskEvent::Finished(outcome) = event {
                return outcome;
            }
        }
        TaskOutcome::Failed(TaskError::Worker("task already finished".into()))
    }

    fn accept(&mut self, received: Result<TaskEvent<T>, RecvError>) -> Option<TaskEvent<T>> {
        match received {
            Ok(TaskEvent::Progress(_)) if self.cancel.is_cancelled() => None,
            Ok(TaskEvent::Progress(p)) => Some(TaskEvent::Progress(p)),
            Ok(TaskEvent::Finished(outcome)) => {
                self.finished = true;
                Some(TaskEvent::Finished(outcome))
            }
            Err(RecvError) => {
                self.finished = true;
                Some(TaskEvent::Finished(TaskOutcome::Failed(TaskError::Worker(
                    format!("{} worker exited without a result", self.kind.label()),
                ))))
            }
        }
    }
}

/// Run `work` on a new worker thread.
pub fn spawn<T, F>(kind: TaskKind, work: F) -> TaskHandle<T>
where
    T: Send + 'static,
    F: FnOnce(&TaskContext) -> Result<T, TaskError> + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let cancel = CancelToken::new();
    let token = cancel.clone();
    let progress_tx = tx.clone();
    let spawn_failed_tx = tx.clone();

    info!("Starting {} task", kind.label());
    let spawned = thread::Builder::new()
        .name(format!("{}-worker", kind.label()))
        .spawn(move || {
            let ctx = TaskContext::new(
                token,
                Box::new(move |p| {
                    let _ = progress_tx.send(TaskEvent::Progress(p));
                }),
            );
            let result = panic::catch_unwind(AssertUnwindSafe(|| work(&ctx)));
            let outcome = match result {
                Ok(Ok(value)) if ctx.observed_cancel() => TaskOutcome::Cancelled(Some(value)),
                Ok(Ok(value)) => TaskOutcome::Completed(value),
                Ok(Err(TaskError::Cancelled)) => TaskOutcome::Cancelled(None),
                Ok(Err(err)) => TaskOutcome::Failed(err),
                Err(_) => TaskOutcome::Failed(TaskError::Worker(format!(
                    "{} worker panicked",
                    kind.label()
                ))),
            };
            drop(ctx);
            log_outcome(kind, &outcome);
            let _ = tx.send(TaskEvent::Finished(outcome));
        });

    if let Err(err) = spawned {
        error!("Could not start {} worker: {}", kind.label(), err);
        let _ = spawn_failed_tx.send(TaskEvent::Finished(TaskOutcome::Failed(
            TaskError::Worker(err.to_string()),
        )));
    }

    TaskHandle {
        kind,
        cancel,
        rx,
        finished: false,
    }
}

fn log_outcome<T>(kind: TaskKind, outcome: &TaskOutcome<T>) {
    match outcome {
        TaskOutcome::Completed(_) => info!("{} task completed", kind.label()),
        TaskOutcome::Cancelled(_) => info!("{} task cancelled", kind.label()),
        TaskOutcome::Failed(err) => error!("{} task failed: {}", kind.label(), err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Barrier;

    fn drain<T>(mut handle: TaskHandle<T>) -> (Vec<TaskProgress>, TaskOutcome<T>) {
        let mut progress = Vec::new();
        while let Some(event) = handle.next_blocking() {
            match event {
                TaskEvent::Progress(p) => progress.push(p),
                TaskEvent::Finished(outcome) => {
                    assert!(handle.next_blocking().is_none());
                    return (progress, outcome);
                }
            }
        }
        panic!("no terminal event");
    }

    #[test]
    fn progress_is_monotonic_and_bounded() {
        let handle = spawn(TaskKind::Search, |ctx| {
            ctx.report(1, 3);
            ctx.report(3, 3);
            ctx.report(2, 3);
            ctx.report(7, 3);
            Ok(42)
        });
        let (progress, outcome) = drain(handle);
        let completed: Vec<_> = progress.iter().map(|p| p.completed).collect();
        assert_eq!(completed, vec![1, 3, 3]);
        assert!(progress.iter().all(|p| p.completed <= p.total));
        assert!(matches!(outcome, TaskOutcome::Completed(42)));
    }

    #[test]
    fn errors_are_delivered_as_failures() {
        let handle = spawn::<(), _>(TaskKind::Delete, |_| {
            Err(TaskError::NotFound("/nowhere".into()))
        });
        let (_, outcome) = drain(handle);
        assert!(matches!(outcome, TaskOutcome::Failed(TaskError::NotFound(_))));
    }

    #[test]
    fn panics_still_produce_terminal_event() {
        let handle = spawn::<(), _>(TaskKind::Compress, |_| panic!("boom"));
        let (_, outcome) = drain(handle);
        assert!(matches!(outcome, TaskOutcome::Failed(TaskError::Worker(_))));
    }

    #[test]
    fn cancel_after_progress_yields_cancelled_without_more_progress() {
        let started = Arc::new(Barrier::new(2));
        let resume = Arc::new(Barrier::new(2));
        let (s, r) = (started.clone(), resume.clone());
        let mut handle = spawn(TaskKind::Delete, move |ctx| {
            let total = 10;
            for i in 0..total {
                if ctx.is_cancelled() {
                    return Err(TaskError::Cancelled);
                }
                ctx.report(i + 1, total);
                if i == 1 {
                    s.wait();
                    r.wait();
                }
            }
            Ok(())
        });

        started.wait();
        let mut seen = Vec::new();
        while let Some(TaskEvent::Progress(p)) = handle.try_next() {
            seen.push(p.completed);
        }
        handle.cancel();
        resume.wait();

        let (after, outcome) = drain(handle);
        assert_eq!(seen, vec![1, 2]);
        assert!(after.is_empty());
        assert!(matches!(outcome, TaskOutcome::Cancelled(None)));
    }

    #[test]
    fn partial_payload_survives_cancellation() {
        let token_seen = Arc::new(Barrier::new(2));
        let b = token_seen.clone();
        let handle = spawn(TaskKind::Search, move |ctx| {
            b.wait();
            b.wait();
            let mut done = Vec::new();
            for i in 0..5 {
                if ctx.is_cancelled() {
                    break;
                }
                done.push(i);
            }
            Ok(done)
        });
        token_seen.wait();
        handle.cancel();
        token_seen.wait();
        match handle.wait() {
            TaskOutcome::Cancelled(Some(done)) => assert!(done.is_empty()),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn detached_context_checks_token() {
        let token = CancelToken::new();
        let ctx = TaskContext::with_token(token.clone());
        ctx.report(1, 2);
        assert!(!ctx.is_cancelled());
        token.cancel();
        assert!(ctx.is_cancelled());
        assert!(ctx.observed_cancel());
    }
}
