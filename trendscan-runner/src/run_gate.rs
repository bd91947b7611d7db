//! Single-flight gate and deadline-bounded execution.
//!
//! A `RunGate` is owned by the caller (CLI, scheduler, bot handler) and
//! shared by clone. `try_acquire` hands out at most one live `RunToken`;
//! dropping the token reopens the gate.
//!
//! `run_with_deadline` moves the token into a worker thread together with the
//! job. If the deadline passes first the caller gets `DeadlineExceeded`, never
//! a partial result, and the gate stays closed until the abandoned worker
//! actually finishes.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, warn};

use crate::runner::RunError;

#[derive(Debug, Clone, Default)]
pub struct RunGate {
    busy: Arc<AtomicBool>,
}

/// Proof that the holder is the only run in flight.
#[derive(Debug)]
pub struct RunToken {
    busy: Arc<AtomicBool>,
}

impl RunGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn try_acquire(&self) -> Result<RunToken, RunError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| RunError::AlreadyRunning)?;
        debug!("run gate acquired");
        Ok(RunToken {
            busy: Arc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl Drop for RunToken {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
        debug!("run gate released");
    }
}

/// Run `job` under the gate, waiting at most `deadline` (forever if `None`).
pub fn run_with_deadline<T, F>(
    gate: &RunGate,
    deadline: Option<Duration>,
    job: F,
) -> Result<T, RunError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, RunError> + Send + 'static,
{
    let token = gate.try_acquire()?;
    let (tx, rx) = mpsc::channel();

    thread::Builder::new()
        .name("trendscan-run".into())
        .spawn(move || {
            let result = job();
            // Reopen before reporting so a caller that has the result can
            // immediately start the next run.
            drop(token);
            // The receiver is gone once the deadline has fired.
            let _ = tx.send(result);
        })
        .map_err(RunError::Spawn)?;

    let received = match deadline {
        Some(limit) => rx.recv_timeout(limit),
        None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
    };

    match received {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => {
            let limit = deadline.unwrap_or_default();
            warn!(deadline_ms = limit.as_millis() as u64, "run abandoned at deadline");
            Err(RunError::DeadlineExceeded { limit })
        }
        Err(RecvTimeoutError::Disconnected) => Err(RunError::WorkerPanicked),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn second_acquire_fails_while_token_lives() {
        let gate = RunGate::new();
        let token = gate.try_acquire().unwrap();
        assert!(gate.is_busy());
        assert!(matches!(gate.try_acquire(), Err(RunError::AlreadyRunning)));

        let shared = gate.clone();
        assert!(matches!(shared.try_acquire(), Err(RunError::AlreadyRunning)));

        drop(token);
        assert!(!gate.is_busy());
        assert!(gate.try_acquire().is_ok());
    }

    #[test]
    fn returns_job_result_within_deadline() {
        let gate = RunGate::new();
        let out = run_with_deadline(&gate, Some(Duration::from_secs(5)), || Ok(41 + 1)).unwrap();
        assert_eq!(out, 42);
    }

    #[test]
    fn job_error_is_propagated() {
        let gate = RunGate::new();
        let err = run_with_deadline::<(), _>(&gate, None, || Err(RunError::AlreadyRunning))
            .unwrap_err();
        assert!(matches!(err, RunError::AlreadyRunning));
    }

    #[test]
    fn deadline_exceeded_keeps_gate_closed_until_worker_ends() {
        let gate = RunGate::new();
        let started = Instant::now();
        let err = run_with_deadline(&gate, Some(Duration::from_millis(20)), || {
            thread::sleep(Duration::from_millis(300));
            Ok(())
        })
        .unwrap_err();
        assert!(matches!(err, RunError::DeadlineExceeded { .. }));
        assert!(started.elapsed() < Duration::from_millis(300));

        // abandoned worker still holds the token
        assert!(gate.is_busy());
        let waited = Instant::now();
        while gate.is_busy() && waited.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(10));
        }
        assert!(!gate.is_busy());
    }

    #[test]
    fn concurrent_run_is_rejected() {
        let gate = RunGate::new();
        let (release_tx, release_rx) = mpsc::channel::<()>();
        let background = gate.clone();
        let handle = thread::spawn(move || {
            run_with_deadline(&background, None, move || {
                let _ = release_rx.recv();
                Ok(())
            })
        });

        let waited = Instant::now();
        while !gate.is_busy() && waited.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(1));
        }
        let second = run_with_deadline(&gate, None, || Ok(()));
        assert!(matches!(second, Err(RunError::AlreadyRunning)));

        release_tx.send(()).unwrap();
        assert!(handle.join().unwrap().is_ok());
        assert!(!gate.is_busy());
    }

    #[test]
    fn panicking_job_reports_worker_failure() {
        let gate = RunGate::new();
        let err = run_with_deadline::<(), _>(&gate, Some(Duration::from_secs(5)), || {
            panic!("boom")
        })
        .unwrap_err();
        assert!(matches!(err, RunError::WorkerPanicked));
        // token dropped during unwind
        let waited = Instant::now();
        while gate.is_busy() && waited.elapsed() < Duration::from_secs(5) {
            thread::sleep(Duration::from_millis(1));
        }
        assert!(!gate.is_busy());
    }
}
