//! One-shot background computation handle.
//!
//! A [`BackgroundFuture`] runs one closure on a dedicated thread and hands its
//! value back through a `oneshot` channel. The control side polls with
//! [`BackgroundFuture::is_ready`] and consumes the value exactly once with
//! [`BackgroundFuture::into_result`]. Dropping an unfinished future joins the
//! worker thread instead of detaching it.

use std::thread::JoinHandle;

use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use crate::{TaskClass, WorkerError, panic_message, spawn_named_thread};

enum FutureState<T> {
	/// Worker thread is (or may still be) computing the value.
	Running { rx: oneshot::Receiver<T>, thread: JoinHandle<()> },
	/// Value or failure has been collected; the worker thread is joined.
	Finished(Result<T, WorkerError>),
	/// Result was moved out by `into_result`.
	Consumed,
}

/// Handle to a value produced on a background worker thread.
pub struct BackgroundFuture<T> {
	class: TaskClass,
	state: FutureState<T>,
}

impl<T> std::fmt::Debug for BackgroundFuture<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let state = match &self.state {
			FutureState::Running { .. } => "running",
			FutureState::Finished(Ok(_)) => "finished",
			FutureState::Finished(Err(_)) => "failed",
			FutureState::Consumed => "consumed",
		};
		f.debug_struct("BackgroundFuture").field("class", &self.class).field("state", &state).finish()
	}
}

impl<T> BackgroundFuture<T>
where
	T: Send + 'static,
{
	/// Runs `f` on a new named thread.
	///
	/// Spawn failures do not escape: the returned future is already finished
	/// with [`WorkerError::Spawn`].
	pub fn spawn<F>(class: TaskClass, name: impl Into<String>, f: F) -> Self
	where
		F: FnOnce() -> T + Send + 'static,
	{
		let (tx, rx) = oneshot::channel();
		let spawned = spawn_named_thread(class, name, move || {
			// Receiver may be gone if the owner was torn down mid-build.
			let _ = tx.send(f());
		});
		let state = match spawned {
			Ok(thread) => FutureState::Running { rx, thread },
			Err(error) => {
				tracing::warn!(worker_class = class.as_str(), %error, "worker.future.spawn_failed");
				FutureState::Finished(Err(WorkerError::Spawn(error)))
			}
		};
		Self { class, state }
	}
}

impl<T> BackgroundFuture<T> {
	/// Creates a future that is already resolved to `value` without starting a thread.
	pub fn ready(class: TaskClass, value: T) -> Self {
		Self {
			class,
			state: FutureState::Finished(Ok(value)),
		}
	}

	/// Returns the class this future was spawned with.
	pub const fn class(&self) -> TaskClass {
		self.class
	}

	/// Non-blocking readiness poll.
	///
	/// Returns `true` once the worker has sent its value or died. The worker
	/// thread is joined at that point.
	pub fn is_ready(&mut self) -> bool {
		let FutureState::Running { rx, .. } = &mut self.state else {
			return matches!(self.state, FutureState::Finished(_));
		};
		let outcome = match rx.try_recv() {
			Ok(value) => Ok(value),
			Err(TryRecvError::Empty) => return false,
			Err(TryRecvError::Closed) => Err(WorkerError::Disconnected),
		};
		self.finish(outcome);
		true
	}

	/// Blocks the calling thread until the worker has finished.
	///
	/// Waits by joining the worker thread, so it is safe to call from a thread
	/// that is driving an async runtime.
	pub fn wait(&mut self) {
		if !matches!(self.state, FutureState::Running { .. }) {
			return;
		}
		tracing::trace!(worker_class = self.class.as_str(), "worker.future.wait");
		let FutureState::Running { mut rx, thread } = std::mem::replace(&mut self.state, FutureState::Consumed) else {
			unreachable!("state checked above")
		};
		let joined = thread.join();
		// The worker sends before exiting, so the value is buffered once joined.
		let outcome = rx.try_recv().map_err(|_| WorkerError::Disconnected);
		self.state = FutureState::Finished(self.refine(outcome, joined));
	}

	/// Consumes the future and returns its value, waiting for the worker if needed.
	pub fn into_result(mut self) -> Result<T, WorkerError> {
		self.wait();
		match std::mem::replace(&mut self.state, FutureState::Consumed) {
			FutureState::Finished(result) => result,
			FutureState::Running { .. } | FutureState::Consumed => Err(WorkerError::Disconnected),
		}
	}

	/// Joins the worker thread and records the final outcome.
	fn finish(&mut self, outcome: Result<T, WorkerError>) {
		let FutureState::Running { thread, .. } = std::mem::replace(&mut self.state, FutureState::Consumed) else {
			unreachable!("finish called on a future that is not running")
		};
		let joined = thread.join();
		self.state = FutureState::Finished(self.refine(outcome, joined));
	}

	/// Turns a closed channel into [`WorkerError::Panicked`] when the join reports a panic.
	fn refine(&self, outcome: Result<T, WorkerError>, joined: std::thread::Result<()>) -> Result<T, WorkerError> {
		match (outcome, joined) {
			(Err(WorkerError::Disconnected), Err(payload)) => {
				let msg = panic_message(payload.as_ref()).unwrap_or_else(|| "non-string panic payload".to_owned());
				tracing::warn!(worker_class = self.class.as_str(), panic = %msg, "worker.future.panicked");
				Err(WorkerError::Panicked(msg))
			}
			(outcome, _) => outcome,
		}
	}
}

impl<T> Drop for BackgroundFuture<T> {
	fn drop(&mut self) {
		if let FutureState::Running { rx, thread } = std::mem::replace(&mut self.state, FutureState::Consumed) {
			tracing::debug!(worker_class = self.class.as_str(), "worker.future.join_on_drop");
			drop(rx);
			let _ = thread.join();
		}
	}
}
