use thiserror::Error;

/// Reasons a background job finished without handing back its value.
#[derive(Debug, Error)]
pub enum WorkerError {
	/// The job panicked; carries the panic payload when it was a string.
	#[error("worker panicked: {0}")]
	Panicked(String),

	/// The job's thread exited without sending a value or panicking.
	#[error("worker exited without producing a result")]
	Disconnected,

	/// The OS refused to start the worker thread.
	#[error("failed to spawn worker thread: {0}")]
	Spawn(#[from] std::io::Error),
}
