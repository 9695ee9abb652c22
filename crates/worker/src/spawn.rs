use std::thread::JoinHandle;

use crate::TaskClass;

/// Spawns a dedicated named OS thread with shared worker classification metadata.
///
/// Fails when the OS cannot create the thread or when `name` contains a NUL byte.
pub fn spawn_named_thread<F, R>(class: TaskClass, name: impl Into<String>, f: F) -> std::io::Result<JoinHandle<R>>
where
	F: FnOnce() -> R + Send + 'static,
	R: Send + 'static,
{
	let name = name.into();
	if name.contains('\0') {
		return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, "thread name contains a NUL byte"));
	}
	tracing::trace!(worker_class = class.as_str(), thread = %name, "worker.spawn_named_thread");
	std::thread::Builder::new().name(name).spawn(f)
}
