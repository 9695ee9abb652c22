//! Mock engine builders shared by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;

use crate::{BuildError, EngineBuilder, ReloadRequest};

/// Upper bound on how long a gated build waits for its release.
const GATE_TIMEOUT: Duration = Duration::from_secs(10);

/// Bundle produced by the mock builders.
pub(crate) fn mock_bundle(request: &ReloadRequest) -> Result<String, BuildError> {
	let path = request.file_path.to_string_lossy().into_owned();
	if path.starts_with("broken") {
		return Err(BuildError::DataBroken(path));
	}
	if path.starts_with("missing") {
		return Err(BuildError::Mmap {
			path: request.file_path.clone(),
			source: std::io::Error::from(std::io::ErrorKind::NotFound),
		});
	}
	Ok(format!("modules:{path}"))
}

/// Builder whose builds block until the paired [`Gate`] releases them.
pub(crate) struct GatedBuilder {
	gate: Mutex<mpsc::Receiver<()>>,
	started: Arc<AtomicUsize>,
	finished: Arc<AtomicUsize>,
}

/// Control side of a [`GatedBuilder`].
#[derive(Clone)]
pub(crate) struct Gate {
	tx: mpsc::Sender<()>,
	started: Arc<AtomicUsize>,
	finished: Arc<AtomicUsize>,
}

pub(crate) fn gated() -> (GatedBuilder, Gate) {
	let (tx, rx) = mpsc::channel();
	let started = Arc::new(AtomicUsize::new(0));
	let finished = Arc::new(AtomicUsize::new(0));
	let builder = GatedBuilder {
		gate: Mutex::new(rx),
		started: Arc::clone(&started),
		finished: Arc::clone(&finished),
	};
	(builder, Gate { tx, started, finished })
}

impl Gate {
	/// Lets one pending or future build proceed.
	pub(crate) fn release(&self) {
		let _ = self.tx.send(());
	}

	pub(crate) fn started(&self) -> usize {
		self.started.load(Ordering::SeqCst)
	}

	pub(crate) fn finished(&self) -> usize {
		self.finished.load(Ordering::SeqCst)
	}
}

impl EngineBuilder for GatedBuilder {
	type Bundle = String;

	fn build(&self, request: &ReloadRequest) -> Result<String, BuildError> {
		self.started.fetch_add(1, Ordering::SeqCst);
		if let Ok(rx) = self.gate.lock() {
			let _ = rx.recv_timeout(GATE_TIMEOUT);
		}
		let bundle = mock_bundle(request);
		self.finished.fetch_add(1, Ordering::SeqCst);
		bundle
	}
}
