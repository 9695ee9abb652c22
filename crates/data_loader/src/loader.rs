//! Reload arbitration and single-flight build orchestration.
//!
//! [`DataLoader`] is thread-compatible: every method takes `&mut self` (or
//! `&self` for reads) and is meant to be driven from the engine's control
//! thread, typically once per input event. The only concurrency is the one
//! background worker started by [`DataLoader::build`].

use std::sync::Arc;
use std::time::Instant;

use xeno_worker::{BackgroundFuture, TaskClass};

use crate::install::link_or_copy;
use crate::registry::{Registration, RequestRegistry};
use crate::slot::{BuildHandle, BuildSlot};
use crate::{EngineBuilder, LoaderConfig, ReloadRequest, RequestId, Response, fingerprint};

/// Decides which data set the engine should run and builds it off-thread.
pub struct DataLoader<E: EngineBuilder> {
	builder: Arc<E>,
	config: LoaderConfig,
	registry: RequestRegistry,
	/// Id of the data set the engine reported as loaded.
	current: RequestId,
	slot: BuildSlot<E::Bundle>,
}

impl<E: EngineBuilder> std::fmt::Debug for DataLoader<E> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("DataLoader")
			.field("config", &self.config)
			.field("registry", &self.registry)
			.field("current", &self.current)
			.field("in_flight", &self.slot.target())
			.finish_non_exhaustive()
	}
}

impl<E: EngineBuilder> DataLoader<E> {
	/// Creates a loader with the default configuration.
	pub fn new(builder: E) -> Self {
		Self::with_config(builder, LoaderConfig::default())
	}

	pub fn with_config(builder: E, config: LoaderConfig) -> Self {
		Self {
			builder: Arc::new(builder),
			config,
			registry: RequestRegistry::new(),
			current: RequestId::NONE,
			slot: BuildSlot::Idle,
		}
	}

	/// Returns the id `request` would be registered under.
	pub fn request_id(&self, request: &ReloadRequest) -> RequestId {
		fingerprint(request)
	}

	/// Registers a reload request and returns the top request id.
	pub fn register_request(&mut self, request: ReloadRequest) -> RequestId {
		self.registry.register(request)
	}

	/// Registers a reload request, reporting whether it was accepted.
	pub fn try_register_request(&mut self, request: ReloadRequest) -> Registration {
		self.registry.try_register(request)
	}

	/// Rejects `id` permanently and returns the new top request id.
	///
	/// Call this when building or applying `id` failed so it is never retried.
	pub fn report_load_failure(&mut self, id: RequestId) -> RequestId {
		let top = self.registry.unregister(id);
		tracing::info!(%id, top = %top, "data_loader.load_failure");
		top
	}

	/// Records `id` as the data set the engine is now running.
	pub fn report_load_success(&mut self, id: RequestId) {
		tracing::info!(previous = %self.current, %id, "data_loader.load_success");
		self.current = id;
	}

	pub fn top_request_id(&self) -> RequestId {
		self.registry.top()
	}

	pub fn current_request_id(&self) -> RequestId {
		self.current
	}

	/// Id of the build occupying the slot, whether finished or not.
	pub fn in_flight_request_id(&self) -> Option<RequestId> {
		self.slot.target()
	}

	pub fn registry(&self) -> &RequestRegistry {
		&self.registry
	}

	pub fn config(&self) -> &LoaderConfig {
		&self.config
	}

	/// Starts building the data set for `id` and returns immediately.
	///
	/// Unknown ids resolve to a `DataMissing` response without starting a
	/// worker. The worker owns a copy of the request, so the registry may change
	/// while it runs.
	pub fn build(&self, id: RequestId) -> BuildHandle<E::Bundle> {
		let Some(request) = self.registry.request(id).cloned() else {
			tracing::warn!(%id, "data_loader.build.unknown_request");
			return BuildHandle::resolved(Response::failed(id, None, crate::BuildError::UnknownRequest(id)));
		};

		let builder = Arc::clone(&self.builder);
		let payload = request.clone();
		let future = BackgroundFuture::spawn(TaskClass::CpuBlocking, self.config.worker_thread_name(), move || {
			run_build(builder.as_ref(), id, payload)
		});
		BuildHandle::spawned(id, request, future)
	}

	/// Launches a build of the top request when one is due.
	///
	/// A build starts only if there is a top request, it differs from the
	/// current data set and no other build occupies the slot. Returns whether a
	/// build was launched.
	pub fn maybe_build_new_data(&mut self) -> bool {
		let top = self.registry.top();
		if top.is_none() || top == self.current || !self.slot.is_idle() {
			return false;
		}

		tracing::info!(current = %self.current, %top, "data_loader.build.launch");
		let handle = self.build(top);
		self.slot.launch(handle);

		if self.config.always_wait_for_response() || (self.current.is_none() && self.config.wait_for_initial_build()) {
			self.slot.wait();
		}
		true
	}

	/// Returns true when a finished build response is waiting to be taken.
	pub fn is_build_response_ready(&mut self) -> bool {
		if self.config.always_wait_for_response() {
			self.slot.wait();
		}
		self.slot.poll()
	}

	/// Takes the finished build response, freeing the slot for the next build.
	///
	/// Returns `None` while nothing is in flight or the build is still running.
	pub fn maybe_move_response(&mut self) -> Option<Response<E::Bundle>> {
		if self.config.always_wait_for_response() {
			self.slot.wait();
		}
		let response = self.slot.take()?;
		tracing::debug!(id = %response.id, status = %response.status(), "data_loader.response.taken");
		Some(response)
	}

	/// Drops every request, the blacklist and any pending response.
	///
	/// An in-flight worker is joined before this returns. The current data set
	/// id is kept, since the engine is still running it.
	pub fn clear(&mut self) {
		self.registry.clear();
		if !self.slot.is_idle() {
			tracing::debug!(in_flight = ?self.slot.target(), "data_loader.clear.join");
		}
		self.slot = BuildSlot::Idle;
	}

	/// Makes every readiness poll block until the in-flight build finishes.
	pub fn set_always_wait_for_response_for_testing(&mut self, value: bool) {
		self.config.set_always_wait_for_response(value);
	}
}

/// Worker body: builds the bundle, then installs the data file if requested.
fn run_build<E: EngineBuilder>(builder: &E, id: RequestId, request: ReloadRequest) -> Response<E::Bundle> {
	let started = Instant::now();
	let result = builder.build(&request).and_then(|bundle| {
		if let Some(install_location) = &request.install_location {
			link_or_copy(&request.file_path, install_location)?;
		}
		Ok(bundle)
	});

	match &result {
		Ok(_) => tracing::debug!(%id, elapsed = ?started.elapsed(), "data_loader.build.ready"),
		Err(error) => tracing::warn!(
			%id,
			status = %error.status(),
			%error,
			path = %request.file_path.display(),
			"data_loader.build.failed"
		),
	}

	Response {
		id,
		request: Some(request),
		result,
	}
}
