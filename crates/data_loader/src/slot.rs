//! Single-flight build slot.

use xeno_worker::{BackgroundFuture, TaskClass};

use crate::{BuildError, ReloadRequest, RequestId, Response};

/// Handle to one in-flight or already resolved build.
#[derive(Debug)]
pub struct BuildHandle<M> {
	id: RequestId,
	request: Option<ReloadRequest>,
	future: BackgroundFuture<Response<M>>,
}

impl<M: Send + 'static> BuildHandle<M> {
	pub(crate) fn spawned(id: RequestId, request: ReloadRequest, future: BackgroundFuture<Response<M>>) -> Self {
		Self {
			id,
			request: Some(request),
			future,
		}
	}

	/// Handle that resolves to `response` without any worker.
	pub(crate) fn resolved(response: Response<M>) -> Self {
		Self {
			id: response.id,
			request: response.request.clone(),
			future: BackgroundFuture::ready(TaskClass::CpuBlocking, response),
		}
	}

	/// Id the build targets.
	pub fn id(&self) -> RequestId {
		self.id
	}

	/// Non-blocking poll.
	pub fn is_ready(&mut self) -> bool {
		self.future.is_ready()
	}

	/// Blocks until the build has finished.
	pub fn wait(&mut self) {
		self.future.wait();
	}

	/// Consumes the handle, waiting if needed.
	///
	/// A worker that died is reported as an [`BuildError::Worker`] response.
	pub fn into_response(self) -> Response<M> {
		let Self { id, request, future } = self;
		match future.into_result() {
			Ok(response) => response,
			Err(error) => {
				tracing::warn!(%id, %error, "data_loader.build.worker_failed");
				Response::failed(id, request, BuildError::Worker(error))
			}
		}
	}
}

/// State of the single build slot.
///
/// `Idle → Building → Ready → Idle`; only `Idle` admits a new build.
#[derive(Debug)]
pub(crate) enum BuildSlot<M> {
	Idle,
	Building(BuildHandle<M>),
	Ready(Response<M>),
}

impl<M> Default for BuildSlot<M> {
	fn default() -> Self {
		Self::Idle
	}
}

impl<M: Send + 'static> BuildSlot<M> {
	pub(crate) fn is_idle(&self) -> bool {
		matches!(self, Self::Idle)
	}

	/// Id of the build occupying the slot, finished or not.
	pub(crate) fn target(&self) -> Option<RequestId> {
		match self {
			Self::Idle => None,
			Self::Building(handle) => Some(handle.id()),
			Self::Ready(response) => Some(response.id),
		}
	}

	pub(crate) fn launch(&mut self, handle: BuildHandle<M>) {
		debug_assert!(self.is_idle(), "build launched while slot is occupied");
		*self = Self::Building(handle);
	}

	/// Moves `Building` to `Ready` when the worker has finished.
	pub(crate) fn poll(&mut self) -> bool {
		match self {
			Self::Idle => false,
			Self::Ready(_) => true,
			Self::Building(handle) => {
				if !handle.is_ready() {
					return false;
				}
				self.settle();
				true
			}
		}
	}

	/// Blocks until a `Building` slot is `Ready`.
	pub(crate) fn wait(&mut self) {
		if let Self::Building(handle) = self {
			handle.wait();
			self.settle();
		}
	}

	/// Detaches the response if ready, leaving the slot `Idle`.
	pub(crate) fn take(&mut self) -> Option<Response<M>> {
		if !self.poll() {
			return None;
		}
		let Self::Ready(response) = std::mem::replace(self, Self::Idle) else {
			unreachable!("poll reported ready without a response")
		};
		Some(response)
	}

	fn settle(&mut self) {
		let Self::Building(handle) = std::mem::replace(self, Self::Idle) else {
			unreachable!("settle called on a slot that is not building")
		};
		*self = Self::Ready(handle.into_response());
	}
}
