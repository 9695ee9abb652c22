//! One reload step for the engine-management layer.

use std::fmt;

use crate::{DataLoader, EngineBuilder, ReloadStatus, RequestId};

/// What [`DataLoader::maybe_reload`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
	/// Nothing to build and nothing to deliver.
	Idle,
	/// A build for `id` is still running.
	Pending { id: RequestId },
	/// The bundle for `id` was applied and recorded as current.
	Reloaded { id: RequestId },
	/// A bundle for `id` arrived after `top` took over; it was dropped.
	Stale { id: RequestId, top: RequestId },
	/// Building or applying `id` failed; `id` is blacklisted and `rollback` is the new top.
	Failed { id: RequestId, status: ReloadStatus, rollback: RequestId },
}

impl<E: EngineBuilder> DataLoader<E> {
	/// Runs one reload step: launch a due build, and adopt a finished one.
	///
	/// `apply` receives a successfully built bundle for the current top
	/// request and swaps it into the engine. A failing build or a failing
	/// `apply` blacklists the request. Bundles superseded by a newer top request
	/// are dropped and the newer request is scheduled instead.
	pub fn maybe_reload<F, Err>(&mut self, apply: F) -> ReloadOutcome
	where
		F: FnOnce(RequestId, E::Bundle) -> Result<(), Err>,
		Err: fmt::Display,
	{
		self.maybe_build_new_data();

		let Some(response) = self.maybe_move_response() else {
			return match self.in_flight_request_id() {
				Some(id) => ReloadOutcome::Pending { id },
				None => ReloadOutcome::Idle,
			};
		};

		let id = response.id;
		let status = response.status();
		let bundle = match response.into_bundle() {
			Ok(bundle) => bundle,
			Err(error) => {
				tracing::warn!(%id, %status, %error, "data_loader.reload.build_failed");
				let rollback = self.report_load_failure(id);
				return ReloadOutcome::Failed { id, status, rollback };
			}
		};

		let top = self.top_request_id();
		if id != top {
			tracing::debug!(%id, %top, "data_loader.reload.stale");
			drop(bundle);
			self.maybe_build_new_data();
			return ReloadOutcome::Stale { id, top };
		}

		match apply(id, bundle) {
			Ok(()) => {
				self.report_load_success(id);
				ReloadOutcome::Reloaded { id }
			}
			Err(error) => {
				tracing::warn!(%id, %error, "data_loader.reload.apply_failed");
				let rollback = self.report_load_failure(id);
				ReloadOutcome::Failed {
					id,
					status: ReloadStatus::UnknownError,
					rollback,
				}
			}
		}
	}
}
