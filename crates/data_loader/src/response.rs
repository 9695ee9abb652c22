use std::fmt;
use std::path::PathBuf;

use thiserror::Error;
use xeno_worker::WorkerError;

use crate::{ReloadRequest, RequestId};

/// Coarse outcome of a data build, as reported to the embedding engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReloadStatus {
	/// Bundle built and ready to be swapped in.
	ReloadReady,
	EngineVersionMismatch,
	DataMissing,
	DataBroken,
	MmapFailure,
	InstallFailure,
	UnknownError,
}

impl ReloadStatus {
	pub const fn is_ready(self) -> bool {
		matches!(self, Self::ReloadReady)
	}

	pub const fn as_str(self) -> &'static str {
		match self {
			Self::ReloadReady => "reload_ready",
			Self::EngineVersionMismatch => "engine_version_mismatch",
			Self::DataMissing => "data_missing",
			Self::DataBroken => "data_broken",
			Self::MmapFailure => "mmap_failure",
			Self::InstallFailure => "install_failure",
			Self::UnknownError => "unknown_error",
		}
	}
}

impl fmt::Display for ReloadStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Errors produced while building a module bundle.
#[derive(Debug, Error)]
pub enum BuildError {
	/// The id passed to a build is not registered.
	#[error("no reload request registered for id {0}")]
	UnknownRequest(RequestId),

	/// Data was produced for a different engine version.
	#[error("engine version mismatch: {0}")]
	EngineVersionMismatch(String),

	/// Required data is absent from the data file.
	#[error("data missing: {0}")]
	DataMissing(String),

	/// Data file is present but corrupt or has the wrong magic number.
	#[error("data broken: {0}")]
	DataBroken(String),

	/// Data file could not be opened or mapped.
	#[error("failed to map {path}: {source}")]
	Mmap {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// Data built fine but could not be placed at its install location.
	#[error("failed to install {from} to {to}: {source}")]
	Install {
		from: PathBuf,
		to: PathBuf,
		#[source]
		source: std::io::Error,
	},

	/// Background worker died before handing back a bundle.
	#[error("background build failed: {0}")]
	Worker(#[from] WorkerError),

	#[error("{0}")]
	Other(String),
}

impl BuildError {
	/// Maps the error onto the status reported in a [`Response`].
	pub const fn status(&self) -> ReloadStatus {
		match self {
			Self::UnknownRequest(_) | Self::DataMissing(_) => ReloadStatus::DataMissing,
			Self::EngineVersionMismatch(_) => ReloadStatus::EngineVersionMismatch,
			Self::DataBroken(_) => ReloadStatus::DataBroken,
			Self::Mmap { .. } => ReloadStatus::MmapFailure,
			Self::Install { .. } => ReloadStatus::InstallFailure,
			Self::Worker(_) | Self::Other(_) => ReloadStatus::UnknownError,
		}
	}
}

/// Completed build, handed from the worker to the control thread exactly once.
#[derive(Debug)]
pub struct Response<M> {
	/// Id the build was launched for; compare with the registry top to detect staleness.
	pub id: RequestId,
	/// Request the bundle was built from; `None` when `id` was not registered.
	pub request: Option<ReloadRequest>,
	/// Built module bundle, or why there is none.
	pub result: Result<M, BuildError>,
}

impl<M> Response<M> {
	pub(crate) fn failed(id: RequestId, request: Option<ReloadRequest>, error: BuildError) -> Self {
		Self {
			id,
			request,
			result: Err(error),
		}
	}

	pub fn status(&self) -> ReloadStatus {
		match &self.result {
			Ok(_) => ReloadStatus::ReloadReady,
			Err(error) => error.status(),
		}
	}

	pub fn bundle(&self) -> Option<&M> {
		self.result.as_ref().ok()
	}

	pub fn error(&self) -> Option<&BuildError> {
		self.result.as_ref().err()
	}

	/// Takes the bundle out, discarding the rest of the response.
	pub fn into_bundle(self) -> Result<M, BuildError> {
		self.result
	}
}
