use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Identifier of a reload request, derived from its content.
///
/// `RequestId::NONE` (zero) is reserved for "no request" and is never produced
/// by [`crate::fingerprint`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(u64);

impl RequestId {
	/// Reserved id meaning "no data set".
	pub const NONE: Self = Self(0);

	/// Wraps a raw id value.
	pub const fn from_raw(raw: u64) -> Self {
		Self(raw)
	}

	/// Returns the raw id value.
	pub const fn get(self) -> u64 {
		self.0
	}

	/// Returns true for the reserved [`RequestId::NONE`].
	pub const fn is_none(self) -> bool {
		self.0 == 0
	}
}

impl fmt::Display for RequestId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{:016x}", self.0)
	}
}

/// Engine flavor the data set is built for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineType {
	#[default]
	Desktop,
	Mobile,
}

impl EngineType {
	pub(crate) const fn tag(self) -> u8 {
		match self {
			Self::Desktop => 0,
			Self::Mobile => 1,
		}
	}
}

/// Request to swap the engine's backing data set.
///
/// Sources such as the bundled default, a downloaded model update or a local
/// configuration change each submit one of these. Smaller `priority` wins.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ReloadRequest {
	pub engine_type: EngineType,
	/// Data file to build the engine modules from.
	pub file_path: PathBuf,
	/// Expected file magic; `None` accepts the builder's default.
	pub magic_number: Option<Vec<u8>>,
	/// Where to link or copy `file_path` once the build succeeded.
	pub install_location: Option<PathBuf>,
	pub priority: i32,
}

impl ReloadRequest {
	/// Creates a request for `file_path` with the given priority.
	pub fn new(file_path: impl Into<PathBuf>, priority: i32) -> Self {
		Self {
			file_path: file_path.into(),
			priority,
			..Self::default()
		}
	}

	#[must_use]
	pub fn with_engine_type(mut self, engine_type: EngineType) -> Self {
		self.engine_type = engine_type;
		self
	}

	#[must_use]
	pub fn with_magic_number(mut self, magic: impl Into<Vec<u8>>) -> Self {
		self.magic_number = Some(magic.into());
		self
	}

	#[must_use]
	pub fn with_install_location(mut self, path: impl Into<PathBuf>) -> Self {
		self.install_location = Some(path.into());
		self
	}
}
