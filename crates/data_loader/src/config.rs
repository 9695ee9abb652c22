//! Loader configuration.

use serde::Deserialize;
use thiserror::Error;

const DEFAULT_WORKER_THREAD_NAME: &str = "xeno-data-loader";

/// Errors that can occur when parsing loader configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error parsing TOML syntax or an unknown key.
	#[error("TOML parse error: {0}")]
	Toml(#[from] toml::de::Error),

	/// Worker thread name the OS would refuse.
	#[error("invalid worker thread name {name:?}: {reason}")]
	InvalidThreadName { name: String, reason: &'static str },
}

/// Tunables for [`crate::DataLoader`].
///
/// ```toml
/// wait_for_initial_build = true
/// worker_thread_name = "engine-data"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
	wait_for_initial_build: bool,
	always_wait_for_response: bool,
	worker_thread_name: String,
}

impl Default for LoaderConfig {
	fn default() -> Self {
		Self {
			wait_for_initial_build: false,
			always_wait_for_response: false,
			worker_thread_name: DEFAULT_WORKER_THREAD_NAME.to_owned(),
		}
	}
}

impl LoaderConfig {
	/// Parses and validates a TOML document.
	pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
		let config: Self = toml::from_str(input)?;
		validate_thread_name(&config.worker_thread_name)?;
		Ok(config)
	}

	/// Block on the first build while no data set has been loaded yet.
	pub const fn wait_for_initial_build(&self) -> bool {
		self.wait_for_initial_build
	}

	/// Make every readiness poll block until the in-flight build finishes.
	///
	/// Test-only behavior; keeps multi-step reload tests deterministic.
	pub const fn always_wait_for_response(&self) -> bool {
		self.always_wait_for_response
	}

	pub fn worker_thread_name(&self) -> &str {
		&self.worker_thread_name
	}

	#[must_use]
	pub fn with_wait_for_initial_build(mut self, value: bool) -> Self {
		self.wait_for_initial_build = value;
		self
	}

	#[must_use]
	pub fn with_always_wait_for_response(mut self, value: bool) -> Self {
		self.always_wait_for_response = value;
		self
	}

	pub fn with_worker_thread_name(mut self, name: impl Into<String>) -> Result<Self, ConfigError> {
		let name = name.into();
		validate_thread_name(&name)?;
		self.worker_thread_name = name;
		Ok(self)
	}

	pub(crate) fn set_always_wait_for_response(&mut self, value: bool) {
		self.always_wait_for_response = value;
	}
}

fn validate_thread_name(name: &str) -> Result<(), ConfigError> {
	let reason = if name.is_empty() {
		"must not be empty"
	} else if name.contains('\0') {
		"must not contain NUL bytes"
	} else {
		return Ok(());
	};
	Err(ConfigError::InvalidThreadName {
		name: name.to_owned(),
		reason,
	})
}
