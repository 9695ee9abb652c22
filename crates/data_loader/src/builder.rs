use crate::{BuildError, ReloadRequest};

/// Constructs the engine's module bundle from a reload request.
///
/// Called on a background worker thread, once per build. Implementations may
/// block for as long as parsing dictionaries and model tables takes.
pub trait EngineBuilder: Send + Sync + 'static {
	/// Module bundle swapped into the running engine.
	type Bundle: Send + 'static;

	fn build(&self, request: &ReloadRequest) -> Result<Self::Bundle, BuildError>;
}

impl<F, M> EngineBuilder for F
where
	F: Fn(&ReloadRequest) -> Result<M, BuildError> + Send + Sync + 'static,
	M: Send + 'static,
{
	type Bundle = M;

	fn build(&self, request: &ReloadRequest) -> Result<M, BuildError> {
		self(request)
	}
}
