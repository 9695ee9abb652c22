//! Engine data-set reload arbiter.
//!
//! Several sources (bundled default, downloaded model update, local settings)
//! ask for the conversion engine's data set to be swapped. [`DataLoader`]
//! arbitrates them into one top request, builds its module bundle on a
//! background worker with at most one build in flight, and hands the finished
//! [`Response`] back to the control thread exactly once.
//!
//! Typical drive loop, run on every input event:
//!
//! ```ignore
//! loader.register_request(ReloadRequest::new("/data/mozc.data", 50));
//! match loader.maybe_reload(|id, bundle| engine.swap_modules(id, bundle)) {
//! 	ReloadOutcome::Reloaded { id } => tracing::info!(%id, "engine reloaded"),
//! 	_ => {}
//! }
//! ```

mod builder;
mod config;
mod fingerprint;
mod install;
mod loader;
mod registry;
mod reload;
mod request;
mod response;
mod slot;

pub use builder::EngineBuilder;
pub use config::{ConfigError, LoaderConfig};
pub use fingerprint::fingerprint;
pub use loader::DataLoader;
pub use registry::{Registration, RequestRecord, RequestRegistry};
pub use reload::ReloadOutcome;
pub use request::{EngineType, ReloadRequest, RequestId};
pub use response::{BuildError, ReloadStatus, Response};
pub use slot::BuildHandle;

#[cfg(test)]
mod test_support;
