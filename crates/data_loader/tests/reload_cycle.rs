//! End-to-end reload cycle against a file-backed engine builder.

use std::path::Path;

use pretty_assertions::assert_eq;
use thiserror as _;
use xeno_data_loader::{BuildError, DataLoader, EngineBuilder, LoaderConfig, ReloadOutcome, ReloadRequest, ReloadStatus, RequestId};

const MAGIC: &[u8] = b"\xEFXENO\r\n";

/// Modules parsed out of a data file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Modules {
	version: String,
}

/// Reads `MAGIC` followed by a UTF-8 version string.
struct FileBuilder;

impl EngineBuilder for FileBuilder {
	type Bundle = Modules;

	fn build(&self, request: &ReloadRequest) -> Result<Modules, BuildError> {
		let bytes = std::fs::read(&request.file_path).map_err(|source| BuildError::Mmap {
			path: request.file_path.clone(),
			source,
		})?;
		let magic = request.magic_number.as_deref().unwrap_or(MAGIC);
		let Some(body) = bytes.strip_prefix(magic) else {
			return Err(BuildError::DataBroken(format!("bad magic in {}", request.file_path.display())));
		};
		let version = std::str::from_utf8(body).map_err(|e| BuildError::DataBroken(e.to_string()))?;
		Ok(Modules {
			version: version.trim().to_owned(),
		})
	}
}

/// Caller-owned engine holding the loader and the live modules.
struct Engine {
	loader: DataLoader<FileBuilder>,
	modules: Option<Modules>,
}

impl Engine {
	fn new() -> Self {
		let config = LoaderConfig::from_toml_str(
			r#"
			worker_thread_name = "engine-data"
			always_wait_for_response = true
			"#,
		)
		.unwrap();
		Self {
			loader: DataLoader::with_config(FileBuilder, config),
			modules: None,
		}
	}

	fn on_event(&mut self) -> ReloadOutcome {
		let modules = &mut self.modules;
		self.loader.maybe_reload(|_, bundle| {
			*modules = Some(bundle);
			Ok::<(), String>(())
		})
	}
}

fn write_data(dir: &Path, name: &str, version: &str) -> std::path::PathBuf {
	let path = dir.join(name);
	let mut bytes = MAGIC.to_vec();
	bytes.extend_from_slice(version.as_bytes());
	std::fs::write(&path, bytes).unwrap();
	path
}

#[test]
fn bundled_then_downloaded_then_broken_update() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
	let dir = tempfile::tempdir().unwrap();
	let mut engine = Engine::new();

	let bundled = write_data(dir.path(), "bundled.data", "1.0");
	let bundled_id = engine.loader.register_request(ReloadRequest::new(&bundled, 100));
	assert_eq!(engine.on_event(), ReloadOutcome::Reloaded { id: bundled_id });
	assert_eq!(engine.modules.as_ref().map(|m| m.version.as_str()), Some("1.0"));
	assert_eq!(engine.on_event(), ReloadOutcome::Idle);

	let downloaded = write_data(dir.path(), "downloaded.data", "2.0");
	let install = dir.path().join("install").join("current.data");
	let download_id = engine
		.loader
		.register_request(ReloadRequest::new(&downloaded, 50).with_install_location(&install));
	assert_eq!(engine.on_event(), ReloadOutcome::Reloaded { id: download_id });
	assert_eq!(engine.modules.as_ref().map(|m| m.version.as_str()), Some("2.0"));
	assert!(install.exists(), "downloaded data must be installed");

	let broken = dir.path().join("broken.data");
	std::fs::write(&broken, b"not a data file").unwrap();
	let broken_id = engine.loader.register_request(ReloadRequest::new(&broken, 10));
	assert_eq!(
		engine.on_event(),
		ReloadOutcome::Failed {
			id: broken_id,
			status: ReloadStatus::DataBroken,
			rollback: download_id,
		}
	);
	// The engine keeps serving the previous data set.
	assert_eq!(engine.modules.as_ref().map(|m| m.version.as_str()), Some("2.0"));
	assert_eq!(engine.loader.current_request_id(), download_id);
	assert_eq!(engine.on_event(), ReloadOutcome::Idle);

	// Re-sending the broken request is silently ignored.
	assert_eq!(engine.loader.register_request(ReloadRequest::new(&broken, 10)), download_id);
	assert_eq!(engine.on_event(), ReloadOutcome::Idle);
}

#[test]
fn missing_file_reports_mmap_failure_and_falls_back_to_nothing() {
	let dir = tempfile::tempdir().unwrap();
	let mut engine = Engine::new();

	let missing_id = engine.loader.register_request(ReloadRequest::new(dir.path().join("absent.data"), 0));
	assert_eq!(
		engine.on_event(),
		ReloadOutcome::Failed {
			id: missing_id,
			status: ReloadStatus::MmapFailure,
			rollback: RequestId::NONE,
		}
	);
	assert!(engine.modules.is_none());
}

#[test]
fn custom_magic_number_is_honored() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("mock.data");
	std::fs::write(&path, b"MOCK3.1").unwrap();

	let mut engine = Engine::new();
	let id = engine.loader.register_request(ReloadRequest::new(&path, 0).with_magic_number(*b"MOCK"));
	assert_eq!(engine.on_event(), ReloadOutcome::Reloaded { id });
	assert_eq!(engine.modules.unwrap().version, "3.1");
}
