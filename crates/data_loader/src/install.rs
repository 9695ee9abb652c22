//! Placing a freshly built data file at its install location.

use std::path::Path;

use crate::BuildError;

/// Hard-links `from` to `to`, falling back to a copy across filesystems.
///
/// An existing file at `to` is replaced. Linking a file onto itself is a no-op.
pub(crate) fn link_or_copy(from: &Path, to: &Path) -> Result<(), BuildError> {
	let install_err = |source: std::io::Error| BuildError::Install {
		from: from.to_path_buf(),
		to: to.to_path_buf(),
		source,
	};

	if same_file(from, to) {
		return Ok(());
	}
	if let Some(parent) = to.parent()
		&& !parent.as_os_str().is_empty()
	{
		std::fs::create_dir_all(parent).map_err(install_err)?;
	}
	match std::fs::remove_file(to) {
		Ok(()) => {}
		Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
		Err(e) => return Err(install_err(e)),
	}

	if let Err(error) = std::fs::hard_link(from, to) {
		tracing::debug!(from = %from.display(), to = %to.display(), %error, "data_loader.install.link_failed");
		std::fs::copy(from, to).map_err(install_err)?;
	}
	tracing::debug!(from = %from.display(), to = %to.display(), "data_loader.install");
	Ok(())
}

fn same_file(a: &Path, b: &Path) -> bool {
	match (a.canonicalize(), b.canonicalize()) {
		(Ok(a), Ok(b)) => a == b,
		_ => false,
	}
}
