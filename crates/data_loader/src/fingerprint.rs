//! Content-addressed request ids.
//!
//! Every field of a [`ReloadRequest`] is fed to an `xxh3_64` hasher in a fixed
//! layout: length-prefixed byte strings, a presence byte for optional fields and
//! little-endian integers. Two requests share an id iff their content matches
//! (modulo hash collisions, which are not handled).

use std::path::Path;

use xxhash_rust::xxh3::Xxh3;

use crate::{ReloadRequest, RequestId};

/// Computes the id of `request`.
pub fn fingerprint(request: &ReloadRequest) -> RequestId {
	let mut hasher = Xxh3::new();
	hasher.update(&[request.engine_type.tag()]);
	write_path(&mut hasher, &request.file_path);
	write_optional(&mut hasher, request.magic_number.as_deref());
	write_optional(&mut hasher, request.install_location.as_deref().map(|p| p.as_os_str().as_encoded_bytes()));
	hasher.update(&request.priority.to_le_bytes());

	// Zero is reserved for "no request".
	RequestId::from_raw(hasher.digest().max(1))
}

fn write_bytes(hasher: &mut Xxh3, bytes: &[u8]) {
	hasher.update(&(bytes.len() as u64).to_le_bytes());
	hasher.update(bytes);
}

fn write_path(hasher: &mut Xxh3, path: &Path) {
	write_bytes(hasher, path.as_os_str().as_encoded_bytes());
}

fn write_optional(hasher: &mut Xxh3, bytes: Option<&[u8]>) {
	match bytes {
		Some(bytes) => {
			hasher.update(&[1]);
			write_bytes(hasher, bytes);
		}
		None => hasher.update(&[0]),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::EngineType;

	#[test]
	fn test_fingerprint_is_deterministic() {
		let a = ReloadRequest::new("/data/mozc.data", 10).with_magic_number(*b"MOCK");
		let b = a.clone();
		assert_eq!(fingerprint(&a), fingerprint(&b));
		assert!(!fingerprint(&a).is_none());
	}

	#[test]
	fn test_fingerprint_covers_every_field() {
		let base = ReloadRequest::new("/data/mozc.data", 10);
		let id = fingerprint(&base);

		let variants = [
			base.clone().with_engine_type(EngineType::Mobile),
			ReloadRequest::new("/data/other.data", 10),
			ReloadRequest::new("/data/mozc.data", 11),
			base.clone().with_magic_number(*b"MOCK"),
			base.clone().with_install_location("/install/mozc.data"),
		];
		for variant in &variants {
			assert_ne!(fingerprint(variant), id, "field change must alter the id: {variant:?}");
		}
	}

	#[test]
	fn test_fingerprint_distinguishes_empty_and_absent_magic() {
		let absent = ReloadRequest::new("/data/mozc.data", 0);
		let empty = absent.clone().with_magic_number(Vec::new());
		assert_ne!(fingerprint(&absent), fingerprint(&empty));
	}
}
