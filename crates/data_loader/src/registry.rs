//! Candidate request arbitration.
//!
//! The registry keeps every live [`ReloadRequest`] together with a permanent
//! blacklist of ids whose build or load failed. After each mutation it
//! recomputes the top request: lowest `priority` first, most recent
//! registration on ties.

use std::cmp::Reverse;

use rustc_hash::FxHashSet;

use crate::{ReloadRequest, RequestId, fingerprint};

/// One registered candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
	pub id: RequestId,
	pub priority: i32,
	/// Registration order; larger is more recent.
	pub sequence: u32,
	pub request: ReloadRequest,
}

/// Result of [`RequestRegistry::try_register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
	/// Id of the submitted request.
	pub id: RequestId,
	/// Top request after the call.
	pub top: RequestId,
	/// `false` when the id is blacklisted and the request was dropped.
	pub accepted: bool,
}

/// Live reload candidates plus the blacklist of rejected ids.
#[derive(Debug, Default)]
pub struct RequestRegistry {
	records: Vec<RequestRecord>,
	blacklist: FxHashSet<RequestId>,
	sequence: u32,
	top: RequestId,
}

impl RequestRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `request` and returns the top request id.
	///
	/// Blacklisted requests are dropped silently; the returned id is then the
	/// unchanged top.
	pub fn register(&mut self, request: ReloadRequest) -> RequestId {
		self.try_register(request).top
	}

	/// Like [`Self::register`] but also reports whether the request was accepted.
	pub fn try_register(&mut self, request: ReloadRequest) -> Registration {
		let id = fingerprint(&request);
		if self.blacklist.contains(&id) {
			tracing::debug!(%id, top = %self.top, "data_loader.registry.rejected");
			return Registration {
				id,
				top: self.top,
				accepted: false,
			};
		}

		self.sequence = self.sequence.wrapping_add(1);
		let sequence = self.sequence;
		let priority = request.priority;
		match self.records.iter_mut().find(|r| r.id == id) {
			Some(record) => {
				record.priority = priority;
				record.sequence = sequence;
				record.request = request;
			}
			None => self.records.push(RequestRecord {
				id,
				priority,
				sequence,
				request,
			}),
		}

		self.recompute_top();
		tracing::trace!(%id, priority, sequence, top = %self.top, "data_loader.registry.register");
		Registration {
			id,
			top: self.top,
			accepted: true,
		}
	}

	/// Removes `id`, blacklists it permanently and returns the new top id.
	///
	/// Blacklisting happens even when `id` is not currently registered, so a
	/// later registration of the same content is refused.
	pub fn unregister(&mut self, id: RequestId) -> RequestId {
		if id.is_none() {
			return self.top;
		}
		self.records.retain(|r| r.id != id);
		self.blacklist.insert(id);
		self.recompute_top();
		tracing::trace!(%id, top = %self.top, blacklisted = self.blacklist.len(), "data_loader.registry.unregister");
		self.top
	}

	/// Drops all records and the blacklist.
	pub fn clear(&mut self) {
		self.records.clear();
		self.blacklist.clear();
		self.sequence = 0;
		self.top = RequestId::NONE;
	}

	/// Returns the current top request id, or [`RequestId::NONE`].
	pub fn top(&self) -> RequestId {
		self.top
	}

	/// Returns the live record for `id`.
	pub fn get(&self, id: RequestId) -> Option<&RequestRecord> {
		self.records.iter().find(|r| r.id == id)
	}

	/// Returns the request payload for `id`.
	pub fn request(&self, id: RequestId) -> Option<&ReloadRequest> {
		self.get(id).map(|r| &r.request)
	}

	pub fn contains(&self, id: RequestId) -> bool {
		self.get(id).is_some()
	}

	pub fn is_blacklisted(&self, id: RequestId) -> bool {
		self.blacklist.contains(&id)
	}

	/// Number of live records.
	pub fn len(&self) -> usize {
		self.records.len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}

	/// Live records in priority order, top first.
	pub fn ranked(&self) -> Vec<&RequestRecord> {
		let mut ranked: Vec<_> = self.records.iter().collect();
		ranked.sort_by_key(|r| rank(r));
		ranked
	}

	fn recompute_top(&mut self) {
		self.top = self.records.iter().min_by_key(|r| rank(r)).map_or(RequestId::NONE, |r| r.id);
	}
}

/// Sort key: priority ascending, then sequence descending.
fn rank(record: &RequestRecord) -> (i32, Reverse<u32>) {
	(record.priority, Reverse(record.sequence))
}
