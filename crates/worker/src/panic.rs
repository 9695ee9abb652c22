use std::any::Any;

/// Extracts a readable message from a thread panic payload.
///
/// Returns `None` when the payload is neither `&'static str` nor `String`.
pub fn panic_message(payload: &(dyn Any + Send)) -> Option<String> {
	if let Some(msg) = payload.downcast_ref::<&'static str>() {
		return Some((*msg).to_owned());
	}
	payload.downcast_ref::<String>().cloned()
}
