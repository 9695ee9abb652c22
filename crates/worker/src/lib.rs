//! Background worker primitives.
//!
//! Heavy engine data builds run on dedicated named threads so the interactive
//! input path never waits on them. [`BackgroundFuture`] is the single handoff
//! point between such a thread and its owner.

mod class;
mod error;
mod future;
mod panic;
mod spawn;

pub use class::TaskClass;
pub use error::WorkerError;
pub use future::BackgroundFuture;
pub use panic::panic_message;
pub use spawn::spawn_named_thread;
