

pub mod base;

pub use base::{Event, EventKey, EventSource};
