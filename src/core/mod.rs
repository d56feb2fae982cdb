

pub mod config;
pub mod error;
pub mod events;

pub use self::config::HeraldConfig;
pub use error::{HeraldError, Result};
pub use events::{Event, EventKey, EventSource};
