

pub mod chunker;
pub mod policy;

pub use chunker::chunk_events;
pub use policy::{BatchPolicy, FlushContext, FlushReason, FlushTrigger};
