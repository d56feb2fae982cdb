

use crate::core::error::{HeraldError, Result};
use crate::core::events::Event;


pub fn chunk_events(events: &[Event], max_chunk_size: usize) -> Result<Vec<Vec<Event>>> {
    if max_chunk_size == 0 {
        return Err(HeraldError::config("max_chunk_size must be at least 1"));
    }

    Ok(events
        .chunks(max_chunk_size)
        .map(<[Event]>::to_vec)
        .collect())
}
