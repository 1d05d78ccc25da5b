//! The decoder seam: an ordered sequence of entity chunks.

use std::error::Error;

use crate::entity::RawEntity;

/// Error produced while decoding a chunk.
pub type ChunkError = Box<dyn Error + Send + Sync>;

/// Yields decoded entities chunk by chunk.
///
/// Chunk boundaries carry no meaning beyond I/O batching.
pub trait ChunkSource {
    /// Number of chunks, when known up front. Drives the ETA.
    fn total_chunks(&self) -> Option<usize>;

    /// Decode the next chunk; `None` once the source is exhausted.
    fn next_chunk(&mut self) -> Option<Result<Vec<RawEntity>, ChunkError>>;
}
