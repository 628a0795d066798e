use std::ops::Range;

/// A contiguous range of positions in a payment snapshot, owned by one worker.
pub type Chunk = Range<usize>;

/// Splits a collection into contiguous, non-overlapping chunks that cover it
/// exactly once, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partitioner {
    /// Plan for a number of workers: `min(workers, len)` chunks whose lengths
    /// differ by at most one, the longer ones first. Zero or one worker means
    /// a single chunk over the whole collection.
    Workers(usize),
    /// Plan with an explicit step. Every chunk holds one step except the
    /// last, which absorbs the tail once fewer than two steps remain. A step
    /// of zero means a single chunk.
    ChunkSize(usize),
}

impl Partitioner {
    pub fn for_workers(workers: usize) -> Self {
        Self::Workers(workers)
    }

    pub fn with_chunk_size(chunk_size: usize) -> Self {
        Self::ChunkSize(chunk_size)
    }

    pub fn split(&self, len: usize) -> Vec<Chunk> {
        if len == 0 {
            return Vec::new();
        }
        match *self {
            Self::Workers(workers) => split_even(len, workers.clamp(1, len)),
            Self::ChunkSize(0) => vec![0..len],
            Self::ChunkSize(step) => split_stepped(len, step),
        }
    }
}

fn split_even(len: usize, count: usize) -> Vec<Chunk> {
    let base = len / count;
    let longer = len % count;
    let mut chunks = Vec::with_capacity(count);
    let mut start = 0;
    for index in 0..count {
        let end = start + base + usize::from(index < longer);
        chunks.push(start..end);
        start = end;
    }
    chunks
}

fn split_stepped(len: usize, step: usize) -> Vec<Chunk> {
    let mut chunks = Vec::with_capacity(len / step + 1);
    let mut start = 0;
    while start < len {
        let remaining = len - start;
        let end = if remaining < step.saturating_mul(2) {
            len
        } else {
            start + step
        };
        chunks.push(start..end);
        start = end;
    }
    chunks
}
