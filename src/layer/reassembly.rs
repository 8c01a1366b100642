use std::{
    collections::{BTreeMap, HashMap},
    time::{Duration, Instant},
};

use crate::utils::Seq16;

use super::receiver::FrameValidator;

/// Per-sequence accumulator of received chunks.
///
/// Exists only once a frame header for the sequence has been observed;
/// chunk and end-marker packets for unknown sequences never create state.
struct ReassemblyBuffer {
    expected_size: usize,
    chunks: BTreeMap<u16, Vec<u8>>,
    last_activity: Instant,
}

impl ReassemblyBuffer {
    fn assemble(self) -> Vec<u8> {
        // expected_size is wire-supplied and must not size an allocation by
        // itself; reserve only for bytes actually received
        let received: usize = self.chunks.values().map(Vec::len).sum();
        let mut assembled = Vec::with_capacity(received.min(self.expected_size));
        for (_index, data) in self.chunks {
            assembled.extend_from_slice(&data);
        }
        assembled
    }
}

/// The receiver's buffer table, keyed by sequence identifier.
///
/// All mutation goes through the insert/finish/sweep operations; there is no
/// ambient state. A buffer leaves the arena either consumed by an
/// end-marker (win or lose) or evicted by the age sweep.
pub struct ReassemblyArena {
    buffers: HashMap<Seq16, ReassemblyBuffer>,
    max_buffer_age: Duration,
}

impl ReassemblyArena {
    #[must_use]
    pub fn new(max_buffer_age: Duration) -> Self {
        ReassemblyArena {
            buffers: HashMap::new(),
            max_buffer_age,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.buffers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buffers.is_empty()
    }

    #[must_use]
    pub fn contains(&self, seq: Seq16) -> bool {
        self.buffers.contains_key(&seq)
    }

    /// Creates the buffer for `seq` if none exists. A repeated header is
    /// ignored; it never resets chunks already received.
    pub fn insert_header(&mut self, seq: Seq16, expected_size: u32, now: Instant) {
        self.buffers.entry(seq).or_insert_with(|| {
            log::trace!(
                "new reassembly buffer: seq {} expecting {} bytes",
                seq.to_u16(),
                expected_size
            );
            ReassemblyBuffer {
                expected_size: expected_size as usize,
                chunks: BTreeMap::new(),
                last_activity: now,
            }
        });
    }

    /// Stores a chunk, first-writer-wins on a duplicate index. Ignored when
    /// no header has arrived for `seq`. Activity is refreshed only when the
    /// chunk is actually stored.
    pub fn insert_chunk(&mut self, seq: Seq16, index: u16, data: Vec<u8>, now: Instant) {
        let Some(buffer) = self.buffers.get_mut(&seq) else {
            log::trace!("chunk for unknown seq {} dropped", seq.to_u16());
            return;
        };
        if let std::collections::btree_map::Entry::Vacant(entry) = buffer.chunks.entry(index) {
            entry.insert(data);
            buffer.last_activity = now;
        }
    }

    /// Consumes the buffer for `seq` on an end-marker.
    ///
    /// Chunks are concatenated in ascending index order; if the assembly
    /// covers `expected_size` it is truncated to that size and handed to the
    /// validity hook. The buffer is deleted on every outcome: a second
    /// end-marker can never resurrect a sequence, and an incomplete frame is
    /// given up rather than kept waiting for chunks that will not come.
    pub fn finish(&mut self, seq: Seq16, validator: &dyn FrameValidator) -> Option<Vec<u8>> {
        let buffer = self.buffers.remove(&seq)?;
        let expected_size = buffer.expected_size;
        let mut assembled = buffer.assemble();
        if expected_size == 0 || assembled.len() < expected_size {
            log::debug!(
                "seq {} incomplete at end-marker: {} of {} bytes",
                seq.to_u16(),
                assembled.len(),
                expected_size
            );
            return None;
        }
        assembled.truncate(expected_size);
        if !validator.validate(&assembled) {
            log::debug!("seq {} failed payload validation", seq.to_u16());
            return None;
        }
        Some(assembled)
    }

    /// Deletes every buffer idle for longer than the configured age,
    /// complete or not.
    pub fn sweep(&mut self, now: Instant) {
        let max_age = self.max_buffer_age;
        self.buffers.retain(|seq, buffer| {
            let keep = now.duration_since(buffer.last_activity) <= max_age;
            if !keep {
                log::debug!("evicting stale buffer for seq {}", seq.to_u16());
            }
            keep
        });
    }
}
