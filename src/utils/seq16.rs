//! Wrapping 16-bit sequence identifiers.
//!
//! A `Seq16` correlates the header, chunk, and end-marker datagrams that
//! belong to the same payload. The space wraps at 65536, so an identifier is
//! not unique over the lifetime of a stream: a reassembly buffer that
//! survives a full wraparound can collide with a reused identifier. The
//! transport accepts this as a known limitation rather than widening the
//! field; at typical frame rates a buffer is evicted long before 65536
//! frames pass.

use std::num::Wrapping;

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub struct Seq16 {
    n: u16,
}

impl Seq16 {
    pub fn from_u16(n: u16) -> Self {
        Seq16 { n }
    }

    pub fn to_u16(&self) -> u16 {
        self.n
    }

    pub fn add_u16(&self, n: u16) -> Seq16 {
        let s = Wrapping(self.n) + Wrapping(n);
        Seq16 { n: s.0 }
    }

    pub fn increment(&mut self) {
        *self = self.add_u16(1);
    }
}
