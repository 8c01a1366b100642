//! # Frame header packet
//!
//! ```text
//! 0       2               6         (BYTE)
//! +-------+---------------+
//! |  seq  |  payload_len  |
//! +-------+---------------+
//! ```
//!
//! # Chunk packet
//!
//! ```text
//! 0       2       4                 (BYTE)
//! +-------+-------+
//! |  seq  | index |
//! +-------+-------+---------------+
//! |                               |
//! |             data              |
//! |                               |
//! +-------------------------------+
//! ```
//!
//! # End-marker packet
//!
//! ```text
//! 0       2           5             (BYTE)
//! +-------+-----------+
//! |  seq  |   "END"   |
//! +-------+-----------+
//! ```
//!
//! # Classification
//!
//! Packet roles are carried by datagram shape, not by a discriminant byte.
//! Precedence, applied to every inbound datagram:
//!
//! 1. total length exactly `6` => frame header
//! 2. bytes `2..5` equal to the literal tag `"END"` => end-marker
//! 3. total length greater than `4` => chunk
//! 4. anything else => malformed, discarded
//!
//! # Invariants
//!
//! - chunk `data` should not be empty
//! - all multi-byte integers are big-endian

pub mod chunk;
pub mod end_mark;
pub mod frame_hdr;
pub mod packet;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodingError {
    #[error("malformed packet while decoding {field}")]
    Decoding { field: &'static str },
}
