mod reassembly;
mod receiver;
mod sender;
mod socket;

use std::time::Duration;

pub use reassembly::*;
pub use receiver::*;
pub use sender::*;
pub use socket::*;

/// Safe payload bytes per chunk datagram under a 1500-byte path MTU, after
/// IP/UDP overhead and the 4-byte chunk framing.
pub const DEFAULT_CHUNK_SIZE: usize = 1400;

/// How long a reassembly buffer may sit idle before the sweep evicts it.
pub const DEFAULT_MAX_BUFFER_AGE: Duration = Duration::from_secs(5);

/// Fixed delay between socket create/bind attempts after a failure.
pub const DEFAULT_REBIND_BACKOFF: Duration = Duration::from_secs(2);
