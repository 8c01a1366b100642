use std::{
    io,
    net::SocketAddr,
    time::{Duration, Instant},
};

use crate::protocol::packet::{classify, Packet};

use super::{
    reassembly::ReassemblyArena,
    socket::{BindError, LinkSocket, LinkSocketBuilder, SocketState},
};

// largest possible UDP payload; inbound datagrams are never assumed to
// honor the sender's chunk size
const RECV_DATAGRAM_CAP: usize = 65535;

/// Validity check applied to an assembled payload before it is surfaced.
///
/// The application supplies the image-decode hook here; a payload the
/// decoder rejects is dropped as corrupt. The default accepts everything.
pub trait FrameValidator {
    fn validate(&self, payload: &[u8]) -> bool;
}

pub struct AcceptAll;

impl FrameValidator for AcceptAll {
    fn validate(&self, _payload: &[u8]) -> bool {
        true
    }
}

/// Classifies inbound datagrams, tracks per-sequence reassembly state, and
/// surfaces completed payloads.
pub struct Receiver {
    socket: LinkSocket,
    arena: ReassemblyArena,
    validator: Box<dyn FrameValidator + Send>,
    recv_buf: Vec<u8>,
}

pub struct ReceiverBuilder {
    pub bind_addr: SocketAddr,
    pub rcv_buf_size: Option<usize>,
    pub max_buffer_age: Duration,
    pub rebind_backoff: Duration,
    pub validator: Option<Box<dyn FrameValidator + Send>>,
}

impl ReceiverBuilder {
    #[must_use]
    pub fn new(bind_addr: SocketAddr) -> Self {
        ReceiverBuilder {
            bind_addr,
            rcv_buf_size: None,
            max_buffer_age: super::DEFAULT_MAX_BUFFER_AGE,
            rebind_backoff: super::DEFAULT_REBIND_BACKOFF,
            validator: None,
        }
    }

    #[must_use]
    pub fn build(self) -> Receiver {
        Receiver {
            socket: LinkSocketBuilder {
                bind_addr: Some(self.bind_addr),
                snd_buf_size: None,
                rcv_buf_size: self.rcv_buf_size,
                backoff: self.rebind_backoff,
            }
            .build(),
            arena: ReassemblyArena::new(self.max_buffer_age),
            validator: self.validator.unwrap_or_else(|| Box::new(AcceptAll)),
            recv_buf: vec![0; RECV_DATAGRAM_CAP],
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error("receive failed: {0}")]
    Io(#[source] io::Error),
}

impl Receiver {
    #[must_use]
    pub fn socket_state(&self) -> SocketState {
        self.socket.state()
    }

    /// Number of in-progress reassembly buffers.
    #[must_use]
    pub fn pending_buffers(&self) -> usize {
        self.arena.len()
    }

    /// Binds the socket now (it is otherwise bound lazily by `poll`) and
    /// returns the resolved local address.
    pub fn bind(&mut self) -> Result<SocketAddr, BindError> {
        let sock = self.socket.ensure()?;
        sock.local_addr().map_err(BindError::Io)
    }

    /// One bounded receive attempt.
    ///
    /// Returns a payload only when the received datagram was an end-marker
    /// whose buffer held the whole frame. A timeout with no data is a normal
    /// outcome and still runs the stale-buffer sweep. A socket-level error
    /// drops the socket; this call and subsequent ones retry the bind, gated
    /// by the fixed backoff.
    pub fn poll(&mut self, timeout: Duration) -> Result<Option<Vec<u8>>, PollError> {
        let sock = self.socket.ensure()?;
        // zero would put the socket in nonblocking mode forever
        let timeout = timeout.max(Duration::from_millis(1));
        if let Err(e) = sock.set_read_timeout(Some(timeout)) {
            self.socket.invalidate();
            return Err(PollError::Io(e));
        }

        match sock.recv_from(&mut self.recv_buf) {
            Ok((len, _peer)) => {
                let now = Instant::now();
                let completed = apply(
                    &mut self.arena,
                    self.validator.as_ref(),
                    &self.recv_buf[..len],
                    now,
                );
                Ok(completed)
            }
            Err(e) if is_timeout(&e) => {
                self.arena.sweep(Instant::now());
                Ok(None)
            }
            Err(e) => {
                log::warn!("receive failed: {}; rebinding socket", e);
                self.socket.invalidate();
                let _ = self.socket.ensure();
                Err(PollError::Io(e))
            }
        }
    }

    /// Feeds one datagram through classify-and-apply without touching the
    /// socket. `poll` routes every received datagram through this.
    pub fn handle_datagram(&mut self, datagram: &[u8], now: Instant) -> Option<Vec<u8>> {
        apply(&mut self.arena, self.validator.as_ref(), datagram, now)
    }

    /// Idempotent; safe to call at any time.
    pub fn close(&mut self) {
        self.socket.close();
    }
}

fn is_timeout(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

fn apply(
    arena: &mut ReassemblyArena,
    validator: &dyn FrameValidator,
    datagram: &[u8],
    now: Instant,
) -> Option<Vec<u8>> {
    let packet = match classify(datagram) {
        Ok(packet) => packet,
        Err(e) => {
            log::trace!("discarding datagram: {}", e);
            return None;
        }
    };
    match packet {
        Packet::FrameHeader(hdr) => {
            arena.insert_header(hdr.seq(), hdr.payload_len(), now);
            None
        }
        Packet::Chunk(chunk) => {
            let (seq, index) = (chunk.seq(), chunk.index());
            arena.insert_chunk(seq, index, chunk.into_data(), now);
            None
        }
        Packet::EndMark(mark) => {
            let completed = arena.finish(mark.seq(), validator);
            arena.sweep(now);
            completed
        }
    }
}
