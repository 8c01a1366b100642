use std::{
    io,
    net::{SocketAddr, UdpSocket},
    time::Duration,
};

use crate::{
    protocol::{chunk::ChunkBuilder, end_mark::EndMarkBuilder, frame_hdr::FrameHeaderBuilder},
    utils::Seq16,
};

use super::socket::{BindError, LinkSocket, LinkSocketBuilder, SocketState};

/// Fragments one payload per call into an MTU-safe datagram burst.
///
/// Fire-and-forget: no acknowledgement is awaited and nothing is
/// retransmitted. A failed burst drops the current payload; the caller
/// moves on to the next frame.
pub struct Sender {
    target: SocketAddr,
    chunk_size: usize,
    seq: Seq16,
    socket: LinkSocket,
}

pub struct SenderBuilder {
    pub target: SocketAddr,
    pub chunk_size: usize,
    pub snd_buf_size: Option<usize>,
    pub rebind_backoff: Duration,
}

impl SenderBuilder {
    #[must_use]
    pub fn new(target: SocketAddr) -> Self {
        SenderBuilder {
            target,
            chunk_size: super::DEFAULT_CHUNK_SIZE,
            snd_buf_size: None,
            rebind_backoff: super::DEFAULT_REBIND_BACKOFF,
        }
    }

    #[must_use]
    pub fn build(self) -> Sender {
        let this = Sender {
            target: self.target,
            chunk_size: self.chunk_size,
            seq: Seq16::from_u16(0),
            socket: LinkSocketBuilder {
                bind_addr: None,
                snd_buf_size: self.snd_buf_size,
                rcv_buf_size: None,
                backoff: self.rebind_backoff,
            }
            .build(),
        };
        this.check_rep();
        this
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransmitError {
    #[error("empty payload")]
    EmptyPayload,
    #[error("payload too large to fragment: {0} bytes")]
    PayloadTooLarge(usize),
    #[error(transparent)]
    Bind(#[from] BindError),
    #[error("send failed: {0}")]
    Io(#[source] io::Error),
}

impl Sender {
    #[inline]
    fn check_rep(&self) {
        assert!(self.chunk_size > 0);
    }

    #[must_use]
    pub fn socket_state(&self) -> SocketState {
        self.socket.state()
    }

    /// The identifier assigned to the most recent burst.
    #[must_use]
    pub fn seq(&self) -> Seq16 {
        self.seq
    }

    /// Fragments `payload` and hands the whole burst to the socket layer.
    ///
    /// A sequence identifier is consumed once the burst is attempted, even
    /// if a datagram in the middle of it fails; partial sends are not rolled
    /// back. An unusable socket is recreated before anything is sent; if
    /// that fails no identifier is consumed and the fixed backoff gates the
    /// next call.
    pub fn transmit(&mut self, payload: &[u8]) -> Result<(), TransmitError> {
        if payload.is_empty() {
            return Err(TransmitError::EmptyPayload);
        }
        let chunk_count = payload.len().div_ceil(self.chunk_size);
        if payload.len() > u32::MAX as usize || chunk_count > u16::MAX as usize + 1 {
            return Err(TransmitError::PayloadTooLarge(payload.len()));
        }

        let sock = self.socket.ensure()?;
        self.seq.increment();
        let seq = self.seq;

        match emit_burst(sock, self.target, seq, payload, self.chunk_size) {
            Ok(()) => {
                log::trace!(
                    "sent seq {}: {} bytes in {} chunks",
                    seq.to_u16(),
                    payload.len(),
                    chunk_count
                );
                self.check_rep();
                Ok(())
            }
            Err(e) => {
                log::warn!("send failed mid-burst for seq {}: {}", seq.to_u16(), e);
                self.socket.invalidate();
                // recreate eagerly so the next frame has a usable socket
                let _ = self.socket.ensure();
                self.check_rep();
                Err(TransmitError::Io(e))
            }
        }
    }

    /// Idempotent; safe to call at any time.
    pub fn close(&mut self) {
        self.socket.close();
    }
}

fn emit_burst(
    sock: &UdpSocket,
    target: SocketAddr,
    seq: Seq16,
    payload: &[u8],
    chunk_size: usize,
) -> io::Result<()> {
    for datagram in packetize(seq, payload, chunk_size) {
        sock.send_to(&datagram, target)?;
    }
    Ok(())
}

/// The exact datagram sequence for one payload: header, chunks in index
/// order, end-marker.
pub fn packetize(seq: Seq16, payload: &[u8], chunk_size: usize) -> Vec<Vec<u8>> {
    assert!(!payload.is_empty());
    assert!(chunk_size > 0);

    let mut burst = Vec::with_capacity(payload.len().div_ceil(chunk_size) + 2);
    let hdr = FrameHeaderBuilder {
        seq,
        payload_len: payload.len() as u32,
    }
    .build()
    .unwrap();
    burst.push(hdr.to_bytes());

    for (index, data) in payload.chunks(chunk_size).enumerate() {
        let chunk = ChunkBuilder {
            seq,
            index: index as u16,
            data: data.to_vec(),
        }
        .build()
        .unwrap();
        burst.push(chunk.to_bytes());
    }

    burst.push(EndMarkBuilder { seq }.build().to_bytes());
    burst
}

#[cfg(test)]
mod tests {
    use crate::protocol::packet::{classify, Packet};

    use super::*;

    #[test]
    fn burst_shape_for_3000_bytes() {
        let payload: Vec<u8> = (0..3000u32).map(|i| (i % 251) as u8).collect();
        let burst = packetize(Seq16::from_u16(42), &payload, 1400);
        // header + 3 chunks + end-marker
        assert_eq!(burst.len(), 5);

        match classify(&burst[0]).unwrap() {
            Packet::FrameHeader(hdr) => {
                assert_eq!(hdr.seq().to_u16(), 42);
                assert_eq!(hdr.payload_len(), 3000);
            }
            _ => panic!("expected frame header"),
        }
        let expected_lens = [1400usize, 1400, 200];
        for (i, expected_len) in expected_lens.iter().enumerate() {
            match classify(&burst[1 + i]).unwrap() {
                Packet::Chunk(chunk) => {
                    assert_eq!(chunk.index() as usize, i);
                    assert_eq!(chunk.data().len(), *expected_len);
                }
                _ => panic!("expected chunk"),
            }
        }
        assert!(matches!(
            classify(burst.last().unwrap()),
            Ok(Packet::EndMark(_))
        ));
    }

    #[test]
    fn single_chunk_when_payload_fits() {
        let burst = packetize(Seq16::from_u16(0), &[1, 2, 3], 1400);
        assert_eq!(burst.len(), 3);
    }

    #[test]
    fn exact_multiple_has_no_empty_tail_chunk() {
        let payload = vec![0u8; 1400 * 2];
        let burst = packetize(Seq16::from_u16(0), &payload, 1400);
        assert_eq!(burst.len(), 4);
    }

    #[test]
    fn empty_payload_rejected_without_consuming_seq() {
        let mut sender = SenderBuilder::new("127.0.0.1:9".parse().unwrap()).build();
        let before = sender.seq();
        assert!(matches!(
            sender.transmit(&[]),
            Err(TransmitError::EmptyPayload)
        ));
        assert_eq!(sender.seq(), before);
    }

    #[test]
    fn transmit_advances_seq() {
        let sink = UdpSocket::bind("127.0.0.1:0").unwrap();
        let mut sender = SenderBuilder::new(sink.local_addr().unwrap()).build();
        sender.transmit(&[1, 2, 3]).unwrap();
        assert_eq!(sender.seq().to_u16(), 1);
        sender.transmit(&[4, 5, 6]).unwrap();
        assert_eq!(sender.seq().to_u16(), 2);
        sender.close();
    }

    #[test]
    fn seq_wraps_after_full_cycle() {
        let sink = UdpSocket::bind("127.0.0.1:0").unwrap();
        let mut sender = SenderBuilder::new(sink.local_addr().unwrap()).build();
        for _ in 0..65536 {
            sender.transmit(&[0xab]).unwrap();
        }
        assert_eq!(sender.seq().to_u16(), 0);
    }
}
