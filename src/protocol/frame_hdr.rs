use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::utils::Seq16;

use super::DecodingError;

pub const FRAME_HDR_LEN: usize = 6;

/// Declares a new sequence identifier and the total payload length to expect.
pub struct FrameHeader {
    seq: Seq16,
    payload_len: u32,
}

pub struct FrameHeaderBuilder {
    pub seq: Seq16,
    pub payload_len: u32,
}

impl FrameHeaderBuilder {
    pub fn build(self) -> Result<FrameHeader, Error> {
        if self.payload_len == 0 {
            return Err(Error::EmptyPayload);
        }
        let this = FrameHeader {
            seq: self.seq,
            payload_len: self.payload_len,
        };
        this.check_rep();
        Ok(this)
    }
}

#[derive(Debug)]
pub enum Error {
    EmptyPayload,
}

impl FrameHeader {
    #[inline]
    fn check_rep(&self) {}

    /// Accepts any length-6 datagram, a zero declared length included; the
    /// sender never emits one, but a received zero-length header still
    /// creates a buffer, which its end-marker then consumes empty-handed.
    pub fn from_bytes(datagram: &[u8]) -> Result<Self, DecodingError> {
        if datagram.len() != FRAME_HDR_LEN {
            return Err(DecodingError::Decoding { field: "len" });
        }
        let mut rdr = Cursor::new(datagram);
        let seq = rdr
            .read_u16::<BigEndian>()
            .map_err(|_e| DecodingError::Decoding { field: "seq" })?;
        let seq = Seq16::from_u16(seq);
        let payload_len = rdr
            .read_u32::<BigEndian>()
            .map_err(|_e| DecodingError::Decoding { field: "payload_len" })?;

        let this = FrameHeader { seq, payload_len };
        this.check_rep();
        Ok(this)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut hdr = Vec::new();
        hdr.write_u16::<BigEndian>(self.seq.to_u16()).unwrap();
        hdr.write_u32::<BigEndian>(self.payload_len).unwrap();
        assert_eq!(hdr.len(), FRAME_HDR_LEN);
        hdr
    }

    #[must_use]
    #[inline]
    pub fn seq(&self) -> Seq16 {
        self.seq
    }

    #[must_use]
    #[inline]
    pub fn payload_len(&self) -> u32 {
        self.payload_len
    }
}
