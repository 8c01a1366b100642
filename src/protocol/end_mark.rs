use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::utils::Seq16;

use super::DecodingError;

pub const END_TAG: &[u8; 3] = b"END";
pub const END_TAG_OFFSET: usize = 2;
pub const END_MARK_LEN: usize = 5;

/// Signals that no further chunks for a sequence identifier will be sent.
pub struct EndMark {
    seq: Seq16,
}

pub struct EndMarkBuilder {
    pub seq: Seq16,
}

impl EndMarkBuilder {
    pub fn build(self) -> EndMark {
        EndMark { seq: self.seq }
    }
}

impl EndMark {
    pub fn from_bytes(datagram: &[u8]) -> Result<Self, DecodingError> {
        if datagram.len() < END_MARK_LEN {
            return Err(DecodingError::Decoding { field: "len" });
        }
        if &datagram[END_TAG_OFFSET..END_TAG_OFFSET + END_TAG.len()] != END_TAG {
            return Err(DecodingError::Decoding { field: "tag" });
        }
        let mut rdr = Cursor::new(datagram);
        let seq = rdr
            .read_u16::<BigEndian>()
            .map_err(|_e| DecodingError::Decoding { field: "seq" })?;
        Ok(EndMark {
            seq: Seq16::from_u16(seq),
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.write_u16::<BigEndian>(self.seq.to_u16()).unwrap();
        bytes.extend_from_slice(END_TAG);
        assert_eq!(bytes.len(), END_MARK_LEN);
        bytes
    }

    #[must_use]
    #[inline]
    pub fn seq(&self) -> Seq16 {
        self.seq
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let mark1 = EndMarkBuilder {
            seq: Seq16::from_u16(65535),
        }
        .build();
        let bytes = mark1.to_bytes();
        assert_eq!(bytes.len(), END_MARK_LEN);
        let mark2 = EndMark::from_bytes(&bytes).unwrap();
        assert_eq!(mark1.seq, mark2.seq);
    }

    #[test]
    fn wrong_tag_rejected() {
        assert!(EndMark::from_bytes(&[0, 1, b'E', b'N', b'Q']).is_err());
    }

    #[test]
    fn short_rejected() {
        assert!(EndMark::from_bytes(&[0, 1, b'E', b'N']).is_err());
    }
}
