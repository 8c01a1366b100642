use std::io::Cursor;

use byteorder::{BigEndian, ReadBytesExt, WriteBytesExt};

use crate::utils::Seq16;

use super::DecodingError;

pub const CHUNK_HDR_LEN: usize = 4;

/// One contiguous slice of a fragmented payload plus its zero-based index.
pub struct Chunk {
    seq: Seq16,
    index: u16,
    data: Vec<u8>,
}

pub struct ChunkBuilder {
    pub seq: Seq16,
    pub index: u16,
    pub data: Vec<u8>,
}

impl ChunkBuilder {
    pub fn build(self) -> Result<Chunk, Error> {
        if self.data.is_empty() {
            return Err(Error::EmptyData);
        }
        let this = Chunk {
            seq: self.seq,
            index: self.index,
            data: self.data,
        };
        this.check_rep();
        Ok(this)
    }
}

#[derive(Debug)]
pub enum Error {
    EmptyData,
}

impl Chunk {
    #[inline]
    fn check_rep(&self) {
        assert!(!self.data.is_empty());
    }

    pub fn from_bytes(datagram: &[u8]) -> Result<Self, DecodingError> {
        if datagram.len() <= CHUNK_HDR_LEN {
            return Err(DecodingError::Decoding { field: "len" });
        }
        let mut rdr = Cursor::new(datagram);
        let seq = rdr
            .read_u16::<BigEndian>()
            .map_err(|_e| DecodingError::Decoding { field: "seq" })?;
        let seq = Seq16::from_u16(seq);
        let index = rdr
            .read_u16::<BigEndian>()
            .map_err(|_e| DecodingError::Decoding { field: "index" })?;
        let data = datagram[CHUNK_HDR_LEN..].to_vec();

        let this = Chunk { seq, index, data };
        this.check_rep();
        Ok(this)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(CHUNK_HDR_LEN + self.data.len());
        bytes.write_u16::<BigEndian>(self.seq.to_u16()).unwrap();
        bytes.write_u16::<BigEndian>(self.index).unwrap();
        bytes.extend_from_slice(&self.data);
        bytes
    }

    #[must_use]
    #[inline]
    pub fn seq(&self) -> Seq16 {
        self.seq
    }

    #[must_use]
    #[inline]
    pub fn index(&self) -> u16 {
        self.index
    }

    #[must_use]
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip() {
        let chunk1 = ChunkBuilder {
            seq: Seq16::from_u16(9),
            index: 2,
            data: vec![0xde, 0xad, 0xbe, 0xef],
        }
        .build()
        .unwrap();
        let bytes = chunk1.to_bytes();
        assert_eq!(bytes.len(), CHUNK_HDR_LEN + 4);
        let chunk2 = Chunk::from_bytes(&bytes).unwrap();
        assert_eq!(chunk1.seq, chunk2.seq);
        assert_eq!(chunk1.index, chunk2.index);
        assert_eq!(chunk1.data, chunk2.data);
    }

    #[test]
    fn empty_data_rejected() {
        let result = ChunkBuilder {
            seq: Seq16::from_u16(0),
            index: 0,
            data: vec![],
        }
        .build();
        assert!(result.is_err());
    }

    #[test]
    fn header_only_rejected() {
        assert!(Chunk::from_bytes(&[0, 1, 0, 2]).is_err());
    }
}
