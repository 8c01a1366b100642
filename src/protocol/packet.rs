use super::{
    chunk::{Chunk, CHUNK_HDR_LEN},
    end_mark::{EndMark, END_MARK_LEN, END_TAG, END_TAG_OFFSET},
    frame_hdr::{FrameHeader, FRAME_HDR_LEN},
    DecodingError,
};

/// An inbound datagram decoded into its wire role.
pub enum Packet {
    FrameHeader(FrameHeader),
    Chunk(Chunk),
    EndMark(EndMark),
}

/// Classifies a datagram by shape and decodes it.
///
/// The wire carries no discriminant byte; the role is implied by length and
/// content, with the precedence documented in the module header. Anything
/// that fits no shape is malformed and must be discarded without mutating
/// receiver state.
pub fn classify(datagram: &[u8]) -> Result<Packet, DecodingError> {
    if datagram.len() < CHUNK_HDR_LEN {
        return Err(DecodingError::Decoding { field: "len" });
    }
    if datagram.len() == FRAME_HDR_LEN {
        return FrameHeader::from_bytes(datagram).map(Packet::FrameHeader);
    }
    if datagram.len() >= END_MARK_LEN
        && &datagram[END_TAG_OFFSET..END_TAG_OFFSET + END_TAG.len()] == END_TAG
    {
        return EndMark::from_bytes(datagram).map(Packet::EndMark);
    }
    if datagram.len() > CHUNK_HDR_LEN {
        return Chunk::from_bytes(datagram).map(Packet::Chunk);
    }
    Err(DecodingError::Decoding { field: "len" })
}

#[cfg(test)]
mod tests {
    use crate::protocol::{
        chunk::ChunkBuilder, end_mark::EndMarkBuilder, frame_hdr::FrameHeaderBuilder,
    };
    use crate::utils::Seq16;

    use super::*;

    #[test]
    fn classify_frame_header() {
        let bytes = FrameHeaderBuilder {
            seq: Seq16::from_u16(1),
            payload_len: 3000,
        }
        .build()
        .unwrap()
        .to_bytes();
        assert!(matches!(classify(&bytes), Ok(Packet::FrameHeader(_))));
    }

    #[test]
    fn classify_chunk() {
        let bytes = ChunkBuilder {
            seq: Seq16::from_u16(1),
            index: 0,
            data: vec![1, 2, 3],
        }
        .build()
        .unwrap()
        .to_bytes();
        assert!(matches!(classify(&bytes), Ok(Packet::Chunk(_))));
    }

    #[test]
    fn classify_end_mark() {
        let bytes = EndMarkBuilder {
            seq: Seq16::from_u16(1),
        }
        .build()
        .to_bytes();
        assert!(matches!(classify(&bytes), Ok(Packet::EndMark(_))));
    }

    #[test]
    fn six_byte_datagram_is_header_even_with_tag_bytes() {
        // length 6 wins over content; a header whose payload_len happens to
        // start with "EN" must not be read as an end-marker
        let bytes = [0, 1, b'E', b'N', b'D', 9];
        assert!(matches!(classify(&bytes), Ok(Packet::FrameHeader(_))));
    }

    #[test]
    fn five_byte_datagram_without_tag_is_chunk() {
        let bytes = [0, 1, 0, 0, 42];
        match classify(&bytes) {
            Ok(Packet::Chunk(chunk)) => assert_eq!(chunk.data(), &[42]),
            _ => panic!("expected chunk"),
        }
    }

    #[test]
    fn too_short_discarded() {
        assert!(classify(&[]).is_err());
        assert!(classify(&[0]).is_err());
        assert!(classify(&[0, 1, 2]).is_err());
        // exactly the chunk header and nothing else fits no shape
        assert!(classify(&[0, 1, 0, 0]).is_err());
    }
}
