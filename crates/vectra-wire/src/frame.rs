//! Complete frame structure for the VECTRA wire protocol
//!
//! Frame = Fixed Header + Payload. The transport adds a 4-byte length
//! prefix when writing a frame onto a TCP stream; this module only deals
//! with the header+payload bytes themselves.

use vectra_core::{NodeId, VectraError, VectraResult};

use crate::{FixedHeader, MessageTag, FIXED_HEADER_SIZE};

/// Maximum frame size. Generous for a simulation protocol whose largest
/// message is a state snapshot with rendered history.
pub const MAX_FRAME_SIZE: usize = 64 * 1024;

/// Complete VECTRA frame
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    /// Fixed header
    pub header: FixedHeader,
    /// Message payload (tag-specific encoding)
    pub payload: Vec<u8>,
}

impl Frame {
    /// Create a frame with an empty payload.
    pub fn new(tag: MessageTag, node_id: NodeId) -> Self {
        Frame {
            header: FixedHeader::new(tag, node_id),
            payload: Vec::new(),
        }
    }

    /// Create a frame carrying `payload`.
    pub fn with_payload(tag: MessageTag, node_id: NodeId, payload: Vec<u8>) -> Self {
        Frame {
            header: FixedHeader::new(tag, node_id),
            payload,
        }
    }

    /// Parse a frame from bytes.
    pub fn parse(buf: &[u8]) -> VectraResult<Self> {
        let header = FixedHeader::parse(buf)?;

        let expected = FIXED_HEADER_SIZE + header.payload_len as usize;
        if buf.len() < expected {
            return Err(VectraError::BufferTooShort {
                expected,
                actual: buf.len(),
            });
        }

        let payload = buf[FIXED_HEADER_SIZE..expected].to_vec();
        Ok(Frame { header, payload })
    }

    /// Serialize the frame to bytes.
    pub fn serialize(&self) -> VectraResult<Vec<u8>> {
        let total_size = FIXED_HEADER_SIZE + self.payload.len();
        if total_size > MAX_FRAME_SIZE {
            return Err(VectraError::InvalidWireFormat(format!(
                "Frame too large: {} > {}",
                total_size, MAX_FRAME_SIZE
            )));
        }

        let mut buf = vec![0u8; total_size];
        let mut header = self.header;
        header.payload_len = self.payload.len() as u32;
        header.serialize(&mut buf)?;
        buf[FIXED_HEADER_SIZE..].copy_from_slice(&self.payload);
        Ok(buf)
    }
}
