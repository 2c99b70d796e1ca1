//! Fixed header for the VECTRA wire protocol
//!
//! The fixed header is 8 bytes:
//! - Byte 0: Wire version
//! - Byte 1: Message tag
//! - Bytes 2-3: Sender node ID (LE)
//! - Bytes 4-7: Payload length (LE)

use vectra_core::{NodeId, VectraError, VectraResult};

/// Fixed header size in bytes
pub const FIXED_HEADER_SIZE: usize = 8;

/// Current wire protocol version
pub const WIRE_VERSION: u8 = 0;

/// Fixed message tags - the complete remotely reachable surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageTag {
    // Requests
    LocalEvent = 0x01,
    SendMessage = 0x02,
    ReceiveMessage = 0x03,
    GetState = 0x04,
    Shutdown = 0x05,
    Ping = 0x06,

    // Responses
    Ack = 0x10,
    SendResult = 0x11,
    State = 0x12,
    Pong = 0x13,
    Error = 0x14,
}

impl MessageTag {
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x01 => Some(MessageTag::LocalEvent),
            0x02 => Some(MessageTag::SendMessage),
            0x03 => Some(MessageTag::ReceiveMessage),
            0x04 => Some(MessageTag::GetState),
            0x05 => Some(MessageTag::Shutdown),
            0x06 => Some(MessageTag::Ping),
            0x10 => Some(MessageTag::Ack),
            0x11 => Some(MessageTag::SendResult),
            0x12 => Some(MessageTag::State),
            0x13 => Some(MessageTag::Pong),
            0x14 => Some(MessageTag::Error),
            _ => None,
        }
    }

    #[inline]
    pub fn to_byte(self) -> u8 {
        self as u8
    }
}

/// Fixed header structure
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FixedHeader {
    /// Wire protocol version
    pub version: u8,
    /// Message tag
    pub tag: MessageTag,
    /// Sender node ID
    pub node_id: NodeId,
    /// Payload length in bytes
    pub payload_len: u32,
}

impl FixedHeader {
    pub fn new(tag: MessageTag, node_id: NodeId) -> Self {
        FixedHeader {
            version: WIRE_VERSION,
            tag,
            node_id,
            payload_len: 0,
        }
    }

    /// Parse a header from the start of `buf`.
    pub fn parse(buf: &[u8]) -> VectraResult<Self> {
        if buf.len() < FIXED_HEADER_SIZE {
            return Err(VectraError::BufferTooShort {
                expected: FIXED_HEADER_SIZE,
                actual: buf.len(),
            });
        }

        let version = buf[0];
        if version != WIRE_VERSION {
            return Err(VectraError::InvalidWireFormat(format!(
                "Unsupported wire version: {}",
                version
            )));
        }

        let tag = MessageTag::from_byte(buf[1]).ok_or(VectraError::UnknownMessageTag(buf[1]))?;
        let node_id = NodeId::from_bytes([buf[2], buf[3]]);
        let payload_len = u32::from_le_bytes([buf[4], buf[5], buf[6], buf[7]]);

        Ok(FixedHeader {
            version,
            tag,
            node_id,
            payload_len,
        })
    }

    /// Serialize the header into the first `FIXED_HEADER_SIZE` bytes of `buf`.
    pub fn serialize(&self, buf: &mut [u8]) -> VectraResult<()> {
        if buf.len() < FIXED_HEADER_SIZE {
            return Err(VectraError::BufferTooShort {
                expected: FIXED_HEADER_SIZE,
                actual: buf.len(),
            });
        }

        buf[0] = self.version;
        buf[1] = self.tag.to_byte();
        buf[2..4].copy_from_slice(&self.node_id.to_bytes());
        buf[4..8].copy_from_slice(&self.payload_len.to_le_bytes());
        Ok(())
    }
}
