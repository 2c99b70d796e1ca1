//! Typed request/response messages and their payload encodings
//!
//! Payload layout conventions (all little-endian):
//! - strings: u16 byte length + UTF-8 bytes
//! - clocks: u16 slot count + u64 per slot
//! - string lists: u32 entry count + strings

use bytes::Buf;

use vectra_core::{NodeId, NodeState, VectorClock, VectraError, VectraResult};

use crate::{Frame, MessageTag};

/// A request to one of the five node operations (plus liveness ping).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Request {
    LocalEvent,
    SendMessage {
        target: NodeId,
        text: String,
    },
    ReceiveMessage {
        sender: NodeId,
        text: String,
        clock: VectorClock,
    },
    GetState,
    Shutdown,
    Ping,
}

/// A response frame, one per request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Response {
    /// Operation applied (LocalEvent, ReceiveMessage, Shutdown).
    Ack,
    /// Outcome of a SendMessage.
    SendResult(bool),
    /// GetState snapshot.
    State(NodeState),
    /// Liveness reply.
    Pong,
    /// Protocol-level failure (bad frame, unexpected tag).
    Error(String),
}

impl Request {
    pub fn tag(&self) -> MessageTag {
        match self {
            Request::LocalEvent => MessageTag::LocalEvent,
            Request::SendMessage { .. } => MessageTag::SendMessage,
            Request::ReceiveMessage { .. } => MessageTag::ReceiveMessage,
            Request::GetState => MessageTag::GetState,
            Request::Shutdown => MessageTag::Shutdown,
            Request::Ping => MessageTag::Ping,
        }
    }

    /// Encode into a frame stamped with the caller's identity.
    pub fn into_frame(self, from: NodeId) -> VectraResult<Frame> {
        let tag = self.tag();
        let mut payload = Vec::new();

        match self {
            Request::LocalEvent | Request::GetState | Request::Shutdown | Request::Ping => {}
            Request::SendMessage { target, text } => {
                payload.extend_from_slice(&target.to_bytes());
                put_string(&mut payload, &text)?;
            }
            Request::ReceiveMessage {
                sender,
                text,
                clock,
            } => {
                payload.extend_from_slice(&sender.to_bytes());
                put_clock(&mut payload, &clock)?;
                put_string(&mut payload, &text)?;
            }
        }

        Ok(Frame::with_payload(tag, from, payload))
    }

    /// Decode a request from a parsed frame.
    pub fn from_frame(frame: &Frame) -> VectraResult<Self> {
        let mut buf: &[u8] = &frame.payload;

        let request = match frame.header.tag {
            MessageTag::LocalEvent => Request::LocalEvent,
            MessageTag::GetState => Request::GetState,
            MessageTag::Shutdown => Request::Shutdown,
            MessageTag::Ping => Request::Ping,
            MessageTag::SendMessage => {
                let target = get_node_id(&mut buf)?;
                let text = get_string(&mut buf)?;
                Request::SendMessage { target, text }
            }
            MessageTag::ReceiveMessage => {
                let sender = get_node_id(&mut buf)?;
                let clock = get_clock(&mut buf)?;
                let text = get_string(&mut buf)?;
                Request::ReceiveMessage {
                    sender,
                    text,
                    clock,
                }
            }
            tag => {
                return Err(VectraError::InvalidWireFormat(format!(
                    "Not a request tag: {:?}",
                    tag
                )))
            }
        };

        if !buf.is_empty() {
            return Err(VectraError::InvalidWireFormat(format!(
                "{} trailing bytes after request payload",
                buf.len()
            )));
        }

        Ok(request)
    }
}

impl Response {
    pub fn tag(&self) -> MessageTag {
        match self {
            Response::Ack => MessageTag::Ack,
            Response::SendResult(_) => MessageTag::SendResult,
            Response::State(_) => MessageTag::State,
            Response::Pong => MessageTag::Pong,
            Response::Error(_) => MessageTag::Error,
        }
    }

    /// Encode into a frame stamped with the responding node's identity.
    pub fn into_frame(self, from: NodeId) -> VectraResult<Frame> {
        let tag = self.tag();
        let mut payload = Vec::new();

        match self {
            Response::Ack | Response::Pong => {}
            Response::SendResult(ok) => payload.push(ok as u8),
            Response::Error(message) => put_string(&mut payload, &message)?,
            Response::State(state) => {
                put_clock(&mut payload, &state.clock)?;
                put_string_list(&mut payload, &state.history)?;
                put_string_list(&mut payload, &state.received)?;
            }
        }

        Ok(Frame::with_payload(tag, from, payload))
    }

    /// Decode a response from a parsed frame.
    pub fn from_frame(frame: &Frame) -> VectraResult<Self> {
        let mut buf: &[u8] = &frame.payload;

        let response = match frame.header.tag {
            MessageTag::Ack => Response::Ack,
            MessageTag::Pong => Response::Pong,
            MessageTag::SendResult => {
                if buf.remaining() < 1 {
                    return Err(VectraError::BufferTooShort {
                        expected: 1,
                        actual: 0,
                    });
                }
                Response::SendResult(buf.get_u8() != 0)
            }
            MessageTag::Error => Response::Error(get_string(&mut buf)?),
            MessageTag::State => {
                let clock = get_clock(&mut buf)?;
                let history = get_string_list(&mut buf)?;
                let received = get_string_list(&mut buf)?;
                Response::State(NodeState::new(clock, history, received))
            }
            tag => {
                return Err(VectraError::InvalidWireFormat(format!(
                    "Not a response tag: {:?}",
                    tag
                )))
            }
        };

        if !buf.is_empty() {
            return Err(VectraError::InvalidWireFormat(format!(
                "{} trailing bytes after response payload",
                buf.len()
            )));
        }

        Ok(response)
    }
}

fn put_string(buf: &mut Vec<u8>, s: &str) -> VectraResult<()> {
    if s.len() > u16::MAX as usize {
        return Err(VectraError::InvalidWireFormat(format!(
            "String too long for wire: {} bytes",
            s.len()
        )));
    }
    buf.extend_from_slice(&(s.len() as u16).to_le_bytes());
    buf.extend_from_slice(s.as_bytes());
    Ok(())
}

fn get_string(buf: &mut &[u8]) -> VectraResult<String> {
    if buf.remaining() < 2 {
        return Err(VectraError::BufferTooShort {
            expected: 2,
            actual: buf.remaining(),
        });
    }
    let len = buf.get_u16_le() as usize;
    if buf.remaining() < len {
        return Err(VectraError::BufferTooShort {
            expected: len,
            actual: buf.remaining(),
        });
    }
    let bytes = buf[..len].to_vec();
    buf.advance(len);
    String::from_utf8(bytes)
        .map_err(|e| VectraError::InvalidWireFormat(format!("Invalid UTF-8 string: {}", e)))
}

fn put_clock(buf: &mut Vec<u8>, clock: &VectorClock) -> VectraResult<()> {
    if clock.len() > u16::MAX as usize {
        return Err(VectraError::InvalidWireFormat(format!(
            "Clock too long for wire: {} slots",
            clock.len()
        )));
    }
    buf.extend_from_slice(&(clock.len() as u16).to_le_bytes());
    for &slot in clock.as_slice() {
        buf.extend_from_slice(&slot.to_le_bytes());
    }
    Ok(())
}

fn get_clock(buf: &mut &[u8]) -> VectraResult<VectorClock> {
    if buf.remaining() < 2 {
        return Err(VectraError::BufferTooShort {
            expected: 2,
            actual: buf.remaining(),
        });
    }
    let count = buf.get_u16_le() as usize;
    if buf.remaining() < count * 8 {
        return Err(VectraError::BufferTooShort {
            expected: count * 8,
            actual: buf.remaining(),
        });
    }
    let mut slots = Vec::with_capacity(count);
    for _ in 0..count {
        slots.push(buf.get_u64_le());
    }
    Ok(VectorClock::from_slots(slots))
}

fn put_string_list(buf: &mut Vec<u8>, list: &[String]) -> VectraResult<()> {
    buf.extend_from_slice(&(list.len() as u32).to_le_bytes());
    for s in list {
        put_string(buf, s)?;
    }
    Ok(())
}

fn get_string_list(buf: &mut &[u8]) -> VectraResult<Vec<String>> {
    if buf.remaining() < 4 {
        return Err(VectraError::BufferTooShort {
            expected: 4,
            actual: buf.remaining(),
        });
    }
    let count = buf.get_u32_le() as usize;
    let mut list = Vec::new();
    for _ in 0..count {
        list.push(get_string(buf)?);
    }
    Ok(list)
}

fn get_node_id(buf: &mut &[u8]) -> VectraResult<NodeId> {
    if buf.remaining() < 2 {
        return Err(VectraError::BufferTooShort {
            expected: 2,
            actual: buf.remaining(),
        });
    }
    Ok(NodeId::new(buf.get_u16_le()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::WIRE_VERSION;
    use proptest::prelude::*;

    fn roundtrip_request(request: Request) -> Request {
        let frame = request.into_frame(NodeId::new(1)).unwrap();
        let bytes = frame.serialize().unwrap();
        let parsed = Frame::parse(&bytes).unwrap();
        Request::from_frame(&parsed).unwrap()
    }

    fn roundtrip_response(response: Response) -> Response {
        let frame = response.into_frame(NodeId::new(2)).unwrap();
        let bytes = frame.serialize().unwrap();
        let parsed = Frame::parse(&bytes).unwrap();
        Response::from_frame(&parsed).unwrap()
    }

    #[test]
    fn test_send_message_roundtrip() {
        let request = Request::SendMessage {
            target: NodeId::new(2),
            text: "hi".into(),
        };
        assert_eq!(roundtrip_request(request.clone()), request);
    }

    #[test]
    fn test_receive_message_roundtrip() {
        let request = Request::ReceiveMessage {
            sender: NodeId::new(0),
            text: "hello there".into(),
            clock: VectorClock::from_slots(vec![2, 0, 0]),
        };
        assert_eq!(roundtrip_request(request.clone()), request);
    }

    #[test]
    fn test_state_roundtrip() {
        let state = NodeState::new(
            VectorClock::from_slots(vec![2, 0, 1]),
            vec!["Local: VC=1,0,0".into(), "Rec(1, 'hi'): VC=2,0,1".into()],
            vec!["P1: hi".into()],
        );
        let response = Response::State(state);
        assert_eq!(roundtrip_response(response.clone()), response);
    }

    #[test]
    fn test_send_result_roundtrip() {
        assert_eq!(
            roundtrip_response(Response::SendResult(true)),
            Response::SendResult(true)
        );
        assert_eq!(
            roundtrip_response(Response::SendResult(false)),
            Response::SendResult(false)
        );
    }

    #[test]
    fn test_response_tag_is_not_a_request() {
        let frame = Response::Ack.into_frame(NodeId::new(0)).unwrap();
        assert!(Request::from_frame(&frame).is_err());
    }

    #[test]
    fn test_trailing_bytes_rejected() {
        let mut frame = Request::LocalEvent.into_frame(NodeId::new(0)).unwrap();
        frame.payload = vec![0xFF];
        assert!(Request::from_frame(&frame).is_err());
    }

    #[test]
    fn test_truncated_receive_payload_rejected() {
        let request = Request::ReceiveMessage {
            sender: NodeId::new(0),
            text: "hi".into(),
            clock: VectorClock::from_slots(vec![1, 2, 3]),
        };
        let mut frame = request.into_frame(NodeId::new(0)).unwrap();
        frame.payload.truncate(frame.payload.len() / 2);
        assert!(Request::from_frame(&frame).is_err());
    }

    proptest! {
        #[test]
        fn prop_send_message_roundtrip(target in 0u16..64, text in ".{0,128}") {
            let request = Request::SendMessage {
                target: NodeId::new(target),
                text,
            };
            prop_assert_eq!(roundtrip_request(request.clone()), request);
        }

        #[test]
        fn prop_arbitrary_payload_never_panics(
            tag in 0u8..=0xFF,
            payload in prop::collection::vec(any::<u8>(), 0..256),
        ) {
            let mut bytes = vec![WIRE_VERSION, tag, 0, 0];
            bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            bytes.extend_from_slice(&payload);

            if let Ok(frame) = Frame::parse(&bytes) {
                let _ = Request::from_frame(&frame);
                let _ = Response::from_frame(&frame);
            }
        }
    }
}
