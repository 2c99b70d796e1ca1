//! Event history records
//!
//! Every state-mutating operation on a node appends one immutable
//! `HistoryEntry` carrying a snapshot of the clock *after* the event was
//! applied. The rendered text format is consumed by existing drivers, so it
//! is frozen:
//!
//! ```text
//! Local: VC=1,0,0
//! Send(3, 'hi') PREPARE: VC=2,0,0
//! Send(3, 'hi') CONFIRMED: VC=2,0,0
//! Send(3, 'hi') FAILED: VC=2,0,0
//! Rec(1, 'hi'): VC=2,0,1
//! ```
//!
//! Peers are rendered 1-based, like everything user-facing.

use std::fmt;

use crate::{NodeId, VectorClock};

/// Outcome phase of a send attempt.
///
/// The clock is advanced at PREPARE time and is not rolled back when the
/// delivery later fails: the intent to send is itself a causal event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SendPhase {
    /// Clock advanced, snapshot taken, delivery not yet attempted.
    Prepare,
    /// Remote receive completed.
    Confirmed,
    /// Connection or remote invocation failed.
    Failed,
}

impl SendPhase {
    fn suffix(self) -> &'static str {
        match self {
            SendPhase::Prepare => " PREPARE",
            SendPhase::Confirmed => " CONFIRMED",
            SendPhase::Failed => " FAILED",
        }
    }
}

/// What kind of event a history entry records.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventKind {
    Local,
    Send(SendPhase),
    Receive,
}

/// One immutable entry in a node's append-only event log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    pub kind: EventKind,
    /// Counterparty, for sends and receives.
    pub peer: Option<NodeId>,
    /// Message text, for sends and receives.
    pub text: Option<String>,
    /// Clock snapshot taken after the event was applied.
    pub clock: VectorClock,
}

impl HistoryEntry {
    pub fn local(clock: VectorClock) -> Self {
        HistoryEntry {
            kind: EventKind::Local,
            peer: None,
            text: None,
            clock,
        }
    }

    pub fn send(phase: SendPhase, target: NodeId, text: impl Into<String>, clock: VectorClock) -> Self {
        HistoryEntry {
            kind: EventKind::Send(phase),
            peer: Some(target),
            text: Some(text.into()),
            clock,
        }
    }

    pub fn receive(sender: NodeId, text: impl Into<String>, clock: VectorClock) -> Self {
        HistoryEntry {
            kind: EventKind::Receive,
            peer: Some(sender),
            text: Some(text.into()),
            clock,
        }
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let peer = self.peer.map(|p| p.display_number()).unwrap_or(0);
        let text = self.text.as_deref().unwrap_or("");

        match self.kind {
            EventKind::Local => write!(f, "Local")?,
            EventKind::Send(phase) => {
                write!(f, "Send({}, '{}'){}", peer, text, phase.suffix())?
            }
            EventKind::Receive => write!(f, "Rec({}, '{}')", peer, text)?,
        }

        write!(f, ": VC={}", self.clock)
    }
}

/// One message delivered to a node's inbox, append-only.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReceivedMessage {
    pub sender: NodeId,
    pub text: String,
}

impl ReceivedMessage {
    pub fn new(sender: NodeId, text: impl Into<String>) -> Self {
        ReceivedMessage {
            sender,
            text: text.into(),
        }
    }
}

impl fmt::Display for ReceivedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.sender, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock(slots: &[u64]) -> VectorClock {
        VectorClock::from_slots(slots.to_vec())
    }

    #[test]
    fn test_local_format() {
        let entry = HistoryEntry::local(clock(&[1, 0, 0]));
        assert_eq!(entry.to_string(), "Local: VC=1,0,0");
    }

    #[test]
    fn test_send_phases_format() {
        let prepared = HistoryEntry::send(SendPhase::Prepare, NodeId::new(2), "hi", clock(&[2, 0, 0]));
        assert_eq!(prepared.to_string(), "Send(3, 'hi') PREPARE: VC=2,0,0");

        let confirmed =
            HistoryEntry::send(SendPhase::Confirmed, NodeId::new(2), "hi", clock(&[2, 0, 0]));
        assert_eq!(confirmed.to_string(), "Send(3, 'hi') CONFIRMED: VC=2,0,0");

        let failed = HistoryEntry::send(SendPhase::Failed, NodeId::new(2), "hi", clock(&[2, 0, 0]));
        assert_eq!(failed.to_string(), "Send(3, 'hi') FAILED: VC=2,0,0");
    }

    #[test]
    fn test_receive_format() {
        let entry = HistoryEntry::receive(NodeId::new(0), "hi", clock(&[2, 0, 1]));
        assert_eq!(entry.to_string(), "Rec(1, 'hi'): VC=2,0,1");
    }

    #[test]
    fn test_received_message_format() {
        let msg = ReceivedMessage::new(NodeId::new(0), "hello");
        assert_eq!(msg.to_string(), "P1: hello");
    }
}
