//! Pure per-process state machine
//!
//! `ProcessNode` holds everything a participant knows - clock, history,
//! inbox - and applies the event rules with no I/O. The service layer wraps
//! it in a lock and wires it to the network.

use tracing::{info, warn};

use vectra_core::{
    HistoryEntry, NodeId, NodeState, ReceivedMessage, SendPhase, VectorClock, VectraResult,
};

/// State of one simulated process.
pub struct ProcessNode {
    id: NodeId,
    participants: usize,
    clock: VectorClock,
    history: Vec<HistoryEntry>,
    received: Vec<ReceivedMessage>,
}

impl ProcessNode {
    /// Create a node with an all-zero clock. N is fixed for the node's
    /// whole lifetime.
    pub fn new(id: NodeId, participants: u16) -> Self {
        let node = ProcessNode {
            id,
            participants: participants as usize,
            clock: VectorClock::new(participants as usize),
            history: Vec::new(),
            received: Vec::new(),
        };
        info!(node = %node.id, clock = %node.clock, "Initialized");
        node
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn participants(&self) -> usize {
        self.participants
    }

    pub fn clock(&self) -> &VectorClock {
        &self.clock
    }

    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub fn received(&self) -> &[ReceivedMessage] {
        &self.received
    }

    /// Apply a local event: advance own slot, record it.
    pub fn local_event(&mut self) {
        self.clock.increment(self.id.index());
        self.log(HistoryEntry::local(self.clock.clone()));
    }

    /// First half of a send: validate the target, advance own slot, record
    /// the attempt, and return the clock snapshot to put on the wire.
    ///
    /// Returns `None` for a self-target or out-of-range target, with no
    /// state change. Once `Some` is returned the clock has advanced and
    /// stays advanced even if delivery later fails - the intent to send is
    /// itself a causal event.
    pub fn prepare_send(&mut self, target: NodeId, text: &str) -> Option<VectorClock> {
        if target == self.id || target.index() >= self.participants {
            warn!(node = %self.id, %target, "Invalid send target");
            return None;
        }

        self.clock.increment(self.id.index());
        let snapshot = self.clock.clone();
        self.log(HistoryEntry::send(
            SendPhase::Prepare,
            target,
            text,
            snapshot.clone(),
        ));
        Some(snapshot)
    }

    /// Second half of a send: record the delivery outcome. The clock is
    /// untouched either way.
    pub fn record_send_outcome(&mut self, target: NodeId, text: &str, delivered: bool) {
        let phase = if delivered {
            SendPhase::Confirmed
        } else {
            SendPhase::Failed
        };
        self.log(HistoryEntry::send(phase, target, text, self.clock.clone()));
    }

    /// Apply an inbound message: merge the sender's clock, advance own
    /// slot, record the message and the event.
    ///
    /// A sender clock of the wrong length is a protocol violation: the
    /// whole event is dropped with no mutation anywhere, and the error is
    /// returned for logging only - it is never surfaced to the sender.
    pub fn receive_message(
        &mut self,
        sender: NodeId,
        text: &str,
        sender_clock: &VectorClock,
    ) -> VectraResult<()> {
        info!(node = %self.id, %sender, %text, sender_clock = %sender_clock, "Received message");

        // merge validates the length before touching any slot
        self.clock.merge(sender_clock)?;
        self.clock.increment(self.id.index());

        self.received.push(ReceivedMessage::new(sender, text));
        self.log(HistoryEntry::receive(sender, text, self.clock.clone()));
        Ok(())
    }

    /// Deep-copied snapshot of the observable state. Never hands out the
    /// live clock or history.
    pub fn snapshot(&self) -> NodeState {
        NodeState::new(
            self.clock.clone(),
            self.history.iter().map(|e| e.to_string()).collect(),
            self.received.iter().map(|m| m.to_string()).collect(),
        )
    }

    fn log(&mut self, entry: HistoryEntry) {
        info!(node = %self.id, "{}", entry);
        self.history.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vectra_core::{CausalOrder, VectraError};

    #[test]
    fn test_starts_all_zero_with_n_slots() {
        let node = ProcessNode::new(NodeId::new(1), 3);
        assert_eq!(node.clock().len(), 3);
        assert_eq!(node.clock().as_slice(), &[0, 0, 0]);
        assert!(node.history().is_empty());
        assert!(node.received().is_empty());
    }

    #[test]
    fn test_local_event_increments_only_own_slot() {
        let mut node = ProcessNode::new(NodeId::new(1), 3);
        node.local_event();
        assert_eq!(node.clock().as_slice(), &[0, 1, 0]);
        assert_eq!(node.history().len(), 1);
        assert_eq!(node.history()[0].to_string(), "Local: VC=0,1,0");
    }

    #[test]
    fn test_prepare_send_advances_clock_and_snapshots() {
        let mut node = ProcessNode::new(NodeId::new(0), 3);
        node.local_event();

        let snapshot = node.prepare_send(NodeId::new(2), "hi").unwrap();
        assert_eq!(snapshot.as_slice(), &[2, 0, 0]);
        assert_eq!(node.clock().as_slice(), &[2, 0, 0]);
        assert_eq!(
            node.history()[1].to_string(),
            "Send(3, 'hi') PREPARE: VC=2,0,0"
        );

        // Snapshot is a deep copy: later events must not leak into it.
        node.local_event();
        assert_eq!(snapshot.as_slice(), &[2, 0, 0]);
    }

    #[test]
    fn test_send_to_self_rejected_without_state_change() {
        let mut node = ProcessNode::new(NodeId::new(0), 3);
        node.local_event();

        assert!(node.prepare_send(NodeId::new(0), "oops").is_none());
        assert_eq!(node.clock().as_slice(), &[1, 0, 0]);
        assert_eq!(node.history().len(), 1);
    }

    #[test]
    fn test_send_out_of_range_rejected() {
        let mut node = ProcessNode::new(NodeId::new(0), 3);
        assert!(node.prepare_send(NodeId::new(3), "oops").is_none());
        assert!(node.prepare_send(NodeId::new(100), "oops").is_none());
        assert_eq!(node.clock().as_slice(), &[0, 0, 0]);
    }

    #[test]
    fn test_failed_send_keeps_clock_advanced() {
        let mut node = ProcessNode::new(NodeId::new(0), 2);
        node.prepare_send(NodeId::new(1), "hi").unwrap();
        node.record_send_outcome(NodeId::new(1), "hi", false);

        assert_eq!(node.clock().as_slice(), &[1, 0]);
        assert_eq!(
            node.history()[1].to_string(),
            "Send(2, 'hi') FAILED: VC=1,0"
        );
    }

    #[test]
    fn test_receive_merges_then_increments_own_slot() {
        let mut node = ProcessNode::new(NodeId::new(2), 3);
        node.receive_message(
            NodeId::new(0),
            "hi",
            &VectorClock::from_slots(vec![2, 0, 0]),
        )
        .unwrap();

        assert_eq!(node.clock().as_slice(), &[2, 0, 1]);
        assert_eq!(node.received().len(), 1);
        assert_eq!(node.received()[0].to_string(), "P1: hi");
        assert_eq!(node.history()[0].to_string(), "Rec(1, 'hi'): VC=2,0,1");
    }

    #[test]
    fn test_receive_takes_elementwise_max() {
        let mut node = ProcessNode::new(NodeId::new(1), 3);
        node.local_event();
        node.local_event();
        // own clock now [0,2,0]; remote [1,1,5]
        node.receive_message(
            NodeId::new(0),
            "x",
            &VectorClock::from_slots(vec![1, 1, 5]),
        )
        .unwrap();

        assert_eq!(node.clock().as_slice(), &[1, 3, 5]);
    }

    #[test]
    fn test_malformed_clock_dropped_without_mutation() {
        let mut node = ProcessNode::new(NodeId::new(2), 3);
        node.local_event();

        let err = node
            .receive_message(NodeId::new(0), "bad", &VectorClock::from_slots(vec![1, 1]))
            .unwrap_err();
        assert!(matches!(err, VectraError::ClockLengthMismatch { .. }));

        assert_eq!(node.clock().as_slice(), &[0, 0, 1]);
        assert_eq!(node.history().len(), 1);
        assert!(node.received().is_empty());
    }

    #[test]
    fn test_snapshot_is_idempotent_and_detached() {
        let mut node = ProcessNode::new(NodeId::new(0), 2);
        node.local_event();

        let a = node.snapshot();
        let b = node.snapshot();
        assert_eq!(a, b);

        node.local_event();
        // Earlier snapshots are unaffected by later events.
        assert_eq!(a.clock.as_slice(), &[1, 0]);
    }

    #[test]
    fn test_three_node_scenario() {
        // P1 local -> [1,0,0]; P1 sends 'hi' to P3 -> [2,0,0];
        // P3 receives with that snapshot -> [2,0,1].
        let mut p1 = ProcessNode::new(NodeId::new(0), 3);
        let mut p3 = ProcessNode::new(NodeId::new(2), 3);

        p1.local_event();
        assert_eq!(p1.clock().as_slice(), &[1, 0, 0]);

        let snapshot = p1.prepare_send(NodeId::new(2), "hi").unwrap();
        assert_eq!(p1.clock().as_slice(), &[2, 0, 0]);

        p3.receive_message(NodeId::new(0), "hi", &snapshot).unwrap();
        p1.record_send_outcome(NodeId::new(2), "hi", true);

        assert_eq!(p3.clock().as_slice(), &[2, 0, 1]);
        assert_eq!(
            p1.history().last().unwrap().to_string(),
            "Send(3, 'hi') CONFIRMED: VC=2,0,0"
        );
    }

    #[test]
    fn test_history_clocks_respect_causal_order() {
        let mut p1 = ProcessNode::new(NodeId::new(0), 3);
        let mut p3 = ProcessNode::new(NodeId::new(2), 3);

        p1.local_event();
        let snapshot = p1.prepare_send(NodeId::new(2), "hi").unwrap();
        p3.receive_message(NodeId::new(0), "hi", &snapshot).unwrap();

        let send_clock = &p1.history()[1].clock;
        let recv_clock = &p3.history()[0].clock;
        assert_eq!(send_clock.compare(recv_clock), CausalOrder::HappensBefore);
        assert_eq!(recv_clock.compare(send_clock), CausalOrder::HappensAfter);
    }
}
