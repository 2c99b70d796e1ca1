//! Node state snapshots
//!
//! `GetState` hands a caller a deep copy of everything a node knows: the
//! clock, the rendered history, and the rendered inbox. Handing out copies
//! (never references into live state) is what keeps remote observers from
//! corrupting a node.

use crate::VectorClock;

/// Immutable snapshot of one node's observable state.
///
/// History and received messages are carried in their rendered text form -
/// that is the contract with existing drivers, which display them verbatim.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NodeState {
    /// Deep copy of the vector clock at snapshot time.
    pub clock: VectorClock,
    /// Rendered history entries, in append order.
    pub history: Vec<String>,
    /// Rendered received messages, in delivery order.
    pub received: Vec<String>,
}

impl NodeState {
    pub fn new(clock: VectorClock, history: Vec<String>, received: Vec<String>) -> Self {
        NodeState {
            clock,
            history,
            received,
        }
    }
}
